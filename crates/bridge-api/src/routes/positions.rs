//! 포지션 조회/청산 라우트.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use bridge_core::{
    max_volume, min_volume, normalize_volume, Direction, ErrorKind, Position, PositionSide,
    TradeIntent, TradeResult,
};

use crate::error::{status_for, venue_error_response, ApiErrorResponse};
use crate::routes::webhook::TradeResponse;
use crate::state::AppState;

/// 포지션 조회 쿼리.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PositionsQuery {
    /// 심볼 필터 (예: "EURUSD")
    #[serde(default)]
    pub symbol: Option<String>,
}

/// 포지션 청산 요청.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CloseRequest {
    /// 심볼
    pub symbol: String,
    /// 청산 수량 (lot). 생략 시 해당 심볼 전량 청산.
    #[serde(default)]
    pub volume: Option<Decimal>,
    /// 방향 필터 ("long"/"short", 선택)
    #[serde(default)]
    pub side: Option<String>,
}

/// 오픈 포지션 조회.
#[utoipa::path(
    get,
    path = "/positions",
    tag = "positions",
    params(PositionsQuery),
    responses(
        (status = 200, description = "포지션 조회 성공", body = Vec<Position>),
        (status = 503, description = "venue 연결 불가", body = ApiErrorResponse)
    )
)]
pub async fn list_positions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PositionsQuery>,
) -> Result<Json<Vec<Position>>, (StatusCode, Json<ApiErrorResponse>)> {
    let symbol = query.symbol.map(|s| s.trim().to_uppercase());
    let positions = state
        .venue
        .positions(symbol.as_deref())
        .await
        .map_err(|e| venue_error_response(&e))?;
    Ok(Json(positions))
}

/// 포지션 청산.
///
/// 수량을 생략하면 해당 심볼(및 방향 필터)의 전량을 청산합니다.
#[utoipa::path(
    post,
    path = "/close",
    tag = "positions",
    request_body = CloseRequest,
    responses(
        (status = 200, description = "청산 완료", body = TradeResponse),
        (status = 400, description = "요청 검증 실패", body = TradeResponse),
        (status = 503, description = "venue 연결 불가", body = TradeResponse)
    )
)]
pub async fn close_positions(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CloseRequest>,
) -> (StatusCode, Json<TradeResponse>) {
    let symbol = request.symbol.trim().to_uppercase();
    if symbol.is_empty() {
        let result = TradeResult::failure(ErrorKind::MissingField, "필수 필드 누락: symbol");
        return (status_for(ErrorKind::MissingField), Json(result.into()));
    }

    let side = match request.side.as_deref().map(str::to_uppercase) {
        None => None,
        Some(raw) => match raw.as_str() {
            "LONG" | "BUY" => Some(PositionSide::Long),
            "SHORT" | "SELL" => Some(PositionSide::Short),
            other => {
                let result = TradeResult::failure(
                    ErrorKind::InvalidAction,
                    format!("알 수 없는 방향 필터: {other}"),
                );
                return (status_for(ErrorKind::InvalidAction), Json(result.into()));
            }
        },
    };

    let result = match request.volume {
        Some(requested) => match normalize_volume(requested) {
            Some(volume) => {
                info!(symbol = %symbol, volume = %volume, side = ?side, "청산 요청");
                run_close(&state, &symbol, volume, side).await
            }
            None => {
                let result = TradeResult::failure(
                    ErrorKind::InvalidVolume,
                    format!("유효하지 않은 수량: {requested}"),
                );
                return (status_for(ErrorKind::InvalidVolume), Json(result.into()));
            }
        },
        // 수량 미지정: 현재 오픈 수량 전체
        None => {
            let positions = match state.venue.positions(Some(&symbol)).await {
                Ok(positions) => positions,
                Err(e) => {
                    let kind = if e.is_connectivity() {
                        ErrorKind::Connectivity
                    } else {
                        ErrorKind::VenueRejection
                    };
                    let result = TradeResult::failure(kind, format!("포지션 조회 실패: {e}"));
                    return (status_for(kind), Json(result.into()));
                }
            };
            let total: Decimal = positions
                .iter()
                .filter(|p| side.is_none_or(|s| p.side == s))
                .map(|p| p.volume)
                .sum();
            if total <= Decimal::ZERO {
                let result = TradeResult::success(format!("{symbol} 청산할 포지션 없음"));
                return (StatusCode::OK, Json(result.into()));
            }
            info!(symbol = %symbol, total = %total, side = ?side, "전량 청산 요청");
            close_full_book(&state, &symbol, total, side).await
        }
    };

    state.notify_trade(&symbol, &result);

    let status = match result.error_kind {
        None => StatusCode::OK,
        Some(kind) => status_for(kind),
    };
    (status, Json(result.into()))
}

/// 단일 CloseOnly 의도 실행.
async fn run_close(
    state: &AppState,
    symbol: &str,
    volume: Decimal,
    side: Option<PositionSide>,
) -> TradeResult {
    let mut intent = TradeIntent::new(symbol, Direction::CloseOnly, volume);
    if let Some(side) = side {
        intent = intent.with_close_side(side);
    }
    state.executor.execute(&intent).await
}

/// 장부 합계 기준 전량 청산.
///
/// 의도 수량은 요청당 상한(100 lot)이 있으므로, 합계가 상한을 넘으면
/// 상한 단위로 나눠 순차 실행하고 청산 티켓을 합쳐 돌려줍니다.
/// 중간에 실패하거나 더 이상 청산되는 포지션이 없으면 중단합니다.
async fn close_full_book(
    state: &AppState,
    symbol: &str,
    total: Decimal,
    side: Option<PositionSide>,
) -> TradeResult {
    let mut remaining = total.round_dp(2);
    let mut closed_tickets: Vec<u64> = Vec::new();
    let mut last = TradeResult::success(format!("{symbol} 청산할 포지션 없음"));

    while remaining >= min_volume() {
        let chunk = remaining.min(max_volume());
        let result = run_close(state, symbol, chunk, side).await;
        let progressed = !result.closed_tickets.is_empty();
        closed_tickets.extend(result.closed_tickets.iter().copied());
        let failed = !result.success;
        last = result;
        if failed || !progressed {
            break;
        }
        remaining -= chunk;
    }

    let merged = match last.error_kind {
        None if !closed_tickets.is_empty() => TradeResult::success(format!(
            "{symbol} 포지션 {}건 청산 완료",
            closed_tickets.len()
        )),
        None => TradeResult::success(last.message),
        Some(kind) => TradeResult::failure(kind, last.message),
    };
    merged.with_closed_tickets(closed_tickets)
}
