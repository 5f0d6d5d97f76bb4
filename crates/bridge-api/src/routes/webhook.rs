//! 웹훅 수신 라우트.
//!
//! 차트/알림 서비스의 웹훅 페이로드를 받아 정규화 → 실행까지
//! 수행하고 집계된 결과를 반환합니다.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use utoipa::ToSchema;

use bridge_core::TradeResult;
use bridge_execution::{normalize, RequestPhase};

use crate::error::{status_for, ApiErrorResponse};
use crate::state::AppState;

// ==================== Request/Response 타입 ====================

/// 거래 요청 응답.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TradeResponse {
    /// 전체 요청 성공 여부
    pub success: bool,
    /// 결과 메시지
    pub message: String,
    /// 청산된 포지션 티켓 (청산 순서대로)
    pub closed_tickets: Vec<u64>,
    /// 신규 진입 티켓
    pub opened_ticket: Option<u64>,
}

impl From<TradeResult> for TradeResponse {
    fn from(result: TradeResult) -> Self {
        Self {
            success: result.success,
            message: result.message,
            closed_tickets: result.closed_tickets,
            opened_ticket: result.opened_ticket,
        }
    }
}

// ==================== 핸들러 ====================

/// 웹훅 페이로드 처리.
#[utoipa::path(
    post,
    path = "/webhook",
    tag = "trading",
    responses(
        (status = 200, description = "거래 처리 성공", body = TradeResponse),
        (status = 400, description = "페이로드 검증 실패", body = ApiErrorResponse),
        (status = 503, description = "venue 연결 불가", body = TradeResponse),
        (status = 500, description = "venue 주문 거부", body = TradeResponse)
    )
)]
pub async fn handle_webhook(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<TradeResponse>) {
    let intent = match normalize(&payload, state.default_volume) {
        Ok(intent) => intent,
        Err(e) => {
            warn!(error = %e, "웹훅 페이로드 정규화 실패");
            let result = TradeResult::failure(e.kind(), e.to_string());
            return (status_for(e.kind()), Json(result.into()));
        }
    };

    info!(
        phase = ?RequestPhase::Normalized,
        symbol = %intent.symbol,
        direction = ?intent.direction,
        "웹훅 수신"
    );

    let result = state.executor.execute(&intent).await;
    state.notify_trade(&intent.symbol, &result);

    let status = match result.error_kind {
        None => StatusCode::OK,
        Some(kind) => status_for(kind),
    };
    (status, Json(result.into()))
}
