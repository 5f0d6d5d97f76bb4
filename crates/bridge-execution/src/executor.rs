//! 주문 실행.
//!
//! leg 계획을 venue에 제출하고 leg별 결과를 하나의 [`TradeResult`]로
//! 집계합니다. 실행 규칙:
//!
//! - 모든 venue 호출에 고정 타임아웃 적용
//! - leg마다 제출 직전에 호가를 새로 조회 (stale price 방지)
//! - Close leg 거부는 기록 후 잔여 leg 계속 진행 (부분 실패 허용)
//! - 연결 계층 실패는 잔여 leg 즉시 중단 (이후 호출도 실패할 것이므로)
//! - 주문 제출은 재시도하지 않음 (중복 체결 위험)

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use bridge_core::{
    ErrorKind, OrderRequest, Quote, TradeIntent, TradeResult, VenueError, VenueGateway,
    VenueResult,
};

use crate::reconciler::{plan_legs, Leg, LegPlan};
use crate::symbol_lock::SymbolLocks;

/// 실행 설정.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// 슬리피지 허용폭 (포인트). 모든 제출에 동일하게 적용.
    pub deviation: u32,
    /// venue 호출별 타임아웃
    pub venue_timeout: Duration,
    /// 주문 코멘트
    pub order_comment: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            deviation: 20,
            venue_timeout: Duration::from_secs(5),
            order_comment: "webhook-bridge".to_string(),
        }
    }
}

/// 요청 처리 단계.
///
/// 전이는 요청 id가 달린 tracing 스팬 안에서 `phase` 필드로 기록되므로
/// 같은 프로세스에 섞여 들어온 요청들의 로그를 구분할 수 있습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    /// 요청 수신, 심볼 락 획득
    Received,
    /// 페이로드 정규화 완료 (API 계층에서 기록)
    Normalized,
    /// 포지션 스냅샷 대조, leg 계획 산출 완료
    Reconciled,
    /// leg 제출 진행 중
    Executing,
    /// 성공 종료
    Completed,
    /// 실패 종료
    Failed,
}

impl RequestPhase {
    /// 집계 결과에 대응하는 종료 단계.
    pub fn terminal(success: bool) -> Self {
        if success {
            RequestPhase::Completed
        } else {
            RequestPhase::Failed
        }
    }
}

/// 주문 실행기.
///
/// venue 세션을 공유 자원으로 주입받으며, 심볼별 락으로
/// 같은 심볼의 요청을 직렬화합니다.
pub struct OrderExecutor {
    venue: Arc<dyn VenueGateway>,
    locks: SymbolLocks,
    config: ExecutorConfig,
}

/// leg 실행 누적 상태.
#[derive(Default)]
struct Outcome {
    closed_tickets: Vec<u64>,
    opened_ticket: Option<u64>,
    rejections: Vec<String>,
    connectivity: Option<VenueError>,
}

impl OrderExecutor {
    pub fn new(venue: Arc<dyn VenueGateway>, config: ExecutorConfig) -> Self {
        Self {
            venue,
            locks: SymbolLocks::new(),
            config,
        }
    }

    /// 거래 의도 실행.
    ///
    /// 심볼 락을 잡은 상태에서 스냅샷 조회부터 마지막 leg 제출까지
    /// 수행합니다. 반환되는 [`TradeResult`]에는 부분 실패 시에도
    /// 이미 성공한 청산 티켓이 보존됩니다.
    pub async fn execute(&self, intent: &TradeIntent) -> TradeResult {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "trade_request",
            request_id = %request_id,
            symbol = %intent.symbol,
        );
        self.execute_in_span(intent).instrument(span).await
    }

    async fn execute_in_span(&self, intent: &TradeIntent) -> TradeResult {
        let _guard = self.locks.acquire(&intent.symbol).await;

        info!(
            phase = ?RequestPhase::Received,
            direction = ?intent.direction,
            volume = %intent.volume,
            close_existing = intent.close_existing,
            "거래 의도 실행 시작"
        );

        let positions = match self
            .call("positions", self.venue.positions(Some(&intent.symbol)))
            .await
        {
            Ok(positions) => positions,
            Err(e) => {
                error!(phase = ?RequestPhase::Failed, error = %e, "포지션 스냅샷 조회 실패");
                return TradeResult::failure(
                    classify(&e),
                    format!("포지션 조회 실패: {e}"),
                );
            }
        };

        let plan = plan_legs(intent, &positions);
        debug!(
            phase = ?RequestPhase::Reconciled,
            legs = plan.legs.len(),
            shortfall = ?plan.shortfall,
            "leg 계획 산출"
        );

        info!(phase = ?RequestPhase::Executing, legs = plan.legs.len(), "leg 제출 시작");
        let outcome = self.run_legs(intent, &plan).await;
        let result = self.aggregate(intent, &plan, outcome);
        info!(
            phase = ?RequestPhase::terminal(result.success),
            closed = result.closed_tickets.len(),
            opened = ?result.opened_ticket,
            "거래 요청 종료"
        );
        result
    }

    /// leg를 순서대로 실행.
    ///
    /// Open leg는 앞선 leg에서 연결 계층 실패가 없었을 때만 시도됩니다
    /// (연결 실패는 루프 자체를 중단시키므로 구조적으로 보장됨).
    async fn run_legs(&self, intent: &TradeIntent, plan: &LegPlan) -> Outcome {
        let mut outcome = Outcome::default();

        for leg in &plan.legs {
            match self.execute_leg(intent, leg).await {
                Ok(ticket) => {
                    if leg.kind.is_close() {
                        info!(symbol = %intent.symbol, ticket, volume = %leg.volume, "포지션 청산");
                        outcome.closed_tickets.push(ticket);
                    } else {
                        info!(symbol = %intent.symbol, ticket, volume = %leg.volume, "신규 진입");
                        outcome.opened_ticket = Some(ticket);
                    }
                }
                Err(e) if e.is_connectivity() => {
                    error!(
                        symbol = %intent.symbol,
                        kind = ?leg.kind,
                        error = %e,
                        "venue 연결 실패, 잔여 leg 중단"
                    );
                    outcome.connectivity = Some(e);
                    break;
                }
                Err(e) => {
                    warn!(
                        symbol = %intent.symbol,
                        kind = ?leg.kind,
                        ticket = ?leg.target_ticket,
                        error = %e,
                        "leg 거부, 잔여 leg 계속"
                    );
                    outcome.rejections.push(e.to_string());
                }
            }
        }

        outcome
    }

    /// 단일 leg 실행: 호가 조회 → 가격 선택 → 제출.
    async fn execute_leg(&self, intent: &TradeIntent, leg: &Leg) -> VenueResult<u64> {
        let quote = self.call("quote", self.venue.quote(&intent.symbol)).await?;
        let order = build_order(intent, leg, &quote, &self.config)?;
        let ack = self.call("submit", self.venue.submit(&order)).await?;
        Ok(ack.ticket)
    }

    /// 타임아웃이 걸린 venue 호출.
    async fn call<T>(
        &self,
        what: &str,
        fut: impl std::future::Future<Output = VenueResult<T>>,
    ) -> VenueResult<T> {
        match timeout(self.config.venue_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(VenueError::Timeout(format!(
                "{what} 호출이 {:?} 안에 응답하지 않음",
                self.config.venue_timeout
            ))),
        }
    }

    /// leg별 결과를 최종 [`TradeResult`]로 집계.
    fn aggregate(&self, intent: &TradeIntent, plan: &LegPlan, outcome: Outcome) -> TradeResult {
        // 연결 실패: 이미 성공한 청산은 보존하고 전체는 실패 처리
        if let Some(e) = outcome.connectivity {
            return TradeResult::failure(
                ErrorKind::Connectivity,
                format!("venue 연결 실패로 잔여 leg 중단: {e}"),
            )
            .with_closed_tickets(outcome.closed_tickets);
        }

        let open_planned = plan.legs.iter().any(|leg| !leg.kind.is_close());

        if open_planned {
            return match outcome.opened_ticket {
                Some(ticket) => {
                    let mut message = format!(
                        "{} {} {} lot 진입 완료 (티켓 {ticket})",
                        intent.symbol, direction_label(intent), intent.volume
                    );
                    if !outcome.closed_tickets.is_empty() {
                        message.push_str(&format!(
                            ", 반대 포지션 {}건 청산",
                            outcome.closed_tickets.len()
                        ));
                    }
                    if !outcome.rejections.is_empty() {
                        message.push_str(&format!(
                            " (청산 {}건 거부: {})",
                            outcome.rejections.len(),
                            outcome.rejections.join("; ")
                        ));
                    }
                    TradeResult::success(message)
                        .with_closed_tickets(outcome.closed_tickets)
                        .with_opened_ticket(ticket)
                }
                None => {
                    let reason = outcome
                        .rejections
                        .last()
                        .cloned()
                        .unwrap_or_else(|| "진입 주문 미체결".to_string());
                    TradeResult::failure(ErrorKind::VenueRejection, format!("진입 거부: {reason}"))
                        .with_closed_tickets(outcome.closed_tickets)
                }
            };
        }

        // CloseOnly: 계획된 청산이 전부 성공해야 성공
        if !outcome.rejections.is_empty() {
            return TradeResult::failure(
                ErrorKind::VenueRejection,
                format!("청산 거부: {}", outcome.rejections.join("; ")),
            )
            .with_closed_tickets(outcome.closed_tickets);
        }

        let mut message = if outcome.closed_tickets.is_empty() {
            format!("{} 청산할 포지션 없음", intent.symbol)
        } else {
            format!(
                "{} 포지션 {}건 청산 완료",
                intent.symbol,
                outcome.closed_tickets.len()
            )
        };
        if let Some(shortfall) = plan.shortfall {
            message.push_str(&format!(
                " (요청 수량 중 {shortfall} lot은 가용 포지션 부족으로 미체결)"
            ));
        }
        TradeResult::success(message).with_closed_tickets(outcome.closed_tickets)
    }
}

/// leg와 직전 호가로 주문 요청 구성.
///
/// 가격 규칙: Long 청산·Short 진입은 bid, Short 청산·Long 진입은 ask.
fn build_order(
    intent: &TradeIntent,
    leg: &Leg,
    quote: &Quote,
    config: &ExecutorConfig,
) -> VenueResult<OrderRequest> {
    let side = leg.kind.position_side();

    let order = if leg.kind.is_close() {
        let ticket = leg
            .target_ticket
            .ok_or_else(|| VenueError::Api("청산 leg에 대상 티켓 없음".to_string()))?;
        OrderRequest::close(
            &intent.symbol,
            side,
            ticket,
            leg.volume,
            quote.close_price(side),
            config.deviation,
        )
    } else {
        OrderRequest::open(
            &intent.symbol,
            side,
            leg.volume,
            quote.open_price(side),
            config.deviation,
        )
        .with_stop_loss(leg.stop_loss)
        .with_take_profit(leg.take_profit)
    };

    Ok(order.with_comment(config.order_comment.clone()))
}

fn direction_label(intent: &TradeIntent) -> &'static str {
    match intent.direction {
        bridge_core::Direction::Buy => "Long",
        bridge_core::Direction::Sell => "Short",
        bridge_core::Direction::CloseOnly => "Close",
    }
}

/// venue 에러를 최상위 분류로 매핑.
fn classify(error: &VenueError) -> ErrorKind {
    if error.is_connectivity() {
        ErrorKind::Connectivity
    } else {
        ErrorKind::VenueRejection
    }
}
