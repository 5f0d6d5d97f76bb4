//! 인메모리 mock venue.
//!
//! 실행 파이프라인 테스트에서 실제 게이트웨이를 대체합니다.
//! 포지션 장부를 내부에 유지하고, 스크립트로 제출 결과를
//! 순서대로 지정할 수 있습니다.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;

use bridge_core::{
    retcode, AccountInfo, OrderAck, OrderRequest, Position, PositionSide, Quote, Side, VenueError,
    VenueGateway, VenueResult,
};

/// 스크립트된 제출 결과.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// 정상 체결 (장부 반영)
    Fill,
    /// 지정한 에러 반환
    Fail(VenueError),
    /// 응답 없이 무한 대기 (호출 측 타임아웃 유도)
    Hang,
}

/// 테스트용 인메모리 venue.
pub struct MockVenue {
    connected: AtomicBool,
    /// true면 모든 호출이 Network 에러 반환
    unreachable: AtomicBool,
    /// 남은 connect 실패 횟수 (재시도 테스트용)
    connect_failures: AtomicU32,
    next_ticket: AtomicU64,
    positions: Mutex<Vec<Position>>,
    quotes: Mutex<HashMap<String, Quote>>,
    default_quote: Quote,
    submit_script: Mutex<VecDeque<SubmitOutcome>>,
    /// 제출된 주문 기록 (검증용)
    submitted: Mutex<Vec<OrderRequest>>,
}

impl MockVenue {
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            unreachable: AtomicBool::new(false),
            connect_failures: AtomicU32::new(0),
            next_ticket: AtomicU64::new(1000),
            positions: Mutex::new(Vec::new()),
            quotes: Mutex::new(HashMap::new()),
            default_quote: Quote {
                bid: Decimal::new(11000, 4),
                ask: Decimal::new(11002, 4),
            },
            submit_script: Mutex::new(VecDeque::new()),
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// venue 전체를 도달 불가 상태로 전환.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// 처음 `count`번의 connect 호출을 실패시킴.
    pub fn fail_next_connects(&self, count: u32) {
        self.connect_failures.store(count, Ordering::SeqCst);
    }

    /// 포지션 장부에 직접 추가.
    pub fn seed_position(&self, position: Position) {
        self.positions
            .lock()
            .expect("positions lock poisoned")
            .push(position);
    }

    /// 심볼별 호가 지정. 미지정 심볼은 기본 호가 사용.
    pub fn set_quote(&self, symbol: impl Into<String>, quote: Quote) {
        self.quotes
            .lock()
            .expect("quotes lock poisoned")
            .insert(symbol.into(), quote);
    }

    /// 다음 제출 결과들을 순서대로 스크립트. 스크립트 소진 후엔 Fill.
    pub fn script_submits(&self, outcomes: impl IntoIterator<Item = SubmitOutcome>) {
        self.submit_script
            .lock()
            .expect("script lock poisoned")
            .extend(outcomes);
    }

    /// 지금까지 제출된 주문 사본.
    pub fn submitted_orders(&self) -> Vec<OrderRequest> {
        self.submitted
            .lock()
            .expect("submitted lock poisoned")
            .clone()
    }

    /// 현재 장부 사본.
    pub fn book(&self) -> Vec<Position> {
        self.positions
            .lock()
            .expect("positions lock poisoned")
            .clone()
    }

    fn check_reachable(&self) -> VenueResult<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            self.connected.store(false, Ordering::SeqCst);
            return Err(VenueError::Network("mock venue unreachable".to_string()));
        }
        Ok(())
    }

    /// 체결을 장부에 반영하고 ack를 생성.
    fn fill(&self, order: &OrderRequest) -> OrderAck {
        let mut book = self.positions.lock().expect("positions lock poisoned");

        match order.position_ticket {
            // 청산: 대상 포지션 수량 차감, 전량이면 제거
            Some(ticket) => {
                if let Some(index) = book.iter().position(|p| p.ticket == ticket) {
                    if book[index].volume <= order.volume {
                        book.remove(index);
                    } else {
                        book[index].volume -= order.volume;
                    }
                }
                OrderAck {
                    retcode: retcode::DONE,
                    ticket,
                    comment: "closed".to_string(),
                }
            }
            // 진입: 새 티켓 발급
            None => {
                let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst);
                let side = match order.side {
                    Side::Buy => PositionSide::Long,
                    Side::Sell => PositionSide::Short,
                };
                book.push(Position::new(
                    ticket,
                    order.symbol.clone(),
                    side,
                    order.volume,
                    order.price,
                ));
                OrderAck {
                    retcode: retcode::DONE,
                    ticket,
                    comment: "opened".to_string(),
                }
            }
        }
    }
}

impl Default for MockVenue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VenueGateway for MockVenue {
    async fn connect(&self) -> VenueResult<()> {
        if self.connect_failures.load(Ordering::SeqCst) > 0 {
            self.connect_failures.fetch_sub(1, Ordering::SeqCst);
            return Err(VenueError::Network("mock connect failure".to_string()));
        }
        self.check_reachable()?;
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn positions(&self, symbol: Option<&str>) -> VenueResult<Vec<Position>> {
        self.check_reachable()?;
        let book = self.positions.lock().expect("positions lock poisoned");
        Ok(book
            .iter()
            .filter(|p| symbol.is_none_or(|s| p.symbol == s))
            .cloned()
            .collect())
    }

    async fn quote(&self, symbol: &str) -> VenueResult<Quote> {
        self.check_reachable()?;
        let quotes = self.quotes.lock().expect("quotes lock poisoned");
        Ok(quotes.get(symbol).copied().unwrap_or(self.default_quote))
    }

    async fn submit(&self, order: &OrderRequest) -> VenueResult<OrderAck> {
        self.check_reachable()?;

        let outcome = self
            .submit_script
            .lock()
            .expect("script lock poisoned")
            .pop_front();

        match outcome {
            Some(SubmitOutcome::Fail(err)) => Err(err),
            Some(SubmitOutcome::Hang) => {
                std::future::pending::<()>().await;
                unreachable!("pending future resolved")
            }
            Some(SubmitOutcome::Fill) | None => {
                self.submitted
                    .lock()
                    .expect("submitted lock poisoned")
                    .push(order.clone());
                Ok(self.fill(order))
            }
        }
    }

    async fn account_info(&self) -> VenueResult<AccountInfo> {
        self.check_reachable()?;
        Ok(AccountInfo {
            balance: Decimal::new(10000, 0),
            equity: Decimal::new(10000, 0),
            margin: Decimal::ZERO,
            free_margin: Decimal::new(10000, 0),
            profit: Decimal::ZERO,
        })
    }

    fn venue_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_open_then_close_updates_book() {
        let venue = MockVenue::new();
        venue.connect().await.unwrap();

        let open = OrderRequest::open("EURUSD", PositionSide::Long, dec!(0.5), dec!(1.1002), 20);
        let ack = venue.submit(&open).await.unwrap();
        assert_eq!(venue.book().len(), 1);

        let close = OrderRequest::close(
            "EURUSD",
            PositionSide::Long,
            ack.ticket,
            dec!(0.5),
            dec!(1.1000),
            20,
        );
        venue.submit(&close).await.unwrap();
        assert!(venue.book().is_empty());
    }

    #[tokio::test]
    async fn test_partial_close_reduces_volume() {
        let venue = MockVenue::new();
        venue.seed_position(Position::new(
            7,
            "EURUSD",
            PositionSide::Short,
            dec!(1.0),
            dec!(1.1),
        ));

        let close = OrderRequest::close("EURUSD", PositionSide::Short, 7, dec!(0.3), dec!(1.1), 20);
        venue.submit(&close).await.unwrap();

        let book = venue.book();
        assert_eq!(book.len(), 1);
        assert_eq!(book[0].volume, dec!(0.7));
    }

    #[tokio::test]
    async fn test_scripted_failure_then_fill() {
        let venue = MockVenue::new();
        venue.script_submits([SubmitOutcome::Fail(VenueError::Rejected {
            retcode: retcode::NO_MONEY,
            reason: "no money".to_string(),
        })]);

        let open = OrderRequest::open("EURUSD", PositionSide::Long, dec!(0.1), dec!(1.1), 20);
        assert!(venue.submit(&open).await.is_err());
        assert!(venue.submit(&open).await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_fails_everything() {
        let venue = MockVenue::new();
        venue.connect().await.unwrap();
        venue.set_unreachable(true);

        let err = venue.quote("EURUSD").await.unwrap_err();
        assert!(err.is_connectivity());
        assert!(!venue.is_connected());
    }

    #[tokio::test]
    async fn test_position_filter_by_symbol() {
        let venue = MockVenue::new();
        venue.seed_position(Position::new(
            1,
            "EURUSD",
            PositionSide::Long,
            dec!(0.1),
            dec!(1.1),
        ));
        venue.seed_position(Position::new(
            2,
            "GBPUSD",
            PositionSide::Long,
            dec!(0.2),
            dec!(1.3),
        ));

        let all = venue.positions(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let filtered = venue.positions(Some("GBPUSD")).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].ticket, 2);
    }
}
