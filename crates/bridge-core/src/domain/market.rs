//! 포지션/호가/계좌 스냅샷 타입.
//!
//! 모두 venue가 소유한 상태의 일시적 읽기 사본입니다.
//! 요청 간 캐싱하지 않습니다 — 조회 시점과 실행 시점 사이에
//! venue 측에서 언제든 변할 수 있습니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::intent::PositionSide;

/// 오픈 포지션 스냅샷.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Position {
    /// venue가 발급한 포지션 티켓 (고유 ID)
    pub ticket: u64,
    /// 심볼
    pub symbol: String,
    /// 방향 (Long/Short)
    pub side: PositionSide,
    /// 수량 (lot)
    pub volume: Decimal,
    /// 진입가
    pub open_price: Decimal,
    /// 현재가
    pub current_price: Decimal,
}

impl Position {
    /// 새 포지션 스냅샷 생성.
    pub fn new(
        ticket: u64,
        symbol: impl Into<String>,
        side: PositionSide,
        volume: Decimal,
        open_price: Decimal,
    ) -> Self {
        Self {
            ticket,
            symbol: symbol.into(),
            side,
            volume,
            open_price,
            current_price: open_price,
        }
    }
}

/// 호가 스냅샷 (bid/ask).
///
/// 주문 제출 직전에 조회하며, 네트워크 왕복을 사이에 둔
/// 다른 leg에 재사용하지 않습니다 (stale price 방지).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Quote {
    pub bid: Decimal,
    pub ask: Decimal,
}

impl Quote {
    /// 청산 체결가.
    ///
    /// Long 청산은 bid, Short 청산은 ask에 체결됩니다.
    pub fn close_price(&self, side: PositionSide) -> Decimal {
        match side {
            PositionSide::Long => self.bid,
            PositionSide::Short => self.ask,
        }
    }

    /// 진입 체결가.
    ///
    /// Long 진입은 ask, Short 진입은 bid에 체결됩니다.
    pub fn open_price(&self, side: PositionSide) -> Decimal {
        match side {
            PositionSide::Long => self.ask,
            PositionSide::Short => self.bid,
        }
    }
}

/// 계좌 정보 스냅샷.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AccountInfo {
    /// 잔고
    pub balance: Decimal,
    /// 평가 자산 (잔고 + 미실현 손익)
    pub equity: Decimal,
    /// 사용 증거금
    pub margin: Decimal,
    /// 가용 증거금
    pub free_margin: Decimal,
    /// 미실현 손익
    pub profit: Decimal,
}
