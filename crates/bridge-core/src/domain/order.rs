//! 주문 요청/응답 타입.
//!
//! 모든 주문은 시장가이며, venue가 슬리피지 허용폭(deviation)을
//! 제출 시점에 검증합니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::intent::PositionSide;

/// 주문 방향 (매수/매도).
///
/// 포지션 방향([`PositionSide`])과 구분됩니다. Long 포지션을 청산하는
/// 주문의 방향은 `Sell`입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// 해당 방향의 포지션을 여는 주문 방향.
    pub fn opening(side: PositionSide) -> Self {
        match side {
            PositionSide::Long => Side::Buy,
            PositionSide::Short => Side::Sell,
        }
    }

    /// 해당 방향의 포지션을 닫는 주문 방향.
    pub fn closing(side: PositionSide) -> Self {
        match side {
            PositionSide::Long => Side::Sell,
            PositionSide::Short => Side::Buy,
        }
    }
}

/// MT5 trade retcode 상수.
///
/// venue가 주문 결과로 반환하는 코드 중 브릿지가 해석하는 값들입니다.
pub mod retcode {
    /// 주문 완료
    pub const DONE: u32 = 10009;
    /// 리쿼트 (가격 재제시)
    pub const REQUOTE: u32 = 10004;
    /// 주문 거부
    pub const REJECT: u32 = 10006;
    /// 유효하지 않은 수량
    pub const INVALID_VOLUME: u32 = 10014;
    /// 유효하지 않은 가격
    pub const INVALID_PRICE: u32 = 10015;
    /// 장 마감
    pub const MARKET_CLOSED: u32 = 10018;
    /// 증거금 부족
    pub const NO_MONEY: u32 = 10019;
}

/// 시장가 주문 요청.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// 심볼 (suffix 적용 전)
    pub symbol: String,
    /// 주문 방향
    pub side: Side,
    /// 수량 (lot)
    pub volume: Decimal,
    /// 제출 가격 (직전 호가에서 선택)
    pub price: Decimal,
    /// 슬리피지 허용폭 (포인트)
    pub deviation: u32,
    /// 청산 대상 포지션 티켓 (청산 주문인 경우)
    pub position_ticket: Option<u64>,
    /// 손절가 (진입 주문인 경우)
    pub stop_loss: Option<Decimal>,
    /// 익절가 (진입 주문인 경우)
    pub take_profit: Option<Decimal>,
    /// 주문 코멘트
    pub comment: String,
}

impl OrderRequest {
    /// 시장가 진입 주문 생성.
    pub fn open(
        symbol: impl Into<String>,
        side: PositionSide,
        volume: Decimal,
        price: Decimal,
        deviation: u32,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side: Side::opening(side),
            volume,
            price,
            deviation,
            position_ticket: None,
            stop_loss: None,
            take_profit: None,
            comment: String::new(),
        }
    }

    /// 특정 포지션 청산 주문 생성.
    pub fn close(
        symbol: impl Into<String>,
        position_side: PositionSide,
        ticket: u64,
        volume: Decimal,
        price: Decimal,
        deviation: u32,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side: Side::closing(position_side),
            volume,
            price,
            deviation,
            position_ticket: Some(ticket),
            stop_loss: None,
            take_profit: None,
            comment: String::new(),
        }
    }

    /// 손절가 설정.
    pub fn with_stop_loss(mut self, price: Option<Decimal>) -> Self {
        self.stop_loss = price;
        self
    }

    /// 익절가 설정.
    pub fn with_take_profit(mut self, price: Option<Decimal>) -> Self {
        self.take_profit = price;
        self
    }

    /// 코멘트 설정.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// venue의 주문 응답.
///
/// 커넥터는 `retcode == DONE`인 경우에만 `Ok(OrderAck)`를 반환하고,
/// 그 외에는 `VenueError::Rejected`로 매핑합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAck {
    /// venue retcode
    pub retcode: u32,
    /// 생성/청산된 주문 티켓
    pub ticket: u64,
    /// venue 코멘트
    pub comment: String,
}
