//! 거래 의도(TradeIntent) 타입.
//!
//! 웹훅 페이로드를 정규화한 결과입니다. 생성 이후 불변이며,
//! 수량(volume)은 항상 lot 단위로 소수점 2자리 반올림,
//! `[0.01, 100.0]` 범위로 검증된 상태입니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 거래 방향.
///
/// `CloseOnly`는 신규 진입 없이 기존 포지션만 청산하는 요청입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Direction {
    Buy,
    Sell,
    CloseOnly,
}

impl Direction {
    /// 신규 진입 시 생성될 포지션 방향.
    ///
    /// `CloseOnly`는 진입이 없으므로 `None`을 반환합니다.
    pub fn open_side(&self) -> Option<PositionSide> {
        match self {
            Direction::Buy => Some(PositionSide::Long),
            Direction::Sell => Some(PositionSide::Short),
            Direction::CloseOnly => None,
        }
    }
}

/// 포지션 방향 (Long/Short).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// 반대 방향.
    pub fn opposite(&self) -> Self {
        match self {
            PositionSide::Long => PositionSide::Short,
            PositionSide::Short => PositionSide::Long,
        }
    }
}

/// 수량 하한 (lot).
pub fn min_volume() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

/// 수량 상한 (lot).
pub fn max_volume() -> Decimal {
    Decimal::new(100, 0)
}

/// 수량 정규화.
///
/// 소수점 2자리로 반올림 후 `[0.01, 100.0]` 범위를 검증합니다.
/// 범위를 벗어나면 `None`을 반환합니다. 이미 정규화된 값에 다시
/// 적용해도 같은 값이 나옵니다 (멱등성).
pub fn normalize_volume(value: Decimal) -> Option<Decimal> {
    let rounded = value.round_dp(2);
    if rounded < min_volume() || rounded > max_volume() {
        return None;
    }
    Some(rounded)
}

/// 거래 의도.
///
/// Signal Normalizer가 생성하고 Position Reconciler가 소비합니다.
/// 요청 단위로 생성되며 생성 이후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TradeIntent {
    /// 심볼 (대문자, 공백 제거됨. 예: "EURUSD")
    pub symbol: String,
    /// 거래 방향
    pub direction: Direction,
    /// 수량 (lot, 2자리 반올림, 0.01 ~ 100.0)
    pub volume: Decimal,
    /// 손절가 (선택)
    pub stop_loss: Option<Decimal>,
    /// 익절가 (선택)
    pub take_profit: Option<Decimal>,
    /// 진입 전 반대 포지션 청산 여부 (기본 true)
    pub close_existing: bool,
    /// CloseOnly 요청의 방향 필터 (선택)
    pub close_side: Option<PositionSide>,
}

impl TradeIntent {
    /// 새 거래 의도 생성.
    ///
    /// `volume`은 이미 정규화된 값이어야 합니다 ([`normalize_volume`] 참조).
    pub fn new(symbol: impl Into<String>, direction: Direction, volume: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            direction,
            volume,
            stop_loss: None,
            take_profit: None,
            close_existing: true,
            close_side: None,
        }
    }

    /// 손절가 설정.
    pub fn with_stop_loss(mut self, price: Decimal) -> Self {
        self.stop_loss = Some(price);
        self
    }

    /// 익절가 설정.
    pub fn with_take_profit(mut self, price: Decimal) -> Self {
        self.take_profit = Some(price);
        self
    }

    /// 반대 포지션 청산 여부 설정.
    pub fn with_close_existing(mut self, close_existing: bool) -> Self {
        self.close_existing = close_existing;
        self
    }

    /// CloseOnly 방향 필터 설정.
    pub fn with_close_side(mut self, side: PositionSide) -> Self {
        self.close_side = Some(side);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_volume_rounding() {
        assert_eq!(normalize_volume(dec!(0.123)), Some(dec!(0.12)));
        assert_eq!(normalize_volume(dec!(1)), Some(dec!(1.00)));
    }

    #[test]
    fn test_normalize_volume_idempotent() {
        // 이미 정규화된 값은 다시 정규화해도 동일
        let once = normalize_volume(dec!(0.37)).unwrap();
        assert_eq!(normalize_volume(once), Some(once));
    }

    #[test]
    fn test_normalize_volume_bounds() {
        assert_eq!(normalize_volume(dec!(0)), None);
        assert_eq!(normalize_volume(dec!(-1)), None);
        assert_eq!(normalize_volume(dec!(0.005)), None); // 반올림 후 0.00 < 0.01
        assert_eq!(normalize_volume(dec!(100.001)), Some(dec!(100.00)));
        assert_eq!(normalize_volume(dec!(100.01)), None);
    }

    #[test]
    fn test_direction_open_side() {
        assert_eq!(Direction::Buy.open_side(), Some(PositionSide::Long));
        assert_eq!(Direction::Sell.open_side(), Some(PositionSide::Short));
        assert_eq!(Direction::CloseOnly.open_side(), None);
    }

    #[test]
    fn test_intent_builder() {
        let intent = TradeIntent::new("EURUSD", Direction::Buy, dec!(0.5))
            .with_stop_loss(dec!(1.05))
            .with_close_existing(false);
        assert_eq!(intent.symbol, "EURUSD");
        assert_eq!(intent.stop_loss, Some(dec!(1.05)));
        assert!(!intent.close_existing);
        assert_eq!(intent.take_profit, None);
    }
}
