//! 포지션 리컨실.
//!
//! `(TradeIntent, 현재 포지션 스냅샷)`으로부터 순서 있는 leg 계획을
//! 산출하는 순수 함수입니다. venue 호출도, 시간 의존도 없습니다.
//!
//! 구조적 불변 조건:
//! - Close leg는 항상 Open leg보다 앞에 온다 (헤지 노출 방지)
//! - 요청당 Open leg는 최대 1개
//! - Close leg 수량 합계는 스냅샷 총 수량을 넘지 않는다

use rust_decimal::Decimal;

use bridge_core::{Direction, Position, PositionSide, TradeIntent};

/// leg 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegKind {
    /// Long 포지션 청산 (bid에 매도)
    CloseLong,
    /// Short 포지션 청산 (ask에 매수)
    CloseShort,
    /// Long 신규 진입 (ask에 매수)
    OpenLong,
    /// Short 신규 진입 (bid에 매도)
    OpenShort,
}

impl LegKind {
    /// 청산 leg 여부.
    pub fn is_close(&self) -> bool {
        matches!(self, LegKind::CloseLong | LegKind::CloseShort)
    }

    /// 이 leg가 다루는 포지션 방향.
    ///
    /// Close leg는 청산 대상 포지션의 방향, Open leg는 진입할 방향입니다.
    pub fn position_side(&self) -> PositionSide {
        match self {
            LegKind::CloseLong | LegKind::OpenLong => PositionSide::Long,
            LegKind::CloseShort | LegKind::OpenShort => PositionSide::Short,
        }
    }

    fn close_of(side: PositionSide) -> Self {
        match side {
            PositionSide::Long => LegKind::CloseLong,
            PositionSide::Short => LegKind::CloseShort,
        }
    }

    fn open_of(side: PositionSide) -> Self {
        match side {
            PositionSide::Long => LegKind::OpenLong,
            PositionSide::Short => LegKind::OpenShort,
        }
    }
}

/// 계획된 단일 leg.
///
/// Reconciler가 생성하고 Executor가 한 번 소비합니다. 영속화하지 않습니다.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub kind: LegKind,
    /// 청산 대상 포지션 티켓 (Close leg 전용)
    pub target_ticket: Option<u64>,
    pub volume: Decimal,
    /// 손절가 (Open leg 전용)
    pub stop_loss: Option<Decimal>,
    /// 익절가 (Open leg 전용)
    pub take_profit: Option<Decimal>,
}

impl Leg {
    fn close(position: &Position, volume: Decimal) -> Self {
        Self {
            kind: LegKind::close_of(position.side),
            target_ticket: Some(position.ticket),
            volume,
            stop_loss: None,
            take_profit: None,
        }
    }

    fn open(intent: &TradeIntent, side: PositionSide) -> Self {
        Self {
            kind: LegKind::open_of(side),
            target_ticket: None,
            volume: intent.volume,
            stop_loss: intent.stop_loss,
            take_profit: intent.take_profit,
        }
    }
}

/// leg 계획.
#[derive(Debug, Clone, PartialEq)]
pub struct LegPlan {
    /// 실행 순서대로 정렬된 leg (Close 먼저, Open 마지막)
    pub legs: Vec<Leg>,
    /// CloseOnly 요청에서 가용 수량이 부족했던 만큼 (부분 체결 경고용)
    pub shortfall: Option<Decimal>,
}

/// 의도와 포지션 스냅샷으로부터 leg 계획 산출.
///
/// `positions`는 해당 심볼의 스냅샷이어야 하며, 순서가 그대로
/// 청산 순서가 됩니다.
pub fn plan_legs(intent: &TradeIntent, positions: &[Position]) -> LegPlan {
    match intent.direction {
        Direction::CloseOnly => plan_close_only(intent, positions),
        Direction::Buy | Direction::Sell => plan_directional(intent, positions),
    }
}

/// CloseOnly: 요청 수량만큼 스냅샷 순서대로 청산. 마지막 포지션은
/// 부분 청산될 수 있음. 가용 수량 부족은 에러가 아니라 shortfall.
fn plan_close_only(intent: &TradeIntent, positions: &[Position]) -> LegPlan {
    let mut legs = Vec::new();
    let mut remaining = intent.volume;

    for position in positions {
        if remaining <= Decimal::ZERO {
            break;
        }
        if intent
            .close_side
            .is_some_and(|side| position.side != side)
        {
            continue;
        }
        let close_volume = remaining.min(position.volume);
        legs.push(Leg::close(position, close_volume));
        remaining -= close_volume;
    }

    LegPlan {
        legs,
        shortfall: (remaining > Decimal::ZERO).then_some(remaining),
    }
}

/// Buy/Sell: `close_existing`이면 반대 방향 포지션을 전량, 스냅샷
/// 순서대로 청산한 뒤 요청 수량으로 1개의 Open leg를 계획.
fn plan_directional(intent: &TradeIntent, positions: &[Position]) -> LegPlan {
    // Buy/Sell에서 open_side는 항상 Some
    let Some(open_side) = intent.direction.open_side() else {
        return LegPlan {
            legs: Vec::new(),
            shortfall: None,
        };
    };

    let mut legs = Vec::new();

    if intent.close_existing {
        let opposite = open_side.opposite();
        for position in positions.iter().filter(|p| p.side == opposite) {
            legs.push(Leg::close(position, position.volume));
        }
    }

    legs.push(Leg::open(intent, open_side));

    LegPlan {
        legs,
        shortfall: None,
    }
}
