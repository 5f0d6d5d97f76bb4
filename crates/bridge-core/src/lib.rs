//! 브릿지 핵심 도메인 타입 및 거래 터미널 추상화.
//!
//! 이 crate는 다음을 제공합니다:
//! - 웹훅 신호의 정규화 결과인 `TradeIntent`
//! - 포지션/호가/계좌 스냅샷 타입
//! - 주문 요청/응답 타입 및 MT5 retcode 상수
//! - 거래 터미널(venue) 중립적인 `VenueGateway` trait
//!
//! I/O는 포함하지 않습니다. 커넥터 구현은 `bridge-venue`,
//! 리컨실/실행 로직은 `bridge-execution`에 있습니다.

pub mod domain;
pub mod venue;

// 주요 타입 재내보내기
pub use domain::intent::{
    max_volume, min_volume, normalize_volume, Direction, PositionSide, TradeIntent,
};
pub use domain::market::{AccountInfo, Position, Quote};
pub use domain::order::{retcode, OrderAck, OrderRequest, Side};
pub use domain::result::{ErrorKind, TradeResult};
pub use venue::{VenueError, VenueGateway, VenueResult};
