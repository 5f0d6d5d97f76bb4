//! venue 커넥터 모음.
//!
//! 이 crate는 다음을 제공합니다:
//! - MT5 터미널 게이트웨이 HTTP 커넥터 (`connector::mt5`)
//! - 테스트/개발용 인메모리 mock venue (`provider::MockVenue`)
//! - connect/login 전용 재시도 유틸리티 (`retry`)
//!
//! 모든 커넥터는 `bridge_core::VenueGateway`를 구현합니다.

pub mod connector;
pub mod provider;
pub mod retry;

pub use connector::mt5::{Mt5Config, Mt5Gateway};
pub use provider::mock::{MockVenue, SubmitOutcome};
pub use retry::{connect_with_retry, RetryConfig};
