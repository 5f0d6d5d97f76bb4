//! 테스트/개발용 venue 구현.

pub mod mock;

pub use mock::MockVenue;
