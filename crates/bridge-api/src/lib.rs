//! 웹훅 트레이딩 브릿지 API 서버.
//!
//! 외부 시그널 웹훅을 받아 실행 코어에 전달하고,
//! 포지션/계좌 조회와 헬스 체크 엔드포인트를 제공합니다.

pub mod config;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

pub use config::{BridgeConfig, ConfigError};
pub use state::AppState;
