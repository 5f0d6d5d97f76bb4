//! 도메인 타입 모듈.

pub mod intent;
pub mod market;
pub mod order;
pub mod result;
