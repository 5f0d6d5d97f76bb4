//! venue별 커넥터 구현.

pub mod mt5;
