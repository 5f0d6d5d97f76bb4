//! MT5 터미널 게이트웨이 커넥터.

pub mod client;

pub use client::{Mt5Config, Mt5Gateway};
