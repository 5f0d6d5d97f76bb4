//! 실행 코어.
//!
//! 웹훅 페이로드가 주문이 되기까지의 전 과정을 담당합니다:
//!
//! 1. [`normalizer`] — 이기종 페이로드를 [`bridge_core::TradeIntent`]로 정규화
//! 2. [`reconciler`] — 의도와 현재 포지션으로부터 순서 있는 leg 계획 산출
//! 3. [`executor`] — leg를 venue에 제출하고 결과를 집계
//!
//! 동일 심볼에 대한 요청은 [`symbol_lock`]으로 직렬화됩니다.

pub mod executor;
pub mod normalizer;
pub mod reconciler;
pub mod symbol_lock;

pub use executor::{ExecutorConfig, OrderExecutor, RequestPhase};
pub use normalizer::{normalize, NormalizeError};
pub use reconciler::{plan_legs, Leg, LegKind, LegPlan};
pub use symbol_lock::SymbolLocks;
