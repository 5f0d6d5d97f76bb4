//! API 라우트.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub mod account;
pub mod health;
pub mod positions;
pub mod webhook;

/// API 라우터 구성.
///
/// `/trade`는 `/webhook`의 별칭입니다 (알림 서비스별 URL 설정 편의).
pub fn create_api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(webhook::handle_webhook))
        .route("/trade", post(webhook::handle_webhook))
        .route("/positions", get(positions::list_positions))
        .route("/close", post(positions::close_positions))
        .route("/account", get(account::account_info))
        .route("/health", get(health::health_check))
        .with_state(state)
}
