//! 헬스 체크 라우트.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// 헬스 체크 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" 또는 "degraded"
    pub status: String,
    /// venue 이름
    pub venue: String,
    /// venue 세션 연결 상태
    pub connected: bool,
}

/// 서버/venue 상태 확인.
///
/// venue 세션이 끊겨 있어도 200을 반환합니다 — 서버 자체는 살아 있고,
/// `connected` 플래그로 venue 상태를 구분합니다.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "서버 상태", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let connected = state.venue.is_connected();
    Json(HealthResponse {
        status: if connected { "ok" } else { "degraded" }.to_string(),
        venue: state.venue.venue_name().to_string(),
        connected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use bridge_core::VenueGateway;
    use bridge_execution::{ExecutorConfig, OrderExecutor};
    use bridge_venue::MockVenue;

    fn state(venue: Arc<MockVenue>) -> Arc<AppState> {
        let executor = OrderExecutor::new(venue.clone(), ExecutorConfig::default());
        Arc::new(AppState {
            executor,
            venue: venue as Arc<dyn VenueGateway>,
            notifier: None,
            default_volume: dec!(0.01),
        })
    }

    #[tokio::test]
    async fn test_health_reflects_connection() {
        let venue = Arc::new(MockVenue::new());

        let Json(body) = health_check(State(state(venue.clone()))).await;
        assert_eq!(body.status, "degraded");
        assert!(!body.connected);

        venue.connect().await.unwrap();
        let Json(body) = health_check(State(state(venue))).await;
        assert_eq!(body.status, "ok");
        assert!(body.connected);
        assert_eq!(body.venue, "mock");
    }
}
