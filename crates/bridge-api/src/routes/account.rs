//! 계좌 조회 라우트.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use bridge_core::AccountInfo;

use crate::error::{venue_error_response, ApiErrorResponse};
use crate::state::AppState;

/// 계좌 정보 조회.
#[utoipa::path(
    get,
    path = "/account",
    tag = "account",
    responses(
        (status = 200, description = "계좌 조회 성공", body = AccountInfo),
        (status = 503, description = "venue 연결 불가", body = ApiErrorResponse)
    )
)]
pub async fn account_info(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AccountInfo>, (StatusCode, Json<ApiErrorResponse>)> {
    let account = state
        .venue
        .account_info()
        .await
        .map_err(|e| venue_error_response(&e))?;
    Ok(Json(account))
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
    async fn test_account_info() {
        let venue = Arc::new(MockVenue::new());
        let Json(account) = account_info(State(state(venue))).await.unwrap();
        assert_eq!(account.balance, dec!(10000));
    }

    #[tokio::test]
    async fn test_account_info_gateway_down() {
        let venue = Arc::new(MockVenue::new());
        venue.set_unreachable(true);

        let (status, _) = account_info(State(state(venue))).await.unwrap_err();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
