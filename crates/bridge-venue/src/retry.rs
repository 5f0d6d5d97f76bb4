//! 연결 재시도 유틸리티.
//!
//! 주문 제출은 절대 재시도하지 않습니다 (중복 체결 위험).
//! 재시도 대상은 connect/login 뿐이며, 지수 백오프로 간격을 늘립니다.

use std::time::Duration;

use tracing::{info, warn};

use bridge_core::{VenueError, VenueGateway, VenueResult};

/// 연결 재시도 설정.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// 최대 재시도 횟수 (최초 시도 제외)
    pub max_retries: u32,
    /// 첫 재시도 전 대기 시간
    pub base_delay: Duration,
    /// 대기 시간 상한
    pub max_delay: Duration,
    /// 백오프 배수
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// `attempt`번째 재시도 전 대기 시간 (0부터 시작).
    fn delay_for(&self, attempt: u32) -> Duration {
        let millis = self.base_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis(millis as u64).min(self.max_delay)
    }
}

/// venue 연결을 백오프와 함께 재시도.
///
/// 연결 계층 에러(`is_retryable`)만 재시도하고, 인증 실패 등은
/// 즉시 반환합니다.
///
/// # Errors
///
/// 재시도 한도 소진 시 마지막 에러를 반환합니다.
pub async fn connect_with_retry(
    gateway: &dyn VenueGateway,
    config: &RetryConfig,
) -> VenueResult<()> {
    let mut last_error: Option<VenueError> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let delay = config.delay_for(attempt - 1);
            warn!(
                venue = gateway.venue_name(),
                attempt,
                max_retries = config.max_retries,
                delay_ms = delay.as_millis() as u64,
                "venue 연결 재시도 대기"
            );
            tokio::time::sleep(delay).await;
        }

        match gateway.connect().await {
            Ok(()) => {
                if attempt > 0 {
                    info!(venue = gateway.venue_name(), attempt, "venue 연결 복구");
                }
                return Ok(());
            }
            Err(e) if e.is_retryable() => {
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or(VenueError::NotConnected))
}
