//! 공유 애플리케이션 상태.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::warn;

use bridge_core::{TradeResult, VenueGateway};
use bridge_execution::OrderExecutor;
use bridge_notification::{Notification, NotificationSender};

/// 모든 핸들러가 공유하는 상태.
///
/// venue 세션은 시작 시 한 번 만들어지는 공유 자원이며,
/// 실행기가 심볼별 직렬화를 담당합니다.
pub struct AppState {
    pub executor: OrderExecutor,
    pub venue: Arc<dyn VenueGateway>,
    pub notifier: Option<Arc<dyn NotificationSender>>,
    pub default_volume: Decimal,
}

impl AppState {
    /// 거래 결과 알림을 백그라운드로 전송.
    ///
    /// 알림 실패는 로그로만 남기고 응답 경로에 영향을 주지 않습니다.
    pub fn notify_trade(&self, symbol: &str, result: &TradeResult) {
        let Some(notifier) = self.notifier.clone() else {
            return;
        };
        let notification = Notification::from_trade(symbol, result);
        tokio::spawn(async move {
            if let Err(e) = notifier.send(&notification).await {
                warn!(sender = notifier.name(), error = %e, "거래 알림 전송 실패");
            }
        });
    }
}
