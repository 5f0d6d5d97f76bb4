//! 알림 타입 정의.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use bridge_core::TradeResult;

/// 알림 전송 결과 타입 별칭.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// 알림 전송 에러.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// 설정 오류 (잘못된 주소 등)
    #[error("알림 설정 오류: {0}")]
    InvalidConfig(String),

    /// 전송 실패
    #[error("알림 전송 실패: {0}")]
    SendFailed(String),
}

/// 알림 이벤트.
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    /// 거래 요청 처리 완료 (성공)
    TradeExecuted {
        symbol: String,
        result: TradeResult,
    },
    /// 거래 요청 처리 실패
    TradeFailed {
        symbol: String,
        result: TradeResult,
    },
    /// venue 연결 장애
    VenueDisconnected { venue: String, reason: String },
}

/// 전송할 알림.
#[derive(Debug, Clone)]
pub struct Notification {
    pub event: NotificationEvent,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(event: NotificationEvent) -> Self {
        Self {
            event,
            timestamp: Utc::now(),
        }
    }

    /// 거래 결과로부터 알림 생성. 성공/실패에 따라 이벤트가 갈립니다.
    pub fn from_trade(symbol: impl Into<String>, result: &TradeResult) -> Self {
        let symbol = symbol.into();
        let event = if result.success {
            NotificationEvent::TradeExecuted {
                symbol,
                result: result.clone(),
            }
        } else {
            NotificationEvent::TradeFailed {
                symbol,
                result: result.clone(),
            }
        };
        Self::new(event)
    }
}

/// 알림 전송기 trait.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// 알림 전송.
    async fn send(&self, notification: &Notification) -> NotificationResult<()>;

    /// 전송기 이름 (로깅용).
    fn name(&self) -> &str;
}
