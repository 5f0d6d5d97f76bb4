//! 알림 서비스.
//!
//! 거래 체결/실패와 venue 연결 장애를 이메일로 통지합니다.
//! 알림 실패는 로그로만 남기고 절대 거래 경로로 전파하지 않습니다.

pub mod email;
pub mod types;

pub use email::{EmailConfig, EmailSender};
pub use types::{
    Notification, NotificationError, NotificationEvent, NotificationResult, NotificationSender,
};
