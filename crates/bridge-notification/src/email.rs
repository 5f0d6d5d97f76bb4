//! 이메일 알림 서비스.
//!
//! SMTP를 통해 거래 체결/실패 및 venue 장애 알림을 전송합니다.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, info};

use crate::types::{
    Notification, NotificationError, NotificationEvent, NotificationResult, NotificationSender,
};

/// 이메일 알림 전송 설정.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP 서버 호스트
    pub smtp_host: String,
    /// SMTP 서버 포트
    pub smtp_port: u16,
    /// TLS 사용 여부
    pub use_tls: bool,
    /// SMTP 사용자명
    pub username: String,
    /// SMTP 비밀번호
    pub password: String,
    /// 발신자 이메일 주소
    pub from_email: String,
    /// 수신자 이메일 주소 목록
    pub to_emails: Vec<String>,
    /// 전송 활성화 여부
    pub enabled: bool,
}

impl EmailConfig {
    /// 환경 변수에서 설정을 생성합니다.
    ///
    /// 필수 변수가 하나라도 없으면 `None`을 반환하며,
    /// 이 경우 브릿지는 알림 없이 동작합니다.
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("EMAIL_SMTP_HOST").ok()?;
        let smtp_port = std::env::var("EMAIL_SMTP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(587);
        let username = std::env::var("EMAIL_USERNAME").ok()?;
        let password = std::env::var("EMAIL_PASSWORD").ok()?;
        let from_email = std::env::var("EMAIL_FROM").ok()?;
        let to_emails: Vec<String> = std::env::var("EMAIL_TO")
            .ok()?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let enabled = std::env::var("EMAIL_ENABLED")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(true);

        Some(Self {
            smtp_host,
            smtp_port,
            use_tls: true,
            username,
            password,
            from_email,
            to_emails,
            enabled,
        })
    }
}

/// 이메일 알림 전송기.
pub struct EmailSender {
    config: EmailConfig,
}

impl EmailSender {
    /// 새 이메일 전송기를 생성합니다.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// 환경 변수에서 전송기를 생성합니다.
    pub fn from_env() -> Option<Self> {
        EmailConfig::from_env().map(Self::new)
    }

    fn format_subject(&self, notification: &Notification) -> String {
        match &notification.event {
            NotificationEvent::TradeExecuted { symbol, .. } => {
                format!("[TRADE] 체결 완료: {symbol}")
            }
            NotificationEvent::TradeFailed { symbol, result } => {
                format!(
                    "[ALERT] 거래 실패: {symbol} ({:?})",
                    result.error_kind
                )
            }
            NotificationEvent::VenueDisconnected { venue, .. } => {
                format!("[CRITICAL] venue 연결 장애: {venue}")
            }
        }
    }

    fn format_body(&self, notification: &Notification) -> String {
        let content = match &notification.event {
            NotificationEvent::TradeExecuted { symbol, result } => {
                format!(
                    "<h2 style=\"color: #28a745;\">체결 완료</h2>\
                     <p><strong>심볼:</strong> <code>{}</code></p>\
                     <p><strong>청산 티켓:</strong> {:?}</p>\
                     <p><strong>진입 티켓:</strong> {}</p>\
                     <p>{}</p>",
                    symbol,
                    result.closed_tickets,
                    result
                        .opened_ticket
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    result.message
                )
            }
            NotificationEvent::TradeFailed { symbol, result } => {
                format!(
                    "<h2 style=\"color: #dc3545;\">거래 실패</h2>\
                     <p><strong>심볼:</strong> <code>{}</code></p>\
                     <p><strong>분류:</strong> {:?}</p>\
                     <p><strong>청산된 티켓:</strong> {:?}</p>\
                     <p>{}</p>",
                    symbol, result.error_kind, result.closed_tickets, result.message
                )
            }
            NotificationEvent::VenueDisconnected { venue, reason } => {
                format!(
                    "<h2 style=\"color: #dc3545;\">venue 연결 장애</h2>\
                     <p><strong>venue:</strong> {venue}</p>\
                     <p>{reason}</p>"
                )
            }
        };

        let timestamp = notification.timestamp.format("%Y-%m-%d %H:%M:%S UTC");
        format!(
            "<!DOCTYPE html><html><body style=\"font-family: sans-serif;\">\
             {content}\
             <hr><p style=\"color: #666; font-size: 12px;\">Webhook Trading Bridge — {timestamp}</p>\
             </body></html>"
        )
    }

    async fn send_email(&self, subject: &str, html_body: &str) -> NotificationResult<()> {
        let from_mailbox: Mailbox = self.config.from_email.parse().map_err(|e| {
            NotificationError::InvalidConfig(format!("잘못된 발신자 주소: {e}"))
        })?;

        let creds = Credentials::new(self.config.username.clone(), self.config.password.clone());

        let mailer: AsyncSmtpTransport<Tokio1Executor> = if self.config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
                .map_err(|e| NotificationError::SendFailed(format!("SMTP 연결 실패: {e}")))?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        for to_email in &self.config.to_emails {
            let to_mailbox: Mailbox = to_email.parse().map_err(|e| {
                NotificationError::InvalidConfig(format!("잘못된 수신자 주소: {e}"))
            })?;

            let email = Message::builder()
                .from(from_mailbox.clone())
                .to(to_mailbox)
                .subject(subject)
                .header(ContentType::TEXT_HTML)
                .body(html_body.to_string())
                .map_err(|e| NotificationError::SendFailed(format!("이메일 생성 실패: {e}")))?;

            mailer
                .send(email)
                .await
                .map_err(|e| NotificationError::SendFailed(format!("이메일 전송 실패: {e}")))?;

            debug!(to = %to_email, "알림 이메일 전송");
        }

        Ok(())
    }
}

#[async_trait]
impl NotificationSender for EmailSender {
    async fn send(&self, notification: &Notification) -> NotificationResult<()> {
        if !self.config.enabled {
            debug!("이메일 알림 비활성화 상태, 전송 생략");
            return Ok(());
        }

        let subject = self.format_subject(notification);
        let body = self.format_body(notification);
        self.send_email(&subject, &body).await?;

        info!(subject = %subject, "알림 이메일 전송 완료");
        Ok(())
    }

    fn name(&self) -> &str {
        "email"
    }
}
