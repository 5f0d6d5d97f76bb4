//! 브릿지 설정.
//!
//! 모든 설정은 환경 변수에서 읽습니다 (`.env` 파일 지원).

use std::net::SocketAddr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

/// 설정 로드 에러.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 필수 환경 변수 누락
    #[error("필수 환경 변수 누락: {0}")]
    Missing(&'static str),

    /// 환경 변수 값 파싱 실패
    #[error("환경 변수 {name} 값이 유효하지 않음: {value}")]
    Invalid { name: &'static str, value: String },
}

/// 브릿지 전체 설정.
pub struct BridgeConfig {
    /// API 바인딩 호스트
    pub api_host: String,
    /// API 바인딩 포트
    pub api_port: u16,
    /// MT5 터미널 게이트웨이 base URL
    pub gateway_url: String,
    /// MT5 계정 번호
    pub account: i64,
    /// MT5 비밀번호
    pub password: SecretString,
    /// MT5 서버 이름
    pub server: String,
    /// 브로커 심볼 suffix
    pub symbol_suffix: String,
    /// 수량 미지정 시 기본 수량 (lot)
    pub default_volume: Decimal,
    /// 슬리피지 허용폭 (포인트)
    pub deviation: u32,
    /// venue 호출 타임아웃
    pub venue_timeout: Duration,
}

impl std::fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("api_host", &self.api_host)
            .field("api_port", &self.api_port)
            .field("gateway_url", &self.gateway_url)
            .field("account", &self.account)
            .field("password", &"***")
            .field("server", &self.server)
            .field("symbol_suffix", &self.symbol_suffix)
            .field("default_volume", &self.default_volume)
            .field("deviation", &self.deviation)
            .field("venue_timeout", &self.venue_timeout)
            .finish()
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

impl BridgeConfig {
    /// 환경 변수에서 설정 로드.
    ///
    /// # Errors
    ///
    /// `MT5_ACCOUNT`, `MT5_PASSWORD`, `MT5_SERVER`가 없거나
    /// 숫자 변수의 파싱이 실패하면 에러를 반환합니다.
    pub fn from_env() -> Result<Self, ConfigError> {
        let account = required("MT5_ACCOUNT")?;
        let account = account
            .parse::<i64>()
            .map_err(|_| ConfigError::Invalid {
                name: "MT5_ACCOUNT",
                value: account,
            })?;

        Ok(Self {
            api_host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: parsed("API_PORT", 5000)?,
            gateway_url: std::env::var("MT5_GATEWAY_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:6542".to_string()),
            account,
            password: SecretString::from(required("MT5_PASSWORD")?),
            server: required("MT5_SERVER")?,
            symbol_suffix: std::env::var("MT5_SYMBOL_SUFFIX").unwrap_or_default(),
            default_volume: parsed("DEFAULT_VOLUME", Decimal::new(1, 2))?,
            deviation: parsed("ORDER_DEVIATION", 20)?,
            venue_timeout: Duration::from_secs(parsed("VENUE_TIMEOUT_SECS", 5u64)?),
        })
    }

    /// 소켓 주소 반환.
    ///
    /// # Errors
    ///
    /// `host:port` 형식이 유효하지 않으면 `AddrParseError`를 반환합니다.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.api_host, self.api_port).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_masks_password() {
        let config = BridgeConfig {
            api_host: "0.0.0.0".to_string(),
            api_port: 5000,
            gateway_url: "http://127.0.0.1:6542".to_string(),
            account: 12345,
            password: SecretString::from("hunter2".to_string()),
            server: "Demo".to_string(),
            symbol_suffix: String::new(),
            default_volume: Decimal::new(1, 2),
            deviation: 20,
            venue_timeout: Duration::from_secs(5),
        };

        let debug = format!("{config:?}");
        assert!(debug.contains("***"));
        assert!(!debug.contains("hunter2"));
    }
}
