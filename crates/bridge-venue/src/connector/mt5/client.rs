//! MT5 터미널 게이트웨이 HTTP 클라이언트.
//!
//! MetaTrader 5 터미널 옆에서 실행되는 게이트웨이 프로세스의
//! JSON API를 호출합니다 (login / positions / tick / order_send / account).
//! 모든 호출에 고정 타임아웃이 걸려 있으며, 타임아웃·연결 실패는
//! `VenueError`의 연결 계층 에러로 매핑되어 세션 플래그를 해제합니다.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use bridge_core::{
    retcode, AccountInfo, OrderAck, OrderRequest, Position, PositionSide, Quote, Side, VenueError,
    VenueGateway, VenueResult,
};

// ============================================================================
// 설정
// ============================================================================

/// MT5 게이트웨이 연결 설정.
#[derive(Clone)]
pub struct Mt5Config {
    /// 게이트웨이 base URL (예: "http://127.0.0.1:6542")
    pub base_url: String,
    /// MT5 계정 번호
    pub account: i64,
    /// MT5 비밀번호
    pub password: SecretString,
    /// MT5 서버 이름 (예: "MetaQuotes-Demo")
    pub server: String,
    /// 브로커별 심볼 suffix (예: ".r" → "EURUSD.r")
    pub symbol_suffix: String,
    /// venue 호출 타임아웃
    pub timeout: Duration,
}

impl std::fmt::Debug for Mt5Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mt5Config")
            .field("base_url", &self.base_url)
            .field("account", &self.account)
            .field("password", &"***")
            .field("server", &self.server)
            .field("symbol_suffix", &self.symbol_suffix)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Mt5Config {
    pub fn new(
        base_url: impl Into<String>,
        account: i64,
        password: SecretString,
        server: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            account,
            password,
            server: server.into(),
            symbol_suffix: String::new(),
            timeout: Duration::from_secs(5),
        }
    }

    /// 심볼 suffix 설정.
    pub fn with_symbol_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.symbol_suffix = suffix.into();
        self
    }

    /// 호출 타임아웃 설정.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ============================================================================
// 게이트웨이 wire 타입
// ============================================================================

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    account: i64,
    password: &'a str,
    server: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// 게이트웨이 포지션 응답. `type`: 0 = buy(Long), 1 = sell(Short).
#[derive(Debug, Deserialize)]
struct GatewayPosition {
    ticket: u64,
    symbol: String,
    #[serde(rename = "type")]
    position_type: u8,
    volume: Decimal,
    price_open: Decimal,
    price_current: Decimal,
}

#[derive(Debug, Deserialize)]
struct GatewayTick {
    bid: Decimal,
    ask: Decimal,
}

/// order_send 요청. MT5 `TRADE_ACTION_DEAL` 시장가 주문 형식
/// (GTC + fill-or-kill)을 그대로 따릅니다.
#[derive(Debug, Serialize)]
struct OrderSendRequest<'a> {
    action: &'static str,
    symbol: &'a str,
    volume: Decimal,
    #[serde(rename = "type")]
    order_type: u8,
    price: Decimal,
    deviation: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sl: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tp: Option<Decimal>,
    comment: &'a str,
    type_time: &'static str,
    type_filling: &'static str,
}

#[derive(Debug, Deserialize)]
struct OrderSendResponse {
    retcode: u32,
    #[serde(default)]
    order: u64,
    #[serde(default)]
    comment: String,
}

#[derive(Debug, Deserialize)]
struct GatewayAccount {
    balance: Decimal,
    equity: Decimal,
    margin: Decimal,
    margin_free: Decimal,
    profit: Decimal,
}

// ============================================================================
// MT5 게이트웨이 클라이언트
// ============================================================================

/// MT5 터미널 게이트웨이 클라이언트.
///
/// 하나의 인증된 세션을 나타내는 공유 자원입니다. `reqwest::Client`가
/// 내부적으로 커넥션 풀을 관리하므로 호출 표면은 동시 사용에 안전합니다.
pub struct Mt5Gateway {
    client: Client,
    config: Mt5Config,
    connected: AtomicBool,
}

impl Mt5Gateway {
    /// 새 게이트웨이 클라이언트 생성.
    ///
    /// # Errors
    ///
    /// HTTP 클라이언트 초기화 실패 시 `VenueError::Api`를 반환합니다.
    pub fn new(config: Mt5Config) -> VenueResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| VenueError::Api(format!("HTTP 클라이언트 생성 실패: {e}")))?;

        Ok(Self {
            client,
            config,
            connected: AtomicBool::new(false),
        })
    }

    /// 브로커 suffix가 적용된 venue 심볼.
    fn venue_symbol(&self, symbol: &str) -> String {
        format!("{}{}", symbol, self.config.symbol_suffix)
    }

    /// venue 심볼에서 suffix를 제거한 정규 심볼.
    fn canonical_symbol(&self, venue_symbol: &str) -> String {
        match venue_symbol.strip_suffix(self.config.symbol_suffix.as_str()) {
            Some(stripped) if !self.config.symbol_suffix.is_empty() => stripped.to_string(),
            _ => venue_symbol.to_string(),
        }
    }

    /// 전송 계층 에러 매핑.
    ///
    /// 연결 실패/타임아웃은 세션 플래그를 해제합니다.
    fn map_transport_error(&self, e: reqwest::Error) -> VenueError {
        self.connected.store(false, Ordering::SeqCst);
        if e.is_timeout() {
            VenueError::Timeout(e.to_string())
        } else {
            VenueError::Network(e.to_string())
        }
    }

    async fn request<T: for<'de> Deserialize<'de>>(
        &self,
        method: Method,
        endpoint: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<&serde_json::Value>,
    ) -> VenueResult<T> {
        let url = format!("{}{}", self.config.base_url, endpoint);
        let mut builder = self.client.request(method, &url);

        if let Some(q) = query {
            builder = builder.query(q);
        }
        if let Some(b) = body {
            builder = builder.json(b);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::NOT_FOUND => VenueError::UnknownSymbol(error_text),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    VenueError::Authentication(error_text)
                }
                _ => VenueError::Api(format!("게이트웨이 응답 {status}: {error_text}")),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| VenueError::Parse(e.to_string()))
    }
}

#[async_trait]
impl VenueGateway for Mt5Gateway {
    async fn connect(&self) -> VenueResult<()> {
        let body = serde_json::to_value(LoginRequest {
            account: self.config.account,
            password: self.config.password.expose_secret(),
            server: &self.config.server,
        })
        .map_err(|e| VenueError::Parse(e.to_string()))?;

        let resp: LoginResponse = self
            .request(Method::POST, "/login", None, Some(&body))
            .await?;

        if !resp.success {
            let reason = resp.message.unwrap_or_else(|| "로그인 거부".to_string());
            warn!(account = self.config.account, %reason, "MT5 로그인 실패");
            return Err(VenueError::Authentication(reason));
        }

        self.connected.store(true, Ordering::SeqCst);
        info!(
            account = self.config.account,
            server = %self.config.server,
            "MT5 게이트웨이 연결 완료"
        );
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn positions(&self, symbol: Option<&str>) -> VenueResult<Vec<Position>> {
        let venue_symbol = symbol.map(|s| self.venue_symbol(s));
        let query: Vec<(&str, &str)> = match venue_symbol.as_deref() {
            Some(s) => vec![("symbol", s)],
            None => Vec::new(),
        };

        let rows: Vec<GatewayPosition> = self
            .request(Method::GET, "/positions", Some(&query), None)
            .await?;

        let positions = rows
            .into_iter()
            .map(|row| Position {
                ticket: row.ticket,
                symbol: self.canonical_symbol(&row.symbol),
                side: if row.position_type == 0 {
                    PositionSide::Long
                } else {
                    PositionSide::Short
                },
                volume: row.volume,
                open_price: row.price_open,
                current_price: row.price_current,
            })
            .collect();

        Ok(positions)
    }

    async fn quote(&self, symbol: &str) -> VenueResult<Quote> {
        let venue_symbol = self.venue_symbol(symbol);
        let tick: GatewayTick = self
            .request(
                Method::GET,
                "/tick",
                Some(&[("symbol", venue_symbol.as_str())]),
                None,
            )
            .await?;

        Ok(Quote {
            bid: tick.bid,
            ask: tick.ask,
        })
    }

    async fn submit(&self, order: &OrderRequest) -> VenueResult<OrderAck> {
        let venue_symbol = self.venue_symbol(&order.symbol);
        let body = serde_json::to_value(OrderSendRequest {
            action: "DEAL",
            symbol: &venue_symbol,
            volume: order.volume,
            order_type: match order.side {
                Side::Buy => 0,
                Side::Sell => 1,
            },
            price: order.price,
            deviation: order.deviation,
            position: order.position_ticket,
            sl: order.stop_loss,
            tp: order.take_profit,
            comment: &order.comment,
            type_time: "GTC",
            type_filling: "FOK",
        })
        .map_err(|e| VenueError::Parse(e.to_string()))?;

        let resp: OrderSendResponse = self
            .request(Method::POST, "/order_send", None, Some(&body))
            .await?;

        if resp.retcode != retcode::DONE {
            debug!(
                symbol = %order.symbol,
                retcode = resp.retcode,
                comment = %resp.comment,
                "주문 거부"
            );
            return Err(VenueError::Rejected {
                retcode: resp.retcode,
                reason: resp.comment,
            });
        }

        Ok(OrderAck {
            retcode: resp.retcode,
            ticket: resp.order,
            comment: resp.comment,
        })
    }

    async fn account_info(&self) -> VenueResult<AccountInfo> {
        let acc: GatewayAccount = self.request(Method::GET, "/account", None, None).await?;

        Ok(AccountInfo {
            balance: acc.balance,
            equity: acc.equity,
            margin: acc.margin,
            free_margin: acc.margin_free,
            profit: acc.profit,
        })
    }

    fn venue_name(&self) -> &str {
        "MT5"
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        info!(account = self.config.account, "MT5 게이트웨이 연결 종료");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_config(base_url: &str) -> Mt5Config {
        Mt5Config::new(
            base_url,
            12345,
            SecretString::from("secret".to_string()),
            "Demo-Server",
        )
    }

    #[tokio::test]
    async fn test_connect_success_sets_connected() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/login")
            .with_status(200)
            .with_body(r#"{"success": true}"#)
            .create_async()
            .await;

        let gateway = Mt5Gateway::new(test_config(&server.url())).unwrap();
        assert!(!gateway.is_connected());

        gateway.connect().await.unwrap();
        assert!(gateway.is_connected());
    }

    #[tokio::test]
    async fn test_connect_rejected_login() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/login")
            .with_status(200)
            .with_body(r#"{"success": false, "message": "invalid account"}"#)
            .create_async()
            .await;

        let gateway = Mt5Gateway::new(test_config(&server.url())).unwrap();
        let err = gateway.connect().await.unwrap_err();

        assert!(matches!(err, VenueError::Authentication(_)));
        assert!(!gateway.is_connected());
    }

    #[tokio::test]
    async fn test_positions_parse_and_suffix_strip() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/positions")
            .match_query(mockito::Matcher::UrlEncoded(
                "symbol".into(),
                "EURUSD.r".into(),
            ))
            .with_status(200)
            .with_body(
                r#"[{"ticket": 100, "symbol": "EURUSD.r", "type": 1,
                     "volume": 0.5, "price_open": 1.1, "price_current": 1.09}]"#,
            )
            .create_async()
            .await;

        let config = test_config(&server.url()).with_symbol_suffix(".r");
        let gateway = Mt5Gateway::new(config).unwrap();
        let positions = gateway.positions(Some("EURUSD")).await.unwrap();

        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].ticket, 100);
        assert_eq!(positions[0].symbol, "EURUSD"); // suffix 제거됨
        assert_eq!(positions[0].side, PositionSide::Short);
        assert_eq!(positions[0].volume, dec!(0.5));
    }

    #[tokio::test]
    async fn test_quote() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/tick")
            .match_query(mockito::Matcher::UrlEncoded(
                "symbol".into(),
                "EURUSD".into(),
            ))
            .with_status(200)
            .with_body(r#"{"bid": 1.1000, "ask": 1.1002}"#)
            .create_async()
            .await;

        let gateway = Mt5Gateway::new(test_config(&server.url())).unwrap();
        let quote = gateway.quote("EURUSD").await.unwrap();

        assert_eq!(quote.bid, dec!(1.1000));
        assert_eq!(quote.ask, dec!(1.1002));
    }

    #[tokio::test]
    async fn test_submit_done() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/order_send")
            .with_status(200)
            .with_body(r#"{"retcode": 10009, "order": 777, "comment": "done"}"#)
            .create_async()
            .await;

        let gateway = Mt5Gateway::new(test_config(&server.url())).unwrap();
        let order = OrderRequest::open("EURUSD", PositionSide::Long, dec!(0.1), dec!(1.1002), 20);
        let ack = gateway.submit(&order).await.unwrap();

        assert_eq!(ack.ticket, 777);
        assert_eq!(ack.retcode, retcode::DONE);
    }

    #[tokio::test]
    async fn test_submit_rejected_retcode() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/order_send")
            .with_status(200)
            .with_body(r#"{"retcode": 10019, "order": 0, "comment": "no money"}"#)
            .create_async()
            .await;

        let gateway = Mt5Gateway::new(test_config(&server.url())).unwrap();
        let order = OrderRequest::open("EURUSD", PositionSide::Long, dec!(0.1), dec!(1.1002), 20);
        let err = gateway.submit(&order).await.unwrap_err();

        match err {
            VenueError::Rejected { retcode, reason } => {
                assert_eq!(retcode, 10019);
                assert_eq!(reason, "no money");
            }
            other => panic!("예상하지 못한 에러: {other:?}"),
        }
        // 거부는 연결 계층 실패가 아님
        assert!(!gateway
            .submit(&order)
            .await
            .unwrap_err()
            .is_connectivity());
    }

    #[tokio::test]
    async fn test_account_info() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/account")
            .with_status(200)
            .with_body(
                r#"{"balance": 10000, "equity": 10100, "margin": 200,
                     "margin_free": 9900, "profit": 100}"#,
            )
            .create_async()
            .await;

        let gateway = Mt5Gateway::new(test_config(&server.url())).unwrap();
        let account = gateway.account_info().await.unwrap();

        assert_eq!(account.balance, dec!(10000));
        assert_eq!(account.free_margin, dec!(9900));
    }

    #[test]
    fn test_config_debug_masks_password() {
        let config = test_config("http://localhost");
        let debug = format!("{config:?}");
        assert!(debug.contains("***"));
        assert!(!debug.contains("secret"));
    }
}
