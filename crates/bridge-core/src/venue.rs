//! 거래 터미널(venue) 추상화.
//!
//! MT5 등 외부 실행 터미널을 venue 중립적인 인터페이스로 감쌉니다.
//! 각 venue별로 이 trait를 구현하여 리컨실/실행 로직을
//! venue에 독립적으로 작성할 수 있습니다.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::market::{AccountInfo, Position, Quote};
use crate::domain::order::{OrderAck, OrderRequest};

/// venue 호출 결과 타입 별칭.
pub type VenueResult<T> = Result<T, VenueError>;

/// VenueGateway 에러.
#[derive(Debug, Clone, Error)]
pub enum VenueError {
    /// 네트워크 에러 (게이트웨이 도달 불가)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 호출 타임아웃
    #[error("venue 호출 타임아웃: {0}")]
    Timeout(String),

    /// 로그인되지 않은 세션
    #[error("venue에 연결되어 있지 않음")]
    NotConnected,

    /// 로그인/인증 실패
    #[error("인증 실패: {0}")]
    Authentication(String),

    /// venue가 주문을 거부 (retcode 포함)
    #[error("주문 거부 (retcode {retcode}): {reason}")]
    Rejected { retcode: u32, reason: String },

    /// 알 수 없는 심볼
    #[error("알 수 없는 심볼: {0}")]
    UnknownSymbol(String),

    /// 응답 파싱 실패
    #[error("파싱 에러: {0}")]
    Parse(String),

    /// 기타 venue API 에러
    #[error("venue API 에러: {0}")]
    Api(String),
}

impl VenueError {
    /// 연결 계층 실패 여부.
    ///
    /// 연결 실패는 이후의 어떤 호출도 성공할 수 없으므로
    /// 잔여 leg 실행을 즉시 중단해야 합니다.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            VenueError::Network(_) | VenueError::Timeout(_) | VenueError::NotConnected
        )
    }

    /// 재시도 가능 여부.
    ///
    /// 연결 계층 실패만 재시도 대상입니다 (connect/login 한정).
    /// 주문 제출은 중복 체결 위험 때문에 어떤 경우에도 재시도하지 않습니다.
    pub fn is_retryable(&self) -> bool {
        self.is_connectivity()
    }
}

/// 거래 터미널 trait.
///
/// 하나의 인증된 세션을 감싸는 공유 자원입니다. 시작 시 생성되어
/// 종료 시까지 유지되며, 호출 표면은 동시 사용에 안전해야 합니다.
///
/// # 구현 예시
///
/// ```ignore
/// pub struct Mt5Gateway { client: reqwest::Client, /* ... */ }
///
/// #[async_trait]
/// impl VenueGateway for Mt5Gateway {
///     async fn connect(&self) -> VenueResult<()> {
///         // 터미널 게이트웨이 login 호출
///     }
///     // ... 나머지 메서드 구현
/// }
/// ```
#[async_trait]
pub trait VenueGateway: Send + Sync {
    /// venue 연결 및 로그인.
    ///
    /// # Errors
    ///
    /// - `VenueError::Network`: 게이트웨이 도달 불가
    /// - `VenueError::Authentication`: 계정/비밀번호/서버 불일치
    async fn connect(&self) -> VenueResult<()>;

    /// 세션 연결 상태.
    ///
    /// 로그인 성공 시 설정되고 연결 계층 실패 시 해제됩니다.
    /// 헬스 체크 용도로만 사용하며, 실제 호출의 성공을 보장하지 않습니다.
    fn is_connected(&self) -> bool;

    /// 오픈 포지션 조회.
    ///
    /// `symbol`이 `Some`이면 해당 심볼만 조회합니다.
    /// 반환 순서는 venue의 스냅샷 순서 그대로입니다.
    ///
    /// # Errors
    ///
    /// - `VenueError::Network` / `VenueError::Timeout`: 연결 실패
    /// - `VenueError::NotConnected`: 로그인되지 않음
    async fn positions(&self, symbol: Option<&str>) -> VenueResult<Vec<Position>>;

    /// 현재 호가 조회.
    ///
    /// # Errors
    ///
    /// - `VenueError::UnknownSymbol`: venue에 없는 심볼
    async fn quote(&self, symbol: &str) -> VenueResult<Quote>;

    /// 시장가 주문 제출.
    ///
    /// `retcode == DONE`인 경우에만 `Ok`를 반환합니다.
    /// 그 외 retcode는 `VenueError::Rejected`로 매핑됩니다.
    ///
    /// # Errors
    ///
    /// - `VenueError::Rejected`: venue가 주문 거부 (사유 포함)
    /// - `VenueError::Network` / `VenueError::Timeout`: 연결 실패
    async fn submit(&self, order: &OrderRequest) -> VenueResult<OrderAck>;

    /// 계좌 정보 조회.
    async fn account_info(&self) -> VenueResult<AccountInfo>;

    /// venue 이름.
    ///
    /// 로깅 및 디버깅 목적으로 사용됩니다.
    fn venue_name(&self) -> &str;

    /// 세션 종료.
    ///
    /// 기본 구현은 아무 것도 하지 않습니다.
    async fn disconnect(&self) {}
}
