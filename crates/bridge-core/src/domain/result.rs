//! 요청 단위 거래 결과.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 최상위 에러 분류.
///
/// 호출자는 사람이 읽을 수 있는 `message`와 함께
/// 이 분류 중 하나만을 보게 됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ErrorKind {
    /// 필수 필드 누락 (venue 호출 전에 반환)
    MissingField,
    /// 수량 파싱/범위 오류 (venue 호출 전에 반환)
    InvalidVolume,
    /// 알 수 없는 action 값 (venue 호출 전에 반환)
    InvalidAction,
    /// 게이트웨이 연결 불가 / 타임아웃 — 잔여 leg 즉시 중단
    Connectivity,
    /// venue가 주문을 거부 — 형제 leg는 계속 진행
    VenueRejection,
}

/// 거래 요청의 최종 결과.
///
/// 생성 이후 변경되지 않으며 호출자에게 그대로 반환됩니다.
/// 부분 실패 시에도 이미 성공한 청산 티켓은 `closed_tickets`에 보존됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TradeResult {
    /// 전체 요청 성공 여부
    pub success: bool,
    /// 청산된 포지션 티켓 (청산 순서대로)
    pub closed_tickets: Vec<u64>,
    /// 신규 진입 포지션 티켓
    pub opened_ticket: Option<u64>,
    /// 사람이 읽을 수 있는 결과 메시지
    pub message: String,
    /// 실패 시 에러 분류
    pub error_kind: Option<ErrorKind>,
}

impl TradeResult {
    /// 성공 결과 생성.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            closed_tickets: Vec::new(),
            opened_ticket: None,
            message: message.into(),
            error_kind: None,
        }
    }

    /// 실패 결과 생성.
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            closed_tickets: Vec::new(),
            opened_ticket: None,
            message: message.into(),
            error_kind: Some(kind),
        }
    }

    /// 청산 티켓 목록 설정.
    pub fn with_closed_tickets(mut self, tickets: Vec<u64>) -> Self {
        self.closed_tickets = tickets;
        self
    }

    /// 진입 티켓 설정.
    pub fn with_opened_ticket(mut self, ticket: u64) -> Self {
        self.opened_ticket = Some(ticket);
        self
    }
}
