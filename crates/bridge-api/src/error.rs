//! API 에러 응답.
//!
//! 에러 분류별 HTTP 상태 매핑:
//! - 검증 에러 (`MissingField`/`InvalidVolume`/`InvalidAction`) → 400
//! - venue 연결 불가 (`Connectivity`) → 503
//! - venue 주문 거부 (`VenueRejection`) → 500

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use bridge_core::{ErrorKind, VenueError};

/// 에러 응답 본문.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ApiErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// 에러 분류를 HTTP 상태 코드로 매핑.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::MissingField | ErrorKind::InvalidVolume | ErrorKind::InvalidAction => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::Connectivity => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::VenueRejection => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// venue 에러를 상태 코드 + 에러 응답으로 변환 (조회성 엔드포인트용).
pub fn venue_error_response(error: &VenueError) -> (StatusCode, Json<ApiErrorResponse>) {
    let status = if error.is_connectivity() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(ApiErrorResponse::new(error.to_string())))
}
