//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use bridge_core::{AccountInfo, Position, PositionSide};

use crate::error::ApiErrorResponse;
use crate::routes::health::HealthResponse;
use crate::routes::positions::CloseRequest;
use crate::routes::webhook::TradeResponse;

/// API 문서 정의.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Webhook Trading Bridge API",
        description = "외부 트레이딩 시그널 웹훅을 MT5 주문으로 변환하는 브릿지"
    ),
    paths(
        crate::routes::webhook::handle_webhook,
        crate::routes::positions::list_positions,
        crate::routes::positions::close_positions,
        crate::routes::account::account_info,
        crate::routes::health::health_check,
    ),
    components(schemas(
        TradeResponse,
        ApiErrorResponse,
        CloseRequest,
        HealthResponse,
        Position,
        PositionSide,
        AccountInfo,
    )),
    tags(
        (name = "trading", description = "웹훅 수신 및 거래 실행"),
        (name = "positions", description = "포지션 조회/청산"),
        (name = "account", description = "계좌 조회"),
        (name = "system", description = "헬스 체크")
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터 생성.
pub fn swagger_ui_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
