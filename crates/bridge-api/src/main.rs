//! 웹훅 트레이딩 브릿지 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다. 시작 순서:
//! 설정 로드 → venue 연결(백오프 재시도) → 라우터 구성 → 서빙.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bridge_api::{
    openapi::swagger_ui_router, routes::create_api_router, AppState, BridgeConfig,
};
use bridge_core::VenueGateway;
use bridge_execution::{ExecutorConfig, OrderExecutor};
use bridge_notification::{
    EmailSender, Notification, NotificationEvent, NotificationSender,
};
use bridge_venue::{connect_with_retry, Mt5Config, Mt5Gateway, RetryConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BridgeConfig::from_env().context("설정 로드 실패")?;
    info!(?config, "설정 로드 완료");

    // venue 세션: 시작 시 한 번 생성되는 공유 자원
    let mt5_config = Mt5Config::new(
        config.gateway_url.clone(),
        config.account,
        config.password.clone(),
        config.server.clone(),
    )
    .with_symbol_suffix(config.symbol_suffix.clone())
    .with_timeout(config.venue_timeout);

    let venue = Arc::new(Mt5Gateway::new(mt5_config).context("venue 클라이언트 생성 실패")?);

    let notifier: Option<Arc<dyn NotificationSender>> = EmailSender::from_env()
        .map(|sender| Arc::new(sender) as Arc<dyn NotificationSender>);
    if notifier.is_none() {
        info!("이메일 설정 없음, 알림 없이 동작");
    }

    // 초기 연결 실패 시에도 서버는 시작함 (헬스 체크로 상태 노출)
    match connect_with_retry(venue.as_ref(), &RetryConfig::default()).await {
        Ok(()) => info!(venue = venue.venue_name(), "venue 연결 완료"),
        Err(e) => {
            error!(venue = venue.venue_name(), error = %e, "venue 초기 연결 실패");
            if let Some(notifier) = &notifier {
                let notification = Notification::new(NotificationEvent::VenueDisconnected {
                    venue: venue.venue_name().to_string(),
                    reason: e.to_string(),
                });
                if let Err(e) = notifier.send(&notification).await {
                    warn!(error = %e, "장애 알림 전송 실패");
                }
            }
        }
    }

    let executor_config = ExecutorConfig {
        deviation: config.deviation,
        venue_timeout: config.venue_timeout,
        ..ExecutorConfig::default()
    };
    let venue_dyn: Arc<dyn VenueGateway> = venue.clone();
    let state = Arc::new(AppState {
        executor: OrderExecutor::new(venue_dyn.clone(), executor_config),
        venue: venue_dyn,
        notifier,
        default_volume: config.default_volume,
    });

    let app = create_api_router(state)
        .merge(swagger_ui_router())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive());

    let addr = config.socket_addr().context("API 주소 파싱 실패")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("{addr} 바인딩 실패"))?;
    info!(%addr, "웹훅 브릿지 서버 시작");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("서버 실행 실패")?;

    venue.disconnect().await;
    info!("서버 종료");
    Ok(())
}

/// Ctrl+C 또는 SIGTERM 대기.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Ctrl+C 핸들러 설치 실패");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!(error = %e, "SIGTERM 핸들러 설치 실패"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl+C 수신, 종료 시작"),
        _ = terminate => info!("SIGTERM 수신, 종료 시작"),
    }
}
