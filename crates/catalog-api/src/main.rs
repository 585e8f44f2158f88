//! 카탈로그 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 회원가입/로그인, 사용자 관리, 상품 관리 엔드포인트를 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{http::StatusCode, middleware, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use catalog_api::auth::TokenService;
use catalog_api::metrics::setup_metrics_recorder;
use catalog_api::middleware::{metrics_layer, RateLimitConfig, RateLimiter};
use catalog_api::routes::create_router;
use catalog_api::state::AppState;
use catalog_core::{init_logging, AppConfig, LogConfig};

/// CORS 레이어 생성.
///
/// `CORS_ORIGINS` 환경 변수(쉼표 구분)가 있으면 해당 origin만 허용합니다.
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // 설정 로드 및 검증. 서명 키가 없으면 여기서 종료
    let config = AppConfig::load_default().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    init_logging(LogConfig::from_settings(&config.logging))
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    info!("Starting Catalog API server...");

    let metrics_handle = setup_metrics_recorder().context("failed to install metrics recorder")?;
    info!("Prometheus metrics recorder initialized");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| {
            error!(
                host = %config.server.host,
                port = config.server.port,
                error = %e,
                "소켓 주소 설정이 유효하지 않습니다."
            );
            e
        })?;

    let database_url = config
        .database
        .url
        .as_deref()
        .context("database.url is not set")?;
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(database_url)
        .await
        .context("failed to connect to PostgreSQL")?;
    info!(
        max_connections = config.database.max_connections,
        "Database pool created"
    );

    if config.database.run_migrations {
        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .context("failed to run migrations")?;
        info!("Database migrations applied");
    }

    let tokens = Arc::new(TokenService::from_config(&config.auth)?);
    let rate_limiter = Arc::new(RateLimiter::new(RateLimitConfig::from(&config.rate_limit)));

    let state = Arc::new(
        AppState::with_pg_pool(pool, tokens, rate_limiter)
            .with_rate_limit_enabled(config.rate_limit.enabled),
    );

    info!(version = %state.version, "Application state initialized");
    if config.rate_limit.enabled {
        info!(
            capacity = config.rate_limit.capacity,
            refill_per_second = config.rate_limit.refill_per_second,
            "Rate limiting enabled"
        );
    } else {
        warn!("Rate limiting disabled");
    }

    let app: Router = create_router(state, Some(metrics_handle))
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.request_timeout_secs),
        ))
        .layer(cors_layer());

    info!(%addr, "API server listening");
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // 속도 제한이 클라이언트 주소를 읽을 수 있도록 ConnectInfo 제공
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
