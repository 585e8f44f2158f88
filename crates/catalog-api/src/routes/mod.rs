//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/register`, `/login` - 공개 인증 엔드포인트
//! - `/health`, `/health/ready` - 헬스 체크
//! - `/metrics` - Prometheus 메트릭 (속도 제한 제외)
//! - `/api/*` - 토큰 필요
//! - `/api/admin/*` - 관리자 역할 필요
//!
//! # 요청 게이트 순서
//!
//! 속도 제한 → 토큰 검증 → 역할 확인 → 핸들러. 앞 단계에서 거부되면 뒤 단계는 실행되지 않습니다.

pub mod auth;
pub mod health;
pub mod products;
pub mod users;

pub use auth::auth_router;
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use products::{admin_products_router, products_router};
pub use users::{admin_users_router, users_router};

use axum::{extract::State, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{require_admin, require_auth};
use crate::middleware::rate_limit_middleware;
use crate::state::AppState;

/// 단순 메시지 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 게이트가 적용된 API 라우터 생성.
///
/// `/api/admin`은 `/api` 안에 중첩되므로 토큰 검증이 항상 역할 확인보다 먼저 실행됩니다.
/// `route_layer`를 사용하므로 존재하지 않는 경로는 인증 없이 404입니다.
pub fn create_api_router(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .merge(admin_users_router())
        .merge(admin_products_router())
        .route_layer(middleware::from_fn(require_admin));

    let protected = Router::new()
        .merge(users_router())
        .merge(products_router())
        .nest("/admin", admin)
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.tokens),
            require_auth,
        ));

    let router = Router::new()
        .merge(auth_router())
        .nest("/health", health_router())
        .nest("/api", protected)
        .with_state(Arc::clone(&state));

    if state.rate_limit_enabled {
        router.layer(middleware::from_fn_with_state(
            Arc::clone(&state.rate_limiter),
            rate_limit_middleware,
        ))
    } else {
        router
    }
}

/// 전체 라우터 생성.
///
/// 메트릭 라우터는 속도 제한 레이어를 적용한 뒤에 병합하므로 제한 대상이 아닙니다.
pub fn create_router(state: Arc<AppState>, metrics: Option<PrometheusHandle>) -> Router {
    let router = create_api_router(state);

    match metrics {
        Some(handle) => router.merge(metrics_router(handle)),
        None => router,
    }
}

/// Prometheus 메트릭 라우터.
pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(handle)
}

/// GET /metrics
async fn metrics_handler(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}
