//! 카탈로그 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API (회원가입, 로그인, 사용자/상품 관리)
//! - 토큰 인증과 역할 기반 인가 정책
//! - 클라이언트 주소별 속도 제한
//! - 헬스 체크 엔드포인트와 Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트와 라우터 조립
//! - [`auth`]: 비밀번호 해싱, 토큰, 인가 정책, 인증 미들웨어
//! - [`middleware`]: 속도 제한 및 메트릭 미들웨어
//! - [`repository`]: PostgreSQL 저장소
//! - [`services`]: 비즈니스 로직
//! - [`metrics`]: Prometheus 메트릭 수집

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

pub use auth::{hash_password, verify_password, Claims, Identity, Role, TokenService};
pub use error::{ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::{metrics_layer, RateLimitConfig, RateLimiter};
pub use routes::{create_api_router, create_router};
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::{create_test_state, TEST_JWT_SECRET};
