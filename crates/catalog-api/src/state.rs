//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 모든 API 핸들러에서 공유되는 상태를 관리합니다.
//! Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.

use std::sync::Arc;

use crate::auth::TokenService;
use crate::middleware::RateLimiter;
use crate::repository::{PgProductRepository, PgUserRepository, ProductRepository, UserRepository};
use crate::services::{ProductService, UserService};

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 사용자 서비스 - 회원가입, 로그인, 사용자 관리
    pub users: UserService,

    /// 상품 서비스
    pub products: ProductService,

    /// 토큰 서비스 - 시작 시 한 번 설정되는 서명 키 보유
    pub tokens: Arc<TokenService>,

    /// 클라이언트 주소별 속도 제한기 (프로세스 전역)
    pub rate_limiter: Arc<RateLimiter>,

    /// 속도 제한 적용 여부
    pub rate_limit_enabled: bool,

    /// 데이터베이스 연결 풀 (PostgreSQL)
    pub db_pool: Option<sqlx::PgPool>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 저장소 구현을 받아 상태 생성.
    pub fn new(
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        tokens: Arc<TokenService>,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            users: UserService::new(users, Arc::clone(&tokens)),
            products: ProductService::new(products),
            tokens,
            rate_limiter,
            rate_limit_enabled: true,
            db_pool: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// PostgreSQL 저장소로 상태 생성.
    pub fn with_pg_pool(
        pool: sqlx::PgPool,
        tokens: Arc<TokenService>,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        let mut state = Self::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgProductRepository::new(pool.clone())),
            tokens,
            rate_limiter,
        );
        state.db_pool = Some(pool);
        state
    }

    /// 속도 제한 적용 여부 설정.
    pub fn with_rate_limit_enabled(mut self, enabled: bool) -> Self {
        self.rate_limit_enabled = enabled;
        self
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        if let Some(pool) = &self.db_pool {
            sqlx::query("SELECT 1").fetch_one(pool).await.is_ok()
        } else {
            false
        }
    }
}

/// 테스트용 서명 키.
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_JWT_SECRET: &str = "test-signing-secret-for-catalog-api";

/// 테스트용 AppState 생성 헬퍼.
///
/// 실제 DB 연결 없이 메모리 저장소와 기본 속도 제한(용량 5, 초당 3)을 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use crate::middleware::RateLimitConfig;
    use crate::repository::{InMemoryProductRepository, InMemoryUserRepository};
    use secrecy::SecretString;

    let tokens = Arc::new(TokenService::new(
        &SecretString::from(TEST_JWT_SECRET.to_string()),
        chrono::Duration::seconds(crate::auth::DEFAULT_TOKEN_TTL_SECS),
    ));

    AppState::new(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemoryProductRepository::new()),
        tokens,
        Arc::new(RateLimiter::new(RateLimitConfig::default())),
    )
}
