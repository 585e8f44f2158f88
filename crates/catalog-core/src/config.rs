//! 설정 관리.
//!
//! 설정은 다음 순서로 덮어씁니다 (뒤가 우선):
//! 1. 내장 기본값
//! 2. `config/default.toml` (선택)
//! 3. `CATALOG_CONFIG`가 가리키는 파일 (선택)
//! 4. `CATALOG__` 접두사 환경 변수 (예: `CATALOG__AUTH__JWT_SECRET`)
//! 5. 호환용 환경 변수 `JWT_SECRET_KEY`, `DATABASE_URL`, `PORT`/`API_PORT`

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CatalogError, CatalogResult};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// 토큰 서명 설정
    pub auth: AuthConfig,
    /// 요청 속도 제한 설정
    pub rate_limit: RateLimitSettings,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 처리 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            request_timeout_secs: 30,
        }
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 획득 타임아웃 (초)
    pub acquire_timeout_secs: u64,
    /// 시작 시 마이그레이션 실행 여부
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout_secs: 10,
            run_migrations: true,
        }
    }
}

/// 토큰 서명 설정.
///
/// 서명 키는 [`AuthConfig::signing_secret`]을 통해서만 꺼냅니다.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// 대칭 서명 키 (HS256)
    pub jwt_secret: Option<String>,
    /// 토큰 유효 기간 (초)
    pub token_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_secs: 2 * 60 * 60,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "jwt_secret",
                &self.jwt_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

impl AuthConfig {
    /// 검증된 서명 키 반환.
    ///
    /// 키가 없거나 공백뿐이면 배포 오류로 간주합니다. 빈 키로 서명된 토큰은
    /// 누구나 위조할 수 있습니다.
    pub fn signing_secret(&self) -> CatalogResult<SecretString> {
        match self.jwt_secret.as_deref() {
            Some(secret) if !secret.trim().is_empty() => Ok(SecretString::from(secret.to_string())),
            Some(_) => Err(CatalogError::Config(
                "auth.jwt_secret is empty".to_string(),
            )),
            None => Err(CatalogError::Config(
                "auth.jwt_secret is not set (CATALOG__AUTH__JWT_SECRET or JWT_SECRET_KEY)".to_string(),
            )),
        }
    }
}

/// 요청 속도 제한 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// 속도 제한 활성화 여부
    pub enabled: bool,
    /// 버킷 용량 (순간 허용 요청 수)
    pub capacity: u32,
    /// 초당 리필 토큰 수
    pub refill_per_second: f64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 5,
            refill_per_second: 3.0,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut builder = Self::defaults(config::Config::builder())?
            .add_source(config::File::from(Path::new("config/default.toml")).required(false))
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("CATALOG")
                    .separator("__")
                    .try_parsing(true),
            );

        builder = builder
            .set_override_option("auth.jwt_secret", std::env::var("JWT_SECRET_KEY").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("server.port", compat_port())?;

        builder.build()?.try_deserialize()
    }

    /// 기본 경로(`CATALOG_CONFIG`, 없으면 `config/local.toml`)에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path =
            std::env::var("CATALOG_CONFIG").unwrap_or_else(|_| "config/local.toml".to_string());
        Self::load(path)
    }

    fn defaults(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000_i64)?
            .set_default("auth.token_ttl_secs", 7200_i64)?
            .set_default("rate_limit.capacity", 5_i64)?
            .set_default("rate_limit.refill_per_second", 3.0_f64)
    }

    /// 서비스 시작 전 설정 검증.
    ///
    /// 서명 키가 비어 있으면 트래픽을 받기 전에 실패해야 합니다.
    pub fn validate(&self) -> CatalogResult<()> {
        self.auth.signing_secret()?;

        if self.auth.token_ttl_secs <= 0 {
            return Err(CatalogError::Config(format!(
                "auth.token_ttl_secs must be positive (got {})",
                self.auth.token_ttl_secs
            )));
        }

        if self.rate_limit.capacity == 0 {
            return Err(CatalogError::Config(
                "rate_limit.capacity must be at least 1".to_string(),
            ));
        }

        if !(self.rate_limit.refill_per_second > 0.0) {
            return Err(CatalogError::Config(format!(
                "rate_limit.refill_per_second must be positive (got {})",
                self.rate_limit.refill_per_second
            )));
        }

        if self.database.url.as_deref().map_or(true, |u| u.trim().is_empty()) {
            return Err(CatalogError::Config(
                "database.url is not set (CATALOG__DATABASE__URL or DATABASE_URL)".to_string(),
            ));
        }

        Ok(())
    }
}

/// `PORT`는 `:8000` 형식도 허용합니다.
fn compat_port() -> Option<i64> {
    std::env::var("API_PORT")
        .or_else(|_| std::env::var("PORT"))
        .ok()
        .and_then(|p| p.trim().trim_start_matches(':').parse().ok())
}
