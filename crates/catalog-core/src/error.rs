//! 카탈로그 서비스의 에러 타입.

use thiserror::Error;

/// 핵심 서비스 에러.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// 설정 에러 (서비스 시작 불가)
    #[error("설정 에러: {0}")]
    Config(String),

    /// 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 중복 리소스
    #[error("이미 존재함: {0}")]
    Conflict(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 카탈로그 작업을 위한 Result 타입.
pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    /// 재시도 가능한 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::Database(_))
    }
}

impl From<config::ConfigError> for CatalogError {
    fn from(err: config::ConfigError) -> Self {
        CatalogError::Config(err.to_string())
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => CatalogError::NotFound("row".to_string()),
            other => CatalogError::Database(other.to_string()),
        }
    }
}
