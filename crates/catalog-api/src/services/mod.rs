//! 비즈니스 로직 서비스 모듈.
//!
//! 라우트 핸들러와 저장소 사이에서 검증, 인가 판단, 비밀번호 처리를 담당합니다.

pub mod product_service;
pub mod user_service;

pub use product_service::ProductService;
pub use user_service::{LoginRequest, LoginResponse, UserService};

use axum::{http::StatusCode, Json};
use catalog_core::CatalogError;

use crate::auth::DenyReason;
use crate::error::ApiErrorResponse;

/// 서비스 계층 에러.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("잘못된 입력: {0}")]
    Validation(String),
    #[error("찾을 수 없음: {0}")]
    NotFound(String),
    #[error("이미 존재함: {0}")]
    Conflict(String),
    #[error("이메일 또는 비밀번호가 올바르지 않습니다")]
    InvalidCredentials,
    #[error("권한 없음: {0}")]
    Forbidden(DenyReason),
    #[error("데이터베이스 에러: {0}")]
    Database(String),
    #[error("내부 에러: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Database(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<CatalogError> for ServiceError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(what) => ServiceError::NotFound(what),
            CatalogError::Conflict(what) => ServiceError::Conflict(what),
            CatalogError::InvalidInput(msg) => ServiceError::Validation(msg),
            CatalogError::Database(msg) => ServiceError::Database(msg),
            CatalogError::Config(msg) | CatalogError::Internal(msg) => ServiceError::Internal(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<ServiceError> for (StatusCode, Json<ApiErrorResponse>) {
    fn from(err: ServiceError) -> Self {
        let status = err.status();
        let body = match err {
            ServiceError::Validation(msg) => ApiErrorResponse::new("VALIDATION_ERROR", msg),
            ServiceError::NotFound(what) => {
                ApiErrorResponse::new("NOT_FOUND", format!("{what} not found"))
            }
            ServiceError::Conflict(what) => ApiErrorResponse::new("CONFLICT", what),
            ServiceError::InvalidCredentials => {
                ApiErrorResponse::new("INVALID_CREDENTIALS", "Invalid email or password")
            }
            ServiceError::Forbidden(reason) => ApiErrorResponse::new("FORBIDDEN", reason.message()),
            // 내부 상세는 로그에만 남김
            ServiceError::Database(detail) => {
                tracing::error!(error = %detail, "Database error");
                ApiErrorResponse::new("DB_ERROR", "Database error")
            }
            ServiceError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error");
                ApiErrorResponse::new("INTERNAL_ERROR", "Internal server error")
            }
        };

        (status, Json(body))
    }
}

/// 경로 ID는 양수여야 합니다.
pub(crate) fn ensure_positive_id(id: i64, what: &str) -> Result<(), ServiceError> {
    if id < 1 {
        return Err(ServiceError::Validation(format!(
            "{what} id must be a positive number"
        )));
    }
    Ok(())
}
