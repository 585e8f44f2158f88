//! Axum용 인증 미들웨어.
//!
//! 요청 게이트 체인의 인증/역할 단계:
//! - [`require_auth`]: Bearer 토큰을 검증하고 [`Identity`]를 요청 extensions에 첨부
//! - [`require_admin`]: 첨부된 신원이 관리자 계열인지 확인
//! - [`CurrentUser`]: 핸들러에서 첨부된 신원을 꺼내는 추출기
//!
//! 신원은 매 요청마다 토큰에서 다시 만들어지며 요청이 끝나면 버려집니다.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::jwt::{Identity, TokenService, VerificationError};
use super::policy::{check_gate, GateRequirement};
use crate::error::ApiErrorResponse;
use crate::metrics::record_auth_failure;

/// 인증/인가 에러.
///
/// 인증 실패는 종류와 관계없이 모두 401이고, 종류는 로그에만 남습니다.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("인증 토큰이 필요합니다")]
    MissingToken,
    #[error("잘못된 Authorization 헤더 형식")]
    InvalidAuthHeader,
    #[error("유효하지 않은 토큰: {0}")]
    InvalidToken(#[from] VerificationError),
    #[error("권한이 부족합니다: {0}")]
    Forbidden(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AuthError::MissingToken | AuthError::InvalidAuthHeader => {
                ApiErrorResponse::simple("MISSING_TOKEN", "Missing or invalid token")
            }
            AuthError::InvalidToken(_) => ApiErrorResponse::simple("INVALID_TOKEN", "Invalid Token"),
            AuthError::Forbidden(reason) => ApiErrorResponse::new("FORBIDDEN", reason),
        };

        (status, Json(body)).into_response()
    }
}

/// `Authorization: Bearer <token>` 헤더에서 토큰 추출.
///
/// 헤더가 없으면 `MissingToken`, 접두사가 다르면 `InvalidAuthHeader`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)
}

/// 유효한 토큰을 요구하는 미들웨어.
///
/// 검증에 성공하면 [`Identity`]를 요청 extensions에 넣고 다음 단계로 넘깁니다.
pub async fn require_auth(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(request.headers()).inspect_err(|e| {
        record_auth_failure("missing");
        tracing::debug!(path = %request.uri().path(), error = %e, "Missing bearer token");
    })?;

    let identity = tokens.verify(token).map_err(|e| {
        record_auth_failure(e.kind());
        tracing::warn!(
            path = %request.uri().path(),
            kind = e.kind(),
            "Token verification failed"
        );
        AuthError::InvalidToken(e)
    })?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// 관리자 역할을 요구하는 미들웨어.
///
/// [`require_auth`] 뒤에 배치해야 합니다. 신원이 없으면 401입니다.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AuthError> {
    let identity = request.extensions().get::<Identity>();

    check_gate(GateRequirement::Admin, identity).inspect_err(|_| {
        if let Some(identity) = identity {
            tracing::info!(
                user_id = identity.id,
                role = %identity.role,
                path = %request.uri().path(),
                "Admin gate denied"
            );
        }
    })?;

    Ok(next.run(request).await)
}

/// 인증된 요청자 추출기.
///
/// ```rust,ignore
/// async fn me(CurrentUser(identity): CurrentUser) -> impl IntoResponse {
///     format!("user {}", identity.id)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .copied()
            .map(CurrentUser)
            .ok_or(AuthError::MissingToken)
    }
}
