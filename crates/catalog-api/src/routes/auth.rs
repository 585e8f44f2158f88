//! 회원가입 및 로그인 endpoint.
//!
//! 토큰 없이 접근 가능한 공개 라우트입니다.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use catalog_core::{NewUser, User};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::services::{LoginRequest, LoginResponse};
use crate::state::AppState;

/// 회원가입.
///
/// POST /register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.users.register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// 로그인 후 액세스 토큰 발급.
///
/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    Ok(Json(state.users.login(request).await?))
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
