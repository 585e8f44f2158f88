//! 사용자 endpoint.
//!
//! # 엔드포인트
//!
//! - `GET /api/user/info` - 토큰 소유자 정보
//! - `GET /api/users/{id}` - 사용자 조회
//! - `PUT /api/users/{id}` - 사용자 수정 (역할 변경은 인가 정책 적용)
//! - `GET /api/admin/users` - 사용자 목록 (관리자)
//! - `DELETE /api/admin/users/{id}` - 사용자 삭제 (관리자, 인가 정책 적용)

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use catalog_core::{ListQuery, User, UserPatch, UserSummary};
use std::sync::Arc;

use super::MessageResponse;
use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::state::AppState;

/// 현재 토큰 소유자 정보.
pub async fn user_info(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
) -> ApiResult<Json<User>> {
    Ok(Json(state.users.get(identity.id).await?))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.users.get(id).await?))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<i64>,
    Json(patch): Json<UserPatch>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.users.update(&identity, id, patch).await?))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<UserSummary>>> {
    Ok(Json(state.users.list(query).await?))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.users.delete(&identity, id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// 인증된 사용자용 라우터.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user/info", get(user_info))
        .route("/users/{id}", get(get_user).put(update_user))
}

/// 관리자 전용 라우터.
pub fn admin_users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", axum::routing::delete(delete_user))
}
