//! 인증 및 권한 부여.
//!
//! 토큰 기반 인증과 역할 계층 기반 접근 제어를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`TokenService`]: HS256 토큰 발급/검증
//! - [`Identity`]: 검증된 요청 주체 (id, 역할)
//! - [`require_auth`] / [`require_admin`]: 요청 게이트 미들웨어
//! - [`authorize`]: 대상 사용자 변경 작업의 결정 테이블
//! - 비밀번호 해싱/검증 함수
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn protected_handler(
//!     CurrentUser(identity): CurrentUser,
//! ) -> impl IntoResponse {
//!     format!("Hello, user {}!", identity.id)
//! }
//! ```

mod jwt;
mod middleware;
mod password;
mod policy;

pub use catalog_core::Role;
pub use jwt::{
    Claims, Identity, TokenError, TokenService, VerificationError, DEFAULT_TOKEN_TTL_SECS,
};
pub use middleware::{bearer_token, require_admin, require_auth, AuthError, CurrentUser};
pub use password::{
    hash_password, password_matches, resolve_password_update, verify_password, PasswordError,
};
pub use policy::{
    authorize, check_gate, enforce, DenyReason, GateRequirement, PolicyDecision, UserAction,
    ADMIN_ONLY_MESSAGE,
};
