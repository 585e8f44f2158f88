//! 사용자 서비스.
//!
//! 회원가입, 로그인(토큰 발급), 조회, 삭제, 수정을 담당합니다.
//! 삭제와 역할 변경은 요청자와 대상의 역할로 인가 정책을 거칩니다.

use catalog_core::{ListQuery, NewUser, Role, User, UserPatch, UserSummary};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use super::{ensure_positive_id, ServiceError};
use crate::auth::{
    enforce, hash_password, password_matches, resolve_password_update, Identity, TokenService,
    UserAction,
};
use crate::repository::{NewUserRecord, UserRepository};

/// 로그인 요청.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// 로그인 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// 액세스 토큰
    pub token: String,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
    /// 만료까지 남은 시간 (초)
    pub expires_in: i64,
}

/// 사용자 서비스.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// 회원가입.
    ///
    /// 새 계정은 항상 `user` 역할입니다. 이메일이 이미 있으면 `Conflict`.
    pub async fn register(&self, input: NewUser) -> Result<User, ServiceError> {
        input.validate()?;

        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(ServiceError::Conflict("email already registered".to_string()));
        }

        let password_hash = hash_blocking(input.password).await?;

        let user = self
            .users
            .create(NewUserRecord {
                username: input.username,
                email: input.email,
                password_hash,
                role: Role::User,
            })
            .await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// 로그인.
    ///
    /// 알 수 없는 이메일, 비밀번호 불일치, 손상된 해시 모두 `InvalidCredentials`입니다.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ServiceError> {
        request.validate()?;

        let Some(user) = self.users.find_by_email(&request.email).await? else {
            tracing::info!("Login failed: unknown email");
            return Err(ServiceError::InvalidCredentials);
        };

        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || password_matches(&request.password, &hash))
            .await
            .unwrap_or(false);

        if !matches {
            tracing::info!(user_id = user.id, "Login failed: password mismatch");
            return Err(ServiceError::InvalidCredentials);
        }

        let identity = Identity::new(user.id, user.role);
        let token = self
            .tokens
            .issue(&identity, &user.email)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        tracing::info!(user_id = user.id, role = %user.role, "User logged in");

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.tokens.expires_in_secs(),
        })
    }

    /// 사용자 조회.
    pub async fn get(&self, id: i64) -> Result<User, ServiceError> {
        ensure_positive_id(id, "user")?;
        self.find(id).await
    }

    /// 사용자 목록.
    pub async fn list(&self, query: ListQuery) -> Result<Vec<UserSummary>, ServiceError> {
        query.validate()?;
        let users = self.users.list(&query).await?;
        Ok(users.iter().map(User::summary).collect())
    }

    /// 사용자 삭제.
    pub async fn delete(&self, requester: &Identity, id: i64) -> Result<(), ServiceError> {
        ensure_positive_id(id, "user")?;
        let target = self.find(id).await?;

        enforce(requester, &identity_of(&target), UserAction::Delete)
            .map_err(ServiceError::Forbidden)?;

        if !self.users.delete(id).await? {
            return Err(ServiceError::NotFound(format!("user {id}")));
        }

        tracing::info!(requester_id = requester.id, user_id = id, "User deleted");
        Ok(())
    }

    /// 사용자 수정.
    ///
    /// 역할이 포함되면 인가 정책을 먼저 확인합니다. 비밀번호는 새 평문일 때만 다시 해싱합니다.
    pub async fn update(
        &self,
        requester: &Identity,
        id: i64,
        patch: UserPatch,
    ) -> Result<User, ServiceError> {
        ensure_positive_id(id, "user")?;
        patch.validate()?;

        let mut user = self.find(id).await?;

        if let Some(new_role) = patch.role {
            enforce(requester, &identity_of(&user), UserAction::ChangeRole(new_role))
                .map_err(ServiceError::Forbidden)?;
            user.role = new_role;
        }
        if let Some(username) = patch.username {
            user.username = username;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }

        let stored_hash = std::mem::take(&mut user.password_hash);
        user.password_hash = tokio::task::spawn_blocking(move || {
            resolve_password_update(&stored_hash, patch.password.as_deref())
        })
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?
        .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let updated = self
            .users
            .update(&user)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {id}")))?;

        tracing::info!(requester_id = requester.id, user_id = id, "User updated");
        Ok(updated)
    }

    async fn find(&self, id: i64) -> Result<User, ServiceError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {id}")))
    }
}

fn identity_of(user: &User) -> Identity {
    Identity::new(user.id, user.role)
}

/// 해싱은 의도적으로 느리므로 blocking 풀에서 실행.
async fn hash_blocking(password: String) -> Result<String, ServiceError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?
        .map_err(|e| ServiceError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{DenyReason, DEFAULT_TOKEN_TTL_SECS};
    use crate::repository::InMemoryUserRepository;
    use secrecy::SecretString;

    struct Fixture {
        service: UserService,
        repo: Arc<InMemoryUserRepository>,
        tokens: Arc<TokenService>,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryUserRepository::new());
        let tokens = Arc::new(TokenService::new(
            &SecretString::from("user-service-test-secret".to_string()),
            chrono::Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        ));
        let service = UserService::new(repo.clone(), Arc::clone(&tokens));
        Fixture {
            service,
            repo,
            tokens,
        }
    }

    async fn seed(repo: &InMemoryUserRepository, id: i64, role: Role) -> User {
        let user = User {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            password_hash: hash_password("secret").unwrap(),
            role,
        };
        repo.insert(user.clone()).await;
        user
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            username: "dave".to_string(),
            email: email.to_string(),
            password: "correct horse".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_stores_hash_and_user_role() {
        let f = fixture();
        let user = f.service.register(new_user("dave@example.com")).await.unwrap();

        assert_eq!(user.role, Role::User);
        assert_ne!(user.password_hash, "correct horse");
        assert!(password_matches("correct horse", &user.password_hash));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let f = fixture();
        f.service.register(new_user("dave@example.com")).await.unwrap();

        let err = f
            .service
            .register(new_user("dave@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(f.repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let f = fixture();
        let user = f.service.register(new_user("dave@example.com")).await.unwrap();

        let response = f
            .service
            .login(LoginRequest {
                email: "dave@example.com".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, DEFAULT_TOKEN_TTL_SECS);
        assert_eq!(
            f.tokens.verify(&response.token).unwrap(),
            Identity::new(user.id, Role::User)
        );
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let f = fixture();
        f.service.register(new_user("dave@example.com")).await.unwrap();

        let wrong_password = f
            .service
            .login(LoginRequest {
                email: "dave@example.com".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();
        let unknown_email = f
            .service
            .login(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, ServiceError::InvalidCredentials));
        assert!(matches!(unknown_email, ServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_with_corrupt_hash_fails_closed() {
        let f = fixture();
        f.repo
            .insert(User {
                id: 1,
                username: "eve".to_string(),
                email: "eve@example.com".to_string(),
                password_hash: "not-a-hash".to_string(),
                role: Role::Admin,
            })
            .await;

        let err = f
            .service
            .login(LoginRequest {
                email: "eve@example.com".to_string(),
                password: "not-a-hash".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_super_admin() {
        let f = fixture();
        let admin = seed(&f.repo, 7, Role::Admin).await;
        seed(&f.repo, 9, Role::SuperAdmin).await;

        let err = f
            .service
            .delete(&identity_of(&admin), 9)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Forbidden(DenyReason::DeleteSuperAdmin)
        ));
        assert!(f.service.get(9).await.is_ok());
    }

    #[tokio::test]
    async fn test_super_admin_cannot_delete_self() {
        let f = fixture();
        let root = seed(&f.repo, 9, Role::SuperAdmin).await;

        let err = f.service.delete(&identity_of(&root), 9).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Forbidden(DenyReason::SuperAdminSelfDelete)
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_not_found() {
        let f = fixture();
        let root = seed(&f.repo, 1, Role::SuperAdmin).await;

        let err = f.service.delete(&identity_of(&root), 42).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_admin_deletes_user() {
        let f = fixture();
        let admin = seed(&f.repo, 1, Role::Admin).await;
        seed(&f.repo, 2, Role::User).await;

        f.service.delete(&identity_of(&admin), 2).await.unwrap();
        assert!(matches!(
            f.service.get(2).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_role_is_policy_checked() {
        let f = fixture();
        let admin = seed(&f.repo, 1, Role::Admin).await;
        seed(&f.repo, 2, Role::User).await;

        let promote_to_root = UserPatch {
            role: Some(Role::SuperAdmin),
            ..Default::default()
        };
        let err = f
            .service
            .update(&identity_of(&admin), 2, promote_to_root)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Forbidden(DenyReason::AssignSuperAdmin)
        ));

        let promote_to_admin = UserPatch {
            role: Some(Role::Admin),
            ..Default::default()
        };
        let updated = f
            .service
            .update(&identity_of(&admin), 2, promote_to_admin)
            .await
            .unwrap();
        assert_eq!(updated.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_plain_user_cannot_change_own_role() {
        let f = fixture();
        let user = seed(&f.repo, 3, Role::User).await;

        let patch = UserPatch {
            role: Some(Role::User),
            ..Default::default()
        };
        let err = f
            .service
            .update(&identity_of(&user), 3, patch)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Forbidden(DenyReason::ChangeRoleRequiresAdmin)
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_hash_when_echoed_back() {
        let f = fixture();
        let user = seed(&f.repo, 3, Role::User).await;

        let patch = UserPatch {
            username: Some("renamed".to_string()),
            password: Some(user.password_hash.clone()),
            ..Default::default()
        };
        let updated = f
            .service
            .update(&identity_of(&user), 3, patch)
            .await
            .unwrap();

        assert_eq!(updated.username, "renamed");
        assert_eq!(updated.password_hash, user.password_hash);
        assert!(password_matches("secret", &updated.password_hash));
    }

    #[tokio::test]
    async fn test_update_rehashes_new_password() {
        let f = fixture();
        let user = seed(&f.repo, 3, Role::User).await;

        let patch = UserPatch {
            password: Some("new secret".to_string()),
            ..Default::default()
        };
        let updated = f
            .service
            .update(&identity_of(&user), 3, patch)
            .await
            .unwrap();

        assert!(password_matches("new secret", &updated.password_hash));
        assert!(!password_matches("secret", &updated.password_hash));
    }

    #[tokio::test]
    async fn test_list_returns_summaries() {
        let f = fixture();
        seed(&f.repo, 1, Role::User).await;
        seed(&f.repo, 2, Role::Admin).await;

        let users = f.service.list(ListQuery::default()).await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].role, Role::Admin);

        let invalid = ListQuery {
            limit: 0,
            ..ListQuery::default()
        };
        assert!(matches!(
            f.service.list(invalid).await,
            Err(ServiceError::Validation(_))
        ));
    }
}
