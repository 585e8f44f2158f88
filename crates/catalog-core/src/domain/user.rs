//! 사용자 타입.
//!
//! - `User` - 저장된 사용자 엔티티 (비밀번호 해시 포함)
//! - `UserSummary` - 목록 조회용 요약 (해시 제외)
//! - `NewUser` - 회원가입 입력
//! - `UserPatch` - 부분 수정 입력
//! - `ListQuery` - 페이지네이션 + 이름 검색

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Role;

/// 사용자 엔티티.
///
/// `password_hash`는 직렬화되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
}

impl User {
    /// 목록 응답용 요약으로 변환.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// 사용자 요약 (목록 조회 결과).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

/// 회원가입 입력.
///
/// 역할은 받지 않습니다. 새 계정은 항상 `Role::User`로 저장됩니다.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// 사용자 부분 수정 입력.
///
/// `None` 필드는 변경하지 않습니다. 빈 비밀번호도 변경하지 않습니다.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserPatch {
    #[serde(default)]
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: Option<String>,
    #[serde(default)]
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// 허용되는 최대 페이지 번호.
pub const MAX_PAGE: i64 = 1_000_000;

/// 목록 조회 쿼리.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, max = 1_000_000, message = "page must be between 1 and 1000000"))]
    pub page: i64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: i64,
    #[serde(default)]
    pub name: Option<String>,
}

impl ListQuery {
    /// SQL OFFSET 값. 검증 전에 호출되어도 넘치지 않습니다.
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit.max(1))
    }

    /// 비어 있지 않은 이름 필터.
    pub fn name_filter(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            name: None,
        }
    }
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialization_hides_hash() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            role: Role::Admin,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
        assert!(json.contains(r#""role":"admin""#));
    }

    #[test]
    fn test_new_user_validation() {
        let valid = NewUser {
            username: "bob".to_string(),
            email: "bob@example.com".to_string(),
            password: "pw".to_string(),
        };
        assert!(valid.validate().is_ok());

        let missing_name = NewUser {
            username: String::new(),
            ..valid.clone()
        };
        assert!(missing_name.validate().is_err());

        let bad_email = NewUser {
            email: "not-an-email".to_string(),
            ..valid
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_user_patch_parses_role() {
        let patch: UserPatch = serde_json::from_str(r#"{"role":"super_admin"}"#).unwrap();
        assert_eq!(patch.role, Some(Role::SuperAdmin));
        assert!(patch.username.is_none());

        assert!(serde_json::from_str::<UserPatch>(r#"{"role":"root"}"#).is_err());
    }

    #[test]
    fn test_list_query_defaults_and_offset() {
        let query: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);
        assert_eq!(query.offset(), 0);

        let query = ListQuery {
            page: 3,
            limit: 20,
            name: Some("  ".to_string()),
        };
        assert_eq!(query.offset(), 40);
        assert!(query.name_filter().is_none());
        assert!(query.validate().is_ok());

        let invalid = ListQuery {
            page: 0,
            ..ListQuery::default()
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_list_query_rejects_huge_page() {
        let query = ListQuery {
            page: i64::MAX,
            limit: 100,
            name: None,
        };
        assert!(query.validate().is_err());
        assert_eq!(query.offset(), i64::MAX);

        let last = ListQuery {
            page: MAX_PAGE,
            limit: 100,
            name: None,
        };
        assert!(last.validate().is_ok());
        assert_eq!(last.offset(), (MAX_PAGE - 1) * 100);
    }
}
