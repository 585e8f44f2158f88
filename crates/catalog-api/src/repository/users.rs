//! User Repository
//!
//! 사용자 관련 데이터베이스 연산을 담당합니다.
//! 역할은 TEXT 컬럼(`user`, `admin`, `super_admin`)으로 저장됩니다.

use async_trait::async_trait;
use catalog_core::{CatalogError, CatalogResult, ListQuery, Role, User};
use sqlx::{FromRow, PgPool};

use super::{contains_pattern, map_write_error};

// ================================================================================================
// Types
// ================================================================================================

/// 저장할 새 사용자 (비밀번호는 이미 해싱됨).
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// users 테이블 레코드.
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    role: String,
}

impl TryFrom<UserRow> for User {
    type Error = CatalogError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role).ok_or_else(|| {
            CatalogError::Internal(format!("unknown role '{}' for user {}", row.role, row.id))
        })?;

        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role,
        })
    }
}

fn into_users(rows: Vec<UserRow>) -> CatalogResult<Vec<User>> {
    rows.into_iter().map(User::try_from).collect()
}

// ================================================================================================
// Repository
// ================================================================================================

/// 사용자 저장소.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 페이지 단위 목록 (이름 부분 일치, 대소문자 무시).
    async fn list(&self, query: &ListQuery) -> CatalogResult<Vec<User>>;

    async fn find_by_id(&self, id: i64) -> CatalogResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> CatalogResult<Option<User>>;

    /// 생성. 이메일이 중복이면 `Conflict`.
    async fn create(&self, user: NewUserRecord) -> CatalogResult<User>;

    /// 전체 필드 갱신. 대상이 없으면 `None`.
    async fn update(&self, user: &User) -> CatalogResult<Option<User>>;

    /// 삭제. 실제로 삭제되었으면 `true`.
    async fn delete(&self, id: i64) -> CatalogResult<bool>;
}

/// PostgreSQL 사용자 저장소.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn list(&self, query: &ListQuery) -> CatalogResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, role
            FROM users
            WHERE $3::TEXT IS NULL OR username ILIKE $3 ESCAPE '\'
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(query.limit)
        .bind(query.offset())
        .bind(query.name_filter().map(contains_pattern))
        .fetch_all(&self.pool)
        .await?;

        into_users(rows)
    }

    async fn find_by_id(&self, id: i64) -> CatalogResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, password_hash, role FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn find_by_email(&self, email: &str) -> CatalogResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, password_hash, role FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn create(&self, user: NewUserRecord) -> CatalogResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, role
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "email"))?;

        row.try_into()
    }

    async fn update(&self, user: &User) -> CatalogResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET username = $2, email = $3, password_hash = $4, role = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, email, password_hash, role
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "email"))?
        .map(User::try_from)
        .transpose()
    }

    async fn delete(&self, id: i64) -> CatalogResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str) -> UserRow {
        UserRow {
            id: 3,
            username: "carol".to_string(),
            email: "carol@example.com".to_string(),
            password_hash: "$argon2id$v=19$hash".to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn test_row_conversion_parses_role() {
        let user = User::try_from(row("super_admin")).unwrap();
        assert_eq!(user.role, Role::SuperAdmin);
        assert_eq!(user.email, "carol@example.com");
    }

    #[test]
    fn test_row_conversion_rejects_unknown_role() {
        let err = User::try_from(row("root")).unwrap_err();
        assert!(matches!(err, CatalogError::Internal(_)));
    }
}
