//! Repository pattern for database operations.
//!
//! 데이터베이스 접근 로직을 서비스 계층에서 분리하여 관리합니다.
//! 서비스는 trait에만 의존하고, 운영에서는 PostgreSQL 구현을 주입합니다.

pub mod products;
pub mod users;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use products::{PgProductRepository, ProductRepository};
pub use users::{NewUserRecord, PgUserRepository, UserRepository};

#[cfg(any(test, feature = "test-utils"))]
pub use memory::{InMemoryProductRepository, InMemoryUserRepository};

use catalog_core::CatalogError;

/// 부분 일치 `ILIKE` 패턴. `%`, `_`, `\`는 문자 그대로 비교되도록 이스케이프.
///
/// 쿼리 쪽에서 `ESCAPE '\'`와 함께 사용합니다.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// 쓰기 쿼리 에러 변환. 유니크 제약 위반은 `Conflict`.
fn map_write_error(err: sqlx::Error, what: &str) -> CatalogError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            CatalogError::Conflict(format!("{what} already exists"))
        }
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_wraps_plain_text() {
        assert_eq!(contains_pattern("ali"), "%ali%");
        assert_eq!(contains_pattern(""), "%%");
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("50%"), r"%50\%%");
        assert_eq!(contains_pattern("a_b"), r"%a\_b%");
        assert_eq!(contains_pattern(r"c:\tmp"), r"%c:\\tmp%");
    }
}
