//! 역할 계층.
//!
//! 모든 비교 기반 권한 결정(누가 누구에게 작업할 수 있는가)은
//! `User < Admin < SuperAdmin` 전순서를 사용합니다.

use serde::{Deserialize, Serialize};

/// 사용자 역할.
///
/// 선언 순서가 곧 권한 순서입니다. `PartialOrd`/`Ord`는 이 순서를 그대로 따릅니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// 일반 사용자
    User,
    /// 관리자 - 사용자/상품 삭제, 일반 사용자 역할 변경
    Admin,
    /// 최고 관리자 - 관리자 역할 관리 포함 모든 권한
    SuperAdmin,
}

impl Role {
    /// 역할의 우선순위 레벨 반환 (높을수록 더 많은 권한).
    pub fn level(&self) -> u8 {
        match self {
            Role::SuperAdmin => 100,
            Role::Admin => 50,
            Role::User => 10,
        }
    }

    /// 관리자 계열(`Admin`, `SuperAdmin`)인지 확인.
    pub fn is_admin(&self) -> bool {
        *self >= Role::Admin
    }

    /// 직렬화/저장에 쓰는 문자열 표현.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// 문자열에서 역할 파싱 (대소문자 무시).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            "super_admin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
