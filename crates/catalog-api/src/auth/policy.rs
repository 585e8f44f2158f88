//! 역할 기반 인가 정책.
//!
//! 두 단계로 적용됩니다:
//! - 게이트 단계: 라우트가 요구하는 최소 조건 (공개 / 인증 / 관리자)
//! - 대상 인식 단계: 사용자 변경 작업에서 요청자와 대상의 역할/ID로 판단
//!
//! 판단은 순수 함수이며 내부 에러로 실패하지 않습니다.

use catalog_core::Role;

use super::jwt::Identity;
use super::middleware::AuthError;
use crate::metrics::record_authorization_denial;

/// 관리자 게이트 거부 사유.
pub const ADMIN_ONLY_MESSAGE: &str = "only admins are allowed here.";

/// 라우트 게이트 요구 수준.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRequirement {
    /// 신원 불필요
    Public,
    /// 유효한 신원 필요
    Authenticated,
    /// `admin` 또는 `super_admin` 필요
    Admin,
}

/// 게이트 검사.
///
/// 신원이 없으면 401, 역할이 부족하면 403입니다.
pub fn check_gate(
    requirement: GateRequirement,
    identity: Option<&Identity>,
) -> Result<(), AuthError> {
    match requirement {
        GateRequirement::Public => Ok(()),
        GateRequirement::Authenticated => identity.map(|_| ()).ok_or(AuthError::MissingToken),
        GateRequirement::Admin => {
            let identity = identity.ok_or(AuthError::MissingToken)?;
            if identity.role.is_admin() {
                Ok(())
            } else {
                Err(AuthError::Forbidden(ADMIN_ONLY_MESSAGE.to_string()))
            }
        }
    }
}

/// 대상 사용자에 대한 작업.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    /// 사용자 삭제
    Delete,
    /// 역할 변경 (새 역할)
    ChangeRole(Role),
}

/// 거부 사유.
///
/// 메시지는 호출자에게 그대로 전달됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    SuperAdminSelfDelete,
    DeleteSuperAdmin,
    DeleteAdmin,
    DeleteUser,
    ChangeRoleRequiresAdmin,
    ChangeElevatedRole,
    AssignSuperAdmin,
}

impl DenyReason {
    /// 사람이 읽을 수 있는 거부 사유.
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::SuperAdminSelfDelete => "super admin cannot delete themselves.",
            DenyReason::DeleteSuperAdmin => "only super admin can delete another super admin.",
            DenyReason::DeleteAdmin => "only super admin can delete an admin.",
            DenyReason::DeleteUser => "only admins can delete users.",
            DenyReason::ChangeRoleRequiresAdmin => "only admins can change user role.",
            DenyReason::ChangeElevatedRole => {
                "only super admin can change roles of admins or super admins."
            }
            DenyReason::AssignSuperAdmin => "only super admin can assign super admin role.",
        }
    }

    /// 메트릭/로그 라벨.
    pub fn label(&self) -> &'static str {
        match self {
            DenyReason::SuperAdminSelfDelete => "super_admin_self_delete",
            DenyReason::DeleteSuperAdmin => "delete_super_admin",
            DenyReason::DeleteAdmin => "delete_admin",
            DenyReason::DeleteUser => "delete_user",
            DenyReason::ChangeRoleRequiresAdmin => "change_role_requires_admin",
            DenyReason::ChangeElevatedRole => "change_elevated_role",
            DenyReason::AssignSuperAdmin => "assign_super_admin",
        }
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// 정책 판단 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    Deny(DenyReason),
}

impl PolicyDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PolicyDecision::Allow)
    }

    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            PolicyDecision::Allow => Ok(()),
            PolicyDecision::Deny(reason) => Err(reason),
        }
    }
}

impl From<Option<DenyReason>> for PolicyDecision {
    fn from(denial: Option<DenyReason>) -> Self {
        denial.map_or(PolicyDecision::Allow, PolicyDecision::Deny)
    }
}

/// 요청자가 대상 사용자에게 작업을 수행할 수 있는지 판단.
///
/// 규칙은 위에서부터 평가되며 첫 번째 거부가 결과가 됩니다.
/// 삭제는 자기 삭제 검사가 역할 비교보다 먼저입니다.
pub fn authorize(requester: &Identity, target: &Identity, action: UserAction) -> PolicyDecision {
    match action {
        UserAction::Delete => delete_denial(requester, target),
        UserAction::ChangeRole(new_role) => role_change_denial(requester, target, new_role),
    }
    .into()
}

fn delete_denial(requester: &Identity, target: &Identity) -> Option<DenyReason> {
    let by_super_admin = requester.role == Role::SuperAdmin;

    match target.role {
        Role::SuperAdmin if requester.id == target.id => Some(DenyReason::SuperAdminSelfDelete),
        Role::SuperAdmin if !by_super_admin => Some(DenyReason::DeleteSuperAdmin),
        Role::Admin if !by_super_admin => Some(DenyReason::DeleteAdmin),
        Role::User if !requester.role.is_admin() => Some(DenyReason::DeleteUser),
        _ => None,
    }
}

fn role_change_denial(
    requester: &Identity,
    target: &Identity,
    new_role: Role,
) -> Option<DenyReason> {
    let by_super_admin = requester.role == Role::SuperAdmin;

    if !requester.role.is_admin() {
        Some(DenyReason::ChangeRoleRequiresAdmin)
    } else if target.role.is_admin() && !by_super_admin {
        Some(DenyReason::ChangeElevatedRole)
    } else if new_role == Role::SuperAdmin && !by_super_admin {
        Some(DenyReason::AssignSuperAdmin)
    } else {
        None
    }
}

/// [`authorize`] 후 거부 시 로그와 메트릭을 남깁니다.
pub fn enforce(requester: &Identity, target: &Identity, action: UserAction) -> Result<(), DenyReason> {
    authorize(requester, target, action)
        .into_result()
        .inspect_err(|reason| {
            record_authorization_denial(reason.label());
            tracing::info!(
                requester_id = requester.id,
                requester_role = %requester.role,
                target_id = target.id,
                target_role = %target.role,
                action = ?action,
                reason = reason.message(),
                "Authorization denied"
            );
        })
}
