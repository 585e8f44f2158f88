//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 비밀번호 해싱 및 검증. 모든 검증 경로는 실패 시 닫힙니다:
//! 내부 에러든 불일치든 "자격 증명 불일치"로 취급합니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("비밀번호 검증 실패")]
    VerificationFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
}

/// 비밀번호 해싱.
///
/// 솔트는 매번 새로 생성되므로 같은 비밀번호라도 해시가 다릅니다.
///
/// # Returns
///
/// PHC 형식의 해시 문자열 (예: `$argon2id$v=19$m=19456,t=2,p=1$...`)
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// 일치하면 `Ok(())`, 불일치 또는 해시 파싱 실패 시 `Err`.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::VerificationFailed)
}

/// 비밀번호 일치 여부 (fail-closed).
///
/// 어떤 에러든 `false`입니다.
pub fn password_matches(password: &str, hash: &str) -> bool {
    verify_password(password, hash).is_ok()
}

/// 사용자 수정 시 저장할 비밀번호 해시 결정.
///
/// 입력값이 없거나 비어 있거나 저장된 해시와 문자 그대로 같으면 기존 해시를 유지합니다.
/// 클라이언트가 조회한 해시를 그대로 돌려보내는 경우 해시를 다시 해싱하지 않기 위함입니다.
/// 그 외에는 입력값을 새 평문 비밀번호로 보고 해싱합니다.
pub fn resolve_password_update(
    stored_hash: &str,
    supplied: Option<&str>,
) -> Result<String, PasswordError> {
    match supplied {
        Some(password) if !password.is_empty() && password != stored_hash => {
            hash_password(password)
        }
        _ => Ok(stored_hash.to_string()),
    }
}
