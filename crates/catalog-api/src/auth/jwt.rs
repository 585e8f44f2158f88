//! JWT 토큰 처리.
//!
//! 서명된 만료형 Bearer 토큰의 발급/검증. 검증은 상태가 없습니다:
//! 서버 측 폐기 목록이 없으므로 발급된 토큰은 만료 전까지 유효하며,
//! 토큰에 담긴 역할도 만료 전까지 그대로 유지됩니다.

use catalog_core::{AuthConfig, CatalogResult, Role};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// 기본 토큰 유효 기간 (2시간).
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 2 * 60 * 60;

/// 검증된 요청 주체.
///
/// 토큰 검증이 성공했을 때만 생성되며, 해당 요청 처리 동안에만 신뢰합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// 사용자 ID
    pub id: i64,
    /// 사용자 역할
    pub role: Role,
}

impl Identity {
    pub fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }
}

/// JWT 페이로드.
///
/// 와이어 형식: `{id, email, role, iat, exp}` (`exp`/`iat`는 Unix timestamp).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// 사용자 ID
    pub id: i64,
    /// 사용자 이메일
    pub email: String,
    /// 사용자 역할
    pub role: Role,
    /// Issued At - 토큰 발급 시간
    pub iat: i64,
    /// Expiration - 토큰 만료 시간
    pub exp: i64,
}

impl Claims {
    /// 발급 시각과 유효 기간으로 Claims 생성.
    ///
    /// 발급 시각은 초 단위로 자르므로 유효 구간은 정확히 `[iat, iat + ttl)`입니다.
    pub fn new(
        identity: &Identity,
        email: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let issued_at = issued_at.trunc_subsecs(0);
        Self {
            id: identity.id,
            email: email.into(),
            role: identity.role,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    /// 토큰이 담고 있는 주체.
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.role)
    }

    /// `now` 시점에 만료되었는지 확인.
    ///
    /// 만료 시각과 같은 시점도 만료로 봅니다 (`exp > now`일 때만 유효).
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}

/// 토큰 발급 에러.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
}

/// 토큰 검증 에러.
///
/// 호출자에게는 모두 동일한 401로 보이지만, 진단 로그에는 구분해서 남깁니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    #[error("잘못된 토큰 형식")]
    Malformed,
    #[error("토큰 서명이 유효하지 않습니다")]
    BadSignature,
    #[error("토큰이 만료되었습니다")]
    Expired,
}

impl VerificationError {
    /// 메트릭/로그 라벨.
    pub fn kind(&self) -> &'static str {
        match self {
            VerificationError::Malformed => "malformed",
            VerificationError::BadSignature => "bad_signature",
            VerificationError::Expired => "expired",
        }
    }
}

/// 토큰 발급/검증 서비스.
///
/// 서명 키는 시작 시 한 번 설정되고 이후 변경되지 않습니다.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// 새 토큰 서비스 생성.
    ///
    /// 빈 키도 받아들입니다 (형식상 유효하지만 보안상 무가치한 토큰이 발급됨).
    /// 빈 키 거부는 [`TokenService::from_config`] / `AppConfig::validate`의 책임입니다.
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let key = secret.expose_secret().as_bytes();

        // exp는 주입된 시각으로 직접 검사 (verify_at)
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(key),
            decoding_key: DecodingKey::from_secret(key),
            validation,
            ttl,
        }
    }

    /// 설정에서 생성. 서명 키가 없거나 비어 있으면 설정 에러.
    pub fn from_config(config: &AuthConfig) -> CatalogResult<Self> {
        let secret = config.signing_secret()?;
        Ok(Self::new(&secret, Duration::seconds(config.token_ttl_secs)))
    }

    /// 토큰 유효 기간 (초).
    pub fn expires_in_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// 현재 시각 기준으로 토큰 발급.
    pub fn issue(&self, identity: &Identity, email: &str) -> Result<String, TokenError> {
        self.issue_at(identity, email, Utc::now())
    }

    /// 지정한 발급 시각으로 토큰 발급.
    pub fn issue_at(
        &self,
        identity: &Identity,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(identity, email, issued_at, self.ttl);
        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// 현재 시각 기준으로 토큰 검증.
    pub fn verify(&self, token: &str) -> Result<Identity, VerificationError> {
        self.verify_at(token, Utc::now())
    }

    /// `now` 시점 기준으로 토큰 검증.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, VerificationError> {
        self.decode_claims_at(token, now).map(|claims| claims.identity())
    }

    /// 서명과 만료를 검사하고 전체 Claims 반환.
    pub fn decode_claims_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Claims, VerificationError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => VerificationError::BadSignature,
                ErrorKind::ExpiredSignature => VerificationError::Expired,
                _ => VerificationError::Malformed,
            }
        })?;

        if data.claims.is_expired_at(now) {
            return Err(VerificationError::Expired);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    fn service(secret: &str) -> TokenService {
        TokenService::new(
            &SecretString::from(secret.to_string()),
            Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        )
    }

    fn segments(token: &str) -> Vec<&str> {
        token.split('.').collect()
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let tokens = service(TEST_SECRET);
        let identity = Identity::new(42, Role::Admin);

        let token = tokens.issue(&identity, "admin@example.com").unwrap();
        assert_eq!(segments(&token).len(), 3);

        let verified = tokens.verify(&token).unwrap();
        assert_eq!(verified, identity);
    }

    #[test]
    fn test_claims_carry_email_and_expiry() {
        let tokens = service(TEST_SECRET);
        let issued_at = Utc::now();
        let token = tokens
            .issue_at(&Identity::new(1, Role::User), "u@example.com", issued_at)
            .unwrap();

        let claims = tokens.decode_claims_at(&token, issued_at).unwrap();
        assert_eq!(claims.email, "u@example.com");
        assert_eq!(claims.iat, issued_at.timestamp());
        assert_eq!(claims.exp, issued_at.timestamp() + DEFAULT_TOKEN_TTL_SECS);
    }

    #[test]
    fn test_subsecond_issue_time_keeps_full_window() {
        let tokens = service(TEST_SECRET);
        let whole = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let issued_at = whole + Duration::milliseconds(900);
        let token = tokens
            .issue_at(&Identity::new(5, Role::User), "u@example.com", issued_at)
            .unwrap();

        let claims = tokens.decode_claims_at(&token, issued_at).unwrap();
        assert_eq!(claims.iat, whole.timestamp());
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL_SECS);

        let almost = whole + Duration::seconds(DEFAULT_TOKEN_TTL_SECS) - Duration::milliseconds(1);
        assert!(tokens.verify_at(&token, almost).is_ok());
        assert!(matches!(
            tokens.verify_at(&token, whole + Duration::seconds(DEFAULT_TOKEN_TTL_SECS)),
            Err(VerificationError::Expired)
        ));
    }

    #[test]
    fn test_wire_format_claim_names() {
        let tokens = service(TEST_SECRET);
        let token = tokens
            .issue(&Identity::new(5, Role::SuperAdmin), "root@example.com")
            .unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let raw = decode::<serde_json::Value>(
            &token,
            &DecodingKey::from_secret(TEST_SECRET.as_bytes()),
            &validation,
        )
        .unwrap()
        .claims;

        assert_eq!(raw["id"], 5);
        assert_eq!(raw["email"], "root@example.com");
        assert_eq!(raw["role"], "super_admin");
        assert!(raw["exp"].is_i64());
    }

    #[test]
    fn test_expiry_boundary() {
        let tokens = service(TEST_SECRET);
        let issued_at = Utc::now();
        let identity = Identity::new(7, Role::User);
        let token = tokens.issue_at(&identity, "u@example.com", issued_at).unwrap();

        assert_eq!(
            tokens.verify_at(&token, issued_at + Duration::seconds(7199)),
            Ok(identity)
        );
        assert_eq!(
            tokens.verify_at(&token, issued_at + Duration::seconds(7200)),
            Err(VerificationError::Expired)
        );
        assert_eq!(
            tokens.verify_at(&token, issued_at + Duration::seconds(7201)),
            Err(VerificationError::Expired)
        );
    }

    #[test]
    fn test_token_issued_in_the_past_is_expired_now() {
        let tokens = service(TEST_SECRET);
        let token = tokens
            .issue_at(
                &Identity::new(1, Role::User),
                "u@example.com",
                Utc::now() - Duration::hours(3),
            )
            .unwrap();

        assert_eq!(tokens.verify(&token), Err(VerificationError::Expired));
    }

    #[test]
    fn test_wrong_secret_is_bad_signature() {
        let token = service(TEST_SECRET)
            .issue(&Identity::new(1, Role::User), "u@example.com")
            .unwrap();

        let result = service("wrong-secret-key-for-testing-minimum-32-chars").verify(&token);
        assert_eq!(result, Err(VerificationError::BadSignature));
    }

    #[test]
    fn test_swapped_signature_is_bad_signature() {
        let tokens = service(TEST_SECRET);
        let other = service("another-secret-key-for-testing-minimum-32");
        let identity = Identity::new(3, Role::User);
        let issued_at = Utc::now();

        let genuine = tokens.issue_at(&identity, "u@example.com", issued_at).unwrap();
        let foreign = other.issue_at(&identity, "u@example.com", issued_at).unwrap();

        let g = segments(&genuine);
        let f = segments(&foreign);
        let forged = format!("{}.{}.{}", g[0], g[1], f[2]);

        assert_eq!(tokens.verify(&forged), Err(VerificationError::BadSignature));
    }

    #[test]
    fn test_swapped_payload_is_bad_signature() {
        let tokens = service(TEST_SECRET);
        let user_token = tokens
            .issue(&Identity::new(3, Role::User), "u@example.com")
            .unwrap();
        let admin_token = tokens
            .issue(&Identity::new(3, Role::SuperAdmin), "u@example.com")
            .unwrap();

        // 일반 사용자 서명에 super_admin 페이로드를 붙여 권한 상승 시도
        let u = segments(&user_token);
        let a = segments(&admin_token);
        let forged = format!("{}.{}.{}", u[0], a[1], u[2]);

        assert_eq!(tokens.verify(&forged), Err(VerificationError::BadSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let tokens = service(TEST_SECRET);
        assert_eq!(tokens.verify("garbage"), Err(VerificationError::Malformed));
        assert_eq!(
            tokens.verify("invalid.token.here"),
            Err(VerificationError::Malformed)
        );
        assert_eq!(tokens.verify(""), Err(VerificationError::Malformed));
    }

    #[test]
    fn test_unknown_role_is_malformed() {
        let claims = serde_json::json!({
            "id": 1,
            "email": "u@example.com",
            "role": "root",
            "iat": Utc::now().timestamp(),
            "exp": Utc::now().timestamp() + 60,
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(
            service(TEST_SECRET).verify(&token),
            Err(VerificationError::Malformed)
        );
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let claims = Claims::new(
            &Identity::new(1, Role::Admin),
            "u@example.com",
            Utc::now(),
            Duration::hours(1),
        );
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert!(service(TEST_SECRET).verify(&token).is_err());
    }

    #[test]
    fn test_empty_secret_still_issues_token() {
        let tokens = service("");
        let token = tokens
            .issue(&Identity::new(1, Role::User), "u@example.com")
            .unwrap();

        assert_eq!(segments(&token).len(), 3);
        assert!(tokens.verify(&token).is_ok());
    }

    #[test]
    fn test_from_config_rejects_missing_secret() {
        let config = AuthConfig::default();
        assert!(TokenService::from_config(&config).is_err());

        let config = AuthConfig {
            jwt_secret: Some(TEST_SECRET.to_string()),
            token_ttl_secs: 60,
        };
        let tokens = TokenService::from_config(&config).unwrap();
        assert_eq!(tokens.expires_in_secs(), 60);
    }
}
