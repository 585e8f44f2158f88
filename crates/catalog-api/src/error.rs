//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "FORBIDDEN",
///   "message": "only super admin can delete an admin.",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "INVALID_TOKEN", "NOT_FOUND", "TOO_MANY_REQUESTS")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp, 선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    ///
    /// ```
    /// use catalog_api::error::ApiErrorResponse;
    ///
    /// let error = ApiErrorResponse::new("NOT_FOUND", "Product not found");
    /// assert!(error.timestamp.is_some());
    /// ```
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }

    /// 타임스탬프 없는 간단한 에러.
    ///
    /// 인증/속도 제한 응답처럼 본문이 항상 같아야 하는 경우에 사용합니다.
    pub fn simple(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: None,
        }
    }

    /// 상태 코드와 묶어 핸들러 에러로 변환.
    pub fn with_status(self, status: StatusCode) -> (StatusCode, Json<ApiErrorResponse>) {
        (status, Json(self))
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

// ==================== Result Type Alias ====================

/// API 핸들러 Result 타입 별칭.
///
/// ```ignore
/// async fn get_product(
///     Path(id): Path<i64>,
///     State(state): State<Arc<AppState>>,
/// ) -> ApiResult<Json<Product>> {
///     Ok(Json(state.products.get(id).await?))
/// }
/// ```
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_response_new() {
        let error = ApiErrorResponse::new("TEST_ERROR", "Test message");
        assert_eq!(error.code, "TEST_ERROR");
        assert_eq!(error.message, "Test message");
        assert!(error.timestamp.is_some());
        assert!(error.details.is_none());
    }

    #[test]
    fn test_api_error_response_with_details() {
        let details = serde_json::json!({"field": "email", "reason": "invalid format"});
        let error = ApiErrorResponse::with_details("VALIDATION_ERROR", "Invalid input", details);
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert!(error.details.is_some());
        assert!(error.timestamp.is_some());
    }

    #[test]
    fn test_json_serialization_simple() {
        let error = ApiErrorResponse::simple("TOO_MANY_REQUESTS", "Too many requests");
        let json = serde_json::to_string(&error).unwrap();

        assert!(!json.contains("timestamp"));
        assert!(!json.contains("details"));
        assert!(json.contains(r#""code":"TOO_MANY_REQUESTS""#));
        assert!(json.contains(r#""message":"Too many requests""#));
    }

    #[test]
    fn test_with_status() {
        let (status, Json(body)) =
            ApiErrorResponse::simple("NOT_FOUND", "user 3 not found").with_status(StatusCode::NOT_FOUND);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.to_string(), "[NOT_FOUND] user 3 not found");
    }
}
