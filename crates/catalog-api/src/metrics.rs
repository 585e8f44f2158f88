//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 접근 제어(속도 제한, 인증, 인가) 메트릭을 수집하고
//! `/metrics` 엔드포인트로 노출합니다.

use axum::http::StatusCode;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// # 반환값
///
/// `/metrics` 엔드포인트에서 메트릭을 렌더링하기 위한 `PrometheusHandle`
///
/// # 에러
///
/// 레코더가 이미 설치되어 있으면 에러를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        // HTTP 요청 지속 시간 히스토그램 버킷 설정
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(method: &str, path: &str) {
    counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string())
        .increment(1);
}

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 접근 제어 메트릭 헬퍼 함수
// ============================================================================

/// 속도 제한 판정 카운터 증가.
pub fn record_rate_limit(allowed: bool) {
    let status = if allowed { "allowed" } else { "limited" };
    counter!("rate_limit_requests_total", "status" => status).increment(1);
}

/// 인증 실패 카운터 증가.
///
/// `kind`: missing, malformed, bad_signature, expired
pub fn record_auth_failure(kind: &'static str) {
    counter!("auth_failures_total", "kind" => kind).increment(1);
}

/// 게이트가 막은 응답 상태를 거부 사유 라벨로 분류.
///
/// 401은 `unauthorized`, 403은 `forbidden`, 429는 `rate_limited`.
/// 그 외 상태는 거부가 아니므로 `None`.
pub fn rejection_outcome(status: StatusCode) -> Option<&'static str> {
    match status {
        StatusCode::UNAUTHORIZED => Some("unauthorized"),
        StatusCode::FORBIDDEN => Some("forbidden"),
        StatusCode::TOO_MANY_REQUESTS => Some("rate_limited"),
        _ => None,
    }
}

/// 거부된 요청 카운터 증가.
pub fn record_request_rejection(path: &str, outcome: &'static str) {
    counter!(
        "http_request_rejections_total",
        "path" => path.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// 인가 거부 카운터 증가.
pub fn record_authorization_denial(reason: &'static str) {
    counter!("authorization_denials_total", "reason" => reason).increment(1);
}

// ============================================================================
// 경로 정규화 유틸리티
// ============================================================================

/// 경로에서 동적 파라미터를 정규화합니다.
///
/// 예: `/api/users/42` → `/api/users/:id`
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let is_numeric = !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit());
            if is_numeric {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
