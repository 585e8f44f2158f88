//! 요청 단위 메트릭 미들웨어.
//!
//! 라우터 가장 바깥에 두어 게이트가 거부한 요청까지 함께 집계합니다.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::metrics::{
    normalize_path, record_http_duration, record_http_request, record_http_response,
    record_request_rejection, rejection_outcome,
};

/// 요청 수, 응답 상태, 처리 시간을 기록하는 미들웨어.
///
/// 401/403/429 응답은 `http_request_rejections_total`에도
/// `outcome` 라벨(unauthorized, forbidden, rate_limited)로 남습니다.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().as_str().to_owned();
    let path = normalize_path(request.uri().path());

    record_http_request(&method, &path);
    let response = next.run(request).await;

    let status = response.status();
    record_http_response(&method, &path, status.as_u16());
    record_http_duration(&method, &path, started.elapsed().as_secs_f64());

    if let Some(outcome) = rejection_outcome(status) {
        record_request_rejection(&path, outcome);
    }

    response
}
