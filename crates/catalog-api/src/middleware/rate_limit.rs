//! Rate limiting middleware.
//!
//! 클라이언트 주소별 Token Bucket 기반 rate limiting을 제공합니다.
//! 모든 버킷은 하나의 락으로 보호되며, 조회/생성/리필/차감은 한 번의 락 획득 안에서 끝납니다.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use catalog_core::RateLimitSettings;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use crate::error::ApiErrorResponse;
use crate::metrics::record_rate_limit;

/// 리필 직후 정수 토큰 수와 이만큼 이내로 차이 나면 그 정수로 맞춤.
///
/// `Duration`의 나노초 절삭 오차 흡수용이며 리필에서만 적용됩니다.
const REFILL_EPSILON: f64 = 1e-6;

/// Rate Limiter 설정.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    /// 버킷 용량 (순간 허용 요청 수)
    pub capacity: u32,
    /// 초당 리필되는 토큰 수
    pub refill_per_second: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 5,
            refill_per_second: 3.0,
        }
    }
}

impl RateLimitConfig {
    pub fn new(capacity: u32, refill_per_second: f64) -> Self {
        Self {
            capacity,
            refill_per_second,
        }
    }
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self::new(settings.capacity, settings.refill_per_second)
    }
}

/// Token Bucket 구조체.
#[derive(Debug)]
struct TokenBucket {
    /// 현재 토큰 수 (0 이상, 용량 이하)
    tokens: f64,
    /// 마지막 리필 시간
    last_refill: Instant,
}

impl TokenBucket {
    /// 가득 찬 버킷.
    fn new(config: &RateLimitConfig, now: Instant) -> Self {
        Self {
            tokens: f64::from(config.capacity),
            last_refill: now,
        }
    }

    /// 토큰 소비 시도.
    ///
    /// 성공하면 `true`, Rate limit 초과 시 `false` 반환.
    fn try_acquire(&mut self, config: &RateLimitConfig, now: Instant) -> bool {
        self.refill(config, now);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// 토큰 리필.
    ///
    /// 시계가 뒤로 가면 경과 시간은 0으로 취급하고 마지막 리필 시각도 되돌리지 않습니다.
    fn refill(&mut self, config: &RateLimitConfig, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        let capacity = f64::from(config.capacity);

        if elapsed <= 0.0 {
            return;
        }

        let refilled = (self.tokens + elapsed * config.refill_per_second).min(capacity);
        let nearest = refilled.round();
        self.tokens = if (refilled - nearest).abs() < REFILL_EPSILON {
            nearest
        } else {
            refilled
        };
        self.last_refill = now;
    }
}

/// Rate Limit 확인 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    /// 요청 허용됨
    Allowed,
    /// Rate limit 초과
    Limited,
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed)
    }
}

/// Rate Limiter.
///
/// IP 주소별로 Rate Limiting을 적용합니다. 버킷은 첫 요청 시 생성되고 프로세스가
/// 끝날 때까지 유지됩니다 (정리하지 않음).
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Mutex<HashMap<IpAddr, TokenBucket>>,
}

impl RateLimiter {
    /// 새 Rate Limiter 생성.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// 기본 설정(용량 5, 초당 3)으로 생성.
    pub fn with_defaults() -> Self {
        Self::new(RateLimitConfig::default())
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// 요청 허용 여부.
    pub fn allow(&self, ip: IpAddr) -> bool {
        self.check(ip).is_allowed()
    }

    /// 요청 허용 여부 확인.
    pub fn check(&self, ip: IpAddr) -> RateLimitResult {
        self.check_at(ip, Instant::now())
    }

    /// `now` 시점 기준으로 요청 허용 여부 확인.
    pub fn check_at(&self, ip: IpAddr, now: Instant) -> RateLimitResult {
        // 버킷 상태는 단순 산술이므로 poison 되어도 그대로 사용
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);

        let bucket = buckets
            .entry(ip)
            .or_insert_with(|| TokenBucket::new(&self.config, now));

        if bucket.try_acquire(&self.config, now) {
            RateLimitResult::Allowed
        } else {
            RateLimitResult::Limited
        }
    }

    /// 현재 추적 중인 IP 수 반환.
    pub fn tracked_keys(&self) -> usize {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Rate Limiting 미들웨어 함수.
///
/// 연결의 peer 주소(포트 제외)를 키로 사용합니다. 프록시 헤더는 보지 않습니다.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request);

    match limiter.check(ip) {
        RateLimitResult::Allowed => {
            record_rate_limit(true);
            next.run(request).await
        }
        RateLimitResult::Limited => {
            record_rate_limit(false);
            tracing::warn!(client_ip = %ip, "Rate limit exceeded");

            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ApiErrorResponse::simple(
                    "TOO_MANY_REQUESTS",
                    "Too many requests",
                )),
            )
                .into_response()
        }
    }
}

/// 요청의 연결 정보에서 클라이언트 IP 추출.
///
/// `ConnectInfo`가 없으면(프로세스 내부 호출) 미지정 주소를 키로 씁니다.
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}
