//! Rate limiting middleware for API endpoints
//!
//! Bounds the request rate per logical client identity with a token-bucket
//! algorithm. Buckets live in a shared in-process map, refill continuously
//! at the configured rate, and are created lazily on first sight of an
//! identity. Admitted responses carry quota headers; rejections return 429
//! with a Retry-After hint and a structured body.

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    http::StatusCode,
    web, Error, HttpMessage, HttpResponse, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use std::{
    collections::HashMap,
    fmt,
    future::{ready, Ready},
    rc::Rc,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use nb_shared::config::{ClientIdSource, RateLimitConfig};

use crate::dto::error::RateLimitResponse;
use crate::middleware::auth::AuthContext;

fn header_limit() -> HeaderName {
    HeaderName::from_static("x-ratelimit-limit")
}

fn header_remaining() -> HeaderName {
    HeaderName::from_static("x-ratelimit-remaining")
}

fn header_client_id() -> HeaderName {
    HeaderName::from_static("x-ratelimit-client-id")
}

/// Outcome of an admission attempt
#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionDecision {
    /// A token was withdrawn; `remaining` is the whole-token balance left
    Admitted { remaining: u32 },
    /// The bucket is empty; retry after the advertised delay
    Rejected { retry_after: Duration },
}

/// Per-identity quota state
#[derive(Debug)]
struct TokenBucket {
    /// Fractional token balance, refilled lazily on access
    tokens: f64,
    /// When the balance was last brought up to date
    last_refill: Instant,
    /// Requests currently parked waiting for this bucket
    waiters: u32,
}

impl TokenBucket {
    fn full(capacity: u32) -> Self {
        Self {
            tokens: capacity as f64,
            last_refill: Instant::now(),
            waiters: 0,
        }
    }
}

/// Shared token-bucket limiter keyed by client identity
///
/// One bucket per identity, created on first reference and never evicted.
/// Withdrawals are serialized by the map mutex; refill is computed from
/// wall-clock elapsed time on every access, so no background task runs.
pub struct TokenBucketRateLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
    config: RateLimitConfig,
}

impl TokenBucketRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Tokens added per second of elapsed time
    fn refill_rate(&self) -> f64 {
        if self.config.replenishment_period_seconds == 0 {
            return 0.0;
        }
        self.config.tokens_per_period as f64 / self.config.replenishment_period_seconds as f64
    }

    /// Atomically attempt to withdraw one token for `client_id`
    pub fn try_withdraw(&self, client_id: &str) -> AdmissionDecision {
        let capacity = self.config.token_limit;
        let rate = self.refill_rate();

        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        let bucket = buckets
            .entry(client_id.to_string())
            .or_insert_with(|| TokenBucket::full(capacity));

        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * rate).min(capacity as f64);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            AdmissionDecision::Admitted {
                remaining: bucket.tokens as u32,
            }
        } else {
            let retry_after = if rate > 0.0 {
                Duration::from_secs_f64((1.0 - bucket.tokens) / rate)
            } else {
                Duration::from_secs(self.config.default_retry_after_seconds)
            };
            AdmissionDecision::Rejected { retry_after }
        }
    }

    /// Reserve a queue slot for `client_id`, if the bounded queue has room
    fn try_enqueue(&self, client_id: &str) -> bool {
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        match buckets.get_mut(client_id) {
            Some(bucket) if bucket.waiters < self.config.queue_limit => {
                bucket.waiters += 1;
                true
            }
            _ => false,
        }
    }

    fn leave_queue(&self, client_id: &str) {
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(bucket) = buckets.get_mut(client_id) {
            bucket.waiters = bucket.waiters.saturating_sub(1);
        }
    }

    /// Withdraw a token, waiting one refill interval in the bounded queue
    /// if the first attempt finds the bucket empty
    pub async fn acquire(&self, client_id: &str) -> AdmissionDecision {
        let first = self.try_withdraw(client_id);
        let retry_after = match first {
            AdmissionDecision::Admitted { .. } => return first,
            AdmissionDecision::Rejected { retry_after } => retry_after,
        };

        if !self.try_enqueue(client_id) {
            return AdmissionDecision::Rejected { retry_after };
        }

        tokio::time::sleep(retry_after).await;
        self.leave_queue(client_id);
        self.try_withdraw(client_id)
    }
}

/// Rate limiter middleware factory
pub struct RateLimiter {
    limiter: Arc<TokenBucketRateLimiter>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            limiter: Arc::new(TokenBucketRateLimiter::new(config)),
        }
    }

    /// Share a limiter across several `App` instances (one per worker)
    pub fn from_limiter(limiter: Arc<TokenBucketRateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimiterMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimiterMiddleware {
            service: Rc::new(service),
            limiter: Arc::clone(&self.limiter),
        }))
    }
}

/// Rate limiter middleware service
pub struct RateLimiterMiddleware<S> {
    service: Rc<S>,
    limiter: Arc<TokenBucketRateLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimiterMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let limiter = Arc::clone(&self.limiter);

        Box::pin(async move {
            let config = limiter.config();

            if !config.enabled || config.is_path_excluded(req.path()) {
                return service.call(req).await;
            }

            let client_id = resolve_client_id(&req, &config.client_id_source);

            if config.is_client_whitelisted(&client_id) {
                return service.call(req).await;
            }

            let limit = config.token_limit;

            match limiter.acquire(&client_id).await {
                AdmissionDecision::Admitted { remaining } => {
                    let mut res = service.call(req).await?;
                    append_quota_headers(res.headers_mut(), limit, remaining, &client_id);
                    Ok(res)
                }
                AdmissionDecision::Rejected { retry_after } => {
                    let retry_after_seconds = retry_after.as_secs().max(1);
                    log::warn!(
                        "Rate limit exceeded for client {} (retry after {}s)",
                        client_id,
                        retry_after_seconds
                    );
                    Err(RateLimitRejection {
                        limit,
                        client_id,
                        retry_after_seconds,
                    }
                    .into())
                }
            }
        })
    }
}

fn append_quota_headers(
    headers: &mut actix_web::http::header::HeaderMap,
    limit: u32,
    remaining: u32,
    client_id: &str,
) {
    headers.insert(header_limit(), HeaderValue::from(limit));
    headers.insert(header_remaining(), HeaderValue::from(remaining));
    if let Ok(value) = HeaderValue::from_str(client_id) {
        headers.insert(header_client_id(), value);
    }
}

/// Derive the client identity per the configured source
fn resolve_client_id(req: &ServiceRequest, source: &ClientIdSource) -> String {
    match source {
        ClientIdSource::IpAddress => get_client_ip(req),
        ClientIdSource::ApiKey => extract_api_key(req).unwrap_or_else(|| "unknown".to_string()),
        ClientIdSource::UserId => req
            .extensions()
            .get::<AuthContext>()
            .map(|ctx| ctx.username.clone())
            .unwrap_or_else(|| get_client_ip(req)),
    }
}

/// Extract an API key from `Authorization: ApiKey <value>` or the
/// `api_key` query parameter
fn extract_api_key(req: &ServiceRequest) -> Option<String> {
    if let Some(header) = req.headers().get("Authorization") {
        if let Ok(value) = header.to_str() {
            if let Some(key) = value.strip_prefix("ApiKey ") {
                let key = key.trim();
                if !key.is_empty() {
                    return Some(key.to_string());
                }
            }
        }
    }

    // Query parsing percent-decodes, so an encoded key maps to the same
    // bucket as its header form
    web::Query::<HashMap<String, String>>::from_query(req.query_string())
        .ok()
        .and_then(|query| query.get("api_key").cloned())
        .filter(|key| !key.is_empty())
}

/// Get client IP address from request
fn get_client_ip(req: &ServiceRequest) -> String {
    // X-Forwarded-For first for reverse proxy setups
    if let Some(forwarded_for) = req.headers().get("X-Forwarded-For") {
        if let Ok(forwarded_str) = forwarded_for.to_str() {
            if let Some(ip) = forwarded_str.split(',').next() {
                let ip = ip.trim();
                if !ip.is_empty() {
                    return ip.to_string();
                }
            }
        }
    }

    if let Some(real_ip) = req.headers().get("X-Real-IP") {
        if let Ok(ip_str) = real_ip.to_str() {
            return ip_str.to_string();
        }
    }

    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

/// Rejection carrying everything needed to render the 429 response
#[derive(Debug)]
struct RateLimitRejection {
    limit: u32,
    client_id: String,
    retry_after_seconds: u64,
}

impl fmt::Display for RateLimitRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rate limit exceeded for client {} (retry after {}s)",
            self.client_id, self.retry_after_seconds
        )
    }
}

impl ResponseError for RateLimitRejection {
    fn status_code(&self) -> StatusCode {
        StatusCode::TOO_MANY_REQUESTS
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::TooManyRequests();
        builder
            .insert_header(("Retry-After", self.retry_after_seconds.to_string()))
            .insert_header((header_limit(), HeaderValue::from(self.limit)))
            .insert_header((header_remaining(), HeaderValue::from(0u32)));
        if let Ok(value) = HeaderValue::from_str(&self.client_id) {
            builder.insert_header((header_client_id(), value));
        }
        builder.json(RateLimitResponse::new(self.retry_after_seconds))
    }
}
