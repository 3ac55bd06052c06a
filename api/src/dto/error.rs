//! Error response DTOs

use actix_web::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use nb_shared::errors::ErrorResponse;

/// Body returned with a 429 when the admission check rejects a request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitResponse {
    /// Numeric HTTP status, always 429
    pub status: u16,
    pub title: String,
    pub detail: String,
    /// Seconds until a token should be available again
    pub retry_after: u64,
    pub timestamp: DateTime<Utc>,
}

impl RateLimitResponse {
    pub fn new(retry_after: u64) -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS.as_u16(),
            title: "Too many requests".to_string(),
            detail: format!(
                "Request quota exceeded. Try again after {} seconds.",
                retry_after
            ),
            retry_after,
            timestamp: Utc::now(),
        }
    }
}

/// Extension trait for ErrorResponse to add actix-web specific methods
pub trait ErrorResponseExt {
    fn to_response(&self, status: StatusCode) -> actix_web::HttpResponse;
}

impl ErrorResponseExt for ErrorResponse {
    fn to_response(&self, status: StatusCode) -> actix_web::HttpResponse {
        actix_web::HttpResponse::build(status).json(self)
    }
}
