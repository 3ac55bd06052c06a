//! Maps domain errors to HTTP responses

use actix_web::{http::StatusCode, HttpResponse};
use uuid::Uuid;

use nb_core::errors::{AuthError, DomainError};
use nb_shared::errors::{error_codes, ErrorResponse};

use crate::dto::error::ErrorResponseExt;

/// Render a domain error as the appropriate HTTP response
///
/// Authentication failures map to 401, policy rejections to 403, and
/// anything unclassified collapses into a single 500 shape carrying a
/// trace id rather than the underlying error text.
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    match error {
        DomainError::Auth(auth_error) => handle_auth_error(auth_error),
        DomainError::Validation { message } => {
            ErrorResponse::new(error_codes::VALIDATION_ERROR, message)
                .to_response(StatusCode::BAD_REQUEST)
        }
        DomainError::Internal { message } => internal_error_response(&message),
    }
}

fn handle_auth_error(error: AuthError) -> HttpResponse {
    let status = match &error {
        AuthError::InvalidCredentials | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
        AuthError::UnconfirmedAccount | AuthError::LockedOut { .. } => StatusCode::FORBIDDEN,
        AuthError::InvalidRequest => StatusCode::BAD_REQUEST,
        AuthError::NotFound => StatusCode::NOT_FOUND,
    };

    let mut response = ErrorResponse::new(error.code(), error.to_string());
    if let AuthError::LockedOut { until } = &error {
        response = response.add_detail("locked_until", until.to_rfc3339());
    }

    response.to_response(status)
}

/// Single catch-all shape for unexpected failures
///
/// The caller gets a trace id they can quote; the detail goes to the log.
pub fn internal_error_response(detail: &str) -> HttpResponse {
    let trace_id = Uuid::new_v4().to_string();
    log::error!("Internal error [{}]: {}", trace_id, detail);

    ErrorResponse::new(error_codes::INTERNAL_ERROR, "An unexpected error occurred")
        .add_detail("trace_id", trace_id)
        .to_response(StatusCode::INTERNAL_SERVER_ERROR)
}
