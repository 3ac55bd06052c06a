//! Domain-specific error types and error handling.

use chrono::{DateTime, Utc};
use nb_shared::errors::error_codes;
use thiserror::Error;

/// Authentication and token lifecycle errors
///
/// Failure messages are part of the contract: `InvalidCredentials` carries
/// the same text for an unknown email and a wrong password so callers
/// cannot enumerate registered accounts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("Please confirm your email before logging in.")]
    UnconfirmedAccount,

    #[error("Your account is locked out. Try again after {until}.")]
    LockedOut { until: DateTime<Utc> },

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid client request")]
    InvalidRequest,

    #[error("Account not found")]
    NotFound,
}

impl AuthError {
    /// Error code for client identification
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => error_codes::INVALID_CREDENTIALS,
            AuthError::UnconfirmedAccount => error_codes::UNCONFIRMED_ACCOUNT,
            AuthError::LockedOut { .. } => error_codes::LOCKED_OUT,
            AuthError::InvalidToken => error_codes::INVALID_TOKEN,
            AuthError::InvalidRequest => error_codes::INVALID_REQUEST,
            AuthError::NotFound => error_codes::NOT_FOUND,
        }
    }
}

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),
}

pub type DomainResult<T> = Result<T, DomainError>;
