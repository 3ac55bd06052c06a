//! Shared utilities and common types for the NearBy server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types (rate limiting, JWT, lockout, server binding)
//! - Error types and response structures

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    ClientIdSource, JwtConfig, LockoutConfig, RateLimitConfig, ServerConfig,
};
pub use errors::{error_codes, ErrorResponse};
