//! Authentication service module
//!
//! This module provides the credential lifecycle:
//! - Email/password authentication with lockout policy
//! - Access token + refresh secret issuance
//! - One-time-use refresh secret rotation
//! - Revocation

mod config;
mod service;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use service::AuthService;
