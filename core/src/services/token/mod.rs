//! Token service module for JWT management
//!
//! This module handles all token-related operations:
//! - JWT access token generation and verification
//! - Expired-token validation for the refresh flow
//! - Refresh secret generation

mod config;
mod service;

pub use config::TokenServiceConfig;
pub use service::TokenService;
