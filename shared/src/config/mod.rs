//! Configuration types shared across the server crates

pub mod auth;
pub mod rate_limit;
pub mod server;

pub use auth::{JwtConfig, LockoutConfig};
pub use rate_limit::{ClientIdSource, RateLimitConfig};
pub use server::ServerConfig;
