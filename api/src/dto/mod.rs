pub mod auth;
pub mod error;

pub use auth::{AuthResponseDto, LoginRequest, RefreshRequest, RevokeResponse};
pub use error::{ErrorResponse, ErrorResponseExt, RateLimitResponse};
