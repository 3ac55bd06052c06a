//! Authentication route handlers
//!
//! - Login (email/password exchange for a token pair)
//! - Token refresh (one-time refresh secret rotation)
//! - Revoke (invalidate the caller's refresh secret)

pub mod login;
pub mod refresh;
pub mod revoke;

use std::sync::Arc;

use nb_core::repositories::AccountRepository;
use nb_core::services::auth::AuthService;

/// Application state holding the shared auth service
pub struct AppState<A>
where
    A: AccountRepository,
{
    pub auth_service: Arc<AuthService<A>>,
}
