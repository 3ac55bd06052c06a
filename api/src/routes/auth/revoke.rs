use actix_web::{web, HttpResponse};

use nb_core::repositories::AccountRepository;

use crate::dto::auth::RevokeResponse;
use crate::handlers::error_handler::handle_domain_error;
use crate::middleware::auth::AuthContext;

use super::AppState;

/// Handler for POST /api/v1/auth/revoke
///
/// Invalidates the caller's stored refresh secret. Requires a valid
/// bearer token; the already-issued access token stays usable until its
/// natural expiry.
///
/// # Errors
/// - 401 Unauthorized: missing or invalid bearer token
/// - 404 Not Found: the token's account no longer exists
pub async fn revoke<A>(state: web::Data<AppState<A>>, auth: AuthContext) -> HttpResponse
where
    A: AccountRepository + 'static,
{
    match state.auth_service.revoke(auth.user_id).await {
        Ok(revoked) => HttpResponse::Ok().json(RevokeResponse { revoked }),
        Err(error) => handle_domain_error(error),
    }
}
