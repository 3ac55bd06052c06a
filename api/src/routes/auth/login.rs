use actix_web::{web, HttpResponse};
use validator::Validate;

use nb_core::repositories::AccountRepository;
use nb_shared::errors::{error_codes, ErrorResponse};

use crate::dto::auth::{AuthResponseDto, LoginRequest};
use crate::dto::error::ErrorResponseExt;
use crate::handlers::error_handler::handle_domain_error;

use super::AppState;

/// Handler for POST /api/v1/auth/login
///
/// Exchanges email/password credentials for an access token and a
/// refresh secret.
///
/// # Request Body
///
/// ```json
/// {
///     "email": "alice@example.com",
///     "password": "..."
/// }
/// ```
///
/// # Errors
/// - 400 Bad Request: malformed email or empty password
/// - 401 Unauthorized: unknown email or wrong password
/// - 403 Forbidden: unconfirmed account, or account locked out
pub async fn login<A>(
    state: web::Data<AppState<A>>,
    request: web::Json<LoginRequest>,
) -> HttpResponse
where
    A: AccountRepository + 'static,
{
    if let Err(errors) = request.validate() {
        return ErrorResponse::new(error_codes::VALIDATION_ERROR, errors.to_string())
            .to_response(actix_web::http::StatusCode::BAD_REQUEST);
    }

    match state
        .auth_service
        .authenticate(&request.email, &request.password)
        .await
    {
        Ok(response) => HttpResponse::Ok().json(AuthResponseDto::from(response)),
        Err(error) => handle_domain_error(error),
    }
}
