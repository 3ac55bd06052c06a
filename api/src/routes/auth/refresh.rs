use actix_web::{web, HttpResponse};
use validator::Validate;

use nb_core::repositories::AccountRepository;
use nb_shared::errors::{error_codes, ErrorResponse};

use crate::dto::auth::{AuthResponseDto, RefreshRequest};
use crate::dto::error::ErrorResponseExt;
use crate::handlers::error_handler::handle_domain_error;

use super::AppState;

/// Handler for POST /api/v1/auth/refresh
///
/// Exchanges an expired access token plus its refresh secret for a fresh
/// pair. The presented secret is consumed; replaying it fails.
///
/// # Request Body
///
/// ```json
/// {
///     "token": "eyJ...",
///     "refreshToken": "base64-secret"
/// }
/// ```
///
/// # Errors
/// - 400 Bad Request: unknown account, mismatched or expired secret
/// - 401 Unauthorized: token fails signature/issuer/audience checks
pub async fn refresh<A>(
    state: web::Data<AppState<A>>,
    request: web::Json<RefreshRequest>,
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
        .refresh(&request.token, &request.refresh_token)
        .await
    {
        Ok(response) => HttpResponse::Ok().json(AuthResponseDto::from(response)),
        Err(error) => handle_domain_error(error),
    }
}
