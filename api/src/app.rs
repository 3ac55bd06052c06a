//! Application factory
//!
//! Wires the middleware stack and routes onto an Actix-web `App`. The
//! limiter is shared across worker `App` instances so every worker draws
//! from the same buckets.

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::{middleware::Logger, web, App, HttpResponse};

use nb_core::repositories::AccountRepository;
use nb_shared::config::JwtConfig;
use nb_shared::errors::{error_codes, ErrorResponse};

use crate::middleware::{JwtAuth, RateLimiter, TokenBucketRateLimiter};
use crate::routes::auth::{login, refresh, revoke, AppState};

/// Create and configure the application with all dependencies
pub fn create_app<A>(
    app_state: web::Data<AppState<A>>,
    limiter: Arc<TokenBucketRateLimiter>,
    jwt_config: &JwtConfig,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    A: AccountRepository + 'static,
{
    App::new()
        .app_data(app_state)
        // Rate limiting runs before routing; logging wraps everything
        .wrap(Logger::default())
        .wrap(RateLimiter::from_limiter(limiter))
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1").service(
                web::scope("/auth")
                    .route("/login", web::post().to(login::login::<A>))
                    .route("/refresh", web::post().to(refresh::refresh::<A>))
                    .service(
                        web::resource("/revoke")
                            .wrap(JwtAuth::new(jwt_config))
                            .route(web::post().to(revoke::revoke::<A>)),
                    ),
            ),
        )
        .default_service(web::route().to(not_found))
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "nearby-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
