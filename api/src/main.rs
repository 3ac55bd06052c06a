use std::sync::Arc;

use actix_web::{web, HttpServer};
use dotenv::dotenv;
use log::{info, warn};

use nb_core::domain::entities::Account;
use nb_core::repositories::{AccountRepository, InMemoryAccountRepository};
use nb_core::services::auth::{AuthService, AuthServiceConfig};
use nb_core::services::token::{TokenService, TokenServiceConfig};
use nb_shared::config::{JwtConfig, LockoutConfig, RateLimitConfig, ServerConfig};

use nb_api::app::create_app;
use nb_api::middleware::TokenBucketRateLimiter;
use nb_api::routes::auth::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting NearBy API server");

    let server_config = ServerConfig::from_env();
    let rate_limit_config = if running_in_development() {
        RateLimitConfig::development()
    } else {
        RateLimitConfig::from_env()
    };
    let jwt_config = JwtConfig::from_env();

    if jwt_config.is_using_default_secret() {
        warn!("JWT_SECRET is not set; using the built-in development secret");
    }

    let account_repository = Arc::new(InMemoryAccountRepository::new());
    seed_admin_account(&account_repository).await;

    let token_service = Arc::new(TokenService::new(TokenServiceConfig::from(&jwt_config)));
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&account_repository),
        token_service,
        AuthServiceConfig {
            lockout: LockoutConfig::default(),
            require_email_confirmation: jwt_config.require_email_confirmation,
        },
    ));

    let app_state = web::Data::new(AppState {
        auth_service: Arc::clone(&auth_service),
    });
    // One limiter instance shared by all workers
    let limiter = Arc::new(TokenBucketRateLimiter::new(rate_limit_config));

    let bind_address = server_config.bind_address();
    info!("Server will bind to {}", bind_address);

    HttpServer::new(move || {
        create_app(app_state.clone(), Arc::clone(&limiter), &jwt_config)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}

fn running_in_development() -> bool {
    matches!(
        std::env::var("ENVIRONMENT").as_deref(),
        Ok("development") | Ok("dev")
    )
}

/// Seed an administrator account from the environment, if configured
///
/// Useful for local runs against the in-memory store, which starts empty.
async fn seed_admin_account(repository: &Arc<InMemoryAccountRepository>) {
    let (email, password) = match (
        std::env::var("ADMIN_EMAIL"),
        std::env::var("ADMIN_PASSWORD"),
    ) {
        (Ok(email), Ok(password)) => (email, password),
        _ => return,
    };

    let hash = match bcrypt::hash(&password, bcrypt::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Could not hash admin password: {}", e);
            return;
        }
    };

    let mut account = Account::new("admin", email.clone(), hash);
    account.confirm_email();
    account.add_role("Admin");

    match repository.create(account).await {
        Ok(account) => info!("Seeded admin account {} ({})", account.id, email),
        Err(e) => warn!("Could not seed admin account: {}", e),
    }
}
