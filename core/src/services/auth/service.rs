//! Main authentication service implementation

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::value_objects::AuthResponse;
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::AccountRepository;
use crate::services::token::TokenService;

use super::config::AuthServiceConfig;

/// Authentication service managing the credential lifecycle
///
/// Authenticates email/password pairs, enforces the lockout policy, and
/// owns refresh-secret rotation and revocation. All failures surface as
/// `AuthError` variants; nothing here retries internally.
pub struct AuthService<A: AccountRepository> {
    /// Account repository for persistence
    account_repository: Arc<A>,
    /// Token service for JWT and refresh secret handling
    token_service: Arc<TokenService>,
    /// Service configuration
    config: AuthServiceConfig,
}

impl<A: AccountRepository> AuthService<A> {
    /// Create a new authentication service
    pub fn new(
        account_repository: Arc<A>,
        token_service: Arc<TokenService>,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            account_repository,
            token_service,
            config,
        }
    }

    /// Authenticate an email/password pair
    ///
    /// Unknown email and wrong password produce the same
    /// `InvalidCredentials` failure so the API does not leak which emails
    /// are registered. A wrong password increments the failure counter;
    /// reaching the configured threshold locks the account for the
    /// configured duration, and subsequent attempts fail with `LockedOut`
    /// until the window passes.
    pub async fn authenticate(&self, email: &str, password: &str) -> DomainResult<AuthResponse> {
        let mut account = match self.account_repository.find_by_email(email).await? {
            Some(account) => account,
            None => {
                warn!(email = email, "Authentication failed: unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if account.is_locked_out() {
            let until = account.lockout_end.unwrap_or_else(Utc::now);
            warn!(account_id = %account.id, until = %until, "Authentication failed: account locked out");
            return Err(AuthError::LockedOut { until }.into());
        }

        if self.config.require_email_confirmation && !account.email_confirmed {
            warn!(account_id = %account.id, "Authentication failed: email not confirmed");
            return Err(AuthError::UnconfirmedAccount.into());
        }

        let password_ok =
            bcrypt::verify(password, &account.password_hash).map_err(|e| DomainError::Internal {
                message: format!("Password verification failed: {}", e),
            })?;

        if !password_ok {
            let locked = account.record_failed_login(
                self.config.lockout.max_failed_attempts,
                self.config.lockout.lockout_duration_minutes,
            );
            let lockout_end = account.lockout_end;
            self.account_repository.update(account).await?;

            if locked {
                let until = lockout_end.unwrap_or_else(Utc::now);
                warn!(email = email, until = %until, "Account locked after repeated failures");
                return Err(AuthError::LockedOut { until }.into());
            }
            warn!(email = email, "Authentication failed: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        account.reset_failed_logins();
        account.update_last_login();

        let token = self.token_service.issue_access_token(&account)?;
        let refresh_secret = self.token_service.generate_refresh_secret();
        account.rotate_refresh_token(
            refresh_secret.clone(),
            self.token_service.refresh_token_validity_days(),
        );

        let account = self.account_repository.update(account).await?;

        info!(account_id = %account.id, "Account authenticated");
        Ok(AuthResponse::success(&account, token, refresh_secret))
    }

    /// Exchange an expired access token plus its refresh secret for a new
    /// pair.
    ///
    /// The expired token is validated for signature, issuer, audience, and
    /// algorithm only. A missing account, a mismatched secret, and an
    /// expired secret all return the same generic `InvalidRequest` so the
    /// caller cannot tell which check failed. Rotation goes through the
    /// repository's conditional update: of two concurrent refreshes with
    /// the same secret, at most one wins.
    pub async fn refresh(&self, token: &str, refresh_secret: &str) -> DomainResult<AuthResponse> {
        let claims = self.token_service.decode_expired_token(token)?;
        let account_id = claims
            .account_id()
            .map_err(|_| DomainError::Auth(AuthError::InvalidToken))?;

        let account = match self.account_repository.find_by_id(account_id).await? {
            Some(account) => account,
            None => {
                warn!(account_id = %account_id, "Refresh failed: account not found");
                return Err(AuthError::InvalidRequest.into());
            }
        };

        if !account.refresh_token_matches(refresh_secret) {
            warn!(account_id = %account.id, "Refresh failed: secret mismatch or expired");
            return Err(AuthError::InvalidRequest.into());
        }

        let new_secret = self.token_service.generate_refresh_secret();
        let expires_at =
            Utc::now() + Duration::days(self.token_service.refresh_token_validity_days());

        let rotated = self
            .account_repository
            .update_refresh_token(
                account.id,
                Some(refresh_secret),
                Some(new_secret.clone()),
                expires_at,
            )
            .await?;

        if !rotated {
            // Lost the rotation race: another refresh consumed this secret first
            warn!(account_id = %account.id, "Refresh failed: secret already rotated");
            return Err(AuthError::InvalidRequest.into());
        }

        let new_token = self.token_service.issue_access_token(&account)?;

        info!(account_id = %account.id, "Refresh secret rotated");
        Ok(AuthResponse::success(&account, new_token, new_secret))
    }

    /// Revoke the stored refresh secret for an account
    ///
    /// Nulls the secret and stamps its expiry to now. Already-issued
    /// access tokens stay cryptographically valid until natural expiry;
    /// there is no token denylist.
    pub async fn revoke(&self, account_id: Uuid) -> DomainResult<bool> {
        let mut account = match self.account_repository.find_by_id(account_id).await? {
            Some(account) => account,
            None => {
                warn!(account_id = %account_id, "Revoke failed: account not found");
                return Err(AuthError::NotFound.into());
            }
        };

        account.clear_refresh_token();
        self.account_repository.update(account).await?;

        info!(account_id = %account_id, "Refresh secret revoked");
        Ok(true)
    }
}
