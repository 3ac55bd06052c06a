//! Authentication and authorization configuration

use serde::{Deserialize, Serialize};

/// JWT authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Symmetric secret used for both signing and validation
    pub secret: String,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,

    /// Access token validity in minutes
    pub token_validity_minutes: i64,

    /// Refresh secret validity in days
    pub refresh_token_validity_days: i64,

    /// Reject authentication for accounts that have not confirmed their email
    #[serde(default = "default_require_confirmation")]
    pub require_email_confirmation: bool,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from("development-secret-please-change-in-production"),
            issuer: String::from("nearby"),
            audience: String::from("nearby-api"),
            token_validity_minutes: 60,
            refresh_token_validity_days: 7,
            require_email_confirmation: default_require_confirmation(),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with a given secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token validity in minutes
    pub fn with_token_validity_minutes(mut self, minutes: i64) -> Self {
        self.token_validity_minutes = minutes;
        self
    }

    /// Set refresh secret validity in days
    pub fn with_refresh_validity_days(mut self, days: i64) -> Self {
        self.refresh_token_validity_days = days;
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
            token_validity_minutes: std::env::var("JWT_TOKEN_VALIDITY_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.token_validity_minutes),
            refresh_token_validity_days: std::env::var("JWT_REFRESH_VALIDITY_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.refresh_token_validity_days),
            require_email_confirmation: std::env::var("JWT_REQUIRE_EMAIL_CONFIRMATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.require_email_confirmation),
        }
    }

    /// Check if using the default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == "development-secret-please-change-in-production"
    }
}

fn default_require_confirmation() -> bool {
    true
}

/// Account lockout policy configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LockoutConfig {
    /// Failed attempts before the account is locked
    pub max_failed_attempts: u32,

    /// Lockout duration in minutes
    pub lockout_duration_minutes: i64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lockout_duration_minutes: 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_default() {
        let config = JwtConfig::default();
        assert_eq!(config.token_validity_minutes, 60);
        assert_eq!(config.refresh_token_validity_days, 7);
        assert_eq!(config.issuer, "nearby");
        assert_eq!(config.audience, "nearby-api");
        assert!(config.require_email_confirmation);
        assert!(config.is_using_default_secret());
    }

    #[test]
    fn test_jwt_config_builder() {
        let config = JwtConfig::new("my-secret")
            .with_token_validity_minutes(30)
            .with_refresh_validity_days(14);

        assert_eq!(config.token_validity_minutes, 30);
        assert_eq!(config.refresh_token_validity_days, 14);
        assert!(!config.is_using_default_secret());
    }

    #[test]
    fn test_lockout_config_default() {
        let config = LockoutConfig::default();
        assert_eq!(config.max_failed_attempts, 5);
        assert_eq!(config.lockout_duration_minutes, 15);
    }
}
