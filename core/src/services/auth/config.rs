//! Configuration for the authentication service

use nb_shared::config::LockoutConfig;

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// Account lockout policy
    pub lockout: LockoutConfig,
    /// Whether unconfirmed email addresses are rejected at login
    pub require_email_confirmation: bool,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            lockout: LockoutConfig::default(),
            require_email_confirmation: true,
        }
    }
}
