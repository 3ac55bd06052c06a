//! Configuration for the token service

use std::collections::HashMap;

use nb_shared::config::JwtConfig;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Symmetric secret shared by token issuance and validation
    pub secret: String,
    /// JWT issuer claim
    pub issuer: String,
    /// JWT audience claim
    pub audience: String,
    /// Access token validity in minutes
    pub token_validity_minutes: i64,
    /// Refresh secret validity in days
    pub refresh_token_validity_days: i64,
    /// Supplementary claims minted for every holder of a role,
    /// keyed by role name
    pub role_claims: HashMap<String, Vec<(String, String)>>,
}

impl TokenServiceConfig {
    /// Replaces the role-scoped supplementary claims table
    pub fn with_role_claims(mut self, role_claims: HashMap<String, Vec<(String, String)>>) -> Self {
        self.role_claims = role_claims;
        self
    }
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::from(&JwtConfig::default())
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(config: &JwtConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            token_validity_minutes: config.token_validity_minutes,
            refresh_token_validity_days: config.refresh_token_validity_days,
            role_claims: HashMap::new(),
        }
    }
}
