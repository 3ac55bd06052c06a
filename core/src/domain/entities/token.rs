//! Token entities for JWT-based authentication.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::Account;

/// Claims structure for the JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,

    /// Username
    pub name: String,

    /// Email address
    pub email: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Role names assigned to the subject
    #[serde(default)]
    pub roles: Vec<String>,

    /// Supplementary claims, serialized at the top level of the payload
    #[serde(flatten)]
    pub extra: HashMap<String, String>,
}

impl Claims {
    /// Creates claims for an access token issued to the given account
    pub fn for_account(
        account: &Account,
        issuer: &str,
        audience: &str,
        validity_minutes: i64,
    ) -> Self {
        let now = Utc::now();
        let expiry = now + Duration::minutes(validity_minutes);

        Self {
            sub: account.id.to_string(),
            name: account.username.clone(),
            email: account.email.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            roles: account.roles.clone(),
            extra: account.claims.iter().cloned().collect(),
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets the account ID from the subject claim
    pub fn account_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }
}
