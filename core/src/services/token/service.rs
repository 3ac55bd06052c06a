//! Main token service implementation

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;

use crate::domain::entities::{Account, Claims};
use crate::errors::{AuthError, DomainError};

use super::config::TokenServiceConfig;

/// Number of random bytes in a refresh secret before base64 encoding
const REFRESH_SECRET_BYTES: usize = 64;

/// Service for minting and validating JWT access tokens and refresh secrets
pub struct TokenService {
    config: TokenServiceConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    /// Validation that skips the expiry check but still enforces
    /// signature, issuer, audience, and signing algorithm.
    expired_validation: Validation,
}

impl TokenService {
    /// Creates a new token service instance
    pub fn new(config: TokenServiceConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.validate_exp = true;

        let mut expired_validation = validation.clone();
        expired_validation.validate_exp = false;

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
            expired_validation,
        }
    }

    /// Access token validity in minutes
    pub fn token_validity_minutes(&self) -> i64 {
        self.config.token_validity_minutes
    }

    /// Refresh secret validity in days
    pub fn refresh_token_validity_days(&self) -> i64 {
        self.config.refresh_token_validity_days
    }

    /// Mints a signed access token for the given account
    ///
    /// Claims carry the subject id, username, email, a unique token id,
    /// issuance/expiry timestamps, one entry per assigned role, and the
    /// supplementary claims attached to the account and to its roles.
    /// On a claim-type collision the account-scoped value wins.
    pub fn issue_access_token(&self, account: &Account) -> Result<String, DomainError> {
        let mut claims = Claims::for_account(
            account,
            &self.config.issuer,
            &self.config.audience,
            self.config.token_validity_minutes,
        );
        for role in &account.roles {
            if let Some(role_claims) = self.config.role_claims.get(role) {
                for (claim_type, value) in role_claims {
                    claims
                        .extra
                        .entry(claim_type.clone())
                        .or_insert_with(|| value.clone());
                }
            }
        }

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            DomainError::Internal {
                message: format!("Failed to sign access token: {}", e),
            }
        })
    }

    /// Verifies a live access token and returns its claims
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, DomainError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| DomainError::Auth(AuthError::InvalidToken))
    }

    /// Decodes a possibly expired access token for the refresh flow.
    ///
    /// Signature, issuer, audience, and algorithm are all still enforced;
    /// only the expiry claim is ignored.
    pub fn decode_expired_token(&self, token: &str) -> Result<Claims, DomainError> {
        decode::<Claims>(token, &self.decoding_key, &self.expired_validation)
            .map(|data| data.claims)
            .map_err(|_| DomainError::Auth(AuthError::InvalidToken))
    }

    /// Generates a new opaque refresh secret
    ///
    /// 64 cryptographically random bytes, base64-encoded.
    pub fn generate_refresh_secret(&self) -> String {
        let mut bytes = [0u8; REFRESH_SECRET_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        BASE64.encode(bytes)
    }
}
