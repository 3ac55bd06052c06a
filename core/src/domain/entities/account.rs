//! Account entity representing a registered user of the NearBy directory.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account entity representing a registered user
///
/// Carries the authentication state this subsystem mutates: the bcrypt
/// password hash, the failed-login counter and lockout window, and the
/// server-side refresh secret with its expiry. The refresh secret is valid
/// only while it matches the stored value and has not expired; every
/// refresh rotates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier for the account
    pub id: Uuid,

    /// Display/login name
    pub username: String,

    /// Email address (login identifier)
    pub email: String,

    /// Bcrypt hash of the password
    pub password_hash: String,

    /// Role names assigned to the account
    pub roles: Vec<String>,

    /// Supplementary claims minted into the account's access tokens,
    /// as (claim type, claim value) pairs
    #[serde(default)]
    pub claims: Vec<(String, String)>,

    /// Whether the email address has been confirmed
    pub email_confirmed: bool,

    /// Consecutive failed login attempts since the last success
    pub failed_login_attempts: u32,

    /// End of the current lockout window, if any
    pub lockout_end: Option<DateTime<Utc>>,

    /// Currently valid refresh secret, if any
    pub refresh_token: Option<String>,

    /// Expiry of the stored refresh secret
    pub refresh_token_expires_at: Option<DateTime<Utc>>,

    /// Timestamp of the account's last login
    pub last_login_at: Option<DateTime<Utc>>,

    /// Timestamp when the account was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new Account instance
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            roles: Vec::new(),
            claims: Vec::new(),
            email_confirmed: false,
            failed_login_attempts: 0,
            lockout_end: None,
            refresh_token: None,
            refresh_token_expires_at: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Assigns a role to the account
    pub fn add_role(&mut self, role: impl Into<String>) {
        let role = role.into();
        if !self.roles.contains(&role) {
            self.roles.push(role);
            self.updated_at = Utc::now();
        }
    }

    /// Attaches a supplementary claim to the account
    pub fn add_claim(&mut self, claim_type: impl Into<String>, value: impl Into<String>) {
        let claim = (claim_type.into(), value.into());
        if !self.claims.contains(&claim) {
            self.claims.push(claim);
            self.updated_at = Utc::now();
        }
    }

    /// Marks the email address as confirmed
    pub fn confirm_email(&mut self) {
        self.email_confirmed = true;
        self.updated_at = Utc::now();
    }

    /// Checks if the account is currently locked out
    pub fn is_locked_out(&self) -> bool {
        matches!(self.lockout_end, Some(end) if end > Utc::now())
    }

    /// Records a failed login attempt, locking the account for
    /// `lockout_duration_minutes` once `max_failed_attempts` is reached.
    ///
    /// Returns `true` if this attempt triggered a lockout.
    pub fn record_failed_login(
        &mut self,
        max_failed_attempts: u32,
        lockout_duration_minutes: i64,
    ) -> bool {
        self.failed_login_attempts += 1;
        self.updated_at = Utc::now();
        if self.failed_login_attempts >= max_failed_attempts {
            self.lockout_end = Some(Utc::now() + Duration::minutes(lockout_duration_minutes));
            return true;
        }
        false
    }

    /// Resets the failure counter after a successful authentication
    pub fn reset_failed_logins(&mut self) {
        self.failed_login_attempts = 0;
        self.lockout_end = None;
        self.updated_at = Utc::now();
    }

    /// Updates the last login timestamp
    pub fn update_last_login(&mut self) {
        self.last_login_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    /// Installs a new refresh secret with the given validity window,
    /// invalidating whatever was stored before.
    pub fn rotate_refresh_token(&mut self, secret: String, validity_days: i64) {
        self.refresh_token = Some(secret);
        self.refresh_token_expires_at = Some(Utc::now() + Duration::days(validity_days));
        self.updated_at = Utc::now();
    }

    /// Clears the stored refresh secret and expires it immediately
    pub fn clear_refresh_token(&mut self) {
        self.refresh_token = None;
        self.refresh_token_expires_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    /// Checks whether the supplied refresh secret matches the stored one
    /// and the stored one has not expired.
    pub fn refresh_token_matches(&self, presented: &str) -> bool {
        match (&self.refresh_token, self.refresh_token_expires_at) {
            (Some(stored), Some(expires_at)) => stored == presented && expires_at > Utc::now(),
            _ => false,
        }
    }
}
