//! Account repository trait defining the interface for account persistence.
//!
//! The trait is async-first and uses Result types for proper error
//! handling. Implementations handle the actual storage while maintaining
//! the abstraction boundary between domain and infrastructure layers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::Account;
use crate::errors::DomainError;

/// Repository trait for Account entity persistence operations
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account by its email address
    ///
    /// # Returns
    /// * `Ok(Some(Account))` - Account found
    /// * `Ok(None)` - No account with the given email
    /// * `Err(DomainError)` - Storage error occurred
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;

    /// Find an account by its unique identifier
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DomainError>;

    /// Create a new account
    ///
    /// # Returns
    /// * `Ok(Account)` - The created account
    /// * `Err(DomainError)` - Creation failed (e.g. duplicate email)
    async fn create(&self, account: Account) -> Result<Account, DomainError>;

    /// Update an existing account
    async fn update(&self, account: Account) -> Result<Account, DomainError>;

    /// Conditionally replace the stored refresh secret for an account.
    ///
    /// The update is applied only when the currently stored secret equals
    /// `expected_current`; this is the compare-and-rotate that makes
    /// concurrent refresh attempts with the same consumed secret resolve
    /// to at most one winner. Implementations must make the check and the
    /// write atomic with respect to each other.
    ///
    /// # Returns
    /// * `Ok(true)` - Secret matched and was replaced
    /// * `Ok(false)` - Account missing or stored secret did not match
    /// * `Err(DomainError)` - Storage error occurred
    async fn update_refresh_token(
        &self,
        account_id: Uuid,
        expected_current: Option<&str>,
        new_token: Option<String>,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Delete an account
    ///
    /// # Returns
    /// * `Ok(true)` - Account was deleted
    /// * `Ok(false)` - Account not found
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}
