//! In-memory implementation of AccountRepository.
//!
//! Used by tests and the demo wiring in the API binary. The conditional
//! refresh-secret update holds the write lock for the whole
//! check-and-set, so rotation is atomic per account.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::Account;
use crate::errors::DomainError;

use super::repository::AccountRepository;

/// In-memory account repository
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
}

impl InMemoryAccountRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&id).cloned())
    }

    async fn create(&self, account: Account) -> Result<Account, DomainError> {
        let mut accounts = self.accounts.write().await;

        if accounts
            .values()
            .any(|a| a.email.eq_ignore_ascii_case(&account.email))
        {
            return Err(DomainError::Validation {
                message: "Email address already registered".to_string(),
            });
        }

        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update(&self, account: Account) -> Result<Account, DomainError> {
        let mut accounts = self.accounts.write().await;

        if !accounts.contains_key(&account.id) {
            return Err(DomainError::Validation {
                message: "Account does not exist".to_string(),
            });
        }

        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update_refresh_token(
        &self,
        account_id: Uuid,
        expected_current: Option<&str>,
        new_token: Option<String>,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut accounts = self.accounts.write().await;

        let account = match accounts.get_mut(&account_id) {
            Some(account) => account,
            None => return Ok(false),
        };

        if account.refresh_token.as_deref() != expected_current {
            return Ok(false);
        }

        account.refresh_token = new_token;
        account.refresh_token_expires_at = Some(expires_at);
        account.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut accounts = self.accounts.write().await;
        Ok(accounts.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryAccountRepository::new();
        let account = Account::new("alice", "alice@example.com", "hash");
        let id = account.id;

        repo.create(account).await.unwrap();

        let found = repo.find_by_email("ALICE@example.com").await.unwrap();
        assert_eq!(found.unwrap().id, id);
        assert!(repo.find_by_id(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryAccountRepository::new();
        repo.create(Account::new("alice", "alice@example.com", "hash"))
            .await
            .unwrap();

        let result = repo
            .create(Account::new("alice2", "alice@example.com", "hash"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_conditional_update_succeeds_when_secret_matches() {
        let repo = InMemoryAccountRepository::new();
        let mut account = Account::new("alice", "alice@example.com", "hash");
        account.rotate_refresh_token("old-secret".to_string(), 7);
        let id = account.id;
        repo.create(account).await.unwrap();

        let expires = Utc::now() + Duration::days(7);
        let rotated = repo
            .update_refresh_token(id, Some("old-secret"), Some("new-secret".to_string()), expires)
            .await
            .unwrap();
        assert!(rotated);

        let stored = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some("new-secret"));
    }

    #[tokio::test]
    async fn test_conditional_update_fails_on_mismatch() {
        let repo = InMemoryAccountRepository::new();
        let mut account = Account::new("alice", "alice@example.com", "hash");
        account.rotate_refresh_token("current".to_string(), 7);
        let id = account.id;
        repo.create(account).await.unwrap();

        let expires = Utc::now() + Duration::days(7);
        let rotated = repo
            .update_refresh_token(id, Some("stale"), Some("new".to_string()), expires)
            .await
            .unwrap();
        assert!(!rotated);

        let stored = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some("current"));
    }

    #[tokio::test]
    async fn test_conditional_update_unknown_account() {
        let repo = InMemoryAccountRepository::new();
        let rotated = repo
            .update_refresh_token(Uuid::new_v4(), None, Some("x".to_string()), Utc::now())
            .await
            .unwrap();
        assert!(!rotated);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_rotation_has_one_winner() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let mut account = Account::new("alice", "alice@example.com", "hash");
        account.rotate_refresh_token("shared-secret".to_string(), 7);
        let id = account.id;
        repo.create(account).await.unwrap();

        let expires = Utc::now() + Duration::days(7);
        let mut handles = Vec::new();
        for i in 0..8 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.update_refresh_token(
                    id,
                    Some("shared-secret"),
                    Some(format!("rotated-{i}")),
                    expires,
                )
                .await
                .unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
