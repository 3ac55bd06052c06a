use std::sync::Arc;

use chrono::Utc;

use crate::domain::entities::Account;
use crate::errors::{AuthError, DomainError};
use crate::repositories::{AccountRepository, InMemoryAccountRepository};
use crate::services::auth::{AuthService, AuthServiceConfig};
use crate::services::token::{TokenService, TokenServiceConfig};

const PASSWORD: &str = "correct horse battery staple";

fn test_token_service() -> Arc<TokenService> {
    Arc::new(TokenService::new(TokenServiceConfig {
        secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
        issuer: "nearby".to_string(),
        audience: "nearby-api".to_string(),
        ..TokenServiceConfig::default()
    }))
}

fn test_service() -> (AuthService<InMemoryAccountRepository>, Arc<InMemoryAccountRepository>) {
    let repository = Arc::new(InMemoryAccountRepository::new());
    let service = AuthService::new(
        Arc::clone(&repository),
        test_token_service(),
        AuthServiceConfig::default(),
    );
    (service, repository)
}

async fn seed_account(repository: &InMemoryAccountRepository) -> Account {
    // Minimum bcrypt cost keeps the tests fast
    let hash = bcrypt::hash(PASSWORD, 4).unwrap();
    let mut account = Account::new("alice", "alice@example.com", hash);
    account.confirm_email();
    account.add_role("User");
    account.add_role("Moderator");
    repository.create(account).await.unwrap()
}

fn assert_auth_error(result: Result<impl std::fmt::Debug, DomainError>, expected: &AuthError) {
    match result {
        Err(DomainError::Auth(actual)) => {
            assert_eq!(
                std::mem::discriminant(&actual),
                std::mem::discriminant(expected),
                "expected {:?}, got {:?}",
                expected,
                actual
            );
        }
        other => panic!("expected auth error {:?}, got {:?}", expected, other),
    }
}

#[tokio::test]
async fn authenticate_returns_tokens_and_roles() {
    let (service, repository) = test_service();
    let account = seed_account(&repository).await;

    let response = service
        .authenticate("alice@example.com", PASSWORD)
        .await
        .unwrap();

    assert!(response.success);
    assert!(response.token.is_some());
    assert!(response.refresh_token.is_some());
    assert_eq!(response.user_id, Some(account.id));
    assert_eq!(response.roles, vec!["User", "Moderator"]);

    let stored = repository.find_by_id(account.id).await.unwrap().unwrap();
    assert!(stored.last_login_at.is_some());
    assert_eq!(stored.refresh_token, response.refresh_token);
}

#[tokio::test]
async fn issued_tokens_carry_the_account_supplementary_claims() {
    let (service, repository) = test_service();
    let account = seed_account(&repository).await;

    let mut stored = repository.find_by_id(account.id).await.unwrap().unwrap();
    stored.add_claim("department", "engineering");
    repository.update(stored).await.unwrap();

    let response = service
        .authenticate("alice@example.com", PASSWORD)
        .await
        .unwrap();

    let claims = test_token_service()
        .verify_access_token(response.token.as_deref().unwrap())
        .unwrap();
    assert_eq!(
        claims.extra.get("department"),
        Some(&"engineering".to_string())
    );
}

#[tokio::test]
async fn unknown_email_and_wrong_password_produce_the_same_error() {
    let (service, repository) = test_service();
    seed_account(&repository).await;

    let unknown = service
        .authenticate("nobody@example.com", PASSWORD)
        .await
        .unwrap_err();
    let wrong = service
        .authenticate("alice@example.com", "wrong password")
        .await
        .unwrap_err();

    assert_eq!(unknown.to_string(), wrong.to_string());
    assert_auth_error(Err::<(), _>(unknown), &AuthError::InvalidCredentials);
}

#[tokio::test]
async fn unconfirmed_account_is_rejected() {
    let (service, repository) = test_service();
    let hash = bcrypt::hash(PASSWORD, 4).unwrap();
    let account = Account::new("bob", "bob@example.com", hash);
    repository.create(account).await.unwrap();

    let result = service.authenticate("bob@example.com", PASSWORD).await;
    assert_auth_error(result, &AuthError::UnconfirmedAccount);
}

#[tokio::test]
async fn unconfirmed_account_passes_when_confirmation_not_required() {
    let repository = Arc::new(InMemoryAccountRepository::new());
    let service = AuthService::new(
        Arc::clone(&repository),
        test_token_service(),
        AuthServiceConfig {
            require_email_confirmation: false,
            ..AuthServiceConfig::default()
        },
    );
    let hash = bcrypt::hash(PASSWORD, 4).unwrap();
    repository
        .create(Account::new("bob", "bob@example.com", hash))
        .await
        .unwrap();

    let response = service
        .authenticate("bob@example.com", PASSWORD)
        .await
        .unwrap();
    assert!(response.success);
}

#[tokio::test]
async fn fifth_wrong_password_locks_the_account() {
    let (service, repository) = test_service();
    seed_account(&repository).await;

    for _ in 0..4 {
        let result = service.authenticate("alice@example.com", "wrong").await;
        assert_auth_error(result, &AuthError::InvalidCredentials);
    }

    // The attempt that reaches the threshold already reports the lockout
    match service.authenticate("alice@example.com", "wrong").await {
        Err(DomainError::Auth(AuthError::LockedOut { until })) => {
            assert!(until > Utc::now());
        }
        other => panic!("expected LockedOut, got {:?}", other),
    }

    // Even the correct password is rejected while the window is open
    let result = service.authenticate("alice@example.com", PASSWORD).await;
    assert_auth_error(result, &AuthError::LockedOut { until: Utc::now() });
}

#[tokio::test]
async fn successful_login_resets_the_failure_counter() {
    let (service, repository) = test_service();
    let account = seed_account(&repository).await;

    for _ in 0..3 {
        let _ = service.authenticate("alice@example.com", "wrong").await;
    }
    service
        .authenticate("alice@example.com", PASSWORD)
        .await
        .unwrap();

    let stored = repository.find_by_id(account.id).await.unwrap().unwrap();
    assert_eq!(stored.failed_login_attempts, 0);
    assert!(stored.lockout_end.is_none());

    // A full fresh run of failures is needed to lock again
    for _ in 0..4 {
        let result = service.authenticate("alice@example.com", "wrong").await;
        assert_auth_error(result, &AuthError::InvalidCredentials);
    }
}

#[tokio::test]
async fn expired_lockout_window_admits_the_account_again() {
    let (service, repository) = test_service();
    let mut account = seed_account(&repository).await;
    account.failed_login_attempts = 5;
    account.lockout_end = Some(Utc::now() - chrono::Duration::minutes(1));
    repository.update(account).await.unwrap();

    let response = service
        .authenticate("alice@example.com", PASSWORD)
        .await
        .unwrap();
    assert!(response.success);
}

#[tokio::test]
async fn refresh_rotates_the_secret_exactly_once() {
    let (service, repository) = test_service();
    seed_account(&repository).await;

    let login = service
        .authenticate("alice@example.com", PASSWORD)
        .await
        .unwrap();
    let token = login.token.unwrap();
    let first_secret = login.refresh_token.unwrap();

    let refreshed = service.refresh(&token, &first_secret).await.unwrap();
    let second_secret = refreshed.refresh_token.unwrap();
    assert_ne!(first_secret, second_secret);

    // The consumed secret no longer works
    let replay = service.refresh(&token, &first_secret).await;
    assert_auth_error(replay, &AuthError::InvalidRequest);

    // The freshly issued one does
    let token = refreshed.token.unwrap();
    service.refresh(&token, &second_secret).await.unwrap();
}

#[tokio::test]
async fn refresh_rejects_a_forged_token() {
    let (service, repository) = test_service();
    seed_account(&repository).await;

    let result = service.refresh("not-a-jwt", "whatever").await;
    assert_auth_error(result, &AuthError::InvalidToken);
}

#[tokio::test]
async fn refresh_rejects_a_mismatched_secret() {
    let (service, repository) = test_service();
    seed_account(&repository).await;

    let login = service
        .authenticate("alice@example.com", PASSWORD)
        .await
        .unwrap();

    let result = service.refresh(&login.token.unwrap(), "stolen-guess").await;
    assert_auth_error(result, &AuthError::InvalidRequest);
}

#[tokio::test]
async fn refresh_rejects_an_expired_secret() {
    let (service, repository) = test_service();
    let seeded = seed_account(&repository).await;

    let login = service
        .authenticate("alice@example.com", PASSWORD)
        .await
        .unwrap();
    let secret = login.refresh_token.unwrap();

    let mut account = repository.find_by_id(seeded.id).await.unwrap().unwrap();
    account.refresh_token_expires_at = Some(Utc::now() - chrono::Duration::minutes(1));
    repository.update(account).await.unwrap();

    let result = service.refresh(&login.token.unwrap(), &secret).await;
    assert_auth_error(result, &AuthError::InvalidRequest);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_refreshes_with_the_same_secret_have_one_winner() {
    let (service, repository) = test_service();
    seed_account(&repository).await;
    let service = Arc::new(service);

    let login = service
        .authenticate("alice@example.com", PASSWORD)
        .await
        .unwrap();
    let token = Arc::new(login.token.unwrap());
    let secret = Arc::new(login.refresh_token.unwrap());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = Arc::clone(&service);
        let token = Arc::clone(&token);
        let secret = Arc::clone(&secret);
        handles.push(tokio::spawn(async move {
            service.refresh(&token, &secret).await.is_ok()
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

#[tokio::test]
async fn revoke_clears_the_secret_and_blocks_refresh() {
    let (service, repository) = test_service();
    let account = seed_account(&repository).await;

    let login = service
        .authenticate("alice@example.com", PASSWORD)
        .await
        .unwrap();
    let secret = login.refresh_token.unwrap();

    assert!(service.revoke(account.id).await.unwrap());

    let stored = repository.find_by_id(account.id).await.unwrap().unwrap();
    assert!(stored.refresh_token.is_none());

    let result = service.refresh(&login.token.unwrap(), &secret).await;
    assert_auth_error(result, &AuthError::InvalidRequest);
}

#[tokio::test]
async fn revoke_unknown_account_is_not_found() {
    let (service, _repository) = test_service();

    let result = service.revoke(uuid::Uuid::new_v4()).await;
    assert_auth_error(result, &AuthError::NotFound);
}
