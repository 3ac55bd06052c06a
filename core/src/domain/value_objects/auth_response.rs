//! Authentication response value object for API responses.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::Account;

/// Authentication response returned by Authenticate and Refresh
///
/// All optional fields are absent on failure except `message`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    /// Whether the operation succeeded
    pub success: bool,

    /// Failure explanation, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Signed JWT access token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Opaque refresh secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Subject account ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,

    /// Username
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Role names assigned to the account
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl AuthResponse {
    /// Creates a successful response for the given account and tokens
    pub fn success(account: &Account, token: String, refresh_token: String) -> Self {
        Self {
            success: true,
            message: None,
            token: Some(token),
            refresh_token: Some(refresh_token),
            user_id: Some(account.id),
            username: Some(account.username.clone()),
            email: Some(account.email.clone()),
            roles: account.roles.clone(),
        }
    }

    /// Creates a failure response carrying only a message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            token: None,
            refresh_token: None,
            user_id: None,
            username: None,
            email: None,
            roles: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response_carries_account_fields() {
        let mut account = Account::new("alice", "alice@example.com", "hash");
        account.add_role("User");

        let response = AuthResponse::success(&account, "jwt".to_string(), "secret".to_string());
        assert!(response.success);
        assert_eq!(response.user_id, Some(account.id));
        assert_eq!(response.username.as_deref(), Some("alice"));
        assert_eq!(response.roles, vec!["User".to_string()]);
        assert!(response.message.is_none());
    }

    #[test]
    fn test_failure_response_has_only_message() {
        let response = AuthResponse::failure("Invalid email or password.");
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Invalid email or password."));
        assert!(response.token.is_none());
        assert!(response.refresh_token.is_none());
        assert!(response.user_id.is_none());
        assert!(response.roles.is_empty());
    }

    #[test]
    fn test_failure_serialization_omits_absent_fields() {
        let response = AuthResponse::failure("Invalid token");
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("token").is_none());
        assert!(json.get("userId").is_none() && json.get("user_id").is_none());
    }
}
