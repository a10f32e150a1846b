use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A signed-in account as reported by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
    /// Bearer token for data-source calls, when the provider issues one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl AuthUser {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            id_token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.id_token = Some(token.into());
        self
    }
}

/// Session-state notifications from the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    SignedIn(AuthUser),
    SignedOut,
}

/// Which auth form a request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMode {
    Login,
    Register,
}

/// Profile record written once when an account is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub joined: DateTime<Utc>,
}

impl UserProfile {
    /// Profile for a freshly registered account, joined now.
    pub fn joined_now(user: &AuthUser) -> Self {
        Self {
            email: user.email.clone(),
            joined: Utc::now(),
        }
    }
}
