use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::admin::AdminProfile;

/// A user as the external auth provider reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub app_metadata: Value,
}

/// Token pair plus the user it was issued for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: ProviderUser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutScope {
    /// Only the session the token belongs to.
    Local,
    /// Every session of the user.
    Global,
}

impl SignOutScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignOutScope::Local => "local",
            SignOutScope::Global => "global",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

/// Successful admin login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    pub tokens: TokenPair,
    pub user: AdminProfile,
}
