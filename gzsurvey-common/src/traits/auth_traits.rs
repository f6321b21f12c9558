use async_trait::async_trait;
use serde_json::Value;
use crate::error::Error;
use crate::models::{ProviderSession, ProviderUser, SignOutScope};

/// External identity service that owns passwords and issues bearer tokens.
///
/// It has no "check this password" call; signing in is the only way to
/// verify one.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// `Error::InvalidCredentials` if the provider rejects the pair.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<ProviderSession, Error>;

    /// `Error::InvalidToken` if the refresh token is unknown or spent.
    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, Error>;

    /// Stateless token check. `Error::InvalidToken` if expired or forged.
    async fn get_user(&self, access_token: &str) -> Result<ProviderUser, Error>;

    /// Replaces the user's app metadata (where claims live).
    async fn update_app_metadata(&self, user_id: &str, app_metadata: &Value) -> Result<(), Error>;

    async fn update_password(&self, user_id: &str, new_password: &str) -> Result<(), Error>;

    async fn sign_out(&self, access_token: &str, scope: SignOutScope) -> Result<(), Error>;
}
