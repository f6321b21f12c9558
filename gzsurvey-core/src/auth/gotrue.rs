// File: gzsurvey-core/src/auth/gotrue.rs
//
// AuthProvider over the hosted GoTrue (Supabase Auth) REST API.

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error};
use gzsurvey_common::models::{ProviderSession, ProviderUser, SignOutScope};
use gzsurvey_common::traits::AuthProvider;

use crate::config::AuthProviderConfig;
use crate::Error;

pub struct GoTrueAuthProvider {
    http: ReqwestClient,
    base_url: String,
    service_key: String,
}

impl GoTrueAuthProvider {
    pub fn new(config: &AuthProviderConfig) -> Result<Self, Error> {
        let http = ReqwestClient::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn token_grant(
        &self,
        grant_type: &str,
        body: Value,
        rejected: fn() -> Error,
    ) -> Result<ProviderSession, Error> {
        let response = self
            .http
            .post(self.url(&format!("token?grant_type={}", grant_type)))
            .header("apikey", &self.service_key)
            .json(&body)
            .send()
            .await?;
        read_json(response, grant_type, rejected).await
    }

    async fn admin_update_user(&self, user_id: &str, body: Value, what: &str) -> Result<(), Error> {
        let response = self
            .http
            .put(self.url(&format!("admin/users/{}", user_id)))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(&body)
            .send()
            .await?;
        expect_success(response, what).await
    }
}

/// 400..=403 means the provider refused the caller's credentials or token.
fn is_rejection(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
    )
}

async fn read_json<T: DeserializeOwned>(
    response: Response,
    what: &str,
    rejected: fn() -> Error,
) -> Result<T, Error> {
    let status = response.status();
    if status.is_success() {
        return response.json::<T>().await.map_err(|e| {
            Error::Provider(format!("unreadable {} response: {}", what, e))
        });
    }
    if is_rejection(status) {
        debug!("Auth provider rejected {} (HTTP {})", what, status);
        return Err(rejected());
    }
    error!("Auth provider failed on {}: HTTP {}", what, status);
    Err(Error::Provider(format!("{} returned HTTP {}", what, status)))
}

async fn expect_success(response: Response, what: &str) -> Result<(), Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    error!("Auth provider failed on {}: HTTP {}", what, status);
    Err(Error::Provider(format!("{} returned HTTP {}", what, status)))
}

#[async_trait]
impl AuthProvider for GoTrueAuthProvider {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<ProviderSession, Error> {
        self.token_grant(
            "password",
            json!({ "email": email, "password": password }),
            || Error::InvalidCredentials,
        )
        .await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, Error> {
        self.token_grant(
            "refresh_token",
            json!({ "refresh_token": refresh_token }),
            || Error::InvalidToken,
        )
        .await
    }

    async fn get_user(&self, access_token: &str) -> Result<ProviderUser, Error> {
        let response = self
            .http
            .get(self.url("user"))
            .header("apikey", &self.service_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        read_json(response, "user lookup", || Error::InvalidToken).await
    }

    async fn update_app_metadata(&self, user_id: &str, app_metadata: &Value) -> Result<(), Error> {
        self.admin_update_user(user_id, json!({ "app_metadata": app_metadata }), "claims update")
            .await
    }

    async fn update_password(&self, user_id: &str, new_password: &str) -> Result<(), Error> {
        self.admin_update_user(user_id, json!({ "password": new_password }), "password update")
            .await
    }

    async fn sign_out(&self, access_token: &str, scope: SignOutScope) -> Result<(), Error> {
        let response = self
            .http
            .post(self.url(&format!("logout?scope={}", scope.as_str())))
            .header("apikey", &self.service_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        // An already-dead session is as signed out as it gets.
        if is_rejection(response.status()) || response.status() == StatusCode::NOT_FOUND {
            debug!("Sign-out ({}) for an already invalid session", scope.as_str());
            return Ok(());
        }
        expect_success(response, "sign-out").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_rooted_at_auth_v1() {
        let provider = GoTrueAuthProvider::new(&AuthProviderConfig::new(
            "https://abc.supabase.co/",
            "service",
        ))
        .unwrap();
        assert_eq!(
            provider.url("token?grant_type=password"),
            "https://abc.supabase.co/auth/v1/token?grant_type=password"
        );
    }

    #[test]
    fn only_client_side_statuses_count_as_rejections() {
        assert!(is_rejection(StatusCode::BAD_REQUEST));
        assert!(is_rejection(StatusCode::UNAUTHORIZED));
        assert!(!is_rejection(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_rejection(StatusCode::TOO_MANY_REQUESTS));
    }
}
