// File: gzsurvey-core/src/services/admin_session.rs

use std::sync::Arc;
use serde_json::json;
use tracing::{error, info, warn};
use gzsurvey_common::models::{
    AdminAuditLogEntry, AdminClaims, AdminIdentity, AdminProfile, AuditAction, LoginResult,
    RequestMeta, SignOutScope, TokenPair,
};
use gzsurvey_common::traits::{AdminAuditLogRepository, AdminUserRepository, AuthProvider};

use crate::crypto::hash_password;
use crate::rate_limit::{RateLimiter, RateLimits};
use crate::services::profile::validate_profile_update;
use crate::Error;

pub const MIN_PASSWORD_CHARS: usize = 8;
/// Longer passwords are silently truncated by common hashers.
pub const MAX_PASSWORD_CHARS: usize = 72;

/// Staff authentication on top of the external auth provider.
///
/// Claims written at login are a snapshot of the admin row. A role or
/// branch change only reaches the token on the next login.
pub struct AdminSessionManager {
    admins: Arc<dyn AdminUserRepository>,
    audit_log: Arc<dyn AdminAuditLogRepository>,
    provider: Arc<dyn AuthProvider>,
    login_account: RateLimiter,
    login_ip: RateLimiter,
}

impl AdminSessionManager {
    pub fn new(
        admins: Arc<dyn AdminUserRepository>,
        audit_log: Arc<dyn AdminAuditLogRepository>,
        provider: Arc<dyn AuthProvider>,
        limits: &RateLimits,
    ) -> Self {
        Self {
            admins,
            audit_log,
            provider,
            login_account: limits.login_account.clone(),
            login_ip: limits.login_ip.clone(),
        }
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
        request: &RequestMeta,
    ) -> Result<LoginResult, Error> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(Error::InvalidInput("Email and password are required".into()));
        }
        let account = email.to_lowercase();

        if self.login_account.is_exhausted(&account).await?
            || self.login_ip.is_exhausted(&request.client_ip).await?
        {
            warn!("Login throttled for account {} from {}", account, request.client_ip);
            return Err(Error::TooManyAttempts);
        }

        let admin = match self.admins.get_by_email(email).await? {
            Some(admin) if admin.is_active => admin,
            Some(admin) => {
                info!("Login refused for inactive admin {}", admin.id);
                return Err(self.login_failed(&account, request).await);
            }
            None => return Err(self.login_failed(&account, request).await),
        };

        let Some((role, _)) = admin.trusted_scope() else {
            warn!(
                "Admin {} has an unrecognised role '{}' or brand '{}'; refusing login",
                admin.id, admin.role, admin.brand
            );
            return Err(self.login_failed(&account, request).await);
        };

        let session = match self.provider.sign_in_with_password(email, password).await {
            Ok(session) => session,
            Err(Error::InvalidCredentials) => return Err(self.login_failed(&account, request).await),
            Err(e) => return Err(e),
        };

        let claims = AdminClaims::for_user(&admin, role);
        self.provider
            .update_app_metadata(&session.user.id, &claims.merge_into(&session.user.app_metadata))
            .await?;
        // The first token predates the claims.
        let session = self.provider.refresh_session(&session.refresh_token).await?;

        self.record(
            AdminAuditLogEntry::new(
                Some(admin.id),
                AuditAction::Login,
                None,
                Some(json!({ "email": admin.email })),
            )
            .with_request(request),
        )
        .await;
        self.login_account.clear(&account).await?;

        info!("Admin {} logged in ({} / {})", admin.id, role, admin.branch);
        Ok(LoginResult {
            tokens: TokenPair {
                token: session.access_token,
                refresh_token: session.refresh_token,
            },
            user: admin.profile(),
        })
    }

    /// Resolves a bearer token to the admin it was issued for.
    pub async fn verify(&self, token: &str) -> Result<AdminIdentity, Error> {
        if token.is_empty() {
            return Err(Error::InvalidToken);
        }
        let user = self.provider.get_user(token).await?;
        let claims = AdminClaims::from_metadata(&user.app_metadata).ok_or(Error::InvalidToken)?;
        Ok(AdminIdentity {
            provider_user_id: user.id,
            email: user.email,
            claims,
        })
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, Error> {
        let refresh_token = refresh_token.trim();
        if refresh_token.is_empty() {
            return Err(Error::InvalidInput("Refresh token is required".into()));
        }
        let session = self.provider.refresh_session(refresh_token).await?;
        Ok(TokenPair {
            token: session.access_token,
            refresh_token: session.refresh_token,
        })
    }

    pub async fn logout(&self, token: &str, request: &RequestMeta) -> Result<(), Error> {
        let identity = self.verify(token).await?;
        self.record(
            AdminAuditLogEntry::new(Some(identity.claims.admin_id), AuditAction::Logout, None, None)
                .with_request(request),
        )
        .await;
        self.provider.sign_out(token, SignOutScope::Local).await
    }

    /// Re-authenticates with `current` before accepting `new`, then ends
    /// every session of the admin.
    pub async fn change_password(
        &self,
        token: &str,
        current: &str,
        new: &str,
        request: &RequestMeta,
    ) -> Result<(), Error> {
        if current.is_empty() || new.is_empty() {
            return Err(Error::InvalidInput("Current and new passwords are required".into()));
        }
        let identity = self.verify(token).await?;
        validate_new_password(current, new)?;

        let email = identity.email.clone().ok_or(Error::InvalidToken)?;
        let account = email.to_lowercase();
        if self.login_account.is_exhausted(&account).await? {
            warn!("Password change throttled for admin {}", identity.claims.admin_id);
            return Err(Error::TooManyAttempts);
        }

        // The provider has no "check password" call; a sign-in is the check.
        match self.provider.sign_in_with_password(&email, current).await {
            Ok(_) => {}
            Err(Error::InvalidCredentials) => {
                self.login_account.record_failure(&account).await?;
                return Err(Error::InvalidCredentials);
            }
            Err(e) => return Err(e),
        }

        self.provider.update_password(&identity.provider_user_id, new).await?;

        let admin_id = identity.claims.admin_id;
        let new_password = new.to_string();
        let hashed = tokio::task::spawn_blocking(move || hash_password(&new_password))
            .await
            .map_err(|e| Error::Internal(format!("password hash task failed: {}", e)))?;
        match hashed {
            Ok(phc) => {
                if let Err(e) = self.admins.update_password_hash(admin_id, &phc).await {
                    error!("Password changed at provider but local hash update failed for {}: {}", admin_id, e);
                }
            }
            Err(e) => error!("Could not hash new password for admin {}: {}", admin_id, e),
        }

        self.record(
            AdminAuditLogEntry::new(
                Some(admin_id),
                AuditAction::PasswordChanged,
                Some(&admin_id.to_string()),
                None,
            )
            .with_request(request),
        )
        .await;

        self.provider.sign_out(token, SignOutScope::Global).await?;
        info!("Admin {} changed password; all sessions revoked", admin_id);
        Ok(())
    }

    pub async fn update_profile(
        &self,
        token: &str,
        display_name: Option<&str>,
        profile_pic: Option<&str>,
    ) -> Result<AdminProfile, Error> {
        let identity = self.verify(token).await?;
        let update = validate_profile_update(display_name, profile_pic)?;
        let admin = self
            .admins
            .update_profile(identity.claims.admin_id, &update)
            .await?
            .ok_or(Error::InvalidToken)?;
        Ok(admin.profile())
    }

    pub async fn record_redemption(
        &self,
        identity: &AdminIdentity,
        response_id: &str,
        request: &RequestMeta,
    ) {
        self.record(
            AdminAuditLogEntry::new(
                Some(identity.claims.admin_id),
                AuditAction::RewardRedeemed,
                Some(response_id),
                Some(json!({ "email": identity.email })),
            )
            .with_request(request),
        )
        .await;
    }

    /// Counts a failed login against the account and the caller's IP and
    /// returns the error to hand back.
    async fn login_failed(&self, account: &str, request: &RequestMeta) -> Error {
        let counted = async {
            self.login_account.record_failure(account).await?;
            self.login_ip.record_failure(&request.client_ip).await
        };
        match counted.await {
            Ok(()) => Error::InvalidCredentials,
            Err(e) => e,
        }
    }

    /// Audit writes never fail the action they describe.
    async fn record(&self, entry: AdminAuditLogEntry) {
        if let Err(e) = self.audit_log.insert_entry(&entry).await {
            error!(
                "Failed to write audit entry '{}' for admin {:?}: {}",
                entry.action.as_str(),
                entry.admin_id,
                e
            );
        }
    }
}

fn validate_new_password(current: &str, new: &str) -> Result<(), Error> {
    let chars = new.chars().count();
    if chars < MIN_PASSWORD_CHARS || chars > MAX_PASSWORD_CHARS {
        return Err(Error::InvalidInput(format!(
            "New password must be {} to {} characters",
            MIN_PASSWORD_CHARS, MAX_PASSWORD_CHARS
        )));
    }
    if new == current {
        return Err(Error::InvalidInput("New password must differ from the current one".into()));
    }
    Ok(())
}
