// File: gzsurvey-common/src/models/audit.rs

use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Login,
    Logout,
    PasswordChanged,
    RewardRedeemed,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Login => "login",
            AuditAction::Logout => "logout",
            AuditAction::PasswordChanged => "password_changed",
            AuditAction::RewardRedeemed => "reward_redeemed",
        }
    }

    pub fn resource_type(&self) -> &'static str {
        match self {
            AuditAction::Login | AuditAction::Logout => "session",
            AuditAction::PasswordChanged => "user",
            AuditAction::RewardRedeemed => "survey_response",
        }
    }
}

impl FromStr for AuditAction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login" => Ok(AuditAction::Login),
            "logout" => Ok(AuditAction::Logout),
            "password_changed" => Ok(AuditAction::PasswordChanged),
            "reward_redeemed" => Ok(AuditAction::RewardRedeemed),
            other => Err(format!("Unknown audit action: {}", other)),
        }
    }
}

/// Append-only record of a sensitive admin action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAuditLogEntry {
    pub audit_id: Uuid,
    pub admin_id: Option<Uuid>,
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub details: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl AdminAuditLogEntry {
    pub fn new(
        admin_id: Option<Uuid>,
        action: AuditAction,
        resource_id: Option<&str>,
        details: Option<Value>,
    ) -> Self {
        Self {
            audit_id: Uuid::new_v4(),
            admin_id,
            action,
            resource_type: action.resource_type().to_string(),
            resource_id: resource_id.map(String::from),
            ip_address: None,
            user_agent: None,
            details,
            created_at: Utc::now(),
        }
    }

    pub fn with_request(mut self, request: &RequestMeta) -> Self {
        self.ip_address = Some(request.client_ip.clone());
        self.user_agent = request.user_agent.clone();
        self
    }
}

/// Caller facts the HTTP layer hands to services for auditing and throttling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    pub client_ip: String,
    pub user_agent: Option<String>,
}

impl RequestMeta {
    pub const UNKNOWN_IP: &'static str = "unknown";

    pub fn unknown() -> Self {
        Self {
            client_ip: Self::UNKNOWN_IP.to_string(),
            user_agent: None,
        }
    }
}
