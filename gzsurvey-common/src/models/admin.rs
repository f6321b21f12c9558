// File: gzsurvey-common/src/models/admin.rs

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::store::is_known_brand;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    SuperAdmin,
    BrandManager,
    Validator,
    BranchManager,
    BranchValidator,
}

impl AdminRole {
    pub const ALL: [AdminRole; 5] = [
        AdminRole::SuperAdmin,
        AdminRole::BrandManager,
        AdminRole::Validator,
        AdminRole::BranchManager,
        AdminRole::BranchValidator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "super_admin",
            AdminRole::BrandManager => "brand_manager",
            AdminRole::Validator => "validator",
            AdminRole::BranchManager => "branch_manager",
            AdminRole::BranchValidator => "branch_validator",
        }
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminRole {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdminRole::ALL
            .iter()
            .find(|r| r.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown admin role: {}", s))
    }
}

/// Row in `admin_users`. `id` is the auth provider's user id.
///
/// `role` and `brand` are kept as raw strings because the row may have been
/// written directly to the database; call [`AdminUser::trusted_scope`] before
/// relying on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub brand: String,
    pub branch: String,
    pub role: String,
    pub is_active: bool,
    pub display_name: Option<String>,
    pub profile_pic: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AdminUser {
    /// The role and brand, if both are on the whitelist.
    pub fn trusted_scope(&self) -> Option<(AdminRole, &str)> {
        let role = self.role.parse::<AdminRole>().ok()?;
        if !is_known_brand(&self.brand) {
            return None;
        }
        Some((role, self.brand.as_str()))
    }

    pub fn profile(&self) -> AdminProfile {
        AdminProfile {
            id: self.id,
            email: self.email.clone(),
            brand: self.brand.clone(),
            branch: self.branch.clone(),
            role: self.role.clone(),
            display_name: self.display_name.clone(),
            profile_pic: self.profile_pic.clone(),
        }
    }
}

/// What the dashboard gets back about the signed-in admin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminProfile {
    pub id: Uuid,
    pub email: String,
    pub brand: String,
    pub branch: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
}

/// The claim set embedded in an admin's bearer token.
///
/// These are a copy of the admin row taken at login and go stale until the
/// next login or refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminClaims {
    pub admin_id: Uuid,
    pub role: AdminRole,
    pub brand: String,
    pub branch: String,
}

impl AdminClaims {
    pub fn for_user(user: &AdminUser, role: AdminRole) -> Self {
        Self {
            admin_id: user.id,
            role,
            brand: user.brand.clone(),
            branch: user.branch.clone(),
        }
    }

    /// Merges the claims into an existing provider metadata object,
    /// keeping unrelated keys.
    pub fn merge_into(&self, existing: &Value) -> Value {
        let mut merged = match existing {
            Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };
        merged.insert("admin_id".into(), Value::String(self.admin_id.to_string()));
        merged.insert("role".into(), Value::String(self.role.as_str().to_string()));
        merged.insert("brand".into(), Value::String(self.brand.clone()));
        merged.insert("branch".into(), Value::String(self.branch.clone()));
        Value::Object(merged)
    }

    /// Reads claims back out of provider metadata. Returns `None` if any
    /// claim is missing or off-whitelist.
    pub fn from_metadata(meta: &Value) -> Option<Self> {
        let admin_id = meta.get("admin_id")?.as_str()?.parse::<Uuid>().ok()?;
        let role = meta.get("role")?.as_str()?.parse::<AdminRole>().ok()?;
        let brand = meta.get("brand")?.as_str()?.to_string();
        let branch = meta.get("branch")?.as_str()?.to_string();
        if !is_known_brand(&brand) {
            return None;
        }
        Some(Self { admin_id, role, brand, branch })
    }
}

/// Authenticated identity resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    pub provider_user_id: String,
    pub email: Option<String>,
    pub claims: AdminClaims,
}

/// Self-service profile change. Both fields already validated.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub profile_pic: Option<String>,
}
