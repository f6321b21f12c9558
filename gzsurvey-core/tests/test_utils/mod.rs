// File: gzsurvey-core/tests/test_utils/mod.rs
//
// In-memory stand-ins for the Postgres repositories and a mock auth provider.
// The survey store enforces the same two partial unique indexes as the schema.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mockall::mock;
use parking_lot::Mutex;
use serde_json::{json, Value};
use uuid::Uuid;

use gzsurvey_core::api::{build_router, AppState};
use gzsurvey_core::config::CorsConfig;
use gzsurvey_core::models::{
    AdminAuditLogEntry, AdminClaims, AdminRole, AdminUser, Completion, ProfileUpdate,
    ProviderSession, ProviderUser, Redemption, SignOutScope, SurveyResponse, TicketStatus,
};
use gzsurvey_core::rate_limit::RateLimits;
use gzsurvey_core::services::{AdminSessionManager, SurveySessionManager};
use gzsurvey_core::traits::{
    AdminAuditLogRepository, AdminUserRepository, AuthProvider, SurveyResponseRepository,
};
use gzsurvey_core::Error;

// ---------------------------------------------------------------------------
// Survey responses
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemorySurveyRepository {
    rows: Mutex<HashMap<Uuid, SurveyResponse>>,
    /// While > 0, receipt lookups return nothing, as if another request had
    /// not committed yet.
    blind_lookups: AtomicUsize,
    id_lookups: AtomicUsize,
}

impl InMemorySurveyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `n` `find_*_by_receipt` calls miss.
    pub fn blind_next_lookups(&self, n: usize) {
        self.blind_lookups.store(n, Ordering::SeqCst);
    }

    /// Number of `get_response` calls so far.
    pub fn id_lookups(&self) -> usize {
        self.id_lookups.load(Ordering::SeqCst)
    }

    pub fn all(&self) -> Vec<SurveyResponse> {
        self.rows.lock().values().cloned().collect()
    }

    pub fn get(&self, id: Uuid) -> Option<SurveyResponse> {
        self.rows.lock().get(&id).cloned()
    }

    pub fn completed_for(&self, receipt: &str) -> usize {
        self.rows
            .lock()
            .values()
            .filter(|r| r.receipt == receipt && r.completed_at.is_some())
            .count()
    }

    /// Inserts a row as-is, bypassing the uniqueness checks.
    pub fn seed(&self, row: SurveyResponse) {
        self.rows.lock().insert(row.id, row);
    }

    fn is_blind(&self) -> bool {
        self.blind_lookups
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn find(&self, receipt: &str, completed: bool) -> Option<SurveyResponse> {
        if self.is_blind() {
            return None;
        }
        self.rows
            .lock()
            .values()
            .find(|r| r.receipt == receipt && r.completed_at.is_some() == completed)
            .cloned()
    }
}

#[async_trait]
impl SurveyResponseRepository for InMemorySurveyRepository {
    async fn create_response(&self, response: &SurveyResponse) -> Result<(), Error> {
        let mut rows = self.rows.lock();
        if rows.contains_key(&response.id) {
            return Err(Error::UniqueViolation("survey_responses_pkey".into()));
        }
        if rows
            .values()
            .any(|r| r.receipt == response.receipt && r.completed_at.is_none())
        {
            return Err(Error::UniqueViolation("survey_responses_open_receipt_key".into()));
        }
        rows.insert(response.id, response.clone());
        Ok(())
    }

    async fn get_response(&self, id: Uuid) -> Result<Option<SurveyResponse>, Error> {
        self.id_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.lock().get(&id).cloned())
    }

    async fn find_open_by_receipt(&self, receipt: &str) -> Result<Option<SurveyResponse>, Error> {
        Ok(self.find(receipt, false))
    }

    async fn find_completed_by_receipt(&self, receipt: &str) -> Result<Option<SurveyResponse>, Error> {
        Ok(self.find(receipt, true))
    }

    async fn complete_response(&self, id: Uuid, completion: &Completion) -> Result<bool, Error> {
        let mut rows = self.rows.lock();
        let Some(receipt) = rows
            .get(&id)
            .filter(|r| r.completed_at.is_none())
            .map(|r| r.receipt.clone())
        else {
            return Ok(false);
        };
        if rows
            .values()
            .any(|r| r.id != id && r.receipt == receipt && r.completed_at.is_some())
        {
            return Err(Error::UniqueViolation("survey_responses_completed_receipt_key".into()));
        }

        let row = rows.get_mut(&id).expect("row checked above");
        if let Some(answers) = &completion.answers {
            row.answers = answers.clone();
        }
        row.completed_at = Some(completion.completed_at);
        row.reward_code = Some(completion.reward_code.clone());
        row.reward_generated_at = Some(completion.completed_at);
        if row.brand.is_none() {
            row.brand = completion.brand.clone();
        }
        if row.branch.is_none() {
            row.branch = completion.branch.clone();
        }
        Ok(true)
    }

    async fn mark_redeemed(&self, id: Uuid, redemption: &Redemption) -> Result<bool, Error> {
        let mut rows = self.rows.lock();
        match rows.get_mut(&id) {
            Some(row) if !row.reward_claimed && row.is_completed() => {
                row.reward_claimed = true;
                row.reward_claimed_at = Some(redemption.claimed_at);
                row.reward_claimed_by = Some(redemption.claimed_by.clone());
                row.reward_claimed_branch = Some(redemption.claimed_branch.clone());
                row.reward_claimed_brand = Some(redemption.claimed_brand.clone());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_ticket_status(&self, id: Uuid, status: TicketStatus) -> Result<bool, Error> {
        Ok(self
            .rows
            .lock()
            .get_mut(&id)
            .map(|row| row.ticket_status = status)
            .is_some())
    }

    async fn list_missing_brand_branch(&self) -> Result<Vec<SurveyResponse>, Error> {
        let mut rows: Vec<_> = self
            .rows
            .lock()
            .values()
            .filter(|r| r.brand.is_none() || r.branch.is_none())
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.created_at);
        Ok(rows)
    }

    async fn fill_brand_branch(
        &self,
        id: Uuid,
        brand: Option<&str>,
        branch: Option<&str>,
    ) -> Result<bool, Error> {
        let mut rows = self.rows.lock();
        let Some(row) = rows.get_mut(&id) else {
            return Ok(false);
        };
        if row.brand.is_some() && row.branch.is_some() {
            return Ok(false);
        }
        if row.brand.is_none() {
            row.brand = brand.map(String::from);
        }
        if row.branch.is_none() {
            row.branch = branch.map(String::from);
        }
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Admin users and audit log
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryAdminRepository {
    rows: Mutex<HashMap<Uuid, AdminUser>>,
}

impl InMemoryAdminRepository {
    pub fn with(admins: Vec<AdminUser>) -> Self {
        Self {
            rows: Mutex::new(admins.into_iter().map(|a| (a.id, a)).collect()),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<AdminUser> {
        self.rows.lock().get(&id).cloned()
    }
}

#[async_trait]
impl AdminUserRepository for InMemoryAdminRepository {
    async fn get_by_email(&self, email: &str) -> Result<Option<AdminUser>, Error> {
        Ok(self
            .rows
            .lock()
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn get_admin(&self, admin_id: Uuid) -> Result<Option<AdminUser>, Error> {
        Ok(self.get(admin_id))
    }

    async fn update_password_hash(&self, admin_id: Uuid, password_hash: &str) -> Result<(), Error> {
        if let Some(a) = self.rows.lock().get_mut(&admin_id) {
            a.password_hash = password_hash.to_string();
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        admin_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Option<AdminUser>, Error> {
        let mut rows = self.rows.lock();
        let Some(a) = rows.get_mut(&admin_id) else {
            return Ok(None);
        };
        if let Some(name) = &update.display_name {
            a.display_name = Some(name.clone());
        }
        if let Some(pic) = &update.profile_pic {
            a.profile_pic = Some(pic.clone());
        }
        Ok(Some(a.clone()))
    }
}

#[derive(Default)]
pub struct InMemoryAuditLog {
    entries: Mutex<Vec<AdminAuditLogEntry>>,
}

impl InMemoryAuditLog {
    pub fn entries(&self) -> Vec<AdminAuditLogEntry> {
        self.entries.lock().clone()
    }
}

#[async_trait]
impl AdminAuditLogRepository for InMemoryAuditLog {
    async fn insert_entry(&self, entry: &AdminAuditLogEntry) -> Result<(), Error> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }

    async fn list_for_admin(&self, admin_id: Uuid, limit: i64) -> Result<Vec<AdminAuditLogEntry>, Error> {
        Ok(self
            .entries
            .lock()
            .iter()
            .rev()
            .filter(|e| e.admin_id == Some(admin_id))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Auth provider
// ---------------------------------------------------------------------------

mock! {
    pub Provider {}
    #[async_trait]
    impl AuthProvider for Provider {
        async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<ProviderSession, Error>;
        async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, Error>;
        async fn get_user(&self, access_token: &str) -> Result<ProviderUser, Error>;
        async fn update_app_metadata(&self, user_id: &str, app_metadata: &Value) -> Result<(), Error>;
        async fn update_password(&self, user_id: &str, new_password: &str) -> Result<(), Error>;
        async fn sign_out(&self, access_token: &str, scope: SignOutScope) -> Result<(), Error>;
    }
}

pub const ADMIN_EMAIL: &str = "validator.cebu@mendokoro.ph";
pub const ADMIN_PASSWORD: &str = "tonkotsu-rich-42";

pub fn admin_user() -> AdminUser {
    AdminUser {
        id: Uuid::new_v4(),
        email: ADMIN_EMAIL.to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
        brand: "Mendokoro".to_string(),
        branch: "Cebu".to_string(),
        role: "branch_validator".to_string(),
        is_active: true,
        display_name: None,
        profile_pic: None,
        created_at: Utc::now(),
    }
}

pub fn provider_session(user_id: Uuid, access: &str, refresh: &str) -> ProviderSession {
    ProviderSession {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        user: ProviderUser {
            id: user_id.to_string(),
            email: Some(ADMIN_EMAIL.to_string()),
            app_metadata: json!({ "provider": "email" }),
        },
    }
}

/// Provider user whose metadata carries the admin's claims.
pub fn claimed_user(admin: &AdminUser) -> ProviderUser {
    let claims = AdminClaims::for_user(admin, AdminRole::BranchValidator);
    ProviderUser {
        id: admin.id.to_string(),
        email: Some(admin.email.clone()),
        app_metadata: claims.merge_into(&json!({ "provider": "email" })),
    }
}

pub struct AdminHarness {
    pub manager: Arc<AdminSessionManager>,
    pub admins: Arc<InMemoryAdminRepository>,
    pub audit: Arc<InMemoryAuditLog>,
    pub limits: RateLimits,
}

pub fn admin_harness(admin: AdminUser, provider: MockProvider) -> AdminHarness {
    let limits = RateLimits::in_memory();
    let admins = Arc::new(InMemoryAdminRepository::with(vec![admin]));
    let audit = Arc::new(InMemoryAuditLog::default());
    let manager = Arc::new(AdminSessionManager::new(
        admins.clone(),
        audit.clone(),
        Arc::new(provider),
        &limits,
    ));
    AdminHarness { manager, admins, audit, limits }
}

pub struct TestApp {
    pub router: axum::Router,
    pub surveys: Arc<InMemorySurveyRepository>,
    pub admin: AdminHarness,
}

pub fn test_app(admin: AdminUser, provider: MockProvider, cors: CorsConfig) -> TestApp {
    let surveys = Arc::new(InMemorySurveyRepository::new());
    let admin = admin_harness(admin, provider);
    let state = AppState {
        surveys: Arc::new(SurveySessionManager::new(surveys.clone())),
        admins: admin.manager.clone(),
        limits: admin.limits.clone(),
    };
    TestApp {
        router: build_router(state, &cors),
        surveys,
        admin,
    }
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

static DB_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

/// A migrated, emptied test database plus a guard that keeps other tests in
/// this binary off it. `None` when `TEST_DATABASE_URL` is not set.
pub async fn setup_test_database(
) -> Result<Option<(gzsurvey_core::Database, tokio::sync::MutexGuard<'static, ()>)>, Error> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        return Ok(None);
    };
    let guard = DB_LOCK.lock().await;
    let db = gzsurvey_core::Database::connect(&url, 5).await?;
    db.apply_schema().await?;
    clean_database(&db).await?;
    Ok(Some((db, guard)))
}

/// The audit log rejects DELETE, so TRUNCATE is the only way to reset it.
pub async fn clean_database(db: &gzsurvey_core::Database) -> Result<(), Error> {
    sqlx::query("TRUNCATE TABLE survey_responses, admin_users, admin_audit_log")
        .execute(db.pool())
        .await?;
    Ok(())
}
