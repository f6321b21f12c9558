use async_trait::async_trait;
use uuid::Uuid;
use crate::error::Error;
use crate::models::{
    AdminAuditLogEntry, AdminUser, Completion, ProfileUpdate, Redemption, SurveyResponse,
    TicketStatus,
};

/// Survey rows. The store, not the caller, is responsible for the two
/// per-receipt uniqueness rules: at most one OPEN and at most one COMPLETED
/// row per receipt value.
#[async_trait]
pub trait SurveyResponseRepository: Send + Sync {
    /// Inserts a new OPEN row.
    /// Fails with `Error::UniqueViolation` when the receipt already has an OPEN row.
    async fn create_response(&self, response: &SurveyResponse) -> Result<(), Error>;

    async fn get_response(&self, id: Uuid) -> Result<Option<SurveyResponse>, Error>;

    async fn find_open_by_receipt(&self, receipt: &str) -> Result<Option<SurveyResponse>, Error>;

    async fn find_completed_by_receipt(&self, receipt: &str) -> Result<Option<SurveyResponse>, Error>;

    /// Sets answers, `completed_at`, `reward_code` and `reward_generated_at` in
    /// one statement, only if the row is still OPEN.
    ///
    /// Returns `Ok(false)` if no OPEN row with that id exists, and
    /// `Error::UniqueViolation` if the receipt already has a COMPLETED row.
    async fn complete_response(&self, id: Uuid, completion: &Completion) -> Result<bool, Error>;

    /// Flips `reward_claimed` false -> true on a COMPLETED row.
    /// Returns `Ok(false)` when nothing matched.
    async fn mark_redeemed(&self, id: Uuid, redemption: &Redemption) -> Result<bool, Error>;

    async fn update_ticket_status(&self, id: Uuid, status: TicketStatus) -> Result<bool, Error>;

    /// Rows with a receipt but a null `brand` or `branch`.
    async fn list_missing_brand_branch(&self) -> Result<Vec<SurveyResponse>, Error>;

    /// Writes only the columns that are `Some`, and only where they are still null.
    async fn fill_brand_branch(
        &self,
        id: Uuid,
        brand: Option<&str>,
        branch: Option<&str>,
    ) -> Result<bool, Error>;
}

#[async_trait]
pub trait AdminUserRepository: Send + Sync {
    async fn get_by_email(&self, email: &str) -> Result<Option<AdminUser>, Error>;
    async fn get_admin(&self, admin_id: Uuid) -> Result<Option<AdminUser>, Error>;
    async fn update_password_hash(&self, admin_id: Uuid, password_hash: &str) -> Result<(), Error>;

    /// Applies the `Some` fields and returns the updated row.
    async fn update_profile(
        &self,
        admin_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Option<AdminUser>, Error>;
}

/// Append-only: no update or delete.
#[async_trait]
pub trait AdminAuditLogRepository: Send + Sync {
    async fn insert_entry(&self, entry: &AdminAuditLogEntry) -> Result<(), Error>;
    async fn list_for_admin(&self, admin_id: Uuid, limit: i64) -> Result<Vec<AdminAuditLogEntry>, Error>;
}
