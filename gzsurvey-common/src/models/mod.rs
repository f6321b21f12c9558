// File: gzsurvey-common/src/models/mod.rs
pub mod admin;
pub mod audit;
pub mod auth;
pub mod rate_limit;
pub mod store;
pub mod survey;

pub use admin::{AdminClaims, AdminIdentity, AdminProfile, AdminRole, AdminUser, ProfileUpdate};
pub use audit::{AdminAuditLogEntry, AuditAction, RequestMeta};
pub use auth::{LoginResult, ProviderSession, ProviderUser, SignOutScope, TokenPair};
pub use rate_limit::{RateLimitPolicy, WindowCount};
pub use store::{StoreLocation, STORE_LOCATIONS, SCOPE_ALL};
pub use survey::{
    AnswerValue, Answers, Completion, Redemption, RewardDetails, SessionState, StartOutcome,
    SurveyResponse, TicketStatus,
};
