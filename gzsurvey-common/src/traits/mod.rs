// File: gzsurvey-common/src/traits/mod.rs
pub mod auth_traits;
pub mod rate_limit_traits;
pub mod repository_traits;

pub use auth_traits::AuthProvider;
pub use rate_limit_traits::CounterStore;
pub use repository_traits::{
    AdminAuditLogRepository, AdminUserRepository, SurveyResponseRepository,
};
