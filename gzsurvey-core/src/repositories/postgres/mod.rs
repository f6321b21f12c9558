// src/repositories/postgres/mod.rs

pub mod admin_audit_log;
pub mod admin_users;
pub mod survey_responses;

pub use admin_audit_log::PostgresAdminAuditLogRepository;
pub use admin_users::PostgresAdminUserRepository;
pub use survey_responses::PostgresSurveyResponseRepository;
