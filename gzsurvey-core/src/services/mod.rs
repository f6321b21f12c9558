// File: src/services/mod.rs

pub mod admin_session;
pub mod answers;
pub mod profile;
pub mod receipt;
pub mod reward_code;
pub mod survey_session;

pub use admin_session::AdminSessionManager;
pub use receipt::{validate_receipt, ValidReceipt};
pub use reward_code::generate_reward_code;
pub use survey_session::SurveySessionManager;
