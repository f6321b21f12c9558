// ================================================================
// File: gzsurvey-common/src/error.rs
// ================================================================

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
    // Business-rule failures, surfaced to callers as-is:
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid receipt: {0}")]
    InvalidReceipt(String),

    #[error("This receipt has already been used to claim a reward.")]
    AlreadyRewarded { response_id: Option<Uuid> },

    #[error("This reward has already been redeemed.")]
    AlreadyRedeemed,

    #[error("Invalid survey session.")]
    UnknownSession,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid request or reward code.")]
    InvalidRewardCode,

    #[error("Too many requests. Please try again later.")]
    RateLimited,

    #[error("Too many login attempts. Please try again later.")]
    TooManyAttempts,

    // Store-level constraint failures. Repositories raise this for SQLSTATE 23505
    // so services can recover from races without knowing about sqlx.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    // Infrastructure failures:
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("Uuid error: {0}")]
    Uuid(#[from] uuid::Error),

    #[error("Auth provider error: {0}")]
    Provider(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for failures that are the caller's fault and safe to echo back.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_)
                | Error::InvalidReceipt(_)
                | Error::AlreadyRewarded { .. }
                | Error::AlreadyRedeemed
                | Error::UnknownSession
                | Error::InvalidCredentials
                | Error::InvalidToken
                | Error::InvalidRewardCode
                | Error::RateLimited
                | Error::TooManyAttempts
        )
    }

    /// Maps a sqlx error to `UniqueViolation` when Postgres reports 23505.
    pub fn from_db(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if let Some(code) = db_err.code() {
                if code == "23505" {
                    let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                    return Error::UniqueViolation(constraint);
                }
            }
        }
        Error::Database(err)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Parse(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Parse(s.to_string())
    }
}

impl From<chrono::format::ParseError> for Error {
    fn from(err: chrono::format::ParseError) -> Self {
        Error::Parse(err.to_string())
    }
}
