// File: gzsurvey-core/src/config.rs

use std::time::Duration;
use gzsurvey_common::models::RateLimitPolicy;

/// Per-endpoint throttling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub init_survey: RateLimitPolicy,
    pub submit_survey: RateLimitPolicy,
    pub reward_details: RateLimitPolicy,
    pub generate_reward: RateLimitPolicy,
    pub login_account: RateLimitPolicy,
    pub login_ip: RateLimitPolicy,
    pub purge_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            init_survey: RateLimitPolicy::per_minute(10),
            submit_survey: RateLimitPolicy::per_minute(5),
            reward_details: RateLimitPolicy::per_minute(10),
            generate_reward: RateLimitPolicy::per_minute(5),
            login_account: RateLimitPolicy::per_minutes(5, 15),
            login_ip: RateLimitPolicy::per_minutes(20, 15),
            purge_interval: Duration::from_secs(300),
        }
    }
}

/// Browser origins allowed to call the API with credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    /// Also accept `http(s)://localhost[:port]` and `127.0.0.1`. Development only.
    pub allow_localhost: bool,
}

impl CorsConfig {
    /// Parses a comma-separated origin list, ignoring blanks and trailing slashes.
    pub fn from_list(list: &str, allow_localhost: bool) -> Self {
        let allowed_origins = list
            .split(',')
            .map(|o| o.trim().trim_end_matches('/'))
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();
        Self { allowed_origins, allow_localhost }
    }
}

/// Where the hosted authentication service lives.
#[derive(Debug, Clone)]
pub struct AuthProviderConfig {
    pub base_url: String,
    pub service_key: String,
    pub request_timeout: Duration,
}

impl AuthProviderConfig {
    pub fn new(base_url: &str, service_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}
