// File: gzsurvey-core/src/rate_limit/mod.rs

pub mod memory;

use std::sync::Arc;
use tracing::warn;
use gzsurvey_common::models::RateLimitPolicy;
use gzsurvey_common::traits::CounterStore;
use crate::config::RateLimitConfig;
use crate::Error;

pub use memory::InMemoryCounterStore;

/// One named fixed-window limiter over a shared [`CounterStore`].
///
/// Keys are `"{name}:{subject}"`, so several limiters can share one store.
#[derive(Clone)]
pub struct RateLimiter {
    name: &'static str,
    policy: RateLimitPolicy,
    store: Arc<dyn CounterStore>,
}

impl RateLimiter {
    pub fn new(name: &'static str, policy: RateLimitPolicy, store: Arc<dyn CounterStore>) -> Self {
        Self { name, policy, store }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    fn key(&self, subject: &str) -> String {
        format!("{}:{}", self.name, subject)
    }

    /// Counts one request and fails with `Error::RateLimited` once the
    /// window holds more than `max_hits`.
    pub async fn check_and_record(&self, subject: &str) -> Result<(), Error> {
        let count = self.store.increment(&self.key(subject), self.policy.window).await?;
        if count.hits > self.policy.max_hits {
            warn!(
                "Rate limit '{}' exceeded for {} ({} hits, resets in {}s)",
                self.name,
                subject,
                count.hits,
                count.resets_in.as_secs()
            );
            return Err(Error::RateLimited);
        }
        Ok(())
    }

    /// True once `max_hits` failures are on record. Does not count anything.
    pub async fn is_exhausted(&self, subject: &str) -> Result<bool, Error> {
        Ok(self
            .store
            .current(&self.key(subject))
            .await?
            .is_some_and(|c| c.hits >= self.policy.max_hits))
    }

    pub async fn record_failure(&self, subject: &str) -> Result<(), Error> {
        self.store.increment(&self.key(subject), self.policy.window).await?;
        Ok(())
    }

    pub async fn clear(&self, subject: &str) -> Result<(), Error> {
        self.store.reset(&self.key(subject)).await
    }
}

/// Every limiter the service uses, all backed by the same store.
#[derive(Clone)]
pub struct RateLimits {
    pub init_survey: RateLimiter,
    pub submit_survey: RateLimiter,
    pub reward_details: RateLimiter,
    pub generate_reward: RateLimiter,
    /// Failed logins per lowercased email.
    pub login_account: RateLimiter,
    /// Failed logins per client IP.
    pub login_ip: RateLimiter,
    store: Arc<dyn CounterStore>,
}

impl RateLimits {
    pub fn new(config: &RateLimitConfig, store: Arc<dyn CounterStore>) -> Self {
        Self {
            init_survey: RateLimiter::new("init-survey", config.init_survey, store.clone()),
            submit_survey: RateLimiter::new("submit-survey", config.submit_survey, store.clone()),
            reward_details: RateLimiter::new("get-reward-details", config.reward_details, store.clone()),
            generate_reward: RateLimiter::new("generate-reward", config.generate_reward, store.clone()),
            login_account: RateLimiter::new("login-account", config.login_account, store.clone()),
            login_ip: RateLimiter::new("login-ip", config.login_ip, store.clone()),
            store,
        }
    }

    /// In-memory store with default policies.
    pub fn in_memory() -> Self {
        Self::new(&RateLimitConfig::default(), Arc::new(InMemoryCounterStore::new()))
    }

    pub fn store(&self) -> Arc<dyn CounterStore> {
        self.store.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn limiter(max_hits: u32) -> RateLimiter {
        RateLimiter::new(
            "test",
            RateLimitPolicy { max_hits, window: Duration::from_secs(60) },
            Arc::new(InMemoryCounterStore::new()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn allows_max_hits_then_rejects_until_window_expires() {
        let l = limiter(5);
        for _ in 0..5 {
            l.check_and_record("10.0.0.1").await.unwrap();
        }
        assert!(matches!(l.check_and_record("10.0.0.1").await, Err(Error::RateLimited)));
        // other callers are unaffected
        l.check_and_record("10.0.0.2").await.unwrap();

        tokio::time::advance(Duration::from_secs(60)).await;
        l.check_and_record("10.0.0.1").await.unwrap();
    }

    #[tokio::test]
    async fn failures_exhaust_and_clear_resets() {
        let l = limiter(3);
        for _ in 0..2 {
            l.record_failure("a@example.com").await.unwrap();
        }
        assert!(!l.is_exhausted("a@example.com").await.unwrap());
        l.record_failure("a@example.com").await.unwrap();
        assert!(l.is_exhausted("a@example.com").await.unwrap());

        l.clear("a@example.com").await.unwrap();
        assert!(!l.is_exhausted("a@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn limiters_sharing_a_store_do_not_collide() {
        let limits = RateLimits::in_memory();
        for _ in 0..5 {
            limits.submit_survey.check_and_record("1.2.3.4").await.unwrap();
        }
        assert!(limits.submit_survey.check_and_record("1.2.3.4").await.is_err());
        limits.init_survey.check_and_record("1.2.3.4").await.unwrap();
    }
}
