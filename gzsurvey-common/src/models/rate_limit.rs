// File: gzsurvey-common/src/models/rate_limit.rs

use std::time::Duration;
use serde::{Deserialize, Serialize};

/// `max_hits` per fixed `window`, counted per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    pub max_hits: u32,
    #[serde(with = "duration_secs")]
    pub window: Duration,
}

impl RateLimitPolicy {
    pub const fn per_minute(max_hits: u32) -> Self {
        Self { max_hits, window: Duration::from_secs(60) }
    }

    pub const fn per_minutes(max_hits: u32, minutes: u64) -> Self {
        Self { max_hits, window: Duration::from_secs(minutes * 60) }
    }
}

/// Counter value seen by the caller after a read or increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCount {
    pub hits: u32,
    /// Time left before the window resets.
    pub resets_in: Duration,
}

mod duration_secs {
    use std::time::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}
