//! Reaper configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Configuration for the session reaper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaperConfig {
    /// Maximum session age in seconds.
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// How often to sweep (seconds).
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

fn default_ttl() -> u64 {
    1800 // 30 minutes
}

fn default_interval() -> u64 {
    60
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            interval_secs: default_interval(),
        }
    }
}

impl ReaperConfig {
    pub fn with_ttl_secs(mut self, secs: u64) -> Self {
        self.ttl_secs = secs;
        self
    }

    pub fn with_interval_secs(mut self, secs: u64) -> Self {
        self.interval_secs = secs;
        self
    }

    /// TTL as a chrono duration.
    pub fn ttl(&self) -> Duration {
        // chrono panics above i64::MAX milliseconds
        let secs = self.ttl_secs.min(i64::MAX as u64 / 1000);
        Duration::seconds(secs as i64)
    }

    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_secs)
    }
}
