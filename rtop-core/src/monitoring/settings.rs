//! Monitoring settings for remote host metrics collection
//!
//! Stored in `config.toml` under `[monitoring]`. Command-line flags override
//! the file values before the settings reach the collector.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Shortest allowed polling interval in seconds
pub const MIN_INTERVAL_SECS: u64 = 1;
/// Longest allowed polling interval in seconds
pub const MAX_INTERVAL_SECS: u64 = 3600;
/// Longest allowed per-probe deadline in seconds
pub const MAX_PROBE_TIMEOUT_SECS: u64 = 300;

/// Global monitoring settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringSettings {
    /// Polling interval in seconds (1–3600, default: 5)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Maximum probes in flight; the local CPU count when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    /// Deadline for each probe command in seconds (1–300, default: 10)
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

const fn default_interval_secs() -> u64 {
    5
}

const fn default_probe_timeout_secs() -> u64 {
    10
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            workers: None,
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

impl MonitoringSettings {
    /// Returns the interval clamped to the valid range (1–3600 seconds)
    #[must_use]
    pub const fn effective_interval_secs(&self) -> u64 {
        if self.interval_secs < MIN_INTERVAL_SECS {
            MIN_INTERVAL_SECS
        } else if self.interval_secs > MAX_INTERVAL_SECS {
            MAX_INTERVAL_SECS
        } else {
            self.interval_secs
        }
    }

    /// Polling interval as a [`Duration`]
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.effective_interval_secs())
    }

    /// Returns the probe deadline clamped to 1–300 seconds
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs.clamp(1, MAX_PROBE_TIMEOUT_SECS))
    }

    /// Worker limit: the configured value, or the number of logical CPUs
    #[must_use]
    pub fn effective_workers(&self) -> usize {
        self.workers.filter(|n| *n > 0).unwrap_or_else(|| {
            std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
        })
    }
}
