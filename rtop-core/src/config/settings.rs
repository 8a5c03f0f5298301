//! Application settings
//!
//! Settings are stored in `config.toml`. Every field has a default, so a
//! partial file (or none at all) is valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::monitoring::MonitoringSettings;

/// Top-level application settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Harvest interval, concurrency and deadlines
    #[serde(default)]
    pub monitoring: MonitoringSettings,
    /// Transport settings
    #[serde(default)]
    pub connection: ConnectionSettings,
}

/// How the server's host key is verified
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostKeyPolicy {
    /// Accept any host key without checking
    #[default]
    AcceptAny,
    /// Require the key to be listed in `~/.ssh/known_hosts`
    KnownHosts,
}

/// Transport settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Host key verification policy
    #[serde(default)]
    pub host_key_policy: HostKeyPolicy,
    /// Alias file to read instead of `~/.ssh/config`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_config_path: Option<PathBuf>,
}
