//! Remote host metric harvesting
//!
//! Provides agentless system metrics collection by running a fixed set of
//! diagnostic commands on a remote Linux host and parsing their output from
//! `/proc/*`, `df` and `ip`.
//!
//! This module is I/O-free apart from the [`CommandExecutor`](crate::ssh::CommandExecutor)
//! it is handed; rendering lives in the CLI.

pub mod collector;
mod harvester;
mod metrics;
mod parser;
mod probes;
mod settings;

pub use collector::{CollectorHandle, MetricsEvent, start_collector};
pub use harvester::{Harvest, Harvester};
pub use metrics::{
    CpuInfo, CpuRaw, FsInfo, Loads, MemInfo, NetDevInfo, NetInterface, NetIpAddr, Snapshot,
    merge_net_interfaces,
};
pub use parser::MetricsParser;
pub use probes::{PROBES, ProbeKind, ProbeOutput, ProbeParser, ProbeSpec};
pub use settings::{
    MAX_INTERVAL_SECS, MAX_PROBE_TIMEOUT_SECS, MIN_INTERVAL_SECS, MonitoringSettings,
};
