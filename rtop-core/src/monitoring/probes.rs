//! Probe descriptors
//!
//! A probe pairs the command(s) that read one metric group with the parser
//! that understands their output. The harvester is driven entirely by
//! [`PROBES`]; adding a metric means adding a row here.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::FormatError;

use super::metrics::{CpuInfo, FsInfo, Loads, MemInfo, NetDevInfo, NetIpAddr};
use super::parser::MetricsParser;

/// Identifies one metric group of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeKind {
    /// Time since boot
    Uptime,
    /// Remote hostname
    Hostname,
    /// Load averages
    Load,
    /// Memory usage
    Memory,
    /// Mounted filesystems
    Filesystems,
    /// Interface addresses
    IpAddrs,
    /// Interface traffic counters
    NetDevices,
    /// CPU time shares
    Cpu,
}

impl ProbeKind {
    /// Short name used in logs and error messages
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uptime => "uptime",
            Self::Hostname => "hostname",
            Self::Load => "load",
            Self::Memory => "memory",
            Self::Filesystems => "filesystems",
            Self::IpAddrs => "ip-addrs",
            Self::NetDevices => "net-devices",
            Self::Cpu => "cpu",
        }
    }
}

impl std::fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parsed result of one probe
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutput {
    /// Time since boot
    Uptime(Duration),
    /// Remote hostname
    Hostname(String),
    /// Load averages
    Load(Loads),
    /// Memory usage
    Memory(MemInfo),
    /// Mounted filesystems
    Filesystems(Vec<FsInfo>),
    /// Interface addresses
    IpAddrs(HashMap<String, NetIpAddr>),
    /// Interface traffic counters
    NetDevices(HashMap<String, NetDevInfo>),
    /// CPU time shares
    Cpu(CpuInfo),
}

/// Parser signature shared by every probe
pub type ProbeParser = fn(&str) -> Result<ProbeOutput, FormatError>;

/// Describes how to collect one metric group
#[derive(Debug, Clone, Copy)]
pub struct ProbeSpec {
    /// Which metric group this probe fills
    pub kind: ProbeKind,
    /// Command tried first
    pub command: &'static str,
    /// Command tried when the primary one fails to execute
    pub fallback: Option<&'static str>,
    /// Turns the command's stdout into the metric group
    pub parse: ProbeParser,
}

impl ProbeSpec {
    /// Commands in the order they are attempted
    pub fn commands(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.command).chain(self.fallback)
    }
}

/// Every probe that makes up a snapshot
pub static PROBES: [ProbeSpec; 8] = [
    ProbeSpec {
        kind: ProbeKind::Uptime,
        command: "/bin/cat /proc/uptime",
        fallback: None,
        parse: |out| MetricsParser::parse_uptime(out).map(ProbeOutput::Uptime),
    },
    ProbeSpec {
        kind: ProbeKind::Hostname,
        command: "/bin/hostname -f",
        fallback: Some("/bin/hostname"),
        parse: |out| MetricsParser::parse_hostname(out).map(ProbeOutput::Hostname),
    },
    ProbeSpec {
        kind: ProbeKind::Load,
        command: "/bin/cat /proc/loadavg",
        fallback: None,
        parse: |out| MetricsParser::parse_loadavg(out).map(ProbeOutput::Load),
    },
    ProbeSpec {
        kind: ProbeKind::Memory,
        command: "/bin/cat /proc/meminfo",
        fallback: None,
        parse: |out| MetricsParser::parse_meminfo(out).map(ProbeOutput::Memory),
    },
    ProbeSpec {
        kind: ProbeKind::Filesystems,
        command: "/bin/df -B1",
        fallback: Some("/bin/df"),
        parse: |out| MetricsParser::parse_df(out).map(ProbeOutput::Filesystems),
    },
    ProbeSpec {
        kind: ProbeKind::IpAddrs,
        command: "/bin/ip -o addr",
        fallback: Some("/sbin/ip -o addr"),
        parse: |out| Ok(ProbeOutput::IpAddrs(MetricsParser::parse_ip_addrs(out))),
    },
    ProbeSpec {
        kind: ProbeKind::NetDevices,
        command: "/bin/cat /proc/net/dev",
        fallback: None,
        parse: |out| Ok(ProbeOutput::NetDevices(MetricsParser::parse_net_dev(out))),
    },
    ProbeSpec {
        kind: ProbeKind::Cpu,
        command: "/bin/cat /proc/stat",
        fallback: None,
        parse: |out| {
            MetricsParser::parse_proc_stat(out).map(|raw| ProbeOutput::Cpu(raw.percentages()))
        },
    },
];
