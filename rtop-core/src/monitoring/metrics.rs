//! Data models for remote host metrics
//!
//! All types are GUI-free and carry no formatting. A [`Snapshot`] is built
//! fresh by every harvest and never mutated after it is returned.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A snapshot of remote host metrics at a point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Fully-qualified (or short) hostname reported by the remote host
    pub hostname: String,
    /// Time since the remote host booted
    pub uptime: Duration,
    /// Load averages and process counts
    pub loads: Loads,
    /// CPU time shares since boot
    pub cpu: CpuInfo,
    /// Memory usage
    pub memory: MemInfo,
    /// Mounted filesystems, in `df` order
    pub filesystems: Vec<FsInfo>,
    /// Network interfaces keyed by name
    pub interfaces: BTreeMap<String, NetInterface>,
    /// When the harvest finished
    pub collected_at: DateTime<Utc>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            uptime: Duration::ZERO,
            loads: Loads::default(),
            cpu: CpuInfo::default(),
            memory: MemInfo::default(),
            filesystems: Vec::new(),
            interfaces: BTreeMap::new(),
            collected_at: Utc::now(),
        }
    }
}

/// Load average values from `/proc/loadavg`
///
/// Values are kept exactly as the kernel printed them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Loads {
    /// 1-minute load average
    pub load1: String,
    /// 5-minute load average
    pub load5: String,
    /// 15-minute load average
    pub load15: String,
    /// Number of currently runnable scheduling entities
    pub running_procs: String,
    /// Total number of scheduling entities
    pub total_procs: String,
}

/// Memory usage in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MemInfo {
    /// Total physical memory
    pub total: u64,
    /// Completely unused memory
    pub free: u64,
    /// Block device buffers
    pub buffers: u64,
    /// Page cache
    pub cached: u64,
    /// Total swap space
    pub swap_total: u64,
    /// Unused swap space
    pub swap_free: u64,
}

impl MemInfo {
    /// Memory in use by processes: total minus free, buffers and cache.
    ///
    /// Saturates at zero when the kernel reports inconsistent values.
    #[must_use]
    pub const fn used(&self) -> u64 {
        self.total
            .saturating_sub(self.free)
            .saturating_sub(self.buffers)
            .saturating_sub(self.cached)
    }

    /// Swap in use, saturating at zero
    #[must_use]
    pub const fn swap_used(&self) -> u64 {
        self.swap_total.saturating_sub(self.swap_free)
    }
}

/// Raw CPU counters from the aggregate `cpu` line of `/proc/stat`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuRaw {
    /// Time spent in user mode
    pub user: u64,
    /// Time spent in user mode with low priority
    pub nice: u64,
    /// Time spent in system mode
    pub system: u64,
    /// Time spent in the idle task
    pub idle: u64,
    /// Time waiting for I/O to complete
    pub iowait: u64,
    /// Time servicing hardware interrupts
    pub irq: u64,
    /// Time servicing softirqs
    pub softirq: u64,
    /// Time stolen by the hypervisor
    pub steal: u64,
    /// Time spent running guest virtual CPUs
    pub guest: u64,
    /// Sum of the nine counters above
    pub total: u64,
}

impl CpuRaw {
    /// Builds raw counters from the nine positional values, computing the total
    #[must_use]
    pub fn from_counters(counters: [u64; 9]) -> Self {
        let [user, nice, system, idle, iowait, irq, softirq, steal, guest] = counters;
        Self {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest,
            total: counters.iter().fold(0u64, |acc, v| acc.saturating_add(*v)),
        }
    }

    fn counters(&self) -> [u64; 9] {
        [
            self.user,
            self.nice,
            self.system,
            self.idle,
            self.iowait,
            self.irq,
            self.softirq,
            self.steal,
            self.guest,
        ]
    }

    /// Expresses each counter as a percentage of the total.
    ///
    /// Returns all zeros when every counter is zero. The shares are taken
    /// against the exact sum, so they stay within 100% even when `total`
    /// has saturated.
    #[must_use]
    pub fn percentages(&self) -> CpuInfo {
        let total: u128 = self.counters().iter().map(|&v| u128::from(v)).sum();
        if total == 0 {
            return CpuInfo::default();
        }
        let total = total as f64;
        let pct = |v: u64| v as f64 / total * 100.0;
        CpuInfo {
            user: pct(self.user),
            nice: pct(self.nice),
            system: pct(self.system),
            idle: pct(self.idle),
            iowait: pct(self.iowait),
            irq: pct(self.irq),
            softirq: pct(self.softirq),
            steal: pct(self.steal),
            guest: pct(self.guest),
        }
    }
}

/// CPU time shares since boot, as percentages (0.0–100.0)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CpuInfo {
    /// User mode
    pub user: f64,
    /// Niced user mode
    pub nice: f64,
    /// System mode
    pub system: f64,
    /// Idle
    pub idle: f64,
    /// I/O wait
    pub iowait: f64,
    /// Hardware interrupts
    pub irq: f64,
    /// Software interrupts
    pub softirq: f64,
    /// Hypervisor steal
    pub steal: f64,
    /// Guest virtual CPUs
    pub guest: f64,
}

impl CpuInfo {
    /// Sum of all nine shares
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.user
            + self.nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
            + self.guest
    }
}

/// Disk usage for one mounted filesystem, in bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FsInfo {
    /// Mount point path
    pub mount_point: String,
    /// Filesystem size
    pub total: u64,
    /// Space in use
    pub used: u64,
    /// Space available
    pub free: u64,
}

/// Addresses assigned to one interface
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NetIpAddr {
    /// Last IPv4 address seen (CIDR notation)
    pub ipv4: String,
    /// Last IPv6 address seen (CIDR notation)
    pub ipv6: String,
}

/// Cumulative traffic counters for one interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct NetDevInfo {
    /// Received bytes
    pub rx: u64,
    /// Transmitted bytes
    pub tx: u64,
}

/// Addresses and traffic counters of one interface
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NetInterface {
    /// Assigned addresses
    pub addr: NetIpAddr,
    /// Traffic counters (zero if the interface has no counter line)
    pub dev: NetDevInfo,
}

/// Merges address and counter tables into one interface map.
///
/// The address table drives iteration: every addressed interface appears,
/// and interfaces known only to the counter table are dropped.
#[must_use]
pub fn merge_net_interfaces(
    addrs: &HashMap<String, NetIpAddr>,
    devs: &HashMap<String, NetDevInfo>,
) -> BTreeMap<String, NetInterface> {
    addrs
        .iter()
        .map(|(name, addr)| {
            let dev = devs.get(name).copied().unwrap_or_default();
            (
                name.clone(),
                NetInterface {
                    addr: addr.clone(),
                    dev,
                },
            )
        })
        .collect()
}
