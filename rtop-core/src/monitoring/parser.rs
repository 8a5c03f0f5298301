//! Parsers for remote host metrics output
//!
//! Each parser takes the raw stdout of one diagnostic command and turns it
//! into one typed metric fragment. They are pure and total: malformed lines
//! are skipped, and a [`FormatError`] is returned only when the expected
//! structure is missing altogether.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::FormatError;

use super::metrics::{CpuRaw, FsInfo, Loads, MemInfo, NetDevInfo, NetIpAddr};

/// Number of whitespace-separated fields on a `/proc/net/dev` interface line
const NET_DEV_FIELDS: usize = 17;

/// Stateless parser for remote metrics output
pub struct MetricsParser;

impl MetricsParser {
    /// Parses `/proc/uptime`.
    ///
    /// Format: `350735.47 234388.90` (seconds up, seconds idle)
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if the first field is missing or not a
    /// non-negative number.
    pub fn parse_uptime(output: &str) -> Result<Duration, FormatError> {
        let first = output
            .split_whitespace()
            .next()
            .ok_or_else(|| FormatError::new("uptime", "empty output"))?;

        let secs: f64 = first
            .parse()
            .map_err(|_| FormatError::new("uptime", format!("not a number: {first}")))?;

        Duration::try_from_secs_f64(secs)
            .map_err(|_| FormatError::new("uptime", format!("out of range: {first}")))
    }

    /// Parses hostname output by trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if the output is blank.
    pub fn parse_hostname(output: &str) -> Result<String, FormatError> {
        let name = output.trim();
        if name.is_empty() {
            return Err(FormatError::new("hostname", "empty output"));
        }
        Ok(name.to_string())
    }

    /// Parses `/proc/loadavg` for load averages and process counts.
    ///
    /// Format: `0.52 0.34 0.28 2/1234 56789`
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if fewer than four fields are present.
    pub fn parse_loadavg(output: &str) -> Result<Loads, FormatError> {
        let line = output.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FormatError::new(
                "loadavg",
                format!("expected at least 4 fields, got {}", parts.len()),
            ));
        }

        let (running_procs, total_procs) = match parts[3].split_once('/') {
            Some((running, total)) => (running.to_string(), total.to_string()),
            None => (String::new(), String::new()),
        };

        Ok(Loads {
            load1: parts[0].to_string(),
            load5: parts[1].to_string(),
            load15: parts[2].to_string(),
            running_procs,
            total_procs,
        })
    }

    /// Parses `/proc/meminfo` into byte counts.
    ///
    /// Lines have the form `MemTotal:  16384000 kB`. Values are in kibibytes
    /// and are converted to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if none of the recognized keys are present.
    pub fn parse_meminfo(output: &str) -> Result<MemInfo, FormatError> {
        let mut mem = MemInfo::default();
        let mut recognized = false;

        for line in output.lines() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() != 3 {
                continue;
            }
            let slot = match parts[0] {
                "MemTotal:" => &mut mem.total,
                "MemFree:" => &mut mem.free,
                "Buffers:" => &mut mem.buffers,
                "Cached:" => &mut mem.cached,
                "SwapTotal:" => &mut mem.swap_total,
                "SwapFree:" => &mut mem.swap_free,
                _ => continue,
            };
            let Ok(kib) = parts[1].parse::<u64>() else {
                tracing::trace!(line, "Skipping non-numeric meminfo line");
                continue;
            };
            *slot = kib.saturating_mul(1024);
            recognized = true;
        }

        if !recognized {
            return Err(FormatError::new("meminfo", "no known keys found"));
        }
        Ok(mem)
    }

    /// Parses `df -B1` (or plain `df`) output into filesystem summaries.
    ///
    /// Format:
    /// ```text
    /// Filesystem     1B-blocks        Used   Available Use% Mounted on
    /// /dev/sda1   105089261568 52544630784 47159013376  53% /
    /// /dev/mapper/vg0-very-long-volume-name
    ///             105089261568 52544630784 47159013376  53% /srv
    /// ```
    ///
    /// Sizes are scaled to bytes using the header's block column
    /// (`1B-blocks`, `1K-blocks`, `1024-blocks`, ...); without a header the
    /// values are taken as bytes.
    ///
    /// A line holding only a device path means `df` wrapped the row; the
    /// following line then has its columns shifted left by one.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if the output is blank.
    pub fn parse_df(output: &str) -> Result<Vec<FsInfo>, FormatError> {
        if output.trim().is_empty() {
            return Err(FormatError::new("df", "empty output"));
        }

        let mut filesystems = Vec::new();
        let mut shift = 0;
        let mut block_size = 1u64;

        for line in output.lines() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }
            if parts[0] == "Filesystem" {
                if let Some(size) = parts.get(1).and_then(|c| df_block_size(c)) {
                    block_size = size;
                }
                shift = 0;
                continue;
            }
            if parts.len() == 1 {
                shift = usize::from(parts[0].contains(['/', ':']));
                continue;
            }

            let i = std::mem::take(&mut shift);
            // total, used, free, capacity, mount point
            if parts.len() < 6 - i {
                continue;
            }
            let column = |n: usize| {
                parts[n - i]
                    .parse::<u64>()
                    .map(|v| v.saturating_mul(block_size))
            };
            let (Ok(total), Ok(used), Ok(free)) = (column(1), column(2), column(3)) else {
                continue;
            };

            filesystems.push(FsInfo {
                mount_point: parts[5 - i..].join(" "),
                total,
                used,
                free,
            });
        }

        Ok(filesystems)
    }

    /// Parses `ip -o addr` output into per-interface addresses.
    ///
    /// Format: `2: eth0    inet 10.0.0.2/24 brd 10.0.0.255 scope global eth0`
    ///
    /// When an interface has several addresses of one family, the last one
    /// wins.
    #[must_use]
    pub fn parse_ip_addrs(output: &str) -> HashMap<String, NetIpAddr> {
        let mut addrs: HashMap<String, NetIpAddr> = HashMap::new();

        for line in output.lines() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 {
                continue;
            }
            let entry = match parts[2] {
                "inet" | "inet6" => addrs.entry(parts[1].to_string()).or_default(),
                _ => continue,
            };
            if parts[2] == "inet" {
                entry.ipv4 = parts[3].to_string();
            } else {
                entry.ipv6 = parts[3].to_string();
            }
        }

        addrs
    }

    /// Parses `/proc/net/dev` into per-interface traffic counters.
    ///
    /// Only lines with exactly 17 fields are considered; header lines and
    /// lines where the colon is glued to the counters are ignored.
    #[must_use]
    pub fn parse_net_dev(output: &str) -> HashMap<String, NetDevInfo> {
        let mut devs = HashMap::new();

        for line in output.lines() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() != NET_DEV_FIELDS {
                continue;
            }
            let name = parts[0].trim_end_matches(':');
            let (Ok(rx), Ok(tx)) = (parts[1].parse::<u64>(), parts[9].parse::<u64>()) else {
                continue;
            };
            devs.insert(name.to_string(), NetDevInfo { rx, tx });
        }

        devs
    }

    /// Parses the aggregate `cpu` line of `/proc/stat` into raw counters.
    ///
    /// Format: `cpu  user nice system idle iowait irq softirq steal guest ...`
    ///
    /// Counters that are missing or unparsable read as zero; anything past
    /// the ninth counter is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if there is no aggregate `cpu` line.
    pub fn parse_proc_stat(output: &str) -> Result<CpuRaw, FormatError> {
        let fields: Vec<&str> = output
            .lines()
            .map(|l| l.split_whitespace().collect::<Vec<_>>())
            .find(|f| f.first() == Some(&"cpu"))
            .ok_or_else(|| FormatError::new("/proc/stat", "no aggregate cpu line"))?;

        let mut counters = [0u64; 9];
        for (slot, value) in counters.iter_mut().zip(fields.iter().skip(1)) {
            *slot = value.parse().unwrap_or(0);
        }

        Ok(CpuRaw::from_counters(counters))
    }
}

/// Block size in bytes named by a `df` header column such as `1K-blocks`.
fn df_block_size(column: &str) -> Option<u64> {
    let size = column.strip_suffix("-blocks")?;
    let (digits, multiplier) = match size.as_bytes().last()? {
        b'B' => (&size[..size.len() - 1], 1),
        b'K' => (&size[..size.len() - 1], 1 << 10),
        b'M' => (&size[..size.len() - 1], 1 << 20),
        b'G' => (&size[..size.len() - 1], 1 << 30),
        _ => (size, 1),
    };
    let count: u64 = digits.parse().ok()?;
    (count > 0).then_some(count.saturating_mul(multiplier))
}
