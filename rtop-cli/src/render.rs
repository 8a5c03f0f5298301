//! Plain-text rendering of a snapshot.

use std::fmt::Write as _;
use std::time::Duration;

use rtop_core::Snapshot;

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;

/// Formats a byte count with a binary unit
#[must_use]
pub fn fmt_bytes(val: u64) -> String {
    if val < KIB {
        format!("{val} bytes")
    } else if val < MIB {
        format!("{:6.2} KiB", val as f64 / KIB as f64)
    } else if val < GIB {
        format!("{:6.2} MiB", val as f64 / MIB as f64)
    } else {
        format!("{:6.2} GiB", val as f64 / GIB as f64)
    }
}

/// Formats an uptime as `3d 4h 5m 6s`, dropping leading zero units
#[must_use]
pub fn fmt_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let (days, hours) = (total / 86_400, total % 86_400 / 3600);
    let (mins, secs) = (total % 3600 / 60, total % 60);

    let clock = if hours > 0 {
        format!("{hours}h {mins}m {secs}s")
    } else if mins > 0 {
        format!("{mins}m {secs}s")
    } else {
        format!("{secs}s")
    };

    if days > 0 { format!("{days}d {clock}") } else { clock }
}

/// Renders every panel of a snapshot
#[must_use]
pub fn render_snapshot(snap: &Snapshot) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_panels(&mut out, snap);
    out
}

fn write_panels(out: &mut String, snap: &Snapshot) -> std::fmt::Result {
    let cpu = &snap.cpu;
    let mem = &snap.memory;

    writeln!(out, "{} up {}", snap.hostname, fmt_uptime(snap.uptime))?;
    writeln!(out)?;
    writeln!(out, "Load:")?;
    writeln!(out, "    {} {} {}", snap.loads.load1, snap.loads.load5, snap.loads.load15)?;
    writeln!(out)?;
    writeln!(out, "CPU:")?;
    writeln!(
        out,
        "    {:.2} user, {:.2} sys, {:.2} nice, {:.2} idle, {:.2} iowait, \
         {:.2} hardirq, {:.2} softirq, {:.2} steal, {:.2} guest",
        cpu.user,
        cpu.system,
        cpu.nice,
        cpu.idle,
        cpu.iowait,
        cpu.irq,
        cpu.softirq,
        cpu.steal,
        cpu.guest,
    )?;
    writeln!(out)?;
    writeln!(out, "Processes:")?;
    writeln!(
        out,
        "    {} running of {} total",
        snap.loads.running_procs, snap.loads.total_procs
    )?;
    writeln!(out)?;
    writeln!(out, "Memory:")?;
    writeln!(out, "    total   = {}", fmt_bytes(mem.total))?;
    writeln!(out, "    free    = {}", fmt_bytes(mem.free))?;
    writeln!(out, "    used    = {}", fmt_bytes(mem.used()))?;
    writeln!(out, "    buffers = {}", fmt_bytes(mem.buffers))?;
    writeln!(out, "    cached  = {}", fmt_bytes(mem.cached))?;
    writeln!(
        out,
        "    swap    = {} free of {}",
        fmt_bytes(mem.swap_free),
        fmt_bytes(mem.swap_total)
    )?;
    writeln!(out)?;

    if !snap.filesystems.is_empty() {
        writeln!(out, "Filesystems:")?;
        for fs in &snap.filesystems {
            writeln!(
                out,
                "    {:>8}: {} free of {}",
                fs.mount_point,
                fmt_bytes(fs.free),
                fmt_bytes(fs.total)
            )?;
        }
        writeln!(out)?;
    }

    if !snap.interfaces.is_empty() {
        writeln!(out, "Network Interfaces:")?;
        // BTreeMap iteration is already sorted by name
        for (name, iface) in &snap.interfaces {
            write!(out, "    {name} - {}", iface.addr.ipv4)?;
            if iface.addr.ipv6.is_empty() {
                writeln!(out)?;
            } else {
                writeln!(out, ", {}", iface.addr.ipv6)?;
            }
            writeln!(
                out,
                "      rx = {}, tx = {}",
                fmt_bytes(iface.dev.rx),
                fmt_bytes(iface.dev.tx)
            )?;
            writeln!(out)?;
        }
    }

    Ok(())
}

/// Renders the live view: the last good snapshot, a status line and the
/// latest harvest error, if any
#[must_use]
pub fn render_dashboard(snap: &Snapshot, target: &str, error: Option<&str>) -> String {
    let mut out = render_snapshot(snap);
    let collected = snap
        .collected_at
        .with_timezone(&chrono::Local)
        .format("%H:%M:%S");
    let _ = writeln!(out, "[{target}] updated {collected} - Ctrl-C to quit");
    if let Some(error) = error {
        let _ = writeln!(out, "Last refresh failed: {error}");
    }
    out
}
