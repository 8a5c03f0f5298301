//! Concurrent metric harvesting
//!
//! [`Harvester::harvest`] fans the [`PROBES`] table out over one
//! [`CommandExecutor`], bounded by a semaphore, and folds the parsed
//! fragments into a [`Snapshot`].

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::metrics::{Snapshot, merge_net_interfaces};
use super::probes::{PROBES, ProbeOutput, ProbeSpec};
use super::settings::MonitoringSettings;
use crate::error::{ExecutionError, MonitoringError};
use crate::ssh::CommandExecutor;

/// Result of one harvest: every fragment that could be collected, plus the
/// first probe failure if there was one
#[derive(Debug)]
pub struct Harvest {
    /// Snapshot with all successfully probed fields populated
    pub snapshot: Snapshot,
    /// First probe failure observed, if any
    pub error: Option<MonitoringError>,
}

impl Harvest {
    /// Returns `true` if every probe succeeded
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Converts into a `Result`, discarding the partial snapshot on failure.
    ///
    /// # Errors
    ///
    /// Returns the first probe failure of the harvest.
    pub fn into_result(self) -> Result<Snapshot, MonitoringError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.snapshot),
        }
    }
}

/// Runs every probe against a remote host and merges the results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Harvester {
    worker_limit: usize,
    probe_timeout: Duration,
}

impl Harvester {
    /// Creates a harvester running at most `worker_limit` probes at once.
    ///
    /// A limit of zero is raised to one.
    #[must_use]
    pub fn new(worker_limit: usize, probe_timeout: Duration) -> Self {
        Self {
            worker_limit: worker_limit.max(1),
            probe_timeout,
        }
    }

    /// Creates a harvester from monitoring settings
    #[must_use]
    pub fn from_settings(settings: &MonitoringSettings) -> Self {
        Self::new(settings.effective_workers(), settings.probe_timeout())
    }

    /// Maximum number of probes in flight
    #[must_use]
    pub const fn worker_limit(&self) -> usize {
        self.worker_limit
    }

    /// Deadline applied to each probe command
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Runs all probes and waits for them to finish.
    ///
    /// Once a probe fails, probes still waiting for a worker slot are
    /// skipped; probes already running complete normally.
    pub async fn harvest<E>(&self, executor: &Arc<E>) -> Harvest
    where
        E: CommandExecutor + ?Sized + 'static,
    {
        let started = Instant::now();
        let permits = Arc::new(Semaphore::new(self.worker_limit));
        let failed = Arc::new(AtomicBool::new(false));
        let mut tasks = JoinSet::new();
        let mut probe_names = HashMap::new();

        for spec in &PROBES {
            let executor = Arc::clone(executor);
            let permits = Arc::clone(&permits);
            let failed = Arc::clone(&failed);
            let timeout = self.probe_timeout;

            let handle = tasks.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return None;
                };
                if failed.load(Ordering::Acquire) {
                    tracing::trace!(probe = spec.kind.name(), "Skipping probe after earlier failure");
                    return None;
                }
                let result = run_probe(spec, executor.as_ref(), timeout).await;
                if result.is_err() {
                    failed.store(true, Ordering::Release);
                }
                Some(result)
            });
            probe_names.insert(handle.id(), spec.kind.name());
        }

        let mut snapshot = Snapshot::default();
        let mut addrs = HashMap::new();
        let mut devs = HashMap::new();
        let mut error: Option<MonitoringError> = None;

        while let Some(joined) = tasks.join_next_with_id().await {
            let outcome = match joined {
                Ok((_, Some(outcome))) => outcome,
                Ok((_, None)) => continue,
                Err(join_err) => {
                    failed.store(true, Ordering::Release);
                    let probe = probe_names.get(&join_err.id()).copied().unwrap_or("unknown");
                    Err(MonitoringError::Task {
                        probe,
                        reason: join_err.to_string(),
                    })
                }
            };

            match outcome {
                Ok(ProbeOutput::Uptime(uptime)) => snapshot.uptime = uptime,
                Ok(ProbeOutput::Hostname(hostname)) => snapshot.hostname = hostname,
                Ok(ProbeOutput::Load(loads)) => snapshot.loads = loads,
                Ok(ProbeOutput::Memory(memory)) => snapshot.memory = memory,
                Ok(ProbeOutput::Filesystems(filesystems)) => snapshot.filesystems = filesystems,
                Ok(ProbeOutput::IpAddrs(table)) => addrs = table,
                Ok(ProbeOutput::NetDevices(table)) => devs = table,
                Ok(ProbeOutput::Cpu(cpu)) => snapshot.cpu = cpu,
                Err(err) => {
                    tracing::warn!(probe = err.probe(), error = %err, "Probe failed");
                    if error.is_none() {
                        error = Some(err);
                    }
                }
            }
        }

        snapshot.interfaces = merge_net_interfaces(&addrs, &devs);
        snapshot.collected_at = Utc::now();

        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            workers = self.worker_limit,
            complete = error.is_none(),
            "Harvest finished"
        );

        Harvest { snapshot, error }
    }
}

impl Default for Harvester {
    fn default() -> Self {
        Self::from_settings(&MonitoringSettings::default())
    }
}

/// Runs one probe: primary command, fallback on execution failure, then parse
async fn run_probe<E>(
    spec: &ProbeSpec,
    executor: &E,
    timeout: Duration,
) -> Result<ProbeOutput, MonitoringError>
where
    E: CommandExecutor + ?Sized,
{
    let probe = spec.kind.name();

    let stdout = match execute_with_deadline(executor, spec.command, timeout).await {
        Ok(stdout) => stdout,
        Err(err) => match spec.fallback {
            Some(fallback) => {
                tracing::debug!(probe, command = spec.command, error = %err, "Trying fallback command");
                execute_with_deadline(executor, fallback, timeout)
                    .await
                    .map_err(|source| MonitoringError::Execution { probe, source })?
            }
            None => return Err(MonitoringError::Execution { probe, source: err }),
        },
    };

    (spec.parse)(&stdout).map_err(|source| MonitoringError::Format { probe, source })
}

async fn execute_with_deadline<E>(
    executor: &E,
    command: &str,
    timeout: Duration,
) -> Result<String, ExecutionError>
where
    E: CommandExecutor + ?Sized,
{
    let started = Instant::now();
    let result = match tokio::time::timeout(timeout, executor.execute(command)).await {
        Ok(result) => result,
        Err(_) => Err(ExecutionError::TimedOut {
            command: command.to_string(),
            timeout_secs: timeout.as_secs(),
        }),
    };
    tracing::trace!(
        command,
        elapsed_ms = started.elapsed().as_millis() as u64,
        ok = result.is_ok(),
        "Command finished"
    );
    result
}
