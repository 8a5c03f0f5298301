//! Shared helpers for loading configuration and setting up logging.

use std::path::Path;

use rtop_core::config::expand_path;
use rtop_core::{
    AliasTable, AppSettings, ConfigManager, HostKeyPolicy, TracingConfig, TracingLevel,
    TracingOutput, init_tracing,
};

use crate::cli::Cli;
use crate::error::CliError;

/// Settings and aliases in effect for one run
#[derive(Debug)]
pub struct LoadedConfig {
    /// Path resolver; `None` when the home directory is unknown
    pub manager: Option<ConfigManager>,
    /// Settings from the file, or defaults
    pub settings: AppSettings,
    /// SSH config alias table, possibly empty
    pub aliases: AliasTable,
}

/// Initializes logging from the verbosity flags.
pub fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<(), CliError> {
    let mut config = TracingConfig::new().with_level(TracingLevel::from_verbosity(verbose));
    if let Some(path) = log_file {
        config = config.with_output(TracingOutput::File {
            path: expand_path(path),
        });
    }
    init_tracing(&config).map_err(|e| CliError::Logging(e.to_string()))
}

/// Loads settings and the alias table.
///
/// Configuration problems are logged and replaced by defaults; they never
/// abort the run.
#[must_use]
pub fn load_config(config_path: Option<&Path>) -> LoadedConfig {
    let manager = ConfigManager::new()
        .inspect_err(|e| tracing::warn!(error = %e, "Using built-in defaults"))
        .ok();

    let settings = match (config_path, &manager) {
        (Some(path), _) => {
            let path = expand_path(path);
            if !path.exists() {
                tracing::warn!(path = %path.display(), "Settings file not found");
            }
            ConfigManager::load_settings_from(&path)
        }
        (None, Some(manager)) => manager.load_settings(),
        (None, None) => Ok(AppSettings::default()),
    }
    .unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Ignoring settings file");
        AppSettings::default()
    });

    let aliases = match (&manager, &settings.connection.ssh_config_path) {
        (Some(manager), _) => manager.load_aliases(&settings),
        (None, Some(path)) => AliasTable::load(&expand_path(path)),
        (None, None) => Ok(AliasTable::default()),
    }
    .unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Ignoring SSH config");
        AliasTable::default()
    });

    tracing::debug!(aliases = aliases.len(), "Configuration loaded");
    LoadedConfig {
        manager,
        settings,
        aliases,
    }
}

/// Applies command-line flags on top of file settings
pub fn apply_overrides(settings: &mut AppSettings, cli: &Cli) {
    if let Some(interval) = cli.interval {
        settings.monitoring.interval_secs = interval;
    }
    if let Some(workers) = cli.workers {
        settings.monitoring.workers = Some(workers);
    }
    if let Some(timeout) = cli.probe_timeout {
        settings.monitoring.probe_timeout_secs = timeout;
    }
    if cli.strict_host_key_checking {
        settings.connection.host_key_policy = HostKeyPolicy::KnownHosts;
    }
}
