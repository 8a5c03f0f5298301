//! Locating and loading configuration files

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

use super::host_alias::AliasTable;
use super::settings::AppSettings;

/// Settings file name inside the configuration directory
const SETTINGS_FILE: &str = "config.toml";

/// Resolves configuration paths and loads settings and alias tables
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
    home_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a manager rooted at the user's standard directories
    /// (`~/.config/rtop` on Linux).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHomeDir`] if the home directory is unknown.
    pub fn new() -> ConfigResult<Self> {
        let home_dir = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| home_dir.join(".config"))
            .join("rtop");
        Ok(Self {
            config_dir,
            home_dir,
        })
    }

    /// Creates a manager with explicit directories
    #[must_use]
    pub fn with_dirs(config_dir: impl Into<PathBuf>, home_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            home_dir: home_dir.into(),
        }
    }

    /// Directory holding `config.toml`
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// User's home directory
    #[must_use]
    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    /// Default settings file path
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    /// Default alias file path (`~/.ssh/config`)
    #[must_use]
    pub fn ssh_config_path(&self) -> PathBuf {
        self.home_dir.join(".ssh").join("config")
    }

    /// Default key file path (`~/.ssh/id_rsa`)
    #[must_use]
    pub fn default_key_path(&self) -> PathBuf {
        self.home_dir.join(".ssh").join("id_rsa")
    }

    /// Default known hosts path (`~/.ssh/known_hosts`)
    #[must_use]
    pub fn known_hosts_path(&self) -> PathBuf {
        self.home_dir.join(".ssh").join("known_hosts")
    }

    /// Loads settings from the default settings file
    ///
    /// # Errors
    ///
    /// See [`Self::load_settings_from`].
    pub fn load_settings(&self) -> ConfigResult<AppSettings> {
        Self::load_settings_from(&self.settings_path())
    }

    /// Loads settings from `path`. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, or
    /// [`ConfigError::Invalid`] if it is not valid settings TOML.
    pub fn load_settings_from(path: &Path) -> ConfigResult<AppSettings> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                return Ok(AppSettings::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        toml::from_str(&content).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Loads the alias table named by `settings`, or `~/.ssh/config`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file exists but cannot be read.
    pub fn load_aliases(&self, settings: &AppSettings) -> ConfigResult<AliasTable> {
        let path = settings
            .connection
            .ssh_config_path
            .as_ref()
            .map_or_else(|| self.ssh_config_path(), |p| expand_path(p));
        AliasTable::load(&path)
    }
}

/// Expands a leading `~` and environment variables in `path`
#[must_use]
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_) => PathBuf::from(shellexpand::tilde(&raw).into_owned()),
    }
}
