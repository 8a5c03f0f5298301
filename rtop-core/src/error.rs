//! Error types for rtop
//!
//! Each stage of a monitoring session has its own error enum so callers can
//! decide how fatal a failure is: configuration problems degrade to defaults,
//! authentication problems abort the connection attempt, and execution or
//! format problems only affect the probe that hit them.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading alias tables or settings files
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The user's home directory could not be determined
    #[error("Could not determine home directory")]
    NoHomeDir,

    /// A configuration file exists but could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path of the file that failed to load
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A settings file could not be parsed
    #[error("Invalid settings in {path}: {reason}")]
    Invalid {
        /// Path of the offending file
        path: PathBuf,
        /// Parser message
        reason: String,
    },
}

/// Errors raised while establishing an authenticated transport
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credential method could be offered at all
    #[error("No authentication method available for {user}@{host}")]
    NoMethods {
        /// Remote user
        user: String,
        /// Remote host
        host: String,
    },

    /// TCP connect or SSH handshake failed
    #[error("Failed to connect to {host}:{port}: {reason}")]
    Handshake {
        /// Remote host
        host: String,
        /// Remote port
        port: u16,
        /// Underlying failure
        reason: String,
    },

    /// The server rejected every offered method
    #[error("Authentication failed for {user}@{host} (tried: {tried})")]
    Rejected {
        /// Remote user
        user: String,
        /// Remote host
        host: String,
        /// Comma-separated list of methods that were attempted
        tried: String,
    },

    /// The SSH agent could not be reached or listed no identities
    #[error("SSH agent unavailable: {0}")]
    Agent(String),

    /// A private key file could not be loaded or decrypted
    #[error("Failed to load key {path}: {reason}")]
    Key {
        /// Key file path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// The interactive prompt could not be shown or read
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// The user abandoned the prompt with Ctrl-C, Ctrl-D or Esc
    #[error("Prompt interrupted")]
    PromptInterrupted,
}

/// Errors raised while running a single remote command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The session channel could not be opened or broke mid-command
    #[error("Failed to execute `{command}`: {reason}")]
    Transport {
        /// The literal command string
        command: String,
        /// Underlying transport failure
        reason: String,
    },

    /// The command exited with a non-zero status
    #[error("`{command}` exited with status {status}")]
    ExitStatus {
        /// The literal command string
        command: String,
        /// Remote exit status
        status: u32,
    },

    /// The command was killed by a signal
    #[error("`{command}` terminated by signal {signal}")]
    Signal {
        /// The literal command string
        command: String,
        /// Signal name reported by the server
        signal: String,
    },

    /// The command did not finish within the probe deadline
    #[error("`{command}` timed out after {timeout_secs}s")]
    TimedOut {
        /// The literal command string
        command: String,
        /// Deadline that elapsed
        timeout_secs: u64,
    },

    /// The command produced output that is not valid UTF-8
    #[error("`{command}` produced invalid UTF-8 output")]
    InvalidUtf8 {
        /// The literal command string
        command: String,
    },
}

impl ExecutionError {
    /// Returns the command string this error refers to
    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::Transport { command, .. }
            | Self::ExitStatus { command, .. }
            | Self::Signal { command, .. }
            | Self::TimedOut { command, .. }
            | Self::InvalidUtf8 { command } => command,
        }
    }
}

/// A probe's output was missing its expected structure entirely
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unexpected {what} format: {detail}")]
pub struct FormatError {
    /// Which kind of output was being parsed
    pub what: &'static str,
    /// Short description of what was missing
    pub detail: String,
}

impl FormatError {
    /// Creates a new format error
    #[must_use]
    pub fn new(what: &'static str, detail: impl Into<String>) -> Self {
        Self {
            what,
            detail: detail.into(),
        }
    }
}

/// Failure of one probe during a harvest
#[derive(Debug, Error)]
pub enum MonitoringError {
    /// The probe's command could not be executed
    #[error("{probe} probe: {source}")]
    Execution {
        /// Probe name
        probe: &'static str,
        /// Execution failure
        #[source]
        source: ExecutionError,
    },

    /// The probe's output could not be parsed
    #[error("{probe} probe: {source}")]
    Format {
        /// Probe name
        probe: &'static str,
        /// Format failure
        #[source]
        source: FormatError,
    },

    /// The probe task panicked or was cancelled by the runtime
    #[error("{probe} probe task failed: {reason}")]
    Task {
        /// Probe name
        probe: &'static str,
        /// Join error message
        reason: String,
    },
}

impl MonitoringError {
    /// Returns the name of the probe that failed
    #[must_use]
    pub const fn probe(&self) -> &'static str {
        match self {
            Self::Execution { probe, .. } | Self::Format { probe, .. } | Self::Task { probe, .. } => {
                probe
            }
        }
    }
}

/// Top-level error type for rtop operations
#[derive(Debug, Error)]
pub enum RtopError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Authentication error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Monitoring error
    #[error(transparent)]
    Monitoring(#[from] MonitoringError),

    /// Invalid target address
    #[error("Invalid target '{target}': {reason}")]
    Target {
        /// The target string as given
        target: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
