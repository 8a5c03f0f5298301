//! CLI error types and exit codes.

use rtop_core::error::{AuthError, RtopError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, connection or harvest failure
    pub const GENERAL_ERROR: i32 = 1;
    /// The user abandoned a passphrase or password prompt
    pub const INTERRUPTED: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command-line target
    #[error("{0}")]
    Target(String),

    /// Connection or authentication failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The first harvest failed
    #[error("Failed to collect statistics: {0}")]
    Monitoring(String),

    /// Logging could not be set up
    #[error("Logging error: {0}")]
    Logging(String),

    /// Async runtime could not be started
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RtopError> for CliError {
    fn from(err: RtopError) -> Self {
        match err {
            RtopError::Auth(e) => Self::Auth(e),
            RtopError::Monitoring(e) => Self::Monitoring(e.to_string()),
            RtopError::Config(e) => Self::Config(e.to_string()),
            e @ RtopError::Target { .. } => Self::Target(e.to_string()),
        }
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: Any failure before or during monitoring
    /// - 2: Prompt abandoned by the user
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Auth(AuthError::PromptInterrupted) => exit_codes::INTERRUPTED,
            Self::Config(_)
            | Self::Target(_)
            | Self::Auth(_)
            | Self::Monitoring(_)
            | Self::Logging(_)
            | Self::Runtime(_)
            | Self::Json(_)
            | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
