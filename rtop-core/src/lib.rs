//! rtop Core Library
//!
//! This crate provides the core of rtop, an agentless remote system monitor:
//! an authenticated SSH transport, host alias resolution, and a concurrent
//! harvester that turns the output of a handful of shell commands into a
//! typed snapshot.
//!
//! # Crate Structure
//!
//! - [`config`] - Settings file and SSH config alias table
//! - [`ssh`] - Transport, credential chain, prompts and command execution
//! - [`monitoring`] - Probes, parsers, harvester and periodic collector
//! - [`target`] - `[user@]host[:port]` parsing and resolution
//! - [`error`] - Error types for every stage
//! - [`tracing`] - Logging setup

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod monitoring;
pub mod ssh;
pub mod target;
pub mod tracing;

pub use config::{AliasTable, AppSettings, ConfigManager, HostKeyPolicy, ResolvedHost};
pub use error::{
    AuthError, AuthResult, ConfigError, ConfigResult, ExecutionError, FormatError,
    MonitoringError, RtopError,
};
pub use monitoring::{
    CollectorHandle, Harvest, Harvester, MetricsEvent, MonitoringSettings, Snapshot,
    start_collector,
};
pub use ssh::{CommandExecutor, ConnectParams, SecretPrompt, SshTransport, TerminalPrompt};
pub use target::{ResolveOptions, ResolvedTarget, Target};
pub use self::tracing::{TracingConfig, TracingError, TracingLevel, TracingOutput, init_tracing};
