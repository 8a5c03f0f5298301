//! Configuration management for rtop
//!
//! This module provides the `ConfigManager` for locating and loading the
//! TOML settings file, and the `AliasTable` read from `~/.ssh/config`.

pub mod host_alias;
mod manager;
pub mod settings;

pub use host_alias::{AliasTable, HostAliasSection, ResolvedHost, glob_matches};
pub use manager::{ConfigManager, expand_path};
pub use settings::{AppSettings, ConnectionSettings, HostKeyPolicy};
