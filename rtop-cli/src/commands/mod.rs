//! Command handlers for the CLI.

mod monitor;

pub use monitor::cmd_monitor;
