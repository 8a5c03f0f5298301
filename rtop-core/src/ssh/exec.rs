//! Remote command execution
//!
//! [`CommandExecutor`] is the seam between the harvester and the transport:
//! the SSH transport implements it by opening a fresh session channel per
//! call, and tests implement it with canned outputs.

use async_trait::async_trait;
use russh::ChannelMsg;
use russh::client::{Handle, Handler};

use crate::error::ExecutionError;

/// Runs one command on a remote host and returns its standard output
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Executes `command` to completion.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError`] on transport failure, non-zero exit
    /// status or termination by signal.
    async fn execute(&self, command: &str) -> Result<String, ExecutionError>;
}

/// Runs `command` on a new session channel of `handle`.
///
/// Only standard output is captured; extended data (stderr) is discarded.
///
/// # Errors
///
/// Returns [`ExecutionError`] when the channel cannot be opened, the
/// command exits unsuccessfully or the output is not UTF-8.
pub async fn run_on_channel<H>(handle: &Handle<H>, command: &str) -> Result<String, ExecutionError>
where
    H: Handler,
{
    let transport_err = |e: russh::Error| ExecutionError::Transport {
        command: command.to_string(),
        reason: e.to_string(),
    };

    let mut channel = handle.channel_open_session().await.map_err(transport_err)?;
    channel.exec(true, command).await.map_err(transport_err)?;

    let mut stdout = Vec::new();
    let mut exit_status = None;

    while let Some(msg) = channel.wait().await {
        match msg {
            ChannelMsg::Data { ref data } => stdout.extend_from_slice(data),
            ChannelMsg::ExitStatus { exit_status: status } => exit_status = Some(status),
            ChannelMsg::ExitSignal { signal_name, .. } => {
                return Err(ExecutionError::Signal {
                    command: command.to_string(),
                    signal: format!("{signal_name:?}"),
                });
            }
            _ => {}
        }
    }

    match exit_status {
        Some(0) => {}
        Some(status) => {
            return Err(ExecutionError::ExitStatus {
                command: command.to_string(),
                status,
            });
        }
        None => {
            return Err(ExecutionError::Transport {
                command: command.to_string(),
                reason: "channel closed without an exit status".to_string(),
            });
        }
    }

    String::from_utf8(stdout).map_err(|_| ExecutionError::InvalidUtf8 {
        command: command.to_string(),
    })
}
