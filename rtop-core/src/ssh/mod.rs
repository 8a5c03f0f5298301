//! SSH transport, authentication and remote command execution
//!
//! The wire protocol comes from `russh`; this module layers the credential
//! fallback chain, host key policy and per-command channels on top.

pub mod auth;
mod exec;
pub mod keys;
pub mod prompt;
mod transport;

pub use auth::{AuthMethod, plan_methods};
pub use exec::{CommandExecutor, run_on_channel};
pub use keys::{PemKind, load_key_file};
pub use prompt::{PROMPT_SIGNAL_EXIT_CODE, RawModeGuard, SecretPrompt, TerminalPrompt};
pub use transport::{ClientHandler, ConnectParams, DEFAULT_PORT, SshTransport};
