//! Authenticated SSH transport
//!
//! One TCP connection and one key exchange per [`SshTransport`]. Every
//! remote command then runs on its own session channel, so probes can share
//! the transport concurrently.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::Disconnect;
use russh::client::{self, Handle};
use russh_keys::key::PublicKey;
use tracing::Instrument;

use crate::config::HostKeyPolicy;
use crate::error::{AuthError, AuthResult, ExecutionError};
use crate::tracing::span_names;

use super::auth::{self, AuthMethod};
use super::exec::{CommandExecutor, run_on_channel};
use super::prompt::SecretPrompt;

/// Default SSH port
pub const DEFAULT_PORT: u16 = 22;

/// Interval between keepalive requests while the transport is idle
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Everything needed to open and authenticate a transport
#[derive(Debug, Clone)]
pub struct ConnectParams {
    /// Host to connect to
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Remote user
    pub user: String,
    /// Private key file to offer, if any
    pub key_path: Option<PathBuf>,
    /// SSH agent socket, if one is advertised
    pub agent_socket: Option<PathBuf>,
    /// Whether password prompting is possible
    pub allow_password: bool,
    /// Host key verification policy
    pub host_key_policy: HostKeyPolicy,
    /// Known hosts file; `~/.ssh/known_hosts` when unset
    pub known_hosts_path: Option<PathBuf>,
    /// Deadline for TCP connect plus key exchange
    pub connect_timeout: Duration,
}

/// Client-side protocol callbacks
#[derive(Debug)]
pub struct ClientHandler {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
    known_hosts_path: Option<PathBuf>,
}

impl ClientHandler {
    fn new(params: &ConnectParams) -> Self {
        Self {
            host: params.host.clone(),
            port: params.port,
            policy: params.host_key_policy,
            known_hosts_path: params.known_hosts_path.clone(),
        }
    }
}

#[async_trait]
impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(&mut self, server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        let fingerprint = server_public_key.fingerprint();
        match self.policy {
            HostKeyPolicy::AcceptAny => {
                tracing::debug!(host = %self.host, %fingerprint, "Accepting host key");
                Ok(true)
            }
            HostKeyPolicy::KnownHosts => {
                let checked = match &self.known_hosts_path {
                    Some(path) => russh_keys::check_known_hosts_path(
                        &self.host,
                        self.port,
                        server_public_key,
                        path,
                    ),
                    None => russh_keys::check_known_hosts(&self.host, self.port, server_public_key),
                };
                match checked {
                    Ok(true) => Ok(true),
                    Ok(false) => {
                        tracing::warn!(host = %self.host, %fingerprint, "Host key not in known_hosts");
                        Ok(false)
                    }
                    Err(e) => {
                        tracing::warn!(host = %self.host, %fingerprint, error = %e, "Host key check failed");
                        Ok(false)
                    }
                }
            }
        }
    }
}

/// An authenticated connection to one remote host
pub struct SshTransport {
    handle: Handle<ClientHandler>,
    host: String,
    port: u16,
    method: AuthMethod,
}

impl std::fmt::Debug for SshTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshTransport")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

impl SshTransport {
    /// Connects to `params.host` and authenticates.
    ///
    /// Credential methods are tried in order (agent, key file, password) on
    /// the single session; the first one the server accepts wins.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NoMethods`] if no method can be offered,
    /// [`AuthError::Handshake`] if the connection or key exchange fails, and
    /// [`AuthError::Rejected`] if every method is refused.
    pub async fn connect(params: &ConnectParams, prompt: &dyn SecretPrompt) -> AuthResult<Self> {
        let span = crate::trace_operation!(
            span_names::CONNECT,
            host = %params.host,
            port = params.port
        );
        Self::connect_inner(params, prompt).instrument(span).await
    }

    async fn connect_inner(params: &ConnectParams, prompt: &dyn SecretPrompt) -> AuthResult<Self> {
        let methods = auth::plan_methods(params);
        if methods.is_empty() {
            return Err(AuthError::NoMethods {
                user: params.user.clone(),
                host: params.host.clone(),
            });
        }

        let handshake_err = |reason: String| AuthError::Handshake {
            host: params.host.clone(),
            port: params.port,
            reason,
        };

        let config = Arc::new(client::Config {
            keepalive_interval: Some(KEEPALIVE_INTERVAL),
            ..Default::default()
        });
        let connecting = client::connect(
            config,
            (params.host.as_str(), params.port),
            ClientHandler::new(params),
        );
        let mut handle = tokio::time::timeout(params.connect_timeout, connecting)
            .await
            .map_err(|_| handshake_err(format!("timed out after {}s", params.connect_timeout.as_secs())))?
            .map_err(|e| handshake_err(e.to_string()))?;
        tracing::debug!("Key exchange complete");

        match auth::authenticate(&mut handle, params, &methods, prompt).await {
            Ok(method) => Ok(Self {
                handle,
                host: params.host.clone(),
                port: params.port,
                method,
            }),
            Err(err) => {
                let _ = handle
                    .disconnect(Disconnect::ByApplication, "authentication failed", "en")
                    .await;
                Err(err)
            }
        }
    }

    /// Remote host name
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Remote port
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Credential method the server accepted
    #[must_use]
    pub const fn method(&self) -> &AuthMethod {
        &self.method
    }

    /// Sends a disconnect message and closes the connection
    pub async fn close(&self) {
        if let Err(e) = self
            .handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
        {
            tracing::debug!(error = %e, host = %self.host, "Disconnect failed");
        }
    }
}

#[async_trait]
impl CommandExecutor for SshTransport {
    async fn execute(&self, command: &str) -> Result<String, ExecutionError> {
        run_on_channel(&self.handle, command).await
    }
}
