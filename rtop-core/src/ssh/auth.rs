//! Credential fallback chain
//!
//! Methods are tried in a fixed order on one session: agent, key file,
//! password. The first method the server accepts wins; a method that fails
//! to even produce a credential is logged and skipped.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use russh::client::{Handle, Handler};
use russh_keys::agent::client::AgentClient;
use secrecy::ExposeSecret;
use tracing::Instrument;

use crate::error::{AuthError, AuthResult};
use crate::tracing::span_names;

use super::keys::load_key_file;
use super::prompt::SecretPrompt;
use super::transport::ConnectParams;

/// One way of proving identity to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// Identities held by the agent listening on this socket
    Agent(PathBuf),
    /// A private key file
    KeyFile(PathBuf),
    /// A password read from the terminal
    Password,
}

impl AuthMethod {
    /// Short name used in logs and error messages
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Agent(_) => "agent",
            Self::KeyFile(_) => "publickey",
            Self::Password => "password",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lists the methods available for `params`, in the order they are tried
#[must_use]
pub fn plan_methods(params: &ConnectParams) -> Vec<AuthMethod> {
    let mut methods = Vec::with_capacity(3);
    if let Some(socket) = &params.agent_socket {
        methods.push(AuthMethod::Agent(socket.clone()));
    }
    if let Some(key) = &params.key_path {
        methods.push(AuthMethod::KeyFile(key.clone()));
    }
    if params.allow_password {
        methods.push(AuthMethod::Password);
    }
    methods
}

/// Tries `methods` in order and returns the one the server accepted.
///
/// # Errors
///
/// Returns [`AuthError::Rejected`] when every method fails and
/// [`AuthError::PromptInterrupted`] if the user abandons a prompt.
pub async fn authenticate<H>(
    handle: &mut Handle<H>,
    params: &ConnectParams,
    methods: &[AuthMethod],
    prompt: &dyn SecretPrompt,
) -> AuthResult<AuthMethod>
where
    H: Handler,
{
    for method in methods {
        let span = crate::trace_operation_debug!(span_names::AUTH_METHOD, method = method.name());
        let outcome = try_method(handle, params, method, prompt)
            .instrument(span)
            .await;

        match outcome {
            Ok(true) => {
                tracing::info!(method = method.name(), host = %params.host, "Authenticated");
                return Ok(method.clone());
            }
            Ok(false) => {
                tracing::debug!(method = method.name(), "Server rejected credentials");
            }
            Err(AuthError::PromptInterrupted) => return Err(AuthError::PromptInterrupted),
            Err(err) => {
                tracing::warn!(method = method.name(), error = %err, "Authentication method unavailable");
            }
        }
    }

    Err(AuthError::Rejected {
        user: params.user.clone(),
        host: params.host.clone(),
        tried: methods
            .iter()
            .map(AuthMethod::name)
            .collect::<Vec<_>>()
            .join(", "),
    })
}

async fn try_method<H>(
    handle: &mut Handle<H>,
    params: &ConnectParams,
    method: &AuthMethod,
    prompt: &dyn SecretPrompt,
) -> AuthResult<bool>
where
    H: Handler,
{
    let transport_err = |e: russh::Error| AuthError::Handshake {
        host: params.host.clone(),
        port: params.port,
        reason: e.to_string(),
    };

    match method {
        AuthMethod::Agent(socket) => try_agent(handle, &params.user, socket).await,
        AuthMethod::KeyFile(path) => {
            let key = load_key_file(path, prompt).await?;
            handle
                .authenticate_publickey(params.user.clone(), Arc::new(key))
                .await
                .map_err(transport_err)
        }
        AuthMethod::Password => {
            let password = prompt
                .prompt_secret(&format!("{}@{}'s password: ", params.user, params.host))
                .await?;
            handle
                .authenticate_password(params.user.clone(), password.expose_secret())
                .await
                .map_err(transport_err)
        }
    }
}

async fn try_agent<H>(handle: &mut Handle<H>, user: &str, socket: &Path) -> AuthResult<bool>
where
    H: Handler,
{
    let agent_err = |e: russh_keys::Error| AuthError::Agent(e.to_string());

    let mut agent = AgentClient::connect_uds(socket).await.map_err(agent_err)?;
    let identities = agent.request_identities().await.map_err(agent_err)?;
    tracing::debug!(count = identities.len(), "Agent identities");

    for key in identities {
        let fingerprint = key.fingerprint();
        let (returned, result) = handle.authenticate_future(user, key, agent).await;
        agent = returned;
        match result {
            Ok(true) => return Ok(true),
            Ok(false) => tracing::trace!(%fingerprint, "Agent identity rejected"),
            Err(e) => tracing::debug!(%fingerprint, error = %e, "Agent signing failed"),
        }
    }

    Ok(false)
}
