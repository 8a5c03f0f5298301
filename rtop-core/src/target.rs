//! Command-line target parsing and resolution
//!
//! A target is written `[user@]host[:port]`. The host part may be an alias
//! from the SSH config; [`Target::resolve`] merges the two, with values
//! written in the target taking precedence.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::{AliasTable, expand_path};
use crate::error::RtopError;
use crate::ssh::DEFAULT_PORT;

/// A parsed `[user@]host[:port]` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// User written before `@`
    pub user: Option<String>,
    /// Host or alias
    pub host: String,
    /// Port written after `:`
    pub port: Option<u16>,
}

impl FromStr for Target {
    type Err = RtopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| RtopError::Target {
            target: s.to_string(),
            reason: reason.to_string(),
        };

        let (user, rest) = match s.split_once('@') {
            Some((user, rest)) if !user.is_empty() => (Some(user.to_string()), rest),
            Some(_) => return Err(invalid("empty user")),
            None => (None, s),
        };

        // More than one colon is treated as a bare IPv6 address
        let (host, port) = match rest.split(':').collect::<Vec<_>>().as_slice() {
            [host, port] => {
                let port: u32 = port.parse().map_err(|_| invalid("bad port"))?;
                let port = u16::try_from(port)
                    .ok()
                    .filter(|p| *p > 0)
                    .ok_or_else(|| invalid("port out of range"))?;
                ((*host).to_string(), Some(port))
            }
            _ => (rest.to_string(), None),
        };

        if host.is_empty() {
            return Err(invalid("empty host"));
        }

        Ok(Self { user, host, port })
    }
}

/// Caller-side values merged into a target
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// User when neither the target nor the alias table names one
    pub default_user: Option<String>,
    /// Key file given explicitly on the command line
    pub key_override: Option<PathBuf>,
    /// Key file used when nothing else names one, if it exists
    pub fallback_key: Option<PathBuf>,
}

/// Effective connection fields for a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Host to connect to
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Remote user
    pub user: String,
    /// Private key file, already expanded
    pub key_path: Option<PathBuf>,
}

impl Target {
    /// Resolves the target against the alias table and caller options.
    ///
    /// User and port written in the target win over the alias table; an
    /// explicit key file wins over `IdentityFile`. Without either, the
    /// fallback key is used if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`RtopError::Target`] if no user can be determined.
    pub fn resolve(
        &self,
        aliases: &AliasTable,
        options: &ResolveOptions,
    ) -> Result<ResolvedTarget, RtopError> {
        let entry = aliases.resolve(&self.host);

        let user = self
            .user
            .clone()
            .or(entry.user)
            .or_else(|| options.default_user.clone())
            .ok_or_else(|| RtopError::Target {
                target: self.host.clone(),
                reason: "no user given and none could be determined".to_string(),
            })?;

        let key_path = options
            .key_override
            .clone()
            .or_else(|| entry.identity_file.map(PathBuf::from))
            .map(|p| expand_path(&p))
            .or_else(|| {
                options
                    .fallback_key
                    .as_deref()
                    .filter(|p| p.is_file())
                    .map(Path::to_path_buf)
            });

        Ok(ResolvedTarget {
            host: entry.hostname,
            port: self.port.or(entry.port).unwrap_or(DEFAULT_PORT),
            user,
            key_path,
        })
    }
}
