//! Private key file loading
//!
//! Key files are PEM-armoured. The block type decides how the key is
//! decoded; encrypted keys ask for a passphrase through a [`SecretPrompt`].

use std::path::Path;

use russh_keys::key::KeyPair;
use secrecy::ExposeSecret;

use crate::error::{AuthError, AuthResult};

use super::prompt::SecretPrompt;

/// PEM block types found in private key files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PemKind {
    /// `RSA PRIVATE KEY` (PKCS#1)
    Rsa,
    /// `EC PRIVATE KEY` (SEC1)
    Ec,
    /// `DSA PRIVATE KEY`
    Dsa,
    /// `OPENSSH PRIVATE KEY`
    OpenSsh,
    /// `PRIVATE KEY` (PKCS#8)
    Pkcs8,
    /// `ENCRYPTED PRIVATE KEY` (PKCS#8)
    EncryptedPkcs8,
}

impl PemKind {
    /// Identifies the first PEM block in `text`
    #[must_use]
    pub fn detect(text: &str) -> Option<Self> {
        let label = text.lines().find_map(|line| {
            line.trim()
                .strip_prefix("-----BEGIN ")
                .and_then(|rest| rest.strip_suffix("-----"))
        })?;

        match label {
            "RSA PRIVATE KEY" => Some(Self::Rsa),
            "EC PRIVATE KEY" => Some(Self::Ec),
            "DSA PRIVATE KEY" => Some(Self::Dsa),
            "OPENSSH PRIVATE KEY" => Some(Self::OpenSsh),
            "PRIVATE KEY" => Some(Self::Pkcs8),
            "ENCRYPTED PRIVATE KEY" => Some(Self::EncryptedPkcs8),
            _ => None,
        }
    }
}

/// Returns `true` if the armour alone shows the key is encrypted.
///
/// Legacy PEM keys carry a `Proc-Type: 4,ENCRYPTED` header and encrypted
/// PKCS#8 has its own block type. OpenSSH keys only reveal encryption once
/// decoded.
#[must_use]
pub fn armour_says_encrypted(text: &str, kind: PemKind) -> bool {
    kind == PemKind::EncryptedPkcs8
        || text
            .lines()
            .any(|line| line.trim().eq_ignore_ascii_case("Proc-Type: 4,ENCRYPTED"))
}

/// Loads and, if needed, decrypts the private key at `path`.
///
/// # Errors
///
/// Returns [`AuthError::Key`] if the file cannot be read, is not a supported
/// key, or cannot be decrypted, and [`AuthError::PromptInterrupted`] if the
/// user abandons the passphrase prompt.
pub async fn load_key_file(path: &Path, prompt: &dyn SecretPrompt) -> AuthResult<KeyPair> {
    let key_err = |reason: String| AuthError::Key {
        path: path.to_path_buf(),
        reason,
    };

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| key_err(e.to_string()))?;

    let kind = PemKind::detect(&text).ok_or_else(|| key_err("no private key block".into()))?;
    if kind == PemKind::Dsa {
        return Err(key_err("DSA keys are not supported".into()));
    }

    let encrypted = armour_says_encrypted(&text, kind);
    if !encrypted {
        match russh_keys::decode_secret_key(&text, None) {
            Ok(key) => return Ok(key),
            Err(russh_keys::Error::KeyIsEncrypted) => {}
            Err(e) => return Err(key_err(e.to_string())),
        }
    }

    tracing::debug!(path = %path.display(), ?kind, "Key is encrypted");
    let passphrase = prompt
        .prompt_secret(&format!("Enter passphrase for key '{}': ", path.display()))
        .await?;

    russh_keys::decode_secret_key(&text, Some(passphrase.expose_secret()))
        .map_err(|e| key_err(format!("could not decrypt: {e}")))
}
