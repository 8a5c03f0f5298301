//! Interactive secret prompts
//!
//! Passwords and key passphrases are read with the terminal in raw mode so
//! nothing is echoed. Raw mode is held by [`RawModeGuard`], which restores
//! the terminal when dropped, including on error and panic unwind. While a
//! prompt is active, SIGTERM, SIGQUIT and SIGHUP restore the terminal and
//! exit the process with status 2.

use std::io::{self, Write};

use async_trait::async_trait;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use secrecy::SecretString;

use crate::error::{AuthError, AuthResult};

/// Process exit status used when a signal arrives during a prompt
pub const PROMPT_SIGNAL_EXIT_CODE: i32 = 2;

/// Asks the user for a secret
#[async_trait]
pub trait SecretPrompt: Send + Sync {
    /// Shows `message` and reads one secret line.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::PromptInterrupted`] if the user abandons the
    /// prompt, or [`AuthError::Prompt`] if the terminal cannot be used.
    async fn prompt_secret(&self, message: &str) -> AuthResult<SecretString>;
}

/// Holds the terminal in raw mode until dropped
#[derive(Debug)]
pub struct RawModeGuard(());

impl RawModeGuard {
    /// Switches the terminal to raw mode.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if raw mode is unavailable (e.g. not a terminal).
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self(()))
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Prompts on the controlling terminal, writing the message to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

#[async_trait]
impl SecretPrompt for TerminalPrompt {
    async fn prompt_secret(&self, message: &str) -> AuthResult<SecretString> {
        let message = message.to_string();
        let read = tokio::task::spawn_blocking(move || read_secret(&message));

        tokio::select! {
            joined = read => joined.map_err(|e| AuthError::Prompt(e.to_string()))?,
            signal = termination_signal() => {
                let _ = terminal::disable_raw_mode();
                eprintln!();
                tracing::debug!(signal, "Signal received during prompt");
                std::process::exit(PROMPT_SIGNAL_EXIT_CODE);
            }
        }
    }
}

/// What a key press does to the line being read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Push(char),
    Pop,
    Submit,
    Abandon,
    Ignore,
}

fn classify_key(key: &KeyEvent) -> KeyAction {
    if key.kind == KeyEventKind::Release {
        return KeyAction::Ignore;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => KeyAction::Submit,
        KeyCode::Esc => KeyAction::Abandon,
        KeyCode::Char('c' | 'd') if ctrl => KeyAction::Abandon,
        KeyCode::Char(c) if !ctrl => KeyAction::Push(c),
        KeyCode::Backspace => KeyAction::Pop,
        _ => KeyAction::Ignore,
    }
}

fn read_secret(message: &str) -> AuthResult<SecretString> {
    let io_err = |e: io::Error| AuthError::Prompt(e.to_string());

    let mut stderr = io::stderr();
    write!(stderr, "{message}").map_err(io_err)?;
    stderr.flush().map_err(io_err)?;

    let mut line = String::new();
    let outcome = {
        let _guard = RawModeGuard::enable().map_err(io_err)?;
        loop {
            let Event::Key(key) = event::read().map_err(io_err)? else {
                continue;
            };
            match classify_key(&key) {
                KeyAction::Push(c) => line.push(c),
                KeyAction::Pop => {
                    line.pop();
                }
                KeyAction::Submit => break Ok(()),
                KeyAction::Abandon => break Err(AuthError::PromptInterrupted),
                KeyAction::Ignore => {}
            }
        }
    };
    let _ = writeln!(stderr);

    outcome.map(|()| SecretString::from(line))
}

/// Resolves with the signal name once SIGTERM, SIGQUIT or SIGHUP arrives.
///
/// The listeners live only as long as the returned future. Tokio keeps its
/// process-wide handler installed afterwards, so later deliveries of these
/// signals are swallowed rather than terminating the process.
#[cfg(unix)]
async fn termination_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let (Ok(mut term), Ok(mut quit), Ok(mut hup)) = (
        signal(SignalKind::terminate()),
        signal(SignalKind::quit()),
        signal(SignalKind::hangup()),
    ) else {
        tracing::debug!("Could not install prompt signal listeners");
        return std::future::pending().await;
    };

    tokio::select! {
        _ = term.recv() => "SIGTERM",
        _ = quit.recv() => "SIGQUIT",
        _ = hup.recv() => "SIGHUP",
    }
}

#[cfg(not(unix))]
async fn termination_signal() -> &'static str {
    std::future::pending().await
}
