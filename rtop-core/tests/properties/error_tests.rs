//! Property tests for error types

use std::error::Error as _;
use std::path::PathBuf;

use proptest::prelude::*;
use rtop_core::error::{
    AuthError, ConfigError, ExecutionError, FormatError, MonitoringError, RtopError,
};

fn arb_command() -> impl Strategy<Value = String> {
    "/s?bin/[a-z]{2,8}( -[a-zA-Z0-9]{1,3})?( /proc/[a-z/]{2,12})?"
}

fn arb_execution_error() -> impl Strategy<Value = ExecutionError> {
    (arb_command(), 0u32..256, "[A-Z]{3,5}", 1u64..300).prop_flat_map(
        |(command, status, signal, timeout_secs)| {
            prop_oneof![
                Just(ExecutionError::Transport {
                    command: command.clone(),
                    reason: "channel closed".to_string(),
                }),
                Just(ExecutionError::ExitStatus {
                    command: command.clone(),
                    status,
                }),
                Just(ExecutionError::Signal {
                    command: command.clone(),
                    signal,
                }),
                Just(ExecutionError::TimedOut {
                    command: command.clone(),
                    timeout_secs,
                }),
                Just(ExecutionError::InvalidUtf8 { command }),
            ]
        },
    )
}

proptest! {
    /// Every execution failure names the command that caused it
    #[test]
    fn execution_error_mentions_command(err in arb_execution_error()) {
        let command = err.command().to_string();
        prop_assert!(err.to_string().contains(&command));
    }

    /// Probe failures name the probe and keep the underlying cause
    #[test]
    fn monitoring_error_names_probe(
        err in arb_execution_error(),
        probe in prop::sample::select(vec!["uptime", "hostname", "cpu", "memory"]),
    ) {
        let command = err.command().to_string();
        let wrapped = MonitoringError::Execution { probe, source: err };

        prop_assert_eq!(wrapped.probe(), probe);
        prop_assert!(wrapped.to_string().starts_with(probe));
        prop_assert!(wrapped.to_string().contains(&command));
        prop_assert!(wrapped.source().is_some());
    }

    #[test]
    fn format_error_has_what_and_detail(detail in "[a-z ]{1,30}") {
        let err = FormatError::new("meminfo", detail.clone());
        let msg = err.to_string();
        prop_assert!(msg.contains("meminfo"));
        prop_assert!(msg.contains(&detail));
    }
}

#[test]
fn config_error_read_has_path() {
    let err = ConfigError::Read {
        path: PathBuf::from("/home/alice/.ssh/config"),
        source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
    };
    assert!(err.to_string().contains(".ssh/config"));
    assert!(err.source().is_some());
}

#[test]
fn auth_rejected_lists_methods() {
    let err = AuthError::Rejected {
        user: "deploy".to_string(),
        host: "web1".to_string(),
        tried: "agent, publickey, password".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains("deploy@web1"));
    assert!(msg.contains("agent, publickey, password"));
}

#[test]
fn handshake_error_has_endpoint() {
    let err = AuthError::Handshake {
        host: "web1".to_string(),
        port: 2222,
        reason: "connection refused".to_string(),
    };
    assert!(err.to_string().contains("web1:2222"));
}

#[test]
fn rtop_error_is_transparent() {
    let inner = AuthError::PromptInterrupted;
    let msg = inner.to_string();
    let outer: RtopError = inner.into();
    assert_eq!(outer.to_string(), msg);

    let err: RtopError = ConfigError::NoHomeDir.into();
    assert!(matches!(err, RtopError::Config(ConfigError::NoHomeDir)));
}

#[test]
fn target_error_quotes_input() {
    let err = RtopError::Target {
        target: "user@".to_string(),
        reason: "empty host".to_string(),
    };
    assert!(err.to_string().contains("'user@'"));
}
