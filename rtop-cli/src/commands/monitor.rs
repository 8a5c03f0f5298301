//! The monitoring command: connect, harvest and display.

use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType};
use rtop_core::error::RtopError;
use rtop_core::{
    ConfigManager, ConnectParams, Harvester, MetricsEvent, MonitoringSettings, ResolveOptions,
    Snapshot, SshTransport, Target, TerminalPrompt, start_collector,
};
use tokio::sync::mpsc::Receiver;

use crate::cli::Cli;
use crate::error::CliError;
use crate::render::{render_dashboard, render_snapshot};
use crate::util::{apply_overrides, load_config};

/// Deadline for TCP connect plus key exchange
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Monitor the target given on the command line
pub fn cmd_monitor(cli: &Cli) -> Result<(), CliError> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Runtime(format!("Failed to start runtime: {e}")))?;
    runtime.block_on(monitor(cli))
}

async fn monitor(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref());
    let mut settings = config.settings;
    apply_overrides(&mut settings, cli);

    let target: Target = cli.target.parse()?;
    let options = ResolveOptions {
        default_user: std::env::var("USER").ok().filter(|u| !u.is_empty()),
        key_override: cli.private_key_file.clone(),
        fallback_key: config.manager.as_ref().map(ConfigManager::default_key_path),
    };
    let resolved = target.resolve(&config.aliases, &options)?;
    let label = format!("{}@{}:{}", resolved.user, resolved.host, resolved.port);

    let params = ConnectParams {
        host: resolved.host,
        port: resolved.port,
        user: resolved.user,
        key_path: resolved.key_path,
        agent_socket: std::env::var_os("SSH_AUTH_SOCK")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from),
        allow_password: std::io::stdin().is_terminal(),
        host_key_policy: settings.connection.host_key_policy,
        known_hosts_path: config.manager.as_ref().map(ConfigManager::known_hosts_path),
        connect_timeout: CONNECT_TIMEOUT,
    };

    let transport = Arc::new(SshTransport::connect(&params, &TerminalPrompt).await?);
    tracing::info!(remote = %label, method = %transport.method(), "Connected");

    let result = if cli.once {
        print_once(&transport, &settings.monitoring, cli.json).await
    } else {
        dashboard(Arc::clone(&transport), &settings.monitoring, &label).await
    };

    transport.close().await;
    result
}

async fn print_once(
    transport: &Arc<SshTransport>,
    settings: &MonitoringSettings,
    json: bool,
) -> Result<(), CliError> {
    let snapshot = Harvester::from_settings(settings)
        .harvest(transport)
        .await
        .into_result()
        .map_err(RtopError::from)?;

    let mut stdout = std::io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, &snapshot)?;
        writeln!(stdout)?;
    } else {
        write!(stdout, "{}", render_snapshot(&snapshot))?;
    }
    stdout.flush()?;
    Ok(())
}

async fn dashboard(
    transport: Arc<SshTransport>,
    settings: &MonitoringSettings,
    label: &str,
) -> Result<(), CliError> {
    let (handle, events) = start_collector(transport, settings);
    let result = event_loop(events, label).await;
    handle.stop().await;
    result
}

/// Redraws on every collector event until Ctrl-C.
///
/// A failed first harvest ends the loop with an error; later failures are
/// shown under the last good snapshot.
async fn event_loop(mut events: Receiver<MetricsEvent>, label: &str) -> Result<(), CliError> {
    let mut last_good: Option<Snapshot> = None;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(MetricsEvent::Update(snapshot)) => {
                    draw(&render_dashboard(&snapshot, label, None))?;
                    last_good = Some(snapshot);
                }
                Some(MetricsEvent::Degraded { error, .. }) => match &last_good {
                    Some(snapshot) => draw(&render_dashboard(snapshot, label, Some(&error)))?,
                    None => return Err(CliError::Monitoring(error)),
                },
                Some(MetricsEvent::Stopped) | None => return Ok(()),
            },
            _ = &mut ctrl_c => {
                tracing::debug!("Interrupted, shutting down");
                return Ok(());
            }
        }
    }
}

fn draw(frame: &str) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    crossterm::queue!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    stdout.write_all(frame.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
