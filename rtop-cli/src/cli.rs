//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::Parser;

/// rtop monitors server statistics over an SSH connection
#[derive(Parser, Debug)]
#[command(name = "rtop")]
#[command(author, version, about = "Monitor a remote host's statistics over SSH")]
#[command(after_help = "The host may be an alias from ~/.ssh/config.")]
pub struct Cli {
    /// Remote host as [user@]host[:port]
    #[arg(value_name = "[USER@]HOST[:PORT]")]
    pub target: String,

    /// PEM-encoded private key file (default: ~/.ssh/id_rsa if present)
    #[arg(short = 'i', long = "private-key-file", value_name = "FILE")]
    pub private_key_file: Option<PathBuf>,

    /// Refresh interval in seconds, 1 to 3600 (default: 5)
    #[arg(short = 't', long, value_name = "SECS", value_parser = parse_seconds)]
    pub interval: Option<u64>,

    /// Maximum number of probes run at once (default: CPU count)
    #[arg(short = 'w', long, value_name = "N")]
    pub workers: Option<usize>,

    /// Deadline for each remote command in seconds (default: 10)
    #[arg(long, value_name = "SECS", value_parser = parse_seconds)]
    pub probe_timeout: Option<u64>,

    /// Only accept host keys listed in ~/.ssh/known_hosts
    #[arg(long)]
    pub strict_host_key_checking: bool,

    /// Collect statistics once, print them and exit
    #[arg(long)]
    pub once: bool,

    /// Print the statistics as JSON (requires --once)
    #[arg(long, requires = "once")]
    pub json: bool,

    /// Path to the settings file (default: ~/.config/rtop/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write logs to a file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// Parses a whole number of seconds, with an optional `s` suffix
fn parse_seconds(s: &str) -> Result<u64, String> {
    s.trim()
        .trim_end_matches('s')
        .parse::<u64>()
        .map_err(|_| format!("invalid number of seconds: `{s}`"))
}
