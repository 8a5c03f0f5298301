//! rtop - monitor a remote host's system statistics over SSH
//!
//! Connects with the first credential the server accepts (agent, key file,
//! password), then periodically runs a handful of read-only commands and
//! prints what they report: load, CPU, memory, filesystems and network.

mod cli;
mod commands;
mod error;
mod render;
mod util;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();

    let result = util::init_logging(cli.verbose, cli.log_file.as_deref())
        .and_then(|()| commands::cmd_monitor(&cli));

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}
