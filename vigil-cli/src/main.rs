//! Vigil CLI
//!
//! Command-line interface for following case-triage backend jobs.

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Track case-triage backend jobs", long_about = None)]
struct Cli {
    /// Backend API URL [env: VIGIL_API_URL] [default: http://localhost:8000]
    #[arg(long)]
    api_url: Option<String>,

    /// Bearer token issued by the auth service [env: VIGIL_API_TOKEN]
    #[arg(long)]
    token: Option<String>,

    /// File holding the persisted active job [env: VIGIL_STATE_FILE]
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Seconds before a single status request is abandoned [env: VIGIL_REQUEST_TIMEOUT] [default: 10]
    #[arg(long)]
    timeout: Option<u64>,

    /// Base delay between polls, in milliseconds [env: VIGIL_POLL_INTERVAL_MS] [default: 2000]
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Consecutive failures tolerated before giving up on a job [env: VIGIL_MAX_FAILURES] [default: 3]
    #[arg(long)]
    max_failures: Option<u32>,

    /// Show debug logs on stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    vigil_tracker::logging::init(if cli.verbose {
        "vigil_tracker=debug,vigil_client=debug"
    } else {
        "warn"
    });

    let config = Config {
        api_url: cli.api_url,
        token: cli.token,
        state_file: cli.state_file,
        request_timeout_secs: cli.timeout,
        poll_interval_ms: cli.poll_interval_ms,
        max_failures: cli.max_failures,
    };

    handle_command(cli.command, &config).await
}
