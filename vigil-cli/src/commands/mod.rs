//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;
mod tracker;

pub use job::JobCommands;
pub use tracker::TrackerCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Job status and tracking
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Persisted tracker state
    Tracker {
        #[command(subcommand)]
        command: TrackerCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Job { command } => job::handle_job_command(command, config).await,
        Commands::Tracker { command } => tracker::handle_tracker_command(command, config).await,
    }
}
