//! Tracker state command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;

use crate::config::Config;

/// Tracker subcommands
#[derive(Subcommand)]
pub enum TrackerCommands {
    /// Show the persisted active job
    Show,
    /// Forget the persisted active job
    Clear,
}

/// Handle tracker commands
pub async fn handle_tracker_command(command: TrackerCommands, config: &Config) -> Result<()> {
    let context = config.context()?;
    let registry = context.registry();

    match command {
        TrackerCommands::Show => {
            let active = registry
                .active_job()
                .context("Failed to read tracker state")?;
            let visible = registry
                .is_tracker_visible()
                .context("Failed to read tracker state")?;

            println!("{}", "Tracker State:".bold());
            println!(
                "  State file: {}",
                context.config().state_path.display().to_string().dimmed()
            );
            match active {
                Some(id) => println!("  Active job: {}", id.cyan()),
                None => println!("  Active job: {}", "none".dimmed()),
            }
            println!("  Visible:    {}", if visible { "yes" } else { "no" });
        }
        TrackerCommands::Clear => {
            registry.clear().context("Failed to clear tracker state")?;
            println!("{}", "Tracker state cleared.".green());
        }
    }

    Ok(())
}
