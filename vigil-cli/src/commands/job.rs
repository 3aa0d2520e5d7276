//! Job command handlers
//!
//! Handles one-shot status lookups and following a job until it finishes.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use vigil_core::domain::job::{Job, JobStatus};
use vigil_core::tracking::{Completion, TrackerStatus};
use vigil_tracker::{TrackerContext, TrackerExit};

use crate::config::Config;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Follow a job until it finishes
    Watch {
        /// Job ID
        id: String,

        /// Do not record the job as active (it will not be resumable)
        #[arg(long)]
        no_persist: bool,
    },
    /// Show the current status of a job once
    Status {
        /// Job ID
        id: String,
    },
    /// Resume following the job recorded as active
    Resume,
}

/// Handle job commands
///
/// Routes job subcommands to their respective handlers.
///
/// # Arguments
/// * `command` - The job command to execute
/// * `config` - The CLI configuration
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    let context = config.context()?;

    match command {
        JobCommands::Watch { id, no_persist } => watch_job(&context, &id, !no_persist).await,
        JobCommands::Status { id } => show_status(&context, &id).await,
        JobCommands::Resume => resume_job(&context).await,
    }
}

/// Follow a job, printing each status change
async fn watch_job(context: &TrackerContext, id: &str, persist: bool) -> Result<()> {
    if persist {
        context
            .registry()
            .activate(id)
            .context("Failed to record active job")?;
    }

    println!("{} {}", "Watching job".bold(), id.cyan());

    let handle = context.poller(id).on_complete(print_completion).spawn();
    let mut status = handle.status();
    let mut last_line = String::new();

    loop {
        tokio::select! {
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                let line = format_status(&current);
                if line != last_line {
                    println!("{}", line);
                    last_line = line;
                }
                if current.is_terminal() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                handle.detach();
                break;
            }
        }
    }

    let report = handle.join().await.context("Poller task failed")?;

    match report.exit {
        TrackerExit::Completed(_) => Ok(()),
        TrackerExit::Detached => {
            if persist {
                println!(
                    "{}",
                    "Stopped watching. Run `vigil job resume` to continue.".dimmed()
                );
            }
            Ok(())
        }
        TrackerExit::JobFailed(job) => anyhow::bail!(
            "job {} failed: {}",
            job.id,
            job.error.as_deref().unwrap_or("no error details")
        ),
        TrackerExit::Stopped(reason) => anyhow::bail!("job {}: {}", id, reason),
    }
}

/// Fetch and display a job once
async fn show_status(context: &TrackerContext, id: &str) -> Result<()> {
    let job = match context.client().get_job(id).await {
        Ok(job) => job,
        Err(e) if e.is_not_found() => {
            anyhow::bail!("job {} not found. It may be an old or expired job.", id)
        }
        Err(e) if e.is_throttled() => anyhow::bail!(
            "backend is busy (HTTP {}), try again later",
            e.status().unwrap_or_default()
        ),
        Err(e) => return Err(e).with_context(|| format!("Failed to fetch job {}", id)),
    };

    print_job_details(&job);

    Ok(())
}

/// Resume the persisted active job, if there is one
async fn resume_job(context: &TrackerContext) -> Result<()> {
    let active = context
        .registry()
        .active_job()
        .context("Failed to read tracker state")?;

    match active {
        Some(id) => watch_job(context, &id, true).await,
        None => {
            println!("{}", "No active job to resume.".yellow());
            Ok(())
        }
    }
}

/// Completion callback: print the job's results
fn print_completion(completion: Completion) {
    if let Some(message) = &completion.message {
        println!("{} {}", "✓".green(), message);
    }

    if let Some(results) = &completion.results {
        println!("\n{}", "Results:".bold());
        match serde_json::to_string_pretty(results) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{:?}", results),
        }
    }
}

/// One-line rendering of a tracker status
fn format_status(status: &TrackerStatus) -> String {
    match status {
        TrackerStatus::Connecting => format!("{} {}", "…".dimmed(), status.message().dimmed()),
        TrackerStatus::Running(job) => format_progress(job),
        TrackerStatus::Retrying { .. } => format!("{} {}", "↻".yellow(), status.message().yellow()),
        TrackerStatus::Completed(_) => format!("{} {}", "✓".green(), "Job completed".green()),
        TrackerStatus::Failed(_) | TrackerStatus::Stopped(_) => {
            format!("{} {}", "✗".red(), status.message().red())
        }
        TrackerStatus::Detached => format!("{} {}", "■".dimmed(), status.message().dimmed()),
    }
}

/// Progress line for an in-flight job
fn format_progress(job: &Job) -> String {
    let mut parts = vec![format!("[{:>3}%]", job.progress_percent()).cyan().to_string()];

    if let Some(step) = job.step_label() {
        parts.push(step);
    }
    if let Some(phase) = job.phase() {
        parts.push(phase.dimmed().to_string());
    }
    match &job.message {
        Some(message) if !message.is_empty() => parts.push(message.clone()),
        _ => parts.push(colorize_status(&job.status).to_string()),
    }

    parts.join(" ")
}

/// Print detailed job information
fn print_job_details(job: &Job) {
    println!("{}", "Job Details:".bold());
    println!("  ID:        {}", job.id.cyan());
    if let Some(job_type) = &job.job_type {
        println!("  Type:      {}", job_type.dimmed());
    }
    println!("  Status:    {}", colorize_status(&job.status));
    println!("  Progress:  {}%", job.progress_percent());

    if let Some(step) = job.step_label() {
        println!("  Step:      {}", step);
    }
    if let Some(phase) = job.phase() {
        println!("  Phase:     {}", phase);
    }
    if let Some(message) = &job.message {
        println!("  Message:   {}", message);
    }
    if let Some(started) = job.started_at {
        println!("  Started:   {}", started.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(updated) = job.updated_at {
        println!("  Updated:   {}", updated.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(completed) = job.completed_at {
        println!("  Completed: {}", completed.format("%Y-%m-%d %H:%M:%S"));

        if let Some(started) = job.started_at {
            let duration = completed.signed_duration_since(started);
            println!("  Duration:  {}s", duration.num_seconds());
        }
    }

    if let Some(error) = &job.error {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }

    if let Some(results) = &job.results {
        println!("\n{}", "Results:".bold());
        match serde_json::to_string_pretty(results) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{:?}", results),
        }
    }
}

/// Colorize job status for display
fn colorize_status(status: &JobStatus) -> ColoredString {
    let label = status.as_str().to_string();
    match status {
        JobStatus::Queued | JobStatus::Started => label.yellow(),
        JobStatus::Running => label.cyan(),
        JobStatus::Completed => label.green(),
        JobStatus::Failed => label.red(),
        JobStatus::Unknown(_) => label.dimmed(),
    }
}
