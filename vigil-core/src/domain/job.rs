//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Backend-tracked asynchronous unit of work
///
/// Mirrors the body of `GET /jobs/{id}`. Every field except `id` and
/// `status` is optional on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    #[serde(rename = "type", default)]
    pub job_type: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub total_steps: u32,
    #[serde(default)]
    pub current_step: u32,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub results: Option<Value>,
}

impl Job {
    /// Progress percentage clamped to 0..=100
    pub fn progress_percent(&self) -> u8 {
        self.progress.min(100) as u8
    }

    /// Current phase name, when the backend reports one in `metadata`
    pub fn phase(&self) -> Option<&str> {
        self.metadata.as_ref()?.get("phase")?.as_str()
    }

    /// "Step N of M" label, only when the backend reports a step count
    pub fn step_label(&self) -> Option<String> {
        if self.total_steps == 0 {
            return None;
        }
        Some(format!(
            "Step {} of {}",
            self.current_step.min(self.total_steps),
            self.total_steps
        ))
    }
}

/// Job status as reported by the backend
///
/// Labels are matched case-insensitively. Anything outside the known set is
/// kept verbatim in `Unknown` and treated as still in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Queued,
    Started,
    Running,
    Completed,
    Failed,
    Unknown(String),
}

impl JobStatus {
    /// Wire label for this status
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Started => "started",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Unknown(label) => label,
        }
    }

    /// Whether the job has reached a final state
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl From<String> for JobStatus {
    fn from(label: String) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "queued" => JobStatus::Queued,
            "started" => JobStatus::Started,
            "running" => JobStatus::Running,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Unknown(label),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Unknown(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
