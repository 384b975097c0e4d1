//! Task model
//!
//! A task binds one repository to one improvement goal. Tasks live only in
//! memory and are lost on restart; that gap is inherited by design. Status
//! moves strictly Pending -> Running -> {Completed, Failed} and a task is
//! never re-entered once terminal.

pub mod orchestrator;

use crate::config::ConfigError;
use crate::writer::WriterError;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by task creation and orchestrator construction
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("repository '{0}' not found in configuration or disabled")]
    UnknownRepository(String),

    #[error("goal must not be empty")]
    EmptyGoal,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Writer(#[from] WriterError),
}

/// Identifier handed out by the orchestrator at task creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Terminal states are never left
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// One (repository, goal) pairing to run over matching files
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub repo_name: String,
    pub repo_path: PathBuf,
    /// Resolved goal description
    pub goal: String,
    pub file_extensions: Vec<String>,
    pub exclude_patterns: Vec<String>,
    /// Higher runs sooner
    pub priority: i32,
    /// Backend override; the registry default applies when `None`
    pub provider: Option<String>,
    pub status: TaskStatus,
    pub report: TaskReport,
}

/// Per-task file counters, owned by the orchestrator
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TaskReport {
    /// Files the scan matched
    pub files_matched: usize,
    /// Files that made it through read -> suggest -> apply
    pub files_processed: usize,
    /// Files dropped by a failed read, absent suggestion, or writer error
    pub files_skipped: usize,
}

/// Result of one `execute_all_tasks` run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
}

/// Task counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }

    #[test]
    fn status_display_matches_config_vocabulary() {
        assert_eq!(TaskStatus::Pending.to_string(), "pending");
        assert_eq!(TaskStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn task_id_display() {
        assert_eq!(TaskId(7).to_string(), "#7");
    }
}
