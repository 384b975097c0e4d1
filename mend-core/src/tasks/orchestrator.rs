//! Task orchestration
//!
//! The orchestrator wires the scanner, the provider registry, and the
//! writer into the per-file pipeline: read -> suggest -> apply. The
//! pipeline is strictly sequential; one file finishes before the next
//! starts, and per-file failures are counted as skips without aborting
//! the task. Only a failure outside the per-file loop (the scan itself)
//! flips a task to Failed.

use super::{BatchSummary, StatusSummary, Task, TaskError, TaskId, TaskReport, TaskStatus};
use crate::config::Config;
use crate::provider::{ProviderRegistry, SuggestionRequest};
use crate::scan::RepoScanner;
use crate::writer::FileWriter;
use std::cmp::Reverse;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Owns the pipeline components and the in-memory task lists
pub struct Orchestrator {
    config: Config,
    scanner: RepoScanner,
    providers: ProviderRegistry,
    writer: FileWriter,
    /// Pending, running, and failed tasks
    tasks: Vec<Task>,
    completed: Vec<Task>,
    next_id: u64,
}

impl Orchestrator {
    /// Build the pipeline from configuration; fails fast on invalid
    /// configuration or an unusable backup directory.
    pub fn new(config: Config) -> Result<Self, TaskError> {
        config.validate()?;
        let writer = FileWriter::new(&config.file_processing)?;
        let providers = ProviderRegistry::from_config(&config);

        Ok(Self {
            config,
            scanner: RepoScanner::new(),
            providers,
            writer,
            tasks: Vec::new(),
            completed: Vec::new(),
            next_id: 1,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_registry(
        config: Config,
        providers: ProviderRegistry,
    ) -> Result<Self, TaskError> {
        let writer = FileWriter::new(&config.file_processing)?;
        Ok(Self {
            config,
            scanner: RepoScanner::new(),
            providers,
            writer,
            tasks: Vec::new(),
            completed: Vec::new(),
            next_id: 1,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scanner(&self) -> &RepoScanner {
        &self.scanner
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn writer(&self) -> &FileWriter {
        &self.writer
    }

    /// Create a task for a registered repository. The goal is resolved
    /// against the custom-goal catalog by name first, then used as free
    /// text; only non-emptiness is validated.
    pub fn create_task(
        &mut self,
        repo_name: &str,
        goal: &str,
        priority: i32,
        provider: Option<String>,
    ) -> Result<TaskId, TaskError> {
        let repo = self
            .config
            .repository(repo_name)
            .ok_or_else(|| TaskError::UnknownRepository(repo_name.to_string()))?;

        let goal = self.config.goals.resolve(goal);
        if goal.trim().is_empty() {
            return Err(TaskError::EmptyGoal);
        }

        let id = TaskId(self.next_id);
        self.next_id += 1;

        let task = Task {
            id,
            repo_name: repo.name.clone(),
            repo_path: repo.path.clone(),
            goal: goal.clone(),
            file_extensions: repo.file_extensions.clone(),
            exclude_patterns: repo.exclude_patterns.clone(),
            priority,
            provider,
            status: TaskStatus::Pending,
            report: TaskReport::default(),
        };
        self.tasks.push(task);

        info!("created task {id}: {repo_name} - {goal}");
        Ok(id)
    }

    /// Execute one pending task to completion. Returns false when the task
    /// is unknown, not pending, or its scan failed.
    pub async fn execute_task(&mut self, id: TaskId) -> bool {
        let Some(idx) = self.tasks.iter().position(|t| t.id == id) else {
            warn!("no such task: {id}");
            return false;
        };
        if self.tasks[idx].status != TaskStatus::Pending {
            warn!("task {id} is {}, not pending", self.tasks[idx].status);
            return false;
        }

        self.tasks[idx].status = TaskStatus::Running;
        let (repo_name, repo_path, goal, extensions, excludes, provider) = {
            let task = &self.tasks[idx];
            (
                task.repo_name.clone(),
                task.repo_path.clone(),
                task.goal.clone(),
                task.file_extensions.clone(),
                task.exclude_patterns.clone(),
                task.provider.clone(),
            )
        };
        info!("executing task {id}: {repo_name} - {goal}");

        // The scan is the only step outside the per-file loop; its failure
        // fails the whole task.
        let files = match self.scanner.scan(&repo_path, &extensions, &excludes) {
            Ok(files) => files,
            Err(err) => {
                error!("task {id} failed to scan {}: {err}", repo_path.display());
                self.tasks[idx].status = TaskStatus::Failed;
                return false;
            }
        };

        let mut report = TaskReport { files_matched: files.len(), ..TaskReport::default() };

        if files.is_empty() {
            warn!("no files matched in {repo_name}");
        } else {
            for file in &files {
                if self.process_file(file, &goal, provider.as_deref()).await {
                    report.files_processed += 1;
                } else {
                    report.files_skipped += 1;
                }
            }
        }

        let mut task = self.tasks.remove(idx);
        task.status = TaskStatus::Completed;
        task.report = report;
        info!(
            "task {id} completed: {} of {} files processed",
            report.files_processed, report.files_matched
        );
        self.completed.push(task);
        true
    }

    /// Run one file through read -> suggest -> apply; any miss is a skip
    async fn process_file(&self, path: &Path, goal: &str, provider: Option<&str>) -> bool {
        let content = match self.scanner.read_file(path) {
            Ok(content) => content,
            Err(err) => {
                warn!("skipping {}: {err}", path.display());
                return false;
            }
        };

        let request = SuggestionRequest { content: &content, goal, file_path: path };
        let Some(suggestion) = self.providers.suggest(&request, provider).await else {
            return false;
        };

        match self.writer.apply_changes(path, &suggestion) {
            Ok(outcome) => {
                debug!("{}: {outcome:?}", path.display());
                true
            }
            Err(err) => {
                warn!("skipping {}: {err}", path.display());
                false
            }
        }
    }

    /// Execute every pending task in descending priority order
    pub async fn execute_all_tasks(&mut self) -> BatchSummary {
        let mut pending: Vec<(TaskId, i32)> = self
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .map(|t| (t.id, t.priority))
            .collect();
        pending.sort_by_key(|&(_, priority)| Reverse(priority));

        let mut summary = BatchSummary { total: pending.len(), ..BatchSummary::default() };
        for (id, _) in pending {
            if self.execute_task(id).await {
                summary.completed += 1;
            } else {
                summary.failed += 1;
            }
        }
        summary
    }

    /// Pending tasks, highest priority first
    pub fn pending_tasks(&self) -> Vec<&Task> {
        let mut pending: Vec<&Task> =
            self.tasks.iter().filter(|t| t.status == TaskStatus::Pending).collect();
        pending.sort_by_key(|t| Reverse(t.priority));
        pending
    }

    /// Counters for a task, wherever it currently lives
    pub fn task_report(&self, id: TaskId) -> Option<&TaskReport> {
        self.tasks
            .iter()
            .chain(self.completed.iter())
            .find(|t| t.id == id)
            .map(|t| &t.report)
    }

    /// Task counts by status
    pub fn status_summary(&self) -> StatusSummary {
        StatusSummary {
            pending: self.tasks.iter().filter(|t| t.status == TaskStatus::Pending).count(),
            running: self.tasks.iter().filter(|t| t.status == TaskStatus::Running).count(),
            completed: self.completed.len(),
            failed: self.tasks.iter().filter(|t| t.status == TaskStatus::Failed).count(),
        }
    }

    /// Drop completed tasks from memory
    pub fn clear_completed(&mut self) {
        self.completed.clear();
        info!("cleared completed tasks");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileProcessingConfig, RepositoryConfig};
    use crate::provider::ProviderError;
    use crate::provider::mock::MockProvider;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn config_for(dir: &TempDir, repo_dir: &Path) -> Config {
        Config {
            default_provider: "claude".to_string(),
            repositories: vec![RepositoryConfig {
                name: "demo".to_string(),
                path: repo_dir.to_path_buf(),
                file_extensions: vec![".py".to_string()],
                exclude_patterns: Vec::new(),
                enabled: true,
            }],
            file_processing: FileProcessingConfig {
                backup_directory: dir.path().join("backups"),
                auto_apply_changes: true,
                backup_original_files: true,
            },
            ..Config::default()
        }
    }

    fn orchestrator_with_mock(
        dir: &TempDir,
        repo_dir: &Path,
        mock: Arc<MockProvider>,
    ) -> Orchestrator {
        let registry = ProviderRegistry::with_providers(vec![Box::new(mock)], "mock");
        Orchestrator::with_registry(config_for(dir, repo_dir), registry).unwrap()
    }

    #[tokio::test]
    async fn pipeline_rewrites_matching_files() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path().join("repo");
        fs::create_dir(&repo).unwrap();
        fs::write(repo.join("a.py"), "print(1)").unwrap();
        fs::write(repo.join("b.txt"), "notes").unwrap();

        let mock = Arc::new(MockProvider::new().push_response("```python\ndef f(): pass\n```"));
        let mut orch = orchestrator_with_mock(&dir, &repo, Arc::clone(&mock));

        let id = orch.create_task("demo", "add docstring", 1, None).unwrap();
        assert!(orch.execute_task(id).await);

        // Only a.py matched; fences were stripped before the write
        assert_eq!(fs::read_to_string(repo.join("a.py")).unwrap(), "def f(): pass");
        assert_eq!(fs::read_to_string(repo.join("b.txt")).unwrap(), "notes");
        assert_eq!(mock.call_count(), 1);

        let report = orch.task_report(id).unwrap();
        assert_eq!(report.files_matched, 1);
        assert_eq!(report.files_processed, 1);
        assert_eq!(report.files_skipped, 0);
    }

    #[tokio::test]
    async fn unknown_repository_fails_task_creation() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path().join("repo");
        fs::create_dir(&repo).unwrap();

        let mock = Arc::new(MockProvider::new());
        let mut orch = orchestrator_with_mock(&dir, &repo, mock);

        let err = orch.create_task("nope", "add tests", 1, None).unwrap_err();
        assert!(matches!(err, TaskError::UnknownRepository(_)));
    }

    #[tokio::test]
    async fn empty_goal_is_rejected() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path().join("repo");
        fs::create_dir(&repo).unwrap();

        let mock = Arc::new(MockProvider::new());
        let mut orch = orchestrator_with_mock(&dir, &repo, mock);

        assert!(matches!(orch.create_task("demo", "  ", 1, None), Err(TaskError::EmptyGoal)));
    }

    #[tokio::test]
    async fn zero_matching_files_completes_without_provider_calls() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path().join("repo");
        fs::create_dir(&repo).unwrap();
        fs::write(repo.join("readme.md"), "docs").unwrap();

        let mock = Arc::new(MockProvider::new());
        let mut orch = orchestrator_with_mock(&dir, &repo, Arc::clone(&mock));

        let id = orch.create_task("demo", "add tests", 1, None).unwrap();
        assert!(orch.execute_task(id).await);
        assert_eq!(mock.call_count(), 0);
        assert_eq!(orch.status_summary().completed, 1);
    }

    #[tokio::test]
    async fn scan_failure_flips_task_to_failed() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path().join("repo");
        fs::create_dir(&repo).unwrap();

        let mock = Arc::new(MockProvider::new());
        let mut orch = orchestrator_with_mock(&dir, &repo, mock);

        let id = orch.create_task("demo", "add tests", 1, None).unwrap();
        fs::remove_dir(&repo).unwrap();

        assert!(!orch.execute_task(id).await);
        let summary = orch.status_summary();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.completed, 0);
    }

    #[tokio::test]
    async fn provider_failures_skip_files_but_complete_the_task() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path().join("repo");
        fs::create_dir(&repo).unwrap();
        fs::write(repo.join("a.py"), "print(1)").unwrap();
        fs::write(repo.join("b.py"), "print(2)").unwrap();

        let mock = Arc::new(
            MockProvider::new()
                .push_error(ProviderError::network("connection refused"))
                .push_response("print(3)"),
        );
        let mut orch = orchestrator_with_mock(&dir, &repo, mock);

        let id = orch.create_task("demo", "add tests", 1, None).unwrap();
        assert!(orch.execute_task(id).await);

        let report = orch.task_report(id).unwrap();
        assert_eq!(report.files_matched, 2);
        assert_eq!(report.files_processed, 1);
        assert_eq!(report.files_skipped, 1);
    }

    #[tokio::test]
    async fn completed_tasks_are_not_reentered() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path().join("repo");
        fs::create_dir(&repo).unwrap();

        let mock = Arc::new(MockProvider::new());
        let mut orch = orchestrator_with_mock(&dir, &repo, mock);

        let id = orch.create_task("demo", "add tests", 1, None).unwrap();
        assert!(orch.execute_task(id).await);
        assert!(!orch.execute_task(id).await);
    }

    #[tokio::test]
    async fn execute_all_runs_by_descending_priority() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path().join("repo");
        fs::create_dir(&repo).unwrap();

        let mock = Arc::new(MockProvider::new());
        let mut orch = orchestrator_with_mock(&dir, &repo, mock);

        let low = orch.create_task("demo", "low", 1, None).unwrap();
        let high = orch.create_task("demo", "high", 5, None).unwrap();
        assert_eq!(
            orch.pending_tasks().iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![high, low]
        );

        let summary = orch.execute_all_tasks().await;
        assert_eq!(summary, BatchSummary { completed: 2, failed: 0, total: 2 });
        assert_eq!(orch.status_summary().pending, 0);
    }

    #[tokio::test]
    async fn custom_goal_names_resolve_to_descriptions() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path().join("repo");
        fs::create_dir(&repo).unwrap();
        fs::write(repo.join("a.py"), "print(1)").unwrap();

        let mock = Arc::new(MockProvider::new().push_response("print(2)"));
        let mut config = config_for(&dir, &repo);
        config
            .goals
            .custom_goals
            .insert("docs".to_string(), "Add or improve documentation".to_string());
        let registry = ProviderRegistry::with_providers(vec![Box::new(Arc::clone(&mock))], "mock");
        let mut orch = Orchestrator::with_registry(config, registry).unwrap();

        let id = orch.create_task("demo", "docs", 1, None).unwrap();
        assert!(orch.execute_task(id).await);
        assert!(mock.prompts()[0].contains("Add or improve documentation"));
    }
}
