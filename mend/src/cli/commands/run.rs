//! `mend run` - execute one task

use crate::cli::app::RunArgs;
use anyhow::{Result, bail};
use mend_core::{Config, Orchestrator};
use std::path::Path;

pub async fn execute(args: RunArgs, config_path: &Path) -> Result<()> {
    let config = Config::from_file(config_path)?;
    let mut orchestrator = Orchestrator::new(config)?;

    let id = orchestrator.create_task(&args.repo, &args.goal, args.priority, args.provider)?;
    let ok = orchestrator.execute_task(id).await;

    if let Some(report) = orchestrator.task_report(id) {
        println!(
            "Task {id}: {} matched, {} processed, {} skipped",
            report.files_matched, report.files_processed, report.files_skipped
        );
    }

    if !ok {
        bail!("task failed");
    }
    println!("Task completed successfully.");
    Ok(())
}
