//! `mend batch` - run every default goal over every enabled repository

use anyhow::{Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use mend_core::{Config, Orchestrator};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

pub async fn execute(config_path: &Path) -> Result<()> {
    let config = Config::from_file(config_path)?;
    let mut orchestrator = Orchestrator::new(config)?;

    let created = create_default_tasks(&mut orchestrator);
    if created == 0 {
        bail!("no tasks created; check repositories and default_goals in the configuration");
    }

    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    bar.set_message(format!("executing {created} task(s)..."));
    bar.enable_steady_tick(Duration::from_millis(120));

    let summary = orchestrator.execute_all_tasks().await;
    bar.finish_and_clear();

    println!("Batch finished.");
    println!("  completed: {}", summary.completed);
    println!("  failed:    {}", summary.failed);
    println!("  total:     {}", summary.total);

    if summary.failed > 0 {
        bail!("{} task(s) failed", summary.failed);
    }
    Ok(())
}

/// Pair every enabled repository with every default goal
pub fn create_default_tasks(orchestrator: &mut Orchestrator) -> usize {
    let pairs: Vec<(String, String)> = orchestrator
        .config()
        .enabled_repositories()
        .flat_map(|repo| {
            orchestrator
                .config()
                .goals
                .default_goals
                .iter()
                .map(|goal| (repo.name.clone(), goal.clone()))
        })
        .collect();

    let mut created = 0;
    for (repo, goal) in pairs {
        match orchestrator.create_task(&repo, &goal, 1, None) {
            Ok(_) => created += 1,
            Err(err) => warn!("could not create task for {repo}: {err}"),
        }
    }
    created
}
