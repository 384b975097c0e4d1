//! `mend watch` - periodic batch runs with clean shutdown

use super::batch::create_default_tasks;
use crate::cli::app::WatchArgs;
use anyhow::Result;
use async_trait::async_trait;
use mend_core::schedule::{PeriodicRunner, PeriodicTask};
use mend_core::{Config, Orchestrator};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

struct BatchTask {
    orchestrator: Orchestrator,
}

#[async_trait]
impl PeriodicTask for BatchTask {
    async fn execute(&mut self) -> Result<()> {
        let created = create_default_tasks(&mut self.orchestrator);
        if created == 0 {
            warn!("no tasks to run; check repositories and default_goals");
            return Ok(());
        }

        let summary = self.orchestrator.execute_all_tasks().await;
        info!(
            "watch iteration finished: {} completed, {} failed, {} total",
            summary.completed, summary.failed, summary.total
        );

        // Completed tasks would otherwise accumulate across iterations
        self.orchestrator.clear_completed();
        Ok(())
    }
}

pub async fn execute(args: WatchArgs, config_path: &Path) -> Result<()> {
    let config = Config::from_file(config_path)?;
    let orchestrator = Orchestrator::new(config)?;

    // interval(0) would panic in the runner
    let interval = args.interval.max(1);
    let runner = PeriodicRunner::new(Duration::from_secs(interval));
    let handle = runner.shutdown_handle();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl-C, shutting down");
            handle.stop();
        }
    });

    println!("Watching every {interval}s; press Ctrl-C to stop.");
    let mut task = BatchTask { orchestrator };
    let stats = runner.run(&mut task).await;

    println!("Stopped after {} iteration(s) ({} failed).", stats.runs + stats.failures, stats.failures);
    Ok(())
}
