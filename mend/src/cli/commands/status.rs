//! `mend status` - task counters and repository health

use crate::cli::app::StatusArgs;
use anyhow::Result;
use mend_core::{Config, Orchestrator};
use serde_json::json;
use std::path::Path;

pub async fn execute(args: StatusArgs, config_path: &Path) -> Result<()> {
    let config = Config::from_file(config_path)?;
    let orchestrator = Orchestrator::new(config)?;

    let summary = orchestrator.status_summary();
    let repos: Vec<(String, String, bool, Option<usize>)> = orchestrator
        .config()
        .enabled_repositories()
        .map(|repo| {
            let ok = orchestrator.scanner().validate_repository(&repo.path);
            let files = if ok {
                orchestrator
                    .scanner()
                    .scan(&repo.path, &repo.file_extensions, &repo.exclude_patterns)
                    .map(|files| files.len())
                    .ok()
            } else {
                None
            };
            (repo.name.clone(), repo.path.display().to_string(), ok, files)
        })
        .collect();

    if args.json {
        let output = json!({
            "tasks": serde_json::to_value(summary)?,
            "repositories": repos
                .iter()
                .map(|(name, path, ok, files)| {
                    json!({ "name": name, "path": path, "valid": ok, "files": files })
                })
                .collect::<Vec<_>>(),
            "providers": orchestrator.providers().provider_names(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Tasks:");
    println!("  pending:   {}", summary.pending);
    println!("  running:   {}", summary.running);
    println!("  completed: {}", summary.completed);
    println!("  failed:    {}", summary.failed);

    println!("\nRepositories:");
    for (name, path, ok, files) in &repos {
        let files = files.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string());
        println!(
            "  {} {:<20} {:<40} {} file(s)",
            if *ok { "✓" } else { "✗" },
            name,
            path,
            files
        );
    }

    println!("\nProviders: {}", orchestrator.providers().provider_names().join(", "));
    Ok(())
}
