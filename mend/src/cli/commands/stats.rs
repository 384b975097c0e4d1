//! `mend stats` - repository statistics

use crate::cli::app::StatsArgs;
use anyhow::{Result, bail};
use mend_core::Config;
use mend_core::scan::RepoScanner;
use std::path::Path;

pub async fn execute(args: StatsArgs, config_path: &Path) -> Result<()> {
    let config = Config::from_file(config_path)?;
    let Some(repo) = config.repository(&args.repo) else {
        bail!("repository '{}' not found in configuration or disabled", args.repo);
    };

    let scanner = RepoScanner::new();
    let stats =
        scanner.repository_stats(&repo.path, &repo.file_extensions, &repo.exclude_patterns)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Repository: {} ({})", repo.name, repo.path.display());
    println!("  matching files: {}", stats.total_files);
    println!("  total size:     {} bytes", stats.total_size);

    if !stats.extensions.is_empty() {
        println!("  by extension:");
        for (ext, count) in &stats.extensions {
            println!("    {ext:<8} {count}");
        }
    }

    if !stats.largest_files.is_empty() {
        println!("  largest files:");
        for entry in &stats.largest_files {
            println!("    {:>10} bytes  {}", entry.size, entry.path.display());
        }
    }

    Ok(())
}
