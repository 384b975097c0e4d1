//! `mend init` - set up configuration and directories

use anyhow::{Context, Result};
use mend_core::config::EXAMPLE_CONFIG;
use std::path::Path;
use tracing::info;

pub async fn execute(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("Configuration file already exists: {}", config_path.display());
    } else {
        std::fs::write(config_path, EXAMPLE_CONFIG.trim_start())
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        println!("Wrote example configuration: {}", config_path.display());
        println!("Edit it to register your repositories and providers.");
    }

    std::fs::create_dir_all("backups").context("failed to create backups directory")?;
    info!("initialization complete");
    println!("Initialization complete.");
    Ok(())
}
