//! `mend check` - provider connectivity smoke tests

use crate::cli::app::CheckArgs;
use anyhow::{Result, bail};
use mend_core::provider::ProviderRegistry;
use mend_core::Config;
use std::path::Path;

pub async fn execute(args: CheckArgs, config_path: &Path) -> Result<()> {
    let config = Config::from_file(config_path)?;
    let registry = ProviderRegistry::from_config(&config);

    let names: Vec<String> = match &args.provider {
        Some(name) => vec![name.clone()],
        None => registry.provider_names().iter().map(|n| n.to_string()).collect(),
    };
    if names.is_empty() {
        bail!("no providers configured");
    }

    let mut failures = 0;
    for name in &names {
        println!("Testing {name}...");
        if registry.test_connection(Some(name)).await {
            println!("  ✓ {name} connection successful");
        } else {
            println!("  ✗ {name} connection failed");
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{failures} provider(s) failed the connection test");
    }
    Ok(())
}
