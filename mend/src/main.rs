use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Parse CLI arguments first to get verbosity level
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        2.. => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let runtime = tokio::runtime::Runtime::new()?;
    match cli.command {
        Commands::Init => {
            runtime.block_on(cli::commands::init::execute(&cli.config))?;
        }
        Commands::Run(args) => {
            runtime.block_on(cli::commands::run::execute(args, &cli.config))?;
        }
        Commands::Batch => {
            runtime.block_on(cli::commands::batch::execute(&cli.config))?;
        }
        Commands::Watch(args) => {
            runtime.block_on(cli::commands::watch::execute(args, &cli.config))?;
        }
        Commands::Status(args) => {
            runtime.block_on(cli::commands::status::execute(args, &cli.config))?;
        }
        Commands::Stats(args) => {
            runtime.block_on(cli::commands::stats::execute(args, &cli.config))?;
        }
        Commands::Check(args) => {
            runtime.block_on(cli::commands::check::execute(args, &cli.config))?;
        }
        Commands::Backups(command) => {
            runtime.block_on(cli::commands::backups::execute(command, &cli.config))?;
        }
    }

    Ok(())
}
