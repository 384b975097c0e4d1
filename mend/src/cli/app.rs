use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mend",
    version,
    about = "Mend - Goal-driven code improvement across your repositories",
    long_about = "Mend scans configured repositories for matching files, asks a \
                  text-generation backend for an improved version of each file, and \
                  applies the result with backup-before-write."
)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "mend.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize mend in the current directory
    #[command(about = "Create the backup directory and write an example configuration")]
    Init,

    /// Run a single improvement task
    #[command(about = "Run one goal over one repository")]
    Run(RunArgs),

    /// Run every default goal over every enabled repository
    #[command(about = "Create and execute tasks for all repositories and default goals")]
    Batch,

    /// Re-run the batch on a fixed interval until interrupted
    #[command(about = "Run the batch periodically, stopping cleanly on Ctrl-C")]
    Watch(WatchArgs),

    /// Show task and repository status
    #[command(about = "Show task counters and per-repository health")]
    Status(StatusArgs),

    /// Show repository statistics
    #[command(about = "Show file counts, sizes, and largest files for a repository")]
    Stats(StatsArgs),

    /// Test provider connectivity
    #[command(about = "Smoke-test the configured provider backends")]
    Check(CheckArgs),

    /// Manage file backups
    #[command(subcommand, about = "List, restore, or clean up backups")]
    Backups(BackupsCommand),
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Repository name from the configuration
    #[arg(short, long)]
    pub repo: String,

    /// Improvement goal: a custom-goal name or free text
    #[arg(short, long)]
    pub goal: String,

    /// Provider backend to use instead of the configured default
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Task priority (higher runs sooner in batches)
    #[arg(long, default_value_t = 1)]
    pub priority: i32,
}

#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Seconds between batch runs
    #[arg(short, long, default_value_t = 300)]
    pub interval: u64,
}

#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Repository name from the configuration
    #[arg(short, long)]
    pub repo: String,

    /// Emit machine-readable JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Only test this provider
    #[arg(short, long)]
    pub provider: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum BackupsCommand {
    /// List backups, newest first
    List {
        /// Only backups for this original file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Restore a file from a backup copy
    Restore {
        /// File to restore
        #[arg(short, long)]
        file: PathBuf,
        /// Backup to restore from
        #[arg(short, long)]
        backup: PathBuf,
    },
    /// Delete all but the most recent backups
    Clean {
        /// How many backups to keep
        #[arg(short, long, default_value_t = 10)]
        keep: usize,
    },
}
