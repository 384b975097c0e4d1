//! `mend backups` - list, restore, and clean up backups

use crate::cli::app::BackupsCommand;
use anyhow::Result;
use mend_core::Config;
use mend_core::writer::FileWriter;
use std::path::Path;

pub async fn execute(command: BackupsCommand, config_path: &Path) -> Result<()> {
    let config = Config::from_file(config_path)?;
    let writer = FileWriter::new(&config.file_processing)?;

    match command {
        BackupsCommand::List { file } => {
            let backups = writer.list_backups(file.as_deref());
            if backups.is_empty() {
                println!("No backups found.");
                return Ok(());
            }
            for backup in backups {
                println!(
                    "{}  {:>10} bytes  {}",
                    backup.modified.format("%Y-%m-%d %H:%M:%S"),
                    backup.size,
                    backup.name
                );
            }
        }
        BackupsCommand::Restore { file, backup } => {
            writer.restore_from_backup(&file, &backup)?;
            println!("Restored {} from {}", file.display(), backup.display());
        }
        BackupsCommand::Clean { keep } => {
            let deleted = writer.cleanup_old_backups(keep);
            println!("Deleted {deleted} backup(s), kept the {keep} most recent.");
        }
    }

    Ok(())
}
