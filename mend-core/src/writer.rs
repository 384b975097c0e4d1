//! File rewriting with backup-before-write
//!
//! Replacement content goes through one gate: if the trimmed old and new
//! contents are equal nothing happens; otherwise a timestamped backup copy
//! is taken first (when enabled) and the overwrite only proceeds after the
//! backup succeeded. Every change is logged as a unified diff, including
//! in preview mode where no write is performed at all.

use crate::config::FileProcessingConfig;
use chrono::{DateTime, Local};
use similar::TextDiff;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised by rewrite and backup operations
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: std::io::Error },

    #[error("failed to back up {}: {source}", .path.display())]
    Backup { path: PathBuf, source: std::io::Error },

    #[error("backup file does not exist: {}", .0.display())]
    BackupMissing(PathBuf),

    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: std::io::Error },
}

/// What a successful [`FileWriter::apply_changes`] call actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// File was overwritten (backup taken first when enabled)
    Applied,
    /// Old and new content are equal after trimming; nothing touched
    Unchanged,
    /// Auto-apply is off; diff logged, file untouched
    Preview,
}

/// One backup file, as reported by [`FileWriter::list_backups`]
#[derive(Debug, Clone)]
pub struct BackupEntry {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Local>,
}

/// Applies replacement content to files, with backups and diff logging
pub struct FileWriter {
    backup_dir: PathBuf,
    auto_apply: bool,
    backup_original: bool,
}

impl FileWriter {
    /// Create a writer and ensure the backup directory exists
    pub fn new(config: &FileProcessingConfig) -> Result<Self, WriterError> {
        std::fs::create_dir_all(&config.backup_directory).map_err(|source| {
            WriterError::CreateDir { path: config.backup_directory.clone(), source }
        })?;

        Ok(Self {
            backup_dir: config.backup_directory.clone(),
            auto_apply: config.auto_apply_changes,
            backup_original: config.backup_original_files,
        })
    }

    /// Replace a file's content.
    ///
    /// Equal-after-trim content short-circuits to [`ApplyOutcome::Unchanged`]
    /// with no backup and no write, which also makes the operation
    /// idempotent. A failed backup aborts before anything is written.
    pub fn apply_changes(
        &self,
        path: &Path,
        new_content: &str,
    ) -> Result<ApplyOutcome, WriterError> {
        let original = std::fs::read_to_string(path)
            .map_err(|source| WriterError::Read { path: path.to_path_buf(), source })?;

        if original.trim() == new_content.trim() {
            info!("no changes needed for {}", path.display());
            return Ok(ApplyOutcome::Unchanged);
        }

        if self.backup_original {
            let backup_path = self.create_backup(path)?;
            debug!("created backup: {}", backup_path.display());
        }

        self.log_diff(path, &original, new_content);

        if !self.auto_apply {
            info!("preview mode: would apply changes to {}", path.display());
            return Ok(ApplyOutcome::Preview);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|source| WriterError::CreateDir { path: parent.to_path_buf(), source })?;
        }
        std::fs::write(path, new_content)
            .map_err(|source| WriterError::Write { path: path.to_path_buf(), source })?;

        info!("applied changes to {}", path.display());
        Ok(ApplyOutcome::Applied)
    }

    /// Copy `path` into the backup directory as `{stem}_{timestamp}{suffix}`.
    ///
    /// Timestamps carry second resolution; two backups of the same stem in
    /// the same second collide and the later copy wins. Accepted race.
    fn create_backup(&self, path: &Path) -> Result<PathBuf, WriterError> {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
        let suffix = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let backup_path = self.backup_dir.join(format!("{stem}_{timestamp}{suffix}"));

        std::fs::copy(path, &backup_path)
            .map_err(|source| WriterError::Backup { path: path.to_path_buf(), source })?;
        Ok(backup_path)
    }

    fn log_diff(&self, path: &Path, original: &str, new_content: &str) {
        let diff = TextDiff::from_lines(original, new_content);
        let header = path.display().to_string();
        let unified = diff.unified_diff().context_radius(3).header(&header, &header).to_string();

        if unified.is_empty() {
            info!("no changes detected for {}", path.display());
        } else {
            info!("changes for {}:\n{}", path.display(), unified);
        }
    }

    /// Copy a backup over the original
    pub fn restore_from_backup(&self, path: &Path, backup_path: &Path) -> Result<(), WriterError> {
        if !backup_path.exists() {
            return Err(WriterError::BackupMissing(backup_path.to_path_buf()));
        }

        std::fs::copy(backup_path, path)
            .map_err(|source| WriterError::Write { path: path.to_path_buf(), source })?;
        info!("restored {} from backup {}", path.display(), backup_path.display());
        Ok(())
    }

    /// List backups, newest first. With `for_path`, only backups whose
    /// filename contains the original file's stem are returned; this is a
    /// substring match and shares the scanner's accepted false-positive
    /// breadth.
    pub fn list_backups(&self, for_path: Option<&Path>) -> Vec<BackupEntry> {
        let entries = match std::fs::read_dir(&self.backup_dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("cannot read backup directory {}: {}", self.backup_dir.display(), err);
                return Vec::new();
            }
        };

        let stem_filter = for_path
            .and_then(|p| p.file_stem())
            .and_then(|s| s.to_str())
            .map(|s| s.to_string());

        let mut backups: Vec<BackupEntry> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let path = entry.path();
                let name = path.file_name()?.to_str()?.to_string();
                if let Some(stem) = &stem_filter {
                    let backup_stem = path.file_stem()?.to_str()?;
                    if !backup_stem.contains(stem.as_str()) {
                        return None;
                    }
                }
                let meta = entry.metadata().ok()?;
                let modified = meta.modified().ok()?;
                Some(BackupEntry { path, name, size: meta.len(), modified: modified.into() })
            })
            .collect();

        backups.sort_by(|a, b| b.modified.cmp(&a.modified));
        backups
    }

    /// Delete all but the `keep` most recently modified backups. The cap is
    /// global across originals, not per file. Returns how many were deleted.
    pub fn cleanup_old_backups(&self, keep: usize) -> usize {
        let backups = self.list_backups(None);
        if backups.len() <= keep {
            return 0;
        }

        let mut deleted = 0;
        for backup in &backups[keep..] {
            match std::fs::remove_file(&backup.path) {
                Ok(()) => {
                    info!("deleted old backup: {}", backup.name);
                    deleted += 1;
                }
                Err(err) => warn!("failed to delete backup {}: {}", backup.name, err),
            }
        }
        deleted
    }

    /// An existing path must be a regular writable file; an absent path
    /// needs a writable parent directory.
    pub fn validate_path(&self, path: &Path) -> bool {
        if path.exists() {
            let Ok(meta) = path.metadata() else {
                return false;
            };
            if !meta.is_file() {
                warn!("path is not a file: {}", path.display());
                return false;
            }
            if meta.permissions().readonly() {
                warn!("file is not writable: {}", path.display());
                return false;
            }
            return true;
        }

        match path.parent().map(|p| p.metadata()) {
            Some(Ok(meta)) => !meta.permissions().readonly(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn writer(dir: &TempDir, auto_apply: bool, backup: bool) -> FileWriter {
        FileWriter::new(&FileProcessingConfig {
            backup_directory: dir.path().join("backups"),
            auto_apply_changes: auto_apply,
            backup_original_files: backup,
        })
        .unwrap()
    }

    #[test]
    fn apply_writes_and_backs_up() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.py");
        fs::write(&file, "print(1)").unwrap();

        let writer = writer(&dir, true, true);
        let outcome = writer.apply_changes(&file, "def f(): pass").unwrap();

        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(fs::read_to_string(&file).unwrap(), "def f(): pass");

        let backups = writer.list_backups(Some(&file));
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0].path).unwrap(), "print(1)");
    }

    #[test]
    fn apply_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.py");
        fs::write(&file, "print(1)").unwrap();

        let writer = writer(&dir, true, true);
        assert_eq!(writer.apply_changes(&file, "print(2)").unwrap(), ApplyOutcome::Applied);
        assert_eq!(writer.apply_changes(&file, "print(2)").unwrap(), ApplyOutcome::Unchanged);

        // The no-op second call must not have produced a second backup
        assert_eq!(writer.list_backups(None).len(), 1);
    }

    #[test]
    fn trimmed_equality_skips_backup_and_write() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.py");
        fs::write(&file, "print(1)\n").unwrap();

        let writer = writer(&dir, true, true);
        let outcome = writer.apply_changes(&file, "  print(1)  ").unwrap();

        assert_eq!(outcome, ApplyOutcome::Unchanged);
        assert_eq!(fs::read_to_string(&file).unwrap(), "print(1)\n");
        assert!(writer.list_backups(None).is_empty());
    }

    #[test]
    fn failed_backup_aborts_the_write() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.py");
        fs::write(&file, "print(1)").unwrap();

        let writer = writer(&dir, true, true);
        // Turning the backup directory into a file makes the copy fail
        fs::remove_dir_all(dir.path().join("backups")).unwrap();
        fs::write(dir.path().join("backups"), "not a directory").unwrap();

        let err = writer.apply_changes(&file, "print(2)").unwrap_err();
        assert!(matches!(err, WriterError::Backup { .. }));
        assert_eq!(fs::read_to_string(&file).unwrap(), "print(1)");
    }

    #[test]
    fn preview_mode_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.py");
        fs::write(&file, "print(1)").unwrap();

        let writer = writer(&dir, false, true);
        let outcome = writer.apply_changes(&file, "print(2)").unwrap();

        assert_eq!(outcome, ApplyOutcome::Preview);
        assert_eq!(fs::read_to_string(&file).unwrap(), "print(1)");
        // Preview still takes the backup before reporting the diff
        assert_eq!(writer.list_backups(None).len(), 1);
    }

    #[test]
    fn unreadable_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let writer = writer(&dir, true, true);

        let err = writer.apply_changes(&dir.path().join("missing.py"), "x").unwrap_err();
        assert!(matches!(err, WriterError::Read { .. }));
    }

    #[test]
    fn restore_copies_backup_over_original() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.py");
        fs::write(&file, "print(1)").unwrap();

        let writer = writer(&dir, true, true);
        writer.apply_changes(&file, "print(2)").unwrap();

        let backup = writer.list_backups(Some(&file)).remove(0);
        writer.restore_from_backup(&file, &backup.path).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "print(1)");
    }

    #[test]
    fn restore_requires_an_existing_backup() {
        let dir = TempDir::new().unwrap();
        let writer = writer(&dir, true, true);

        let err = writer
            .restore_from_backup(&dir.path().join("a.py"), &dir.path().join("gone.py"))
            .unwrap_err();
        assert!(matches!(err, WriterError::BackupMissing(_)));
    }

    #[test]
    fn cleanup_keeps_most_recent_backups() {
        let dir = TempDir::new().unwrap();
        let writer = writer(&dir, true, true);
        let backup_dir = dir.path().join("backups");

        // Fabricate backups with distinct modification times
        for (name, age) in
            [("a_20240101_000000.py", 300), ("b_20240102_000000.py", 200), ("c_20240103_000000.py", 100)]
        {
            let path = backup_dir.join(name);
            fs::write(&path, "x").unwrap();
            let mtime = std::time::SystemTime::now() - std::time::Duration::from_secs(age);
            let file = fs::File::options().write(true).open(&path).unwrap();
            file.set_modified(mtime).unwrap();
        }

        let deleted = writer.cleanup_old_backups(2);
        assert_eq!(deleted, 1);

        let remaining = writer.list_backups(None);
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|b| b.name != "a_20240101_000000.py"));
    }

    #[test]
    fn list_backups_filters_by_stem_substring() {
        let dir = TempDir::new().unwrap();
        let writer = writer(&dir, true, true);
        let backup_dir = dir.path().join("backups");

        fs::write(backup_dir.join("app_20240101_000000.py"), "x").unwrap();
        fs::write(backup_dir.join("other_20240101_000000.py"), "y").unwrap();

        let backups = writer.list_backups(Some(Path::new("/repo/app.py")));
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].name, "app_20240101_000000.py");
    }

    #[test]
    fn validate_path_accepts_writable_targets() {
        let dir = TempDir::new().unwrap();
        let writer = writer(&dir, true, true);

        let existing = dir.path().join("a.py");
        fs::write(&existing, "x").unwrap();
        assert!(writer.validate_path(&existing));

        // Absent file in a writable directory
        assert!(writer.validate_path(&dir.path().join("new.py")));

        // Directory, not a file
        assert!(!writer.validate_path(dir.path()));
    }
}
