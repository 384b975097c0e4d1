//! Repository scanning and file discovery
//!
//! Walks a repository tree, filters files by extension and exclusion
//! pattern, and reads contents under a fixed size ceiling. Exclusion
//! patterns are tried three ways against every file: as an exact path
//! segment, as a shell glob over the full path, and as a plain substring
//! of the full path. Any single hit excludes the file.
//!
//! The substring form is intentionally broad: excluding `test` also
//! excludes `testing/`. That breadth is part of the contract, not a bug.

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Files above this size are refused by [`RepoScanner::read_file`]
pub const MAX_FILE_SIZE: u64 = 1024 * 1024;

/// How many entries [`RepoStats::largest_files`] retains
const LARGEST_FILES: usize = 10;

/// Errors raised by scanning and file reads
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("repository path does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("repository path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("file too large ({size} bytes): {}", .path.display())]
    TooLarge { path: PathBuf, size: u64 },

    #[error("file is not valid UTF-8: {}", .0.display())]
    NotUtf8(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
}

impl ScanError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }
}

/// Aggregate statistics over one scan pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepoStats {
    pub total_files: usize,
    pub total_size: u64,
    /// Matching-file count per (lowercased) extension
    pub extensions: BTreeMap<String, usize>,
    /// Top files by size, largest first
    pub largest_files: Vec<FileSizeEntry>,
}

/// One entry in [`RepoStats::largest_files`]
#[derive(Debug, Clone, Serialize)]
pub struct FileSizeEntry {
    pub path: PathBuf,
    pub size: u64,
}

/// Scans repositories for files matching extension and exclusion rules
#[derive(Debug, Default)]
pub struct RepoScanner;

impl RepoScanner {
    pub fn new() -> Self {
        Self
    }

    /// Recursively list every file under `root` that has an allowed
    /// extension and matches no exclusion pattern. Results are sorted for
    /// deterministic processing order.
    pub fn scan(
        &self,
        root: &Path,
        extensions: &[String],
        exclude_patterns: &[String],
    ) -> Result<Vec<PathBuf>, ScanError> {
        if !root.exists() {
            return Err(ScanError::RootNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        info!("scanning repository: {}", root.display());

        let globs = compile_globs(exclude_patterns);
        let mut matching = Vec::new();
        let mut excluded = 0usize;

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("skipping unreadable entry: {}", err);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if is_excluded(path, exclude_patterns, &globs) {
                excluded += 1;
                continue;
            }
            if has_matching_extension(path, extensions) {
                matching.push(path.to_path_buf());
            }
        }

        matching.sort();
        info!("found {} matching files, excluded {}", matching.len(), excluded);
        Ok(matching)
    }

    /// Read a file as UTF-8 text, refusing anything over [`MAX_FILE_SIZE`]
    pub fn read_file(&self, path: &Path) -> Result<String, ScanError> {
        let size = path.metadata().map_err(|e| ScanError::io(path, e))?.len();
        if size > MAX_FILE_SIZE {
            return Err(ScanError::TooLarge { path: path.to_path_buf(), size });
        }

        let bytes = std::fs::read(path).map_err(|e| ScanError::io(path, e))?;
        let content =
            String::from_utf8(bytes).map_err(|_| ScanError::NotUtf8(path.to_path_buf()))?;

        debug!("read file: {} ({} bytes)", path.display(), content.len());
        Ok(content)
    }

    /// True when `root` exists, is a directory, and is non-empty
    pub fn validate_repository(&self, root: &Path) -> bool {
        if !root.is_dir() {
            warn!("repository path missing or not a directory: {}", root.display());
            return false;
        }
        match std::fs::read_dir(root) {
            Ok(mut entries) => {
                if entries.next().is_none() {
                    warn!("repository appears to be empty: {}", root.display());
                    false
                } else {
                    true
                }
            }
            Err(err) => {
                warn!("cannot read repository {}: {}", root.display(), err);
                false
            }
        }
    }

    /// Aggregate size and extension statistics from one scan pass
    pub fn repository_stats(
        &self,
        root: &Path,
        extensions: &[String],
        exclude_patterns: &[String],
    ) -> Result<RepoStats, ScanError> {
        let files = self.scan(root, extensions, exclude_patterns)?;

        let mut stats = RepoStats { total_files: files.len(), ..RepoStats::default() };
        let mut sizes: Vec<FileSizeEntry> = Vec::with_capacity(files.len());

        for path in files {
            let size = match path.metadata() {
                Ok(meta) => meta.len(),
                Err(err) => {
                    warn!("cannot stat {}: {}", path.display(), err);
                    continue;
                }
            };
            stats.total_size += size;

            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| format!(".{}", e.to_lowercase()))
                .unwrap_or_default();
            *stats.extensions.entry(ext).or_insert(0) += 1;

            sizes.push(FileSizeEntry { path, size });
        }

        sizes.sort_by(|a, b| b.size.cmp(&a.size));
        sizes.truncate(LARGEST_FILES);
        stats.largest_files = sizes;

        Ok(stats)
    }
}

/// Compile the glob forms of the exclusion patterns; patterns that are not
/// valid globs still participate via the segment and substring checks.
fn compile_globs(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(err) => debug!("pattern '{}' is not a glob: {}", pattern, err),
        }
    }
    builder.build().unwrap_or_else(|err| {
        warn!("failed to build exclusion glob set: {}", err);
        GlobSet::empty()
    })
}

fn is_excluded(path: &Path, patterns: &[String], globs: &GlobSet) -> bool {
    let path_str = path.to_string_lossy();

    for pattern in patterns {
        // Exact path-segment match
        if path.iter().any(|segment| segment.to_string_lossy() == *pattern) {
            return true;
        }
        // Plain substring match; broad on purpose
        if path_str.contains(pattern.as_str()) {
            return true;
        }
    }

    globs.is_match(path)
}

fn has_matching_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let ext = format!(".{}", ext.to_lowercase());
    extensions.iter().any(|allowed| allowed.to_lowercase() == ext)
}
