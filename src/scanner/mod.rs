//! Directory scanner for locating input reports.
//!
//! Walks a project tree and collects every file with a given base name,
//! skipping the directory the tool writes its own output to.

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::ReportError;

/// File scanner for discovering report files under a project root.
#[derive(Debug, Clone)]
pub struct FileScanner {
    root: PathBuf,
    exclude_dir: String,
}

impl FileScanner {
    /// Create a new file scanner.
    ///
    /// Directories named `exclude_dir` are not descended into at any depth.
    pub fn new(root: impl Into<PathBuf>, exclude_dir: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            exclude_dir: exclude_dir.into(),
        }
    }

    /// Root directory being scanned.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find all files named `target` under the root.
    ///
    /// Entries are visited in file-name order so repeated runs see the same
    /// sequence. Symlinked directories are not descended into. The first
    /// traversal error aborts the scan.
    pub fn find(&self, target: &str) -> Result<Vec<PathBuf>, ReportError> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry));

        for entry in walker {
            let entry = entry.map_err(|source| ReportError::Walk {
                root: self.root.clone(),
                source,
            })?;

            if entry.file_type().is_dir() {
                continue;
            }

            if entry.file_name() == target {
                debug!("Found {}", entry.path().display());
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Check if an entry is the excluded output directory.
    fn is_excluded(&self, entry: &walkdir::DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry.file_name() == self.exclude_dir.as_str()
    }
}
