//! Keeps the last parsed workbook for the lifetime of a session.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;

use crate::workbook::{Workbook, WorkbookError};

struct CacheEntry {
    path: PathBuf,
    modified: SystemTime,
    workbook: Arc<Workbook>,
}

/// Single-entry cache keyed by workbook path and modification time.
///
/// A different path or a newer (or older) modification time causes a
/// reload. Files whose modification time cannot be read are never cached.
#[derive(Default)]
pub struct WorkbookCache {
    entry: Option<CacheEntry>,
}

impl WorkbookCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Workbook>, WorkbookError> {
        let modified = modified_time(path);

        if let (Some(entry), Some(modified)) = (&self.entry, modified) {
            if entry.path == path && entry.modified == modified {
                debug!(path = %path.display(), "Using cached workbook");
                return Ok(Arc::clone(&entry.workbook));
            }
        }

        debug!(path = %path.display(), "Loading workbook");
        let workbook = Arc::new(Workbook::open(path)?);
        self.entry = modified.map(|modified| CacheEntry {
            path: path.to_path_buf(),
            modified,
            workbook: Arc::clone(&workbook),
        });

        Ok(workbook)
    }

    /// Forget the cached workbook so the next call re-reads the file.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn is_cached(&self, path: &Path) -> bool {
        self.entry.as_ref().is_some_and(|e| e.path == path)
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
