//! Source file modification tracking for hot-reload
//!
//! The core never polls on its own schedule; the host's frame loop (or an
//! explicit reload action) calls `changed()` and decides when to recompile.
//! Detection is a synchronous `fs::metadata` stat per file, cheap enough to
//! run on the render thread.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One watched file and the mtime snapshot taken at the last successful
/// compile. A missing file snapshots as `None`.
#[derive(Debug, Clone)]
struct WatchedFile {
    path: PathBuf,
    mtime: Option<SystemTime>,
}

/// The ordered set of files contributing to the currently compiled program:
/// stage sources plus every transitively included file.
///
/// Path and snapshot live in one record, so the lists cannot fall out of
/// step.
#[derive(Debug, Clone, Default)]
pub struct MonitoredFiles {
    files: Vec<WatchedFile>,
}

fn mtime_of(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

impl MonitoredFiles {
    /// Start watching `paths` with no snapshot taken yet; call `update()`
    /// once the sources have been successfully compiled.
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            files: paths
                .into_iter()
                .map(|path| WatchedFile { path, mtime: None })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|f| f.path.as_path())
    }

    /// Re-snapshot every watched file's mtime
    pub fn update(&mut self) {
        for file in &mut self.files {
            file.mtime = mtime_of(&file.path);
        }
    }

    /// Has any watched file's mtime moved since the last `update()`?
    /// A file that has disappeared counts as changed.
    pub fn changed(&self) -> bool {
        self.files
            .iter()
            .any(|file| mtime_of(&file.path) != file.mtime)
    }
}
