use log::{debug, warn};
use std::path::PathBuf;

use crate::runtime::Runtime;

/// Removes a partially written file when dropped, unless marked successful.
pub struct PartialFileGuard<'a, R: Runtime> {
    runtime: &'a R,
    path: Option<PathBuf>,
}

impl<'a, R: Runtime> PartialFileGuard<'a, R> {
    pub fn new(runtime: &'a R, path: PathBuf) -> Self {
        Self {
            runtime,
            path: Some(path),
        }
    }

    /// Follow the file to a new location, e.g. after a rename.
    pub fn track(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    /// Mark the write as complete; the file is kept.
    pub fn success(mut self) {
        self.path = None;
    }
}

impl<R: Runtime> Drop for PartialFileGuard<'_, R> {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        if !self.runtime.exists(&path) {
            return;
        }
        debug!("Cleaning up: {:?}", path);
        if let Err(e) = self.runtime.remove_file(&path) {
            warn!("Failed to remove partial file {}: {:#}", path.display(), e);
        }
    }
}
