//! Uninstall: empties the install directory and removes it.
//!
//! Every entry is attempted even when an earlier one fails; failures are
//! collected and reported together once the loop is done.

use anyhow::Result;
use log::{debug, info, warn};
use std::path::PathBuf;

use crate::error::BootstrapError;
use crate::runtime::Runtime;

/// What an uninstall run removed.
#[derive(Debug, Default, PartialEq)]
pub struct UninstallReport {
    pub removed: Vec<PathBuf>,
    /// False when the install directory did not exist to begin with.
    pub dir_removed: bool,
}

pub struct Uninstaller<'a, R: Runtime> {
    runtime: &'a R,
    install_dir: PathBuf,
}

impl<'a, R: Runtime> Uninstaller<'a, R> {
    pub fn new(runtime: &'a R, install_dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            install_dir: install_dir.into(),
        }
    }

    /// Remove every entry of the install directory, then the directory.
    ///
    /// Returns [`BootstrapError::CleanupError`] listing each entry that could
    /// not be removed. A missing directory is not an error.
    #[tracing::instrument(skip(self))]
    pub fn run(&self) -> Result<UninstallReport> {
        let dir = &self.install_dir;
        if !self.runtime.exists(dir) {
            debug!("Install directory {} does not exist, nothing to do", dir.display());
            return Ok(UninstallReport::default());
        }

        let entries = self.runtime.read_dir(dir).map_err(|e| BootstrapError::CleanupError {
            failures: vec![(dir.clone(), format!("{:#}", e))],
        })?;

        let mut report = UninstallReport::default();
        let mut failures = Vec::new();

        for entry in entries {
            let result = if self.runtime.is_dir(&entry) {
                self.runtime.remove_dir_all(&entry)
            } else {
                self.runtime.remove_file(&entry)
            };

            match result {
                Ok(()) => {
                    println!("   removed {}", entry.display());
                    report.removed.push(entry);
                }
                Err(e) => {
                    warn!("Failed to remove {}: {:#}", entry.display(), e);
                    failures.push((entry, format!("{:#}", e)));
                }
            }
        }

        match self.runtime.remove_dir(dir) {
            Ok(()) => {
                info!("Removed install directory {}", dir.display());
                report.dir_removed = true;
            }
            Err(e) => {
                warn!("Failed to remove {}: {:#}", dir.display(), e);
                failures.push((dir.clone(), format!("{:#}", e)));
            }
        }

        if !failures.is_empty() {
            return Err(BootstrapError::CleanupError { failures }.into());
        }

        Ok(report)
    }
}
