//! Error taxonomy for the bootstrap installer.
//!
//! Call sites work with `anyhow::Result`; these types are what callers
//! `downcast_ref` to when they need to tell one failure kind from another.

use std::path::PathBuf;

/// Why a release download did not produce a binary.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadFailure {
    /// Terminal HTTP status other than 200
    Status(u16),
    /// Redirect received after the hop budget was spent
    TooManyRedirects { limit: usize },
    /// 301/302 without a usable `Location` header
    MissingLocation { status: u16 },
    /// `Location` header that could not be resolved to a URL
    InvalidLocation(String),
    /// Connection, TLS, timeout or body stream error
    Transport(String),
}

impl std::fmt::Display for DownloadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DownloadFailure::Status(code) => write!(f, "server responded with HTTP {}", code),
            DownloadFailure::TooManyRedirects { limit } => {
                write!(f, "too many redirects (limit is {})", limit)
            }
            DownloadFailure::MissingLocation { status } => {
                write!(f, "HTTP {} redirect without a Location header", status)
            }
            DownloadFailure::InvalidLocation(location) => {
                write!(f, "invalid redirect location: {}", location)
            }
            DownloadFailure::Transport(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

#[derive(Debug)]
pub enum BootstrapError {
    /// Host OS/arch outside the supported set. Never recovered.
    UnsupportedPlatform { os: String, arch: String },
    /// Release asset could not be fetched.
    DownloadFailed(DownloadFailure),
    /// Filesystem error while placing a file in the install directory.
    LocalWriteError { path: PathBuf, message: String },
    /// One or more entries could not be removed during uninstall.
    CleanupError { failures: Vec<(PathBuf, String)> },
}

impl BootstrapError {
    pub fn local_write(path: impl Into<PathBuf>, error: impl std::fmt::Display) -> Self {
        BootstrapError::LocalWriteError {
            path: path.into(),
            message: error.to_string(),
        }
    }

    /// Errors the provisioner may answer with the fallback stub.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BootstrapError::DownloadFailed(_) | BootstrapError::LocalWriteError { .. }
        )
    }
}

impl std::fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BootstrapError::UnsupportedPlatform { os, arch } => {
                write!(f, "Unsupported platform: {} ({})", os, arch)
            }
            BootstrapError::DownloadFailed(failure) => write!(f, "Download failed: {}", failure),
            BootstrapError::LocalWriteError { path, message } => {
                write!(f, "Failed to write {}: {}", path.display(), message)
            }
            BootstrapError::CleanupError { failures } => {
                write!(f, "Failed to remove {} item(s):", failures.len())?;
                for (path, message) in failures {
                    write!(f, " {} ({});", path.display(), message)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for BootstrapError {}

impl From<DownloadFailure> for BootstrapError {
    fn from(failure: DownloadFailure) -> Self {
        BootstrapError::DownloadFailed(failure)
    }
}
