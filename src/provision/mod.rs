//! Binary provisioning.
//!
//! Ensures the install directory holds something runnable under the tool's
//! name, trying in order:
//!
//! 1. a non-empty binary already bundled at the target path,
//! 2. the release asset for the resolved platform, downloaded once,
//! 3. a fallback stub that explains where to get the tool and exits 1.
//!
//! Download and local write failures are answered with the stub, so an
//! install only fails when the platform itself is unsupported or the stub
//! cannot be written.

mod guard;
mod layout;
mod stub;

use anyhow::Result;
use log::{debug, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{BootstrapError, DownloadFailure};
use crate::http::{HttpClient, Transport};
use crate::platform::{self, HostDescriptor};
use crate::runtime::Runtime;

use guard::PartialFileGuard;
pub use layout::{BIN_DIR, DEFAULT_RELEASES_URL, InstallLayout, ReleaseSource, install_dir};

/// `rwxr-xr-x`
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Where a real binary came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactSource {
    Bundled,
    Downloaded { bytes: u64 },
}

/// What ended up at the install location. Exactly one per install run.
#[derive(Debug, Clone, PartialEq)]
pub enum InstalledArtifact {
    RealBinary { path: PathBuf, source: ArtifactSource },
    FallbackStub { path: PathBuf, reason: String },
}

impl InstalledArtifact {
    pub fn path(&self) -> &Path {
        match self {
            InstalledArtifact::RealBinary { path, .. } => path,
            InstalledArtifact::FallbackStub { path, .. } => path,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, InstalledArtifact::FallbackStub { .. })
    }
}

pub struct Provisioner<R: Runtime, T: Transport> {
    runtime: R,
    http_client: HttpClient<T>,
    layout: InstallLayout,
    release: ReleaseSource,
}

impl<R: Runtime, T: Transport> Provisioner<R, T> {
    pub fn new(
        runtime: R,
        http_client: HttpClient<T>,
        layout: InstallLayout,
        release: ReleaseSource,
    ) -> Self {
        Self {
            runtime,
            http_client,
            layout,
            release,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn provision(&self, host: &HostDescriptor) -> Result<InstalledArtifact> {
        if let Some(artifact) = self.use_bundled() {
            self.remove_stale_stub();
            return Ok(artifact);
        }

        match self.download(host).await {
            Ok(bytes) => {
                self.remove_stale_stub();
                Ok(InstalledArtifact::RealBinary {
                    path: self.layout.binary_path(),
                    source: ArtifactSource::Downloaded { bytes },
                })
            }
            Err(e) => {
                if e
                    .downcast_ref::<BootstrapError>()
                    .is_some_and(|err| !err.is_recoverable())
                {
                    return Err(e);
                }
                warn!(
                    "Could not install {} binary: {:#}",
                    self.layout.binary_name(),
                    e
                );
                self.install_stub(format!("{:#}", e))
            }
        }
    }

    /// Stage 1: accept a non-empty regular file that is already in place.
    fn use_bundled(&self) -> Option<InstalledArtifact> {
        let path = self.layout.binary_path();
        if !self.runtime.is_file(&path) {
            debug!("No bundled binary file at {}", path.display());
            return None;
        }

        match self.runtime.file_len(&path) {
            Ok(0) => {
                info!("Bundled binary at {} is empty, ignoring it", path.display());
                return None;
            }
            Ok(len) if len <= stub::MAX_STUB_LEN && self.is_stub(&path) => {
                info!(
                    "Found fallback stub from an earlier install at {}, retrying download",
                    path.display()
                );
                return None;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Could not inspect {}: {:#}", path.display(), e);
                return None;
            }
        }

        if let Err(e) = self.runtime.set_permissions(&path, EXECUTABLE_MODE) {
            warn!(
                "Bundled binary at {} could not be made executable: {:#}",
                path.display(),
                e
            );
            return None;
        }

        info!("Using bundled binary at {}", path.display());
        Some(InstalledArtifact::RealBinary {
            path,
            source: ArtifactSource::Bundled,
        })
    }

    fn is_stub(&self, path: &Path) -> bool {
        self.runtime
            .read_to_string(path)
            .is_ok_and(|contents| stub::is_stub(&contents))
    }

    /// Stage 2: fetch the release asset and move it into place.
    async fn download(&self, host: &HostDescriptor) -> Result<u64> {
        let tag = platform::resolve(host)?;
        let url = self.release.asset_url(self.layout.binary_name(), tag);
        info!("Downloading {} from {}...", tag, url);
        println!("   downloading {}", url);

        let mut response = self
            .http_client
            .fetch(&url)
            .await
            .map_err(BootstrapError::from)?;

        let bin_dir = self.layout.bin_dir();
        self.runtime
            .create_dir_all(bin_dir)
            .map_err(|e| BootstrapError::local_write(bin_dir, format!("{:#}", e)))?;

        let partial = self.layout.partial_path();
        let mut guard = PartialFileGuard::new(&self.runtime, partial.clone());
        let mut writer = self
            .runtime
            .create_file(&partial)
            .map_err(|e| BootstrapError::local_write(&partial, format!("{:#}", e)))?;

        let mut bytes: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            BootstrapError::from(DownloadFailure::Transport(format!("{:#}", e)))
        })? {
            writer
                .write_all(&chunk)
                .map_err(|e| BootstrapError::local_write(&partial, e))?;
            bytes += chunk.len() as u64;
        }
        writer
            .flush()
            .map_err(|e| BootstrapError::local_write(&partial, e))?;
        drop(writer);

        let path = self.layout.binary_path();
        self.runtime
            .rename(&partial, &path)
            .map_err(|e| BootstrapError::local_write(&path, format!("{:#}", e)))?;
        guard.track(path.clone());

        self.runtime
            .set_permissions(&path, EXECUTABLE_MODE)
            .map_err(|e| BootstrapError::local_write(&path, format!("{:#}", e)))?;
        guard.success();

        debug!(
            "Downloaded {:.2} MB to {}",
            bytes as f64 / (1024.0 * 1024.0),
            path.display()
        );
        Ok(bytes)
    }

    /// Stage 3: write the stub that defers the failure to first use.
    fn install_stub(&self, reason: String) -> Result<InstalledArtifact> {
        let bin_dir = self.layout.bin_dir();
        self.runtime
            .create_dir_all(bin_dir)
            .map_err(|e| BootstrapError::local_write(bin_dir, format!("{:#}", e)))?;

        let stub_path = self.layout.stub_path();
        let binary_path = self.layout.binary_path();
        if stub_path != binary_path && self.runtime.exists(&binary_path) {
            // would shadow the stub on PATH
            if let Err(e) = self.runtime.remove_file(&binary_path) {
                warn!("Failed to remove {}: {:#}", binary_path.display(), e);
            }
        }

        let contents = stub::render(
            self.layout.binary_name(),
            self.release.releases_page(),
            self.layout.is_windows(),
        );
        self.runtime
            .write(&stub_path, contents.as_bytes())
            .map_err(|e| BootstrapError::local_write(&stub_path, format!("{:#}", e)))?;
        self.runtime
            .set_permissions(&stub_path, EXECUTABLE_MODE)
            .map_err(|e| BootstrapError::local_write(&stub_path, format!("{:#}", e)))?;

        info!("Installed fallback stub at {}", stub_path.display());
        Ok(InstalledArtifact::FallbackStub {
            path: stub_path,
            reason,
        })
    }

    /// Drop a stub left by an earlier run when it lives at its own path.
    fn remove_stale_stub(&self) {
        let stub_path = self.layout.stub_path();
        if stub_path == self.layout.binary_path() || !self.runtime.exists(&stub_path) {
            return;
        }
        debug!("Removing stale stub {}", stub_path.display());
        if let Err(e) = self.runtime.remove_file(&stub_path) {
            warn!("Failed to remove {}: {:#}", stub_path.display(), e);
        }
    }
}
