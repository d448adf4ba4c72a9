use std::path::{Path, PathBuf};

use crate::platform::{HostDescriptor, PlatformTag};

/// Name of the install directory under the package root.
pub const BIN_DIR: &str = "bin";

/// Releases page the default asset URLs are built from.
pub const DEFAULT_RELEASES_URL: &str = "https://github.com/aether-engine/aether-cli/releases";

/// Where the provisioner places its artifacts for one host.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallLayout {
    bin_dir: PathBuf,
    binary_name: String,
    windows: bool,
}

impl InstallLayout {
    pub fn new(package_root: &Path, binary_name: &str, host: &HostDescriptor) -> Self {
        Self {
            bin_dir: install_dir(package_root),
            binary_name: binary_name.to_string(),
            windows: host.is_windows(),
        }
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    pub fn binary_name(&self) -> &str {
        &self.binary_name
    }

    pub fn is_windows(&self) -> bool {
        self.windows
    }

    /// `bin/<name>[.exe]`, the path a real binary occupies.
    pub fn binary_path(&self) -> PathBuf {
        let suffix = if self.windows { ".exe" } else { "" };
        self.bin_dir.join(format!("{}{}", self.binary_name, suffix))
    }

    /// Sibling file a download is streamed into before it is moved into place.
    pub fn partial_path(&self) -> PathBuf {
        let mut name = self.binary_path().into_os_string();
        name.push(".part");
        PathBuf::from(name)
    }

    /// Path of the fallback stub. Windows cannot run a script named `.exe`,
    /// so the stub becomes a `.cmd` next to where the binary would be.
    pub fn stub_path(&self) -> PathBuf {
        if self.windows {
            self.bin_dir.join(format!("{}.cmd", self.binary_name))
        } else {
            self.binary_path()
        }
    }
}

/// The install directory for a package root.
pub fn install_dir(package_root: &Path) -> PathBuf {
    package_root.join(BIN_DIR)
}

/// Location of published release assets.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseSource {
    base_url: String,
}

impl ReleaseSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Human-facing releases page, quoted by the fallback stub.
    pub fn releases_page(&self) -> &str {
        &self.base_url
    }

    /// `{base}/latest/download/{name}-{tag}{suffix}`
    pub fn asset_url(&self, binary_name: &str, tag: PlatformTag) -> String {
        format!(
            "{}/latest/download/{}-{}{}",
            self.base_url,
            binary_name,
            tag,
            tag.exe_suffix()
        )
    }
}

impl Default for ReleaseSource {
    fn default() -> Self {
        Self::new(DEFAULT_RELEASES_URL)
    }
}
