use anyhow::Result;
use log::debug;
use std::path::PathBuf;
use std::time::Duration;

use crate::http::DEFAULT_MAX_HOPS;
use crate::platform::HostDescriptor;
use crate::provision::{DEFAULT_RELEASES_URL, InstallLayout, ReleaseSource, install_dir};
use crate::runtime::Runtime;

use super::paths::default_package_root;

/// Name of the installed executable.
pub const BINARY_NAME: &str = "aether";

/// Longest a download may wait for the next piece of data.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub package_root: PathBuf,
    pub release_url: String,
    pub binary_name: String,
    pub timeout: Duration,
    pub max_redirects: usize,
}

impl Config {
    pub fn new<R: Runtime>(
        runtime: &R,
        package_root: Option<PathBuf>,
        release_url: Option<String>,
    ) -> Result<Self> {
        let package_root = match package_root {
            Some(path) => path,
            None => default_package_root(runtime)?,
        };
        debug!("Using package root: {:?}", package_root);

        let release_url = release_url.unwrap_or_else(|| DEFAULT_RELEASES_URL.to_string());
        debug!("Using release URL: {}", release_url);

        Ok(Self {
            package_root,
            release_url,
            binary_name: BINARY_NAME.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_redirects: DEFAULT_MAX_HOPS,
        })
    }

    pub fn install_dir(&self) -> PathBuf {
        install_dir(&self.package_root)
    }

    pub fn layout(&self, host: &HostDescriptor) -> InstallLayout {
        InstallLayout::new(&self.package_root, &self.binary_name, host)
    }

    pub fn release_source(&self) -> ReleaseSource {
        ReleaseSource::new(self.release_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use crate::test_utils::{test_home, test_root};

    #[test]
    fn test_config_defaults() {
        let mut runtime = MockRuntime::new();
        runtime.expect_home_dir().returning(|| Some(test_home()));

        let config = Config::new(&runtime, None, None).unwrap();

        assert_eq!(config.package_root, test_root());
        assert_eq!(config.install_dir(), test_root().join("bin"));
        assert_eq!(config.release_url, DEFAULT_RELEASES_URL);
        assert_eq!(config.binary_name, "aether");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.max_redirects, 1);
    }

    #[test]
    fn test_config_overrides_skip_home_lookup() {
        // No expectations: looking up the home directory would panic
        let runtime = MockRuntime::new();

        let config = Config::new(
            &runtime,
            Some(PathBuf::from("/opt/aether")),
            Some("http://mirror.local/releases".to_string()),
        )
        .unwrap();

        assert_eq!(config.install_dir(), PathBuf::from("/opt/aether").join("bin"));
        assert_eq!(
            config.release_source().releases_page(),
            "http://mirror.local/releases"
        );
    }

    #[test]
    fn test_config_without_home_fails() {
        let mut runtime = MockRuntime::new();
        runtime.expect_home_dir().returning(|| None);

        assert!(Config::new(&runtime, None, None).is_err());
    }

    #[test]
    fn test_config_layout_follows_host() {
        let config = Config {
            package_root: test_root(),
            release_url: DEFAULT_RELEASES_URL.to_string(),
            binary_name: BINARY_NAME.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_redirects: 1,
        };

        let windows = config.layout(&HostDescriptor::new("windows", "x86_64"));
        assert!(windows.binary_path().ends_with("aether.exe"));

        let linux = config.layout(&HostDescriptor::new("linux", "aarch64"));
        assert!(linux.binary_path().ends_with("aether"));
        assert_eq!(linux.bin_dir(), config.install_dir());
    }
}
