use anyhow::Result;

use crate::platform::HostDescriptor;
use crate::provision::{ArtifactSource, InstalledArtifact};
use crate::runtime::Runtime;

use super::config::Config;
use super::services::build_provisioner;

/// Install the binary for the running host.
#[tracing::instrument(skip(runtime, config))]
pub async fn install<R: Runtime>(runtime: R, config: Config) -> Result<()> {
    let host = HostDescriptor::current();
    run(runtime, &config, &host).await?;
    Ok(())
}

#[tracing::instrument(skip(runtime, config))]
pub async fn run<R: Runtime>(
    runtime: R,
    config: &Config,
    host: &HostDescriptor,
) -> Result<InstalledArtifact> {
    println!("   resolving {} for {}", config.binary_name, host);

    let provisioner = build_provisioner(runtime, config, host)?;
    let artifact = provisioner.provision(host).await?;

    match &artifact {
        InstalledArtifact::RealBinary {
            path,
            source: ArtifactSource::Bundled,
        } => {
            println!("Using bundled {} at {}", config.binary_name, path.display());
        }
        InstalledArtifact::RealBinary {
            path,
            source: ArtifactSource::Downloaded { bytes },
        } => {
            println!(
                "Installed {} ({} bytes) to {}",
                config.binary_name,
                bytes,
                path.display()
            );
        }
        InstalledArtifact::FallbackStub { path, reason } => {
            eprintln!(
                "Warning: could not install {}: {}",
                config.binary_name, reason
            );
            eprintln!(
                "Download it manually from {}",
                config.release_source().releases_page()
            );
            println!("Installed placeholder at {}", path.display());
        }
    }

    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::config::{BINARY_NAME, DEFAULT_TIMEOUT};
    use crate::runtime::RealRuntime;
    use mockito::Server;
    use std::path::Path;
    use tempfile::tempdir;

    fn config(root: &Path, release_url: String) -> Config {
        Config {
            package_root: root.to_path_buf(),
            release_url,
            binary_name: BINARY_NAME.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_redirects: 1,
        }
    }

    #[tokio::test]
    async fn test_run_downloads_through_redirect() {
        let mut server = Server::new_async().await;
        let releases = format!("{}/releases", server.url());

        let redirect = server
            .mock("GET", "/releases/latest/download/aether-linux-arm64")
            .with_status(302)
            .with_header("location", "/releases/download/v0.4.0/aether-linux-arm64")
            .create_async()
            .await;
        let asset = server
            .mock("GET", "/releases/download/v0.4.0/aether-linux-arm64")
            .with_status(200)
            .with_body("arm64 build")
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let host = HostDescriptor::new("linux", "aarch64");
        let artifact = run(RealRuntime, &config(dir.path(), releases), &host)
            .await
            .unwrap();

        redirect.assert_async().await;
        asset.assert_async().await;
        assert!(!artifact.is_fallback());
        assert_eq!(
            std::fs::read(dir.path().join("bin").join("aether")).unwrap(),
            b"arm64 build"
        );
    }

    #[tokio::test]
    async fn test_run_server_error_installs_placeholder() {
        let mut server = Server::new_async().await;
        let releases = format!("{}/releases", server.url());

        let mock = server
            .mock("GET", "/releases/latest/download/aether-macos-x64")
            .with_status(500)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let host = HostDescriptor::new("darwin", "x86_64");
        let artifact = run(RealRuntime, &config(dir.path(), releases.clone()), &host)
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(artifact.is_fallback());
        let stub = std::fs::read_to_string(artifact.path()).unwrap();
        assert!(stub.contains(&releases));
    }

    #[tokio::test]
    async fn test_run_unsupported_platform_fails() {
        let dir = tempdir().unwrap();
        let host = HostDescriptor::new("solaris", "sparc64");

        let result = run(
            RealRuntime,
            &config(dir.path(), "http://127.0.0.1:9/releases".to_string()),
            &host,
        )
        .await;

        assert!(result.is_err());
        assert!(!dir.path().join("bin").exists());
    }
}
