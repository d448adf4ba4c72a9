//! Service factory for building command dependencies.
//!
//! Keeps construction of the HTTP stack and the provisioner out of the
//! configuration itself; services are derived from configuration values.

use anyhow::Result;
use log::debug;
use reqwest::{Client, redirect::Policy};
use std::time::Duration;

use crate::http::{HttpClient, ReqwestTransport};
use crate::platform::HostDescriptor;
use crate::provision::Provisioner;
use crate::runtime::Runtime;

use super::config::Config;

pub const USER_AGENT: &str = concat!("aether-bootstrap/", env!("AETHER_BOOTSTRAP_VERSION"));

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the HTTP client used for release downloads.
///
/// Redirects are left to [`HttpClient`], which enforces the hop budget.
/// `config.timeout` bounds each wait for data rather than the whole transfer,
/// so a slow but steady download is not cut off.
pub fn build_http_client(config: &Config) -> Result<HttpClient<ReqwestTransport>> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .redirect(Policy::none())
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(config.timeout)
        .build()?;

    debug!(
        "HTTP client configured: read_timeout={:?}, max_redirects={}",
        config.timeout, config.max_redirects
    );
    Ok(HttpClient::new(ReqwestTransport::new(client)).with_max_hops(config.max_redirects))
}

/// Build a provisioner for `host` from configuration
pub fn build_provisioner<R: Runtime>(
    runtime: R,
    config: &Config,
    host: &HostDescriptor,
) -> Result<Provisioner<R, ReqwestTransport>> {
    Ok(Provisioner::new(
        runtime,
        build_http_client(config)?,
        config.layout(host),
        config.release_source(),
    ))
}
