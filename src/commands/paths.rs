use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::runtime::Runtime;

/// Directory name under the home directory used when no root is given.
const DEFAULT_ROOT_DIR: &str = ".aether";

/// Get the default package root directory
#[tracing::instrument(skip(runtime))]
pub fn default_package_root<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let home_dir = runtime
        .home_dir()
        .context("Could not find home directory")?;
    Ok(home_dir.join(DEFAULT_ROOT_DIR))
}
