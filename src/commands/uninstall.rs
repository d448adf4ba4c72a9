use anyhow::Result;
use log::debug;

use crate::runtime::Runtime;
use crate::uninstall::Uninstaller;

use super::config::Config;

/// Remove everything the installer placed under the package root.
#[tracing::instrument(skip(runtime, config))]
pub fn uninstall<R: Runtime>(runtime: R, config: Config) -> Result<()> {
    let install_dir = config.install_dir();
    debug!("Uninstalling from {:?}", install_dir);

    let report = Uninstaller::new(&runtime, &install_dir).run()?;

    if report.dir_removed {
        println!(
            "Uninstalled {} from {}",
            config.binary_name,
            install_dir.display()
        );
    } else {
        println!(
            "{} is not installed at {}",
            config.binary_name,
            install_dir.display()
        );
    }
    Ok(())
}
