use aether_bootstrap::commands::{Config, install, uninstall};
use aether_bootstrap::runtime::RealRuntime;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// aether-bootstrap - installer for the aether CLI
///
/// Places the aether binary for this platform under <root>/bin, downloading
/// it from the latest GitHub release when no bundled copy is present.
///
/// Examples:
///   aether-bootstrap install     # Install aether into ~/.aether/bin
///   aether-bootstrap uninstall   # Remove ~/.aether/bin
#[derive(Parser, Debug)]
#[command(author, version = env!("AETHER_BOOTSTRAP_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Package root; the binary goes to <root>/bin (also via AETHER_BOOTSTRAP_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "AETHER_BOOTSTRAP_ROOT",
        value_name = "PATH",
        global = true
    )]
    pub install_root: Option<PathBuf>,

    /// Releases base URL (defaults to the aether-cli GitHub releases page)
    #[arg(
        long = "release-url",
        env = "AETHER_RELEASE_URL",
        value_name = "URL",
        global = true
    )]
    pub release_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Install the aether binary for this platform
    Install,

    /// Remove the installed binary and its directory
    Uninstall,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;
    let config = Config::new(&runtime, cli.install_root, cli.release_url)?;

    match cli.command {
        Commands::Install => install(runtime, config).await?,
        Commands::Uninstall => uninstall(runtime, config)?,
    }
    Ok(())
}
