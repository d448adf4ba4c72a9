//! Entry-point workflows behind the CLI subcommands.

pub mod config;
mod install;
mod paths;
mod services;
mod uninstall;

pub use config::Config;
pub use install::install;
pub use services::{USER_AGENT, build_http_client, build_provisioner};
pub use uninstall::uninstall;
