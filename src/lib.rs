pub mod commands;
pub mod error;
pub mod http;
pub mod platform;
pub mod provision;
pub mod runtime;
pub mod uninstall;
