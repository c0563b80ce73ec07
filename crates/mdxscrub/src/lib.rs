// mdxscrub library exports

pub mod app;
pub mod cli;
pub mod config;
pub mod file_manager;

pub use app::{App, Outcome};
pub use cli::CliArgs;
pub use config::Config;

use log::LevelFilter;

/// Logger used when `RUST_LOG` is unset: info everywhere, debug for the workspace crates.
pub fn default_logger() -> env_logger::Builder {
    let mut logger = env_logger::Builder::new();
    logger.filter_level(LevelFilter::Info);
    logger.filter_module("mdxscrub", LevelFilter::Debug);
    logger.filter_module("mdxcore", LevelFilter::Debug);
    logger
}
