use fbquery_core::err::{Context, Result};
pub use log::*;

mod limiting;
pub use limiting::*;

/// The filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info";

/// Configures the logger for the fbquery binaries
pub fn init_logging() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, DEFAULT_FILTER),
    )
    .try_init()
    .context("Failed to init logging")
}

/// Logging init function for tests
pub fn init_for_tests() {
    let res = env_logger::builder()
        .filter_module("fbquery", LevelFilter::Trace)
        .is_test(true)
        .try_init();
    if let Err(err) = res {
        eprintln!("Failed to init logging: {}", err);
    }
}
