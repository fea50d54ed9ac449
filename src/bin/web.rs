#![cfg(not(tarpaulin_include))]

use std::env;
use tactic_matrix::app;
use tactic_matrix::config::ServerConfig;

/// Main entry point for the matrix server
///
/// Usage: `website [data_file] [static_dir]`. Log verbosity follows `RUST_LOG`
/// and defaults to `info`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_args(env::args());
    app::run(config).await
}
