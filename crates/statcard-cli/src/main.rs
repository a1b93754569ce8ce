use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod error;
mod github;
mod render;

use crate::config::{Args, Config};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = Config::from_args(Args::parse())?;
    let report = app::run(config).await?;
    if report.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
