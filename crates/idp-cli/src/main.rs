//! # idp
//!
//! Entry point for the identity provider binary.

#![forbid(unsafe_code)]

use clap::Parser;
use idp_cli::cli::{Cli, Command};
use idp_cli::commands::{run_add, run_cluster, run_hash, run_serve};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve => run_serve(&cli.config).await,
        Command::Add(cmd) => run_add(&cli.config, cmd).await,
        Command::Hash => run_hash(),
        Command::Cluster(cmd) => run_cluster(cmd),
    }
}
