// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! paperhooks CLI
//!
//! Command-line client for the Paperless-ngx API

use anyhow::Context;
use clap::Parser;
use paperhooks::cli::{Cli, Commands, Runner};
use paperhooks::ClientConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.client_config();

    // Initialize logging; stdout carries the command output. The level comes
    // from the resolved config, config file included.
    let level = config.as_ref().map_or("info", ClientConfig::log_level);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let command = match &cli.command {
        Commands::Ping => "ping",
        Commands::Tags { .. } => "tags",
        Commands::Tasks => "tasks",
        Commands::WaitTask { .. } => "wait-task",
        Commands::Logs { .. } => "logs",
        Commands::Status => "status",
        Commands::Whoami => "whoami",
        Commands::Upload { .. } => "upload",
        Commands::Download { .. } => "download",
        Commands::PostConsume { .. } => "post-consume",
        Commands::PreConsume => "pre-consume",
    };

    let config = config.context("loading client configuration failed")?;

    Runner::new(cli, config)
        .run()
        .await
        .with_context(|| format!("{command} failed"))
}
