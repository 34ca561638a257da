//! Catalog CLI
//!
//! Enrich product catalogues with LLM tool calls and search them locally.

use anyhow::Result;
use catalog_core::error::exit_codes;
use catalog_core::{CatalogError, Config};
use clap::Parser;

mod app;
mod commands;
mod output;
mod progress;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::EnrichCsv(args) => commands::enrich::run_csv(args, &config, cli.format).await,
        Commands::EnrichJson(args) => commands::enrich::run_json(args, &config, cli.format).await,
        Commands::Assist(args) => commands::assist::run(args, &config, cli.format).await,
        Commands::Corpus(args) => commands::corpus::run(args),
        Commands::Ingest(args) => commands::ingest::run(args, &config, cli.format).await,
        Commands::Search(args) => commands::search::run(args, &config, cli.format).await,
        Commands::Status(args) => commands::status::run(args, cli.format),
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<CatalogError>()
        .map(CatalogError::exit_code)
        .unwrap_or(exit_codes::GENERAL_ERROR)
}
