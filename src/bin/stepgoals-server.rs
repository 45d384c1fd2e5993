// ABOUTME: Server binary for the daily step goals backend
// ABOUTME: Loads environment configuration, opens the database, and serves HTTP
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Step Goals Server Binary

use anyhow::Result;
use clap::Parser;
use stepgoals::{config::ServerConfig, database::Database, logging, server};
use tracing::info;

#[derive(Parser)]
#[command(name = "stepgoals-server")]
#[command(about = "Daily step goals backend for the Fitbit Web API")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    info!("starting step goals server: {}", config.summary());

    let database = Database::new(&config.database.url).await?;
    info!("database initialized: {}", config.database.url);

    let context = server::ServerContext::new(config, database);
    server::serve(context).await
}
