// ABOUTME: Setlog HTTP API server binary
// ABOUTME: Loads configuration, opens the database, seeds the system library and serves the REST API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Setlog Server Binary
//!
//! ```bash
//! # Configuration from the environment
//! cargo run --bin setlog-server
//!
//! # Override port and database
//! cargo run --bin setlog-server -- --port 9000 --database-url sqlite::memory:
//! ```

use anyhow::Result;
use clap::Parser;
use setlog_server::{
    auth::AuthManager,
    config::{DatabaseUrl, ServerConfig},
    database::{
        seed_library::{seed_library, SystemLibrary},
        Database,
    },
    logging,
    resources::ServerResources,
    server,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "setlog-server")]
#[command(about = "Setlog - workout tracker REST API")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,

    /// Do not upsert the built-in system library at startup
    #[arg(long)]
    skip_seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.port {
        config.http_port = port;
    }
    if let Some(url) = args.database_url {
        config.database.url = DatabaseUrl::parse_url(&url)?;
    }
    config.validate()?;
    info!("{}", config.summary());

    let database = Database::new(&config.database.url.to_connection_string()).await?;
    info!("Database initialized: {}", config.database.url);

    if !args.skip_seed {
        let library = SystemLibrary::builtin()?;
        let report = seed_library(database.pool(), &library).await?;
        info!(
            exercises_created = report.exercises_created,
            circuits_created = report.circuits_created,
            "System library ready"
        );
    }

    let auth_manager = AuthManager::from_config(&config.auth);

    let port = config.http_port;
    let resources = Arc::new(ServerResources::new(
        database,
        auth_manager,
        Arc::new(config),
    ));

    if let Err(e) = server::run(resources, port).await {
        error!("Server error: {e:#}");
        return Err(e);
    }
    Ok(())
}
