// ABOUTME: System library seeding utility for the Setlog server
// ABOUTME: Upserts system exercises and circuits from JSON, matching existing rows by name
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! System library seeder.
//!
//! Usage:
//! ```bash
//! # Seed the built-in library (uses DATABASE_URL from environment)
//! cargo run --bin seed-library
//!
//! # Seed from a custom file into a specific database
//! cargo run --bin seed-library -- --file ./my_library.json --database-url sqlite:./data/setlog.db
//!
//! # Verbose output
//! cargo run --bin seed-library -- -v
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use setlog_server::constants::{defaults, env_vars};
use setlog_server::database::seed_library::{seed_library, SystemLibrary};
use setlog_server::database::Database;
use std::env;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "seed-library",
    about = "Setlog System Library Seeder",
    long_about = "Create or update the system exercises and circuits shared by every user"
)]
struct SeedArgs {
    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Library JSON file; the built-in library when absent
    #[arg(long)]
    file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = SeedArgs::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    info!("=== Setlog System Library Seeder ===");

    let database_url = args
        .database_url
        .or_else(|| env::var(env_vars::DATABASE_URL).ok())
        .unwrap_or_else(|| defaults::DATABASE_URL.to_owned());

    let library = match &args.file {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            SystemLibrary::from_json(&json)?
        }
        None => SystemLibrary::builtin()?,
    };
    info!(
        "Seeding {} exercises and {} circuits",
        library.exercises.len(),
        library.circuits.len()
    );

    info!("Connecting to database: {}", database_url);
    let database = Database::new(&database_url).await?;
    let report = seed_library(database.pool(), &library).await?;

    info!("=== Seeding Complete ===");
    info!(
        "Exercises: {} created, {} updated",
        report.exercises_created, report.exercises_updated
    );
    info!(
        "Circuits: {} created, {} updated",
        report.circuits_created, report.circuits_updated
    );
    Ok(())
}
