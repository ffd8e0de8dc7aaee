// ABOUTME: SQLite persistence for the workout tracker
// ABOUTME: Connection setup, idempotent per-domain migrations and shared row decoding helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! One `Database` owns the `SQLite` pool and creates the schema; one manager
//! per domain wraps a clone of the pool and owns that domain's queries.
//! Every query is scoped by `user_id`, so rows of another user are reported
//! as not found.

/// Analytics read queries
pub mod analytics;
/// Body-weight log
pub mod body_weight;
/// Circuit library
pub mod circuits;
/// Exercise library
pub mod exercises;
/// Schedule items
pub mod schedule;
/// System library seeding
pub mod seed_library;
/// Workout sessions and performed sets
pub mod sessions;
/// Supplements and intake logs
pub mod supplements;
/// Templates, circuit blocks and planned sets
pub mod templates;
/// User accounts
pub mod users;

pub use analytics::AnalyticsManager;
pub use body_weight::BodyWeightManager;
pub use circuits::CircuitsManager;
pub use exercises::ExercisesManager;
pub use schedule::ScheduleManager;
pub use sessions::SessionsManager;
pub use supplements::SupplementsManager;
pub use templates::TemplatesManager;
pub use users::UsersManager;

use crate::errors::{AppError, AppResult};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use setlog_core::models::{SetValues, TrackingFlags};
use setlog_core::time::{parse_date, parse_optional_timestamp, parse_timestamp};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_FILE_CONNECTIONS: u32 = 8;

/// Database handle owning the connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to `database_url` and run migrations
    ///
    /// File databases are created when missing. In-memory databases use a
    /// single connection that is never recycled, so every request sees the
    /// same data.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails or a
    /// migration fails
    pub async fn new(database_url: &str) -> Result<Self> {
        let is_memory = database_url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL {database_url}"))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = if is_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            if let Some(parent) = Path::new(options.get_filename()).parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).await.with_context(|| {
                        format!("Failed to create database directory {}", parent.display())
                    })?;
                }
            }
            SqlitePoolOptions::new()
                .max_connections(MAX_FILE_CONNECTIONS)
                .connect_with(options.journal_mode(SqliteJournalMode::Wal))
                .await
        }
        .with_context(|| format!("Failed to connect to {database_url}"))?;

        let db = Self { pool };
        db.migrate().await?;
        info!(database.url = %database_url, "Database ready");
        Ok(db)
    }

    /// Get a reference to the database pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check the connection with a trivial query
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database ping failed: {e}")))?;
        Ok(())
    }

    /// Run idempotent schema migrations, parents before children
    ///
    /// # Errors
    ///
    /// Returns an error if any table or index creation fails
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_users().await?;
        self.migrate_exercises().await?;
        self.migrate_circuits().await?;
        self.migrate_templates().await?;
        self.migrate_schedule().await?;
        self.migrate_sessions().await?;
        self.migrate_supplements().await?;
        self.migrate_body_weight().await?;
        Ok(())
    }

    /// Run a list of DDL statements
    async fn execute_all(&self, statements: &[&str]) -> Result<()> {
        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Migration statement failed: {statement}"))?;
        }
        Ok(())
    }
}

/// Begin a transaction
pub(crate) async fn begin(pool: &SqlitePool) -> AppResult<Transaction<'static, Sqlite>> {
    pool.begin()
        .await
        .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))
}

/// Commit a transaction
pub(crate) async fn commit(tx: Transaction<'static, Sqlite>) -> AppResult<()> {
    tx.commit()
        .await
        .map_err(|e| AppError::database(format!("Failed to commit transaction: {e}")))
}

/// Map an insert/update error, turning unique violations into a 409 with `conflict_message`
pub(crate) fn write_error(error: sqlx::Error, context: &str, conflict_message: &str) -> AppError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::already_exists(conflict_message)
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AppError::invalid_input(format!("{context}: referenced record does not exist"))
        }
        _ => AppError::database(format!("{context}: {error}")),
    }
}

/// Decode a TEXT uuid column
pub(crate) fn uuid_column(row: &SqliteRow, column: &str) -> AppResult<Uuid> {
    let value: String = row.get(column);
    Uuid::parse_str(&value)
        .map_err(|e| AppError::internal(format!("Invalid UUID in column {column}: {e}")))
}

/// Decode a nullable TEXT uuid column
pub(crate) fn optional_uuid_column(row: &SqliteRow, column: &str) -> AppResult<Option<Uuid>> {
    let value: Option<String> = row.get(column);
    value
        .map(|v| {
            Uuid::parse_str(&v)
                .map_err(|e| AppError::internal(format!("Invalid UUID in column {column}: {e}")))
        })
        .transpose()
}

/// Decode a timestamp column
pub(crate) fn timestamp_column(row: &SqliteRow, column: &str) -> AppResult<DateTime<Utc>> {
    let value: String = row.get(column);
    parse_timestamp(&value)
}

/// Decode a nullable timestamp column
pub(crate) fn optional_timestamp_column(
    row: &SqliteRow,
    column: &str,
) -> AppResult<Option<DateTime<Utc>>> {
    let value: Option<String> = row.get(column);
    parse_optional_timestamp(value.as_deref())
}

/// Decode a `YYYY-MM-DD` column
pub(crate) fn date_column(row: &SqliteRow, column: &str) -> AppResult<NaiveDate> {
    let value: String = row.get(column);
    parse_date(&value)
}

/// Decode the `tracks_*` columns of an exercise row
pub(crate) fn tracking_columns(row: &SqliteRow) -> TrackingFlags {
    TrackingFlags {
        tracks_weight: row.get("tracks_weight"),
        tracks_reps: row.get("tracks_reps"),
        tracks_time: row.get("tracks_time"),
        tracks_distance: row.get("tracks_distance"),
    }
}

/// Decode the set value columns shared by planned and performed sets
pub(crate) fn set_value_columns(row: &SqliteRow) -> SetValues {
    SetValues {
        reps: row.get("reps"),
        weight: row.get("weight"),
        time_seconds: row.get("time_seconds"),
        distance: row.get("distance"),
        rest_seconds: row.get("rest_seconds"),
    }
}
