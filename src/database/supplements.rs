// ABOUTME: Supplement and intake log database operations
// ABOUTME: Listing carries adherence, streak and taken-today computed from log dates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{date_column, timestamp_column, uuid_column, write_error, Database};
use crate::errors::{AppError, AppResult};
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use setlog_core::models::{
    CreateSupplementLogRequest, CreateSupplementRequest, Supplement, SupplementLog,
    SupplementWithStats, UpdateSupplementRequest,
};
use setlog_core::time::{format_date, format_timestamp};
use setlog_training::adherence::{adherence, current_streak};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

const SUPPLEMENT_COLUMNS: &str = "id, user_id, name, dosage, unit, notes, created_at, updated_at";
const LOG_COLUMNS: &str = "id, supplement_id, user_id, log_date, taken_at, notes";

impl Database {
    /// Create supplement and supplement log tables
    pub(super) async fn migrate_supplements(&self) -> Result<()> {
        self.execute_all(&[
            r"
            CREATE TABLE IF NOT EXISTS supplements (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                dosage TEXT,
                unit TEXT,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_supplements_user_name
            ON supplements(user_id, name COLLATE NOCASE)
            ",
            r"
            CREATE TABLE IF NOT EXISTS supplement_logs (
                id TEXT PRIMARY KEY,
                supplement_id TEXT NOT NULL REFERENCES supplements(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                log_date TEXT NOT NULL,
                taken_at TEXT NOT NULL,
                notes TEXT,
                UNIQUE(supplement_id, log_date)
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_supplement_logs_user_date ON supplement_logs(user_id, log_date)",
        ])
        .await
    }
}

/// Supplement operations
#[derive(Clone)]
pub struct SupplementsManager {
    pool: SqlitePool,
}

impl SupplementsManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The user's supplements by name, each with adherence as of `today`
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails
    pub async fn list(&self, user_id: Uuid, today: NaiveDate) -> AppResult<Vec<SupplementWithStats>> {
        let sql = format!(
            "SELECT {SUPPLEMENT_COLUMNS} FROM supplements WHERE user_id = $1 ORDER BY name COLLATE NOCASE"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list supplements: {e}")))?;

        let log_rows = sqlx::query("SELECT supplement_id, log_date FROM supplement_logs WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load supplement logs: {e}")))?;
        let mut logged: HashMap<Uuid, BTreeSet<NaiveDate>> = HashMap::new();
        for row in &log_rows {
            logged
                .entry(uuid_column(row, "supplement_id")?)
                .or_default()
                .insert(date_column(row, "log_date")?);
        }

        rows.iter()
            .map(|row| {
                let supplement = row_to_supplement(row)?;
                let days = logged.remove(&supplement.id).unwrap_or_default();
                Ok(with_stats(supplement, &days, today))
            })
            .collect()
    }

    /// Get a supplement owned by the user or fail with 404
    ///
    /// # Errors
    ///
    /// Returns 404 when the supplement does not exist for this user
    pub async fn require(&self, supplement_id: Uuid, user_id: Uuid) -> AppResult<Supplement> {
        let sql = format!("SELECT {SUPPLEMENT_COLUMNS} FROM supplements WHERE id = $1 AND user_id = $2");
        let row = sqlx::query(&sql)
            .bind(supplement_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get supplement: {e}")))?
            .ok_or_else(|| AppError::not_found(format!("Supplement {supplement_id}")))?;
        row_to_supplement(&row)
    }

    /// Create a supplement
    ///
    /// # Errors
    ///
    /// Returns 400 for invalid values, 409 for a duplicate name
    pub async fn create(&self, user_id: Uuid, request: &CreateSupplementRequest) -> AppResult<Supplement> {
        request.validate()?;
        let now = Utc::now();
        let supplement = Supplement {
            id: Uuid::new_v4(),
            user_id,
            name: request.name.trim().to_owned(),
            dosage: request.dosage.clone(),
            unit: request.unit.clone(),
            notes: request.notes.clone(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r"
            INSERT INTO supplements (id, user_id, name, dosage, unit, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ",
        )
        .bind(supplement.id.to_string())
        .bind(user_id.to_string())
        .bind(&supplement.name)
        .bind(&supplement.dosage)
        .bind(&supplement.unit)
        .bind(&supplement.notes)
        .bind(format_timestamp(now))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            write_error(
                e,
                "Failed to create supplement",
                &format!("A supplement named '{}' already exists", supplement.name),
            )
        })?;

        Ok(supplement)
    }

    /// Update a supplement; absent fields are unchanged
    ///
    /// # Errors
    ///
    /// Returns 404 when the supplement does not exist for this user, 409 for a duplicate name
    pub async fn update(
        &self,
        supplement_id: Uuid,
        user_id: Uuid,
        request: &UpdateSupplementRequest,
    ) -> AppResult<Supplement> {
        request.validate()?;
        let existing = self.require(supplement_id, user_id).await?;
        let updated = Supplement {
            name: request
                .name
                .as_deref()
                .map_or_else(|| existing.name.clone(), |n| n.trim().to_owned()),
            dosage: request.dosage.clone().or_else(|| existing.dosage.clone()),
            unit: request.unit.clone().or_else(|| existing.unit.clone()),
            notes: request.notes.clone().or_else(|| existing.notes.clone()),
            updated_at: Utc::now(),
            ..existing
        };

        sqlx::query(
            r"
            UPDATE supplements SET name = $1, dosage = $2, unit = $3, notes = $4, updated_at = $5
            WHERE id = $6 AND user_id = $7
            ",
        )
        .bind(&updated.name)
        .bind(&updated.dosage)
        .bind(&updated.unit)
        .bind(&updated.notes)
        .bind(format_timestamp(updated.updated_at))
        .bind(supplement_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            write_error(
                e,
                "Failed to update supplement",
                &format!("A supplement named '{}' already exists", updated.name),
            )
        })?;

        Ok(updated)
    }

    /// Delete a supplement and its logs
    ///
    /// # Errors
    ///
    /// Returns 404 when the supplement does not exist for this user
    pub async fn delete(&self, supplement_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM supplements WHERE id = $1 AND user_id = $2")
            .bind(supplement_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete supplement: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Supplement {supplement_id}")));
        }
        Ok(())
    }

    /// Log an intake; the date defaults to `today` and each day can be logged once
    ///
    /// # Errors
    ///
    /// Returns 404 for an unknown supplement, 409 when the day is already logged
    pub async fn log_intake(
        &self,
        supplement_id: Uuid,
        user_id: Uuid,
        request: &CreateSupplementLogRequest,
        today: NaiveDate,
    ) -> AppResult<SupplementLog> {
        request.validate()?;
        self.require(supplement_id, user_id).await?;

        let log = SupplementLog {
            id: Uuid::new_v4(),
            supplement_id,
            user_id,
            log_date: request.log_date.unwrap_or(today),
            taken_at: Utc::now(),
            notes: request.notes.clone(),
        };

        sqlx::query(
            r"
            INSERT INTO supplement_logs (id, supplement_id, user_id, log_date, taken_at, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(log.id.to_string())
        .bind(supplement_id.to_string())
        .bind(user_id.to_string())
        .bind(format_date(log.log_date))
        .bind(format_timestamp(log.taken_at))
        .bind(&log.notes)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            write_error(
                e,
                "Failed to log supplement",
                &format!("Supplement already logged for {}", log.log_date),
            )
        })?;

        Ok(log)
    }

    /// Logs of one supplement between `from` and `to` inclusive, newest first
    ///
    /// # Errors
    ///
    /// Returns 404 for an unknown supplement
    pub async fn list_logs(
        &self,
        supplement_id: Uuid,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<SupplementLog>> {
        self.require(supplement_id, user_id).await?;

        let sql = format!(
            r"
            SELECT {LOG_COLUMNS} FROM supplement_logs
            WHERE supplement_id = $1 AND user_id = $2 AND log_date BETWEEN $3 AND $4
            ORDER BY log_date DESC
            "
        );
        let rows = sqlx::query(&sql)
            .bind(supplement_id.to_string())
            .bind(user_id.to_string())
            .bind(format_date(from))
            .bind(format_date(to))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list supplement logs: {e}")))?;
        rows.iter().map(row_to_log).collect()
    }

    /// Delete one intake log
    ///
    /// # Errors
    ///
    /// Returns 404 when the log does not exist for this user
    pub async fn delete_log(&self, log_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM supplement_logs WHERE id = $1 AND user_id = $2")
            .bind(log_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete supplement log: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Supplement log {log_id}")));
        }
        Ok(())
    }
}

fn with_stats(supplement: Supplement, logged: &BTreeSet<NaiveDate>, today: NaiveDate) -> SupplementWithStats {
    let stats = adherence(logged, supplement.created_at.date_naive(), today);
    SupplementWithStats {
        adherence: stats.ratio,
        adherence_window_days: stats.window_days,
        current_streak: current_streak(logged, today),
        taken_today: logged.contains(&today),
        supplement,
    }
}

fn row_to_supplement(row: &SqliteRow) -> AppResult<Supplement> {
    Ok(Supplement {
        id: uuid_column(row, "id")?,
        user_id: uuid_column(row, "user_id")?,
        name: row.get("name"),
        dosage: row.get("dosage"),
        unit: row.get("unit"),
        notes: row.get("notes"),
        created_at: timestamp_column(row, "created_at")?,
        updated_at: timestamp_column(row, "updated_at")?,
    })
}

fn row_to_log(row: &SqliteRow) -> AppResult<SupplementLog> {
    Ok(SupplementLog {
        id: uuid_column(row, "id")?,
        supplement_id: uuid_column(row, "supplement_id")?,
        user_id: uuid_column(row, "user_id")?,
        log_date: date_column(row, "log_date")?,
        taken_at: timestamp_column(row, "taken_at")?,
        notes: row.get("notes"),
    })
}
