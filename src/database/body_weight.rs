// ABOUTME: Body-weight log database operations
// ABOUTME: Entries with unit and calendar date, listed by date range
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{date_column, timestamp_column, uuid_column, Database};
use crate::errors::{AppError, AppResult};
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use setlog_core::models::{
    BodyWeightEntry, CreateBodyWeightRequest, UpdateBodyWeightRequest, WeightUnit,
};
use setlog_core::time::{format_date, format_timestamp};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

const ENTRY_COLUMNS: &str = "id, user_id, weight, unit, recorded_on, notes, created_at";

impl Database {
    /// Create the body-weight table
    pub(super) async fn migrate_body_weight(&self) -> Result<()> {
        self.execute_all(&[
            r"
            CREATE TABLE IF NOT EXISTS body_weight_entries (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                weight REAL NOT NULL CHECK (weight > 0),
                unit TEXT NOT NULL DEFAULT 'kg',
                recorded_on TEXT NOT NULL,
                notes TEXT,
                created_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_body_weight_user_date ON body_weight_entries(user_id, recorded_on)",
        ])
        .await
    }
}

/// Body-weight log operations
#[derive(Clone)]
pub struct BodyWeightManager {
    pool: SqlitePool,
}

impl BodyWeightManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Entries recorded between `from` and `to` inclusive, oldest first
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn list(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<BodyWeightEntry>> {
        let sql = format!(
            r"
            SELECT {ENTRY_COLUMNS} FROM body_weight_entries
            WHERE user_id = $1 AND recorded_on BETWEEN $2 AND $3
            ORDER BY recorded_on, created_at
            "
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .bind(format_date(from))
            .bind(format_date(to))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list body weight: {e}")))?;
        rows.iter().map(row_to_entry).collect()
    }

    /// Get an entry owned by the user or fail with 404
    ///
    /// # Errors
    ///
    /// Returns 404 when the entry does not exist for this user
    pub async fn require(&self, entry_id: Uuid, user_id: Uuid) -> AppResult<BodyWeightEntry> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM body_weight_entries WHERE id = $1 AND user_id = $2");
        let row = sqlx::query(&sql)
            .bind(entry_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get body weight entry: {e}")))?
            .ok_or_else(|| AppError::not_found(format!("Body weight entry {entry_id}")))?;
        row_to_entry(&row)
    }

    /// Record a weight; the date defaults to `today`
    ///
    /// # Errors
    ///
    /// Returns 400 for a non-positive weight
    pub async fn create(
        &self,
        user_id: Uuid,
        request: &CreateBodyWeightRequest,
        today: NaiveDate,
    ) -> AppResult<BodyWeightEntry> {
        request.validate()?;
        let entry = BodyWeightEntry {
            id: Uuid::new_v4(),
            user_id,
            weight: request.weight,
            unit: request.unit,
            recorded_on: request.recorded_on.unwrap_or(today),
            notes: request.notes.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO body_weight_entries (id, user_id, weight, unit, recorded_on, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(entry.id.to_string())
        .bind(user_id.to_string())
        .bind(entry.weight)
        .bind(entry.unit.as_str())
        .bind(format_date(entry.recorded_on))
        .bind(&entry.notes)
        .bind(format_timestamp(entry.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to record body weight: {e}")))?;

        Ok(entry)
    }

    /// Update an entry; absent fields are unchanged
    ///
    /// # Errors
    ///
    /// Returns 404 when the entry does not exist for this user, 400 for a non-positive weight
    pub async fn update(
        &self,
        entry_id: Uuid,
        user_id: Uuid,
        request: &UpdateBodyWeightRequest,
    ) -> AppResult<BodyWeightEntry> {
        request.validate()?;
        let existing = self.require(entry_id, user_id).await?;
        let updated = BodyWeightEntry {
            weight: request.weight.unwrap_or(existing.weight),
            unit: request.unit.unwrap_or(existing.unit),
            recorded_on: request.recorded_on.unwrap_or(existing.recorded_on),
            notes: request.notes.clone().or_else(|| existing.notes.clone()),
            ..existing
        };

        sqlx::query(
            r"
            UPDATE body_weight_entries SET weight = $1, unit = $2, recorded_on = $3, notes = $4
            WHERE id = $5 AND user_id = $6
            ",
        )
        .bind(updated.weight)
        .bind(updated.unit.as_str())
        .bind(format_date(updated.recorded_on))
        .bind(&updated.notes)
        .bind(entry_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update body weight: {e}")))?;

        Ok(updated)
    }

    /// Delete an entry
    ///
    /// # Errors
    ///
    /// Returns 404 when the entry does not exist for this user
    pub async fn delete(&self, entry_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM body_weight_entries WHERE id = $1 AND user_id = $2")
            .bind(entry_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete body weight: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Body weight entry {entry_id}")));
        }
        Ok(())
    }
}

fn row_to_entry(row: &SqliteRow) -> AppResult<BodyWeightEntry> {
    let unit: String = row.get("unit");
    Ok(BodyWeightEntry {
        id: uuid_column(row, "id")?,
        user_id: uuid_column(row, "user_id")?,
        weight: row.get("weight"),
        unit: WeightUnit::parse(&unit),
        recorded_on: date_column(row, "recorded_on")?,
        notes: row.get("notes"),
        created_at: timestamp_column(row, "created_at")?,
    })
}
