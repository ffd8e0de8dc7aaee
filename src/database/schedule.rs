// ABOUTME: Schedule database operations binding templates to calendar dates
// ABOUTME: Date-range listing, creation against owned templates, status and date updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::templates::TemplatesManager;
use super::{date_column, timestamp_column, uuid_column, Database};
use crate::errors::{AppError, AppResult};
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use setlog_core::models::{
    CreateScheduleItemRequest, ScheduleItem, ScheduleStatus, UpdateScheduleItemRequest,
};
use setlog_core::models::validation::patch_text;
use setlog_core::time::{format_date, format_timestamp};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

const SCHEDULE_COLUMNS: &str = r"
    s.id, s.user_id, s.template_id, t.name AS template_name, s.scheduled_date, s.status,
    s.notes, s.created_at, s.updated_at
";

impl Database {
    /// Create the schedule table
    pub(super) async fn migrate_schedule(&self) -> Result<()> {
        self.execute_all(&[
            r"
            CREATE TABLE IF NOT EXISTS schedule_items (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                template_id TEXT NOT NULL REFERENCES workout_templates(id) ON DELETE CASCADE,
                scheduled_date TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'planned'
                    CHECK (status IN ('planned', 'completed', 'skipped')),
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_schedule_items_user_date ON schedule_items(user_id, scheduled_date)",
        ])
        .await
    }
}

/// Schedule operations
#[derive(Clone)]
pub struct ScheduleManager {
    pool: SqlitePool,
}

impl ScheduleManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Items scheduled between `from` and `to` inclusive, by date
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn list(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<ScheduleItem>> {
        let sql = format!(
            r"
            SELECT {SCHEDULE_COLUMNS}
            FROM schedule_items s
            INNER JOIN workout_templates t ON t.id = s.template_id
            WHERE s.user_id = $1 AND s.scheduled_date BETWEEN $2 AND $3
            ORDER BY s.scheduled_date, s.created_at
            "
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .bind(format_date(from))
            .bind(format_date(to))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list schedule: {e}")))?;
        rows.iter().map(row_to_schedule_item).collect()
    }

    /// Get a schedule item owned by the user or fail with 404
    ///
    /// # Errors
    ///
    /// Returns 404 when the item does not exist for this user
    pub async fn require(&self, item_id: Uuid, user_id: Uuid) -> AppResult<ScheduleItem> {
        let sql = format!(
            r"
            SELECT {SCHEDULE_COLUMNS}
            FROM schedule_items s
            INNER JOIN workout_templates t ON t.id = s.template_id
            WHERE s.id = $1 AND s.user_id = $2
            "
        );
        let row = sqlx::query(&sql)
            .bind(item_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get schedule item: {e}")))?
            .ok_or_else(|| AppError::not_found(format!("Schedule item {item_id}")))?;
        row_to_schedule_item(&row)
    }

    /// Schedule one of the user's templates on a date
    ///
    /// # Errors
    ///
    /// Returns 404 for an unknown template, 400 for invalid values
    pub async fn create(
        &self,
        user_id: Uuid,
        request: &CreateScheduleItemRequest,
    ) -> AppResult<ScheduleItem> {
        request.validate()?;
        TemplatesManager::new(self.pool.clone())
            .require(request.template_id, user_id)
            .await?;

        let id = Uuid::new_v4();
        sqlx::query(
            r"
            INSERT INTO schedule_items (
                id, user_id, template_id, scheduled_date, status, notes, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ",
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(request.template_id.to_string())
        .bind(format_date(request.scheduled_date))
        .bind(ScheduleStatus::Planned.as_str())
        .bind(&request.notes)
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create schedule item: {e}")))?;

        self.require(id, user_id).await
    }

    /// Move, re-status or annotate a schedule item
    ///
    /// # Errors
    ///
    /// Returns 404 when the item does not exist for this user
    pub async fn update(
        &self,
        item_id: Uuid,
        user_id: Uuid,
        request: &UpdateScheduleItemRequest,
    ) -> AppResult<ScheduleItem> {
        request.validate()?;
        let existing = self.require(item_id, user_id).await?;

        sqlx::query(
            r"
            UPDATE schedule_items SET scheduled_date = $1, status = $2, notes = $3, updated_at = $4
            WHERE id = $5 AND user_id = $6
            ",
        )
        .bind(format_date(request.scheduled_date.unwrap_or(existing.scheduled_date)))
        .bind(request.status.unwrap_or(existing.status).as_str())
        .bind(patch_text(request.notes.as_deref(), existing.notes.as_deref()))
        .bind(format_timestamp(Utc::now()))
        .bind(item_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update schedule item: {e}")))?;

        self.require(item_id, user_id).await
    }

    /// Delete a schedule item; sessions started from it keep running unlinked
    ///
    /// # Errors
    ///
    /// Returns 404 when the item does not exist for this user
    pub async fn delete(&self, item_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM schedule_items WHERE id = $1 AND user_id = $2")
            .bind(item_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete schedule item: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Schedule item {item_id}")));
        }
        Ok(())
    }
}

fn row_to_schedule_item(row: &SqliteRow) -> AppResult<ScheduleItem> {
    let status: String = row.get("status");
    Ok(ScheduleItem {
        id: uuid_column(row, "id")?,
        user_id: uuid_column(row, "user_id")?,
        template_id: uuid_column(row, "template_id")?,
        template_name: row.get("template_name"),
        scheduled_date: date_column(row, "scheduled_date")?,
        status: ScheduleStatus::parse(&status)?,
        notes: row.get("notes"),
        created_at: timestamp_column(row, "created_at")?,
        updated_at: timestamp_column(row, "updated_at")?,
    })
}
