// ABOUTME: Exercise library database operations with the system/custom duality
// ABOUTME: Effective library query, per-user hiding of system rows, custom CRUD with cascades
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{
    begin, commit, optional_uuid_column, timestamp_column, tracking_columns, uuid_column, write_error,
    Database,
};
use crate::errors::{AppError, AppResult};
use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use setlog_core::models::{
    CreateExerciseRequest, DistanceUnit, Exercise, ExerciseCategory, UpdateExerciseRequest,
    WeightUnit,
};
use setlog_core::time::format_timestamp;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Columns selected for an exercise row; `$1` must be the requesting user's id
const EXERCISE_COLUMNS: &str = r"
    e.id, e.user_id, e.name, e.category, e.tracks_weight, e.tracks_reps, e.tracks_time,
    e.tracks_distance, e.weight_unit, e.distance_unit, e.notes, e.is_system,
    e.created_at, e.updated_at,
    EXISTS(
        SELECT 1 FROM user_exercise_preferences p
        WHERE p.exercise_id = e.id AND p.user_id = $1 AND p.is_hidden = 1
    ) AS is_hidden
";

/// What a delete on a library row did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LibraryDeletion {
    /// A system row was hidden for the requesting user only
    Hidden,
    /// A custom row was removed together with its dependents
    Deleted,
}

impl Database {
    /// Create exercise and exercise preference tables
    pub(super) async fn migrate_exercises(&self) -> Result<()> {
        self.execute_all(&[
            r"
            CREATE TABLE IF NOT EXISTS exercises (
                id TEXT PRIMARY KEY,
                user_id TEXT REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                tracks_weight INTEGER NOT NULL DEFAULT 1,
                tracks_reps INTEGER NOT NULL DEFAULT 1,
                tracks_time INTEGER NOT NULL DEFAULT 0,
                tracks_distance INTEGER NOT NULL DEFAULT 0,
                weight_unit TEXT NOT NULL DEFAULT 'kg',
                distance_unit TEXT NOT NULL DEFAULT 'km',
                notes TEXT,
                is_system INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                CHECK ((is_system = 1 AND user_id IS NULL) OR (is_system = 0 AND user_id IS NOT NULL))
            )
            ",
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_exercises_custom_name
            ON exercises(user_id, name COLLATE NOCASE) WHERE user_id IS NOT NULL
            ",
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_exercises_system_name
            ON exercises(name COLLATE NOCASE) WHERE is_system = 1
            ",
            r"
            CREATE TABLE IF NOT EXISTS user_exercise_preferences (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                exercise_id TEXT NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                is_hidden INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                UNIQUE(user_id, exercise_id)
            )
            ",
        ])
        .await
    }
}

/// Exercise library operations
#[derive(Clone)]
pub struct ExercisesManager {
    pool: SqlitePool,
}

impl ExercisesManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Effective library: system rows not hidden by the user plus the user's custom rows
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn list(
        &self,
        user_id: Uuid,
        category: Option<ExerciseCategory>,
    ) -> AppResult<Vec<Exercise>> {
        let sql = format!(
            r"
            SELECT {EXERCISE_COLUMNS}
            FROM exercises e
            WHERE (e.user_id = $1
                   OR (e.is_system = 1 AND NOT EXISTS (
                        SELECT 1 FROM user_exercise_preferences p
                        WHERE p.exercise_id = e.id AND p.user_id = $1 AND p.is_hidden = 1)))
              AND ($2 IS NULL OR e.category = $2)
            ORDER BY e.name COLLATE NOCASE
            "
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .bind(category.map(|c| c.as_str()))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list exercises: {e}")))?;

        rows.iter().map(row_to_exercise).collect()
    }

    /// System exercises the user has hidden
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn list_hidden(&self, user_id: Uuid) -> AppResult<Vec<Exercise>> {
        let sql = format!(
            r"
            SELECT {EXERCISE_COLUMNS}
            FROM exercises e
            INNER JOIN user_exercise_preferences up ON e.id = up.exercise_id
            WHERE up.user_id = $1 AND up.is_hidden = 1
            ORDER BY e.name COLLATE NOCASE
            "
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list hidden exercises: {e}")))?;

        rows.iter().map(row_to_exercise).collect()
    }

    /// Get a system exercise or one of the user's custom exercises
    ///
    /// Hidden system exercises are still returned, flagged `is_hidden`.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn get(&self, exercise_id: Uuid, user_id: Uuid) -> AppResult<Option<Exercise>> {
        let sql = format!(
            r"
            SELECT {EXERCISE_COLUMNS}
            FROM exercises e
            WHERE e.id = $2 AND (e.user_id = $1 OR e.is_system = 1)
            "
        );
        let row = sqlx::query(&sql)
            .bind(user_id.to_string())
            .bind(exercise_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get exercise: {e}")))?;

        row.map(|r| row_to_exercise(&r)).transpose()
    }

    /// Get an exercise visible to the user or fail with 404
    ///
    /// # Errors
    ///
    /// Returns 404 when the exercise is not visible to the user
    pub async fn require(&self, exercise_id: Uuid, user_id: Uuid) -> AppResult<Exercise> {
        self.get(exercise_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Exercise {exercise_id}")))
    }

    /// Create a custom exercise owned by the user
    ///
    /// # Errors
    ///
    /// Returns 400 for an invalid request, 409 for a duplicate name
    pub async fn create(
        &self,
        user_id: Uuid,
        request: &CreateExerciseRequest,
    ) -> AppResult<Exercise> {
        request.validate()?;
        self.insert(Some(user_id), request).await
    }

    /// Insert or refresh a system exercise by name, returning it and whether it was new
    ///
    /// # Errors
    ///
    /// Returns 400 for an invalid request or a database error
    pub async fn upsert_system(&self, request: &CreateExerciseRequest) -> AppResult<(Exercise, bool)> {
        request.validate()?;
        let existing = sqlx::query("SELECT id FROM exercises WHERE is_system = 1 AND name = $1 COLLATE NOCASE")
            .bind(request.name.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to look up system exercise: {e}")))?;

        let Some(row) = existing else {
            return Ok((self.insert(None, request).await?, true));
        };

        let id = uuid_column(&row, "id")?;
        let tracking = request.tracking();
        sqlx::query(
            r"
            UPDATE exercises
            SET category = $1, tracks_weight = $2, tracks_reps = $3, tracks_time = $4,
                tracks_distance = $5, weight_unit = $6, distance_unit = $7, notes = $8,
                updated_at = $9
            WHERE id = $10
            ",
        )
        .bind(request.category.as_str())
        .bind(tracking.tracks_weight)
        .bind(tracking.tracks_reps)
        .bind(tracking.tracks_time)
        .bind(tracking.tracks_distance)
        .bind(request.weight_unit.as_str())
        .bind(request.distance_unit.as_str())
        .bind(&request.notes)
        .bind(format_timestamp(Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to refresh system exercise: {e}")))?;

        let exercise = self.get(id, Uuid::nil()).await?.ok_or_else(|| {
            AppError::internal(format!("System exercise {id} vanished during seeding"))
        })?;
        Ok((exercise, false))
    }

    async fn insert(&self, owner: Option<Uuid>, request: &CreateExerciseRequest) -> AppResult<Exercise> {
        let now = Utc::now();
        let tracking = request.tracking();
        let exercise = Exercise {
            id: Uuid::new_v4(),
            user_id: owner,
            name: request.name.trim().to_owned(),
            category: request.category,
            tracking,
            weight_unit: request.weight_unit,
            distance_unit: request.distance_unit,
            notes: request.notes.clone(),
            is_system: owner.is_none(),
            is_hidden: false,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r"
            INSERT INTO exercises (
                id, user_id, name, category, tracks_weight, tracks_reps, tracks_time,
                tracks_distance, weight_unit, distance_unit, notes, is_system, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
            ",
        )
        .bind(exercise.id.to_string())
        .bind(owner.map(|id| id.to_string()))
        .bind(&exercise.name)
        .bind(exercise.category.as_str())
        .bind(tracking.tracks_weight)
        .bind(tracking.tracks_reps)
        .bind(tracking.tracks_time)
        .bind(tracking.tracks_distance)
        .bind(exercise.weight_unit.as_str())
        .bind(exercise.distance_unit.as_str())
        .bind(&exercise.notes)
        .bind(exercise.is_system)
        .bind(format_timestamp(now))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            write_error(
                e,
                "Failed to create exercise",
                &format!("An exercise named '{}' already exists", exercise.name),
            )
        })?;

        Ok(exercise)
    }

    /// Update one of the user's custom exercises
    ///
    /// # Errors
    ///
    /// Returns 404 when not visible, 403 for system exercises, 400 for invalid
    /// values and 409 for a duplicate name
    pub async fn update(
        &self,
        exercise_id: Uuid,
        user_id: Uuid,
        request: &UpdateExerciseRequest,
    ) -> AppResult<Exercise> {
        request.validate()?;
        let existing = self.require(exercise_id, user_id).await?;
        if existing.is_system {
            return Err(AppError::permission_denied(
                "System exercises cannot be modified",
            ));
        }

        let tracking = request.apply_tracking(existing.tracking);
        if !tracking.any() {
            return Err(AppError::invalid_input(
                "An exercise must track at least one of weight, reps, time or distance",
            ));
        }

        let updated = Exercise {
            name: request
                .name
                .as_deref()
                .map_or_else(|| existing.name.clone(), |n| n.trim().to_owned()),
            category: request.category.unwrap_or(existing.category),
            tracking,
            weight_unit: request.weight_unit.unwrap_or(existing.weight_unit),
            distance_unit: request.distance_unit.unwrap_or(existing.distance_unit),
            notes: request.notes.clone().or_else(|| existing.notes.clone()),
            updated_at: Utc::now(),
            ..existing
        };

        sqlx::query(
            r"
            UPDATE exercises
            SET name = $1, category = $2, tracks_weight = $3, tracks_reps = $4, tracks_time = $5,
                tracks_distance = $6, weight_unit = $7, distance_unit = $8, notes = $9, updated_at = $10
            WHERE id = $11 AND user_id = $12
            ",
        )
        .bind(&updated.name)
        .bind(updated.category.as_str())
        .bind(tracking.tracks_weight)
        .bind(tracking.tracks_reps)
        .bind(tracking.tracks_time)
        .bind(tracking.tracks_distance)
        .bind(updated.weight_unit.as_str())
        .bind(updated.distance_unit.as_str())
        .bind(&updated.notes)
        .bind(format_timestamp(updated.updated_at))
        .bind(exercise_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            write_error(
                e,
                "Failed to update exercise",
                &format!("An exercise named '{}' already exists", updated.name),
            )
        })?;

        Ok(updated)
    }

    /// Delete for this user: hide a system exercise, or remove a custom one
    ///
    /// Removing a custom exercise cascades to circuit slots and template rows, and
    /// circuit blocks left without rows are dropped. Session rows keep their
    /// snapshot and sets with the exercise link cleared.
    ///
    /// # Errors
    ///
    /// Returns 404 when the exercise is not visible to the user
    pub async fn delete(&self, exercise_id: Uuid, user_id: Uuid) -> AppResult<LibraryDeletion> {
        let existing = self.require(exercise_id, user_id).await?;
        if existing.is_system {
            self.hide(exercise_id, user_id).await?;
            return Ok(LibraryDeletion::Hidden);
        }

        let mut tx = begin(&self.pool).await?;
        sqlx::query("DELETE FROM exercises WHERE id = $1 AND user_id = $2")
            .bind(exercise_id.to_string())
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete exercise: {e}")))?;
        sqlx::query(
            r"
            DELETE FROM template_circuit_blocks
            WHERE NOT EXISTS (
                SELECT 1 FROM template_exercises te WHERE te.block_id = template_circuit_blocks.id
            )
            ",
        )
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to drop empty circuit blocks: {e}")))?;
        commit(tx).await?;

        Ok(LibraryDeletion::Deleted)
    }

    async fn hide(&self, exercise_id: Uuid, user_id: Uuid) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO user_exercise_preferences (id, user_id, exercise_id, is_hidden, created_at)
            VALUES ($1, $2, $3, 1, $4)
            ON CONFLICT(user_id, exercise_id) DO UPDATE SET is_hidden = 1
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(exercise_id.to_string())
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to hide exercise: {e}")))?;
        Ok(())
    }

    /// Unhide a system exercise; `false` when it was not hidden
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn show(&self, exercise_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM user_exercise_preferences
            WHERE exercise_id = $1 AND user_id = $2 AND is_hidden = 1
            ",
        )
        .bind(exercise_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to show exercise: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_exercise(row: &SqliteRow) -> AppResult<Exercise> {
    let category: String = row.get("category");
    let weight_unit: String = row.get("weight_unit");
    let distance_unit: String = row.get("distance_unit");

    Ok(Exercise {
        id: uuid_column(row, "id")?,
        user_id: optional_uuid_column(row, "user_id")?,
        name: row.get("name"),
        category: ExerciseCategory::parse(&category),
        tracking: tracking_columns(row),
        weight_unit: WeightUnit::parse(&weight_unit),
        distance_unit: DistanceUnit::parse(&distance_unit),
        notes: row.get("notes"),
        is_system: row.get("is_system"),
        is_hidden: row.get("is_hidden"),
        created_at: timestamp_column(row, "created_at")?,
        updated_at: timestamp_column(row, "updated_at")?,
    })
}
