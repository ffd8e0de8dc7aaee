// ABOUTME: Workout template database operations: ordered rows, circuit blocks, planned sets
// ABOUTME: Every multi-row mutation runs in one transaction and rewrites positions 1..n
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Templates
//!
//! A template is an ordered list of exercise rows. Rows expanded from a
//! circuit belong to a `template_circuit_blocks` row and stay contiguous:
//! inserts place the whole run at one position, reorders that would split
//! a block are rejected, and removing the last row of a block removes the
//! block. Positions are rewritten as `1..n` after every structural change.

use super::circuits::CircuitsManager;
use super::exercises::ExercisesManager;
use super::{
    begin, commit, optional_uuid_column, set_value_columns, timestamp_column, tracking_columns,
    uuid_column, write_error, Database,
};
use crate::constants::limits::MAX_PLANNED_SETS;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use anyhow::Result;
use chrono::Utc;
use setlog_core::models::{
    AddTemplateCircuitRequest, AddTemplateExerciseRequest, CircuitBlock, CreateTemplateRequest,
    ExerciseCategory, PlannedSet, PlannedSetRequest, SetValues, TemplateDetail, TemplateExercise,
    UpdateCircuitBlockRequest, UpdateTemplateExerciseRequest, UpdateTemplateRequest,
    WorkoutTemplate,
};
use setlog_core::models::validation::patch_text;
use setlog_core::time::format_timestamp;
use setlog_training::blocks::{
    insert_run, plan_circuit_block, remove_ids, rounds_change, validate_reorder, RoundsChange,
};
use setlog_training::numbering::{compact, ensure_permutation, sequential};
use sqlx::{sqlite::SqliteRow, Row, Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

type Tx = Transaction<'static, Sqlite>;

const TEMPLATE_COLUMNS: &str = r"
    t.id, t.user_id, t.name, t.description, t.created_at, t.updated_at,
    (SELECT COUNT(*) FROM template_exercises te WHERE te.template_id = t.id) AS exercise_count
";

impl Database {
    /// Create template, block, row and planned set tables
    pub(super) async fn migrate_templates(&self) -> Result<()> {
        self.execute_all(&[
            r"
            CREATE TABLE IF NOT EXISTS workout_templates (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_workout_templates_user ON workout_templates(user_id)",
            r"
            CREATE TABLE IF NOT EXISTS template_circuit_blocks (
                id TEXT PRIMARY KEY,
                template_id TEXT NOT NULL REFERENCES workout_templates(id) ON DELETE CASCADE,
                circuit_id TEXT NOT NULL,
                circuit_name TEXT NOT NULL,
                rounds INTEGER NOT NULL,
                rest_between_rounds_seconds INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS template_exercises (
                id TEXT PRIMARY KEY,
                template_id TEXT NOT NULL REFERENCES workout_templates(id) ON DELETE CASCADE,
                exercise_id TEXT NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                block_id TEXT REFERENCES template_circuit_blocks(id) ON DELETE CASCADE,
                circuit_id TEXT,
                circuit_rounds INTEGER,
                rest_after_seconds INTEGER,
                notes TEXT,
                created_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_template_exercises_template ON template_exercises(template_id, position)",
            r"
            CREATE TABLE IF NOT EXISTS planned_sets (
                id TEXT PRIMARY KEY,
                template_exercise_id TEXT NOT NULL REFERENCES template_exercises(id) ON DELETE CASCADE,
                set_number INTEGER NOT NULL,
                reps INTEGER,
                weight REAL,
                time_seconds INTEGER,
                distance REAL,
                rest_seconds INTEGER
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_planned_sets_row ON planned_sets(template_exercise_id, set_number)",
        ])
        .await
    }
}

/// Template composition operations
#[derive(Clone)]
pub struct TemplatesManager {
    pool: SqlitePool,
}

impl TemplatesManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List the user's templates, newest first
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<WorkoutTemplate>> {
        let sql = format!(
            "SELECT {TEMPLATE_COLUMNS} FROM workout_templates t WHERE t.user_id = $1 ORDER BY t.updated_at DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list templates: {e}")))?;
        rows.iter().map(row_to_template).collect()
    }

    /// Get a template header owned by the user or fail with 404
    ///
    /// # Errors
    ///
    /// Returns 404 when the template does not exist for this user
    pub async fn require(&self, template_id: Uuid, user_id: Uuid) -> AppResult<WorkoutTemplate> {
        let sql = format!(
            "SELECT {TEMPLATE_COLUMNS} FROM workout_templates t WHERE t.id = $1 AND t.user_id = $2"
        );
        let row = sqlx::query(&sql)
            .bind(template_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get template: {e}")))?
            .ok_or_else(|| AppError::not_found(format!("Template {template_id}")))?;
        row_to_template(&row)
    }

    /// Template with rows in position order, planned sets and block descriptors
    ///
    /// # Errors
    ///
    /// Returns 404 when the template does not exist for this user
    pub async fn detail(&self, template_id: Uuid, user_id: Uuid) -> AppResult<TemplateDetail> {
        let template = self.require(template_id, user_id).await?;

        let rows = sqlx::query(
            r"
            SELECT te.id, te.template_id, te.exercise_id, e.name AS exercise_name, e.category,
                   e.tracks_weight, e.tracks_reps, e.tracks_time, e.tracks_distance,
                   te.position, te.block_id, te.circuit_id, te.circuit_rounds,
                   te.rest_after_seconds, te.notes
            FROM template_exercises te
            INNER JOIN exercises e ON e.id = te.exercise_id
            WHERE te.template_id = $1
            ORDER BY te.position, te.created_at
            ",
        )
        .bind(template_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load template exercises: {e}")))?;
        let mut exercises = rows
            .iter()
            .map(row_to_template_exercise)
            .collect::<AppResult<Vec<_>>>()?;

        let mut planned = self.planned_sets_by_row(template_id).await?;
        for exercise in &mut exercises {
            exercise.planned_sets = planned.remove(&exercise.id).unwrap_or_default();
        }

        let block_rows = sqlx::query(
            r"
            SELECT id, template_id, circuit_id, circuit_name, rounds, rest_between_rounds_seconds
            FROM template_circuit_blocks
            WHERE template_id = $1
            ",
        )
        .bind(template_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load circuit blocks: {e}")))?;
        let mut blocks = block_rows
            .iter()
            .map(|row| row_to_block(row, &exercises))
            .collect::<AppResult<Vec<_>>>()?;
        blocks.sort_by_key(|block| {
            block
                .template_exercise_ids
                .first()
                .and_then(|first| exercises.iter().position(|e| e.id == *first))
                .unwrap_or(usize::MAX)
        });

        Ok(TemplateDetail {
            template,
            exercises,
            blocks,
        })
    }

    async fn planned_sets_by_row(&self, template_id: Uuid) -> AppResult<HashMap<Uuid, Vec<PlannedSet>>> {
        let rows = sqlx::query(
            r"
            SELECT ps.id, ps.template_exercise_id, ps.set_number, ps.reps, ps.weight,
                   ps.time_seconds, ps.distance, ps.rest_seconds
            FROM planned_sets ps
            INNER JOIN template_exercises te ON te.id = ps.template_exercise_id
            WHERE te.template_id = $1
            ORDER BY ps.template_exercise_id, ps.set_number
            ",
        )
        .bind(template_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load planned sets: {e}")))?;

        let mut grouped: HashMap<Uuid, Vec<PlannedSet>> = HashMap::new();
        for row in &rows {
            let set = row_to_planned_set(row)?;
            grouped.entry(set.template_exercise_id).or_default().push(set);
        }
        Ok(grouped)
    }

    /// Create an empty template
    ///
    /// # Errors
    ///
    /// Returns 400 for an invalid request
    pub async fn create(&self, user_id: Uuid, request: &CreateTemplateRequest) -> AppResult<WorkoutTemplate> {
        request.validate()?;
        let now = Utc::now();
        let template = WorkoutTemplate {
            id: Uuid::new_v4(),
            user_id,
            name: request.name.trim().to_owned(),
            description: request.description.clone(),
            exercise_count: 0,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r"
            INSERT INTO workout_templates (id, user_id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ",
        )
        .bind(template.id.to_string())
        .bind(user_id.to_string())
        .bind(&template.name)
        .bind(&template.description)
        .bind(format_timestamp(now))
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "Failed to create template", "Template already exists"))?;

        Ok(template)
    }

    /// Rename or re-describe a template
    ///
    /// # Errors
    ///
    /// Returns 404 when the template does not exist for this user, 400 for invalid values
    pub async fn update(
        &self,
        template_id: Uuid,
        user_id: Uuid,
        request: &UpdateTemplateRequest,
    ) -> AppResult<WorkoutTemplate> {
        request.validate()?;
        let existing = self.require(template_id, user_id).await?;

        sqlx::query(
            r"
            UPDATE workout_templates SET name = $1, description = $2, updated_at = $3
            WHERE id = $4 AND user_id = $5
            ",
        )
        .bind(
            request
                .name
                .as_deref()
                .map_or_else(|| existing.name.clone(), |n| n.trim().to_owned()),
        )
        .bind(patch_text(
            request.description.as_deref(),
            existing.description.as_deref(),
        ))
        .bind(format_timestamp(Utc::now()))
        .bind(template_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update template: {e}")))?;

        self.require(template_id, user_id).await
    }

    /// Delete a template with its rows, blocks and planned sets
    ///
    /// Sessions started from it keep their snapshot rows.
    ///
    /// # Errors
    ///
    /// Returns 404 when the template does not exist for this user
    pub async fn delete(&self, template_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM workout_templates WHERE id = $1 AND user_id = $2")
            .bind(template_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete template: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Template {template_id}")));
        }
        Ok(())
    }

    /// Insert a standalone exercise row at a position (appended when absent)
    ///
    /// # Errors
    ///
    /// Returns 404 for an unknown template or exercise, 400 for invalid values
    pub async fn add_exercise(
        &self,
        template_id: Uuid,
        user_id: Uuid,
        request: &AddTemplateExerciseRequest,
    ) -> AppResult<TemplateDetail> {
        request.validate()?;
        self.require(template_id, user_id).await?;
        ExercisesManager::new(self.pool.clone())
            .require(request.exercise_id, user_id)
            .await?;

        let row_id = Uuid::new_v4();
        let mut tx = begin(&self.pool).await?;
        let order = row_order(&mut tx, template_id).await?;
        let positions = insert_run(&order, request.position, &[(row_id, None)])?;
        insert_row(
            &mut tx,
            &NewRow {
                id: row_id,
                template_id,
                exercise_id: request.exercise_id,
                block: None,
                rest_after_seconds: request.rest_after_seconds,
                notes: request.notes.as_deref(),
            },
        )
        .await?;
        for set_number in 1..=request.sets.unwrap_or(0) {
            let values = SetValues {
                rest_seconds: request.rest_after_seconds,
                ..SetValues::default()
            };
            insert_planned_set(&mut tx, row_id, set_number, &values).await?;
        }

        write_positions(&mut tx, &positions).await?;
        touch(&mut tx, template_id).await?;
        commit(tx).await?;

        self.detail(template_id, user_id).await
    }

    /// Change a row's notes or rest
    ///
    /// # Errors
    ///
    /// Returns 404 for an unknown template or row, 400 for invalid values
    pub async fn update_exercise(
        &self,
        template_id: Uuid,
        row_id: Uuid,
        user_id: Uuid,
        request: &UpdateTemplateExerciseRequest,
    ) -> AppResult<TemplateDetail> {
        request.validate()?;
        self.require(template_id, user_id).await?;

        let result = sqlx::query(
            r"
            UPDATE template_exercises
            SET rest_after_seconds = COALESCE($1, rest_after_seconds),
                notes = CASE WHEN $2 IS NULL THEN notes ELSE NULLIF(TRIM($2), '') END
            WHERE id = $3 AND template_id = $4
            ",
        )
        .bind(request.rest_after_seconds)
        .bind(&request.notes)
        .bind(row_id.to_string())
        .bind(template_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update template exercise: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Template exercise {row_id}")));
        }

        self.detail(template_id, user_id).await
    }

    /// Remove a row and its planned sets; a block left without rows is removed
    ///
    /// # Errors
    ///
    /// Returns 404 for an unknown template or row
    pub async fn remove_exercise(&self, template_id: Uuid, row_id: Uuid, user_id: Uuid) -> AppResult<()> {
        self.require(template_id, user_id).await?;

        let mut tx = begin(&self.pool).await?;
        let order = row_order(&mut tx, template_id).await?;
        let Some((_, block_id)) = order.iter().find(|(id, _)| *id == row_id).copied() else {
            return Err(AppError::not_found(format!("Template exercise {row_id}")));
        };

        sqlx::query("DELETE FROM template_exercises WHERE id = $1")
            .bind(row_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to remove template exercise: {e}")))?;

        if let Some(block_id) = block_id {
            let block_survives = order
                .iter()
                .any(|(id, block)| *id != row_id && *block == Some(block_id));
            if !block_survives {
                delete_block_row(&mut tx, block_id).await?;
            }
        }

        let ids: Vec<Uuid> = order.iter().map(|(id, _)| *id).collect();
        write_positions(&mut tx, &remove_ids(&ids, &[row_id])).await?;
        touch(&mut tx, template_id).await?;
        commit(tx).await
    }

    /// Reorder rows; the list must be a permutation that keeps every block contiguous
    ///
    /// # Errors
    ///
    /// Returns 404 for an unknown template, 400 for an invalid order
    pub async fn reorder_exercises(
        &self,
        template_id: Uuid,
        user_id: Uuid,
        ids: &[Uuid],
    ) -> AppResult<TemplateDetail> {
        self.require(template_id, user_id).await?;

        let mut tx = begin(&self.pool).await?;
        let order = row_order(&mut tx, template_id).await?;
        let reordered = validate_reorder(&order, ids)?;
        let new_ids: Vec<Uuid> = reordered.iter().map(|(id, _)| *id).collect();
        write_positions(&mut tx, &new_ids).await?;
        touch(&mut tx, template_id).await?;
        commit(tx).await?;

        self.detail(template_id, user_id).await
    }

    /// Expand a circuit into a contiguous block of rows with one planned set per round
    ///
    /// # Errors
    ///
    /// Returns 404 for an unknown template or circuit, 400 for an empty circuit
    /// or invalid rounds
    pub async fn add_circuit(
        &self,
        template_id: Uuid,
        user_id: Uuid,
        request: &AddTemplateCircuitRequest,
    ) -> AppResult<TemplateDetail> {
        request.validate()?;
        self.require(template_id, user_id).await?;
        let circuit = CircuitsManager::new(self.pool.clone())
            .require(request.circuit_id, user_id)
            .await?;
        let rounds = request.rounds.unwrap_or(circuit.rounds);
        let planned = plan_circuit_block(&circuit, rounds)?;

        let block_id = Uuid::new_v4();
        let mut tx = begin(&self.pool).await?;
        let order = row_order(&mut tx, template_id).await?;
        let run: Vec<(Uuid, Option<Uuid>)> = planned
            .iter()
            .map(|_| (Uuid::new_v4(), Some(block_id)))
            .collect();
        let positions = insert_run(&order, request.position, &run)?;

        sqlx::query(
            r"
            INSERT INTO template_circuit_blocks (
                id, template_id, circuit_id, circuit_name, rounds, rest_between_rounds_seconds, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(block_id.to_string())
        .bind(template_id.to_string())
        .bind(circuit.id.to_string())
        .bind(&circuit.name)
        .bind(rounds)
        .bind(circuit.rest_between_rounds_seconds)
        .bind(format_timestamp(Utc::now()))
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create circuit block: {e}")))?;

        for (row, (row_id, _)) in planned.iter().zip(&run) {
            let row_id = *row_id;
            insert_row(
                &mut tx,
                &NewRow {
                    id: row_id,
                    template_id,
                    exercise_id: row.exercise_id,
                    block: Some((block_id, circuit.id, rounds)),
                    rest_after_seconds: Some(row.rest_after_seconds),
                    notes: None,
                },
            )
            .await?;
            for (set_number, values) in (1..).zip(&row.sets) {
                insert_planned_set(&mut tx, row_id, set_number, values).await?;
            }
        }

        write_positions(&mut tx, &positions).await?;
        touch(&mut tx, template_id).await?;
        commit(tx).await?;

        AppLogger::log_circuit_expanded(user_id, circuit.id, template_id, run.len(), rounds);
        self.detail(template_id, user_id).await
    }

    /// Change a block's rounds (every row grows or shrinks to that many planned
    /// sets) or its rest between rounds
    ///
    /// # Errors
    ///
    /// Returns 404 for an unknown template or block, 400 for invalid values
    pub async fn update_block(
        &self,
        template_id: Uuid,
        block_id: Uuid,
        user_id: Uuid,
        request: &UpdateCircuitBlockRequest,
    ) -> AppResult<TemplateDetail> {
        request.validate()?;
        self.require(template_id, user_id).await?;

        let mut tx = begin(&self.pool).await?;
        let block = sqlx::query(
            "SELECT rounds, rest_between_rounds_seconds FROM template_circuit_blocks WHERE id = $1 AND template_id = $2",
        )
        .bind(block_id.to_string())
        .bind(template_id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to get circuit block: {e}")))?
        .ok_or_else(|| AppError::not_found(format!("Circuit block {block_id}")))?;
        let rounds = request.rounds.unwrap_or_else(|| block.get("rounds"));
        let rest_between_rounds = request
            .rest_between_rounds_seconds
            .unwrap_or_else(|| block.get("rest_between_rounds_seconds"));

        sqlx::query(
            "UPDATE template_circuit_blocks SET rounds = $1, rest_between_rounds_seconds = $2 WHERE id = $3",
        )
        .bind(rounds)
        .bind(rest_between_rounds)
        .bind(block_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update circuit block: {e}")))?;

        let members: Vec<Uuid> = row_order(&mut tx, template_id)
            .await?
            .into_iter()
            .filter(|(_, block)| *block == Some(block_id))
            .map(|(id, _)| id)
            .collect();

        for row_id in &members {
            sqlx::query("UPDATE template_exercises SET circuit_rounds = $1 WHERE id = $2")
                .bind(rounds)
                .bind(row_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to update circuit rounds: {e}")))?;
            resize_planned_sets(&mut tx, *row_id, rounds).await?;
        }

        if let (Some(rest), Some(last)) = (request.rest_between_rounds_seconds, members.last()) {
            sqlx::query("UPDATE template_exercises SET rest_after_seconds = $1 WHERE id = $2")
                .bind(rest)
                .bind(last.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to update round rest: {e}")))?;
            sqlx::query("UPDATE planned_sets SET rest_seconds = $1 WHERE template_exercise_id = $2")
                .bind(rest)
                .bind(last.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to update round rest: {e}")))?;
        }

        touch(&mut tx, template_id).await?;
        commit(tx).await?;
        self.detail(template_id, user_id).await
    }

    /// Remove a whole block, keeping the remaining rows in their relative order
    ///
    /// # Errors
    ///
    /// Returns 404 for an unknown template or block
    pub async fn remove_block(&self, template_id: Uuid, block_id: Uuid, user_id: Uuid) -> AppResult<()> {
        self.require(template_id, user_id).await?;

        let mut tx = begin(&self.pool).await?;
        let exists = sqlx::query("SELECT 1 FROM template_circuit_blocks WHERE id = $1 AND template_id = $2")
            .bind(block_id.to_string())
            .bind(template_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to get circuit block: {e}")))?;
        if exists.is_none() {
            return Err(AppError::not_found(format!("Circuit block {block_id}")));
        }

        let order = row_order(&mut tx, template_id).await?;
        let removed: Vec<Uuid> = order
            .iter()
            .filter(|(_, block)| *block == Some(block_id))
            .map(|(id, _)| *id)
            .collect();
        delete_block_row(&mut tx, block_id).await?;

        let ids: Vec<Uuid> = order.iter().map(|(id, _)| *id).collect();
        write_positions(&mut tx, &remove_ids(&ids, &removed)).await?;
        touch(&mut tx, template_id).await?;
        commit(tx).await
    }

    /// Append a planned set with the next set number
    ///
    /// # Errors
    ///
    /// Returns 404 for an unknown template or row, 400 for invalid values or too many sets
    pub async fn add_planned_set(
        &self,
        template_id: Uuid,
        row_id: Uuid,
        user_id: Uuid,
        request: &PlannedSetRequest,
    ) -> AppResult<PlannedSet> {
        request.validate()?;
        self.require(template_id, user_id).await?;

        let mut tx = begin(&self.pool).await?;
        let exists = sqlx::query("SELECT 1 FROM template_exercises WHERE id = $1 AND template_id = $2")
            .bind(row_id.to_string())
            .bind(template_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to get template exercise: {e}")))?;
        if exists.is_none() {
            return Err(AppError::not_found(format!("Template exercise {row_id}")));
        }

        let count = planned_set_numbers(&mut tx, row_id).await?.len();
        let set_number = i32::try_from(count + 1)
            .map_err(|_| AppError::invalid_input("Too many planned sets"))?;
        if set_number > MAX_PLANNED_SETS {
            return Err(AppError::invalid_input(format!(
                "A template exercise can have at most {MAX_PLANNED_SETS} planned sets"
            )));
        }
        let id = insert_planned_set(&mut tx, row_id, set_number, &request.values).await?;
        touch(&mut tx, template_id).await?;
        commit(tx).await?;

        Ok(PlannedSet {
            id,
            template_exercise_id: row_id,
            set_number,
            values: request.values,
        })
    }

    /// Replace a planned set's values
    ///
    /// # Errors
    ///
    /// Returns 404 when the set does not belong to one of the user's templates
    pub async fn update_planned_set(
        &self,
        set_id: Uuid,
        user_id: Uuid,
        request: &PlannedSetRequest,
    ) -> AppResult<PlannedSet> {
        request.validate()?;
        let existing = self.require_planned_set(set_id, user_id).await?;
        let values = request.values;

        sqlx::query(
            r"
            UPDATE planned_sets
            SET reps = $1, weight = $2, time_seconds = $3, distance = $4, rest_seconds = $5
            WHERE id = $6
            ",
        )
        .bind(values.reps)
        .bind(values.weight)
        .bind(values.time_seconds)
        .bind(values.distance)
        .bind(values.rest_seconds)
        .bind(set_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update planned set: {e}")))?;

        Ok(PlannedSet { values, ..existing })
    }

    /// Delete a planned set and renumber the row's remaining sets
    ///
    /// # Errors
    ///
    /// Returns 404 when the set does not belong to one of the user's templates
    pub async fn delete_planned_set(&self, set_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let existing = self.require_planned_set(set_id, user_id).await?;

        let mut tx = begin(&self.pool).await?;
        sqlx::query("DELETE FROM planned_sets WHERE id = $1")
            .bind(set_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete planned set: {e}")))?;
        let remaining = planned_set_numbers(&mut tx, existing.template_exercise_id).await?;
        write_set_numbers(&mut tx, &compact(&remaining)).await?;
        commit(tx).await
    }

    /// Renumber a row's planned sets 1..n in the given order
    ///
    /// # Errors
    ///
    /// Returns 404 for an unknown template or row, 400 when `ids` is not a
    /// permutation of the row's sets
    pub async fn reorder_planned_sets(
        &self,
        template_id: Uuid,
        row_id: Uuid,
        user_id: Uuid,
        ids: &[Uuid],
    ) -> AppResult<Vec<PlannedSet>> {
        self.require(template_id, user_id).await?;

        let mut tx = begin(&self.pool).await?;
        let exists = sqlx::query("SELECT 1 FROM template_exercises WHERE id = $1 AND template_id = $2")
            .bind(row_id.to_string())
            .bind(template_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to get template exercise: {e}")))?;
        if exists.is_none() {
            return Err(AppError::not_found(format!("Template exercise {row_id}")));
        }

        let existing: Vec<Uuid> = planned_set_numbers(&mut tx, row_id)
            .await?
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        ensure_permutation(&existing, ids)?;
        write_set_numbers(&mut tx, &sequential(ids)).await?;
        touch(&mut tx, template_id).await?;
        commit(tx).await?;

        let rows = sqlx::query(
            r"
            SELECT id, template_exercise_id, set_number, reps, weight, time_seconds, distance, rest_seconds
            FROM planned_sets WHERE template_exercise_id = $1 ORDER BY set_number
            ",
        )
        .bind(row_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load planned sets: {e}")))?;
        rows.iter().map(row_to_planned_set).collect()
    }

    async fn require_planned_set(&self, set_id: Uuid, user_id: Uuid) -> AppResult<PlannedSet> {
        let row = sqlx::query(
            r"
            SELECT ps.id, ps.template_exercise_id, ps.set_number, ps.reps, ps.weight,
                   ps.time_seconds, ps.distance, ps.rest_seconds
            FROM planned_sets ps
            INNER JOIN template_exercises te ON te.id = ps.template_exercise_id
            INNER JOIN workout_templates t ON t.id = te.template_id
            WHERE ps.id = $1 AND t.user_id = $2
            ",
        )
        .bind(set_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get planned set: {e}")))?
        .ok_or_else(|| AppError::not_found(format!("Planned set {set_id}")))?;
        row_to_planned_set(&row)
    }
}

struct NewRow<'a> {
    id: Uuid,
    template_id: Uuid,
    exercise_id: Uuid,
    /// `(block_id, circuit_id, rounds)` for block members
    block: Option<(Uuid, Uuid, i32)>,
    rest_after_seconds: Option<i32>,
    notes: Option<&'a str>,
}

/// Insert a row at a placeholder position; callers rewrite positions afterwards
async fn insert_row(tx: &mut Tx, row: &NewRow<'_>) -> AppResult<()> {
    sqlx::query(
        r"
        INSERT INTO template_exercises (
            id, template_id, exercise_id, position, block_id, circuit_id, circuit_rounds,
            rest_after_seconds, notes, created_at
        ) VALUES ($1, $2, $3, 0, $4, $5, $6, $7, $8, $9)
        ",
    )
    .bind(row.id.to_string())
    .bind(row.template_id.to_string())
    .bind(row.exercise_id.to_string())
    .bind(row.block.map(|(block_id, _, _)| block_id.to_string()))
    .bind(row.block.map(|(_, circuit_id, _)| circuit_id.to_string()))
    .bind(row.block.map(|(_, _, rounds)| rounds))
    .bind(row.rest_after_seconds)
    .bind(row.notes)
    .bind(format_timestamp(Utc::now()))
    .execute(&mut **tx)
    .await
    .map_err(|e| write_error(e, "Failed to add template exercise", "Duplicate template exercise"))?;
    Ok(())
}

async fn insert_planned_set(
    tx: &mut Tx,
    row_id: Uuid,
    set_number: i32,
    values: &SetValues,
) -> AppResult<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r"
        INSERT INTO planned_sets (
            id, template_exercise_id, set_number, reps, weight, time_seconds, distance, rest_seconds
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ",
    )
    .bind(id.to_string())
    .bind(row_id.to_string())
    .bind(set_number)
    .bind(values.reps)
    .bind(values.weight)
    .bind(values.time_seconds)
    .bind(values.distance)
    .bind(values.rest_seconds)
    .execute(&mut **tx)
    .await
    .map_err(|e| AppError::database(format!("Failed to add planned set: {e}")))?;
    Ok(id)
}

/// Rows of a template as `(row_id, block_id)` in position order
async fn row_order(tx: &mut Tx, template_id: Uuid) -> AppResult<Vec<(Uuid, Option<Uuid>)>> {
    let rows = sqlx::query(
        "SELECT id, block_id FROM template_exercises WHERE template_id = $1 ORDER BY position, created_at",
    )
    .bind(template_id.to_string())
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| AppError::database(format!("Failed to load template order: {e}")))?;

    rows.iter()
        .map(|row| Ok((uuid_column(row, "id")?, optional_uuid_column(row, "block_id")?)))
        .collect()
}

/// Write positions 1..n for `ids` in order
async fn write_positions(tx: &mut Tx, ids: &[Uuid]) -> AppResult<()> {
    for (id, position) in sequential(ids) {
        sqlx::query("UPDATE template_exercises SET position = $1 WHERE id = $2")
            .bind(position)
            .bind(id.to_string())
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to write template positions: {e}")))?;
    }
    Ok(())
}

async fn planned_set_numbers(tx: &mut Tx, row_id: Uuid) -> AppResult<Vec<(Uuid, i32)>> {
    let rows = sqlx::query(
        "SELECT id, set_number FROM planned_sets WHERE template_exercise_id = $1 ORDER BY set_number",
    )
    .bind(row_id.to_string())
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| AppError::database(format!("Failed to load planned set numbers: {e}")))?;

    rows.iter()
        .map(|row| Ok((uuid_column(row, "id")?, row.get("set_number"))))
        .collect()
}

async fn write_set_numbers(tx: &mut Tx, numbers: &[(Uuid, i32)]) -> AppResult<()> {
    for (id, set_number) in numbers {
        sqlx::query("UPDATE planned_sets SET set_number = $1 WHERE id = $2")
            .bind(set_number)
            .bind(id.to_string())
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to renumber planned sets: {e}")))?;
    }
    Ok(())
}

/// Grow or shrink a block row's planned sets to `rounds`; new sets copy the last set
async fn resize_planned_sets(tx: &mut Tx, row_id: Uuid, rounds: i32) -> AppResult<()> {
    let numbers = planned_set_numbers(tx, row_id).await?;
    write_set_numbers(tx, &compact(&numbers)).await?;
    let current = i32::try_from(numbers.len()).unwrap_or(i32::MAX);

    match rounds_change(current, rounds) {
        RoundsChange::Unchanged => Ok(()),
        RoundsChange::Shrink(keep) => {
            sqlx::query("DELETE FROM planned_sets WHERE template_exercise_id = $1 AND set_number > $2")
                .bind(row_id.to_string())
                .bind(keep)
                .execute(&mut **tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to shrink planned sets: {e}")))?;
            Ok(())
        }
        RoundsChange::Grow(new_numbers) => {
            let last = sqlx::query(
                r"
                SELECT reps, weight, time_seconds, distance, rest_seconds FROM planned_sets
                WHERE template_exercise_id = $1 ORDER BY set_number DESC LIMIT 1
                ",
            )
            .bind(row_id.to_string())
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to read planned set: {e}")))?;
            let values = last.as_ref().map(set_value_columns).unwrap_or_default();
            for set_number in new_numbers {
                insert_planned_set(tx, row_id, set_number, &values).await?;
            }
            Ok(())
        }
    }
}

async fn delete_block_row(tx: &mut Tx, block_id: Uuid) -> AppResult<()> {
    sqlx::query("DELETE FROM template_circuit_blocks WHERE id = $1")
        .bind(block_id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to remove circuit block: {e}")))?;
    Ok(())
}

async fn touch(tx: &mut Tx, template_id: Uuid) -> AppResult<()> {
    sqlx::query("UPDATE workout_templates SET updated_at = $1 WHERE id = $2")
        .bind(format_timestamp(Utc::now()))
        .bind(template_id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to touch template: {e}")))?;
    Ok(())
}

fn row_to_template(row: &SqliteRow) -> AppResult<WorkoutTemplate> {
    Ok(WorkoutTemplate {
        id: uuid_column(row, "id")?,
        user_id: uuid_column(row, "user_id")?,
        name: row.get("name"),
        description: row.get("description"),
        exercise_count: row.get("exercise_count"),
        created_at: timestamp_column(row, "created_at")?,
        updated_at: timestamp_column(row, "updated_at")?,
    })
}

fn row_to_template_exercise(row: &SqliteRow) -> AppResult<TemplateExercise> {
    let category: String = row.get("category");
    Ok(TemplateExercise {
        id: uuid_column(row, "id")?,
        template_id: uuid_column(row, "template_id")?,
        exercise_id: uuid_column(row, "exercise_id")?,
        exercise_name: row.get("exercise_name"),
        category: ExerciseCategory::parse(&category),
        tracking: tracking_columns(row),
        position: row.get("position"),
        block_id: optional_uuid_column(row, "block_id")?,
        circuit_id: optional_uuid_column(row, "circuit_id")?,
        circuit_rounds: row.get("circuit_rounds"),
        rest_after_seconds: row.get("rest_after_seconds"),
        notes: row.get("notes"),
        planned_sets: Vec::new(),
    })
}

fn row_to_block(row: &SqliteRow, exercises: &[TemplateExercise]) -> AppResult<CircuitBlock> {
    let id = uuid_column(row, "id")?;
    Ok(CircuitBlock {
        id,
        template_id: uuid_column(row, "template_id")?,
        circuit_id: uuid_column(row, "circuit_id")?,
        circuit_name: row.get("circuit_name"),
        rounds: row.get("rounds"),
        rest_between_rounds_seconds: row.get("rest_between_rounds_seconds"),
        template_exercise_ids: exercises
            .iter()
            .filter(|e| e.block_id == Some(id))
            .map(|e| e.id)
            .collect(),
    })
}

pub(crate) fn row_to_planned_set(row: &SqliteRow) -> AppResult<PlannedSet> {
    Ok(PlannedSet {
        id: uuid_column(row, "id")?,
        template_exercise_id: uuid_column(row, "template_exercise_id")?,
        set_number: row.get("set_number"),
        values: set_value_columns(row),
    })
}
