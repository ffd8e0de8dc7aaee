// ABOUTME: Workout session database operations: start, snapshot exercises, performed sets, end
// ABOUTME: One active session per user, contiguous set numbering and pre-fill candidate loading
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Sessions
//!
//! A session snapshots its template's rows into `session_exercises` when it
//! starts; later template edits do not touch running or past sessions.
//! Planned sets are not copied: a snapshot row keeps the id of the template
//! row it came from and planned sets are read through it.

use super::circuits::CircuitsManager;
use super::exercises::ExercisesManager;
use super::schedule::ScheduleManager;
use super::templates::{row_to_planned_set, TemplatesManager};
use super::{
    begin, commit, optional_timestamp_column, optional_uuid_column, set_value_columns,
    timestamp_column, tracking_columns, uuid_column, write_error, Database,
};
use crate::constants::limits::{DEFAULT_SESSION_LIST_LIMIT, MAX_SESSION_LIST_LIMIT};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use anyhow::Result;
use chrono::{DateTime, Utc};
use setlog_core::models::{
    AddSessionCircuitRequest, AddSessionExerciseRequest, EndSessionRequest, ExerciseCategory,
    LastPerformance, PerformedSet, PerformedSetRequest, PlannedSet, PrefillSuggestion,
    ScheduleStatus, SessionDetail, SessionExercise, SessionSummary, StartSessionRequest,
    UpdateSessionRequest, WorkoutSession,
};
use setlog_core::models::validation::patch_text;
use setlog_core::time::format_timestamp;
use setlog_training::blocks::plan_circuit_block;
use setlog_training::numbering::{compact, sequential};
use setlog_training::prefill::{next_set_number, suggest, PrefillCandidates};
use setlog_training::volume::total_volume;
use sqlx::{sqlite::SqliteRow, Row, Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

type Tx = Transaction<'static, Sqlite>;

const DEFAULT_SESSION_NAME: &str = "Workout";

const SESSION_COLUMNS: &str =
    "s.id, s.user_id, s.template_id, s.schedule_item_id, s.name, s.notes, s.started_at, s.ended_at";

const SESSION_EXERCISE_COLUMNS: &str = r"
    se.id, se.session_id, se.exercise_id, se.exercise_name, se.category,
    se.tracks_weight, se.tracks_reps, se.tracks_time, se.tracks_distance, se.position,
    se.template_exercise_id, se.block_id, se.circuit_id, se.circuit_rounds, se.rest_after_seconds
";

const PERFORMED_SET_COLUMNS: &str = r"
    ps.id, ps.session_exercise_id, ps.set_number, ps.reps, ps.weight, ps.time_seconds,
    ps.distance, ps.rest_seconds, ps.is_warmup, ps.completed_at
";

impl Database {
    /// Create session, snapshot exercise and performed set tables
    pub(super) async fn migrate_sessions(&self) -> Result<()> {
        self.execute_all(&[
            r"
            CREATE TABLE IF NOT EXISTS workout_sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                template_id TEXT REFERENCES workout_templates(id) ON DELETE SET NULL,
                schedule_item_id TEXT REFERENCES schedule_items(id) ON DELETE SET NULL,
                name TEXT NOT NULL,
                notes TEXT,
                started_at TEXT NOT NULL,
                ended_at TEXT
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_workout_sessions_user ON workout_sessions(user_id, started_at)",
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_workout_sessions_one_active
            ON workout_sessions(user_id) WHERE ended_at IS NULL
            ",
            r"
            CREATE TABLE IF NOT EXISTS session_exercises (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL REFERENCES workout_sessions(id) ON DELETE CASCADE,
                exercise_id TEXT REFERENCES exercises(id) ON DELETE SET NULL,
                exercise_name TEXT NOT NULL,
                category TEXT NOT NULL,
                tracks_weight INTEGER NOT NULL,
                tracks_reps INTEGER NOT NULL,
                tracks_time INTEGER NOT NULL,
                tracks_distance INTEGER NOT NULL,
                position INTEGER NOT NULL,
                template_exercise_id TEXT REFERENCES template_exercises(id) ON DELETE SET NULL,
                block_id TEXT,
                circuit_id TEXT,
                circuit_rounds INTEGER,
                rest_after_seconds INTEGER
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_session_exercises_session ON session_exercises(session_id, position)",
            "CREATE INDEX IF NOT EXISTS idx_session_exercises_exercise ON session_exercises(exercise_id)",
            r"
            CREATE TABLE IF NOT EXISTS performed_sets (
                id TEXT PRIMARY KEY,
                session_exercise_id TEXT NOT NULL REFERENCES session_exercises(id) ON DELETE CASCADE,
                set_number INTEGER NOT NULL,
                reps INTEGER,
                weight REAL,
                time_seconds INTEGER,
                distance REAL,
                rest_seconds INTEGER,
                is_warmup INTEGER NOT NULL DEFAULT 0,
                completed_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_performed_sets_row ON performed_sets(session_exercise_id, set_number)",
        ])
        .await
    }
}

/// Workout session operations
#[derive(Clone)]
pub struct SessionsManager {
    pool: SqlitePool,
}

impl SessionsManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Start a session: ad-hoc, from a schedule item, or from a template
    ///
    /// Template rows are copied in position order with their circuit grouping.
    ///
    /// # Errors
    ///
    /// Returns 409 when the user already has an active session, 404 for an
    /// unknown schedule item or template, 400 for an invalid request
    pub async fn start(&self, user_id: Uuid, request: &StartSessionRequest) -> AppResult<SessionDetail> {
        request.validate()?;
        if let Some(active) = self.active(user_id).await? {
            return Err(AppError::already_exists(format!(
                "Session {} is still active; end it before starting another",
                active.id
            )));
        }

        let schedule_item = match request.schedule_item_id {
            Some(item_id) => Some(
                ScheduleManager::new(self.pool.clone())
                    .require(item_id, user_id)
                    .await?,
            ),
            None => None,
        };
        let template_id = schedule_item
            .as_ref()
            .map(|item| item.template_id)
            .or(request.template_id);
        let template = match template_id {
            Some(id) => Some(TemplatesManager::new(self.pool.clone()).require(id, user_id).await?),
            None => None,
        };

        let name = request.name.as_deref().map_or_else(
            || {
                template
                    .as_ref()
                    .map_or_else(|| DEFAULT_SESSION_NAME.to_owned(), |t| t.name.clone())
            },
            |n| n.trim().to_owned(),
        );
        let session_id = Uuid::new_v4();

        let mut tx = begin(&self.pool).await?;
        sqlx::query(
            r"
            INSERT INTO workout_sessions (id, user_id, template_id, schedule_item_id, name, started_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(session_id.to_string())
        .bind(user_id.to_string())
        .bind(template_id.map(|id| id.to_string()))
        .bind(request.schedule_item_id.map(|id| id.to_string()))
        .bind(&name)
        .bind(format_timestamp(Utc::now()))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            write_error(
                e,
                "Failed to start session",
                "An active session already exists; end it before starting another",
            )
        })?;

        if let Some(template_id) = template_id {
            copy_template_rows(&mut tx, session_id, template_id).await?;
        }
        commit(tx).await?;

        AppLogger::log_session_event(user_id, session_id, "started");
        self.detail(session_id, user_id).await
    }

    /// The user's unended session, if any
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn active(&self, user_id: Uuid) -> AppResult<Option<WorkoutSession>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM workout_sessions s WHERE s.user_id = $1 AND s.ended_at IS NULL"
        );
        let row = sqlx::query(&sql)
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get active session: {e}")))?;
        row.map(|r| row_to_session(&r)).transpose()
    }

    /// Get a session owned by the user or fail with 404
    ///
    /// # Errors
    ///
    /// Returns 404 when the session does not exist for this user
    pub async fn require(&self, session_id: Uuid, user_id: Uuid) -> AppResult<WorkoutSession> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM workout_sessions s WHERE s.id = $1 AND s.user_id = $2"
        );
        let row = sqlx::query(&sql)
            .bind(session_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get session: {e}")))?
            .ok_or_else(|| AppError::not_found(format!("Session {session_id}")))?;
        row_to_session(&row)
    }

    async fn require_active(&self, session_id: Uuid, user_id: Uuid) -> AppResult<WorkoutSession> {
        let session = self.require(session_id, user_id).await?;
        if !session.is_active() {
            return Err(AppError::invalid_input(format!(
                "Session {session_id} has ended; exercises and sets can no longer be added"
            )));
        }
        Ok(session)
    }

    /// Session with exercises, planned sets, performed sets, elapsed time and volume
    ///
    /// # Errors
    ///
    /// Returns 404 when the session does not exist for this user
    pub async fn detail(&self, session_id: Uuid, user_id: Uuid) -> AppResult<SessionDetail> {
        let session = self.require(session_id, user_id).await?;

        let sql = format!(
            r"
            SELECT {SESSION_EXERCISE_COLUMNS}
            FROM session_exercises se
            WHERE se.session_id = $1
            ORDER BY se.position
            "
        );
        let rows = sqlx::query(&sql)
            .bind(session_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load session exercises: {e}")))?;
        let mut exercises = rows
            .iter()
            .map(row_to_session_exercise)
            .collect::<AppResult<Vec<_>>>()?;

        let mut planned = self.planned_sets_for_session(session_id).await?;
        let mut performed = self.performed_sets_for_session(session_id).await?;
        for exercise in &mut exercises {
            exercise.performed_sets = performed.remove(&exercise.id).unwrap_or_default();
            if let Some(template_row) = exercise.template_exercise_id {
                exercise.planned_sets = planned.remove(&template_row).unwrap_or_default();
            }
        }

        let volume = total_volume(
            exercises
                .iter()
                .flat_map(|e| e.performed_sets.iter().map(|s| &s.values)),
        );
        Ok(SessionDetail {
            elapsed_seconds: session.elapsed_seconds(Utc::now()),
            total_volume: volume,
            session,
            exercises,
        })
    }

    async fn planned_sets_for_session(&self, session_id: Uuid) -> AppResult<HashMap<Uuid, Vec<PlannedSet>>> {
        let rows = sqlx::query(
            r"
            SELECT DISTINCT ps.id, ps.template_exercise_id, ps.set_number, ps.reps, ps.weight,
                   ps.time_seconds, ps.distance, ps.rest_seconds
            FROM planned_sets ps
            INNER JOIN session_exercises se ON se.template_exercise_id = ps.template_exercise_id
            WHERE se.session_id = $1
            ORDER BY ps.template_exercise_id, ps.set_number
            ",
        )
        .bind(session_id.to_string())
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

    async fn performed_sets_for_session(&self, session_id: Uuid) -> AppResult<HashMap<Uuid, Vec<PerformedSet>>> {
        let sql = format!(
            r"
            SELECT {PERFORMED_SET_COLUMNS}
            FROM performed_sets ps
            INNER JOIN session_exercises se ON se.id = ps.session_exercise_id
            WHERE se.session_id = $1
            ORDER BY ps.session_exercise_id, ps.set_number
            "
        );
        let rows = sqlx::query(&sql)
            .bind(session_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load performed sets: {e}")))?;

        let mut grouped: HashMap<Uuid, Vec<PerformedSet>> = HashMap::new();
        for row in &rows {
            let set = row_to_performed_set(row)?;
            grouped.entry(set.session_exercise_id).or_default().push(set);
        }
        Ok(grouped)
    }

    /// Most recent sessions first, with counts, volume and duration
    ///
    /// `limit` defaults to 50 and is capped at 500.
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails
    pub async fn list(&self, user_id: Uuid, limit: Option<u32>) -> AppResult<Vec<SessionSummary>> {
        let limit = limit
            .unwrap_or(DEFAULT_SESSION_LIST_LIMIT)
            .clamp(1, MAX_SESSION_LIST_LIMIT);

        let sql = format!(
            r"
            SELECT {SESSION_COLUMNS},
                   (SELECT COUNT(*) FROM session_exercises se WHERE se.session_id = s.id) AS exercise_count
            FROM workout_sessions s
            WHERE s.user_id = $1
            ORDER BY s.started_at DESC
            LIMIT $2
            "
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list sessions: {e}")))?;

        let set_rows = sqlx::query(
            r"
            SELECT se.session_id, ps.reps, ps.weight, ps.time_seconds, ps.distance, ps.rest_seconds
            FROM performed_sets ps
            INNER JOIN session_exercises se ON se.id = ps.session_exercise_id
            INNER JOIN workout_sessions s ON s.id = se.session_id
            WHERE s.user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load session volumes: {e}")))?;

        let mut sets_by_session: HashMap<Uuid, Vec<_>> = HashMap::new();
        for row in &set_rows {
            sets_by_session
                .entry(uuid_column(row, "session_id")?)
                .or_default()
                .push(set_value_columns(row));
        }

        rows.iter()
            .map(|row| {
                let session = row_to_session(row)?;
                let sets = sets_by_session.remove(&session.id).unwrap_or_default();
                Ok(SessionSummary {
                    exercise_count: row.get("exercise_count"),
                    set_count: i64::try_from(sets.len()).unwrap_or(i64::MAX),
                    total_volume: total_volume(&sets),
                    duration_seconds: session
                        .ended_at
                        .map(|_| session.elapsed_seconds(Utc::now())),
                    session,
                })
            })
            .collect()
    }

    /// Rename or annotate a session (active or ended)
    ///
    /// # Errors
    ///
    /// Returns 404 when the session does not exist for this user
    pub async fn update(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        request: &UpdateSessionRequest,
    ) -> AppResult<WorkoutSession> {
        request.validate()?;
        let existing = self.require(session_id, user_id).await?;

        sqlx::query("UPDATE workout_sessions SET name = $1, notes = $2 WHERE id = $3 AND user_id = $4")
            .bind(
                request
                    .name
                    .as_deref()
                    .map_or_else(|| existing.name.clone(), |n| n.trim().to_owned()),
            )
            .bind(patch_text(request.notes.as_deref(), existing.notes.as_deref()))
            .bind(session_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update session: {e}")))?;

        self.require(session_id, user_id).await
    }

    /// Delete a session with its exercises and sets
    ///
    /// # Errors
    ///
    /// Returns 404 when the session does not exist for this user
    pub async fn delete(&self, session_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM workout_sessions WHERE id = $1 AND user_id = $2")
            .bind(session_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete session: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Session {session_id}")));
        }
        AppLogger::log_session_event(user_id, session_id, "deleted");
        Ok(())
    }

    /// End a session: stamp `ended_at`, store notes, complete the linked schedule item
    ///
    /// # Errors
    ///
    /// Returns 404 when the session does not exist for this user, 400 when it
    /// has already ended
    pub async fn end(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        request: &EndSessionRequest,
    ) -> AppResult<SessionDetail> {
        request.validate()?;
        let session = self.require(session_id, user_id).await?;
        if !session.is_active() {
            return Err(AppError::invalid_input(format!(
                "Session {session_id} has already ended"
            )));
        }

        let mut tx = begin(&self.pool).await?;
        sqlx::query(
            "UPDATE workout_sessions SET ended_at = $1, notes = COALESCE($2, notes) WHERE id = $3",
        )
        .bind(format_timestamp(Utc::now()))
        .bind(&request.notes)
        .bind(session_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to end session: {e}")))?;

        if let Some(item_id) = session.schedule_item_id {
            sqlx::query(
                "UPDATE schedule_items SET status = $1, updated_at = $2 WHERE id = $3 AND user_id = $4",
            )
            .bind(ScheduleStatus::Completed.as_str())
            .bind(format_timestamp(Utc::now()))
            .bind(item_id.to_string())
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to complete schedule item: {e}")))?;
        }
        commit(tx).await?;

        AppLogger::log_session_event(user_id, session_id, "ended");
        self.detail(session_id, user_id).await
    }

    /// Append an exercise to an active session
    ///
    /// # Errors
    ///
    /// Returns 404 for an unknown session or exercise, 400 when the session has ended
    pub async fn add_exercise(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        request: &AddSessionExerciseRequest,
    ) -> AppResult<SessionDetail> {
        self.require_active(session_id, user_id).await?;
        ExercisesManager::new(self.pool.clone())
            .require(request.exercise_id, user_id)
            .await?;

        let mut tx = begin(&self.pool).await?;
        let position = next_position(&mut tx, session_id).await?;
        insert_session_exercise(
            &mut tx,
            &SnapshotRow {
                session_id,
                exercise_id: request.exercise_id,
                position,
                template_exercise_id: None,
                block: None,
                rest_after_seconds: None,
            },
        )
        .await?;
        commit(tx).await?;

        self.detail(session_id, user_id).await
    }

    /// Append a circuit's exercises to an active session as one group
    ///
    /// # Errors
    ///
    /// Returns 404 for an unknown session or circuit, 400 when the session has
    /// ended or the circuit is empty
    pub async fn add_circuit(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        request: &AddSessionCircuitRequest,
    ) -> AppResult<SessionDetail> {
        request.validate()?;
        self.require_active(session_id, user_id).await?;
        let circuit = CircuitsManager::new(self.pool.clone())
            .require(request.circuit_id, user_id)
            .await?;
        let rounds = request.rounds.unwrap_or(circuit.rounds);
        let planned = plan_circuit_block(&circuit, rounds)?;

        let block_id = Uuid::new_v4();
        let mut tx = begin(&self.pool).await?;
        let first = next_position(&mut tx, session_id).await?;
        for (position, row) in (first..).zip(&planned) {
            insert_session_exercise(
                &mut tx,
                &SnapshotRow {
                    session_id,
                    exercise_id: row.exercise_id,
                    position,
                    template_exercise_id: None,
                    block: Some((block_id, circuit.id, rounds)),
                    rest_after_seconds: Some(row.rest_after_seconds),
                },
            )
            .await?;
        }
        commit(tx).await?;

        AppLogger::log_circuit_expanded(user_id, circuit.id, session_id, planned.len(), rounds);
        self.detail(session_id, user_id).await
    }

    /// Remove an exercise and its sets, compacting the remaining positions
    ///
    /// # Errors
    ///
    /// Returns 404 for an unknown session or session exercise
    pub async fn remove_exercise(
        &self,
        session_id: Uuid,
        session_exercise_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<()> {
        self.require(session_id, user_id).await?;

        let mut tx = begin(&self.pool).await?;
        let result = sqlx::query("DELETE FROM session_exercises WHERE id = $1 AND session_id = $2")
            .bind(session_exercise_id.to_string())
            .bind(session_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to remove session exercise: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Session exercise {session_exercise_id}"
            )));
        }

        let rows = sqlx::query(
            "SELECT id, position FROM session_exercises WHERE session_id = $1 ORDER BY position",
        )
        .bind(session_id.to_string())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to load session positions: {e}")))?;
        let positions = rows
            .iter()
            .map(|row| Ok((uuid_column(row, "id")?, row.get("position"))))
            .collect::<AppResult<Vec<(Uuid, i32)>>>()?;
        for (id, position) in compact(&positions) {
            sqlx::query("UPDATE session_exercises SET position = $1 WHERE id = $2")
                .bind(position)
                .bind(id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to compact positions: {e}")))?;
        }
        commit(tx).await
    }

    /// Log a set; it receives the next set number of its session exercise
    ///
    /// # Errors
    ///
    /// Returns 404 for an unknown session or session exercise, 400 when the
    /// session has ended or values are invalid
    pub async fn add_set(
        &self,
        session_id: Uuid,
        session_exercise_id: Uuid,
        user_id: Uuid,
        request: &PerformedSetRequest,
    ) -> AppResult<PerformedSet> {
        request.validate()?;
        self.require_active(session_id, user_id).await?;

        let mut tx = begin(&self.pool).await?;
        require_session_exercise(&mut tx, session_id, session_exercise_id).await?;
        let current = performed_sets_of(&mut tx, session_exercise_id).await?;
        let set = PerformedSet {
            id: Uuid::new_v4(),
            session_exercise_id,
            set_number: next_set_number(&current),
            values: request.values,
            is_warmup: request.is_warmup,
            completed_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO performed_sets (
                id, session_exercise_id, set_number, reps, weight, time_seconds, distance,
                rest_seconds, is_warmup, completed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(set.id.to_string())
        .bind(session_exercise_id.to_string())
        .bind(set.set_number)
        .bind(set.values.reps)
        .bind(set.values.weight)
        .bind(set.values.time_seconds)
        .bind(set.values.distance)
        .bind(set.values.rest_seconds)
        .bind(set.is_warmup)
        .bind(format_timestamp(set.completed_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to log set: {e}")))?;
        commit(tx).await?;

        Ok(set)
    }

    /// Replace a performed set's values and warm-up flag
    ///
    /// # Errors
    ///
    /// Returns 404 when the set does not belong to one of the user's sessions
    pub async fn update_set(
        &self,
        set_id: Uuid,
        user_id: Uuid,
        request: &PerformedSetRequest,
    ) -> AppResult<PerformedSet> {
        request.validate()?;
        let existing = self.require_set(set_id, user_id).await?;

        sqlx::query(
            r"
            UPDATE performed_sets
            SET reps = $1, weight = $2, time_seconds = $3, distance = $4, rest_seconds = $5, is_warmup = $6
            WHERE id = $7
            ",
        )
        .bind(request.values.reps)
        .bind(request.values.weight)
        .bind(request.values.time_seconds)
        .bind(request.values.distance)
        .bind(request.values.rest_seconds)
        .bind(request.is_warmup)
        .bind(set_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update set: {e}")))?;

        Ok(PerformedSet {
            values: request.values,
            is_warmup: request.is_warmup,
            ..existing
        })
    }

    /// Delete a performed set and renumber the survivors 1..n
    ///
    /// # Errors
    ///
    /// Returns 404 when the set does not belong to one of the user's sessions
    pub async fn delete_set(&self, set_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let existing = self.require_set(set_id, user_id).await?;

        let mut tx = begin(&self.pool).await?;
        sqlx::query("DELETE FROM performed_sets WHERE id = $1")
            .bind(set_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete set: {e}")))?;

        let survivors: Vec<(Uuid, i32)> = performed_sets_of(&mut tx, existing.session_exercise_id)
            .await?
            .iter()
            .map(|s| (s.id, s.set_number))
            .collect();
        for (id, set_number) in compact(&survivors) {
            sqlx::query("UPDATE performed_sets SET set_number = $1 WHERE id = $2")
                .bind(set_number)
                .bind(id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to renumber sets: {e}")))?;
        }
        commit(tx).await
    }

    async fn require_set(&self, set_id: Uuid, user_id: Uuid) -> AppResult<PerformedSet> {
        let sql = format!(
            r"
            SELECT {PERFORMED_SET_COLUMNS}
            FROM performed_sets ps
            INNER JOIN session_exercises se ON se.id = ps.session_exercise_id
            INNER JOIN workout_sessions s ON s.id = se.session_id
            WHERE ps.id = $1 AND s.user_id = $2
            "
        );
        let row = sqlx::query(&sql)
            .bind(set_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get set: {e}")))?
            .ok_or_else(|| AppError::not_found(format!("Performed set {set_id}")))?;
        row_to_performed_set(&row)
    }

    /// Suggest values for a set: planned set, then last ended session, then previous set
    ///
    /// `set_number` defaults to the next set to be logged.
    ///
    /// # Errors
    ///
    /// Returns 404 for an unknown session or session exercise
    pub async fn prefill(
        &self,
        session_id: Uuid,
        session_exercise_id: Uuid,
        user_id: Uuid,
        set_number: Option<i32>,
    ) -> AppResult<PrefillSuggestion> {
        self.require(session_id, user_id).await?;

        let mut tx = begin(&self.pool).await?;
        let row = require_session_exercise(&mut tx, session_id, session_exercise_id).await?;
        let current = performed_sets_of(&mut tx, session_exercise_id).await?;
        let planned = match row.template_exercise_id {
            Some(template_row) => {
                let rows = sqlx::query(
                    r"
                    SELECT id, template_exercise_id, set_number, reps, weight, time_seconds, distance, rest_seconds
                    FROM planned_sets WHERE template_exercise_id = $1 ORDER BY set_number
                    ",
                )
                .bind(template_row.to_string())
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to load planned sets: {e}")))?;
                rows.iter()
                    .map(row_to_planned_set)
                    .collect::<AppResult<Vec<_>>>()?
            }
            None => Vec::new(),
        };
        tx.rollback()
            .await
            .map_err(|e| AppError::database(format!("Failed to release read transaction: {e}")))?;

        let last = match row.exercise_id {
            Some(exercise_id) => {
                self.last_performance_excluding(user_id, exercise_id, Some(session_id))
                    .await?
            }
            None => None,
        };
        let last_sets = last.map(|l| l.sets).unwrap_or_default();

        let set_number = set_number.unwrap_or_else(|| next_set_number(&current)).max(1);
        let candidates = PrefillCandidates::from_rows(set_number, &planned, &last_sets, &current);
        Ok(suggest(set_number, candidates))
    }

    /// Sets of an exercise from the most recent ended session that logged it
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails
    pub async fn last_performance(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
    ) -> AppResult<Option<LastPerformance>> {
        self.last_performance_excluding(user_id, exercise_id, None).await
    }

    async fn last_performance_excluding(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
        excluded_session: Option<Uuid>,
    ) -> AppResult<Option<LastPerformance>> {
        let latest = sqlx::query(
            r"
            SELECT se.id AS session_exercise_id, s.id AS session_id, s.name AS session_name, s.ended_at
            FROM session_exercises se
            INNER JOIN workout_sessions s ON s.id = se.session_id
            WHERE s.user_id = $1 AND se.exercise_id = $2 AND s.ended_at IS NOT NULL
              AND ($3 IS NULL OR s.id != $3)
              AND EXISTS (SELECT 1 FROM performed_sets p WHERE p.session_exercise_id = se.id)
            ORDER BY s.ended_at DESC, se.position
            LIMIT 1
            ",
        )
        .bind(user_id.to_string())
        .bind(exercise_id.to_string())
        .bind(excluded_session.map(|id| id.to_string()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find last performance: {e}")))?;

        let Some(latest) = latest else {
            return Ok(None);
        };
        let session_exercise_id = uuid_column(&latest, "session_exercise_id")?;
        let performed_at: Option<DateTime<Utc>> = optional_timestamp_column(&latest, "ended_at")?;

        let sql = format!(
            "SELECT {PERFORMED_SET_COLUMNS} FROM performed_sets ps WHERE ps.session_exercise_id = $1 ORDER BY ps.set_number"
        );
        let rows = sqlx::query(&sql)
            .bind(session_exercise_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load last performance sets: {e}")))?;

        Ok(Some(LastPerformance {
            exercise_id,
            session_id: uuid_column(&latest, "session_id")?,
            session_name: latest.get("session_name"),
            performed_at: performed_at.unwrap_or_else(Utc::now),
            sets: rows
                .iter()
                .map(row_to_performed_set)
                .collect::<AppResult<Vec<_>>>()?,
        }))
    }
}

struct SnapshotRow {
    session_id: Uuid,
    exercise_id: Uuid,
    position: i32,
    template_exercise_id: Option<Uuid>,
    /// `(block_id, circuit_id, rounds)` for grouped rows
    block: Option<(Uuid, Uuid, i32)>,
    rest_after_seconds: Option<i32>,
}

/// Insert a session row, copying the exercise's name, category and tracking flags
///
/// The copy keeps ended sessions readable after a custom exercise is deleted.
async fn insert_session_exercise(tx: &mut Tx, row: &SnapshotRow) -> AppResult<Uuid> {
    let id = Uuid::new_v4();
    let result = sqlx::query(
        r"
        INSERT INTO session_exercises (
            id, session_id, exercise_id, exercise_name, category, tracks_weight, tracks_reps,
            tracks_time, tracks_distance, position, template_exercise_id, block_id, circuit_id,
            circuit_rounds, rest_after_seconds
        )
        SELECT $1, $2, $3, e.name, e.category, e.tracks_weight, e.tracks_reps,
               e.tracks_time, e.tracks_distance, $4, $5, $6, $7, $8, $9
        FROM exercises e WHERE e.id = $3
        ",
    )
    .bind(id.to_string())
    .bind(row.session_id.to_string())
    .bind(row.exercise_id.to_string())
    .bind(row.position)
    .bind(row.template_exercise_id.map(|id| id.to_string()))
    .bind(row.block.map(|(block_id, _, _)| block_id.to_string()))
    .bind(row.block.map(|(_, circuit_id, _)| circuit_id.to_string()))
    .bind(row.block.map(|(_, _, rounds)| rounds))
    .bind(row.rest_after_seconds)
    .execute(&mut **tx)
    .await
    .map_err(|e| write_error(e, "Failed to add session exercise", "Duplicate session exercise"))?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("Exercise {}", row.exercise_id)));
    }
    Ok(id)
}

/// Snapshot a template's rows into a new session, positions 1..n in template order
async fn copy_template_rows(tx: &mut Tx, session_id: Uuid, template_id: Uuid) -> AppResult<()> {
    let rows = sqlx::query(
        r"
        SELECT id, exercise_id, block_id, circuit_id, circuit_rounds, rest_after_seconds
        FROM template_exercises WHERE template_id = $1
        ORDER BY position, created_at
        ",
    )
    .bind(template_id.to_string())
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| AppError::database(format!("Failed to load template rows: {e}")))?;

    let ids = rows
        .iter()
        .map(|row| uuid_column(row, "id"))
        .collect::<AppResult<Vec<_>>>()?;
    for ((_, position), row) in sequential(&ids).into_iter().zip(&rows) {
        let block = match (
            optional_uuid_column(row, "block_id")?,
            optional_uuid_column(row, "circuit_id")?,
        ) {
            (Some(block_id), Some(circuit_id)) => Some((
                block_id,
                circuit_id,
                row.get::<Option<i32>, _>("circuit_rounds").unwrap_or(1),
            )),
            _ => None,
        };
        insert_session_exercise(
            tx,
            &SnapshotRow {
                session_id,
                exercise_id: uuid_column(row, "exercise_id")?,
                position,
                template_exercise_id: Some(uuid_column(row, "id")?),
                block,
                rest_after_seconds: row.get("rest_after_seconds"),
            },
        )
        .await?;
    }
    Ok(())
}

async fn next_position(tx: &mut Tx, session_id: Uuid) -> AppResult<i32> {
    let row = sqlx::query("SELECT COALESCE(MAX(position), 0) AS last FROM session_exercises WHERE session_id = $1")
        .bind(session_id.to_string())
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to read session positions: {e}")))?;
    let last: i32 = row.get("last");
    Ok(last + 1)
}

/// Minimal view of a session exercise used by set operations
struct SessionExerciseRef {
    /// `None` once the exercise was deleted from the library
    exercise_id: Option<Uuid>,
    template_exercise_id: Option<Uuid>,
}

async fn require_session_exercise(
    tx: &mut Tx,
    session_id: Uuid,
    session_exercise_id: Uuid,
) -> AppResult<SessionExerciseRef> {
    let row = sqlx::query(
        "SELECT exercise_id, template_exercise_id FROM session_exercises WHERE id = $1 AND session_id = $2",
    )
    .bind(session_exercise_id.to_string())
    .bind(session_id.to_string())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| AppError::database(format!("Failed to get session exercise: {e}")))?
    .ok_or_else(|| AppError::not_found(format!("Session exercise {session_exercise_id}")))?;

    Ok(SessionExerciseRef {
        exercise_id: optional_uuid_column(&row, "exercise_id")?,
        template_exercise_id: optional_uuid_column(&row, "template_exercise_id")?,
    })
}

async fn performed_sets_of(tx: &mut Tx, session_exercise_id: Uuid) -> AppResult<Vec<PerformedSet>> {
    let sql = format!(
        "SELECT {PERFORMED_SET_COLUMNS} FROM performed_sets ps WHERE ps.session_exercise_id = $1 ORDER BY ps.set_number"
    );
    let rows = sqlx::query(&sql)
        .bind(session_exercise_id.to_string())
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to load sets: {e}")))?;
    rows.iter().map(row_to_performed_set).collect()
}

pub(crate) fn row_to_session(row: &SqliteRow) -> AppResult<WorkoutSession> {
    Ok(WorkoutSession {
        id: uuid_column(row, "id")?,
        user_id: uuid_column(row, "user_id")?,
        template_id: optional_uuid_column(row, "template_id")?,
        schedule_item_id: optional_uuid_column(row, "schedule_item_id")?,
        name: row.get("name"),
        notes: row.get("notes"),
        started_at: timestamp_column(row, "started_at")?,
        ended_at: optional_timestamp_column(row, "ended_at")?,
    })
}

fn row_to_session_exercise(row: &SqliteRow) -> AppResult<SessionExercise> {
    let category: String = row.get("category");
    Ok(SessionExercise {
        id: uuid_column(row, "id")?,
        session_id: uuid_column(row, "session_id")?,
        exercise_id: optional_uuid_column(row, "exercise_id")?,
        exercise_name: row.get("exercise_name"),
        category: ExerciseCategory::parse(&category),
        tracking: tracking_columns(row),
        position: row.get("position"),
        template_exercise_id: optional_uuid_column(row, "template_exercise_id")?,
        block_id: optional_uuid_column(row, "block_id")?,
        circuit_id: optional_uuid_column(row, "circuit_id")?,
        circuit_rounds: row.get("circuit_rounds"),
        rest_after_seconds: row.get("rest_after_seconds"),
        planned_sets: Vec::new(),
        performed_sets: Vec::new(),
    })
}

fn row_to_performed_set(row: &SqliteRow) -> AppResult<PerformedSet> {
    Ok(PerformedSet {
        id: uuid_column(row, "id")?,
        session_exercise_id: uuid_column(row, "session_exercise_id")?,
        set_number: row.get("set_number"),
        values: set_value_columns(row),
        is_warmup: row.get("is_warmup"),
        completed_at: timestamp_column(row, "completed_at")?,
    })
}
