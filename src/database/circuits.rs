// ABOUTME: Circuit library database operations with the system/custom duality
// ABOUTME: Ordered member exercises, per-user hiding of system circuits, custom CRUD
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::exercises::LibraryDeletion;
use super::{
    begin, commit, optional_uuid_column, timestamp_column, uuid_column, write_error,
    Database,
};
use crate::constants::defaults;
use crate::errors::{AppError, AppResult};
use anyhow::Result;
use chrono::Utc;
use setlog_core::models::{
    Circuit, CircuitExercise, CircuitExerciseInput, CreateCircuitRequest, UpdateCircuitRequest,
};
use setlog_core::models::validation::patch_text;
use setlog_core::time::format_timestamp;
use sqlx::{sqlite::SqliteRow, Row, Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

/// Columns selected for a circuit row; `$1` must be the requesting user's id
const CIRCUIT_COLUMNS: &str = r"
    c.id, c.user_id, c.name, c.description, c.rounds, c.rest_between_exercises_seconds,
    c.rest_between_rounds_seconds, c.is_system, c.created_at, c.updated_at,
    EXISTS(
        SELECT 1 FROM user_circuit_preferences p
        WHERE p.circuit_id = c.id AND p.user_id = $1 AND p.is_hidden = 1
    ) AS is_hidden
";

const MEMBER_COLUMNS: &str = r"
    ce.id, ce.circuit_id, ce.exercise_id, e.name AS exercise_name, ce.position,
    ce.default_reps, ce.default_weight, ce.default_time_seconds, ce.rest_after_seconds
";

impl Database {
    /// Create circuit, member and preference tables
    pub(super) async fn migrate_circuits(&self) -> Result<()> {
        self.execute_all(&[
            r"
            CREATE TABLE IF NOT EXISTS circuits (
                id TEXT PRIMARY KEY,
                user_id TEXT REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                description TEXT,
                rounds INTEGER NOT NULL DEFAULT 3,
                rest_between_exercises_seconds INTEGER NOT NULL DEFAULT 15,
                rest_between_rounds_seconds INTEGER NOT NULL DEFAULT 60,
                is_system INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                CHECK ((is_system = 1 AND user_id IS NULL) OR (is_system = 0 AND user_id IS NOT NULL))
            )
            ",
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_circuits_custom_name
            ON circuits(user_id, name COLLATE NOCASE) WHERE user_id IS NOT NULL
            ",
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_circuits_system_name
            ON circuits(name COLLATE NOCASE) WHERE is_system = 1
            ",
            r"
            CREATE TABLE IF NOT EXISTS circuit_exercises (
                id TEXT PRIMARY KEY,
                circuit_id TEXT NOT NULL REFERENCES circuits(id) ON DELETE CASCADE,
                exercise_id TEXT NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                default_reps INTEGER,
                default_weight REAL,
                default_time_seconds INTEGER,
                rest_after_seconds INTEGER
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_circuit_exercises_circuit ON circuit_exercises(circuit_id, position)",
            r"
            CREATE TABLE IF NOT EXISTS user_circuit_preferences (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                circuit_id TEXT NOT NULL REFERENCES circuits(id) ON DELETE CASCADE,
                is_hidden INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                UNIQUE(user_id, circuit_id)
            )
            ",
        ])
        .await
    }
}

/// Circuit library operations
#[derive(Clone)]
pub struct CircuitsManager {
    pool: SqlitePool,
}

impl CircuitsManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Effective circuit library with member exercises
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails
    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<Circuit>> {
        let sql = format!(
            r"
            SELECT {CIRCUIT_COLUMNS}
            FROM circuits c
            WHERE c.user_id = $1
               OR (c.is_system = 1 AND NOT EXISTS (
                    SELECT 1 FROM user_circuit_preferences p
                    WHERE p.circuit_id = c.id AND p.user_id = $1 AND p.is_hidden = 1))
            ORDER BY c.name COLLATE NOCASE
            "
        );
        self.fetch_with_members(&sql, user_id).await
    }

    /// System circuits the user has hidden
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails
    pub async fn list_hidden(&self, user_id: Uuid) -> AppResult<Vec<Circuit>> {
        let sql = format!(
            r"
            SELECT {CIRCUIT_COLUMNS}
            FROM circuits c
            INNER JOIN user_circuit_preferences up ON c.id = up.circuit_id
            WHERE up.user_id = $1 AND up.is_hidden = 1
            ORDER BY c.name COLLATE NOCASE
            "
        );
        self.fetch_with_members(&sql, user_id).await
    }

    async fn fetch_with_members(&self, sql: &str, user_id: Uuid) -> AppResult<Vec<Circuit>> {
        let rows = sqlx::query(sql)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list circuits: {e}")))?;
        let mut circuits = rows
            .iter()
            .map(row_to_circuit)
            .collect::<AppResult<Vec<_>>>()?;

        let member_sql = format!(
            r"
            SELECT {MEMBER_COLUMNS}
            FROM circuit_exercises ce
            INNER JOIN exercises e ON e.id = ce.exercise_id
            INNER JOIN circuits c ON c.id = ce.circuit_id
            WHERE c.user_id = $1 OR c.is_system = 1
            ORDER BY ce.circuit_id, ce.position
            "
        );
        let member_rows = sqlx::query(&member_sql)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load circuit exercises: {e}")))?;

        let mut members: HashMap<Uuid, Vec<CircuitExercise>> = HashMap::new();
        for row in &member_rows {
            let member = row_to_member(row)?;
            members.entry(member.circuit_id).or_default().push(member);
        }
        for circuit in &mut circuits {
            circuit.exercises = members.remove(&circuit.id).unwrap_or_default();
        }
        Ok(circuits)
    }

    /// Get a system circuit or one of the user's custom circuits with its members
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails
    pub async fn get(&self, circuit_id: Uuid, user_id: Uuid) -> AppResult<Option<Circuit>> {
        let sql = format!(
            r"
            SELECT {CIRCUIT_COLUMNS}
            FROM circuits c
            WHERE c.id = $2 AND (c.user_id = $1 OR c.is_system = 1)
            "
        );
        let row = sqlx::query(&sql)
            .bind(user_id.to_string())
            .bind(circuit_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get circuit: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut circuit = row_to_circuit(&row)?;
        circuit.exercises = self.members_of(circuit_id).await?;
        Ok(Some(circuit))
    }

    /// Get a circuit visible to the user or fail with 404
    ///
    /// # Errors
    ///
    /// Returns 404 when the circuit is not visible to the user
    pub async fn require(&self, circuit_id: Uuid, user_id: Uuid) -> AppResult<Circuit> {
        self.get(circuit_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Circuit {circuit_id}")))
    }

    async fn members_of(&self, circuit_id: Uuid) -> AppResult<Vec<CircuitExercise>> {
        let sql = format!(
            r"
            SELECT {MEMBER_COLUMNS}
            FROM circuit_exercises ce
            INNER JOIN exercises e ON e.id = ce.exercise_id
            WHERE ce.circuit_id = $1
            ORDER BY ce.position
            "
        );
        let rows = sqlx::query(&sql)
            .bind(circuit_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load circuit exercises: {e}")))?;
        rows.iter().map(row_to_member).collect()
    }

    /// Create a custom circuit with its member exercises
    ///
    /// # Errors
    ///
    /// Returns 400 for invalid values or unknown exercises, 409 for a duplicate name
    pub async fn create(&self, user_id: Uuid, request: &CreateCircuitRequest) -> AppResult<Circuit> {
        request.validate()?;
        let circuit_id = self.insert(Some(user_id), request).await?;
        self.require(circuit_id, user_id).await
    }

    /// Insert or refresh a system circuit by name, returning it and whether it was new
    ///
    /// Members must be system exercises.
    ///
    /// # Errors
    ///
    /// Returns 400 for invalid values or non-system members
    pub async fn upsert_system(&self, request: &CreateCircuitRequest) -> AppResult<(Circuit, bool)> {
        request.validate()?;
        let existing = sqlx::query(
            "SELECT id FROM circuits WHERE is_system = 1 AND name = $1 COLLATE NOCASE",
        )
        .bind(request.name.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to look up system circuit: {e}")))?;

        let (circuit_id, created) = match existing {
            None => (self.insert(None, request).await?, true),
            Some(row) => {
                let id = uuid_column(&row, "id")?;
                let mut tx = begin(&self.pool).await?;
                sqlx::query(
                    r"
                    UPDATE circuits
                    SET description = $1, rounds = $2, rest_between_exercises_seconds = $3,
                        rest_between_rounds_seconds = $4, updated_at = $5
                    WHERE id = $6
                    ",
                )
                .bind(&request.description)
                .bind(request.rounds.unwrap_or(defaults::CIRCUIT_ROUNDS))
                .bind(
                    request
                        .rest_between_exercises_seconds
                        .unwrap_or(defaults::CIRCUIT_REST_BETWEEN_EXERCISES_SECONDS),
                )
                .bind(
                    request
                        .rest_between_rounds_seconds
                        .unwrap_or(defaults::CIRCUIT_REST_BETWEEN_ROUNDS_SECONDS),
                )
                .bind(format_timestamp(Utc::now()))
                .bind(id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to refresh system circuit: {e}")))?;
                write_members(&mut tx, id, None, &request.exercises).await?;
                commit(tx).await?;
                (id, false)
            }
        };

        let circuit = self.require(circuit_id, Uuid::nil()).await?;
        Ok((circuit, created))
    }

    async fn insert(&self, owner: Option<Uuid>, request: &CreateCircuitRequest) -> AppResult<Uuid> {
        let circuit_id = Uuid::new_v4();
        let name = request.name.trim().to_owned();
        let now = format_timestamp(Utc::now());

        let mut tx = begin(&self.pool).await?;
        sqlx::query(
            r"
            INSERT INTO circuits (
                id, user_id, name, description, rounds, rest_between_exercises_seconds,
                rest_between_rounds_seconds, is_system, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            ",
        )
        .bind(circuit_id.to_string())
        .bind(owner.map(|id| id.to_string()))
        .bind(&name)
        .bind(&request.description)
        .bind(request.rounds.unwrap_or(defaults::CIRCUIT_ROUNDS))
        .bind(
            request
                .rest_between_exercises_seconds
                .unwrap_or(defaults::CIRCUIT_REST_BETWEEN_EXERCISES_SECONDS),
        )
        .bind(
            request
                .rest_between_rounds_seconds
                .unwrap_or(defaults::CIRCUIT_REST_BETWEEN_ROUNDS_SECONDS),
        )
        .bind(owner.is_none())
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            write_error(
                e,
                "Failed to create circuit",
                &format!("A circuit named '{name}' already exists"),
            )
        })?;
        write_members(&mut tx, circuit_id, owner, &request.exercises).await?;
        commit(tx).await?;

        Ok(circuit_id)
    }

    /// Update a custom circuit's settings
    ///
    /// # Errors
    ///
    /// Returns 404 when not visible, 403 for system circuits, 400 for invalid
    /// values and 409 for a duplicate name
    pub async fn update(
        &self,
        circuit_id: Uuid,
        user_id: Uuid,
        request: &UpdateCircuitRequest,
    ) -> AppResult<Circuit> {
        request.validate()?;
        let existing = self.require_custom(circuit_id, user_id).await?;
        let name = request
            .name
            .as_deref()
            .map_or_else(|| existing.name.clone(), |n| n.trim().to_owned());

        sqlx::query(
            r"
            UPDATE circuits
            SET name = $1, description = $2, rounds = $3, rest_between_exercises_seconds = $4,
                rest_between_rounds_seconds = $5, updated_at = $6
            WHERE id = $7 AND user_id = $8
            ",
        )
        .bind(&name)
        .bind(patch_text(
            request.description.as_deref(),
            existing.description.as_deref(),
        ))
        .bind(request.rounds.unwrap_or(existing.rounds))
        .bind(
            request
                .rest_between_exercises_seconds
                .unwrap_or(existing.rest_between_exercises_seconds),
        )
        .bind(
            request
                .rest_between_rounds_seconds
                .unwrap_or(existing.rest_between_rounds_seconds),
        )
        .bind(format_timestamp(Utc::now()))
        .bind(circuit_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            write_error(
                e,
                "Failed to update circuit",
                &format!("A circuit named '{name}' already exists"),
            )
        })?;

        self.require(circuit_id, user_id).await
    }

    /// Replace the member list of a custom circuit
    ///
    /// Template blocks already expanded from this circuit keep their rows.
    ///
    /// # Errors
    ///
    /// Returns 404 when not visible, 403 for system circuits, 400 for invalid
    /// members
    pub async fn replace_exercises(
        &self,
        circuit_id: Uuid,
        user_id: Uuid,
        exercises: &[CircuitExerciseInput],
    ) -> AppResult<Circuit> {
        exercises
            .iter()
            .try_for_each(CircuitExerciseInput::validate)?;
        self.require_custom(circuit_id, user_id).await?;

        let mut tx = begin(&self.pool).await?;
        write_members(&mut tx, circuit_id, Some(user_id), exercises).await?;
        sqlx::query("UPDATE circuits SET updated_at = $1 WHERE id = $2")
            .bind(format_timestamp(Utc::now()))
            .bind(circuit_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to touch circuit: {e}")))?;
        commit(tx).await?;

        self.require(circuit_id, user_id).await
    }

    async fn require_custom(&self, circuit_id: Uuid, user_id: Uuid) -> AppResult<Circuit> {
        let circuit = self.require(circuit_id, user_id).await?;
        if circuit.is_system {
            return Err(AppError::permission_denied(
                "System circuits cannot be modified",
            ));
        }
        Ok(circuit)
    }

    /// Delete for this user: hide a system circuit, or remove a custom one
    ///
    /// Template blocks expanded from a removed circuit stay in place.
    ///
    /// # Errors
    ///
    /// Returns 404 when the circuit is not visible to the user
    pub async fn delete(&self, circuit_id: Uuid, user_id: Uuid) -> AppResult<LibraryDeletion> {
        let existing = self.require(circuit_id, user_id).await?;
        if existing.is_system {
            sqlx::query(
                r"
                INSERT INTO user_circuit_preferences (id, user_id, circuit_id, is_hidden, created_at)
                VALUES ($1, $2, $3, 1, $4)
                ON CONFLICT(user_id, circuit_id) DO UPDATE SET is_hidden = 1
                ",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(user_id.to_string())
            .bind(circuit_id.to_string())
            .bind(format_timestamp(Utc::now()))
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to hide circuit: {e}")))?;
            return Ok(LibraryDeletion::Hidden);
        }

        sqlx::query("DELETE FROM circuits WHERE id = $1 AND user_id = $2")
            .bind(circuit_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete circuit: {e}")))?;
        Ok(LibraryDeletion::Deleted)
    }

    /// Unhide a system circuit; `false` when it was not hidden
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn show(&self, circuit_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM user_circuit_preferences
            WHERE circuit_id = $1 AND user_id = $2 AND is_hidden = 1
            ",
        )
        .bind(circuit_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to show circuit: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Replace a circuit's members; `owner` `None` restricts members to system exercises
async fn write_members(
    tx: &mut Transaction<'static, Sqlite>,
    circuit_id: Uuid,
    owner: Option<Uuid>,
    exercises: &[CircuitExerciseInput],
) -> AppResult<()> {
    sqlx::query("DELETE FROM circuit_exercises WHERE circuit_id = $1")
        .bind(circuit_id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to clear circuit exercises: {e}")))?;

    for (position, member) in (1..).zip(exercises) {
        let visible = sqlx::query(
            "SELECT 1 FROM exercises WHERE id = $1 AND (is_system = 1 OR user_id = $2)",
        )
        .bind(member.exercise_id.to_string())
        .bind(owner.map(|id| id.to_string()))
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to check circuit exercise: {e}")))?;
        if visible.is_none() {
            return Err(AppError::invalid_input(format!(
                "Exercise {} is not in your library",
                member.exercise_id
            )));
        }

        sqlx::query(
            r"
            INSERT INTO circuit_exercises (
                id, circuit_id, exercise_id, position, default_reps, default_weight,
                default_time_seconds, rest_after_seconds
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(circuit_id.to_string())
        .bind(member.exercise_id.to_string())
        .bind(position)
        .bind(member.default_reps)
        .bind(member.default_weight)
        .bind(member.default_time_seconds)
        .bind(member.rest_after_seconds)
        .execute(&mut **tx)
        .await
        .map_err(|e| write_error(e, "Failed to add circuit exercise", "Duplicate circuit exercise"))?;
    }
    Ok(())
}

fn row_to_circuit(row: &SqliteRow) -> AppResult<Circuit> {
    Ok(Circuit {
        id: uuid_column(row, "id")?,
        user_id: optional_uuid_column(row, "user_id")?,
        name: row.get("name"),
        description: row.get("description"),
        rounds: row.get("rounds"),
        rest_between_exercises_seconds: row.get("rest_between_exercises_seconds"),
        rest_between_rounds_seconds: row.get("rest_between_rounds_seconds"),
        is_system: row.get("is_system"),
        is_hidden: row.get("is_hidden"),
        exercises: Vec::new(),
        created_at: timestamp_column(row, "created_at")?,
        updated_at: timestamp_column(row, "updated_at")?,
    })
}

fn row_to_member(row: &SqliteRow) -> AppResult<CircuitExercise> {
    Ok(CircuitExercise {
        id: uuid_column(row, "id")?,
        circuit_id: uuid_column(row, "circuit_id")?,
        exercise_id: uuid_column(row, "exercise_id")?,
        exercise_name: row.get("exercise_name"),
        position: row.get("position"),
        default_reps: row.get("default_reps"),
        default_weight: row.get("default_weight"),
        default_time_seconds: row.get("default_time_seconds"),
        rest_after_seconds: row.get("rest_after_seconds"),
    })
}
