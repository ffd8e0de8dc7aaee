// ABOUTME: Analytics read queries over sessions, performed sets and body weight
// ABOUTME: Loads flattened history rows and hands them to the pure training computations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Analytics
//!
//! Nothing is cached or materialized: every call loads the rows it needs
//! and recomputes. Date ranges filter on the calendar day a session started.

use super::body_weight::BodyWeightManager;
use super::exercises::ExercisesManager;
use super::sessions::row_to_session;
use super::{
    optional_uuid_column, set_value_columns, timestamp_column, tracking_columns, uuid_column,
};
use crate::constants::analytics::NEW_PR_WINDOW_DAYS;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use setlog_core::models::{
    AnalyticsOverview, BodyWeightTrend, CategoryVolume, ExerciseCategory, ExerciseProgress,
    PersonalRecord, ScheduleStatus, SessionDuration, VolumeGranularity, VolumePoint, WeightUnit,
};
use setlog_core::time::format_date;
use setlog_training::adherence::current_streak;
use setlog_training::records::{exercise_record, personal_records};
use setlog_training::trends::{body_weight_trend, exercise_series, session_durations};
use setlog_training::volume::{total_volume, volume_by_category, volume_by_period};
use setlog_training::SetHistoryEntry;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Inclusive calendar-day bounds on session start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    /// First day
    pub from: NaiveDate,
    /// Last day
    pub to: NaiveDate,
}

/// Analytics read operations
#[derive(Clone)]
pub struct AnalyticsManager {
    pool: SqlitePool,
}

impl AnalyticsManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Performed sets of the user's sessions, oldest first
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn history(
        &self,
        user_id: Uuid,
        range: Option<DayRange>,
        exercise_id: Option<Uuid>,
    ) -> AppResult<Vec<SetHistoryEntry>> {
        let rows = sqlx::query(
            r"
            SELECT s.id AS session_id, s.started_at, se.exercise_id, se.exercise_name,
                   se.category, se.tracks_weight, se.tracks_reps, se.tracks_time, se.tracks_distance,
                   ps.set_number, ps.reps, ps.weight, ps.time_seconds, ps.distance, ps.rest_seconds,
                   ps.is_warmup, ps.completed_at
            FROM performed_sets ps
            INNER JOIN session_exercises se ON se.id = ps.session_exercise_id
            INNER JOIN workout_sessions s ON s.id = se.session_id
            WHERE s.user_id = $1
              AND ($2 IS NULL OR substr(s.started_at, 1, 10) >= $2)
              AND ($3 IS NULL OR substr(s.started_at, 1, 10) <= $3)
              AND ($4 IS NULL OR se.exercise_id = $4)
            ORDER BY s.started_at, se.position, ps.set_number
            ",
        )
        .bind(user_id.to_string())
        .bind(range.map(|r| format_date(r.from)))
        .bind(range.map(|r| format_date(r.to)))
        .bind(exercise_id.map(|id| id.to_string()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load set history: {e}")))?;

        rows.iter().map(row_to_history_entry).collect()
    }

    /// Dashboard summary as of `now`
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails
    pub async fn overview(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<AnalyticsOverview> {
        let today = now.date_naive();
        let week_start = today - Duration::days(NEW_PR_WINDOW_DAYS - 1);

        let session_rows = sqlx::query(
            r"
            SELECT id, user_id, template_id, schedule_item_id, name, notes, started_at, ended_at
            FROM workout_sessions WHERE user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load sessions: {e}")))?;
        let sessions = session_rows
            .iter()
            .map(row_to_session)
            .collect::<AppResult<Vec<_>>>()?;

        let history = self.history(user_id, None, None).await?;
        let recent = |date: NaiveDate| date >= week_start && date <= today;

        let session_days: BTreeSet<NaiveDate> = sessions
            .iter()
            .map(|s| s.started_at.date_naive())
            .collect();

        let upcoming = sqlx::query(
            r"
            SELECT COUNT(*) AS upcoming FROM schedule_items
            WHERE user_id = $1 AND status = $2 AND scheduled_date >= $3
            ",
        )
        .bind(user_id.to_string())
        .bind(ScheduleStatus::Planned.as_str())
        .bind(format_date(today))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count upcoming workouts: {e}")))?;

        Ok(AnalyticsOverview {
            total_sessions: count(sessions.len()),
            sessions_last_7_days: count(
                sessions
                    .iter()
                    .filter(|s| recent(s.started_at.date_naive()))
                    .count(),
            ),
            total_volume: total_volume(history.iter().map(|e| &e.values)),
            volume_last_7_days: total_volume(
                history
                    .iter()
                    .filter(|e| recent(e.session_date()))
                    .map(|e| &e.values),
            ),
            workout_streak_days: current_streak(&session_days, today),
            active_session_id: sessions.iter().find(|s| s.is_active()).map(|s| s.id),
            new_records: personal_records(&history, now)
                .into_iter()
                .filter(|r| r.is_new)
                .collect(),
            upcoming_scheduled: upcoming.get("upcoming"),
        })
    }

    /// Personal record per exercise over the whole history
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn personal_records(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<Vec<PersonalRecord>> {
        let history = self.history(user_id, None, None).await?;
        Ok(personal_records(&history, now))
    }

    /// Volume per day or week inside the range
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn volume(
        &self,
        user_id: Uuid,
        range: DayRange,
        granularity: VolumeGranularity,
    ) -> AppResult<Vec<VolumePoint>> {
        let history = self.history(user_id, Some(range), None).await?;
        Ok(volume_by_period(&history, granularity))
    }

    /// Volume per exercise category inside the range
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn volume_by_category(&self, user_id: Uuid, range: DayRange) -> AppResult<Vec<CategoryVolume>> {
        let history = self.history(user_id, Some(range), None).await?;
        Ok(volume_by_category(&history))
    }

    /// Durations of ended sessions started inside the range
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn session_durations(&self, user_id: Uuid, range: DayRange) -> AppResult<Vec<SessionDuration>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, template_id, schedule_item_id, name, notes, started_at, ended_at
            FROM workout_sessions
            WHERE user_id = $1 AND ended_at IS NOT NULL
              AND substr(started_at, 1, 10) BETWEEN $2 AND $3
            ",
        )
        .bind(user_id.to_string())
        .bind(format_date(range.from))
        .bind(format_date(range.to))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load sessions: {e}")))?;
        let sessions = rows
            .iter()
            .map(row_to_session)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(session_durations(&sessions))
    }

    /// Per-session series for one exercise inside the range, plus its all-time record
    ///
    /// # Errors
    ///
    /// Returns 404 when the exercise is not visible to the user
    pub async fn exercise_progress(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
        range: DayRange,
        now: DateTime<Utc>,
    ) -> AppResult<ExerciseProgress> {
        let exercise = ExercisesManager::new(self.pool.clone())
            .require(exercise_id, user_id)
            .await?;
        let all = self.history(user_id, None, Some(exercise_id)).await?;
        let in_range: Vec<SetHistoryEntry> = all
            .iter()
            .filter(|e| {
                let day = e.session_date();
                day >= range.from && day <= range.to
            })
            .cloned()
            .collect();
        let refs: Vec<&SetHistoryEntry> = all.iter().collect();

        Ok(ExerciseProgress {
            exercise_id,
            exercise_name: exercise.name,
            points: exercise_series(&in_range),
            record: exercise_record(&refs, now),
        })
    }

    /// Body-weight trend inside the range, in `unit` or the unit of the latest entry
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails
    pub async fn body_weight_trend(
        &self,
        user_id: Uuid,
        range: DayRange,
        unit: Option<WeightUnit>,
    ) -> AppResult<BodyWeightTrend> {
        let entries = BodyWeightManager::new(self.pool.clone())
            .list(user_id, range.from, range.to)
            .await?;
        let unit = unit
            .or_else(|| entries.last().map(|e| e.unit))
            .unwrap_or_default();
        Ok(body_weight_trend(&entries, unit))
    }
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn row_to_history_entry(row: &SqliteRow) -> AppResult<SetHistoryEntry> {
    let category: String = row.get("category");
    Ok(SetHistoryEntry {
        session_id: uuid_column(row, "session_id")?,
        session_started_at: timestamp_column(row, "started_at")?,
        exercise_id: optional_uuid_column(row, "exercise_id")?,
        exercise_name: row.get("exercise_name"),
        category: ExerciseCategory::parse(&category),
        tracking: tracking_columns(row),
        set_number: row.get("set_number"),
        values: set_value_columns(row),
        is_warmup: row.get("is_warmup"),
        completed_at: timestamp_column(row, "completed_at")?,
    })
}
