// ABOUTME: Workout session models: runs, snapshot exercises, performed sets, pre-fill
// ABOUTME: Request bodies for starting, editing, ending sessions and adding exercises
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::library::{validate_rounds, ExerciseCategory, TrackingFlags};
use super::sets::{PerformedSet, PlannedSet, SetValues};
use super::validation::{validate_name, validate_notes};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One workout run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSession {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Template the session was instantiated from
    pub template_id: Option<Uuid>,
    /// Schedule item the session was started from
    pub schedule_item_id: Option<Uuid>,
    /// Display name
    pub name: String,
    /// Free-text notes
    pub notes: Option<String>,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// End time; `None` while active
    pub ended_at: Option<DateTime<Utc>>,
}

impl WorkoutSession {
    /// Whether the session has not been ended
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Seconds between start and end, or between start and `now` while active
    #[must_use]
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        let end = self.ended_at.unwrap_or(now);
        (end - self.started_at).num_seconds().max(0)
    }
}

/// Snapshot of an exercise row for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionExercise {
    /// Unique identifier
    pub id: Uuid,
    /// Owning session
    pub session_id: Uuid,
    /// Referenced exercise; `None` once a custom exercise is deleted
    pub exercise_id: Option<Uuid>,
    /// Exercise name when the row was added
    pub exercise_name: String,
    /// Exercise category when the row was added
    pub category: ExerciseCategory,
    /// Exercise tracking flags when the row was added
    #[serde(flatten)]
    pub tracking: TrackingFlags,
    /// 1-based position within the session
    pub position: i32,
    /// Template row this snapshot was copied from
    pub template_exercise_id: Option<Uuid>,
    /// Circuit block grouping
    pub block_id: Option<Uuid>,
    /// Circuit the grouping came from
    pub circuit_id: Option<Uuid>,
    /// Round count of the grouping
    pub circuit_rounds: Option<i32>,
    /// Rest after this exercise
    pub rest_after_seconds: Option<i32>,
    /// Targets from the originating template row
    pub planned_sets: Vec<PlannedSet>,
    /// Logged sets in set-number order
    pub performed_sets: Vec<PerformedSet>,
}

/// A session with its exercises and derived figures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetail {
    /// Session header
    #[serde(flatten)]
    pub session: WorkoutSession,
    /// Seconds elapsed (to now while active)
    pub elapsed_seconds: i64,
    /// Sum of reps x weight over all performed sets
    pub total_volume: f64,
    /// Exercises in position order
    pub exercises: Vec<SessionExercise>,
}

/// A session as listed in history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session header
    #[serde(flatten)]
    pub session: WorkoutSession,
    /// Number of exercises
    pub exercise_count: i64,
    /// Number of performed sets
    pub set_count: i64,
    /// Sum of reps x weight over all performed sets
    pub total_volume: f64,
    /// Seconds between start and end; `None` while active
    pub duration_seconds: Option<i64>,
}

/// Request to start a session; at most one of the two sources may be given
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartSessionRequest {
    /// Start from a schedule item (its template is instantiated)
    #[serde(default)]
    pub schedule_item_id: Option<Uuid>,
    /// Start from a template without a schedule link
    #[serde(default)]
    pub template_id: Option<Uuid>,
    /// Name; defaults to the template name or "Workout"
    #[serde(default)]
    pub name: Option<String>,
}

impl StartSessionRequest {
    /// Ad-hoc session with no exercises
    #[must_use]
    pub fn adhoc() -> Self {
        Self::default()
    }

    /// Session from a schedule item
    #[must_use]
    pub fn from_schedule(schedule_item_id: Uuid) -> Self {
        Self {
            schedule_item_id: Some(schedule_item_id),
            ..Self::default()
        }
    }

    /// Session from a template
    #[must_use]
    pub fn from_template(template_id: Uuid) -> Self {
        Self {
            template_id: Some(template_id),
            ..Self::default()
        }
    }

    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a validation error when both sources are given or the name is blank
    pub fn validate(&self) -> AppResult<()> {
        if self.schedule_item_id.is_some() && self.template_id.is_some() {
            return Err(AppError::invalid_input(
                "Provide either schedule_item_id or template_id, not both",
            ));
        }
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        Ok(())
    }
}

/// Request to rename or annotate a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSessionRequest {
    /// New name
    pub name: Option<String>,
    /// New notes
    pub notes: Option<String>,
}

impl UpdateSessionRequest {
    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name
    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        validate_notes("notes", self.notes.as_deref())
    }
}

/// Request to finish a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndSessionRequest {
    /// Final notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl EndSessionRequest {
    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a validation error for overly long notes
    pub fn validate(&self) -> AppResult<()> {
        validate_notes("notes", self.notes.as_deref())
    }
}

/// Request to append an exercise to an active session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddSessionExerciseRequest {
    /// Exercise to add
    pub exercise_id: Uuid,
}

/// Request to append a circuit's exercises to an active session as one group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddSessionCircuitRequest {
    /// Circuit to add
    pub circuit_id: Uuid,
    /// Rounds; the circuit default when absent
    #[serde(default)]
    pub rounds: Option<i32>,
}

impl AddSessionCircuitRequest {
    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a range error for out-of-range rounds
    pub fn validate(&self) -> AppResult<()> {
        validate_rounds(self.rounds)
    }
}

/// Query for a pre-fill suggestion
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PrefillQuery {
    /// Set number to suggest values for; the next set when absent
    pub set_number: Option<i32>,
}

/// Where a pre-fill suggestion came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefillSource {
    /// Planned set with the same set number
    Planned,
    /// Same set number in the most recent prior ended session
    LastSession,
    /// Preceding set of the current session
    PreviousSet,
    /// Nothing to suggest
    None,
}

/// Suggested values for the next set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefillSuggestion {
    /// Set number the suggestion is for
    pub set_number: i32,
    /// Which candidate won
    pub source: PrefillSource,
    /// Suggested values (empty when `source` is `none`)
    pub values: SetValues,
}

/// The sets of an exercise from the most recent ended session that contained it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastPerformance {
    /// Exercise
    pub exercise_id: Uuid,
    /// Session the sets were logged in
    pub session_id: Uuid,
    /// Name of that session
    pub session_name: String,
    /// When that session ended
    pub performed_at: DateTime<Utc>,
    /// Sets in set-number order
    pub sets: Vec<PerformedSet>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session(ended: Option<DateTime<Utc>>) -> WorkoutSession {
        WorkoutSession {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            template_id: None,
            schedule_item_id: None,
            name: "Workout".into(),
            notes: None,
            started_at: Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap(),
            ended_at: ended,
        }
    }

    #[test]
    fn test_elapsed_seconds() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 10, 30, 0).unwrap();
        assert_eq!(session(None).elapsed_seconds(now), 1800);

        let ended = Utc.with_ymd_and_hms(2025, 1, 1, 10, 45, 0).unwrap();
        let finished = session(Some(ended));
        assert!(!finished.is_active());
        assert_eq!(finished.elapsed_seconds(now), 2700);
    }

    #[test]
    fn test_start_request_rejects_both_sources() {
        let request = StartSessionRequest {
            schedule_item_id: Some(Uuid::new_v4()),
            template_id: Some(Uuid::new_v4()),
            name: None,
        };
        assert!(request.validate().is_err());
        assert!(StartSessionRequest::adhoc().validate().is_ok());
    }
}
