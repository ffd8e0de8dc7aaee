// ABOUTME: Flattened performed-set row joined with its session and exercise
// ABOUTME: Input type for volume, record and series computations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use setlog_core::models::{ExerciseCategory, SetValues, TrackingFlags};
use uuid::Uuid;

/// One performed set with the context analytics needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetHistoryEntry {
    /// Session the set belongs to
    pub session_id: Uuid,
    /// When that session started
    pub session_started_at: DateTime<Utc>,
    /// Exercise performed; `None` once a custom exercise is deleted
    pub exercise_id: Option<Uuid>,
    /// Exercise name
    pub exercise_name: String,
    /// Exercise category
    pub category: ExerciseCategory,
    /// Exercise tracking flags
    pub tracking: TrackingFlags,
    /// Set number within its session exercise
    pub set_number: i32,
    /// Logged values
    pub values: SetValues,
    /// Warm-up flag
    pub is_warmup: bool,
    /// When the set was logged
    pub completed_at: DateTime<Utc>,
}

impl SetHistoryEntry {
    /// Calendar day the set counts for (the session's start day)
    #[must_use]
    pub fn session_date(&self) -> NaiveDate {
        self.session_started_at.date_naive()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::SetHistoryEntry;
    use chrono::{DateTime, TimeZone, Utc};
    use setlog_core::models::{ExerciseCategory, SetValues, TrackingFlags};
    use uuid::Uuid;

    pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    pub fn entry(
        session_id: Uuid,
        exercise_id: Uuid,
        day: u32,
        values: SetValues,
        is_warmup: bool,
    ) -> SetHistoryEntry {
        SetHistoryEntry {
            session_id,
            session_started_at: at(day, 9),
            exercise_id: Some(exercise_id),
            exercise_name: "Bench Press".into(),
            category: ExerciseCategory::Strength,
            tracking: TrackingFlags::default(),
            set_number: 1,
            values,
            is_warmup,
            completed_at: at(day, 10),
        }
    }
}
