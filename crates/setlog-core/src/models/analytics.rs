// ABOUTME: Analytics response models: records, volume series, durations, trends
// ABOUTME: Everything here is derived from stored rows per request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::library::{ExerciseCategory, WeightUnit};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a personal record measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Heaviest working-set weight
    MaxWeight,
    /// Shortest working-set duration
    MinTime,
}

/// Best performance for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    /// Exercise
    pub exercise_id: Uuid,
    /// Exercise name
    pub exercise_name: String,
    /// Measured quantity
    pub kind: RecordKind,
    /// Weight, or seconds for `min_time`
    pub value: f64,
    /// Reps of the record set, when logged
    pub reps: Option<i32>,
    /// Session in which the value was first reached
    pub session_id: Uuid,
    /// When the value was first reached
    pub achieved_at: DateTime<Utc>,
    /// Reached within the last seven days
    pub is_new: bool,
}

/// Bucket size for volume series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeGranularity {
    /// One point per calendar day
    #[default]
    Day,
    /// One point per ISO week, keyed by its Monday
    Week,
}

/// Volume within one bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumePoint {
    /// First day of the bucket
    pub period_start: NaiveDate,
    /// Sum of reps x weight
    pub volume: f64,
    /// Number of sets
    pub set_count: i64,
    /// Number of distinct sessions
    pub session_count: i64,
}

/// Volume of one exercise category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryVolume {
    /// Category
    pub category: ExerciseCategory,
    /// Sum of reps x weight
    pub volume: f64,
    /// Number of sets
    pub set_count: i64,
}

/// Duration of one ended session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDuration {
    /// Session
    pub session_id: Uuid,
    /// Session name
    pub name: String,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// Seconds between start and end
    pub duration_seconds: i64,
}

/// Per-session figures for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSeriesPoint {
    /// Session
    pub session_id: Uuid,
    /// Day the session started
    pub date: NaiveDate,
    /// Heaviest working-set weight
    pub max_weight: Option<f64>,
    /// Total reps over all sets
    pub total_reps: i64,
    /// Sum of reps x weight
    pub volume: f64,
    /// Shortest working-set duration
    pub best_time_seconds: Option<i32>,
    /// Number of sets
    pub set_count: i64,
}

/// History of one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProgress {
    /// Exercise
    pub exercise_id: Uuid,
    /// Exercise name
    pub exercise_name: String,
    /// Points in chronological order
    pub points: Vec<ExerciseSeriesPoint>,
    /// Current record, when any working set exists
    pub record: Option<PersonalRecord>,
}

/// One body-weight point with its moving average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyWeightTrendPoint {
    /// Day of the measurement
    pub recorded_on: NaiveDate,
    /// Weight converted to the trend unit
    pub weight: f64,
    /// Mean of this and up to six preceding entries
    pub moving_average: f64,
}

/// Body-weight series over a range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyWeightTrend {
    /// Unit of every value
    pub unit: WeightUnit,
    /// Points in chronological order
    pub points: Vec<BodyWeightTrendPoint>,
    /// Last weight minus first weight; `None` with fewer than two entries
    pub change: Option<f64>,
}

/// Dashboard summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsOverview {
    /// Ended sessions overall
    pub total_sessions: i64,
    /// Ended sessions in the last seven days
    pub sessions_last_7_days: i64,
    /// Volume over all ended sessions
    pub total_volume: f64,
    /// Volume in the last seven days
    pub volume_last_7_days: f64,
    /// Consecutive days with an ended session, ending today or yesterday
    pub workout_streak_days: i64,
    /// Currently active session, if any
    pub active_session_id: Option<Uuid>,
    /// Records set in the last seven days
    pub new_records: Vec<PersonalRecord>,
    /// Planned schedule items from today on
    pub upcoming_scheduled: i64,
}

/// Query for analytics ranges
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AnalyticsRangeQuery {
    /// First day, inclusive
    pub from: Option<NaiveDate>,
    /// Last day, inclusive
    pub to: Option<NaiveDate>,
    /// Bucket size for volume series
    #[serde(default)]
    pub granularity: VolumeGranularity,
}
