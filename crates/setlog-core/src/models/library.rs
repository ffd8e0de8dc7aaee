// ABOUTME: Exercise and circuit library models with the system/custom duality
// ABOUTME: Categories, tracking flags, units, and create/update request bodies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::validation::{
    validate_int_range, validate_name, validate_non_negative_float, validate_non_negative_int,
    validate_notes,
};
use crate::constants::limits::{MAX_CIRCUIT_ROUNDS, MAX_REST_SECONDS};
use crate::errors::{AppError, AppResult, ErrorCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exercise category used for grouping and volume-by-category analytics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseCategory {
    /// Resistance training
    #[default]
    Strength,
    /// Conditioning work
    Cardio,
    /// Stretching and range-of-motion work
    Mobility,
    /// Jumps and explosive work
    Plyometric,
    /// Trunk work
    Core,
    /// Anything else
    Other,
}

impl ExerciseCategory {
    /// All categories in display order
    pub const ALL: [Self; 6] = [
        Self::Strength,
        Self::Cardio,
        Self::Mobility,
        Self::Plyometric,
        Self::Core,
        Self::Other,
    ];

    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Cardio => "cardio",
            Self::Mobility => "mobility",
            Self::Plyometric => "plyometric",
            Self::Core => "core",
            Self::Other => "other",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "strength" => Self::Strength,
            "cardio" => Self::Cardio,
            "mobility" => Self::Mobility,
            "plyometric" => Self::Plyometric,
            "core" => Self::Core,
            _ => Self::Other,
        }
    }
}

/// Unit used to display and enter weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    /// Kilograms
    #[default]
    Kg,
    /// Pounds
    Lb,
}

impl WeightUnit {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::Lb => "lb",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "lb" | "lbs" => Self::Lb,
            _ => Self::Kg,
        }
    }
}

/// Unit used to display and enter distances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    /// Kilometers
    #[default]
    Km,
    /// Miles
    Mi,
    /// Meters
    M,
}

impl DistanceUnit {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Km => "km",
            Self::Mi => "mi",
            Self::M => "m",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "mi" => Self::Mi,
            "m" => Self::M,
            _ => Self::Km,
        }
    }
}

/// Which measurements an exercise records per set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct TrackingFlags {
    /// Sets record a load
    pub tracks_weight: bool,
    /// Sets record repetitions
    pub tracks_reps: bool,
    /// Sets record a duration
    pub tracks_time: bool,
    /// Sets record a distance
    pub tracks_distance: bool,
}

impl Default for TrackingFlags {
    fn default() -> Self {
        Self {
            tracks_weight: true,
            tracks_reps: true,
            tracks_time: false,
            tracks_distance: false,
        }
    }
}

impl TrackingFlags {
    /// Whether at least one measurement is tracked
    #[must_use]
    pub const fn any(&self) -> bool {
        self.tracks_weight || self.tracks_reps || self.tracks_time || self.tracks_distance
    }

    /// Exercises whose records are the shortest time rather than the heaviest load
    #[must_use]
    pub const fn is_timed(&self) -> bool {
        self.tracks_time && !self.tracks_weight
    }
}

/// An exercise visible to a user: either a shared system row or the user's own
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    /// Unique identifier
    pub id: Uuid,
    /// Owner; `None` for system exercises
    pub user_id: Option<Uuid>,
    /// Display name
    pub name: String,
    /// Category
    pub category: ExerciseCategory,
    /// Tracked measurements
    #[serde(flatten)]
    pub tracking: TrackingFlags,
    /// Preferred weight unit
    pub weight_unit: WeightUnit,
    /// Preferred distance unit
    pub distance_unit: DistanceUnit,
    /// Free-text notes
    pub notes: Option<String>,
    /// Shared system row
    pub is_system: bool,
    /// Hidden by the requesting user (system rows only)
    pub is_hidden: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Request to create a custom exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExerciseRequest {
    /// Display name (unique among the user's custom exercises)
    pub name: String,
    /// Category
    #[serde(default)]
    pub category: ExerciseCategory,
    /// Record a load per set (default true)
    #[serde(default)]
    pub tracks_weight: Option<bool>,
    /// Record repetitions per set (default true)
    #[serde(default)]
    pub tracks_reps: Option<bool>,
    /// Record a duration per set (default false)
    #[serde(default)]
    pub tracks_time: Option<bool>,
    /// Record a distance per set (default false)
    #[serde(default)]
    pub tracks_distance: Option<bool>,
    /// Preferred weight unit
    #[serde(default)]
    pub weight_unit: WeightUnit,
    /// Preferred distance unit
    #[serde(default)]
    pub distance_unit: DistanceUnit,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateExerciseRequest {
    /// Convenience constructor used by seeds and tests
    pub fn new(name: impl Into<String>, category: ExerciseCategory) -> Self {
        Self {
            name: name.into(),
            category,
            tracks_weight: None,
            tracks_reps: None,
            tracks_time: None,
            tracks_distance: None,
            weight_unit: WeightUnit::default(),
            distance_unit: DistanceUnit::default(),
            notes: None,
        }
    }

    /// Set all tracking flags at once
    #[must_use]
    pub fn with_tracking(mut self, tracking: TrackingFlags) -> Self {
        self.tracks_weight = Some(tracking.tracks_weight);
        self.tracks_reps = Some(tracking.tracks_reps);
        self.tracks_time = Some(tracking.tracks_time);
        self.tracks_distance = Some(tracking.tracks_distance);
        self
    }

    /// Effective tracking flags, defaulting to weight + reps
    #[must_use]
    pub fn tracking(&self) -> TrackingFlags {
        let defaults = TrackingFlags::default();
        TrackingFlags {
            tracks_weight: self.tracks_weight.unwrap_or(defaults.tracks_weight),
            tracks_reps: self.tracks_reps.unwrap_or(defaults.tracks_reps),
            tracks_time: self.tracks_time.unwrap_or(defaults.tracks_time),
            tracks_distance: self.tracks_distance.unwrap_or(defaults.tracks_distance),
        }
    }

    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank names or exercises that track nothing
    pub fn validate(&self) -> AppResult<()> {
        validate_name("name", &self.name)?;
        validate_notes("notes", self.notes.as_deref())?;
        if !self.tracking().any() {
            return Err(AppError::invalid_input(
                "An exercise must track at least one of weight, reps, time or distance",
            ));
        }
        Ok(())
    }
}

/// Request to update a custom exercise; absent fields are unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateExerciseRequest {
    /// New name
    pub name: Option<String>,
    /// New category
    pub category: Option<ExerciseCategory>,
    /// New weight tracking flag
    pub tracks_weight: Option<bool>,
    /// New reps tracking flag
    pub tracks_reps: Option<bool>,
    /// New time tracking flag
    pub tracks_time: Option<bool>,
    /// New distance tracking flag
    pub tracks_distance: Option<bool>,
    /// New weight unit
    pub weight_unit: Option<WeightUnit>,
    /// New distance unit
    pub distance_unit: Option<DistanceUnit>,
    /// New notes
    pub notes: Option<String>,
}

impl UpdateExerciseRequest {
    /// Apply the update to existing tracking flags
    #[must_use]
    pub fn apply_tracking(&self, existing: TrackingFlags) -> TrackingFlags {
        TrackingFlags {
            tracks_weight: self.tracks_weight.unwrap_or(existing.tracks_weight),
            tracks_reps: self.tracks_reps.unwrap_or(existing.tracks_reps),
            tracks_time: self.tracks_time.unwrap_or(existing.tracks_time),
            tracks_distance: self.tracks_distance.unwrap_or(existing.tracks_distance),
        }
    }

    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name or overly long notes
    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        validate_notes("notes", self.notes.as_deref())
    }
}

/// A reusable, ordered group of exercises performed for a number of rounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circuit {
    /// Unique identifier
    pub id: Uuid,
    /// Owner; `None` for system circuits
    pub user_id: Option<Uuid>,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Default round count
    pub rounds: i32,
    /// Default rest between exercises
    pub rest_between_exercises_seconds: i32,
    /// Default rest between rounds
    pub rest_between_rounds_seconds: i32,
    /// Shared system row
    pub is_system: bool,
    /// Hidden by the requesting user (system rows only)
    pub is_hidden: bool,
    /// Member exercises in position order
    pub exercises: Vec<CircuitExercise>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// One exercise slot in a circuit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitExercise {
    /// Unique identifier
    pub id: Uuid,
    /// Owning circuit
    pub circuit_id: Uuid,
    /// Referenced exercise
    pub exercise_id: Uuid,
    /// Name of the referenced exercise
    pub exercise_name: String,
    /// 1-based position within the circuit
    pub position: i32,
    /// Default reps per round
    pub default_reps: Option<i32>,
    /// Default weight per round
    pub default_weight: Option<f64>,
    /// Default duration per round
    pub default_time_seconds: Option<i32>,
    /// Rest after this exercise; falls back to the circuit default
    pub rest_after_seconds: Option<i32>,
}

/// Exercise slot supplied when creating or replacing a circuit's member list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitExerciseInput {
    /// Referenced exercise
    pub exercise_id: Uuid,
    /// Default reps per round
    #[serde(default)]
    pub default_reps: Option<i32>,
    /// Default weight per round
    #[serde(default)]
    pub default_weight: Option<f64>,
    /// Default duration per round
    #[serde(default)]
    pub default_time_seconds: Option<i32>,
    /// Rest after this exercise
    #[serde(default)]
    pub rest_after_seconds: Option<i32>,
}

impl CircuitExerciseInput {
    /// Slot with no defaults
    #[must_use]
    pub const fn new(exercise_id: Uuid) -> Self {
        Self {
            exercise_id,
            default_reps: None,
            default_weight: None,
            default_time_seconds: None,
            rest_after_seconds: None,
        }
    }

    /// Validate the slot
    ///
    /// # Errors
    ///
    /// Returns a range error for negative defaults
    pub fn validate(&self) -> AppResult<()> {
        validate_non_negative_int("default_reps", self.default_reps)?;
        validate_non_negative_float("default_weight", self.default_weight)?;
        validate_non_negative_int("default_time_seconds", self.default_time_seconds)?;
        validate_int_range(
            "rest_after_seconds",
            self.rest_after_seconds,
            MAX_REST_SECONDS,
        )
    }
}

/// Request to create a custom circuit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCircuitRequest {
    /// Display name (unique among the user's custom circuits)
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Default round count
    #[serde(default)]
    pub rounds: Option<i32>,
    /// Default rest between exercises
    #[serde(default)]
    pub rest_between_exercises_seconds: Option<i32>,
    /// Default rest between rounds
    #[serde(default)]
    pub rest_between_rounds_seconds: Option<i32>,
    /// Member exercises in order
    #[serde(default)]
    pub exercises: Vec<CircuitExerciseInput>,
}

impl CreateCircuitRequest {
    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank names or out-of-range values
    pub fn validate(&self) -> AppResult<()> {
        validate_name("name", &self.name)?;
        validate_notes("description", self.description.as_deref())?;
        validate_rounds(self.rounds)?;
        validate_int_range(
            "rest_between_exercises_seconds",
            self.rest_between_exercises_seconds,
            MAX_REST_SECONDS,
        )?;
        validate_int_range(
            "rest_between_rounds_seconds",
            self.rest_between_rounds_seconds,
            MAX_REST_SECONDS,
        )?;
        self.exercises
            .iter()
            .try_for_each(CircuitExerciseInput::validate)
    }
}

/// Request to update a custom circuit's settings; absent fields are unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCircuitRequest {
    /// New name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New default round count
    pub rounds: Option<i32>,
    /// New rest between exercises
    pub rest_between_exercises_seconds: Option<i32>,
    /// New rest between rounds
    pub rest_between_rounds_seconds: Option<i32>,
}

impl UpdateCircuitRequest {
    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank names or out-of-range values
    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        validate_notes("description", self.description.as_deref())?;
        validate_rounds(self.rounds)?;
        validate_int_range(
            "rest_between_exercises_seconds",
            self.rest_between_exercises_seconds,
            MAX_REST_SECONDS,
        )?;
        validate_int_range(
            "rest_between_rounds_seconds",
            self.rest_between_rounds_seconds,
            MAX_REST_SECONDS,
        )
    }
}

/// Validate an optional round count (`1..=MAX_CIRCUIT_ROUNDS`)
///
/// # Errors
///
/// Returns a range error when the count is zero, negative or too large
pub fn validate_rounds(rounds: Option<i32>) -> AppResult<()> {
    match rounds {
        Some(r) if !(1..=MAX_CIRCUIT_ROUNDS).contains(&r) => Err(AppError::new(
            ErrorCode::ValueOutOfRange,
            format!("rounds must be between 1 and {MAX_CIRCUIT_ROUNDS}"),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_exercise_defaults_from_json() {
        let request: CreateExerciseRequest =
            serde_json::from_str(r#"{"name": "Goblet Squat"}"#).unwrap();
        assert_eq!(request.category, ExerciseCategory::Strength);
        assert_eq!(request.tracking(), TrackingFlags::default());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_exercise_explicit_tracking() {
        let request: CreateExerciseRequest = serde_json::from_str(
            r#"{"name": "Plank", "category": "core", "tracks_weight": false,
                "tracks_reps": false, "tracks_time": true}"#,
        )
        .unwrap();
        assert!(request.tracking().is_timed());
    }

    #[test]
    fn test_exercise_tracking_nothing_is_rejected() {
        let request = CreateExerciseRequest::new("Nothing", ExerciseCategory::Other)
            .with_tracking(TrackingFlags {
                tracks_weight: false,
                tracks_reps: false,
                tracks_time: false,
                tracks_distance: false,
            });
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_unknown_category_is_rejected_by_serde() {
        let parsed: Result<CreateExerciseRequest, _> =
            serde_json::from_str(r#"{"name": "X", "category": "juggling"}"#);
        assert!(parsed.is_err());
        assert_eq!(ExerciseCategory::parse("juggling"), ExerciseCategory::Other);
    }

    #[test]
    fn test_rounds_validation() {
        assert!(validate_rounds(Some(0)).is_err());
        assert!(validate_rounds(Some(3)).is_ok());
        assert!(validate_rounds(None).is_ok());
    }
}
