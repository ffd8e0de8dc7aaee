// ABOUTME: Set measurement values shared by planned (target) and performed (actual) sets
// ABOUTME: Also the planned and performed set row models and their request bodies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::validation::{validate_int_range, validate_non_negative_float, validate_non_negative_int};
use crate::constants::limits::MAX_REST_SECONDS;
use crate::errors::AppResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Measurements of one set; every field is optional because exercises track different things
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SetValues {
    /// Repetitions
    #[serde(default)]
    pub reps: Option<i32>,
    /// Load
    #[serde(default)]
    pub weight: Option<f64>,
    /// Duration in seconds
    #[serde(default)]
    pub time_seconds: Option<i32>,
    /// Distance in the exercise's distance unit
    #[serde(default)]
    pub distance: Option<f64>,
    /// Rest after the set in seconds
    #[serde(default)]
    pub rest_seconds: Option<i32>,
}

impl SetValues {
    /// Reps and weight only
    #[must_use]
    pub const fn reps_weight(reps: i32, weight: f64) -> Self {
        Self {
            reps: Some(reps),
            weight: Some(weight),
            time_seconds: None,
            distance: None,
            rest_seconds: None,
        }
    }

    /// Duration only
    #[must_use]
    pub const fn timed(time_seconds: i32) -> Self {
        Self {
            reps: None,
            weight: None,
            time_seconds: Some(time_seconds),
            distance: None,
            rest_seconds: None,
        }
    }

    /// Whether no measurement is present
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.reps.is_none()
            && self.weight.is_none()
            && self.time_seconds.is_none()
            && self.distance.is_none()
            && self.rest_seconds.is_none()
    }

    /// Validate the values
    ///
    /// # Errors
    ///
    /// Returns a range error for negative or non-finite values
    pub fn validate(&self) -> AppResult<()> {
        validate_non_negative_int("reps", self.reps)?;
        validate_non_negative_float("weight", self.weight)?;
        validate_non_negative_int("time_seconds", self.time_seconds)?;
        validate_non_negative_float("distance", self.distance)?;
        validate_int_range("rest_seconds", self.rest_seconds, MAX_REST_SECONDS)
    }
}

/// Target values for one set of a template exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedSet {
    /// Unique identifier
    pub id: Uuid,
    /// Owning template exercise
    pub template_exercise_id: Uuid,
    /// 1-based set number
    pub set_number: i32,
    /// Target values
    #[serde(flatten)]
    pub values: SetValues,
}

/// Actual values logged for one set during a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformedSet {
    /// Unique identifier
    pub id: Uuid,
    /// Owning session exercise
    pub session_exercise_id: Uuid,
    /// 1-based set number, contiguous within the session exercise
    pub set_number: i32,
    /// Logged values
    #[serde(flatten)]
    pub values: SetValues,
    /// Warm-up sets count toward volume but never toward records
    pub is_warmup: bool,
    /// When the set was logged
    pub completed_at: DateTime<Utc>,
}

/// Body for creating or replacing a planned set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannedSetRequest {
    /// Target values
    #[serde(flatten)]
    pub values: SetValues,
}

impl PlannedSetRequest {
    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a range error for negative values
    pub fn validate(&self) -> AppResult<()> {
        self.values.validate()
    }
}

/// Body for logging or replacing a performed set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformedSetRequest {
    /// Logged values
    #[serde(flatten)]
    pub values: SetValues,
    /// Warm-up flag
    #[serde(default)]
    pub is_warmup: bool,
}

impl PerformedSetRequest {
    /// Working set with reps and weight
    #[must_use]
    pub const fn reps_weight(reps: i32, weight: f64) -> Self {
        Self {
            values: SetValues::reps_weight(reps, weight),
            is_warmup: false,
        }
    }

    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a range error for negative values
    pub fn validate(&self) -> AppResult<()> {
        self.values.validate()
    }
}

/// Body for reordering rows by an explicit id list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRequest {
    /// Every id of the collection, in the new order
    pub ids: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_performed_set_request_flattens_values() {
        let request: PerformedSetRequest =
            serde_json::from_str(r#"{"reps": 8, "weight": 120.5, "is_warmup": true}"#).unwrap();
        assert_eq!(request.values.reps, Some(8));
        assert_eq!(request.values.weight, Some(120.5));
        assert!(request.is_warmup);
        assert!(request.values.time_seconds.is_none());
    }

    #[test]
    fn test_negative_values_rejected() {
        let values = SetValues {
            reps: Some(-2),
            ..SetValues::default()
        };
        assert!(values.validate().is_err());
        assert!(SetValues::timed(45).validate().is_ok());
        assert!(SetValues::default().is_empty());
    }
}
