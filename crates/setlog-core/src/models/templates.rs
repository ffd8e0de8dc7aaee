// ABOUTME: Workout template models: ordered exercise rows, circuit blocks, planned sets
// ABOUTME: Request bodies for template, row, circuit block and planned set mutations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::library::{validate_rounds, ExerciseCategory, TrackingFlags};
use super::sets::PlannedSet;
use super::validation::{validate_int_range, validate_name, validate_notes};
use crate::constants::limits::{MAX_PLANNED_SETS, MAX_REST_SECONDS};
use crate::errors::AppResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named workout definition owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutTemplate {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Number of exercise rows
    pub exercise_count: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// A template with its rows in position order and its circuit blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDetail {
    /// Template header
    #[serde(flatten)]
    pub template: WorkoutTemplate,
    /// Rows in position order
    pub exercises: Vec<TemplateExercise>,
    /// Circuit blocks in order of their first row
    pub blocks: Vec<CircuitBlock>,
}

/// One ordered exercise row of a template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateExercise {
    /// Unique identifier
    pub id: Uuid,
    /// Owning template
    pub template_id: Uuid,
    /// Referenced exercise
    pub exercise_id: Uuid,
    /// Name of the referenced exercise
    pub exercise_name: String,
    /// Category of the referenced exercise
    pub category: ExerciseCategory,
    /// Tracking flags of the referenced exercise
    #[serde(flatten)]
    pub tracking: TrackingFlags,
    /// 1-based position within the template
    pub position: i32,
    /// Owning circuit block, when part of one
    pub block_id: Option<Uuid>,
    /// Circuit the block was expanded from
    pub circuit_id: Option<Uuid>,
    /// Round count of the owning block
    pub circuit_rounds: Option<i32>,
    /// Rest after this exercise
    pub rest_after_seconds: Option<i32>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Target sets in set-number order
    pub planned_sets: Vec<PlannedSet>,
}

/// One instance of a circuit inside a template, owning a contiguous run of rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBlock {
    /// Unique identifier
    pub id: Uuid,
    /// Owning template
    pub template_id: Uuid,
    /// Circuit the block was expanded from
    pub circuit_id: Uuid,
    /// Name of that circuit at expansion time
    pub circuit_name: String,
    /// Rounds; every row of the block carries this many planned sets
    pub rounds: i32,
    /// Rest after the last exercise of each round
    pub rest_between_rounds_seconds: i32,
    /// Member rows in position order
    pub template_exercise_ids: Vec<Uuid>,
}

/// Request to create a template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplateRequest {
    /// Display name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateTemplateRequest {
    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name
    pub fn validate(&self) -> AppResult<()> {
        validate_name("name", &self.name)?;
        validate_notes("description", self.description.as_deref())
    }
}

/// Request to rename or re-describe a template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTemplateRequest {
    /// New name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
}

impl UpdateTemplateRequest {
    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name
    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        validate_notes("description", self.description.as_deref())
    }
}

/// Request to add a standalone exercise row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTemplateExerciseRequest {
    /// Exercise to add
    pub exercise_id: Uuid,
    /// 1-based insert position; appended when absent
    #[serde(default)]
    pub position: Option<i32>,
    /// Number of empty planned sets to create
    #[serde(default)]
    pub sets: Option<i32>,
    /// Rest after this exercise
    #[serde(default)]
    pub rest_after_seconds: Option<i32>,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl AddTemplateExerciseRequest {
    /// Append an exercise with no planned sets
    #[must_use]
    pub const fn append(exercise_id: Uuid) -> Self {
        Self {
            exercise_id,
            position: None,
            sets: None,
            rest_after_seconds: None,
            notes: None,
        }
    }

    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a range error for out-of-range counts
    pub fn validate(&self) -> AppResult<()> {
        validate_int_range("sets", self.sets, MAX_PLANNED_SETS)?;
        validate_int_range("rest_after_seconds", self.rest_after_seconds, MAX_REST_SECONDS)?;
        validate_notes("notes", self.notes.as_deref())
    }
}

/// Request to change a row's notes or rest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTemplateExerciseRequest {
    /// New rest after this exercise
    pub rest_after_seconds: Option<i32>,
    /// New notes
    pub notes: Option<String>,
}

impl UpdateTemplateExerciseRequest {
    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a range error for out-of-range rest
    pub fn validate(&self) -> AppResult<()> {
        validate_int_range("rest_after_seconds", self.rest_after_seconds, MAX_REST_SECONDS)?;
        validate_notes("notes", self.notes.as_deref())
    }
}

/// Request to expand a circuit into a block of rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTemplateCircuitRequest {
    /// Circuit to expand
    pub circuit_id: Uuid,
    /// 1-based insert position of the first row; appended when absent
    #[serde(default)]
    pub position: Option<i32>,
    /// Rounds; the circuit default when absent
    #[serde(default)]
    pub rounds: Option<i32>,
}

impl AddTemplateCircuitRequest {
    /// Append a circuit with its default rounds
    #[must_use]
    pub const fn append(circuit_id: Uuid) -> Self {
        Self {
            circuit_id,
            position: None,
            rounds: None,
        }
    }

    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a range error for out-of-range rounds
    pub fn validate(&self) -> AppResult<()> {
        validate_rounds(self.rounds)
    }
}

/// Request to change a block's rounds or rest between rounds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCircuitBlockRequest {
    /// New round count for the whole block
    pub rounds: Option<i32>,
    /// New rest after the last exercise of each round
    pub rest_between_rounds_seconds: Option<i32>,
}

impl UpdateCircuitBlockRequest {
    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a range error for out-of-range values
    pub fn validate(&self) -> AppResult<()> {
        validate_rounds(self.rounds)?;
        validate_int_range(
            "rest_between_rounds_seconds",
            self.rest_between_rounds_seconds,
            MAX_REST_SECONDS,
        )
    }
}
