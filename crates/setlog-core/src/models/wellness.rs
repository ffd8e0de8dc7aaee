// ABOUTME: Supplement and body-weight models with their request bodies
// ABOUTME: Supplements carry adherence statistics when listed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::library::WeightUnit;
use super::validation::{validate_name, validate_non_negative_float, validate_notes};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A supplement the user tracks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplement {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Display name
    pub name: String,
    /// Dose amount, e.g. `5`
    pub dosage: Option<String>,
    /// Dose unit, e.g. `g`
    pub unit: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Creation timestamp; bounds the adherence window
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// A supplement with adherence figures, as listed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplementWithStats {
    /// Supplement
    #[serde(flatten)]
    pub supplement: Supplement,
    /// Fraction of days with a log in the adherence window
    pub adherence: f64,
    /// Days in the adherence window
    pub adherence_window_days: i64,
    /// Consecutive logged days ending today or yesterday
    pub current_streak: i64,
    /// Whether a log exists for today
    pub taken_today: bool,
}

/// Request to create a supplement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSupplementRequest {
    /// Display name (unique per user)
    pub name: String,
    /// Dose amount
    #[serde(default)]
    pub dosage: Option<String>,
    /// Dose unit
    #[serde(default)]
    pub unit: Option<String>,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateSupplementRequest {
    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name
    pub fn validate(&self) -> AppResult<()> {
        validate_name("name", &self.name)?;
        validate_notes("notes", self.notes.as_deref())
    }
}

/// Request to update a supplement; absent fields are unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSupplementRequest {
    /// New name
    pub name: Option<String>,
    /// New dose amount
    pub dosage: Option<String>,
    /// New dose unit
    pub unit: Option<String>,
    /// New notes
    pub notes: Option<String>,
}

impl UpdateSupplementRequest {
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

/// One recorded intake of a supplement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplementLog {
    /// Unique identifier
    pub id: Uuid,
    /// Supplement taken
    pub supplement_id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Day the intake counts for
    pub log_date: NaiveDate,
    /// When the log was recorded
    pub taken_at: DateTime<Utc>,
    /// Free-text notes
    pub notes: Option<String>,
}

/// Request to log an intake
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSupplementLogRequest {
    /// Day to log; today when absent
    #[serde(default)]
    pub log_date: Option<NaiveDate>,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateSupplementLogRequest {
    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a validation error for overly long notes
    pub fn validate(&self) -> AppResult<()> {
        validate_notes("notes", self.notes.as_deref())
    }
}

/// One body-weight measurement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyWeightEntry {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Measured weight
    pub weight: f64,
    /// Unit of `weight`
    pub unit: WeightUnit,
    /// Day of the measurement
    pub recorded_on: NaiveDate,
    /// Free-text notes
    pub notes: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Request to record a body-weight measurement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBodyWeightRequest {
    /// Measured weight
    pub weight: f64,
    /// Unit of `weight`
    #[serde(default)]
    pub unit: WeightUnit,
    /// Day of the measurement; today when absent
    #[serde(default)]
    pub recorded_on: Option<NaiveDate>,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateBodyWeightRequest {
    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a range error for a non-positive weight
    pub fn validate(&self) -> AppResult<()> {
        validate_body_weight(Some(self.weight))?;
        validate_notes("notes", self.notes.as_deref())
    }
}

/// Request to correct a body-weight measurement; absent fields are unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBodyWeightRequest {
    /// New weight
    pub weight: Option<f64>,
    /// New unit
    pub unit: Option<WeightUnit>,
    /// New day
    pub recorded_on: Option<NaiveDate>,
    /// New notes
    pub notes: Option<String>,
}

impl UpdateBodyWeightRequest {
    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a range error for a non-positive weight
    pub fn validate(&self) -> AppResult<()> {
        validate_body_weight(self.weight)?;
        validate_notes("notes", self.notes.as_deref())
    }
}

fn validate_body_weight(weight: Option<f64>) -> AppResult<()> {
    validate_non_negative_float("weight", weight)?;
    if weight == Some(0.0) {
        return Err(AppError::invalid_input("weight must be greater than zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_weight_validation() {
        let request: CreateBodyWeightRequest =
            serde_json::from_str(r#"{"weight": 81.4}"#).unwrap();
        assert_eq!(request.unit, WeightUnit::Kg);
        assert!(request.validate().is_ok());

        let zero = CreateBodyWeightRequest {
            weight: 0.0,
            ..request
        };
        assert!(zero.validate().is_err());
    }
}
