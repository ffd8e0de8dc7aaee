// ABOUTME: Field-level validation helpers used by request body types
// ABOUTME: Produces 400-class AppErrors naming the offending field
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::limits::{MAX_NAME_LENGTH, MAX_NOTES_LENGTH};
use crate::errors::{AppError, AppResult, ErrorCode};

/// Validate a required display name
///
/// # Errors
///
/// Returns a validation error if the name is blank or too long
pub fn validate_name(field: &str, value: &str) -> AppResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::new(
            ErrorCode::MissingRequiredField,
            format!("{field} must not be empty"),
        ));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::invalid_input(format!(
            "{field} must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate optional free text
///
/// # Errors
///
/// Returns a validation error if the text is too long
pub fn validate_notes(field: &str, value: Option<&str>) -> AppResult<()> {
    match value {
        Some(text) if text.chars().count() > MAX_NOTES_LENGTH => Err(AppError::invalid_input(
            format!("{field} must be at most {MAX_NOTES_LENGTH} characters"),
        )),
        _ => Ok(()),
    }
}

/// Validate an optional integer within `0..=max`
///
/// # Errors
///
/// Returns a range error if the value is negative or above `max`
pub fn validate_int_range(field: &str, value: Option<i32>, max: i32) -> AppResult<()> {
    match value {
        Some(v) if !(0..=max).contains(&v) => Err(AppError::new(
            ErrorCode::ValueOutOfRange,
            format!("{field} must be between 0 and {max}"),
        )),
        _ => Ok(()),
    }
}

/// Validate an optional non-negative integer
///
/// # Errors
///
/// Returns a range error if the value is negative
pub fn validate_non_negative_int(field: &str, value: Option<i32>) -> AppResult<()> {
    validate_int_range(field, value, i32::MAX)
}

/// Validate an optional non-negative, finite float
///
/// # Errors
///
/// Returns a range error if the value is negative, NaN, or infinite
pub fn validate_non_negative_float(field: &str, value: Option<f64>) -> AppResult<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(AppError::new(
            ErrorCode::ValueOutOfRange,
            format!("{field} must be a non-negative number"),
        )),
        _ => Ok(()),
    }
}

/// Resolve an optional text patch against the stored value
///
/// Absent keeps `existing`; blank text clears it; anything else replaces it trimmed.
#[must_use]
pub fn patch_text(requested: Option<&str>, existing: Option<&str>) -> Option<String> {
    match requested {
        None => existing.map(str::to_owned),
        Some(text) if text.trim().is_empty() => None,
        Some(text) => Some(text.trim().to_owned()),
    }
}
