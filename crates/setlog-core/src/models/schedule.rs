// ABOUTME: Schedule models binding templates to calendar dates
// ABOUTME: Status enum with planned/completed/skipped and request bodies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::validation::validate_notes;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a scheduled workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Not done yet
    #[default]
    Planned,
    /// A linked session was ended
    Completed,
    /// Deliberately not done
    Skipped,
}

impl ScheduleStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
        }
    }

    /// Parse from database string representation
    ///
    /// # Errors
    ///
    /// Returns an internal error for an unknown stored status
    pub fn parse(s: &str) -> AppResult<Self> {
        match s {
            "planned" => Ok(Self::Planned),
            "completed" => Ok(Self::Completed),
            "skipped" => Ok(Self::Skipped),
            other => Err(AppError::internal(format!(
                "Unknown schedule status '{other}'"
            ))),
        }
    }
}

/// A template bound to a calendar date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleItem {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Scheduled template
    pub template_id: Uuid,
    /// Name of the scheduled template
    pub template_name: String,
    /// Calendar date
    pub scheduled_date: NaiveDate,
    /// Status
    pub status: ScheduleStatus,
    /// Free-text notes
    pub notes: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Request to schedule a template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScheduleItemRequest {
    /// Template to schedule
    pub template_id: Uuid,
    /// Calendar date
    pub scheduled_date: NaiveDate,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateScheduleItemRequest {
    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a validation error for overly long notes
    pub fn validate(&self) -> AppResult<()> {
        validate_notes("notes", self.notes.as_deref())
    }
}

/// Request to move, re-status or annotate a schedule item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateScheduleItemRequest {
    /// New date
    pub scheduled_date: Option<NaiveDate>,
    /// New status
    pub status: Option<ScheduleStatus>,
    /// New notes
    pub notes: Option<String>,
}

impl UpdateScheduleItemRequest {
    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a validation error for overly long notes
    pub fn validate(&self) -> AppResult<()> {
        validate_notes("notes", self.notes.as_deref())
    }
}

/// Inclusive date range query (`?from=YYYY-MM-DD&to=YYYY-MM-DD`)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DateRangeQuery {
    /// First day, inclusive
    pub from: Option<NaiveDate>,
    /// Last day, inclusive
    pub to: Option<NaiveDate>,
}

impl DateRangeQuery {
    /// Resolve to concrete bounds, defaulting `to` to `today` and `from` to `lookback_days` before it
    ///
    /// # Errors
    ///
    /// Returns a validation error when `from` is after `to`
    pub fn resolve(self, today: NaiveDate, lookback_days: i64) -> AppResult<(NaiveDate, NaiveDate)> {
        let to = self.to.unwrap_or(today);
        let from = self
            .from
            .unwrap_or_else(|| to - Duration::days(lookback_days));
        if from > to {
            return Err(AppError::invalid_input("from must not be after to"));
        }
        Ok((from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            ScheduleStatus::Planned,
            ScheduleStatus::Completed,
            ScheduleStatus::Skipped,
        ] {
            assert_eq!(ScheduleStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(ScheduleStatus::parse("cancelled").is_err());
    }

    #[test]
    fn test_date_range_defaults_and_order() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let (from, to) = DateRangeQuery::default().resolve(today, 30).unwrap();
        assert_eq!(to, today);
        assert_eq!(from, NaiveDate::from_ymd_opt(2025, 5, 31).unwrap());

        let inverted = DateRangeQuery {
            from: Some(today),
            to: Some(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
        };
        assert!(inverted.resolve(today, 30).is_err());
    }
}
