// ABOUTME: Supplement adherence ratio and consecutive-day streaks
// ABOUTME: Window is the last min(30, days since creation) days, never less than one
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use setlog_core::constants::analytics::ADHERENCE_WINDOW_DAYS;
use std::collections::BTreeSet;

/// Adherence over the trailing window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adherence {
    /// Days in the window
    pub window_days: i64,
    /// Distinct days with a log inside the window
    pub days_logged: i64,
    /// `days_logged / window_days`
    pub ratio: f64,
}

/// Number of days the adherence window covers
///
/// Creation day counts as day one, so a supplement created today has a one-day window.
#[must_use]
pub fn window_days(created_on: NaiveDate, today: NaiveDate) -> i64 {
    let days_since_created = (today - created_on).num_days() + 1;
    days_since_created.clamp(1, ADHERENCE_WINDOW_DAYS)
}

/// Adherence for a set of logged days
#[must_use]
pub fn adherence(logged_days: &BTreeSet<NaiveDate>, created_on: NaiveDate, today: NaiveDate) -> Adherence {
    let window_days = window_days(created_on, today);
    let first_day = today - Duration::days(window_days - 1);
    let days_logged = i64::try_from(logged_days.range(first_day..=today).count()).unwrap_or(i64::MAX);

    #[allow(clippy::cast_precision_loss)]
    let ratio = days_logged as f64 / window_days as f64;

    Adherence {
        window_days,
        days_logged,
        ratio,
    }
}

/// Consecutive logged days ending today, or ending yesterday when today has no log yet
#[must_use]
pub fn current_streak(logged_days: &BTreeSet<NaiveDate>, today: NaiveDate) -> i64 {
    let mut day = if logged_days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    while logged_days.contains(&day) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}
