// ABOUTME: Body-weight trend with moving average, session durations and per-exercise series
// ABOUTME: Chronological series derived from loaded rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::history::SetHistoryEntry;
use crate::volume::total_volume;
use chrono::{DateTime, Utc};
use setlog_core::constants::analytics::BODY_WEIGHT_MOVING_AVERAGE_ENTRIES;
use setlog_core::models::{
    BodyWeightEntry, BodyWeightTrend, BodyWeightTrendPoint, ExerciseSeriesPoint, SessionDuration,
    WeightUnit, WorkoutSession,
};
use std::collections::BTreeMap;
use uuid::Uuid;

const POUNDS_PER_KILOGRAM: f64 = 2.204_622_621_8;

/// Convert a weight between units
#[must_use]
pub fn convert_weight(weight: f64, from: WeightUnit, to: WeightUnit) -> f64 {
    match (from, to) {
        (WeightUnit::Kg, WeightUnit::Lb) => weight * POUNDS_PER_KILOGRAM,
        (WeightUnit::Lb, WeightUnit::Kg) => weight / POUNDS_PER_KILOGRAM,
        _ => weight,
    }
}

/// Trailing mean over at most `window` values ending at each index
#[must_use]
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    values
        .iter()
        .enumerate()
        .map(|(index, _)| {
            let start = (index + 1).saturating_sub(window);
            let slice = &values[start..=index];
            #[allow(clippy::cast_precision_loss)]
            let len = slice.len() as f64;
            slice.iter().sum::<f64>() / len
        })
        .collect()
}

/// Body-weight trend in `unit`
///
/// Entries are ordered by day; the moving average spans the current and up to
/// six preceding entries. `change` is last minus first.
#[must_use]
pub fn body_weight_trend(entries: &[BodyWeightEntry], unit: WeightUnit) -> BodyWeightTrend {
    let mut ordered: Vec<&BodyWeightEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| (e.recorded_on, e.created_at));

    let weights: Vec<f64> = ordered
        .iter()
        .map(|e| convert_weight(e.weight, e.unit, unit))
        .collect();
    let averages = moving_average(&weights, BODY_WEIGHT_MOVING_AVERAGE_ENTRIES);

    let change = match (weights.first(), weights.last()) {
        (Some(first), Some(last)) if weights.len() > 1 => Some(last - first),
        _ => None,
    };

    BodyWeightTrend {
        unit,
        points: ordered
            .iter()
            .zip(weights.iter().zip(averages))
            .map(|(entry, (weight, moving_average))| BodyWeightTrendPoint {
                recorded_on: entry.recorded_on,
                weight: *weight,
                moving_average,
            })
            .collect(),
        change,
    }
}

/// Durations of ended sessions in start order; active sessions are skipped
#[must_use]
pub fn session_durations(sessions: &[WorkoutSession]) -> Vec<SessionDuration> {
    let mut durations: Vec<SessionDuration> = sessions
        .iter()
        .filter_map(|session| {
            session.ended_at.map(|ended_at| SessionDuration {
                session_id: session.id,
                name: session.name.clone(),
                started_at: session.started_at,
                duration_seconds: (ended_at - session.started_at).num_seconds().max(0),
            })
        })
        .collect();
    durations.sort_by_key(|d| d.started_at);
    durations
}

/// Per-session figures for one exercise, in session start order
#[must_use]
pub fn exercise_series(entries: &[SetHistoryEntry]) -> Vec<ExerciseSeriesPoint> {
    let mut by_session: BTreeMap<(DateTime<Utc>, Uuid), Vec<&SetHistoryEntry>> = BTreeMap::new();
    for entry in entries {
        by_session
            .entry((entry.session_started_at, entry.session_id))
            .or_default()
            .push(entry);
    }

    by_session
        .into_iter()
        .map(|((started_at, session_id), sets)| {
            let working = || sets.iter().filter(|s| !s.is_warmup);
            ExerciseSeriesPoint {
                session_id,
                date: started_at.date_naive(),
                max_weight: working()
                    .filter_map(|s| s.values.weight)
                    .fold(None, |best: Option<f64>, w| Some(best.map_or(w, |b| b.max(w)))),
                total_reps: sets
                    .iter()
                    .filter_map(|s| s.values.reps)
                    .map(i64::from)
                    .sum(),
                volume: total_volume(sets.iter().map(|s| &s.values)),
                best_time_seconds: working().filter_map(|s| s.values.time_seconds).min(),
                set_count: i64::try_from(sets.len()).unwrap_or(i64::MAX),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::fixtures::entry;
    use chrono::{Duration, NaiveDate, TimeZone};
    use setlog_core::models::SetValues;

    fn weigh_in(day: u32, weight: f64, unit: WeightUnit) -> BodyWeightEntry {
        BodyWeightEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            weight,
            unit,
            recorded_on: NaiveDate::from_ymd_opt(2025, 5, day).unwrap(),
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_moving_average_window() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let averages = moving_average(&values, 7);
        assert!((averages[0] - 1.0).abs() < f64::EPSILON);
        assert!((averages[1] - 1.5).abs() < f64::EPSILON);
        assert!((averages[6] - 4.0).abs() < f64::EPSILON);
        assert!((averages[7] - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_body_weight_trend_orders_and_converts() {
        let entries = vec![
            weigh_in(3, 80.0, WeightUnit::Kg),
            weigh_in(1, 81.0, WeightUnit::Kg),
            weigh_in(2, 176.37, WeightUnit::Lb),
        ];
        let trend = body_weight_trend(&entries, WeightUnit::Kg);
        assert_eq!(trend.points.len(), 3);
        assert_eq!(trend.points[0].recorded_on.to_string(), "2025-05-01");
        assert!((trend.points[1].weight - 80.0).abs() < 0.01);
        assert!((trend.change.unwrap() + 1.0).abs() < 1e-9);

        let single = body_weight_trend(&entries[..1], WeightUnit::Lb);
        assert!(single.change.is_none());
        assert!((single.points[0].weight - 176.37).abs() < 0.01);
    }

    #[test]
    fn test_session_durations_skip_active() {
        let start = Utc.with_ymd_and_hms(2025, 5, 1, 7, 0, 0).unwrap();
        let make = |ended: Option<i64>| WorkoutSession {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            template_id: None,
            schedule_item_id: None,
            name: "Push".into(),
            notes: None,
            started_at: start,
            ended_at: ended.map(|m| start + Duration::minutes(m)),
        };
        let durations = session_durations(&[make(Some(50)), make(None)]);
        assert_eq!(durations.len(), 1);
        assert_eq!(durations[0].duration_seconds, 3000);
    }

    #[test]
    fn test_exercise_series_per_session() {
        let (s1, s2, ex) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let entries = vec![
            entry(s2, ex, 8, SetValues::reps_weight(5, 105.0), false),
            entry(s1, ex, 1, SetValues::reps_weight(10, 60.0), true),
            entry(s1, ex, 1, SetValues::reps_weight(5, 100.0), false),
        ];
        let series = exercise_series(&entries);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].session_id, s1);
        assert_eq!(series[0].max_weight, Some(100.0));
        assert_eq!(series[0].total_reps, 15);
        assert!((series[0].volume - 1100.0).abs() < f64::EPSILON);
        assert_eq!(series[1].set_count, 1);
    }
}
