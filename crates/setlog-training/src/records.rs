// ABOUTME: Personal record detection over performed-set history
// ABOUTME: Max weight for loaded exercises, min time for timed ones, warm-ups ignored
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::history::SetHistoryEntry;
use chrono::{DateTime, Duration, Utc};
use setlog_core::constants::analytics::NEW_PR_WINDOW_DAYS;
use setlog_core::models::{PersonalRecord, RecordKind, TrackingFlags};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Which quantity a record is measured in for exercises with these flags
#[must_use]
pub const fn record_kind(tracking: TrackingFlags) -> Option<RecordKind> {
    if tracking.tracks_weight {
        Some(RecordKind::MaxWeight)
    } else if tracking.tracks_time {
        Some(RecordKind::MinTime)
    } else {
        None
    }
}

fn candidate_value(entry: &SetHistoryEntry, kind: RecordKind) -> Option<f64> {
    if entry.is_warmup {
        return None;
    }
    match kind {
        RecordKind::MaxWeight => entry.values.weight.filter(|w| *w > 0.0),
        RecordKind::MinTime => entry
            .values
            .time_seconds
            .filter(|t| *t > 0)
            .map(f64::from),
    }
}

const fn improves(kind: RecordKind, candidate: f64, best: f64) -> bool {
    match kind {
        RecordKind::MaxWeight => candidate > best,
        RecordKind::MinTime => candidate < best,
    }
}

/// Record for one exercise's history, or `None` when no working set qualifies
///
/// Ties keep the earliest set, so the record date is when the best value was first reached.
#[must_use]
pub fn exercise_record(entries: &[&SetHistoryEntry], now: DateTime<Utc>) -> Option<PersonalRecord> {
    let first = entries.first()?;
    let kind = record_kind(first.tracking)?;

    let mut chronological: Vec<&&SetHistoryEntry> = entries.iter().collect();
    chronological.sort_by_key(|e| e.completed_at);

    let mut best: Option<(&SetHistoryEntry, f64)> = None;
    for entry in chronological {
        let Some(value) = candidate_value(entry, kind) else {
            continue;
        };
        if best.is_none_or(|(_, current)| improves(kind, value, current)) {
            best = Some((entry, value));
        }
    }

    let (entry, value) = best?;
    Some(PersonalRecord {
        exercise_id: entry.exercise_id?,
        exercise_name: entry.exercise_name.clone(),
        kind,
        value,
        reps: entry.values.reps,
        session_id: entry.session_id,
        achieved_at: entry.completed_at,
        is_new: now - entry.completed_at <= Duration::days(NEW_PR_WINDOW_DAYS),
    })
}

/// Records for every exercise in the history, sorted by exercise name
///
/// Sets whose exercise was deleted from the library count toward no record.
#[must_use]
pub fn personal_records(entries: &[SetHistoryEntry], now: DateTime<Utc>) -> Vec<PersonalRecord> {
    let mut by_exercise: BTreeMap<Uuid, Vec<&SetHistoryEntry>> = BTreeMap::new();
    for entry in entries {
        if let Some(exercise_id) = entry.exercise_id {
            by_exercise.entry(exercise_id).or_default().push(entry);
        }
    }

    let mut records: Vec<PersonalRecord> = by_exercise
        .values()
        .filter_map(|history| exercise_record(history, now))
        .collect();
    records.sort_by(|a, b| {
        a.exercise_name
            .to_lowercase()
            .cmp(&b.exercise_name.to_lowercase())
    });
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::fixtures::{at, entry};
    use setlog_core::models::SetValues;

    #[test]
    fn test_max_weight_ignores_warmups_and_keeps_first_date() {
        let (s1, s2, s3, ex) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let entries = vec![
            entry(s1, ex, 1, SetValues::reps_weight(5, 100.0), false),
            entry(s2, ex, 5, SetValues::reps_weight(1, 140.0), true),
            entry(s2, ex, 5, SetValues::reps_weight(3, 110.0), false),
            entry(s3, ex, 20, SetValues::reps_weight(2, 110.0), false),
        ];
        let records = personal_records(&entries, at(21, 12));
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.kind, RecordKind::MaxWeight);
        assert!((record.value - 110.0).abs() < f64::EPSILON);
        assert_eq!(record.session_id, s2);
        assert_eq!(record.reps, Some(3));
        // Reached on day 5, which is more than seven days before day 21
        assert!(!record.is_new);
    }

    #[test]
    fn test_min_time_for_timed_exercises() {
        let (s1, s2, ex) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut fast = entry(s2, ex, 18, SetValues::timed(290), false);
        let mut slow = entry(s1, ex, 10, SetValues::timed(320), false);
        for e in [&mut fast, &mut slow] {
            e.tracking = TrackingFlags {
                tracks_weight: false,
                tracks_reps: false,
                tracks_time: true,
                tracks_distance: true,
            };
        }

        let records = personal_records(&[slow, fast], at(20, 12));
        assert_eq!(records[0].kind, RecordKind::MinTime);
        assert!((records[0].value - 290.0).abs() < f64::EPSILON);
        assert!(records[0].is_new);
    }

    #[test]
    fn test_no_record_without_working_sets() {
        let (s, ex) = (Uuid::new_v4(), Uuid::new_v4());
        let entries = vec![entry(s, ex, 1, SetValues::reps_weight(10, 20.0), true)];
        assert!(personal_records(&entries, at(2, 0)).is_empty());

        let reps_only = TrackingFlags {
            tracks_weight: false,
            tracks_reps: true,
            tracks_time: false,
            tracks_distance: false,
        };
        assert_eq!(record_kind(reps_only), None);
    }

    #[test]
    fn test_deleted_exercise_sets_hold_no_record() {
        let (s, ex) = (Uuid::new_v4(), Uuid::new_v4());
        let mut orphan = entry(s, ex, 3, SetValues::reps_weight(5, 200.0), false);
        orphan.exercise_id = None;
        let kept = entry(s, ex, 3, SetValues::reps_weight(5, 120.0), false);

        let records = personal_records(&[orphan, kept], at(4, 0));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].exercise_id, ex);
        assert!((records[0].value - 120.0).abs() < f64::EPSILON);
    }
}
