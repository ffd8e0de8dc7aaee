// ABOUTME: Training volume (reps x weight) per set, per session, per period and per category
// ABOUTME: Warm-ups count toward volume; sets missing reps or weight contribute zero
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::history::SetHistoryEntry;
use chrono::{Datelike, Duration, NaiveDate};
use setlog_core::models::{CategoryVolume, ExerciseCategory, SetValues, VolumeGranularity, VolumePoint};
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

/// Volume of one set
#[must_use]
pub fn set_volume(values: &SetValues) -> f64 {
    match (values.reps, values.weight) {
        (Some(reps), Some(weight)) => f64::from(reps) * weight,
        _ => 0.0,
    }
}

/// Volume of any collection of sets
pub fn total_volume<'a>(sets: impl IntoIterator<Item = &'a SetValues>) -> f64 {
    sets.into_iter().fold(0.0, |acc, values| acc + set_volume(values))
}

/// First day of the bucket that contains `date`
#[must_use]
pub fn period_start(date: NaiveDate, granularity: VolumeGranularity) -> NaiveDate {
    match granularity {
        VolumeGranularity::Day => date,
        VolumeGranularity::Week => {
            date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
        }
    }
}

/// Volume per day or ISO week, in chronological order; empty buckets are omitted
#[must_use]
pub fn volume_by_period(
    entries: &[SetHistoryEntry],
    granularity: VolumeGranularity,
) -> Vec<VolumePoint> {
    let mut buckets: BTreeMap<NaiveDate, (f64, i64, HashSet<Uuid>)> = BTreeMap::new();
    for entry in entries {
        let bucket = buckets
            .entry(period_start(entry.session_date(), granularity))
            .or_insert_with(|| (0.0, 0, HashSet::new()));
        bucket.0 += set_volume(&entry.values);
        bucket.1 += 1;
        bucket.2.insert(entry.session_id);
    }

    buckets
        .into_iter()
        .map(|(period_start, (volume, set_count, sessions))| VolumePoint {
            period_start,
            volume,
            set_count,
            session_count: i64::try_from(sessions.len()).unwrap_or(i64::MAX),
        })
        .collect()
}

/// Volume per exercise category, in category order; categories without sets are omitted
#[must_use]
pub fn volume_by_category(entries: &[SetHistoryEntry]) -> Vec<CategoryVolume> {
    let mut totals: HashMap<ExerciseCategory, (f64, i64)> = HashMap::new();
    for entry in entries {
        let total = totals.entry(entry.category).or_insert((0.0, 0));
        total.0 += set_volume(&entry.values);
        total.1 += 1;
    }

    ExerciseCategory::ALL
        .iter()
        .filter_map(|category| {
            totals.get(category).map(|(volume, set_count)| CategoryVolume {
                category: *category,
                volume: *volume,
                set_count: *set_count,
            })
        })
        .collect()
}
