// ABOUTME: Criterion benchmarks for the pure training computations
// ABOUTME: Measures volume aggregation, record detection, pre-fill, block planning and trends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for training computations.
//!
//! Analytics endpoints recompute everything from stored sets per request, so
//! these track how the aggregation functions scale with history size.

#![allow(clippy::missing_docs_in_private_items, missing_docs)]

use chrono::{Duration, NaiveDate, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use setlog_core::models::{
    BodyWeightEntry, Circuit, CircuitExercise, ExerciseCategory, SetValues, TrackingFlags,
    VolumeGranularity, WeightUnit,
};
use setlog_training::blocks::plan_circuit_block;
use setlog_training::prefill::{suggest, PrefillCandidates};
use setlog_training::records::personal_records;
use setlog_training::trends::body_weight_trend;
use setlog_training::volume::{volume_by_category, volume_by_period};
use setlog_training::SetHistoryEntry;
use uuid::Uuid;

const HISTORY_SIZES: [usize; 3] = [100, 1_000, 10_000];

/// Sets spread over sessions of 20 sets, one session every other day
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn generate_history(count: usize) -> Vec<SetHistoryEntry> {
    let now = Utc::now();
    let exercises: Vec<(Uuid, &str, ExerciseCategory)> = vec![
        (Uuid::new_v4(), "Back Squat", ExerciseCategory::Strength),
        (Uuid::new_v4(), "Bench Press", ExerciseCategory::Strength),
        (Uuid::new_v4(), "Box Jump", ExerciseCategory::Plyometric),
        (Uuid::new_v4(), "Hanging Leg Raise", ExerciseCategory::Core),
    ];
    let sessions: Vec<Uuid> = (0..count.div_ceil(20)).map(|_| Uuid::new_v4()).collect();

    (0..count)
        .map(|index| {
            let session_index = index / 20;
            let (exercise_id, name, category) = exercises[index % exercises.len()];
            let started_at = now - Duration::days((session_index * 2) as i64);
            SetHistoryEntry {
                session_id: sessions[session_index],
                session_started_at: started_at,
                exercise_id: Some(exercise_id),
                exercise_name: name.to_owned(),
                category,
                tracking: TrackingFlags::default(),
                set_number: (index % 5) as i32 + 1,
                values: SetValues::reps_weight(5 + (index % 6) as i32, 40.0 + (index % 50) as f64),
                is_warmup: index % 5 == 0,
                completed_at: started_at + Duration::minutes((index % 20) as i64 * 3),
            }
        })
        .collect()
}

fn sample_circuit(members: usize) -> Circuit {
    let circuit_id = Uuid::new_v4();
    let now = Utc::now();
    Circuit {
        id: circuit_id,
        user_id: None,
        name: "Benchmark Circuit".to_owned(),
        description: None,
        rounds: 3,
        rest_between_exercises_seconds: 15,
        rest_between_rounds_seconds: 60,
        is_system: true,
        is_hidden: false,
        exercises: (0..members)
            .map(|index| CircuitExercise {
                id: Uuid::new_v4(),
                circuit_id,
                exercise_id: Uuid::new_v4(),
                exercise_name: format!("Member {index}"),
                position: i32::try_from(index + 1).unwrap_or(i32::MAX),
                default_reps: Some(12),
                default_weight: None,
                default_time_seconds: None,
                rest_after_seconds: None,
            })
            .collect(),
        created_at: now,
        updated_at: now,
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
fn generate_body_weight(days: usize) -> Vec<BodyWeightEntry> {
    let user_id = Uuid::new_v4();
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default();
    (0..days)
        .map(|day| BodyWeightEntry {
            id: Uuid::new_v4(),
            user_id,
            weight: 82.0 - (day as f64) * 0.02,
            unit: if day % 3 == 0 {
                WeightUnit::Lb
            } else {
                WeightUnit::Kg
            },
            recorded_on: start + Duration::days(day as i64),
            notes: None,
            created_at: Utc::now(),
        })
        .collect()
}

fn bench_volume(c: &mut Criterion) {
    let mut group = c.benchmark_group("volume");
    for size in HISTORY_SIZES {
        let history = generate_history(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("by_week", size), &history, |b, history| {
            b.iter(|| volume_by_period(black_box(history), VolumeGranularity::Week));
        });
        group.bench_with_input(
            BenchmarkId::new("by_category", size),
            &history,
            |b, history| b.iter(|| volume_by_category(black_box(history))),
        );
    }
    group.finish();
}

fn bench_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("personal_records");
    let now = Utc::now();
    for size in HISTORY_SIZES {
        let history = generate_history(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &history, |b, history| {
            b.iter(|| personal_records(black_box(history), now));
        });
    }
    group.finish();
}

fn bench_prefill(c: &mut Criterion) {
    let candidates = PrefillCandidates {
        planned: None,
        last_session: Some(SetValues::reps_weight(8, 100.0)),
        previous_set: Some(SetValues::reps_weight(8, 97.5)),
    };
    c.bench_function("prefill_suggest", |b| {
        b.iter(|| suggest(black_box(3), black_box(candidates)));
    });
}

fn bench_circuit_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_circuit_block");
    for members in [3, 8, 20] {
        let circuit = sample_circuit(members);
        group.bench_with_input(
            BenchmarkId::from_parameter(members),
            &circuit,
            |b, circuit| b.iter(|| plan_circuit_block(black_box(circuit), 5)),
        );
    }
    group.finish();
}

fn bench_body_weight_trend(c: &mut Criterion) {
    let entries = generate_body_weight(365);
    c.bench_function("body_weight_trend_year", |b| {
        b.iter(|| body_weight_trend(black_box(&entries), WeightUnit::Kg));
    });
}

criterion_group!(
    benches,
    bench_volume,
    bench_records,
    bench_prefill,
    bench_circuit_block,
    bench_body_weight_trend
);
criterion_main!(benches);
