// ABOUTME: Domain models shared by the training logic, persistence and HTTP layers
// ABOUTME: Row types, request bodies with validation, and analytics responses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain models.
//!
//! Row types serialize directly as API responses. Request bodies deserialize
//! with serde and expose a `validate()` step that returns 400-class errors.

/// Analytics response types
pub mod analytics;
/// Exercises and circuits
pub mod library;
/// Scheduled workouts
pub mod schedule;
/// Sessions, snapshot exercises and pre-fill
pub mod session;
/// Set values, planned and performed sets
pub mod sets;
/// Templates, rows and circuit blocks
pub mod templates;
/// Accounts
pub mod user;
/// Field validation helpers
pub mod validation;
/// Supplements and body weight
pub mod wellness;

pub use analytics::{
    AnalyticsOverview, AnalyticsRangeQuery, BodyWeightTrend, BodyWeightTrendPoint,
    CategoryVolume, ExerciseProgress, ExerciseSeriesPoint, PersonalRecord, RecordKind,
    SessionDuration, VolumeGranularity, VolumePoint,
};
pub use library::{
    Circuit, CircuitExercise, CircuitExerciseInput, CreateCircuitRequest, CreateExerciseRequest,
    DistanceUnit, Exercise, ExerciseCategory, TrackingFlags, UpdateCircuitRequest,
    UpdateExerciseRequest, WeightUnit,
};
pub use schedule::{
    CreateScheduleItemRequest, DateRangeQuery, ScheduleItem, ScheduleStatus,
    UpdateScheduleItemRequest,
};
pub use session::{
    AddSessionCircuitRequest, AddSessionExerciseRequest, EndSessionRequest, LastPerformance,
    PrefillQuery, PrefillSource, PrefillSuggestion, SessionDetail, SessionExercise,
    SessionSummary, StartSessionRequest, UpdateSessionRequest, WorkoutSession,
};
pub use sets::{
    PerformedSet, PerformedSetRequest, PlannedSet, PlannedSetRequest, ReorderRequest, SetValues,
};
pub use templates::{
    AddTemplateCircuitRequest, AddTemplateExerciseRequest, CircuitBlock,
    CreateTemplateRequest, TemplateDetail, TemplateExercise, UpdateCircuitBlockRequest,
    UpdateTemplateExerciseRequest, UpdateTemplateRequest, WorkoutTemplate,
};
pub use user::{LoginRequest, RegisterRequest, User};
pub use wellness::{
    BodyWeightEntry, CreateBodyWeightRequest, CreateSupplementLogRequest,
    CreateSupplementRequest, Supplement, SupplementLog, SupplementWithStats,
    UpdateBodyWeightRequest, UpdateSupplementRequest,
};
