// ABOUTME: Idempotent seeding of the shared system exercise and circuit library
// ABOUTME: Loads a JSON library file and upserts every row by name
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! System Library Seeding
//!
//! System exercises and circuits are seeded by the `seed-library` binary,
//! not at server startup. Running it again updates rows in place, matched by
//! name, so ids referenced by templates and sessions survive a re-seed.
//!
//! ```bash
//! cargo run --bin seed-library
//! cargo run --bin seed-library -- --file ./data/system_library.json -v
//! ```

use super::circuits::CircuitsManager;
use super::exercises::ExercisesManager;
use crate::errors::{AppError, AppResult};
use serde::Deserialize;
use setlog_core::models::{CircuitExerciseInput, CreateCircuitRequest, CreateExerciseRequest};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

const BUILTIN_LIBRARY: &str = include_str!("../../data/system_library.json");

/// System rows to seed
#[derive(Debug, Clone, Deserialize)]
pub struct SystemLibrary {
    /// Exercises, seeded first
    pub exercises: Vec<CreateExerciseRequest>,
    /// Circuits referencing exercises by name
    #[serde(default)]
    pub circuits: Vec<SeedCircuit>,
}

/// A system circuit whose members name their exercise instead of an id
#[derive(Debug, Clone, Deserialize)]
pub struct SeedCircuit {
    /// Display name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Default round count
    #[serde(default)]
    pub rounds: Option<i32>,
    /// Default rest between exercises
    #[serde(default)]
    pub rest_between_exercises_seconds: Option<i32>,
    /// Default rest between rounds
    #[serde(default)]
    pub rest_between_rounds_seconds: Option<i32>,
    /// Members in order
    pub exercises: Vec<SeedCircuitMember>,
}

/// One member of a seeded circuit
#[derive(Debug, Clone, Deserialize)]
pub struct SeedCircuitMember {
    /// Name of a system exercise in the same library
    pub exercise: String,
    /// Default reps per round
    #[serde(default)]
    pub default_reps: Option<i32>,
    /// Default weight per round
    #[serde(default)]
    pub default_weight: Option<f64>,
    /// Default duration per round
    #[serde(default)]
    pub default_time_seconds: Option<i32>,
    /// Rest after this exercise
    #[serde(default)]
    pub rest_after_seconds: Option<i32>,
}

/// Counts of what a seeding run changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// System exercises inserted
    pub exercises_created: usize,
    /// System exercises updated in place
    pub exercises_updated: usize,
    /// System circuits inserted
    pub circuits_created: usize,
    /// System circuits updated in place
    pub circuits_updated: usize,
}

impl SystemLibrary {
    /// Parse a library document
    ///
    /// # Errors
    ///
    /// Returns 400 when the JSON does not match the library shape
    pub fn from_json(json: &str) -> AppResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| AppError::invalid_input(format!("Invalid system library: {e}")))
    }

    /// The library bundled with the server
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled document is malformed
    pub fn builtin() -> AppResult<Self> {
        Self::from_json(BUILTIN_LIBRARY)
    }
}

impl SeedCircuit {
    fn to_request(&self, ids: &HashMap<String, Uuid>) -> AppResult<CreateCircuitRequest> {
        let exercises = self
            .exercises
            .iter()
            .map(|member| {
                let exercise_id = ids
                    .get(&member.exercise.to_lowercase())
                    .copied()
                    .ok_or_else(|| {
                        AppError::invalid_input(format!(
                            "Circuit '{}' references unknown exercise '{}'",
                            self.name, member.exercise
                        ))
                    })?;
                Ok(CircuitExerciseInput {
                    exercise_id,
                    default_reps: member.default_reps,
                    default_weight: member.default_weight,
                    default_time_seconds: member.default_time_seconds,
                    rest_after_seconds: member.rest_after_seconds,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(CreateCircuitRequest {
            name: self.name.clone(),
            description: self.description.clone(),
            rounds: self.rounds,
            rest_between_exercises_seconds: self.rest_between_exercises_seconds,
            rest_between_rounds_seconds: self.rest_between_rounds_seconds,
            exercises,
        })
    }
}

/// Upsert every exercise, then every circuit, of `library`
///
/// # Errors
///
/// Returns an error if a row is invalid, a circuit names an exercise the
/// library does not define, or a query fails
pub async fn seed_library(pool: &SqlitePool, library: &SystemLibrary) -> AppResult<SeedReport> {
    let exercises = ExercisesManager::new(pool.clone());
    let circuits = CircuitsManager::new(pool.clone());
    let mut report = SeedReport::default();
    let mut ids = HashMap::with_capacity(library.exercises.len());

    for request in &library.exercises {
        let (exercise, created) = exercises.upsert_system(request).await?;
        debug!(exercise.name = %exercise.name, created, "Seeded system exercise");
        if created {
            report.exercises_created += 1;
        } else {
            report.exercises_updated += 1;
        }
        ids.insert(exercise.name.to_lowercase(), exercise.id);
    }

    for seed in &library.circuits {
        let (circuit, created) = circuits.upsert_system(&seed.to_request(&ids)?).await?;
        debug!(circuit.name = %circuit.name, created, "Seeded system circuit");
        if created {
            report.circuits_created += 1;
        } else {
            report.circuits_updated += 1;
        }
    }

    info!(
        exercises_created = report.exercises_created,
        exercises_updated = report.exercises_updated,
        circuits_created = report.circuits_created,
        circuits_updated = report.circuits_updated,
        "System library seeded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_library_parses() {
        let library = SystemLibrary::builtin().unwrap();
        assert!(!library.exercises.is_empty());
        assert!(!library.circuits.is_empty());
        assert!(library.exercises.iter().all(|e| e.validate().is_ok()));
    }

    #[test]
    fn test_builtin_circuits_reference_known_exercises() {
        let library = SystemLibrary::builtin().unwrap();
        let ids: HashMap<String, Uuid> = library
            .exercises
            .iter()
            .map(|e| (e.name.to_lowercase(), Uuid::new_v4()))
            .collect();
        for circuit in &library.circuits {
            assert!(circuit.to_request(&ids).is_ok(), "{}", circuit.name);
        }
    }

    #[test]
    fn test_unknown_member_is_rejected() {
        let library = SystemLibrary::from_json(
            r#"{"exercises": [], "circuits": [{"name": "C", "exercises": [{"exercise": "Ghost"}]}]}"#,
        )
        .unwrap();
        assert!(library.circuits[0].to_request(&HashMap::new()).is_err());
    }
}
