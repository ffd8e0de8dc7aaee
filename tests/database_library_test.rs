// ABOUTME: Integration tests for the exercise and circuit libraries and system seeding
// ABOUTME: Covers per-user hiding, system row protection, custom deletes and idempotent seeding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use helpers::test_utils::{
    create_exercise, create_seeded_database, create_test_database, create_test_user,
};
use setlog_core::models::{
    AddTemplateExerciseRequest, CreateExerciseRequest, CreateTemplateRequest, Exercise,
    ExerciseCategory, UpdateCircuitRequest, UpdateExerciseRequest,
};
use setlog_core::ErrorCode;
use setlog_server::database::exercises::LibraryDeletion;
use setlog_server::database::seed_library::{seed_library, SystemLibrary};
use setlog_server::database::{CircuitsManager, ExercisesManager, TemplatesManager};

fn find<'a>(exercises: &'a [Exercise], name: &str) -> Option<&'a Exercise> {
    exercises.iter().find(|e| e.name == name)
}

#[tokio::test]
async fn test_hiding_system_exercise_is_per_user() {
    let database = create_seeded_database().await;
    let alice = create_test_user(&database, "alice@example.com").await;
    let bob = create_test_user(&database, "bob@example.com").await;
    let exercises = ExercisesManager::new(database.pool().clone());

    let listed = exercises.list(alice.id, None).await.unwrap();
    let squat = find(&listed, "Back Squat").unwrap().clone();
    assert!(squat.is_system);

    let outcome = exercises.delete(squat.id, alice.id).await.unwrap();
    assert_eq!(outcome, LibraryDeletion::Hidden);

    let alice_list = exercises.list(alice.id, None).await.unwrap();
    let bob_list = exercises.list(bob.id, None).await.unwrap();
    assert!(find(&alice_list, "Back Squat").is_none());
    assert!(find(&bob_list, "Back Squat").is_some());

    let hidden = exercises.list_hidden(alice.id).await.unwrap();
    assert_eq!(hidden.len(), 1);
    assert_eq!(hidden[0].id, squat.id);
    assert!(exercises.list_hidden(bob.id).await.unwrap().is_empty());

    // Still reachable by id so old sessions keep resolving
    assert!(exercises.get(squat.id, alice.id).await.unwrap().is_some());

    assert!(exercises.show(squat.id, alice.id).await.unwrap());
    assert!(!exercises.show(squat.id, alice.id).await.unwrap());
    let alice_list = exercises.list(alice.id, None).await.unwrap();
    assert!(find(&alice_list, "Back Squat").is_some());
}

#[tokio::test]
async fn test_system_rows_cannot_be_modified() {
    let database = create_seeded_database().await;
    let user = create_test_user(&database, "modify@example.com").await;
    let exercises = ExercisesManager::new(database.pool().clone());
    let circuits = CircuitsManager::new(database.pool().clone());

    let listed = exercises.list(user.id, None).await.unwrap();
    let plank = find(&listed, "Plank").unwrap();
    let err = exercises
        .update(
            plank.id,
            user.id,
            &UpdateExerciseRequest {
                name: Some("My Plank".to_owned()),
                ..UpdateExerciseRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let system_circuit = circuits
        .list(user.id)
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.is_system)
        .unwrap();
    let err = circuits
        .update(
            system_circuit.id,
            user.id,
            &UpdateCircuitRequest {
                rounds: Some(10),
                ..UpdateCircuitRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 403);
}

#[tokio::test]
async fn test_custom_exercises_are_private_and_deletable() {
    let database = create_test_database().await;
    let owner = create_test_user(&database, "owner@example.com").await;
    let other = create_test_user(&database, "other@example.com").await;
    let exercises = ExercisesManager::new(database.pool().clone());
    let templates = TemplatesManager::new(database.pool().clone());

    let curl = create_exercise(&database, owner.id, "Zottman Curl", ExerciseCategory::Strength).await;
    assert!(!curl.is_system);
    assert_eq!(curl.user_id, Some(owner.id));
    assert!(exercises.get(curl.id, other.id).await.unwrap().is_none());

    // Same name for the same user conflicts; another user may reuse it
    let err = exercises
        .create(
            owner.id,
            &CreateExerciseRequest::new("zottman curl", ExerciseCategory::Strength),
        )
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 409);
    create_exercise(&database, other.id, "Zottman Curl", ExerciseCategory::Strength).await;

    let template = templates
        .create(
            owner.id,
            &CreateTemplateRequest {
                name: "Arms".to_owned(),
                description: None,
            },
        )
        .await
        .unwrap();
    templates
        .add_exercise(template.id, owner.id, &AddTemplateExerciseRequest::append(curl.id))
        .await
        .unwrap();

    let outcome = exercises.delete(curl.id, owner.id).await.unwrap();
    assert_eq!(outcome, LibraryDeletion::Deleted);
    assert!(exercises.get(curl.id, owner.id).await.unwrap().is_none());

    let detail = templates.detail(template.id, owner.id).await.unwrap();
    assert!(detail.exercises.is_empty());
}

#[tokio::test]
async fn test_category_filter() {
    let database = create_seeded_database().await;
    let user = create_test_user(&database, "filter@example.com").await;
    let exercises = ExercisesManager::new(database.pool().clone());

    let core = exercises
        .list(user.id, Some(ExerciseCategory::Core))
        .await
        .unwrap();
    assert!(!core.is_empty());
    assert!(core.iter().all(|e| e.category == ExerciseCategory::Core));
    assert!(find(&core, "Plank").is_some());
}

#[tokio::test]
async fn test_seeding_is_idempotent() {
    let database = create_test_database().await;
    let library = SystemLibrary::builtin().unwrap();

    let first = seed_library(database.pool(), &library).await.unwrap();
    assert_eq!(first.exercises_created, library.exercises.len());
    assert_eq!(first.circuits_created, library.circuits.len());
    assert_eq!(first.exercises_updated, 0);

    let second = seed_library(database.pool(), &library).await.unwrap();
    assert_eq!(second.exercises_created, 0);
    assert_eq!(second.circuits_created, 0);
    assert_eq!(second.exercises_updated, library.exercises.len());
    assert_eq!(second.circuits_updated, library.circuits.len());

    let user = create_test_user(&database, "seed@example.com").await;
    let listed = ExercisesManager::new(database.pool().clone())
        .list(user.id, None)
        .await
        .unwrap();
    assert_eq!(listed.len(), library.exercises.len());

    let circuits = CircuitsManager::new(database.pool().clone())
        .list(user.id)
        .await
        .unwrap();
    assert_eq!(circuits.len(), library.circuits.len());
    for circuit in &circuits {
        assert!(circuit.is_system);
        let positions: Vec<i32> = circuit.exercises.iter().map(|m| m.position).collect();
        let expected: Vec<i32> = (1..=i32::try_from(positions.len()).unwrap()).collect();
        assert_eq!(positions, expected);
    }
}
