// ABOUTME: Integration tests for templates, circuit blocks and planned sets
// ABOUTME: Covers circuit expansion, block contiguity on insert and reorder, removal ordering and set renumbering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use helpers::test_utils::{create_exercise, create_test_database, create_test_user};
use setlog_core::models::{
    AddTemplateCircuitRequest, AddTemplateExerciseRequest, CircuitExerciseInput,
    CreateCircuitRequest, CreateTemplateRequest, ExerciseCategory, PlannedSetRequest, SetValues,
    TemplateDetail, UpdateCircuitBlockRequest, UpdateTemplateRequest,
};
use setlog_server::database::{CircuitsManager, Database, TemplatesManager};
use uuid::Uuid;

struct Fixture {
    database: Database,
    user_id: Uuid,
    template_id: Uuid,
    squat: Uuid,
    row: Uuid,
    circuit_id: Uuid,
}

/// Template with Squat and Row, plus a two-exercise circuit (Burpee, Plank)
async fn fixture() -> Fixture {
    let database = create_test_database().await;
    let user = create_test_user(&database, "templates@example.com").await;
    let squat = create_exercise(&database, user.id, "Squat", ExerciseCategory::Strength).await;
    let row = create_exercise(&database, user.id, "Barbell Row", ExerciseCategory::Strength).await;
    let burpee = create_exercise(&database, user.id, "Burpee", ExerciseCategory::Plyometric).await;
    let plank = create_exercise(&database, user.id, "Plank", ExerciseCategory::Core).await;

    let circuit = CircuitsManager::new(database.pool().clone())
        .create(
            user.id,
            &CreateCircuitRequest {
                name: "Finisher".to_owned(),
                description: None,
                rounds: Some(3),
                rest_between_exercises_seconds: Some(10),
                rest_between_rounds_seconds: Some(60),
                exercises: vec![
                    CircuitExerciseInput {
                        default_reps: Some(10),
                        ..CircuitExerciseInput::new(burpee.id)
                    },
                    CircuitExerciseInput {
                        default_time_seconds: Some(30),
                        ..CircuitExerciseInput::new(plank.id)
                    },
                ],
            },
        )
        .await
        .unwrap();

    let templates = TemplatesManager::new(database.pool().clone());
    let template = templates
        .create(
            user.id,
            &CreateTemplateRequest {
                name: "Full Body".to_owned(),
                description: Some("Twice a week".to_owned()),
            },
        )
        .await
        .unwrap();
    for exercise in [squat.id, row.id] {
        templates
            .add_exercise(template.id, user.id, &AddTemplateExerciseRequest::append(exercise))
            .await
            .unwrap();
    }

    Fixture {
        user_id: user.id,
        template_id: template.id,
        squat: squat.id,
        row: row.id,
        circuit_id: circuit.id,
        database,
    }
}

fn exercise_order(detail: &TemplateDetail) -> Vec<Uuid> {
    detail.exercises.iter().map(|e| e.exercise_id).collect()
}

fn positions(detail: &TemplateDetail) -> Vec<i32> {
    detail.exercises.iter().map(|e| e.position).collect()
}

#[tokio::test]
async fn test_circuit_expands_into_contiguous_block() {
    let f = fixture().await;
    let templates = TemplatesManager::new(f.database.pool().clone());

    let detail = templates
        .add_circuit(
            f.template_id,
            f.user_id,
            &AddTemplateCircuitRequest {
                circuit_id: f.circuit_id,
                position: Some(2),
                rounds: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(detail.exercises.len(), 4);
    assert_eq!(positions(&detail), vec![1, 2, 3, 4]);
    assert_eq!(detail.exercises[0].exercise_id, f.squat);
    assert_eq!(detail.exercises[3].exercise_id, f.row);

    assert_eq!(detail.blocks.len(), 1);
    let block = &detail.blocks[0];
    assert_eq!(block.rounds, 3);
    assert_eq!(
        block.template_exercise_ids,
        vec![detail.exercises[1].id, detail.exercises[2].id]
    );

    let burpee = &detail.exercises[1];
    assert_eq!(burpee.block_id, Some(block.id));
    assert_eq!(burpee.planned_sets.len(), 3);
    assert_eq!(burpee.planned_sets[0].values.reps, Some(10));
    assert_eq!(burpee.planned_sets[0].values.rest_seconds, Some(10));

    // The last member carries the rest between rounds
    let plank = &detail.exercises[2];
    assert_eq!(plank.planned_sets[2].values.time_seconds, Some(30));
    assert_eq!(plank.planned_sets[2].values.rest_seconds, Some(60));
}

#[tokio::test]
async fn test_removing_block_keeps_remaining_order() {
    let f = fixture().await;
    let templates = TemplatesManager::new(f.database.pool().clone());

    let detail = templates
        .add_circuit(
            f.template_id,
            f.user_id,
            &AddTemplateCircuitRequest {
                circuit_id: f.circuit_id,
                position: Some(2),
                rounds: Some(2),
            },
        )
        .await
        .unwrap();
    let block_id = detail.blocks[0].id;

    templates
        .remove_block(f.template_id, block_id, f.user_id)
        .await
        .unwrap();

    let detail = templates.detail(f.template_id, f.user_id).await.unwrap();
    assert_eq!(exercise_order(&detail), vec![f.squat, f.row]);
    assert_eq!(positions(&detail), vec![1, 2]);
    assert!(detail.blocks.is_empty());
}

#[tokio::test]
async fn test_removing_last_block_row_removes_block() {
    let f = fixture().await;
    let templates = TemplatesManager::new(f.database.pool().clone());

    let detail = templates
        .add_circuit(f.template_id, f.user_id, &AddTemplateCircuitRequest::append(f.circuit_id))
        .await
        .unwrap();
    let block_rows = detail.blocks[0].template_exercise_ids.clone();

    templates
        .remove_exercise(f.template_id, block_rows[0], f.user_id)
        .await
        .unwrap();
    let detail = templates.detail(f.template_id, f.user_id).await.unwrap();
    assert_eq!(detail.blocks.len(), 1);
    assert_eq!(detail.blocks[0].template_exercise_ids, vec![block_rows[1]]);

    templates
        .remove_exercise(f.template_id, block_rows[1], f.user_id)
        .await
        .unwrap();
    let detail = templates.detail(f.template_id, f.user_id).await.unwrap();
    assert!(detail.blocks.is_empty());
    assert_eq!(exercise_order(&detail), vec![f.squat, f.row]);
}

#[tokio::test]
async fn test_reorder_rejects_split_block() {
    let f = fixture().await;
    let templates = TemplatesManager::new(f.database.pool().clone());

    let detail = templates
        .add_circuit(f.template_id, f.user_id, &AddTemplateCircuitRequest::append(f.circuit_id))
        .await
        .unwrap();
    let ids: Vec<Uuid> = detail.exercises.iter().map(|e| e.id).collect();
    // [squat, row, burpee, plank]

    let split = vec![ids[2], ids[0], ids[3], ids[1]];
    let err = templates
        .reorder_exercises(f.template_id, f.user_id, &split)
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 400);

    let missing = vec![ids[0], ids[1], ids[2]];
    let err = templates
        .reorder_exercises(f.template_id, f.user_id, &missing)
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 400);

    let block_first = vec![ids[2], ids[3], ids[1], ids[0]];
    let detail = templates
        .reorder_exercises(f.template_id, f.user_id, &block_first)
        .await
        .unwrap();
    let reordered: Vec<Uuid> = detail.exercises.iter().map(|e| e.id).collect();
    assert_eq!(reordered, block_first);
    assert_eq!(positions(&detail), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_insert_inside_block_is_rejected() {
    let f = fixture().await;
    let templates = TemplatesManager::new(f.database.pool().clone());

    // [squat, burpee, plank, row] with the block at positions 2..=3
    let before = templates
        .add_circuit(
            f.template_id,
            f.user_id,
            &AddTemplateCircuitRequest {
                circuit_id: f.circuit_id,
                position: Some(2),
                rounds: None,
            },
        )
        .await
        .unwrap();
    let before_ids: Vec<Uuid> = before.exercises.iter().map(|e| e.id).collect();

    let err = templates
        .add_exercise(
            f.template_id,
            f.user_id,
            &AddTemplateExerciseRequest {
                position: Some(3),
                sets: Some(2),
                ..AddTemplateExerciseRequest::append(f.squat)
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 400);

    let err = templates
        .add_circuit(
            f.template_id,
            f.user_id,
            &AddTemplateCircuitRequest {
                circuit_id: f.circuit_id,
                position: Some(3),
                rounds: Some(1),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 400);

    // Nothing was written by the rejected inserts
    let detail = templates.detail(f.template_id, f.user_id).await.unwrap();
    let ids: Vec<Uuid> = detail.exercises.iter().map(|e| e.id).collect();
    assert_eq!(ids, before_ids);
    assert_eq!(detail.blocks.len(), 1);
    templates
        .reorder_exercises(f.template_id, f.user_id, &ids)
        .await
        .unwrap();

    // Either edge of the block is a valid insert point
    for position in [2, 5] {
        let detail = templates
            .add_exercise(
                f.template_id,
                f.user_id,
                &AddTemplateExerciseRequest {
                    position: Some(position),
                    ..AddTemplateExerciseRequest::append(f.row)
                },
            )
            .await
            .unwrap();
        let block = &detail.blocks[0];
        let start = detail
            .exercises
            .iter()
            .position(|e| e.id == block.template_exercise_ids[0])
            .unwrap();
        assert_eq!(detail.exercises[start + 1].id, block.template_exercise_ids[1]);
    }
    let detail = templates.detail(f.template_id, f.user_id).await.unwrap();
    let ids: Vec<Uuid> = detail.exercises.iter().map(|e| e.id).collect();
    assert_eq!(ids.len(), 6);
    templates
        .reorder_exercises(f.template_id, f.user_id, &ids)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_blank_description_clears_it() {
    let f = fixture().await;
    let templates = TemplatesManager::new(f.database.pool().clone());

    let renamed = templates
        .update(
            f.template_id,
            f.user_id,
            &UpdateTemplateRequest {
                name: Some("Full Body A".to_owned()),
                ..UpdateTemplateRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.description.as_deref(), Some("Twice a week"));

    let cleared = templates
        .update(
            f.template_id,
            f.user_id,
            &UpdateTemplateRequest {
                description: Some("  ".to_owned()),
                ..UpdateTemplateRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.name, "Full Body A");
}

#[tokio::test]
async fn test_block_rounds_resize_planned_sets() {
    let f = fixture().await;
    let templates = TemplatesManager::new(f.database.pool().clone());

    let detail = templates
        .add_circuit(f.template_id, f.user_id, &AddTemplateCircuitRequest::append(f.circuit_id))
        .await
        .unwrap();
    let block_id = detail.blocks[0].id;

    let detail = templates
        .update_block(
            f.template_id,
            block_id,
            f.user_id,
            &UpdateCircuitBlockRequest {
                rounds: Some(5),
                rest_between_rounds_seconds: None,
            },
        )
        .await
        .unwrap();
    for row in detail.exercises.iter().filter(|e| e.block_id == Some(block_id)) {
        assert_eq!(row.planned_sets.len(), 5);
        assert_eq!(row.circuit_rounds, Some(5));
    }

    let detail = templates
        .update_block(
            f.template_id,
            block_id,
            f.user_id,
            &UpdateCircuitBlockRequest {
                rounds: Some(1),
                rest_between_rounds_seconds: None,
            },
        )
        .await
        .unwrap();
    for row in detail.exercises.iter().filter(|e| e.block_id == Some(block_id)) {
        assert_eq!(row.planned_sets.len(), 1);
    }
}

#[tokio::test]
async fn test_planned_set_delete_renumbers() {
    let f = fixture().await;
    let templates = TemplatesManager::new(f.database.pool().clone());
    let detail = templates.detail(f.template_id, f.user_id).await.unwrap();
    let row_id = detail.exercises[0].id;

    let mut ids = Vec::new();
    for reps in [12, 10, 8] {
        let set = templates
            .add_planned_set(
                f.template_id,
                row_id,
                f.user_id,
                &PlannedSetRequest {
                    values: SetValues::reps_weight(reps, 60.0),
                },
            )
            .await
            .unwrap();
        ids.push(set.id);
    }

    templates.delete_planned_set(ids[0], f.user_id).await.unwrap();

    let detail = templates.detail(f.template_id, f.user_id).await.unwrap();
    let sets = &detail.exercises[0].planned_sets;
    let numbers: Vec<i32> = sets.iter().map(|s| s.set_number).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(sets[0].values.reps, Some(10));
    assert_eq!(sets[1].values.reps, Some(8));
}

#[tokio::test]
async fn test_template_hidden_from_other_users() {
    let f = fixture().await;
    let stranger = create_test_user(&f.database, "stranger@example.com").await;
    let templates = TemplatesManager::new(f.database.pool().clone());

    let err = templates
        .detail(f.template_id, stranger.id)
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 404);
    assert!(templates.list(stranger.id).await.unwrap().is_empty());

    let mine = templates.list(f.user_id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].exercise_count, 2);
}
