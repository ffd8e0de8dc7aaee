// ABOUTME: Integration tests for the session runner persistence layer
// ABOUTME: Covers set renumbering, the single-active-session rule, schedule completion, pre-fill and history retention
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use chrono::{Duration, Utc};
use helpers::test_utils::{create_exercise, create_test_database, create_test_user};
use setlog_core::models::{
    AddSessionExerciseRequest, AddTemplateExerciseRequest, CreateScheduleItemRequest,
    CreateTemplateRequest, EndSessionRequest, ExerciseCategory, PerformedSetRequest,
    PlannedSetRequest, PrefillSource, ScheduleStatus, SetValues, StartSessionRequest,
    UpdateSessionRequest, VolumeGranularity,
};
use setlog_core::ErrorCode;
use setlog_server::database::analytics::DayRange;
use setlog_server::database::exercises::LibraryDeletion;
use setlog_server::database::{
    AnalyticsManager, ExercisesManager, ScheduleManager, SessionsManager, TemplatesManager,
};

#[tokio::test]
async fn test_performed_sets_stay_numbered_after_deletes() {
    let database = create_test_database().await;
    let user = create_test_user(&database, "sets@example.com").await;
    let squat = create_exercise(&database, user.id, "Back Squat", ExerciseCategory::Strength).await;
    let sessions = SessionsManager::new(database.pool().clone());

    let detail = sessions
        .start(user.id, &StartSessionRequest::adhoc())
        .await
        .unwrap();
    let detail = sessions
        .add_exercise(
            detail.session.id,
            user.id,
            &AddSessionExerciseRequest {
                exercise_id: squat.id,
            },
        )
        .await
        .unwrap();
    let session_id = detail.session.id;
    let row_id = detail.exercises[0].id;

    let mut set_ids = Vec::new();
    for reps in [5, 5, 3] {
        let set = sessions
            .add_set(
                session_id,
                row_id,
                user.id,
                &PerformedSetRequest::reps_weight(reps, 100.0),
            )
            .await
            .unwrap();
        set_ids.push(set.id);
    }

    sessions.delete_set(set_ids[1], user.id).await.unwrap();
    let appended = sessions
        .add_set(
            session_id,
            row_id,
            user.id,
            &PerformedSetRequest::reps_weight(8, 80.0),
        )
        .await
        .unwrap();
    assert_eq!(appended.set_number, 3);

    sessions.delete_set(set_ids[0], user.id).await.unwrap();

    let detail = sessions.detail(session_id, user.id).await.unwrap();
    let numbers: Vec<i32> = detail.exercises[0]
        .performed_sets
        .iter()
        .map(|s| s.set_number)
        .collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(detail.exercises[0].performed_sets[0].values.reps, Some(3));
    assert_eq!(detail.exercises[0].performed_sets[1].values.reps, Some(8));
}

#[tokio::test]
async fn test_only_one_active_session_per_user() {
    let database = create_test_database().await;
    let user = create_test_user(&database, "active@example.com").await;
    let other = create_test_user(&database, "other@example.com").await;
    let sessions = SessionsManager::new(database.pool().clone());

    let first = sessions
        .start(user.id, &StartSessionRequest::adhoc())
        .await
        .unwrap();

    let err = sessions
        .start(user.id, &StartSessionRequest::adhoc())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
    assert_eq!(err.http_status(), 409);

    // Another user is unaffected
    sessions
        .start(other.id, &StartSessionRequest::adhoc())
        .await
        .unwrap();

    sessions
        .end(first.session.id, user.id, &EndSessionRequest::default())
        .await
        .unwrap();
    let second = sessions
        .start(user.id, &StartSessionRequest::adhoc())
        .await
        .unwrap();
    assert_ne!(first.session.id, second.session.id);
}

#[tokio::test]
async fn test_ending_twice_is_rejected() {
    let database = create_test_database().await;
    let user = create_test_user(&database, "twice@example.com").await;
    let sessions = SessionsManager::new(database.pool().clone());

    let detail = sessions
        .start(user.id, &StartSessionRequest::adhoc())
        .await
        .unwrap();
    let ended = sessions
        .end(detail.session.id, user.id, &EndSessionRequest::default())
        .await
        .unwrap();
    assert!(ended.session.ended_at.is_some());

    let err = sessions
        .end(detail.session.id, user.id, &EndSessionRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 400);
}

#[tokio::test]
async fn test_ending_schedule_session_completes_only_its_item() {
    let database = create_test_database().await;
    let user = create_test_user(&database, "schedule@example.com").await;
    let templates = TemplatesManager::new(database.pool().clone());
    let schedule = ScheduleManager::new(database.pool().clone());
    let sessions = SessionsManager::new(database.pool().clone());

    let template = templates
        .create(
            user.id,
            &CreateTemplateRequest {
                name: "Push Day".to_owned(),
                description: None,
            },
        )
        .await
        .unwrap();
    let today = Utc::now().date_naive();
    let linked = schedule
        .create(
            user.id,
            &CreateScheduleItemRequest {
                template_id: template.id,
                scheduled_date: today,
                notes: None,
            },
        )
        .await
        .unwrap();
    let untouched = schedule
        .create(
            user.id,
            &CreateScheduleItemRequest {
                template_id: template.id,
                scheduled_date: today + Duration::days(2),
                notes: None,
            },
        )
        .await
        .unwrap();

    let detail = sessions
        .start(user.id, &StartSessionRequest::from_schedule(linked.id))
        .await
        .unwrap();
    assert_eq!(detail.session.schedule_item_id, Some(linked.id));
    assert_eq!(detail.session.template_id, Some(template.id));
    assert_eq!(detail.session.name, "Push Day");

    sessions
        .end(detail.session.id, user.id, &EndSessionRequest::default())
        .await
        .unwrap();

    let linked = schedule.require(linked.id, user.id).await.unwrap();
    let untouched = schedule.require(untouched.id, user.id).await.unwrap();
    assert_eq!(linked.status, ScheduleStatus::Completed);
    assert_eq!(untouched.status, ScheduleStatus::Planned);
}

#[tokio::test]
async fn test_prefill_prefers_planned_values() {
    let database = create_test_database().await;
    let user = create_test_user(&database, "prefill@example.com").await;
    let bench = create_exercise(&database, user.id, "Bench Press", ExerciseCategory::Strength).await;
    let templates = TemplatesManager::new(database.pool().clone());
    let sessions = SessionsManager::new(database.pool().clone());

    // A finished session gives a last-session candidate
    let earlier = sessions
        .start(user.id, &StartSessionRequest::adhoc())
        .await
        .unwrap();
    let earlier = sessions
        .add_exercise(
            earlier.session.id,
            user.id,
            &AddSessionExerciseRequest {
                exercise_id: bench.id,
            },
        )
        .await
        .unwrap();
    sessions
        .add_set(
            earlier.session.id,
            earlier.exercises[0].id,
            user.id,
            &PerformedSetRequest::reps_weight(8, 40.0),
        )
        .await
        .unwrap();
    sessions
        .end(earlier.session.id, user.id, &EndSessionRequest::default())
        .await
        .unwrap();

    let template = templates
        .create(
            user.id,
            &CreateTemplateRequest {
                name: "Bench Focus".to_owned(),
                description: None,
            },
        )
        .await
        .unwrap();
    let detail = templates
        .add_exercise(template.id, user.id, &AddTemplateExerciseRequest::append(bench.id))
        .await
        .unwrap();
    templates
        .add_planned_set(
            template.id,
            detail.exercises[0].id,
            user.id,
            &PlannedSetRequest {
                values: SetValues::reps_weight(10, 50.0),
            },
        )
        .await
        .unwrap();

    let current = sessions
        .start(user.id, &StartSessionRequest::from_template(template.id))
        .await
        .unwrap();
    let row = &current.exercises[0];
    assert_eq!(row.planned_sets.len(), 1);

    let planned = sessions
        .prefill(current.session.id, row.id, user.id, None)
        .await
        .unwrap();
    assert_eq!(planned.set_number, 1);
    assert_eq!(planned.source, PrefillSource::Planned);
    assert_eq!(planned.values.reps, Some(10));
    assert_eq!(planned.values.weight, Some(50.0));

    // Set 2 has no plan but the earlier session had only one set, so the
    // previous set of this session is used once it exists
    sessions
        .add_set(
            current.session.id,
            row.id,
            user.id,
            &PerformedSetRequest::reps_weight(9, 52.5),
        )
        .await
        .unwrap();
    let next = sessions
        .prefill(current.session.id, row.id, user.id, None)
        .await
        .unwrap();
    assert_eq!(next.set_number, 2);
    assert_eq!(next.source, PrefillSource::PreviousSet);
    assert_eq!(next.values.weight, Some(52.5));
}

#[tokio::test]
async fn test_sessions_are_scoped_to_their_owner() {
    let database = create_test_database().await;
    let owner = create_test_user(&database, "owner@example.com").await;
    let intruder = create_test_user(&database, "intruder@example.com").await;
    let sessions = SessionsManager::new(database.pool().clone());

    let detail = sessions
        .start(owner.id, &StartSessionRequest::adhoc())
        .await
        .unwrap();

    let err = sessions
        .detail(detail.session.id, intruder.id)
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 404);
    let err = sessions
        .delete(detail.session.id, intruder.id)
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 404);
}

#[tokio::test]
async fn test_deleting_custom_exercise_keeps_session_history() {
    let database = create_test_database().await;
    let user = create_test_user(&database, "history@example.com").await;
    let carry =
        create_exercise(&database, user.id, "Sandbag Carry", ExerciseCategory::Strength).await;
    let sessions = SessionsManager::new(database.pool().clone());

    let detail = sessions
        .start(user.id, &StartSessionRequest::adhoc())
        .await
        .unwrap();
    let session_id = detail.session.id;
    let detail = sessions
        .add_exercise(
            session_id,
            user.id,
            &AddSessionExerciseRequest {
                exercise_id: carry.id,
            },
        )
        .await
        .unwrap();
    sessions
        .add_set(
            session_id,
            detail.exercises[0].id,
            user.id,
            &PerformedSetRequest::reps_weight(5, 100.0),
        )
        .await
        .unwrap();
    sessions
        .end(session_id, user.id, &EndSessionRequest::default())
        .await
        .unwrap();

    let outcome = ExercisesManager::new(database.pool().clone())
        .delete(carry.id, user.id)
        .await
        .unwrap();
    assert_eq!(outcome, LibraryDeletion::Deleted);

    let detail = sessions.detail(session_id, user.id).await.unwrap();
    assert_eq!(detail.exercises.len(), 1);
    let row = &detail.exercises[0];
    assert_eq!(row.exercise_id, None);
    assert_eq!(row.exercise_name, "Sandbag Carry");
    assert_eq!(row.category, ExerciseCategory::Strength);
    assert_eq!(row.performed_sets.len(), 1);
    assert!((detail.total_volume - 500.0).abs() < f64::EPSILON);

    let listed = sessions.list(user.id, None).await.unwrap();
    assert_eq!(listed[0].exercise_count, 1);
    assert!((listed[0].total_volume - 500.0).abs() < f64::EPSILON);

    let today = Utc::now().date_naive();
    let analytics = AnalyticsManager::new(database.pool().clone());
    let volume = analytics
        .volume(
            user.id,
            DayRange {
                from: today - Duration::days(1),
                to: today + Duration::days(1),
            },
            VolumeGranularity::Day,
        )
        .await
        .unwrap();
    let total: f64 = volume.iter().map(|point| point.volume).sum();
    assert!((total - 500.0).abs() < f64::EPSILON);
    assert!(analytics
        .personal_records(user.id, Utc::now())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_blank_notes_clear_session_notes() {
    let database = create_test_database().await;
    let user = create_test_user(&database, "notes@example.com").await;
    let sessions = SessionsManager::new(database.pool().clone());

    let detail = sessions
        .start(user.id, &StartSessionRequest::adhoc())
        .await
        .unwrap();
    let session_id = detail.session.id;

    let noted = sessions
        .update(
            session_id,
            user.id,
            &UpdateSessionRequest {
                notes: Some("Left knee tight".to_owned()),
                ..UpdateSessionRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(noted.notes.as_deref(), Some("Left knee tight"));

    // Absent notes leave the stored text alone
    let renamed = sessions
        .update(
            session_id,
            user.id,
            &UpdateSessionRequest {
                name: Some("Leg Day".to_owned()),
                ..UpdateSessionRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.notes.as_deref(), Some("Left knee tight"));

    let cleared = sessions
        .update(
            session_id,
            user.id,
            &UpdateSessionRequest {
                notes: Some(String::new()),
                ..UpdateSessionRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.notes, None);
    assert_eq!(cleared.name, "Leg Day");
}
