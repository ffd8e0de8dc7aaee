// ABOUTME: Tests for file-backed SQLite databases across reconnects
// ABOUTME: Checks directory creation, idempotent migrations and data surviving a reopen
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use helpers::test_utils::{create_exercise, create_test_user};
use setlog_core::models::{ExerciseCategory, StartSessionRequest};
use setlog_server::database::{Database, ExercisesManager, SessionsManager, UsersManager};
use tempfile::TempDir;

#[tokio::test]
async fn test_file_database_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("setlog.db");
    let url = format!("sqlite:{}", path.display());

    let (user_id, exercise_id, session_id) = {
        let database = Database::new(&url).await.unwrap();
        let user = create_test_user(&database, "persist@example.com").await;
        let exercise =
            create_exercise(&database, user.id, "Farmer Carry", ExerciseCategory::Other).await;
        let session = SessionsManager::new(database.pool().clone())
            .start(user.id, &StartSessionRequest::adhoc())
            .await
            .unwrap();
        database.pool().close().await;
        (user.id, exercise.id, session.session.id)
    };
    assert!(path.exists());

    // Reopening runs migrations again against the existing schema
    let database = Database::new(&url).await.unwrap();
    database.ping().await.unwrap();

    let user = UsersManager::new(database.pool().clone())
        .get_by_email("persist@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.id, user_id);

    let exercise = ExercisesManager::new(database.pool().clone())
        .get(exercise_id, user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(exercise.name, "Farmer Carry");

    let active = SessionsManager::new(database.pool().clone())
        .active(user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id, session_id);
}
