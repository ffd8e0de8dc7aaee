// ABOUTME: Database and account fixtures for integration tests
// ABOUTME: Builds in-memory databases, test users, routers and bearer tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::axum_test::AxumTestRequest;
use axum::{http::StatusCode, Router};
use serde_json::{json, Value};
use setlog_server::{
    auth::AuthManager,
    config::ServerConfig,
    database::{
        seed_library::{seed_library, SystemLibrary},
        Database, ExercisesManager, UsersManager,
    },
    resources::ServerResources,
    server::build_router,
};
use setlog_core::models::{CreateExerciseRequest, Exercise, ExerciseCategory, User};
use std::sync::Arc;
use uuid::Uuid;

/// Fresh in-memory database with the schema applied
pub async fn create_test_database() -> Database {
    Database::new("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database")
}

/// Fresh in-memory database with the built-in system library seeded
#[allow(dead_code)]
pub async fn create_seeded_database() -> Database {
    let database = create_test_database().await;
    let library = SystemLibrary::builtin().expect("Built-in library should parse");
    seed_library(database.pool(), &library)
        .await
        .expect("Failed to seed system library");
    database
}

/// Insert a user directly, bypassing password hashing
#[allow(dead_code)]
pub async fn create_test_user(database: &Database, email: &str) -> User {
    UsersManager::new(database.pool().clone())
        .create(email, "Test Lifter", "not-a-real-hash")
        .await
        .expect("Failed to create test user")
}

/// Create a custom exercise for `user_id`
#[allow(dead_code)]
pub async fn create_exercise(
    database: &Database,
    user_id: Uuid,
    name: &str,
    category: ExerciseCategory,
) -> Exercise {
    ExercisesManager::new(database.pool().clone())
        .create(user_id, &CreateExerciseRequest::new(name, category))
        .await
        .expect("Failed to create exercise")
}

/// Server resources over an in-memory database with test configuration
pub async fn create_test_resources() -> Arc<ServerResources> {
    let config = ServerConfig::for_testing();
    let auth_manager = AuthManager::from_config(&config.auth);
    Arc::new(ServerResources::new(
        create_test_database().await,
        auth_manager,
        Arc::new(config),
    ))
}

/// Full application router over a fresh in-memory database
pub async fn create_test_app() -> Router {
    build_router(create_test_resources().await)
}

/// Register an account through the API and return its bearer token
pub async fn register_user(app: &Router, email: &str) -> String {
    let body: Value = AxumTestRequest::post("/api/auth/register")
        .json(&json!({
            "email": email,
            "password": "correct-horse-battery",
            "display_name": "Test Lifter"
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    body["token"]
        .as_str()
        .expect("register response should carry a token")
        .to_owned()
}
