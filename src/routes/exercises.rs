// ABOUTME: Route handlers for the exercise library
// ABOUTME: Merged system and custom listing, custom CRUD, per-user hiding and last performance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Exercise routes
//!
//! `DELETE /api/exercises/:id` hides a system exercise for the caller and
//! hard-deletes a custom one; `DELETE /api/exercises/:id/hide` undoes a hide.

use super::{authenticate, VisibilityResponse};
use crate::database::exercises::LibraryDeletion;
use crate::errors::AppResult;
use crate::logging::AppLogger;
use crate::resources::ServerResources;
use crate::utils::extract::{JsonBody, QueryParams};
use crate::utils::uuid::parse_uuid;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use setlog_core::models::{CreateExerciseRequest, ExerciseCategory, UpdateExerciseRequest};
use std::sync::Arc;

/// Query parameters for listing exercises
#[derive(Debug, Deserialize, Default)]
pub struct ListExercisesQuery {
    /// Only this category
    pub category: Option<ExerciseCategory>,
}

/// Exercise routes handler
pub struct ExercisesRoutes;

impl ExercisesRoutes {
    /// Create all exercise routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/exercises",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route("/api/exercises/hidden", get(Self::handle_list_hidden))
            .route("/api/exercises/categories", get(Self::handle_categories))
            .route(
                "/api/exercises/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route("/api/exercises/:id/hide", delete(Self::handle_show))
            .route(
                "/api/exercises/:id/last-performance",
                get(Self::handle_last_performance),
            )
            .with_state(resources)
    }

    /// Handle GET /api/exercises
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        QueryParams(query): QueryParams<ListExercisesQuery>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let exercises = resources
            .exercises
            .list(auth.user_id, query.category)
            .await?;
        Ok((StatusCode::OK, Json(exercises)).into_response())
    }

    /// Handle GET /api/exercises/hidden
    async fn handle_list_hidden(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let exercises = resources.exercises.list_hidden(auth.user_id).await?;
        Ok((StatusCode::OK, Json(exercises)).into_response())
    }

    /// Handle GET /api/exercises/categories
    async fn handle_categories(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        authenticate(&headers, &resources)?;
        Ok((StatusCode::OK, Json(ExerciseCategory::ALL)).into_response())
    }

    /// Handle POST /api/exercises
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        JsonBody(request): JsonBody<CreateExerciseRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let exercise = resources.exercises.create(auth.user_id, &request).await?;
        Ok((StatusCode::CREATED, Json(exercise)).into_response())
    }

    /// Handle GET /api/exercises/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let exercise_id = parse_uuid(&id, "exercise id")?;
        let exercise = resources
            .exercises
            .require(exercise_id, auth.user_id)
            .await?;
        Ok((StatusCode::OK, Json(exercise)).into_response())
    }

    /// Handle PUT /api/exercises/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(request): JsonBody<UpdateExerciseRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let exercise_id = parse_uuid(&id, "exercise id")?;
        let exercise = resources
            .exercises
            .update(exercise_id, auth.user_id, &request)
            .await?;
        Ok((StatusCode::OK, Json(exercise)).into_response())
    }

    /// Handle DELETE /api/exercises/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let exercise_id = parse_uuid(&id, "exercise id")?;
        let outcome = resources
            .exercises
            .delete(exercise_id, auth.user_id)
            .await?;

        let action = match outcome {
            LibraryDeletion::Hidden => {
                AppLogger::log_library_visibility(auth.user_id, "exercise", exercise_id, true);
                "hidden"
            }
            LibraryDeletion::Deleted => "deleted",
        };
        let body = VisibilityResponse {
            id: exercise_id,
            action,
        };
        Ok((StatusCode::OK, Json(body)).into_response())
    }

    /// Handle DELETE /api/exercises/:id/hide
    async fn handle_show(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let exercise_id = parse_uuid(&id, "exercise id")?;
        if resources.exercises.show(exercise_id, auth.user_id).await? {
            AppLogger::log_library_visibility(auth.user_id, "exercise", exercise_id, false);
        }
        let body = VisibilityResponse {
            id: exercise_id,
            action: "shown",
        };
        Ok((StatusCode::OK, Json(body)).into_response())
    }

    /// Handle GET /api/exercises/:id/last-performance
    async fn handle_last_performance(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let exercise_id = parse_uuid(&id, "exercise id")?;
        resources
            .exercises
            .require(exercise_id, auth.user_id)
            .await?;
        let last = resources
            .sessions
            .last_performance(auth.user_id, exercise_id)
            .await?;
        Ok((StatusCode::OK, Json(last)).into_response())
    }
}
