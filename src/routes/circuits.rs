// ABOUTME: Route handlers for the circuit library
// ABOUTME: Merged system and custom listing, custom CRUD, member replacement and per-user hiding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{authenticate, VisibilityResponse};
use crate::database::exercises::LibraryDeletion;
use crate::errors::AppResult;
use crate::logging::AppLogger;
use crate::resources::ServerResources;
use crate::utils::extract::JsonBody;
use crate::utils::uuid::parse_uuid;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, put},
    Json, Router,
};
use serde::Deserialize;
use setlog_core::models::{CircuitExerciseInput, CreateCircuitRequest, UpdateCircuitRequest};
use std::sync::Arc;

/// Body replacing a circuit's member list
#[derive(Debug, Deserialize)]
pub struct ReplaceCircuitExercisesBody {
    /// Members in their new order
    pub exercises: Vec<CircuitExerciseInput>,
}

/// Circuit routes handler
pub struct CircuitsRoutes;

impl CircuitsRoutes {
    /// Create all circuit routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/circuits",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route("/api/circuits/hidden", get(Self::handle_list_hidden))
            .route(
                "/api/circuits/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route(
                "/api/circuits/:id/exercises",
                put(Self::handle_replace_exercises),
            )
            .route("/api/circuits/:id/hide", delete(Self::handle_show))
            .with_state(resources)
    }

    /// Handle GET /api/circuits
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let circuits = resources.circuits.list(auth.user_id).await?;
        Ok((StatusCode::OK, Json(circuits)).into_response())
    }

    /// Handle GET /api/circuits/hidden
    async fn handle_list_hidden(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let circuits = resources.circuits.list_hidden(auth.user_id).await?;
        Ok((StatusCode::OK, Json(circuits)).into_response())
    }

    /// Handle POST /api/circuits
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        JsonBody(request): JsonBody<CreateCircuitRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let circuit = resources.circuits.create(auth.user_id, &request).await?;
        Ok((StatusCode::CREATED, Json(circuit)).into_response())
    }

    /// Handle GET /api/circuits/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let circuit_id = parse_uuid(&id, "circuit id")?;
        let circuit = resources.circuits.require(circuit_id, auth.user_id).await?;
        Ok((StatusCode::OK, Json(circuit)).into_response())
    }

    /// Handle PUT /api/circuits/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(request): JsonBody<UpdateCircuitRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let circuit_id = parse_uuid(&id, "circuit id")?;
        let circuit = resources
            .circuits
            .update(circuit_id, auth.user_id, &request)
            .await?;
        Ok((StatusCode::OK, Json(circuit)).into_response())
    }

    /// Handle PUT /api/circuits/:id/exercises
    async fn handle_replace_exercises(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(body): JsonBody<ReplaceCircuitExercisesBody>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let circuit_id = parse_uuid(&id, "circuit id")?;
        let circuit = resources
            .circuits
            .replace_exercises(circuit_id, auth.user_id, &body.exercises)
            .await?;
        Ok((StatusCode::OK, Json(circuit)).into_response())
    }

    /// Handle DELETE /api/circuits/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let circuit_id = parse_uuid(&id, "circuit id")?;
        let action = match resources.circuits.delete(circuit_id, auth.user_id).await? {
            LibraryDeletion::Hidden => {
                AppLogger::log_library_visibility(auth.user_id, "circuit", circuit_id, true);
                "hidden"
            }
            LibraryDeletion::Deleted => "deleted",
        };
        let body = VisibilityResponse {
            id: circuit_id,
            action,
        };
        Ok((StatusCode::OK, Json(body)).into_response())
    }

    /// Handle DELETE /api/circuits/:id/hide
    async fn handle_show(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let circuit_id = parse_uuid(&id, "circuit id")?;
        if resources.circuits.show(circuit_id, auth.user_id).await? {
            AppLogger::log_library_visibility(auth.user_id, "circuit", circuit_id, false);
        }
        let body = VisibilityResponse {
            id: circuit_id,
            action: "shown",
        };
        Ok((StatusCode::OK, Json(body)).into_response())
    }
}
