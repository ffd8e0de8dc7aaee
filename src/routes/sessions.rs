// ABOUTME: Route handlers for the live session runner
// ABOUTME: Start/end, session exercises and circuits, performed sets and pre-fill suggestions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Session routes
//!
//! `POST /api/sessions` starts an ad-hoc session when the body is empty, or
//! instantiates a template or schedule item. `GET /api/sessions/active`
//! answers `null` when nothing is running.

use super::authenticate;
use crate::errors::AppResult;
use crate::resources::ServerResources;
use crate::utils::extract::{optional_json, JsonBody, QueryParams};
use crate::utils::uuid::{parse_uuid, parse_uuid_pair};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use setlog_core::models::{
    AddSessionCircuitRequest, AddSessionExerciseRequest, EndSessionRequest, PerformedSetRequest,
    PrefillQuery, StartSessionRequest, UpdateSessionRequest,
};
use std::sync::Arc;

/// Query parameters for session history
#[derive(Debug, Deserialize, Default)]
pub struct ListSessionsQuery {
    /// Maximum number of sessions, newest first
    pub limit: Option<u32>,
}

/// Session routes handler
pub struct SessionsRoutes;

impl SessionsRoutes {
    /// Create all session and performed-set routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/sessions",
                get(Self::handle_list).post(Self::handle_start),
            )
            .route("/api/sessions/active", get(Self::handle_active))
            .route(
                "/api/sessions/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route("/api/sessions/:id/end", post(Self::handle_end))
            .route(
                "/api/sessions/:id/exercises",
                post(Self::handle_add_exercise),
            )
            .route(
                "/api/sessions/:id/circuits",
                post(Self::handle_add_circuit),
            )
            .route(
                "/api/sessions/:id/exercises/:se_id",
                delete(Self::handle_remove_exercise),
            )
            .route(
                "/api/sessions/:id/exercises/:se_id/sets",
                post(Self::handle_add_set),
            )
            .route(
                "/api/sessions/:id/exercises/:se_id/prefill",
                get(Self::handle_prefill),
            )
            .route(
                "/api/performed-sets/:id",
                put(Self::handle_update_set).delete(Self::handle_delete_set),
            )
            .with_state(resources)
    }

    /// Handle GET /api/sessions
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        QueryParams(query): QueryParams<ListSessionsQuery>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let sessions = resources.sessions.list(auth.user_id, query.limit).await?;
        Ok((StatusCode::OK, Json(sessions)).into_response())
    }

    /// Handle POST /api/sessions
    async fn handle_start(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let request: StartSessionRequest = optional_json(&body)?;
        let detail = resources.sessions.start(auth.user_id, &request).await?;
        Ok((StatusCode::CREATED, Json(detail)).into_response())
    }

    /// Handle GET /api/sessions/active
    async fn handle_active(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let detail = match resources.sessions.active(auth.user_id).await? {
            Some(session) => Some(resources.sessions.detail(session.id, auth.user_id).await?),
            None => None,
        };
        Ok((StatusCode::OK, Json(detail)).into_response())
    }

    /// Handle GET /api/sessions/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let session_id = parse_uuid(&id, "session id")?;
        let detail = resources.sessions.detail(session_id, auth.user_id).await?;
        Ok((StatusCode::OK, Json(detail)).into_response())
    }

    /// Handle PUT /api/sessions/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(request): JsonBody<UpdateSessionRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let session_id = parse_uuid(&id, "session id")?;
        let session = resources
            .sessions
            .update(session_id, auth.user_id, &request)
            .await?;
        Ok((StatusCode::OK, Json(session)).into_response())
    }

    /// Handle DELETE /api/sessions/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let session_id = parse_uuid(&id, "session id")?;
        resources.sessions.delete(session_id, auth.user_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/sessions/:id/end
    async fn handle_end(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        body: Bytes,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let session_id = parse_uuid(&id, "session id")?;
        let request: EndSessionRequest = optional_json(&body)?;
        let detail = resources
            .sessions
            .end(session_id, auth.user_id, &request)
            .await?;
        Ok((StatusCode::OK, Json(detail)).into_response())
    }

    /// Handle POST /api/sessions/:id/exercises
    async fn handle_add_exercise(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(request): JsonBody<AddSessionExerciseRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let session_id = parse_uuid(&id, "session id")?;
        let detail = resources
            .sessions
            .add_exercise(session_id, auth.user_id, &request)
            .await?;
        Ok((StatusCode::CREATED, Json(detail)).into_response())
    }

    /// Handle POST /api/sessions/:id/circuits
    async fn handle_add_circuit(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(request): JsonBody<AddSessionCircuitRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let session_id = parse_uuid(&id, "session id")?;
        let detail = resources
            .sessions
            .add_circuit(session_id, auth.user_id, &request)
            .await?;
        Ok((StatusCode::CREATED, Json(detail)).into_response())
    }

    /// Handle DELETE /api/sessions/:id/exercises/:se_id
    async fn handle_remove_exercise(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, se_id)): Path<(String, String)>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let (session_id, session_exercise_id) =
            parse_uuid_pair((&id, &se_id), ("session id", "session exercise id"))?;
        resources
            .sessions
            .remove_exercise(session_id, session_exercise_id, auth.user_id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/sessions/:id/exercises/:se_id/sets
    async fn handle_add_set(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, se_id)): Path<(String, String)>,
        JsonBody(request): JsonBody<PerformedSetRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let (session_id, session_exercise_id) =
            parse_uuid_pair((&id, &se_id), ("session id", "session exercise id"))?;
        let set = resources
            .sessions
            .add_set(session_id, session_exercise_id, auth.user_id, &request)
            .await?;
        Ok((StatusCode::CREATED, Json(set)).into_response())
    }

    /// Handle GET /api/sessions/:id/exercises/:se_id/prefill?set_number=n
    async fn handle_prefill(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, se_id)): Path<(String, String)>,
        QueryParams(query): QueryParams<PrefillQuery>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let (session_id, session_exercise_id) =
            parse_uuid_pair((&id, &se_id), ("session id", "session exercise id"))?;
        let suggestion = resources
            .sessions
            .prefill(session_id, session_exercise_id, auth.user_id, query.set_number)
            .await?;
        Ok((StatusCode::OK, Json(suggestion)).into_response())
    }

    /// Handle PUT /api/performed-sets/:id
    async fn handle_update_set(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(request): JsonBody<PerformedSetRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let set_id = parse_uuid(&id, "performed set id")?;
        let set = resources
            .sessions
            .update_set(set_id, auth.user_id, &request)
            .await?;
        Ok((StatusCode::OK, Json(set)).into_response())
    }

    /// Handle DELETE /api/performed-sets/:id
    async fn handle_delete_set(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let set_id = parse_uuid(&id, "performed set id")?;
        resources.sessions.delete_set(set_id, auth.user_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
