// ABOUTME: Route handlers for the template builder
// ABOUTME: Template CRUD, exercise rows, circuit blocks, reorders and planned sets
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Template routes
//!
//! Every composition mutation answers with the full `TemplateDetail` so the
//! client can redraw the builder without a second request.

use super::authenticate;
use crate::errors::AppResult;
use crate::resources::ServerResources;
use crate::utils::extract::JsonBody;
use crate::utils::uuid::{parse_uuid, parse_uuid_pair};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use setlog_core::models::{
    AddTemplateCircuitRequest, AddTemplateExerciseRequest, CreateTemplateRequest,
    PlannedSetRequest, ReorderRequest, UpdateCircuitBlockRequest, UpdateTemplateExerciseRequest,
    UpdateTemplateRequest,
};
use std::sync::Arc;

/// Template routes handler
pub struct TemplatesRoutes;

impl TemplatesRoutes {
    /// Create all template and planned-set routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/templates",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/templates/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route(
                "/api/templates/:id/exercises",
                post(Self::handle_add_exercise),
            )
            .route(
                "/api/templates/:id/exercises/reorder",
                put(Self::handle_reorder_exercises),
            )
            .route(
                "/api/templates/:id/exercises/:te_id",
                put(Self::handle_update_exercise).delete(Self::handle_remove_exercise),
            )
            .route(
                "/api/templates/:id/circuits",
                post(Self::handle_add_circuit),
            )
            .route(
                "/api/templates/:id/circuits/:block_id",
                put(Self::handle_update_block).delete(Self::handle_remove_block),
            )
            .route(
                "/api/templates/:id/exercises/:te_id/sets",
                post(Self::handle_add_planned_set),
            )
            .route(
                "/api/templates/:id/exercises/:te_id/sets/reorder",
                put(Self::handle_reorder_planned_sets),
            )
            .route(
                "/api/planned-sets/:id",
                put(Self::handle_update_planned_set).delete(Self::handle_delete_planned_set),
            )
            .with_state(resources)
    }

    /// Handle GET /api/templates
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let templates = resources.templates.list(auth.user_id).await?;
        Ok((StatusCode::OK, Json(templates)).into_response())
    }

    /// Handle POST /api/templates
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        JsonBody(request): JsonBody<CreateTemplateRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let template = resources.templates.create(auth.user_id, &request).await?;
        Ok((StatusCode::CREATED, Json(template)).into_response())
    }

    /// Handle GET /api/templates/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let template_id = parse_uuid(&id, "template id")?;
        let detail = resources.templates.detail(template_id, auth.user_id).await?;
        Ok((StatusCode::OK, Json(detail)).into_response())
    }

    /// Handle PUT /api/templates/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(request): JsonBody<UpdateTemplateRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let template_id = parse_uuid(&id, "template id")?;
        let template = resources
            .templates
            .update(template_id, auth.user_id, &request)
            .await?;
        Ok((StatusCode::OK, Json(template)).into_response())
    }

    /// Handle DELETE /api/templates/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let template_id = parse_uuid(&id, "template id")?;
        resources.templates.delete(template_id, auth.user_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/templates/:id/exercises
    async fn handle_add_exercise(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(request): JsonBody<AddTemplateExerciseRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let template_id = parse_uuid(&id, "template id")?;
        let detail = resources
            .templates
            .add_exercise(template_id, auth.user_id, &request)
            .await?;
        Ok((StatusCode::CREATED, Json(detail)).into_response())
    }

    /// Handle PUT /api/templates/:id/exercises/reorder
    async fn handle_reorder_exercises(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(request): JsonBody<ReorderRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let template_id = parse_uuid(&id, "template id")?;
        let detail = resources
            .templates
            .reorder_exercises(template_id, auth.user_id, &request.ids)
            .await?;
        Ok((StatusCode::OK, Json(detail)).into_response())
    }

    /// Handle PUT /api/templates/:id/exercises/:te_id
    async fn handle_update_exercise(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, te_id)): Path<(String, String)>,
        JsonBody(request): JsonBody<UpdateTemplateExerciseRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let (template_id, row_id) =
            parse_uuid_pair((&id, &te_id), ("template id", "template exercise id"))?;
        let detail = resources
            .templates
            .update_exercise(template_id, row_id, auth.user_id, &request)
            .await?;
        Ok((StatusCode::OK, Json(detail)).into_response())
    }

    /// Handle DELETE /api/templates/:id/exercises/:te_id
    async fn handle_remove_exercise(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, te_id)): Path<(String, String)>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let (template_id, row_id) =
            parse_uuid_pair((&id, &te_id), ("template id", "template exercise id"))?;
        resources
            .templates
            .remove_exercise(template_id, row_id, auth.user_id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/templates/:id/circuits
    async fn handle_add_circuit(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(request): JsonBody<AddTemplateCircuitRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let template_id = parse_uuid(&id, "template id")?;
        let detail = resources
            .templates
            .add_circuit(template_id, auth.user_id, &request)
            .await?;
        Ok((StatusCode::CREATED, Json(detail)).into_response())
    }

    /// Handle PUT /api/templates/:id/circuits/:block_id
    async fn handle_update_block(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, block_id)): Path<(String, String)>,
        JsonBody(request): JsonBody<UpdateCircuitBlockRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let (template_id, block_id) =
            parse_uuid_pair((&id, &block_id), ("template id", "block id"))?;
        let detail = resources
            .templates
            .update_block(template_id, block_id, auth.user_id, &request)
            .await?;
        Ok((StatusCode::OK, Json(detail)).into_response())
    }

    /// Handle DELETE /api/templates/:id/circuits/:block_id
    async fn handle_remove_block(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, block_id)): Path<(String, String)>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let (template_id, block_id) =
            parse_uuid_pair((&id, &block_id), ("template id", "block id"))?;
        resources
            .templates
            .remove_block(template_id, block_id, auth.user_id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/templates/:id/exercises/:te_id/sets
    async fn handle_add_planned_set(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, te_id)): Path<(String, String)>,
        JsonBody(request): JsonBody<PlannedSetRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let (template_id, row_id) =
            parse_uuid_pair((&id, &te_id), ("template id", "template exercise id"))?;
        let set = resources
            .templates
            .add_planned_set(template_id, row_id, auth.user_id, &request)
            .await?;
        Ok((StatusCode::CREATED, Json(set)).into_response())
    }

    /// Handle PUT /api/templates/:id/exercises/:te_id/sets/reorder
    async fn handle_reorder_planned_sets(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((id, te_id)): Path<(String, String)>,
        JsonBody(request): JsonBody<ReorderRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let (template_id, row_id) =
            parse_uuid_pair((&id, &te_id), ("template id", "template exercise id"))?;
        let sets = resources
            .templates
            .reorder_planned_sets(template_id, row_id, auth.user_id, &request.ids)
            .await?;
        Ok((StatusCode::OK, Json(sets)).into_response())
    }

    /// Handle PUT /api/planned-sets/:id
    async fn handle_update_planned_set(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(request): JsonBody<PlannedSetRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let set_id = parse_uuid(&id, "planned set id")?;
        let set = resources
            .templates
            .update_planned_set(set_id, auth.user_id, &request)
            .await?;
        Ok((StatusCode::OK, Json(set)).into_response())
    }

    /// Handle DELETE /api/planned-sets/:id
    async fn handle_delete_planned_set(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let set_id = parse_uuid(&id, "planned set id")?;
        resources
            .templates
            .delete_planned_set(set_id, auth.user_id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
