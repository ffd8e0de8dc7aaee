// ABOUTME: Route handlers for supplements and their daily intake logs
// ABOUTME: Listing carries adherence, streak and taken-today figures computed per request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::authenticate;
use crate::constants::analytics::ADHERENCE_WINDOW_DAYS;
use crate::errors::AppResult;
use crate::resources::ServerResources;
use crate::utils::extract::{optional_json, JsonBody, QueryParams};
use crate::utils::uuid::parse_uuid;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, put},
    Json, Router,
};
use setlog_core::models::{
    CreateSupplementLogRequest, CreateSupplementRequest, DateRangeQuery, UpdateSupplementRequest,
};
use setlog_core::time::today;
use std::sync::Arc;

/// Supplement routes handler
pub struct SupplementsRoutes;

impl SupplementsRoutes {
    /// Create all supplement and supplement-log routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/supplements",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/supplements/:id",
                put(Self::handle_update).delete(Self::handle_delete),
            )
            .route(
                "/api/supplements/:id/logs",
                get(Self::handle_list_logs).post(Self::handle_log_intake),
            )
            .route("/api/supplement-logs/:id", delete(Self::handle_delete_log))
            .with_state(resources)
    }

    /// Handle GET /api/supplements
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let supplements = resources.supplements.list(auth.user_id, today()).await?;
        Ok((StatusCode::OK, Json(supplements)).into_response())
    }

    /// Handle POST /api/supplements
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        JsonBody(request): JsonBody<CreateSupplementRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let supplement = resources.supplements.create(auth.user_id, &request).await?;
        Ok((StatusCode::CREATED, Json(supplement)).into_response())
    }

    /// Handle PUT /api/supplements/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(request): JsonBody<UpdateSupplementRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let supplement_id = parse_uuid(&id, "supplement id")?;
        let supplement = resources
            .supplements
            .update(supplement_id, auth.user_id, &request)
            .await?;
        Ok((StatusCode::OK, Json(supplement)).into_response())
    }

    /// Handle DELETE /api/supplements/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let supplement_id = parse_uuid(&id, "supplement id")?;
        resources
            .supplements
            .delete(supplement_id, auth.user_id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle GET /api/supplements/:id/logs?from&to
    async fn handle_list_logs(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        QueryParams(query): QueryParams<DateRangeQuery>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let supplement_id = parse_uuid(&id, "supplement id")?;
        let (from, to) = query.resolve(today(), ADHERENCE_WINDOW_DAYS)?;
        let logs = resources
            .supplements
            .list_logs(supplement_id, auth.user_id, from, to)
            .await?;
        Ok((StatusCode::OK, Json(logs)).into_response())
    }

    /// Handle POST /api/supplements/:id/logs
    async fn handle_log_intake(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        body: Bytes,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let supplement_id = parse_uuid(&id, "supplement id")?;
        let request: CreateSupplementLogRequest = optional_json(&body)?;
        let log = resources
            .supplements
            .log_intake(supplement_id, auth.user_id, &request, today())
            .await?;
        Ok((StatusCode::CREATED, Json(log)).into_response())
    }

    /// Handle DELETE /api/supplement-logs/:id
    async fn handle_delete_log(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let log_id = parse_uuid(&id, "supplement log id")?;
        resources.supplements.delete_log(log_id, auth.user_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
