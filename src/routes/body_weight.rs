// ABOUTME: Route handlers for the body-weight log
// ABOUTME: Date-range listing plus create, update and delete of entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::authenticate;
use crate::constants::analytics::DEFAULT_RANGE_DAYS;
use crate::errors::AppResult;
use crate::resources::ServerResources;
use crate::utils::extract::{JsonBody, QueryParams};
use crate::utils::uuid::parse_uuid;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use setlog_core::models::{CreateBodyWeightRequest, DateRangeQuery, UpdateBodyWeightRequest};
use setlog_core::time::today;
use std::sync::Arc;

/// Body-weight routes handler
pub struct BodyWeightRoutes;

impl BodyWeightRoutes {
    /// Create all body-weight routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/body-weight",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/body-weight/:id",
                put(Self::handle_update).delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Handle GET /api/body-weight?from&to
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        QueryParams(query): QueryParams<DateRangeQuery>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let (from, to) = query.resolve(today(), DEFAULT_RANGE_DAYS)?;
        let entries = resources.body_weight.list(auth.user_id, from, to).await?;
        Ok((StatusCode::OK, Json(entries)).into_response())
    }

    /// Handle POST /api/body-weight
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        JsonBody(request): JsonBody<CreateBodyWeightRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let entry = resources
            .body_weight
            .create(auth.user_id, &request, today())
            .await?;
        Ok((StatusCode::CREATED, Json(entry)).into_response())
    }

    /// Handle PUT /api/body-weight/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(request): JsonBody<UpdateBodyWeightRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let entry_id = parse_uuid(&id, "body weight entry id")?;
        let entry = resources
            .body_weight
            .update(entry_id, auth.user_id, &request)
            .await?;
        Ok((StatusCode::OK, Json(entry)).into_response())
    }

    /// Handle DELETE /api/body-weight/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let entry_id = parse_uuid(&id, "body weight entry id")?;
        resources.body_weight.delete(entry_id, auth.user_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
