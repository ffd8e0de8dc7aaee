// ABOUTME: Route handlers for scheduling templates onto calendar dates
// ABOUTME: Date-window listing plus create, update and delete of schedule items
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::authenticate;
use crate::constants::defaults::{SCHEDULE_LOOKAHEAD_DAYS, SCHEDULE_LOOKBACK_DAYS};
use crate::errors::{AppError, AppResult};
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
use chrono::Duration;
use setlog_core::models::{CreateScheduleItemRequest, DateRangeQuery, UpdateScheduleItemRequest};
use setlog_core::time::today;
use std::sync::Arc;

/// Schedule routes handler
pub struct ScheduleRoutes;

impl ScheduleRoutes {
    /// Create all schedule routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/schedule",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/schedule/:id",
                put(Self::handle_update).delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Handle GET /api/schedule?from&to
    ///
    /// Without bounds the window runs from a week ago to four weeks ahead.
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        QueryParams(query): QueryParams<DateRangeQuery>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let today = today();
        let from = query
            .from
            .unwrap_or(today - Duration::days(SCHEDULE_LOOKBACK_DAYS));
        let to = query
            .to
            .unwrap_or(today + Duration::days(SCHEDULE_LOOKAHEAD_DAYS));
        if from > to {
            return Err(AppError::invalid_input("from must not be after to"));
        }

        let items = resources.schedule.list(auth.user_id, from, to).await?;
        Ok((StatusCode::OK, Json(items)).into_response())
    }

    /// Handle POST /api/schedule
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        JsonBody(request): JsonBody<CreateScheduleItemRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let item = resources.schedule.create(auth.user_id, &request).await?;
        Ok((StatusCode::CREATED, Json(item)).into_response())
    }

    /// Handle PUT /api/schedule/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        JsonBody(request): JsonBody<UpdateScheduleItemRequest>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let item_id = parse_uuid(&id, "schedule item id")?;
        let item = resources
            .schedule
            .update(item_id, auth.user_id, &request)
            .await?;
        Ok((StatusCode::OK, Json(item)).into_response())
    }

    /// Handle DELETE /api/schedule/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let item_id = parse_uuid(&id, "schedule item id")?;
        resources.schedule.delete(item_id, auth.user_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
