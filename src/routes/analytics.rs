// ABOUTME: Route handlers for training analytics
// ABOUTME: Overview, records, volume series, durations, exercise progress and body-weight trend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Analytics routes
//!
//! Ranges are `?from=YYYY-MM-DD&to=YYYY-MM-DD`; `to` defaults to today and
//! `from` to 90 days before `to`.

use super::authenticate;
use crate::constants::analytics::DEFAULT_RANGE_DAYS;
use crate::database::analytics::DayRange;
use crate::errors::AppResult;
use crate::resources::ServerResources;
use crate::utils::extract::QueryParams;
use crate::utils::uuid::parse_uuid;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use setlog_core::models::{AnalyticsRangeQuery, DateRangeQuery, WeightUnit};
use setlog_core::time::today;
use std::sync::Arc;

/// Query for the body-weight trend
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct BodyWeightTrendQuery {
    /// First day, inclusive
    pub from: Option<NaiveDate>,
    /// Last day, inclusive
    pub to: Option<NaiveDate>,
    /// Unit to express the trend in; the latest entry's unit when absent
    pub unit: Option<WeightUnit>,
}

fn day_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> AppResult<DayRange> {
    let (from, to) = DateRangeQuery { from, to }.resolve(today(), DEFAULT_RANGE_DAYS)?;
    Ok(DayRange { from, to })
}

/// Analytics routes handler
pub struct AnalyticsRoutes;

impl AnalyticsRoutes {
    /// Create all analytics routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/analytics/overview", get(Self::handle_overview))
            .route("/api/analytics/prs", get(Self::handle_personal_records))
            .route("/api/analytics/volume", get(Self::handle_volume))
            .route(
                "/api/analytics/volume-by-category",
                get(Self::handle_volume_by_category),
            )
            .route(
                "/api/analytics/sessions-duration",
                get(Self::handle_session_durations),
            )
            .route(
                "/api/analytics/exercises/:id",
                get(Self::handle_exercise_progress),
            )
            .route(
                "/api/analytics/body-weight",
                get(Self::handle_body_weight_trend),
            )
            .with_state(resources)
    }

    /// Handle GET /api/analytics/overview
    async fn handle_overview(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let overview = resources
            .analytics
            .overview(auth.user_id, Utc::now())
            .await?;
        Ok((StatusCode::OK, Json(overview)).into_response())
    }

    /// Handle GET /api/analytics/prs
    async fn handle_personal_records(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let records = resources
            .analytics
            .personal_records(auth.user_id, Utc::now())
            .await?;
        Ok((StatusCode::OK, Json(records)).into_response())
    }

    /// Handle GET /api/analytics/volume?from&to&granularity
    async fn handle_volume(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        QueryParams(query): QueryParams<AnalyticsRangeQuery>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let range = day_range(query.from, query.to)?;
        let points = resources
            .analytics
            .volume(auth.user_id, range, query.granularity)
            .await?;
        Ok((StatusCode::OK, Json(points)).into_response())
    }

    /// Handle GET /api/analytics/volume-by-category?from&to
    async fn handle_volume_by_category(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        QueryParams(query): QueryParams<DateRangeQuery>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let range = day_range(query.from, query.to)?;
        let categories = resources
            .analytics
            .volume_by_category(auth.user_id, range)
            .await?;
        Ok((StatusCode::OK, Json(categories)).into_response())
    }

    /// Handle GET /api/analytics/sessions-duration?from&to
    async fn handle_session_durations(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        QueryParams(query): QueryParams<DateRangeQuery>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let range = day_range(query.from, query.to)?;
        let durations = resources
            .analytics
            .session_durations(auth.user_id, range)
            .await?;
        Ok((StatusCode::OK, Json(durations)).into_response())
    }

    /// Handle GET /api/analytics/exercises/:id?from&to
    async fn handle_exercise_progress(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        QueryParams(query): QueryParams<DateRangeQuery>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let exercise_id = parse_uuid(&id, "exercise id")?;
        let range = day_range(query.from, query.to)?;
        let progress = resources
            .analytics
            .exercise_progress(auth.user_id, exercise_id, range, Utc::now())
            .await?;
        Ok((StatusCode::OK, Json(progress)).into_response())
    }

    /// Handle GET /api/analytics/body-weight?from&to&unit
    async fn handle_body_weight_trend(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        QueryParams(query): QueryParams<BodyWeightTrendQuery>,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let range = day_range(query.from, query.to)?;
        let trend = resources
            .analytics
            .body_weight_trend(auth.user_id, range, query.unit)
            .await?;
        Ok((StatusCode::OK, Json(trend)).into_response())
    }
}
