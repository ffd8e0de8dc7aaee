// ABOUTME: HTTP server assembly for the Setlog REST API
// ABOUTME: Merges every route group, applies tower-http layers and serves with graceful shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # HTTP Server
//!
//! `build_router` is what the integration tests drive through
//! `tower::ServiceExt::oneshot`; `run` binds a TCP listener and serves the
//! same router until ctrl-c.

use crate::middleware::{make_request_span, setup_cors};
use crate::resources::ServerResources;
use crate::routes::{
    AnalyticsRoutes, AuthRoutes, BodyWeightRoutes, CircuitsRoutes, ExercisesRoutes, HealthRoutes,
    ScheduleRoutes, SessionsRoutes, SupplementsRoutes, TemplatesRoutes,
};
use anyhow::{Context, Result};
use axum::body::Body;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::map_response_body::MapResponseBodyLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Build the complete application router with middleware applied
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let security = &resources.config.security;
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(setup_cors(security))
        .layer(MapResponseBodyLayer::new(Body::new))
        .layer(RequestBodyLimitLayer::new(security.max_request_size))
        .layer(TimeoutLayer::new(Duration::from_secs(
            security.request_timeout_secs,
        )));

    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .merge(AuthRoutes::routes(Arc::clone(&resources)))
        .merge(ExercisesRoutes::routes(Arc::clone(&resources)))
        .merge(CircuitsRoutes::routes(Arc::clone(&resources)))
        .merge(TemplatesRoutes::routes(Arc::clone(&resources)))
        .merge(ScheduleRoutes::routes(Arc::clone(&resources)))
        .merge(SessionsRoutes::routes(Arc::clone(&resources)))
        .merge(SupplementsRoutes::routes(Arc::clone(&resources)))
        .merge(BodyWeightRoutes::routes(Arc::clone(&resources)))
        .merge(AnalyticsRoutes::routes(resources))
        .layer(middleware)
}

/// Serve the API on `0.0.0.0:port` until ctrl-c
///
/// # Errors
///
/// Returns an error if the port cannot be bound or the server fails
pub async fn run(resources: Arc<ServerResources>, port: u16) -> Result<()> {
    let app = build_router(resources);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(address = %addr, "Setlog API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    info!("Setlog API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
