// ABOUTME: Route module organization for the Setlog REST API
// ABOUTME: One router per domain plus the shared authentication helper used by every handler
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the Setlog server
//!
//! Each domain module owns its route table and thin handlers that
//! authenticate, parse path ids and delegate to the domain manager held in
//! `ServerResources`. Routers are merged in `server::build_router`.

/// Training analytics routes
pub mod analytics;
/// Registration, login and logout
pub mod auth;
/// Body-weight log routes
pub mod body_weight;
/// Circuit library routes
pub mod circuits;
/// Exercise library routes
pub mod exercises;
/// Health and readiness checks
pub mod health;
/// Schedule routes
pub mod schedule;
/// Session runner routes
pub mod sessions;
/// Supplement and intake log routes
pub mod supplements;
/// Template builder routes
pub mod templates;

pub use analytics::AnalyticsRoutes;
pub use auth::AuthRoutes;
pub use body_weight::BodyWeightRoutes;
pub use circuits::CircuitsRoutes;
pub use exercises::ExercisesRoutes;
pub use health::HealthRoutes;
pub use schedule::ScheduleRoutes;
pub use sessions::SessionsRoutes;
pub use supplements::SupplementsRoutes;
pub use templates::TemplatesRoutes;

use crate::auth::AuthResult;
use crate::errors::AppResult;
use crate::resources::ServerResources;
use axum::http::HeaderMap;
use serde::Serialize;
use uuid::Uuid;

/// Authenticate a request from its bearer header or session cookie
///
/// # Errors
///
/// Returns 401 when credentials are missing or invalid
pub(crate) fn authenticate(headers: &HeaderMap, resources: &ServerResources) -> AppResult<AuthResult> {
    resources.auth_manager.authenticate(headers)
}

/// Body returned by library deletes and unhides
#[derive(Debug, Serialize)]
pub struct VisibilityResponse {
    /// Affected row
    pub id: Uuid,
    /// `hidden` for system rows, `deleted` for custom rows, `shown` after an unhide
    pub action: &'static str,
}
