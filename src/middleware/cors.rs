// ABOUTME: CORS middleware configuration for the REST API
// ABOUTME: Allows any origin in development or an explicit list from CORS_ALLOWED_ORIGINS
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::config::SecurityConfig;
use http::{header::HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

/// Configure CORS from the security settings
///
/// A single `*` entry allows any origin without credentials. A list of
/// origins allows credentials so the browser sends the session cookie.
///
/// ```bash
/// export CORS_ALLOWED_ORIGINS="https://setlog.example.com,http://localhost:5173"
/// ```
#[must_use]
pub fn setup_cors(config: &SecurityConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("x-request-id"),
        ])
        .expose_headers([HeaderName::from_static("x-request-id")])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]);

    if config.cors_origins.is_empty() || config.cors_origins.iter().any(|o| o == "*") {
        return base.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|e| warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();

    if origins.is_empty() {
        return base.allow_origin(AllowOrigin::any());
    }
    base.allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}
