// ABOUTME: Request tracing helpers for correlation and structured logging
// ABOUTME: Names the request id header and builds the per-request span used by TraceLayer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::extract::Request;
use tracing::{info_span, Span};

/// Header carrying the request id, set when absent and echoed on the response
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create the tracing span for an HTTP request
pub fn make_request_span(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}
