// ABOUTME: HTTP middleware for CORS and request tracing
// ABOUTME: Builds the tower-http layers applied around every route
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// CORS configuration
pub mod cors;
/// Request id and tracing spans
pub mod tracing;

pub use cors::setup_cors;
pub use tracing::{make_request_span, REQUEST_ID_HEADER};
