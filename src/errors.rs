// ABOUTME: Unified error handling for the server crate
// ABOUTME: Re-exports the core error system so routes and managers share one error type
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! `AppError` lives in `setlog-core` together with its `IntoResponse` and
//! `From<sqlx::Error>` conversions; this module re-exports it under the
//! server crate's path.

pub use setlog_core::errors::{AppError, AppResult, ErrorCode, ErrorResponse};
