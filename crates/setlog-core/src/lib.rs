// ABOUTME: Core types shared across the Setlog workspace
// ABOUTME: Error system, constants, time helpers and domain models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Setlog Core
//!
//! Foundation crate for the workout tracker. It has no I/O of its own; the
//! optional `http-response` and `database-errors` features add conversions
//! into axum responses and from `sqlx` errors for the server crate.

/// Application constants
pub mod constants;
/// Unified error handling
pub mod errors;
/// Domain models and request bodies
pub mod models;
/// Timestamp and date helpers
pub mod time;

pub use errors::{AppError, AppResult, ErrorCode};
