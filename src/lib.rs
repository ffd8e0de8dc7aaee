// ABOUTME: Main library entry point for the Setlog workout tracker backend
// ABOUTME: Exposes the REST API, persistence managers and server assembly to the binaries and tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # Setlog Server
//!
//! A single-user-per-account workout tracker: exercise and circuit
//! libraries, reusable templates, a calendar schedule, a live session
//! runner with pre-filled sets, supplements, body weight and analytics.
//!
//! ## Architecture
//!
//! - **`setlog-core`**: domain models, constants and the `AppError` type
//! - **`setlog-training`**: pure training computations (numbering, circuit
//!   expansion, pre-fill, records, volume, trends, adherence)
//! - **database**: one `SQLite` manager per domain
//! - **routes**: axum handlers, one route group per resource
//! - **server**: router assembly and the tower-http middleware stack
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use setlog_server::config::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Setlog configured with port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// JWT issuing, request authentication and password hashing
pub mod auth;

/// Environment-driven configuration
pub mod config;

/// Application constants
pub mod constants;

/// `SQLite` persistence managers
pub mod database;

/// Unified error handling
pub mod errors;

/// Structured logging setup
pub mod logging;

/// CORS and request tracing layers
pub mod middleware;

/// Shared server resources
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Session cookie helpers
pub mod security;

/// Router assembly and serving
pub mod server;

/// Request extraction and id parsing helpers
pub mod utils;
