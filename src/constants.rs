// ABOUTME: System-wide constants for the Setlog server
// ABOUTME: Re-exports the core constant groups used by config, auth and routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Constants are defined in `setlog-core` so the training crate can share them.

pub use setlog_core::constants::{
    analytics, auth, defaults, env_vars, limits, ports, service_names,
};
