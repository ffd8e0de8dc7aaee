// ABOUTME: HTTP security helpers shared by the route handlers
// ABOUTME: Session cookie parsing and Set-Cookie construction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Security helpers

/// Session cookie helpers
pub mod cookies;
