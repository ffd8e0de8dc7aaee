// ABOUTME: Utility modules shared by the route handlers
// ABOUTME: Request extractors with uniform 400 rejections and identifier parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// JSON body and query string extractors
pub mod extract;
/// UUID parsing for path parameters
pub mod uuid;
