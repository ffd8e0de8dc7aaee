// ABOUTME: Side-effect-free training computations shared by the server and any client
// ABOUTME: Pre-fill policy, volume, personal records, adherence, circuit blocks, trends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Setlog Training
//!
//! Every function in this crate is a pure function of its inputs. The
//! server loads rows, calls into these modules and serializes the result;
//! nothing is cached between requests.

/// Supplement adherence and day streaks
pub mod adherence;
/// Circuit block planning, reorder validation and position arithmetic
pub mod blocks;
/// Flattened performed-set history rows consumed by analytics
pub mod history;
/// Contiguous set numbering
pub mod numbering;
/// Next-set pre-fill policy
pub mod prefill;
/// Personal record detection
pub mod records;
/// Body-weight trends, session durations and exercise series
pub mod trends;
/// Volume aggregation
pub mod volume;

pub use history::SetHistoryEntry;
