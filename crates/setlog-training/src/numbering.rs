// ABOUTME: Contiguous 1..n numbering for performed sets, planned sets and row positions
// ABOUTME: Produces only the (id, number) pairs that actually change
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use setlog_core::errors::{AppError, AppResult};
use std::collections::HashSet;
use uuid::Uuid;

/// Number `ids` 1..=n in the given order
#[must_use]
pub fn sequential(ids: &[Uuid]) -> Vec<(Uuid, i32)> {
    ids.iter().zip(1..).map(|(id, n)| (*id, n)).collect()
}

/// Renumber `rows` (id, current number) to 1..=n keeping their current order,
/// returning only the rows whose number changes
#[must_use]
pub fn compact(rows: &[(Uuid, i32)]) -> Vec<(Uuid, i32)> {
    let mut ordered = rows.to_vec();
    ordered.sort_by_key(|(_, number)| *number);
    ordered
        .iter()
        .zip(1..)
        .filter(|((_, current), expected)| current != expected)
        .map(|((id, _), expected)| (*id, expected))
        .collect()
}

/// Check that `requested` contains every id of `existing` exactly once
///
/// # Errors
///
/// Returns a validation error naming the problem otherwise
pub fn ensure_permutation(existing: &[Uuid], requested: &[Uuid]) -> AppResult<()> {
    if existing.len() != requested.len() {
        return Err(AppError::invalid_input(format!(
            "Reorder must list all {} items, got {}",
            existing.len(),
            requested.len()
        )));
    }
    let mut seen = HashSet::with_capacity(requested.len());
    if let Some(duplicate) = requested.iter().find(|id| !seen.insert(**id)) {
        return Err(AppError::invalid_input(format!(
            "Reorder lists {duplicate} more than once"
        )));
    }
    let known: HashSet<&Uuid> = existing.iter().collect();
    if let Some(unknown) = requested.iter().find(|id| !known.contains(id)) {
        return Err(AppError::invalid_input(format!(
            "Reorder lists unknown item {unknown}"
        )));
    }
    Ok(())
}
