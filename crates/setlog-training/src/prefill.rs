// ABOUTME: Next-set pre-fill policy: planned set, then last session, then previous set
// ABOUTME: Pure function of three optional candidates plus a helper to pick them from rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use setlog_core::models::{PerformedSet, PlannedSet, PrefillSource, PrefillSuggestion, SetValues};

/// The three candidate value sources for one set number
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrefillCandidates {
    /// Planned set with the same set number
    pub planned: Option<SetValues>,
    /// Same set number from the most recent prior ended session
    pub last_session: Option<SetValues>,
    /// Immediately preceding set of the current session
    pub previous_set: Option<SetValues>,
}

impl PrefillCandidates {
    /// Pick candidates for `set_number` from already-loaded rows
    ///
    /// `last_session_sets` are the sets of the same exercise in the most recent
    /// ended session; `current_sets` are the sets logged so far in this session.
    #[must_use]
    pub fn from_rows(
        set_number: i32,
        planned_sets: &[PlannedSet],
        last_session_sets: &[PerformedSet],
        current_sets: &[PerformedSet],
    ) -> Self {
        Self {
            planned: planned_sets
                .iter()
                .find(|s| s.set_number == set_number)
                .map(|s| s.values)
                .filter(|v| !v.is_empty()),
            last_session: last_session_sets
                .iter()
                .find(|s| s.set_number == set_number)
                .map(|s| s.values),
            previous_set: current_sets
                .iter()
                .find(|s| s.set_number == set_number - 1)
                .map(|s| s.values),
        }
    }
}

/// Suggest values for `set_number` by priority: planned, last session, previous set
#[must_use]
pub fn suggest(set_number: i32, candidates: PrefillCandidates) -> PrefillSuggestion {
    let (source, values) = if let Some(values) = candidates.planned {
        (PrefillSource::Planned, values)
    } else if let Some(values) = candidates.last_session {
        (PrefillSource::LastSession, values)
    } else if let Some(values) = candidates.previous_set {
        (PrefillSource::PreviousSet, values)
    } else {
        (PrefillSource::None, SetValues::default())
    };

    PrefillSuggestion {
        set_number,
        source,
        values,
    }
}

/// The set number a new set will receive: one past the number of logged sets
#[must_use]
pub fn next_set_number(current_sets: &[PerformedSet]) -> i32 {
    i32::try_from(current_sets.len()).map_or(i32::MAX, |n| n.saturating_add(1))
}
