// ABOUTME: Circuit block planning and ordered-row arithmetic for templates and sessions
// ABOUTME: Expansion into rows with per-round planned sets, contiguity checks, inserts and removals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Circuit blocks.
//!
//! A block is a contiguous run of rows owned by one block id. Every function
//! here takes and returns plain ordered id lists so the persistence layer
//! only has to write back positions.

use crate::numbering::ensure_permutation;
use setlog_core::errors::{AppError, AppResult};
use setlog_core::models::{Circuit, SetValues};
use std::cmp::Ordering;
use std::collections::HashSet;
use uuid::Uuid;

/// One row of an expanded circuit block
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedBlockRow {
    /// Exercise of the row
    pub exercise_id: Uuid,
    /// Rest after the exercise; the last row rests between rounds
    pub rest_after_seconds: i32,
    /// One planned set per round
    pub sets: Vec<SetValues>,
}

/// Expand `circuit` into block rows with `rounds` planned sets each
///
/// # Errors
///
/// Returns a validation error when the circuit has no exercises or `rounds` is not positive
pub fn plan_circuit_block(circuit: &Circuit, rounds: i32) -> AppResult<Vec<PlannedBlockRow>> {
    if circuit.exercises.is_empty() {
        return Err(AppError::invalid_input(format!(
            "Circuit {} has no exercises",
            circuit.name
        )));
    }
    if rounds < 1 {
        return Err(AppError::invalid_input("rounds must be at least 1"));
    }

    let last_index = circuit.exercises.len() - 1;
    let rows = circuit
        .exercises
        .iter()
        .enumerate()
        .map(|(index, member)| {
            let rest = if index == last_index {
                circuit.rest_between_rounds_seconds
            } else {
                member
                    .rest_after_seconds
                    .unwrap_or(circuit.rest_between_exercises_seconds)
            };
            let values = SetValues {
                reps: member.default_reps,
                weight: member.default_weight,
                time_seconds: member.default_time_seconds,
                distance: None,
                rest_seconds: Some(rest),
            };
            PlannedBlockRow {
                exercise_id: member.exercise_id,
                rest_after_seconds: rest,
                sets: (0..rounds).map(|_| values).collect(),
            }
        })
        .collect();
    Ok(rows)
}

/// Planned-set changes needed to bring a row from `current` sets to `rounds` sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundsChange {
    /// Already the right size
    Unchanged,
    /// Append sets with these numbers
    Grow(Vec<i32>),
    /// Delete every set numbered above this
    Shrink(i32),
}

/// Compute the change from `current` planned sets to `rounds`
#[must_use]
pub fn rounds_change(current: i32, rounds: i32) -> RoundsChange {
    match current.cmp(&rounds) {
        Ordering::Equal => RoundsChange::Unchanged,
        Ordering::Less => RoundsChange::Grow((current + 1..=rounds).collect()),
        Ordering::Greater => RoundsChange::Shrink(rounds),
    }
}

/// Clamp a requested 1-based insert position to `1..=len + 1`; absent means append
#[must_use]
pub fn insert_index(requested: Option<i32>, len: usize) -> usize {
    requested.map_or(len, |position| {
        usize::try_from(position.saturating_sub(1))
            .unwrap_or(0)
            .min(len)
    })
}

/// Insert `run` into `order` at a 1-based position, keeping every block contiguous
///
/// `order` and `run` hold `(row_id, block_id)` pairs in position order. Returns the
/// new id order.
///
/// # Errors
///
/// Returns a validation error when the position falls between two rows of one block
pub fn insert_run(
    order: &[(Uuid, Option<Uuid>)],
    position: Option<i32>,
    run: &[(Uuid, Option<Uuid>)],
) -> AppResult<Vec<Uuid>> {
    let index = insert_index(position, order.len());
    if index > 0 && index < order.len() {
        if let (Some(before), Some(after)) = (order[index - 1].1, order[index].1) {
            if before == after {
                return Err(AppError::invalid_input(format!(
                    "Position {} falls inside circuit block {before}",
                    index + 1
                )));
            }
        }
    }

    let mut result = Vec::with_capacity(order.len() + run.len());
    result.extend_from_slice(&order[..index]);
    result.extend_from_slice(run);
    result.extend_from_slice(&order[index..]);
    ensure_blocks_contiguous(&result)?;
    Ok(result.into_iter().map(|(id, _)| id).collect())
}

/// Remove `removed` from `order`, preserving the relative order of the rest
#[must_use]
pub fn remove_ids(order: &[Uuid], removed: &[Uuid]) -> Vec<Uuid> {
    let removed: HashSet<&Uuid> = removed.iter().collect();
    order
        .iter()
        .filter(|id| !removed.contains(id))
        .copied()
        .collect()
}

/// Check that every block's rows form one contiguous run in `order`
///
/// `order` holds `(row_id, block_id)` in position order.
///
/// # Errors
///
/// Returns a validation error naming the first split block
pub fn ensure_blocks_contiguous(order: &[(Uuid, Option<Uuid>)]) -> AppResult<()> {
    let mut finished: HashSet<Uuid> = HashSet::new();
    let mut current: Option<Uuid> = None;
    for (_, block) in order {
        if *block != current {
            if let Some(left) = current {
                finished.insert(left);
            }
            if let Some(entered) = block {
                if finished.contains(entered) {
                    return Err(AppError::invalid_input(format!(
                        "Order would split circuit block {entered}"
                    )));
                }
            }
            current = *block;
        }
    }
    Ok(())
}

/// Validate a requested reorder of rows that may belong to blocks
///
/// `rows` holds `(row_id, block_id)` in current position order; `requested` is the new
/// id order. Returns the requested order paired with block ids.
///
/// # Errors
///
/// Returns a validation error when `requested` is not a permutation of the rows or
/// would split a block
pub fn validate_reorder(
    rows: &[(Uuid, Option<Uuid>)],
    requested: &[Uuid],
) -> AppResult<Vec<(Uuid, Option<Uuid>)>> {
    let existing: Vec<Uuid> = rows.iter().map(|(id, _)| *id).collect();
    ensure_permutation(&existing, requested)?;

    let reordered: Vec<(Uuid, Option<Uuid>)> = requested
        .iter()
        .filter_map(|id| rows.iter().find(|(row_id, _)| row_id == id).copied())
        .collect();
    ensure_blocks_contiguous(&reordered)?;
    Ok(reordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use setlog_core::models::CircuitExercise;

    fn circuit(members: usize) -> Circuit {
        let id = Uuid::new_v4();
        Circuit {
            id,
            user_id: None,
            name: "Tabata".into(),
            description: None,
            rounds: 3,
            rest_between_exercises_seconds: 15,
            rest_between_rounds_seconds: 90,
            is_system: true,
            is_hidden: false,
            exercises: (0..members)
                .map(|i| CircuitExercise {
                    id: Uuid::new_v4(),
                    circuit_id: id,
                    exercise_id: Uuid::new_v4(),
                    exercise_name: format!("Move {i}"),
                    position: i32::try_from(i + 1).unwrap(),
                    default_reps: Some(12),
                    default_weight: None,
                    default_time_seconds: None,
                    rest_after_seconds: if i == 0 { Some(30) } else { None },
                })
                .collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_plan_seeds_rounds_and_rest() {
        let rows = plan_circuit_block(&circuit(3), 4).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.sets.len() == 4));
        assert_eq!(rows[0].rest_after_seconds, 30);
        assert_eq!(rows[1].rest_after_seconds, 15);
        assert_eq!(rows[2].rest_after_seconds, 90);
        assert_eq!(rows[2].sets[0].rest_seconds, Some(90));
        assert_eq!(rows[0].sets[3].reps, Some(12));

        assert!(plan_circuit_block(&circuit(0), 3).is_err());
        assert!(plan_circuit_block(&circuit(2), 0).is_err());
    }

    #[test]
    fn test_rounds_change() {
        assert_eq!(rounds_change(3, 3), RoundsChange::Unchanged);
        assert_eq!(rounds_change(2, 4), RoundsChange::Grow(vec![3, 4]));
        assert_eq!(rounds_change(5, 2), RoundsChange::Shrink(2));
    }

    fn standalone(count: usize) -> Vec<(Uuid, Option<Uuid>)> {
        (0..count).map(|_| (Uuid::new_v4(), None)).collect()
    }

    fn row_ids(rows: &[(Uuid, Option<Uuid>)]) -> Vec<Uuid> {
        rows.iter().map(|(id, _)| *id).collect()
    }

    #[test]
    fn test_insert_then_remove_preserves_relative_order() {
        let original = standalone(4);
        let block_id = Some(Uuid::new_v4());
        let block: Vec<(Uuid, Option<Uuid>)> =
            (0..3).map(|_| (Uuid::new_v4(), block_id)).collect();
        let block_ids = row_ids(&block);

        for position in [None, Some(1), Some(3), Some(99), Some(-4)] {
            let with_block = insert_run(&original, position, &block).unwrap();
            assert_eq!(with_block.len(), 7);
            let start = with_block.iter().position(|id| *id == block_ids[0]).unwrap();
            assert_eq!(&with_block[start..start + 3], block_ids.as_slice());

            assert_eq!(remove_ids(&with_block, &block_ids), row_ids(&original));
        }

        assert_eq!(insert_run(&original, Some(2), &block).unwrap()[1], block_ids[0]);
        assert_eq!(insert_run(&original, None, &block).unwrap()[4], block_ids[0]);
    }

    #[test]
    fn test_insert_inside_a_block_is_rejected() {
        // [a, b1, b2, c] with the block at positions 2..=3
        let block_id = Some(Uuid::new_v4());
        let (a, c) = (Uuid::new_v4(), Uuid::new_v4());
        let (b1, b2) = (Uuid::new_v4(), Uuid::new_v4());
        let order = vec![(a, None), (b1, block_id), (b2, block_id), (c, None)];

        let single = [(Uuid::new_v4(), None)];
        assert!(insert_run(&order, Some(3), &single).is_err());

        let other_block = Some(Uuid::new_v4());
        let nested = [(Uuid::new_v4(), other_block), (Uuid::new_v4(), other_block)];
        assert!(insert_run(&order, Some(3), &nested).is_err());

        // Block boundaries are fine
        for position in [Some(1), Some(2), Some(4), Some(5), None] {
            let result = insert_run(&order, position, &single).unwrap();
            let b1_at = result.iter().position(|id| *id == b1).unwrap();
            assert_eq!(result[b1_at + 1], b2);
        }
    }

    #[test]
    fn test_reorder_that_splits_a_block_is_rejected() {
        let block = Some(Uuid::new_v4());
        let (a, b1, b2, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![(a, None), (b1, block), (b2, block), (c, None)];

        assert!(validate_reorder(&rows, &[b1, b2, a, c]).is_ok());
        assert!(validate_reorder(&rows, &[c, a, b1, b2]).is_ok());
        assert!(validate_reorder(&rows, &[b1, a, b2, c]).is_err());
        assert!(validate_reorder(&rows, &[a, b1, b2]).is_err());
    }

    #[test]
    fn test_adjacent_distinct_blocks_are_contiguous() {
        let (x, y) = (Some(Uuid::new_v4()), Some(Uuid::new_v4()));
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let order = vec![(ids[0], x), (ids[1], x), (ids[2], y), (ids[3], y)];
        assert!(ensure_blocks_contiguous(&order).is_ok());

        let split = vec![(ids[0], x), (ids[2], y), (ids[1], x), (ids[3], y)];
        assert!(ensure_blocks_contiguous(&split).is_err());
    }
}
