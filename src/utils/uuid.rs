// ABOUTME: UUID parsing for path segments with consistent 400 errors
// ABOUTME: Keeps handlers from repeating the same parse-and-map boilerplate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::{AppError, AppResult};
use uuid::Uuid;

/// Parse a UUID path parameter
///
/// # Errors
///
/// Returns 400 naming the parameter when the value is not a UUID
pub fn parse_uuid(value: &str, name: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| AppError::invalid_input(format!("Invalid {name}: '{value}' is not a UUID")))
}

/// Parse a pair of UUID path parameters
///
/// # Errors
///
/// Returns 400 when either value is not a UUID
pub fn parse_uuid_pair(
    (first, second): (&str, &str),
    (first_name, second_name): (&str, &str),
) -> AppResult<(Uuid, Uuid)> {
    Ok((parse_uuid(first, first_name)?, parse_uuid(second, second_name)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(&id.to_string(), "id").unwrap(), id);

        let err = parse_uuid("not-a-uuid", "session id").unwrap_err();
        assert_eq!(err.http_status(), 400);
        assert!(err.message.contains("session id"));
    }
}
