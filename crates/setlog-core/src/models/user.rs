// ABOUTME: User account model and authentication request bodies
// ABOUTME: Password hashes never serialize
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::validation::validate_name;
use crate::constants::limits::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Lowercased email address
    pub email: String,
    /// Display name
    pub display_name: String,
    /// bcrypt hash
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

/// Request to register an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Email address
    pub email: String,
    /// Plain-text password
    pub password: String,
    /// Display name
    pub display_name: String,
}

impl RegisterRequest {
    /// Lowercased, trimmed email
    #[must_use]
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }

    /// Validate the request
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed email, short password or blank name
    pub fn validate(&self) -> AppResult<()> {
        let email = self.normalized_email();
        let valid_email = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid_email {
            return Err(AppError::invalid_input("email is not a valid address"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::invalid_input(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        validate_name("display_name", &self.display_name)
    }
}

/// Request to log in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// Lowercase and trim an email for storage and lookup
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation() {
        let request = RegisterRequest {
            email: "  Ana@Example.com ".into(),
            password: "correct horse".into(),
            display_name: "Ana".into(),
        };
        assert_eq!(request.normalized_email(), "ana@example.com");
        assert!(request.validate().is_ok());

        let short = RegisterRequest {
            password: "short".into(),
            ..request.clone()
        };
        assert!(short.validate().is_err());

        let bad_email = RegisterRequest {
            email: "not-an-email".into(),
            ..request
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@b.co".into(),
            display_name: "A".into(),
            password_hash: "$2b$12$secret".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
    }
}
