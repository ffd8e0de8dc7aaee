// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Limits, defaults, analytics windows, and environment variable names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Application constants grouped by domain.

/// Network ports
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
}

/// Service identity used in logs
pub mod service_names {
    /// Name of the API server
    pub const SETLOG_SERVER: &str = "setlog-server";
}

/// Validation limits for request bodies
pub mod limits {
    /// Maximum length of names (exercises, circuits, templates, supplements)
    pub const MAX_NAME_LENGTH: usize = 120;
    /// Maximum length of free-text notes
    pub const MAX_NOTES_LENGTH: usize = 4000;
    /// Maximum number of rounds for a circuit
    pub const MAX_CIRCUIT_ROUNDS: i32 = 50;
    /// Maximum number of planned sets on one template exercise
    pub const MAX_PLANNED_SETS: i32 = 100;
    /// Maximum rest period in seconds
    pub const MAX_REST_SECONDS: i32 = 3600;
    /// Minimum password length at registration
    pub const MIN_PASSWORD_LENGTH: usize = 8;
    /// Maximum request body size in bytes
    pub const MAX_REQUEST_SIZE: usize = 1_048_576;
    /// Default number of sessions returned by history listing
    pub const DEFAULT_SESSION_LIST_LIMIT: u32 = 50;
    /// Upper bound for history listing
    pub const MAX_SESSION_LIST_LIMIT: u32 = 500;
    /// Default session JWT lifetime (one week)
    pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24 * 7;
}

/// Defaults applied when a request leaves a value out
pub mod defaults {
    /// Default number of rounds for a new circuit
    pub const CIRCUIT_ROUNDS: i32 = 3;
    /// Default rest between exercises inside a circuit
    pub const CIRCUIT_REST_BETWEEN_EXERCISES_SECONDS: i32 = 15;
    /// Default rest between circuit rounds
    pub const CIRCUIT_REST_BETWEEN_ROUNDS_SECONDS: i32 = 60;
    /// Default database URL
    pub const DATABASE_URL: &str = "sqlite:./data/setlog.db";
    /// Days before today included by a schedule listing without `from`
    pub const SCHEDULE_LOOKBACK_DAYS: i64 = 7;
    /// Days after today included by a schedule listing without `to`
    pub const SCHEDULE_LOOKAHEAD_DAYS: i64 = 28;
}

/// Analytics windows
pub mod analytics {
    /// A personal record achieved within this many days is flagged as new
    pub const NEW_PR_WINDOW_DAYS: i64 = 7;
    /// Supplement adherence looks back at most this many days
    pub const ADHERENCE_WINDOW_DAYS: i64 = 30;
    /// Window size of the body-weight moving average
    pub const BODY_WEIGHT_MOVING_AVERAGE_ENTRIES: usize = 7;
    /// Default lookback for range queries without explicit bounds
    pub const DEFAULT_RANGE_DAYS: i64 = 90;
}

/// Authentication
pub mod auth {
    /// Name of the session cookie carrying the JWT
    pub const SESSION_COOKIE_NAME: &str = "setlog_session";
    /// JWT audience claim
    pub const JWT_AUDIENCE: &str = "setlog-web";
}

/// Environment variable names read by the server configuration
pub mod env_vars {
    /// HTTP port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// Database connection URL
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// JWT signing secret
    pub const JWT_SECRET: &str = "JWT_SECRET";
    /// JWT lifetime in hours
    pub const JWT_EXPIRY_HOURS: &str = "JWT_EXPIRY_HOURS";
    /// Whether the session cookie carries the `Secure` attribute
    pub const COOKIE_SECURE: &str = "COOKIE_SECURE";
    /// Comma-separated list of allowed CORS origins
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";
}
