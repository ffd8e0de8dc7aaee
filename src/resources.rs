// ABOUTME: Shared resource container injected into every route handler
// ABOUTME: Holds the database, auth manager, configuration and one manager per domain
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server Resources
//!
//! Built once at startup and shared behind an `Arc` as axum state.

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::{
    AnalyticsManager, BodyWeightManager, CircuitsManager, Database, ExercisesManager,
    ScheduleManager, SessionsManager, SupplementsManager, TemplatesManager, UsersManager,
};
use std::sync::Arc;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Database handle
    pub database: Arc<Database>,
    /// JWT and password hashing
    pub auth_manager: Arc<AuthManager>,
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// User accounts
    pub users: UsersManager,
    /// Exercise library
    pub exercises: ExercisesManager,
    /// Circuit library
    pub circuits: CircuitsManager,
    /// Templates and planned sets
    pub templates: TemplatesManager,
    /// Schedule items
    pub schedule: ScheduleManager,
    /// Sessions and performed sets
    pub sessions: SessionsManager,
    /// Supplements and intake logs
    pub supplements: SupplementsManager,
    /// Body-weight log
    pub body_weight: BodyWeightManager,
    /// Derived analytics
    pub analytics: AnalyticsManager,
}

impl ServerResources {
    /// Wire every manager to the database pool
    #[must_use]
    pub fn new(database: Database, auth_manager: AuthManager, config: Arc<ServerConfig>) -> Self {
        // SqlitePool is an Arc handle; each manager holds its own clone
        let pool = database.pool().clone();
        Self {
            users: UsersManager::new(pool.clone()),
            exercises: ExercisesManager::new(pool.clone()),
            circuits: CircuitsManager::new(pool.clone()),
            templates: TemplatesManager::new(pool.clone()),
            schedule: ScheduleManager::new(pool.clone()),
            sessions: SessionsManager::new(pool.clone()),
            supplements: SupplementsManager::new(pool.clone()),
            body_weight: BodyWeightManager::new(pool.clone()),
            analytics: AnalyticsManager::new(pool),
            database: Arc::new(database),
            auth_manager: Arc::new(auth_manager),
            config,
        }
    }
}
