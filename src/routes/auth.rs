// ABOUTME: Account route handlers for registration, login, logout and the current user
// ABOUTME: Issues the HttpOnly session cookie carrying the signed JWT
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Authentication routes
//!
//! Successful registration and login set the `setlog_session` cookie and
//! also return the token in the body for clients that prefer the
//! `Authorization: Bearer` header.

use super::authenticate;
use crate::constants::auth::SESSION_COOKIE_NAME;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::resources::ServerResources;
use crate::security::cookies::{append_set_cookie, build_cookie, expired_cookie};
use crate::utils::extract::JsonBody;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use setlog_core::models::{LoginRequest, RegisterRequest, User};
use setlog_core::models::user::normalize_email;
use std::sync::Arc;

/// Body returned by register and login
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// The authenticated user
    pub user: User,
    /// Signed session token, identical to the cookie value
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// Authentication routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .route("/api/auth/logout", post(Self::handle_logout))
            .route("/api/auth/me", get(Self::handle_me))
            .with_state(resources)
    }

    /// Token, cookie and body for a freshly authenticated user
    fn session_response(
        resources: &ServerResources,
        user: User,
        status: StatusCode,
    ) -> AppResult<Response> {
        let token = resources.auth_manager.generate_token(&user)?;
        let expires_in = resources.auth_manager.token_expiry_seconds();
        let cookie = build_cookie(
            SESSION_COOKIE_NAME,
            &token,
            expires_in,
            resources.config.auth.cookie_secure,
        );

        let mut headers = HeaderMap::new();
        append_set_cookie(&mut headers, &cookie)?;
        let body = SessionResponse {
            user,
            token,
            expires_in,
        };
        Ok((status, headers, Json(body)).into_response())
    }

    /// Handle POST /api/auth/register
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        JsonBody(request): JsonBody<RegisterRequest>,
    ) -> AppResult<Response> {
        request.validate()?;
        let email = request.normalized_email();
        if resources.users.get_by_email(&email).await?.is_some() {
            AppLogger::log_auth_event(None, "register", false);
            return Err(AppError::already_exists(
                "An account with this email already exists",
            ));
        }

        let hash = resources
            .auth_manager
            .hash_password(request.password.clone())
            .await?;
        let user = resources
            .users
            .create(&email, &request.display_name, &hash)
            .await?;

        AppLogger::log_auth_event(Some(user.id), "register", true);
        Self::session_response(&resources, user, StatusCode::CREATED)
    }

    /// Handle POST /api/auth/login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        JsonBody(request): JsonBody<LoginRequest>,
    ) -> AppResult<Response> {
        let invalid = || AppError::auth_invalid("Invalid email or password");
        let Some(user) = resources
            .users
            .get_by_email(&normalize_email(&request.email))
            .await?
        else {
            AppLogger::log_auth_event(None, "login", false);
            return Err(invalid());
        };

        let verified = resources
            .auth_manager
            .verify_password(request.password, user.password_hash.clone())
            .await?;
        if !verified {
            AppLogger::log_auth_event(Some(user.id), "login", false);
            return Err(invalid());
        }

        AppLogger::log_auth_event(Some(user.id), "login", true);
        Self::session_response(&resources, user, StatusCode::OK)
    }

    /// Handle POST /api/auth/logout
    async fn handle_logout(State(resources): State<Arc<ServerResources>>) -> AppResult<Response> {
        let mut headers = HeaderMap::new();
        append_set_cookie(
            &mut headers,
            &expired_cookie(SESSION_COOKIE_NAME, resources.config.auth.cookie_secure),
        )?;
        Ok((StatusCode::NO_CONTENT, headers).into_response())
    }

    /// Handle GET /api/auth/me
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = authenticate(&headers, &resources)?;
        let user = resources
            .users
            .get(auth.user_id)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Account no longer exists"))?;
        Ok((StatusCode::OK, Json(user)).into_response())
    }
}
