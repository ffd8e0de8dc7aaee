// ABOUTME: JWT-based user authentication and password hashing
// ABOUTME: Issues HS256 session tokens, validates bearer headers and session cookies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Authentication
//!
//! Users log in with email and password; the server answers with an HS256
//! JWT carried in the `setlog_session` cookie. API clients may send the same
//! token as `Authorization: Bearer <token>`.

use crate::config::AuthConfig;
use crate::constants::auth::{JWT_AUDIENCE, SESSION_COOKIE_NAME};
use crate::errors::{AppError, AppResult};
use crate::security::cookies::get_cookie_value;
use chrono::{DateTime, Duration, Utc};
use http::header::AUTHORIZATION;
use http::HeaderMap;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use setlog_core::models::User;
use std::fmt;
use tokio::task;
use uuid::Uuid;

/// `JWT` validation error with detailed information
#[derive(Debug, Clone)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
    },
    /// Token signature or claims are invalid
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is not a well-formed `JWT`
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenExpired { expired_at } => write!(
                f,
                "JWT token expired at {}",
                expired_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            Self::TokenInvalid { reason } => write!(f, "JWT token is invalid: {reason}"),
            Self::TokenMalformed { details } => write!(f, "JWT token is malformed: {details}"),
        }
    }
}

impl std::error::Error for JwtValidationError {}

impl From<JwtValidationError> for AppError {
    fn from(error: JwtValidationError) -> Self {
        Self::auth_invalid(error.to_string())
    }
}

/// `JWT` claims for user authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// User email
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Audience (who the token is intended for)
    pub aud: String,
}

/// How a request proved its identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// `Authorization: Bearer` header
    BearerToken,
    /// `setlog_session` cookie
    SessionCookie,
}

/// Authenticated request context
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// Authenticated user `ID`
    pub user_id: Uuid,
    /// Email from the token
    pub email: String,
    /// Authentication method used
    pub auth_method: AuthMethod,
}

/// Authentication manager for `JWT` tokens and password hashes
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    bcrypt_cost: u32,
}

impl AuthManager {
    /// Create a new authentication manager from a signing secret
    #[must_use]
    pub fn new(secret: &[u8], token_expiry_hours: i64, bcrypt_cost: u32) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_hours,
            bcrypt_cost,
        }
    }

    /// Create from configuration, generating a per-process secret when none is configured
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        config.jwt_secret.as_ref().map_or_else(
            || {
                let secret = generate_jwt_secret();
                Self::new(&secret, config.jwt_expiry_hours, config.bcrypt_cost)
            },
            |secret| Self::new(secret.as_bytes(), config.jwt_expiry_hours, config.bcrypt_cost),
        )
    }

    /// Token lifetime in hours
    #[must_use]
    pub const fn token_expiry_hours(&self) -> i64 {
        self.token_expiry_hours
    }

    /// Token lifetime in seconds, used for the cookie `Max-Age`
    #[must_use]
    pub const fn token_expiry_seconds(&self) -> i64 {
        self.token_expiry_hours * 3600
    }

    /// Generate an HS256 `JWT` for a user
    ///
    /// # Errors
    ///
    /// Returns an internal error if encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.token_expiry_hours)).timestamp(),
            aud: JWT_AUDIENCE.to_owned(),
        };
        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign session token: {e}")))
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    ///
    /// Returns a `JwtValidationError` describing why the token was rejected
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_audience(&[JWT_AUDIENCE]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtValidationError::TokenExpired {
                    expired_at: Self::expiry_of(token).unwrap_or_else(Utc::now),
                },
                ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) => {
                    JwtValidationError::TokenMalformed {
                        details: e.to_string(),
                    }
                }
                _ => JwtValidationError::TokenInvalid {
                    reason: e.to_string(),
                },
            })
    }

    /// Read the `exp` claim without verifying the signature, for error messages only
    fn expiry_of(token: &str) -> Option<DateTime<Utc>> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .ok()
            .and_then(|data| DateTime::from_timestamp(data.claims.exp, 0))
    }

    /// Authenticate a request from its bearer header or session cookie
    ///
    /// # Errors
    ///
    /// Returns 401 when no credentials are present or the token is rejected
    pub fn authenticate(&self, headers: &HeaderMap) -> AppResult<AuthResult> {
        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| (token.trim().to_owned(), AuthMethod::BearerToken));

        let (token, auth_method) = bearer
            .or_else(|| {
                get_cookie_value(headers, SESSION_COOKIE_NAME)
                    .map(|token| (token, AuthMethod::SessionCookie))
            })
            .ok_or_else(AppError::auth_required)?;

        let claims = self.validate_token(&token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth_invalid("Session token has an invalid subject"))?;

        Ok(AuthResult {
            user_id,
            email: claims.email,
            auth_method,
        })
    }

    /// Hash a password with bcrypt on a blocking thread
    ///
    /// # Errors
    ///
    /// Returns an internal error if hashing fails or the worker panics
    pub async fn hash_password(&self, password: String) -> AppResult<String> {
        let cost = self.bcrypt_cost;
        task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
    }

    /// Verify a password against a bcrypt hash on a blocking thread
    ///
    /// # Errors
    ///
    /// Returns an internal error if the hash is unreadable or the worker panics
    pub async fn verify_password(&self, password: String, hash: String) -> AppResult<bool> {
        task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))
    }
}

/// Generate a random `JWT` secret
#[must_use]
pub fn generate_jwt_secret() -> [u8; 64] {
    let mut secret = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::COOKIE;
    use http::HeaderValue;

    fn manager() -> AuthManager {
        AuthManager::new(b"unit-test-secret", 24, crate::config::environment::MIN_COST)
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "lifter@example.com".into(),
            display_name: "Lifter".into(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let auth = manager();
        let user = user();
        let token = auth.generate_token(&user).unwrap();
        let claims = auth.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.aud, JWT_AUDIENCE);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let token = manager().generate_token(&user()).unwrap();
        let other = AuthManager::new(b"a-different-secret", 24, crate::config::environment::MIN_COST);
        assert!(matches!(
            other.validate_token(&token),
            Err(JwtValidationError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_expired_token() {
        let auth = manager();
        let past = Utc::now() - Duration::hours(2);
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "old@example.com".into(),
            iat: (past - Duration::hours(1)).timestamp(),
            exp: past.timestamp(),
            aud: JWT_AUDIENCE.to_owned(),
        };
        let token = auth.encode_claims(&claims).unwrap();
        assert!(matches!(
            auth.validate_token(&token),
            Err(JwtValidationError::TokenExpired { .. })
        ));
    }

    #[test]
    fn test_malformed_token() {
        assert!(matches!(
            manager().validate_token("not-a-jwt"),
            Err(JwtValidationError::TokenMalformed { .. })
        ));
    }

    #[test]
    fn test_authenticate_prefers_bearer_then_cookie() {
        let auth = manager();
        let user = user();
        let token = auth.generate_token(&user).unwrap();

        let mut headers = HeaderMap::new();
        assert!(auth.authenticate(&headers).is_err());

        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE_NAME}={token}")).unwrap(),
        );
        let from_cookie = auth.authenticate(&headers).unwrap();
        assert_eq!(from_cookie.user_id, user.id);
        assert_eq!(from_cookie.auth_method, AuthMethod::SessionCookie);

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        assert_eq!(
            auth.authenticate(&headers).unwrap().auth_method,
            AuthMethod::BearerToken
        );
    }

    #[tokio::test]
    async fn test_password_hash_and_verify() {
        let auth = manager();
        let hash = auth.hash_password("correct horse".into()).await.unwrap();
        assert!(auth
            .verify_password("correct horse".into(), hash.clone())
            .await
            .unwrap());
        assert!(!auth.verify_password("wrong".into(), hash).await.unwrap());
    }
}
