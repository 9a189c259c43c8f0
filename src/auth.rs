// ABOUTME: Authentication and session management with JWT bearer tokens
// ABOUTME: Handles token generation, validation, and password hashing

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

//! JWT-based authentication for the REST API

use crate::errors::{AppError, AppResult};
use crate::models::User;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bcrypt cost factor for password hashing
const BCRYPT_COST: u32 = 12;

/// JWT claims for API sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// User email
    pub email: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// The authenticated caller of a request
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub user_id: Uuid,
    pub email: String,
}

/// Authentication manager holding the signing secret
#[derive(Clone)]
pub struct AuthManager {
    secret: Vec<u8>,
    expiry_hours: i64,
}

impl AuthManager {
    /// Create a new manager with the given signing secret and token lifetime
    #[must_use]
    pub fn new(secret: Vec<u8>, expiry_hours: i64) -> Self {
        Self {
            secret,
            expiry_hours,
        }
    }

    /// Generate a bearer token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if token signing fails.
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.expiry_hours)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }

    /// Validate a bearer token and return its claims
    ///
    /// # Errors
    ///
    /// Returns an error if the token is malformed, mis-signed, or expired.
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| AppError::auth_invalid(format!("Invalid token: {e}")))
    }

    /// Authenticate an `Authorization: Bearer <token>` header value
    ///
    /// # Errors
    ///
    /// Returns an error if the header is missing, malformed, or carries an
    /// invalid token.
    pub fn authenticate_header(&self, auth_header: Option<&str>) -> AppResult<AuthResult> {
        let header = auth_header.ok_or_else(AppError::auth_required)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::auth_invalid("Expected Bearer token"))?;

        let claims = self.validate_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|e| AppError::auth_invalid(format!("Invalid subject claim: {e}")))?;

        Ok(AuthResult {
            user_id,
            email: claims.email,
        })
    }
}

/// Hash a password with bcrypt
///
/// # Errors
///
/// Returns an error if hashing fails.
pub fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against its bcrypt hash
///
/// # Errors
///
/// Returns an error if verification cannot run.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    bcrypt::verify(password, hash)
        .map_err(|e| AppError::internal(format!("Failed to verify password: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_manager() -> AuthManager {
        AuthManager::new(b"test-secret-at-least-32-bytes-long".to_vec(), 24)
    }

    fn test_user() -> User {
        User::new(
            "test@example.com".into(),
            "hashed".into(),
            Some("Test User".into()),
        )
    }

    #[test]
    fn test_generate_and_validate_token() {
        let manager = test_manager();
        let user = test_user();

        let token = manager.generate_token(&user).unwrap();
        assert!(!token.is_empty());

        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.sub, user.id.to_string());
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_authenticate_header() {
        let manager = test_manager();
        let user = test_user();
        let token = manager.generate_token(&user).unwrap();

        let auth = manager
            .authenticate_header(Some(&format!("Bearer {token}")))
            .unwrap();
        assert_eq!(auth.user_id, user.id);

        assert!(manager.authenticate_header(None).is_err());
        assert!(manager.authenticate_header(Some(&token)).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let manager = test_manager();
        let other = AuthManager::new(b"another-secret-also-32-bytes-long!".to_vec(), 24);
        let token = manager.generate_token(&test_user()).unwrap();
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }
}
