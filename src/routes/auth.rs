// ABOUTME: Registration and login endpoints issuing JWT bearer tokens
// ABOUTME: Validates credentials against bcrypt hashes stored per user

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

use super::ApiResponse;
use crate::auth::{hash_password, verify_password};
use crate::context::ServerResources;
use crate::errors::{AppError, AppResult};
use crate::models::User;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Minimum accepted password length
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
}

/// Registration and login routes
pub struct AuthRoutes;

impl AuthRoutes {
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/auth/register", post(Self::register))
            .route("/auth/login", post(Self::login))
            .with_state(resources)
    }

    async fn register(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RegisterRequest>,
    ) -> AppResult<Json<ApiResponse<SessionResponse>>> {
        let email = request.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::invalid_input("A valid email address is required"));
        }
        if request.password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if resources.database.get_user_by_email(&email).await?.is_some() {
            return Err(AppError::already_exists("Email already in use"));
        }

        let password_hash = hash_password(&request.password)?;
        let user = User::new(email, password_hash, request.display_name);
        resources.database.create_user(&user).await?;

        let token = resources.auth_manager.generate_token(&user)?;
        info!(user_id = %user.id, "User registered");

        Ok(Json(ApiResponse::with_message(
            SessionResponse {
                user_id: user.id,
                email: user.email,
                token,
            },
            "Account created",
        )))
    }

    async fn login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> AppResult<Json<ApiResponse<SessionResponse>>> {
        let email = request.email.trim().to_lowercase();

        // The same error for unknown email and wrong password
        let user = resources
            .database
            .get_user_by_email(&email)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Invalid email or password"))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::auth_invalid("Invalid email or password"));
        }

        let token = resources.auth_manager.generate_token(&user)?;

        Ok(Json(ApiResponse::new(SessionResponse {
            user_id: user.id,
            email: user.email,
            token,
        })))
    }
}
