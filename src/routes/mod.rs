// ABOUTME: HTTP route modules and router assembly for the REST API
// ABOUTME: Defines the response envelope and the bearer-token authentication helper

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

//! # HTTP Routes
//!
//! Thin axum handlers over the database and service layers. Every response
//! uses the `{ data, message }` envelope; paginated lists add `meta`.
//! Handlers authenticate from the `Authorization` header themselves, so an
//! unauthenticated request fails before any database access.

use crate::auth::AuthResult;
use crate::context::ServerResources;
use crate::errors::AppResult;
use crate::pagination::PageMeta;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Router;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod cycles;
pub mod exercises;
pub mod goals;
pub mod health;
pub mod metrics;
pub mod notifications;
pub mod programs;
pub mod shares;
pub mod workouts;

/// Per-request handler timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Standard success envelope for all endpoints
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl<T> ApiResponse<T> {
    /// Wrap data with no message
    pub const fn new(data: T) -> Self {
        Self {
            data,
            message: None,
            meta: None,
        }
    }

    /// Wrap data with a human-readable message
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: Some(message.into()),
            meta: None,
        }
    }

    /// Attach pagination metadata
    #[must_use]
    pub fn with_meta(mut self, meta: PageMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Resolve the authenticated caller from the request headers
///
/// # Errors
///
/// Returns an authentication error for missing, malformed, or invalid
/// bearer tokens.
pub fn authenticate(resources: &ServerResources, headers: &HeaderMap) -> AppResult<AuthResult> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    resources.auth_manager.authenticate_header(header)
}

/// Assemble the full application router with middleware
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(health::HealthRoutes::routes())
        .merge(auth::AuthRoutes::routes(resources.clone()))
        .merge(exercises::ExerciseRoutes::routes(resources.clone()))
        .merge(workouts::WorkoutRoutes::routes(resources.clone()))
        .merge(metrics::MetricRoutes::routes(resources.clone()))
        .merge(cycles::CycleRoutes::routes(resources.clone()))
        .merge(goals::GoalRoutes::routes(resources.clone()))
        .merge(programs::ProgramRoutes::routes(resources.clone()))
        .merge(shares::ShareRoutes::routes(resources.clone()))
        .merge(notifications::NotificationRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
}
