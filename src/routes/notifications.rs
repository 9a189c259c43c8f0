// ABOUTME: Notification preference and device token endpoints
// ABOUTME: Validates milestone and reminder-day lists before saving

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

use super::{authenticate, ApiResponse};
use crate::context::ServerResources;
use crate::errors::{AppError, AppResult};
use crate::models::{DeviceToken, NotificationPreferences};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct PreferencesRequest {
    pub achieved_enabled: Option<bool>,
    pub progress_enabled: Option<bool>,
    pub deadline_reminder_enabled: Option<bool>,
    pub failed_enabled: Option<bool>,
    pub milestones: Option<Vec<i64>>,
    pub deadline_reminder_days: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize)]
pub struct DeviceTokenRequest {
    pub token: String,
    pub platform: Option<String>,
}

/// Notification preference and device routes
pub struct NotificationRoutes;

impl NotificationRoutes {
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/notifications/preferences",
                get(Self::get_preferences).put(Self::save_preferences),
            )
            .route(
                "/notifications/devices",
                get(Self::list_devices).post(Self::register_device),
            )
            .route(
                "/notifications/devices/:id",
                axum::routing::delete(Self::delete_device),
            )
            .with_state(resources)
    }

    async fn get_preferences(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Json<ApiResponse<NotificationPreferences>>> {
        let auth = authenticate(&resources, &headers)?;
        let preferences = resources
            .database
            .get_or_create_notification_preferences(auth.user_id)
            .await?;
        Ok(Json(ApiResponse::new(preferences)))
    }

    async fn save_preferences(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<PreferencesRequest>,
    ) -> AppResult<Json<ApiResponse<NotificationPreferences>>> {
        let auth = authenticate(&resources, &headers)?;
        let mut preferences = resources
            .database
            .get_or_create_notification_preferences(auth.user_id)
            .await?;

        if let Some(enabled) = request.achieved_enabled {
            preferences.achieved_enabled = enabled;
        }
        if let Some(enabled) = request.progress_enabled {
            preferences.progress_enabled = enabled;
        }
        if let Some(enabled) = request.deadline_reminder_enabled {
            preferences.deadline_reminder_enabled = enabled;
        }
        if let Some(enabled) = request.failed_enabled {
            preferences.failed_enabled = enabled;
        }
        if let Some(mut milestones) = request.milestones {
            if milestones.iter().any(|&m| !(1..=100).contains(&m)) {
                return Err(AppError::invalid_input(
                    "Milestones must be percentages between 1 and 100",
                ));
            }
            milestones.sort_unstable();
            milestones.dedup();
            preferences.milestones = milestones;
        }
        if let Some(mut days) = request.deadline_reminder_days {
            if days.iter().any(|&d| d < 0) {
                return Err(AppError::invalid_input(
                    "Reminder day offsets must be non-negative",
                ));
            }
            days.sort_unstable_by(|a, b| b.cmp(a));
            days.dedup();
            preferences.deadline_reminder_days = days;
        }

        resources
            .database
            .save_notification_preferences(&preferences)
            .await?;

        Ok(Json(ApiResponse::with_message(
            preferences,
            "Preferences saved",
        )))
    }

    async fn list_devices(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Json<ApiResponse<Vec<DeviceToken>>>> {
        let auth = authenticate(&resources, &headers)?;
        let devices = resources.database.list_device_tokens(auth.user_id).await?;
        Ok(Json(ApiResponse::new(devices)))
    }

    async fn register_device(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<DeviceTokenRequest>,
    ) -> AppResult<Json<ApiResponse<DeviceToken>>> {
        let auth = authenticate(&resources, &headers)?;
        if request.token.trim().is_empty() {
            return Err(AppError::invalid_input("Device token is required"));
        }

        let device = DeviceToken {
            id: Uuid::new_v4(),
            user_id: auth.user_id,
            token: request.token.trim().to_string(),
            platform: request.platform,
            created_at: Utc::now(),
        };
        resources.database.create_device_token(&device).await?;

        Ok(Json(ApiResponse::with_message(device, "Device registered")))
    }

    async fn delete_device(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(device_id): Path<Uuid>,
    ) -> AppResult<Json<ApiResponse<()>>> {
        let auth = authenticate(&resources, &headers)?;
        if !resources
            .database
            .delete_device_token(auth.user_id, device_id)
            .await?
        {
            return Err(AppError::not_found("Device"));
        }
        Ok(Json(ApiResponse::with_message((), "Device removed")))
    }
}
