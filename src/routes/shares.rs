// ABOUTME: Cycle share link endpoints for creating, revoking, and importing
// ABOUTME: The UUID share token is the sole authorization for import

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

use super::{authenticate, ApiResponse};
use crate::context::ServerResources;
use crate::errors::AppResult;
use crate::models::{CycleShare, TrainingCycle};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{delete, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct ShareRequest {
    pub expires_at: Option<DateTime<Utc>>,
}

/// Cycle sharing routes
pub struct ShareRoutes;

impl ShareRoutes {
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/cycles/:id/share", post(Self::share))
            .route("/shares/:token", delete(Self::revoke))
            .route("/shares/:token/import", post(Self::import))
            .with_state(resources)
    }

    async fn share(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(cycle_id): Path<Uuid>,
        Json(request): Json<ShareRequest>,
    ) -> AppResult<Json<ApiResponse<CycleShare>>> {
        let auth = authenticate(&resources, &headers)?;
        let share = resources
            .shares
            .share_cycle(auth.user_id, cycle_id, request.expires_at)
            .await?;
        Ok(Json(ApiResponse::with_message(share, "Share link created")))
    }

    async fn revoke(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(share_token): Path<Uuid>,
    ) -> AppResult<Json<ApiResponse<()>>> {
        let auth = authenticate(&resources, &headers)?;
        resources.shares.revoke(auth.user_id, share_token).await?;
        Ok(Json(ApiResponse::with_message((), "Share link revoked")))
    }

    async fn import(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(share_token): Path<Uuid>,
    ) -> AppResult<Json<ApiResponse<TrainingCycle>>> {
        let auth = authenticate(&resources, &headers)?;
        let cycle = resources.shares.import(auth.user_id, share_token).await?;
        Ok(Json(ApiResponse::with_message(cycle, "Cycle imported")))
    }
}
