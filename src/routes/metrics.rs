// ABOUTME: Body metric endpoints for weight and body-fat entries
// ABOUTME: Creating an entry triggers goal evaluation for the user

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

use super::{authenticate, ApiResponse};
use crate::context::ServerResources;
use crate::errors::{AppError, AppResult};
use crate::models::BodyMetric;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct BodyMetricRequest {
    pub weight: f64,
    pub body_fat: Option<f64>,
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Body metric routes
pub struct MetricRoutes;

impl MetricRoutes {
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/metrics", get(Self::list).post(Self::create))
            .route("/metrics/:id", axum::routing::delete(Self::delete))
            .with_state(resources)
    }

    async fn list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Json<ApiResponse<Vec<BodyMetric>>>> {
        let auth = authenticate(&resources, &headers)?;
        let metrics = resources.database.list_body_metrics(auth.user_id).await?;
        Ok(Json(ApiResponse::new(metrics)))
    }

    async fn create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<BodyMetricRequest>,
    ) -> AppResult<Json<ApiResponse<BodyMetric>>> {
        let auth = authenticate(&resources, &headers)?;
        if request.weight <= 0.0 {
            return Err(AppError::invalid_input("Weight must be positive"));
        }

        let metric = BodyMetric {
            id: Uuid::new_v4(),
            user_id: auth.user_id,
            weight: request.weight,
            body_fat: request.body_fat,
            recorded_at: request.recorded_at.unwrap_or_else(Utc::now),
        };
        resources.database.create_body_metric(&metric).await?;

        // A new weight entry can move weight-oriented goals
        resources.evaluator.evaluate_user_goals(auth.user_id).await;

        Ok(Json(ApiResponse::with_message(metric, "Metric recorded")))
    }

    async fn delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(metric_id): Path<Uuid>,
    ) -> AppResult<Json<ApiResponse<()>>> {
        let auth = authenticate(&resources, &headers)?;
        if !resources
            .database
            .delete_body_metric(auth.user_id, metric_id)
            .await?
        {
            return Err(AppError::not_found("Metric"));
        }
        Ok(Json(ApiResponse::with_message((), "Metric deleted")))
    }
}
