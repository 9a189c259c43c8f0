// ABOUTME: Exercise catalog CRUD endpoints
// ABOUTME: Catalog rows are read-only; user rows are private and editable

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

use super::{authenticate, ApiResponse};
use crate::context::ServerResources;
use crate::errors::{AppError, AppResult};
use crate::models::Exercise;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ExerciseRequest {
    pub name: String,
    pub muscle_group: Option<String>,
    pub description: Option<String>,
}

/// Exercise catalog routes
pub struct ExerciseRoutes;

impl ExerciseRoutes {
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/exercises", get(Self::list).post(Self::create))
            .route(
                "/exercises/:id",
                get(Self::get).put(Self::update).delete(Self::delete),
            )
            .with_state(resources)
    }

    async fn list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Json<ApiResponse<Vec<Exercise>>>> {
        let auth = authenticate(&resources, &headers)?;
        let exercises = resources.database.list_exercises(auth.user_id).await?;
        Ok(Json(ApiResponse::new(exercises)))
    }

    async fn get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(exercise_id): Path<Uuid>,
    ) -> AppResult<Json<ApiResponse<Exercise>>> {
        let auth = authenticate(&resources, &headers)?;
        let exercise = resources
            .database
            .get_exercise(auth.user_id, exercise_id)
            .await?
            .ok_or_else(|| AppError::not_found("Exercise"))?;
        Ok(Json(ApiResponse::new(exercise)))
    }

    async fn create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<ExerciseRequest>,
    ) -> AppResult<Json<ApiResponse<Exercise>>> {
        let auth = authenticate(&resources, &headers)?;
        if request.name.trim().is_empty() {
            return Err(AppError::invalid_input("Exercise name is required"));
        }

        let exercise = Exercise {
            id: Uuid::new_v4(),
            user_id: Some(auth.user_id),
            name: request.name.trim().to_string(),
            muscle_group: request.muscle_group,
            description: request.description,
            created_at: Utc::now(),
        };
        resources.database.create_exercise(&exercise).await?;

        Ok(Json(ApiResponse::with_message(exercise, "Exercise created")))
    }

    async fn update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(exercise_id): Path<Uuid>,
        Json(request): Json<ExerciseRequest>,
    ) -> AppResult<Json<ApiResponse<Exercise>>> {
        let auth = authenticate(&resources, &headers)?;
        if request.name.trim().is_empty() {
            return Err(AppError::invalid_input("Exercise name is required"));
        }

        let mut exercise = resources
            .database
            .get_exercise(auth.user_id, exercise_id)
            .await?
            .ok_or_else(|| AppError::not_found("Exercise"))?;

        exercise.name = request.name.trim().to_string();
        exercise.muscle_group = request.muscle_group;
        exercise.description = request.description;

        // Catalog rows have no owner and fail the scoped update
        if !resources
            .database
            .update_exercise(auth.user_id, &exercise)
            .await?
        {
            return Err(AppError::not_found("Exercise"));
        }

        Ok(Json(ApiResponse::with_message(exercise, "Exercise updated")))
    }

    async fn delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(exercise_id): Path<Uuid>,
    ) -> AppResult<Json<ApiResponse<()>>> {
        let auth = authenticate(&resources, &headers)?;
        if !resources
            .database
            .delete_exercise(auth.user_id, exercise_id)
            .await?
        {
            return Err(AppError::not_found("Exercise"));
        }
        Ok(Json(ApiResponse::with_message((), "Exercise deleted")))
    }
}
