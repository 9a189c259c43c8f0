// ABOUTME: Workout session and set logging endpoints
// ABOUTME: Finishing a workout triggers goal evaluation for the user

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

use super::{authenticate, ApiResponse};
use crate::context::ServerResources;
use crate::database::WorkoutTotals;
use crate::errors::{AppError, AppResult};
use crate::models::{Workout, WorkoutSet};
use crate::pagination::PaginationParams;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct WorkoutRequest {
    pub title: String,
    pub notes: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct WorkoutSetRequest {
    pub exercise_id: Uuid,
    pub weight: f64,
    pub reps: i64,
    pub set_number: i64,
}

/// Workout session routes
pub struct WorkoutRoutes;

impl WorkoutRoutes {
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/workouts", get(Self::list).post(Self::create))
            .route("/workouts/statistics", get(Self::statistics))
            .route(
                "/workouts/:id",
                get(Self::get).put(Self::update).delete(Self::delete),
            )
            .route("/workouts/:id/finish", post(Self::finish))
            .route("/workouts/:id/sets", get(Self::list_sets).post(Self::create_set))
            .route("/workouts/:id/sets/:set_id", axum::routing::delete(Self::delete_set))
            .with_state(resources)
    }

    async fn list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(pagination): Query<PaginationParams>,
    ) -> AppResult<Json<ApiResponse<Vec<Workout>>>> {
        let auth = authenticate(&resources, &headers)?;
        let (workouts, total) = resources
            .database
            .list_workouts(auth.user_id, &pagination)
            .await?;
        Ok(Json(
            ApiResponse::new(workouts).with_meta(pagination.meta(total)),
        ))
    }

    async fn get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(workout_id): Path<Uuid>,
    ) -> AppResult<Json<ApiResponse<Workout>>> {
        let auth = authenticate(&resources, &headers)?;
        let workout = resources
            .database
            .get_workout(auth.user_id, workout_id)
            .await?
            .ok_or_else(|| AppError::not_found("Workout"))?;
        Ok(Json(ApiResponse::new(workout)))
    }

    async fn create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<WorkoutRequest>,
    ) -> AppResult<Json<ApiResponse<Workout>>> {
        let auth = authenticate(&resources, &headers)?;
        if request.title.trim().is_empty() {
            return Err(AppError::invalid_input("Workout title is required"));
        }

        let workout = Workout {
            id: Uuid::new_v4(),
            user_id: auth.user_id,
            title: request.title.trim().to_string(),
            notes: request.notes,
            started_at: request.started_at.unwrap_or_else(Utc::now),
            finished_at: None,
            created_at: Utc::now(),
        };
        resources.database.create_workout(&workout).await?;

        Ok(Json(ApiResponse::with_message(workout, "Workout created")))
    }

    async fn update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(workout_id): Path<Uuid>,
        Json(request): Json<WorkoutRequest>,
    ) -> AppResult<Json<ApiResponse<Workout>>> {
        let auth = authenticate(&resources, &headers)?;
        let mut workout = resources
            .database
            .get_workout(auth.user_id, workout_id)
            .await?
            .ok_or_else(|| AppError::not_found("Workout"))?;

        if request.title.trim().is_empty() {
            return Err(AppError::invalid_input("Workout title is required"));
        }
        workout.title = request.title.trim().to_string();
        workout.notes = request.notes;
        if let Some(started_at) = request.started_at {
            workout.started_at = started_at;
        }

        if !resources.database.update_workout(auth.user_id, &workout).await? {
            return Err(AppError::not_found("Workout"));
        }

        Ok(Json(ApiResponse::with_message(workout, "Workout updated")))
    }

    async fn finish(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(workout_id): Path<Uuid>,
    ) -> AppResult<Json<ApiResponse<Workout>>> {
        let auth = authenticate(&resources, &headers)?;
        let workout = resources
            .database
            .finish_workout(auth.user_id, workout_id)
            .await?
            .ok_or_else(|| AppError::not_found("Unfinished workout"))?;

        // A finished workout can move any workout-derived goal
        resources.evaluator.evaluate_user_goals(auth.user_id).await;

        Ok(Json(ApiResponse::with_message(workout, "Workout finished")))
    }

    async fn delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(workout_id): Path<Uuid>,
    ) -> AppResult<Json<ApiResponse<()>>> {
        let auth = authenticate(&resources, &headers)?;
        if !resources.database.delete_workout(auth.user_id, workout_id).await? {
            return Err(AppError::not_found("Workout"));
        }
        Ok(Json(ApiResponse::with_message((), "Workout deleted")))
    }

    async fn list_sets(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(workout_id): Path<Uuid>,
    ) -> AppResult<Json<ApiResponse<Vec<WorkoutSet>>>> {
        let auth = authenticate(&resources, &headers)?;
        resources
            .database
            .get_workout(auth.user_id, workout_id)
            .await?
            .ok_or_else(|| AppError::not_found("Workout"))?;

        let sets = resources
            .database
            .list_workout_sets(auth.user_id, workout_id)
            .await?;
        Ok(Json(ApiResponse::new(sets)))
    }

    async fn create_set(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(workout_id): Path<Uuid>,
        Json(request): Json<WorkoutSetRequest>,
    ) -> AppResult<Json<ApiResponse<WorkoutSet>>> {
        let auth = authenticate(&resources, &headers)?;
        if request.weight < 0.0 || request.reps <= 0 {
            return Err(AppError::invalid_input(
                "Set weight must be non-negative and reps positive",
            ));
        }
        resources
            .database
            .get_exercise(auth.user_id, request.exercise_id)
            .await?
            .ok_or_else(|| AppError::not_found("Exercise"))?;

        let set = WorkoutSet {
            id: Uuid::new_v4(),
            workout_id,
            exercise_id: request.exercise_id,
            weight: request.weight,
            reps: request.reps,
            set_number: request.set_number,
            created_at: Utc::now(),
        };
        if !resources.database.create_workout_set(auth.user_id, &set).await? {
            return Err(AppError::not_found("Workout"));
        }

        Ok(Json(ApiResponse::with_message(set, "Set logged")))
    }

    async fn delete_set(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((workout_id, set_id)): Path<(Uuid, Uuid)>,
    ) -> AppResult<Json<ApiResponse<()>>> {
        let auth = authenticate(&resources, &headers)?;
        if !resources
            .database
            .delete_workout_set(auth.user_id, workout_id, set_id)
            .await?
        {
            return Err(AppError::not_found("Set"));
        }
        Ok(Json(ApiResponse::with_message((), "Set deleted")))
    }

    async fn statistics(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Json<ApiResponse<WorkoutTotals>>> {
        let auth = authenticate(&resources, &headers)?;
        let totals = resources.database.workout_totals(auth.user_id).await?;
        Ok(Json(ApiResponse::new(totals)))
    }
}
