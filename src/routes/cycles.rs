// ABOUTME: Training cycle, plan, and plan-exercise endpoints
// ABOUTME: The cycle graph is user-owned; nested routes verify the parent chain

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

use super::{authenticate, ApiResponse};
use crate::context::ServerResources;
use crate::errors::{AppError, AppResult};
use crate::models::{PlanExercise, TrainingCycle, TrainingPlan};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CycleRequest {
    pub name: String,
    pub description: Option<String>,
    pub position: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub name: String,
    pub day_of_week: Option<i64>,
    pub position: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PlanExerciseRequest {
    pub exercise_id: Uuid,
    pub target_sets: i64,
    pub target_reps: i64,
    pub target_weight: Option<f64>,
    pub position: Option<i64>,
}

/// A cycle with its nested plans and exercise slots
#[derive(Debug, Serialize)]
pub struct CycleDetail {
    #[serde(flatten)]
    pub cycle: TrainingCycle,
    pub plans: Vec<PlanDetail>,
}

#[derive(Debug, Serialize)]
pub struct PlanDetail {
    #[serde(flatten)]
    pub plan: TrainingPlan,
    pub exercises: Vec<PlanExercise>,
}

/// Training cycle graph routes
pub struct CycleRoutes;

impl CycleRoutes {
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/cycles", get(Self::list).post(Self::create))
            .route(
                "/cycles/:id",
                get(Self::get).put(Self::update).delete(Self::delete),
            )
            .route("/cycles/:id/plans", post(Self::create_plan))
            .route("/plans/:id", put(Self::update_plan).delete(Self::delete_plan))
            .route("/plans/:id/exercises", post(Self::create_plan_exercise))
            .route(
                "/plans/:id/exercises/:pe_id",
                delete(Self::delete_plan_exercise),
            )
            .with_state(resources)
    }

    async fn list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Json<ApiResponse<Vec<TrainingCycle>>>> {
        let auth = authenticate(&resources, &headers)?;
        let cycles = resources.database.list_cycles(auth.user_id).await?;
        Ok(Json(ApiResponse::new(cycles)))
    }

    async fn get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(cycle_id): Path<Uuid>,
    ) -> AppResult<Json<ApiResponse<CycleDetail>>> {
        let auth = authenticate(&resources, &headers)?;
        let cycle = resources
            .database
            .get_cycle(auth.user_id, cycle_id)
            .await?
            .ok_or_else(|| AppError::not_found("Cycle"))?;

        let mut plans = Vec::new();
        for plan in resources.database.list_plans(cycle.id).await? {
            let exercises = resources.database.list_plan_exercises(plan.id).await?;
            plans.push(PlanDetail { plan, exercises });
        }

        Ok(Json(ApiResponse::new(CycleDetail { cycle, plans })))
    }

    async fn create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CycleRequest>,
    ) -> AppResult<Json<ApiResponse<TrainingCycle>>> {
        let auth = authenticate(&resources, &headers)?;
        if request.name.trim().is_empty() {
            return Err(AppError::invalid_input("Cycle name is required"));
        }

        let cycle = TrainingCycle {
            id: Uuid::new_v4(),
            user_id: auth.user_id,
            name: request.name.trim().to_string(),
            description: request.description,
            position: request.position.unwrap_or(0),
            created_at: Utc::now(),
        };
        resources.database.create_cycle(&cycle).await?;

        Ok(Json(ApiResponse::with_message(cycle, "Cycle created")))
    }

    async fn update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(cycle_id): Path<Uuid>,
        Json(request): Json<CycleRequest>,
    ) -> AppResult<Json<ApiResponse<TrainingCycle>>> {
        let auth = authenticate(&resources, &headers)?;
        let mut cycle = resources
            .database
            .get_cycle(auth.user_id, cycle_id)
            .await?
            .ok_or_else(|| AppError::not_found("Cycle"))?;

        if request.name.trim().is_empty() {
            return Err(AppError::invalid_input("Cycle name is required"));
        }
        cycle.name = request.name.trim().to_string();
        cycle.description = request.description;
        if let Some(position) = request.position {
            cycle.position = position;
        }

        if !resources.database.update_cycle(auth.user_id, &cycle).await? {
            return Err(AppError::not_found("Cycle"));
        }

        Ok(Json(ApiResponse::with_message(cycle, "Cycle updated")))
    }

    async fn delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(cycle_id): Path<Uuid>,
    ) -> AppResult<Json<ApiResponse<()>>> {
        let auth = authenticate(&resources, &headers)?;
        if !resources.database.delete_cycle(auth.user_id, cycle_id).await? {
            return Err(AppError::not_found("Cycle"));
        }
        Ok(Json(ApiResponse::with_message((), "Cycle deleted")))
    }

    async fn create_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(cycle_id): Path<Uuid>,
        Json(request): Json<PlanRequest>,
    ) -> AppResult<Json<ApiResponse<TrainingPlan>>> {
        let auth = authenticate(&resources, &headers)?;
        if request.name.trim().is_empty() {
            return Err(AppError::invalid_input("Plan name is required"));
        }

        let plan = TrainingPlan {
            id: Uuid::new_v4(),
            cycle_id,
            name: request.name.trim().to_string(),
            day_of_week: request.day_of_week,
            position: request.position.unwrap_or(0),
        };
        if !resources.database.create_plan(auth.user_id, &plan).await? {
            return Err(AppError::not_found("Cycle"));
        }

        Ok(Json(ApiResponse::with_message(plan, "Plan created")))
    }

    async fn update_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<Uuid>,
        Json(request): Json<PlanRequest>,
    ) -> AppResult<Json<ApiResponse<TrainingPlan>>> {
        let auth = authenticate(&resources, &headers)?;
        let mut plan = resources
            .database
            .get_plan(auth.user_id, plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("Plan"))?;

        if request.name.trim().is_empty() {
            return Err(AppError::invalid_input("Plan name is required"));
        }
        plan.name = request.name.trim().to_string();
        plan.day_of_week = request.day_of_week;
        if let Some(position) = request.position {
            plan.position = position;
        }

        if !resources.database.update_plan(auth.user_id, &plan).await? {
            return Err(AppError::not_found("Plan"));
        }

        Ok(Json(ApiResponse::with_message(plan, "Plan updated")))
    }

    async fn delete_plan(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<Uuid>,
    ) -> AppResult<Json<ApiResponse<()>>> {
        let auth = authenticate(&resources, &headers)?;
        if !resources.database.delete_plan(auth.user_id, plan_id).await? {
            return Err(AppError::not_found("Plan"));
        }
        Ok(Json(ApiResponse::with_message((), "Plan deleted")))
    }

    async fn create_plan_exercise(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<Uuid>,
        Json(request): Json<PlanExerciseRequest>,
    ) -> AppResult<Json<ApiResponse<PlanExercise>>> {
        let auth = authenticate(&resources, &headers)?;
        if request.target_sets <= 0 || request.target_reps <= 0 {
            return Err(AppError::invalid_input(
                "Target sets and reps must be positive",
            ));
        }
        resources
            .database
            .get_exercise(auth.user_id, request.exercise_id)
            .await?
            .ok_or_else(|| AppError::not_found("Exercise"))?;

        let plan_exercise = PlanExercise {
            id: Uuid::new_v4(),
            plan_id,
            exercise_id: request.exercise_id,
            target_sets: request.target_sets,
            target_reps: request.target_reps,
            target_weight: request.target_weight,
            position: request.position.unwrap_or(0),
        };
        if !resources
            .database
            .create_plan_exercise(auth.user_id, &plan_exercise)
            .await?
        {
            return Err(AppError::not_found("Plan"));
        }

        Ok(Json(ApiResponse::with_message(
            plan_exercise,
            "Exercise added to plan",
        )))
    }

    async fn delete_plan_exercise(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((plan_id, plan_exercise_id)): Path<(Uuid, Uuid)>,
    ) -> AppResult<Json<ApiResponse<()>>> {
        let auth = authenticate(&resources, &headers)?;
        if !resources
            .database
            .delete_plan_exercise(auth.user_id, plan_id, plan_exercise_id)
            .await?
        {
            return Err(AppError::not_found("Plan exercise"));
        }
        Ok(Json(ApiResponse::with_message((), "Exercise removed from plan")))
    }
}
