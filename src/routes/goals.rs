// ABOUTME: Goal CRUD, statistics, and notification history endpoints
// ABOUTME: Create and update evaluate the goal immediately; delete cancels

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

use super::{authenticate, ApiResponse};
use crate::context::ServerResources;
use crate::database::GoalStatistics;
use crate::errors::{AppError, AppResult};
use crate::models::{Goal, GoalNotification, GoalStatus, GoalType};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    pub goal_type: GoalType,
    pub title: String,
    pub description: Option<String>,
    pub target_value: f64,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub exercise_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGoalRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_value: Option<f64>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct GoalListQuery {
    pub status: Option<GoalStatus>,
}

/// Goal lifecycle routes
pub struct GoalRoutes;

impl GoalRoutes {
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/goals", get(Self::list).post(Self::create))
            .route("/goals/statistics", get(Self::statistics))
            .route("/goals/completed", get(Self::list_completed))
            .route("/goals/failed", get(Self::list_failed))
            .route(
                "/goals/:id",
                get(Self::get).put(Self::update).delete(Self::cancel),
            )
            .route("/goals/:id/notifications", get(Self::notifications))
            .with_state(resources)
    }

    async fn list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<GoalListQuery>,
    ) -> AppResult<Json<ApiResponse<Vec<Goal>>>> {
        let auth = authenticate(&resources, &headers)?;
        let goals = resources
            .database
            .list_goals(auth.user_id, query.status)
            .await?;
        Ok(Json(ApiResponse::new(goals)))
    }

    async fn list_completed(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Json<ApiResponse<Vec<Goal>>>> {
        let auth = authenticate(&resources, &headers)?;
        let goals = resources
            .database
            .list_goals(auth.user_id, Some(GoalStatus::Completed))
            .await?;
        Ok(Json(ApiResponse::new(goals)))
    }

    async fn list_failed(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Json<ApiResponse<Vec<Goal>>>> {
        let auth = authenticate(&resources, &headers)?;
        let goals = resources
            .database
            .list_goals(auth.user_id, Some(GoalStatus::Failed))
            .await?;
        Ok(Json(ApiResponse::new(goals)))
    }

    async fn get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(goal_id): Path<Uuid>,
    ) -> AppResult<Json<ApiResponse<Goal>>> {
        let auth = authenticate(&resources, &headers)?;
        let goal = resources
            .database
            .get_goal(auth.user_id, goal_id)
            .await?
            .ok_or_else(|| AppError::not_found("Goal"))?;
        Ok(Json(ApiResponse::new(goal)))
    }

    async fn create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateGoalRequest>,
    ) -> AppResult<Json<ApiResponse<Goal>>> {
        let auth = authenticate(&resources, &headers)?;

        if request.title.trim().is_empty() {
            return Err(AppError::invalid_input("Goal title is required"));
        }
        if request.target_value <= 0.0 {
            return Err(AppError::invalid_input("Target value must be positive"));
        }

        let now = Utc::now();
        let start_date = request.start_date.unwrap_or(now);
        if let Some(end_date) = request.end_date {
            if end_date <= start_date {
                return Err(AppError::invalid_input(
                    "End date must be after the start date",
                ));
            }
        }

        if request.goal_type.requires_exercise() {
            let exercise_id = request.exercise_id.ok_or_else(|| {
                AppError::invalid_input(format!(
                    "Goal type {} requires an exercise",
                    request.goal_type
                ))
            })?;
            resources
                .database
                .get_exercise(auth.user_id, exercise_id)
                .await?
                .ok_or_else(|| AppError::not_found("Exercise"))?;
        } else if request.exercise_id.is_some() {
            return Err(AppError::invalid_input(format!(
                "Goal type {} does not take an exercise",
                request.goal_type
            )));
        }

        let goal = Goal {
            id: Uuid::new_v4(),
            user_id: auth.user_id,
            goal_type: request.goal_type,
            title: request.title.trim().to_string(),
            description: request.description,
            target_value: request.target_value,
            start_date,
            end_date: request.end_date,
            exercise_id: request.exercise_id,
            status: GoalStatus::Active,
            current_value: 0.0,
            progress_percentage: 0,
            last_notified_milestone: None,
            last_deadline_reminder_at: None,
            completed_at: None,
            achieved_value: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        };
        resources.database.create_goal(&goal).await?;

        // Existing data may already satisfy part of the goal
        let goal = resources.evaluator.update_progress(&goal).await?;

        Ok(Json(ApiResponse::with_message(goal, "Goal created")))
    }

    async fn update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(goal_id): Path<Uuid>,
        Json(request): Json<UpdateGoalRequest>,
    ) -> AppResult<Json<ApiResponse<Goal>>> {
        let auth = authenticate(&resources, &headers)?;
        let mut goal = resources
            .database
            .get_goal(auth.user_id, goal_id)
            .await?
            .ok_or_else(|| AppError::not_found("Goal"))?;

        if goal.status.is_terminal() {
            return Err(AppError::invalid_input(format!(
                "A {} goal cannot be edited",
                goal.status
            )));
        }

        if let Some(title) = request.title {
            if title.trim().is_empty() {
                return Err(AppError::invalid_input("Goal title is required"));
            }
            goal.title = title.trim().to_string();
        }
        if let Some(description) = request.description {
            goal.description = Some(description);
        }
        if let Some(target_value) = request.target_value {
            if target_value <= 0.0 {
                return Err(AppError::invalid_input("Target value must be positive"));
            }
            goal.target_value = target_value;
        }
        if let Some(end_date) = request.end_date {
            if end_date <= goal.start_date {
                return Err(AppError::invalid_input(
                    "End date must be after the start date",
                ));
            }
            goal.end_date = Some(end_date);
        }

        if !resources.database.update_goal(auth.user_id, &goal).await? {
            return Err(AppError::not_found("Goal"));
        }

        // A changed target or deadline shifts progress and transitions
        let goal = resources.evaluator.update_progress(&goal).await?;

        Ok(Json(ApiResponse::with_message(goal, "Goal updated")))
    }

    async fn cancel(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(goal_id): Path<Uuid>,
    ) -> AppResult<Json<ApiResponse<Goal>>> {
        let auth = authenticate(&resources, &headers)?;
        let goal = resources
            .database
            .cancel_goal(auth.user_id, goal_id)
            .await?
            .ok_or_else(|| AppError::not_found("Active goal"))?;
        Ok(Json(ApiResponse::with_message(goal, "Goal cancelled")))
    }

    async fn notifications(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(goal_id): Path<Uuid>,
    ) -> AppResult<Json<ApiResponse<Vec<GoalNotification>>>> {
        let auth = authenticate(&resources, &headers)?;
        resources
            .database
            .get_goal(auth.user_id, goal_id)
            .await?
            .ok_or_else(|| AppError::not_found("Goal"))?;

        let notifications = resources.database.list_goal_notifications(goal_id).await?;
        Ok(Json(ApiResponse::new(notifications)))
    }

    async fn statistics(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Json<ApiResponse<GoalStatistics>>> {
        let auth = authenticate(&resources, &headers)?;
        let statistics = resources.database.goal_statistics(auth.user_id).await?;
        Ok(Json(ApiResponse::new(statistics)))
    }
}
