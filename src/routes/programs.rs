// ABOUTME: Training program browsing, install, and uninstall endpoints
// ABOUTME: Install materializes the template graph; uninstall uses provenance

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

use super::{authenticate, ApiResponse};
use crate::context::ServerResources;
use crate::errors::{AppError, AppResult};
use crate::models::{
    ProgramCycle, ProgramInstallation, ProgramPlan, ProgramPlanExercise, TrainingProgram,
};
use crate::services::InstallationSummary;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// A program template with its full graph
#[derive(Debug, Serialize)]
pub struct ProgramDetail {
    #[serde(flatten)]
    pub program: TrainingProgram,
    pub cycles: Vec<ProgramCycle>,
    pub plans: Vec<ProgramPlan>,
    pub exercises: Vec<ProgramPlanExercise>,
}

#[derive(Debug, Serialize)]
pub struct InstallResponse {
    pub installation: ProgramInstallation,
    pub summary: InstallationSummary,
}

/// Program template routes
pub struct ProgramRoutes;

impl ProgramRoutes {
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/programs", get(Self::list))
            .route("/programs/:id", get(Self::get))
            .route(
                "/programs/:id/install",
                axum::routing::post(Self::install).delete(Self::uninstall),
            )
            .with_state(resources)
    }

    async fn list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Json<ApiResponse<Vec<TrainingProgram>>>> {
        authenticate(&resources, &headers)?;
        let programs = resources.database.list_programs().await?;
        Ok(Json(ApiResponse::new(programs)))
    }

    async fn get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(program_id): Path<Uuid>,
    ) -> AppResult<Json<ApiResponse<ProgramDetail>>> {
        authenticate(&resources, &headers)?;
        let program = resources
            .database
            .get_program(program_id)
            .await?
            .ok_or_else(|| AppError::not_found("Program"))?;

        let (cycles, plans, exercises) = resources.database.get_program_graph(program_id).await?;

        Ok(Json(ApiResponse::new(ProgramDetail {
            program,
            cycles,
            plans,
            exercises,
        })))
    }

    async fn install(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(program_id): Path<Uuid>,
    ) -> AppResult<Json<ApiResponse<InstallResponse>>> {
        let auth = authenticate(&resources, &headers)?;
        let (installation, summary) = resources.programs.install(auth.user_id, program_id).await?;

        Ok(Json(ApiResponse::with_message(
            InstallResponse {
                installation,
                summary,
            },
            "Program installed",
        )))
    }

    async fn uninstall(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(program_id): Path<Uuid>,
    ) -> AppResult<Json<ApiResponse<()>>> {
        let auth = authenticate(&resources, &headers)?;
        resources.programs.uninstall(auth.user_id, program_id).await?;
        Ok(Json(ApiResponse::with_message((), "Program uninstalled")))
    }
}
