// ABOUTME: Program template installation and uninstall workflows
// ABOUTME: Materializes template graphs into user accounts with provenance tracking

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

//! # Program Installation
//!
//! Installing a program copies its template graph (cycles, plans, exercise
//! slots) into the user's own tables, resolving template exercise names
//! against the user's visible exercises and creating private ones where no
//! match exists. Every row created this way gets a provenance record, so
//! uninstall removes exactly what installation created and nothing the user
//! added or edited since. Exercises that have accumulated workout data stay
//! behind on uninstall.

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{
    Exercise, InstalledItemType, PlanExercise, ProgramInstallation, TrainingCycle, TrainingPlan,
};
use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Counts of rows materialized by an installation
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct InstallationSummary {
    pub cycles: usize,
    pub plans: usize,
    pub plan_exercises: usize,
    pub exercises_created: usize,
}

/// Installs and uninstalls program templates for user accounts
pub struct ProgramService {
    database: Database,
}

impl ProgramService {
    #[must_use]
    pub const fn new(database: Database) -> Self {
        Self { database }
    }

    /// Install a public program into the user's account
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown or private programs and
    /// `ResourceAlreadyExists` when the user already has an installation.
    pub async fn install(
        &self,
        user_id: Uuid,
        program_id: Uuid,
    ) -> AppResult<(ProgramInstallation, InstallationSummary)> {
        let program = self
            .database
            .get_program(program_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Program {program_id} not found")))?;

        if self.database.get_installation(user_id, program_id).await?.is_some() {
            return Err(AppError::already_exists(format!(
                "Program '{}' is already installed",
                program.name
            )));
        }

        let (template_cycles, template_plans, template_exercises) =
            self.database.get_program_graph(program_id).await?;

        let installation = ProgramInstallation {
            id: Uuid::new_v4(),
            program_id,
            user_id,
            installed_at: Utc::now(),
        };
        self.database.create_installation(&installation).await?;

        let mut summary = InstallationSummary::default();

        // Template cycle id -> materialized cycle id
        let mut cycle_ids = HashMap::new();
        for template in &template_cycles {
            let cycle = TrainingCycle {
                id: Uuid::new_v4(),
                user_id,
                name: template.name.clone(),
                description: template.description.clone(),
                position: template.position,
                created_at: Utc::now(),
            };
            self.database.create_cycle(&cycle).await?;
            self.database
                .create_installation_item(installation.id, InstalledItemType::Cycle, cycle.id)
                .await?;
            cycle_ids.insert(template.id, cycle.id);
            summary.cycles += 1;
        }

        let mut plan_ids = HashMap::new();
        for template in &template_plans {
            let cycle_id = *cycle_ids.get(&template.program_cycle_id).ok_or_else(|| {
                AppError::internal(format!(
                    "Template plan {} references unknown cycle",
                    template.id
                ))
            })?;

            let plan = TrainingPlan {
                id: Uuid::new_v4(),
                cycle_id,
                name: template.name.clone(),
                day_of_week: template.day_of_week,
                position: template.position,
            };
            if !self.database.create_plan(user_id, &plan).await? {
                return Err(AppError::internal("Materialized cycle missing during install"));
            }
            self.database
                .create_installation_item(installation.id, InstalledItemType::Plan, plan.id)
                .await?;
            plan_ids.insert(template.id, plan.id);
            summary.plans += 1;
        }

        // Template exercise name -> resolved exercise id, so a name shared
        // across plans resolves once
        let mut exercise_ids: HashMap<String, Uuid> = HashMap::new();
        for template in &template_exercises {
            let plan_id = *plan_ids.get(&template.program_plan_id).ok_or_else(|| {
                AppError::internal(format!(
                    "Template exercise {} references unknown plan",
                    template.id
                ))
            })?;

            let exercise_id = match exercise_ids.get(&template.exercise_name) {
                Some(id) => *id,
                None => {
                    let id = self
                        .resolve_exercise(
                            user_id,
                            &installation,
                            &template.exercise_name,
                            template.muscle_group.as_deref(),
                            &mut summary,
                        )
                        .await?;
                    exercise_ids.insert(template.exercise_name.clone(), id);
                    id
                }
            };

            let plan_exercise = PlanExercise {
                id: Uuid::new_v4(),
                plan_id,
                exercise_id,
                target_sets: template.target_sets,
                target_reps: template.target_reps,
                target_weight: template.target_weight,
                position: template.position,
            };
            if !self.database.create_plan_exercise(user_id, &plan_exercise).await? {
                return Err(AppError::internal("Materialized plan missing during install"));
            }
            self.database
                .create_installation_item(
                    installation.id,
                    InstalledItemType::PlanExercise,
                    plan_exercise.id,
                )
                .await?;
            summary.plan_exercises += 1;
        }

        info!(
            user_id = %user_id,
            program = %program.name,
            cycles = summary.cycles,
            plans = summary.plans,
            "Program installed"
        );

        Ok((installation, summary))
    }

    /// Remove the user's installation of a program, deleting only the rows
    /// the installation created
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the user has no installation of the
    /// program.
    pub async fn uninstall(&self, user_id: Uuid, program_id: Uuid) -> AppResult<()> {
        let installation = self
            .database
            .get_installation(user_id, program_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Program {program_id} is not installed"))
            })?;

        let items = self.database.list_installation_items(installation.id).await?;

        // Leaf rows first so foreign keys never block a delete. Rows the
        // user deleted themselves simply no longer match.
        for (item_type, item_id) in &items {
            if *item_type == InstalledItemType::PlanExercise {
                self.database.delete_plan_exercise_by_id(user_id, *item_id).await?;
            }
        }
        for (item_type, item_id) in &items {
            if *item_type == InstalledItemType::Plan {
                self.database.delete_plan(user_id, *item_id).await?;
            }
        }
        for (item_type, item_id) in &items {
            if *item_type == InstalledItemType::Cycle {
                self.database.delete_cycle(user_id, *item_id).await?;
            }
        }
        for (item_type, item_id) in &items {
            if *item_type == InstalledItemType::Exercise {
                // An exercise with logged sets or remaining plan slots stays
                if self.database.exercise_referenced(*item_id).await? {
                    debug!(exercise_id = %item_id, "Keeping referenced exercise on uninstall");
                    continue;
                }
                self.database.delete_exercise(user_id, *item_id).await?;
            }
        }

        self.database.delete_installation(installation.id).await?;

        info!(user_id = %user_id, program_id = %program_id, "Program uninstalled");
        Ok(())
    }

    /// Resolve a template exercise name to a visible exercise, creating a
    /// private one (with provenance) when nothing matches
    async fn resolve_exercise(
        &self,
        user_id: Uuid,
        installation: &ProgramInstallation,
        name: &str,
        muscle_group: Option<&str>,
        summary: &mut InstallationSummary,
    ) -> AppResult<Uuid> {
        if let Some(existing) = self.database.find_exercise_by_name(user_id, name).await? {
            return Ok(existing.id);
        }

        let exercise = Exercise {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            name: name.to_string(),
            muscle_group: muscle_group.map(ToString::to_string),
            description: None,
            created_at: Utc::now(),
        };
        self.database.create_exercise(&exercise).await?;
        self.database
            .create_installation_item(installation.id, InstalledItemType::Exercise, exercise.id)
            .await?;
        summary.exercises_created += 1;

        Ok(exercise.id)
    }
}
