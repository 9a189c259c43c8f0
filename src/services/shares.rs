// ABOUTME: Cycle share link creation, revocation, and cross-account import
// ABOUTME: Deep-copies a shared cycle graph into the importing user's account

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

//! # Cycle Sharing
//!
//! A share link is a UUID token pointing at one training cycle. Anyone who
//! holds a valid token can import the cycle: the graph (cycle, plans,
//! exercise slots) is deep-copied into the importer's account with fresh
//! ids, so the copy evolves independently of the original. Catalog
//! exercises are referenced as-is; the owner's private exercises are
//! re-resolved by name on the importer's side, copied when absent.

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{CycleShare, Exercise, PlanExercise, TrainingCycle, TrainingPlan};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// Creates, revokes, and imports cycle share links
pub struct ShareService {
    database: Database,
}

impl ShareService {
    #[must_use]
    pub const fn new(database: Database) -> Self {
        Self { database }
    }

    /// Create a share link for an owned cycle
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the cycle does not exist or belongs
    /// to another user.
    pub async fn share_cycle(
        &self,
        owner_user_id: Uuid,
        cycle_id: Uuid,
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<CycleShare> {
        if self.database.get_cycle(owner_user_id, cycle_id).await?.is_none() {
            return Err(AppError::not_found(format!("Cycle {cycle_id} not found")));
        }

        let share = CycleShare {
            id: Uuid::new_v4(),
            cycle_id,
            owner_user_id,
            is_active: true,
            expires_at,
            created_at: Utc::now(),
        };
        self.database.create_share(&share).await?;

        info!(cycle_id = %cycle_id, share_token = %share.id, "Cycle share created");
        Ok(share)
    }

    /// Deactivate a share link the user owns
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when no owned share matches the token.
    pub async fn revoke(&self, owner_user_id: Uuid, share_token: Uuid) -> AppResult<()> {
        if !self.database.deactivate_share(owner_user_id, share_token).await? {
            return Err(AppError::not_found(format!(
                "Share {share_token} not found"
            )));
        }

        Ok(())
    }

    /// Import the cycle behind a share token into the user's account
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown tokens, `ResourceGone` for
    /// revoked or expired shares.
    pub async fn import(&self, user_id: Uuid, share_token: Uuid) -> AppResult<TrainingCycle> {
        let share = self
            .database
            .get_share(share_token)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Share {share_token} not found")))?;

        if !share.is_importable(Utc::now()) {
            return Err(AppError::gone("This share link is no longer available"));
        }

        // The token itself is the authorization; the owner scope no longer
        // applies past this point
        let source = self
            .database
            .get_cycle_unscoped(share.cycle_id)
            .await?
            .ok_or_else(|| AppError::gone("The shared cycle has been deleted"))?;

        let cycle = TrainingCycle {
            id: Uuid::new_v4(),
            user_id,
            name: source.name.clone(),
            description: source.description.clone(),
            position: source.position,
            created_at: Utc::now(),
        };
        self.database.create_cycle(&cycle).await?;

        let mut exercise_ids: HashMap<Uuid, Uuid> = HashMap::new();
        for source_plan in self.database.list_plans(source.id).await? {
            let plan = TrainingPlan {
                id: Uuid::new_v4(),
                cycle_id: cycle.id,
                name: source_plan.name.clone(),
                day_of_week: source_plan.day_of_week,
                position: source_plan.position,
            };
            if !self.database.create_plan(user_id, &plan).await? {
                return Err(AppError::internal("Imported cycle missing during import"));
            }

            for source_slot in self.database.list_plan_exercises(source_plan.id).await? {
                let exercise_id = match exercise_ids.get(&source_slot.exercise_id) {
                    Some(id) => *id,
                    None => {
                        let id = self
                            .resolve_exercise(user_id, source_slot.exercise_id)
                            .await?;
                        exercise_ids.insert(source_slot.exercise_id, id);
                        id
                    }
                };

                let slot = PlanExercise {
                    id: Uuid::new_v4(),
                    plan_id: plan.id,
                    exercise_id,
                    target_sets: source_slot.target_sets,
                    target_reps: source_slot.target_reps,
                    target_weight: source_slot.target_weight,
                    position: source_slot.position,
                };
                if !self.database.create_plan_exercise(user_id, &slot).await? {
                    return Err(AppError::internal("Imported plan missing during import"));
                }
            }
        }

        info!(
            user_id = %user_id,
            share_token = %share_token,
            cycle_id = %cycle.id,
            "Cycle imported from share"
        );

        Ok(cycle)
    }

    /// Map a source exercise reference to one usable by the importer.
    /// Catalog rows pass through; private rows resolve by name or get copied.
    async fn resolve_exercise(&self, user_id: Uuid, source_id: Uuid) -> AppResult<Uuid> {
        let source = self
            .database
            .get_exercise_unscoped(source_id)
            .await?
            .ok_or_else(|| AppError::internal("Shared plan references a missing exercise"))?;

        if source.user_id.is_none() {
            return Ok(source.id);
        }

        if let Some(existing) = self
            .database
            .find_exercise_by_name(user_id, &source.name)
            .await?
        {
            return Ok(existing.id);
        }

        let copy = Exercise {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            name: source.name.clone(),
            muscle_group: source.muscle_group.clone(),
            description: source.description.clone(),
            created_at: Utc::now(),
        };
        self.database.create_exercise(&copy).await?;

        Ok(copy.id)
    }
}
