// ABOUTME: Training cycle, plan, and plan-exercise database operations
// ABOUTME: Handles the cycle -> plan -> exercise graph owned by a single user

use super::Database;
use crate::models::{PlanExercise, TrainingCycle, TrainingPlan};
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create cycle graph tables
    pub(super) async fn migrate_cycles(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS training_cycles (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                description TEXT,
                position INTEGER NOT NULL DEFAULT 0,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS training_plans (
                id TEXT PRIMARY KEY,
                cycle_id TEXT NOT NULL REFERENCES training_cycles(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                day_of_week INTEGER,
                position INTEGER NOT NULL DEFAULT 0
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS plan_exercises (
                id TEXT PRIMARY KEY,
                plan_id TEXT NOT NULL REFERENCES training_plans(id) ON DELETE CASCADE,
                exercise_id TEXT NOT NULL REFERENCES exercises(id),
                target_sets INTEGER NOT NULL,
                target_reps INTEGER NOT NULL,
                target_weight REAL,
                position INTEGER NOT NULL DEFAULT 0
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_cycles_user ON training_cycles(user_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_plans_cycle ON training_plans(cycle_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_plan_exercises_plan ON plan_exercises(plan_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a training cycle
    pub async fn create_cycle(&self, cycle: &TrainingCycle) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO training_cycles (id, user_id, name, description, position, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(cycle.id.to_string())
        .bind(cycle.user_id.to_string())
        .bind(&cycle.name)
        .bind(&cycle.description)
        .bind(cycle.position)
        .bind(cycle.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch an owned cycle
    pub async fn get_cycle(&self, user_id: Uuid, cycle_id: Uuid) -> Result<Option<TrainingCycle>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, name, description, position, created_at
            FROM training_cycles WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(cycle_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_cycle(&row)).transpose()
    }

    /// Fetch a cycle regardless of owner. Only used by the share import
    /// path after the share token has been validated.
    pub async fn get_cycle_unscoped(&self, cycle_id: Uuid) -> Result<Option<TrainingCycle>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, name, description, position, created_at
            FROM training_cycles WHERE id = $1
            ",
        )
        .bind(cycle_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_cycle(&row)).transpose()
    }

    /// List a user's cycles ordered by position
    pub async fn list_cycles(&self, user_id: Uuid) -> Result<Vec<TrainingCycle>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, name, description, position, created_at
            FROM training_cycles WHERE user_id = $1
            ORDER BY position, created_at
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_cycle).collect()
    }

    /// Update an owned cycle. Returns false if not found.
    pub async fn update_cycle(&self, user_id: Uuid, cycle: &TrainingCycle) -> Result<bool> {
        let result = sqlx::query(
            r"
            UPDATE training_cycles SET name = $1, description = $2, position = $3
            WHERE id = $4 AND user_id = $5
            ",
        )
        .bind(&cycle.name)
        .bind(&cycle.description)
        .bind(cycle.position)
        .bind(cycle.id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete an owned cycle and its plan graph. Returns false if not found.
    pub async fn delete_cycle(&self, user_id: Uuid, cycle_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM training_cycles WHERE id = $1 AND user_id = $2")
            .bind(cycle_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert a plan into an owned cycle. Returns false if the cycle is not
    /// owned by the user.
    pub async fn create_plan(&self, user_id: Uuid, plan: &TrainingPlan) -> Result<bool> {
        if self.get_cycle(user_id, plan.cycle_id).await?.is_none() {
            return Ok(false);
        }

        sqlx::query(
            r"
            INSERT INTO training_plans (id, cycle_id, name, day_of_week, position)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(plan.id.to_string())
        .bind(plan.cycle_id.to_string())
        .bind(&plan.name)
        .bind(plan.day_of_week)
        .bind(plan.position)
        .execute(&self.pool)
        .await?;

        Ok(true)
    }

    /// Fetch an owned plan (ownership via the parent cycle)
    pub async fn get_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<Option<TrainingPlan>> {
        let row = sqlx::query(
            r"
            SELECT p.id, p.cycle_id, p.name, p.day_of_week, p.position
            FROM training_plans p
            JOIN training_cycles c ON c.id = p.cycle_id
            WHERE p.id = $1 AND c.user_id = $2
            ",
        )
        .bind(plan_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_plan(&row)).transpose()
    }

    /// List plans of a cycle (no ownership filter; callers verify the cycle)
    pub async fn list_plans(&self, cycle_id: Uuid) -> Result<Vec<TrainingPlan>> {
        let rows = sqlx::query(
            r"
            SELECT id, cycle_id, name, day_of_week, position
            FROM training_plans WHERE cycle_id = $1
            ORDER BY position
            ",
        )
        .bind(cycle_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_plan).collect()
    }

    /// Update an owned plan. Returns false if not found.
    pub async fn update_plan(&self, user_id: Uuid, plan: &TrainingPlan) -> Result<bool> {
        let result = sqlx::query(
            r"
            UPDATE training_plans SET name = $1, day_of_week = $2, position = $3
            WHERE id = $4 AND cycle_id IN
                (SELECT id FROM training_cycles WHERE user_id = $5)
            ",
        )
        .bind(&plan.name)
        .bind(plan.day_of_week)
        .bind(plan.position)
        .bind(plan.id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete an owned plan. Returns false if not found.
    pub async fn delete_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM training_plans
            WHERE id = $1 AND cycle_id IN
                (SELECT id FROM training_cycles WHERE user_id = $2)
            ",
        )
        .bind(plan_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert an exercise slot into an owned plan. Returns false if the
    /// plan is not owned by the user.
    pub async fn create_plan_exercise(
        &self,
        user_id: Uuid,
        plan_exercise: &PlanExercise,
    ) -> Result<bool> {
        if self.get_plan(user_id, plan_exercise.plan_id).await?.is_none() {
            return Ok(false);
        }

        sqlx::query(
            r"
            INSERT INTO plan_exercises
                (id, plan_id, exercise_id, target_sets, target_reps, target_weight, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(plan_exercise.id.to_string())
        .bind(plan_exercise.plan_id.to_string())
        .bind(plan_exercise.exercise_id.to_string())
        .bind(plan_exercise.target_sets)
        .bind(plan_exercise.target_reps)
        .bind(plan_exercise.target_weight)
        .bind(plan_exercise.position)
        .execute(&self.pool)
        .await?;

        Ok(true)
    }

    /// List exercise slots of a plan
    pub async fn list_plan_exercises(&self, plan_id: Uuid) -> Result<Vec<PlanExercise>> {
        let rows = sqlx::query(
            r"
            SELECT id, plan_id, exercise_id, target_sets, target_reps, target_weight, position
            FROM plan_exercises WHERE plan_id = $1
            ORDER BY position
            ",
        )
        .bind(plan_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_plan_exercise).collect()
    }

    /// Delete an exercise slot from an owned plan. Returns false if not found.
    pub async fn delete_plan_exercise(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        plan_exercise_id: Uuid,
    ) -> Result<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM plan_exercises
            WHERE id = $1 AND plan_id = $2 AND plan_id IN (
                SELECT p.id FROM training_plans p
                JOIN training_cycles c ON c.id = p.cycle_id
                WHERE c.user_id = $3
            )
            ",
        )
        .bind(plan_exercise_id.to_string())
        .bind(plan_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete an owned exercise slot by id alone. Used by program uninstall,
    /// where provenance rows carry no parent plan id.
    pub async fn delete_plan_exercise_by_id(
        &self,
        user_id: Uuid,
        plan_exercise_id: Uuid,
    ) -> Result<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM plan_exercises
            WHERE id = $1 AND plan_id IN (
                SELECT p.id FROM training_plans p
                JOIN training_cycles c ON c.id = p.cycle_id
                WHERE c.user_id = $2
            )
            ",
        )
        .bind(plan_exercise_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    fn row_to_cycle(row: &sqlx::sqlite::SqliteRow) -> Result<TrainingCycle> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");

        Ok(TrainingCycle {
            id: Uuid::parse_str(&id)?,
            user_id: Uuid::parse_str(&user_id)?,
            name: row.get("name"),
            description: row.get("description"),
            position: row.get("position"),
            created_at: row.get("created_at"),
        })
    }

    fn row_to_plan(row: &sqlx::sqlite::SqliteRow) -> Result<TrainingPlan> {
        let id: String = row.get("id");
        let cycle_id: String = row.get("cycle_id");

        Ok(TrainingPlan {
            id: Uuid::parse_str(&id)?,
            cycle_id: Uuid::parse_str(&cycle_id)?,
            name: row.get("name"),
            day_of_week: row.get("day_of_week"),
            position: row.get("position"),
        })
    }

    fn row_to_plan_exercise(row: &sqlx::sqlite::SqliteRow) -> Result<PlanExercise> {
        let id: String = row.get("id");
        let plan_id: String = row.get("plan_id");
        let exercise_id: String = row.get("exercise_id");

        Ok(PlanExercise {
            id: Uuid::parse_str(&id)?,
            plan_id: Uuid::parse_str(&plan_id)?,
            exercise_id: Uuid::parse_str(&exercise_id)?,
            target_sets: row.get("target_sets"),
            target_reps: row.get("target_reps"),
            target_weight: row.get("target_weight"),
            position: row.get("position"),
        })
    }
}
