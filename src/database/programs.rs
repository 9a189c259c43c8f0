// ABOUTME: Training program template and installation database operations
// ABOUTME: Stores template graphs and provenance rows for selective uninstall

use super::Database;
use crate::models::{
    InstalledItemType, ProgramCycle, ProgramInstallation, ProgramPlan, ProgramPlanExercise,
    TrainingProgram,
};
use anyhow::Result;
use sqlx::Row;
use std::str::FromStr;
use uuid::Uuid;

impl Database {
    /// Create program template and installation tables
    pub(super) async fn migrate_programs(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS training_programs (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                author TEXT,
                is_public BOOLEAN NOT NULL DEFAULT 1,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS program_cycles (
                id TEXT PRIMARY KEY,
                program_id TEXT NOT NULL REFERENCES training_programs(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                description TEXT,
                position INTEGER NOT NULL DEFAULT 0
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS program_plans (
                id TEXT PRIMARY KEY,
                program_cycle_id TEXT NOT NULL REFERENCES program_cycles(id) ON DELETE CASCADE,
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
            CREATE TABLE IF NOT EXISTS program_plan_exercises (
                id TEXT PRIMARY KEY,
                program_plan_id TEXT NOT NULL REFERENCES program_plans(id) ON DELETE CASCADE,
                exercise_name TEXT NOT NULL,
                muscle_group TEXT,
                target_sets INTEGER NOT NULL,
                target_reps INTEGER NOT NULL,
                target_weight REAL,
                position INTEGER NOT NULL DEFAULT 0
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS program_installations (
                id TEXT PRIMARY KEY,
                program_id TEXT NOT NULL REFERENCES training_programs(id),
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                installed_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(program_id, user_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS program_installation_items (
                id TEXT PRIMARY KEY,
                installation_id TEXT NOT NULL
                    REFERENCES program_installations(id) ON DELETE CASCADE,
                item_type TEXT NOT NULL
                    CHECK (item_type IN ('cycle', 'plan', 'plan_exercise', 'exercise')),
                item_id TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a program template with its graph
    pub async fn create_program(
        &self,
        program: &TrainingProgram,
        cycles: &[ProgramCycle],
        plans: &[ProgramPlan],
        exercises: &[ProgramPlanExercise],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO training_programs (id, name, description, author, is_public, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(program.id.to_string())
        .bind(&program.name)
        .bind(&program.description)
        .bind(&program.author)
        .bind(program.is_public)
        .bind(program.created_at)
        .execute(&mut *tx)
        .await?;

        for cycle in cycles {
            sqlx::query(
                r"
                INSERT INTO program_cycles (id, program_id, name, description, position)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(cycle.id.to_string())
            .bind(cycle.program_id.to_string())
            .bind(&cycle.name)
            .bind(&cycle.description)
            .bind(cycle.position)
            .execute(&mut *tx)
            .await?;
        }

        for plan in plans {
            sqlx::query(
                r"
                INSERT INTO program_plans (id, program_cycle_id, name, day_of_week, position)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(plan.id.to_string())
            .bind(plan.program_cycle_id.to_string())
            .bind(&plan.name)
            .bind(plan.day_of_week)
            .bind(plan.position)
            .execute(&mut *tx)
            .await?;
        }

        for exercise in exercises {
            sqlx::query(
                r"
                INSERT INTO program_plan_exercises
                    (id, program_plan_id, exercise_name, muscle_group,
                     target_sets, target_reps, target_weight, position)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ",
            )
            .bind(exercise.id.to_string())
            .bind(exercise.program_plan_id.to_string())
            .bind(&exercise.exercise_name)
            .bind(&exercise.muscle_group)
            .bind(exercise.target_sets)
            .bind(exercise.target_reps)
            .bind(exercise.target_weight)
            .bind(exercise.position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// List public program templates
    pub async fn list_programs(&self) -> Result<Vec<TrainingProgram>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, description, author, is_public, created_at
            FROM training_programs WHERE is_public = 1
            ORDER BY name
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_program).collect()
    }

    /// Fetch a public program template
    pub async fn get_program(&self, program_id: Uuid) -> Result<Option<TrainingProgram>> {
        let row = sqlx::query(
            r"
            SELECT id, name, description, author, is_public, created_at
            FROM training_programs WHERE id = $1 AND is_public = 1
            ",
        )
        .bind(program_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_program(&row)).transpose()
    }

    /// Load the full template graph of a program
    pub async fn get_program_graph(
        &self,
        program_id: Uuid,
    ) -> Result<(Vec<ProgramCycle>, Vec<ProgramPlan>, Vec<ProgramPlanExercise>)> {
        let cycle_rows = sqlx::query(
            r"
            SELECT id, program_id, name, description, position
            FROM program_cycles WHERE program_id = $1 ORDER BY position
            ",
        )
        .bind(program_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let cycles = cycle_rows
            .iter()
            .map(Self::row_to_program_cycle)
            .collect::<Result<Vec<_>>>()?;

        let plan_rows = sqlx::query(
            r"
            SELECT p.id, p.program_cycle_id, p.name, p.day_of_week, p.position
            FROM program_plans p
            JOIN program_cycles c ON c.id = p.program_cycle_id
            WHERE c.program_id = $1
            ORDER BY p.position
            ",
        )
        .bind(program_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let plans = plan_rows
            .iter()
            .map(Self::row_to_program_plan)
            .collect::<Result<Vec<_>>>()?;

        let exercise_rows = sqlx::query(
            r"
            SELECT e.id, e.program_plan_id, e.exercise_name, e.muscle_group,
                   e.target_sets, e.target_reps, e.target_weight, e.position
            FROM program_plan_exercises e
            JOIN program_plans p ON p.id = e.program_plan_id
            JOIN program_cycles c ON c.id = p.program_cycle_id
            WHERE c.program_id = $1
            ORDER BY e.position
            ",
        )
        .bind(program_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let exercises = exercise_rows
            .iter()
            .map(Self::row_to_program_plan_exercise)
            .collect::<Result<Vec<_>>>()?;

        Ok((cycles, plans, exercises))
    }

    /// Record an installation
    pub async fn create_installation(&self, installation: &ProgramInstallation) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO program_installations (id, program_id, user_id, installed_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(installation.id.to_string())
        .bind(installation.program_id.to_string())
        .bind(installation.user_id.to_string())
        .bind(installation.installed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch the user's installation of a program
    pub async fn get_installation(
        &self,
        user_id: Uuid,
        program_id: Uuid,
    ) -> Result<Option<ProgramInstallation>> {
        let row = sqlx::query(
            r"
            SELECT id, program_id, user_id, installed_at
            FROM program_installations WHERE user_id = $1 AND program_id = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(program_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let id: String = row.get("id");
            let program_id: String = row.get("program_id");
            let user_id: String = row.get("user_id");
            Ok(ProgramInstallation {
                id: Uuid::parse_str(&id)?,
                program_id: Uuid::parse_str(&program_id)?,
                user_id: Uuid::parse_str(&user_id)?,
                installed_at: row.get("installed_at"),
            })
        })
        .transpose()
    }

    /// Record a provenance row for an installed item
    pub async fn create_installation_item(
        &self,
        installation_id: Uuid,
        item_type: InstalledItemType,
        item_id: Uuid,
    ) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO program_installation_items (id, installation_id, item_type, item_id)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(installation_id.to_string())
        .bind(item_type.as_str())
        .bind(item_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// List provenance rows of an installation as (type, id) pairs
    pub async fn list_installation_items(
        &self,
        installation_id: Uuid,
    ) -> Result<Vec<(InstalledItemType, Uuid)>> {
        let rows = sqlx::query(
            r"
            SELECT item_type, item_id FROM program_installation_items
            WHERE installation_id = $1
            ",
        )
        .bind(installation_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let item_type: String = row.get("item_type");
                let item_id: String = row.get("item_id");
                Ok((
                    InstalledItemType::from_str(&item_type)?,
                    Uuid::parse_str(&item_id)?,
                ))
            })
            .collect()
    }

    /// Delete an installation and its provenance rows
    pub async fn delete_installation(&self, installation_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM program_installations WHERE id = $1")
            .bind(installation_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    fn row_to_program(row: &sqlx::sqlite::SqliteRow) -> Result<TrainingProgram> {
        let id: String = row.get("id");

        Ok(TrainingProgram {
            id: Uuid::parse_str(&id)?,
            name: row.get("name"),
            description: row.get("description"),
            author: row.get("author"),
            is_public: row.get("is_public"),
            created_at: row.get("created_at"),
        })
    }

    fn row_to_program_cycle(row: &sqlx::sqlite::SqliteRow) -> Result<ProgramCycle> {
        let id: String = row.get("id");
        let program_id: String = row.get("program_id");

        Ok(ProgramCycle {
            id: Uuid::parse_str(&id)?,
            program_id: Uuid::parse_str(&program_id)?,
            name: row.get("name"),
            description: row.get("description"),
            position: row.get("position"),
        })
    }

    fn row_to_program_plan(row: &sqlx::sqlite::SqliteRow) -> Result<ProgramPlan> {
        let id: String = row.get("id");
        let program_cycle_id: String = row.get("program_cycle_id");

        Ok(ProgramPlan {
            id: Uuid::parse_str(&id)?,
            program_cycle_id: Uuid::parse_str(&program_cycle_id)?,
            name: row.get("name"),
            day_of_week: row.get("day_of_week"),
            position: row.get("position"),
        })
    }

    fn row_to_program_plan_exercise(row: &sqlx::sqlite::SqliteRow) -> Result<ProgramPlanExercise> {
        let id: String = row.get("id");
        let program_plan_id: String = row.get("program_plan_id");

        Ok(ProgramPlanExercise {
            id: Uuid::parse_str(&id)?,
            program_plan_id: Uuid::parse_str(&program_plan_id)?,
            exercise_name: row.get("exercise_name"),
            muscle_group: row.get("muscle_group"),
            target_sets: row.get("target_sets"),
            target_reps: row.get("target_reps"),
            target_weight: row.get("target_weight"),
            position: row.get("position"),
        })
    }
}
