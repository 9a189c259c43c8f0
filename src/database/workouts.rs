// ABOUTME: Workout and workout set database operations
// ABOUTME: Handles session CRUD, set logging, and per-user workout aggregation

use super::Database;
use crate::models::{Workout, WorkoutSet};
use crate::pagination::PaginationParams;
use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use sqlx::Row;
use uuid::Uuid;

/// Aggregated workout totals for a user
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutTotals {
    pub workout_count: i64,
    pub finished_count: i64,
    pub total_volume: f64,
    pub total_minutes: f64,
}

impl Database {
    /// Create workout tables
    pub(super) async fn migrate_workouts(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workouts (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                notes TEXT,
                started_at DATETIME NOT NULL,
                finished_at DATETIME,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_sets (
                id TEXT PRIMARY KEY,
                workout_id TEXT NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
                exercise_id TEXT NOT NULL REFERENCES exercises(id),
                weight REAL NOT NULL,
                reps INTEGER NOT NULL,
                set_number INTEGER NOT NULL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_workouts_user ON workouts(user_id, started_at)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_workout_sets_workout ON workout_sets(workout_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_workout_sets_exercise ON workout_sets(exercise_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a workout
    pub async fn create_workout(&self, workout: &Workout) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO workouts (id, user_id, title, notes, started_at, finished_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(workout.id.to_string())
        .bind(workout.user_id.to_string())
        .bind(&workout.title)
        .bind(&workout.notes)
        .bind(workout.started_at)
        .bind(workout.finished_at)
        .bind(workout.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a workout owned by the user
    pub async fn get_workout(&self, user_id: Uuid, workout_id: Uuid) -> Result<Option<Workout>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, title, notes, started_at, finished_at, created_at
            FROM workouts WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(workout_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_workout(&row)).transpose()
    }

    /// List workouts for a user, newest first, with the total row count
    pub async fn list_workouts(
        &self,
        user_id: Uuid,
        pagination: &PaginationParams,
    ) -> Result<(Vec<Workout>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workouts WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(
            r"
            SELECT id, user_id, title, notes, started_at, finished_at, created_at
            FROM workouts WHERE user_id = $1
            ORDER BY started_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id.to_string())
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        let workouts = rows
            .iter()
            .map(Self::row_to_workout)
            .collect::<Result<Vec<_>>>()?;

        Ok((workouts, total))
    }

    /// Update title/notes of an owned workout. Returns false if not found.
    pub async fn update_workout(&self, user_id: Uuid, workout: &Workout) -> Result<bool> {
        let result = sqlx::query(
            r"
            UPDATE workouts SET title = $1, notes = $2, started_at = $3
            WHERE id = $4 AND user_id = $5
            ",
        )
        .bind(&workout.title)
        .bind(&workout.notes)
        .bind(workout.started_at)
        .bind(workout.id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Mark a workout finished now. Returns the updated workout, or None if
    /// the row is missing or already finished.
    pub async fn finish_workout(&self, user_id: Uuid, workout_id: Uuid) -> Result<Option<Workout>> {
        let result = sqlx::query(
            r"
            UPDATE workouts SET finished_at = $1
            WHERE id = $2 AND user_id = $3 AND finished_at IS NULL
            ",
        )
        .bind(Utc::now())
        .bind(workout_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_workout(user_id, workout_id).await
    }

    /// Delete an owned workout and its sets. Returns false if not found.
    pub async fn delete_workout(&self, user_id: Uuid, workout_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM workouts WHERE id = $1 AND user_id = $2")
            .bind(workout_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert a set into an owned workout. Returns false if the workout is
    /// not owned by the user.
    pub async fn create_workout_set(&self, user_id: Uuid, set: &WorkoutSet) -> Result<bool> {
        let owned = self.get_workout(user_id, set.workout_id).await?;
        if owned.is_none() {
            return Ok(false);
        }

        sqlx::query(
            r"
            INSERT INTO workout_sets (id, workout_id, exercise_id, weight, reps, set_number, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(set.id.to_string())
        .bind(set.workout_id.to_string())
        .bind(set.exercise_id.to_string())
        .bind(set.weight)
        .bind(set.reps)
        .bind(set.set_number)
        .bind(set.created_at)
        .execute(&self.pool)
        .await?;

        Ok(true)
    }

    /// List sets of an owned workout
    pub async fn list_workout_sets(
        &self,
        user_id: Uuid,
        workout_id: Uuid,
    ) -> Result<Vec<WorkoutSet>> {
        let rows = sqlx::query(
            r"
            SELECT s.id, s.workout_id, s.exercise_id, s.weight, s.reps, s.set_number, s.created_at
            FROM workout_sets s
            JOIN workouts w ON w.id = s.workout_id
            WHERE s.workout_id = $1 AND w.user_id = $2
            ORDER BY s.set_number
            ",
        )
        .bind(workout_id.to_string())
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_set).collect()
    }

    /// Delete a set from an owned workout. Returns false if not found.
    pub async fn delete_workout_set(
        &self,
        user_id: Uuid,
        workout_id: Uuid,
        set_id: Uuid,
    ) -> Result<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM workout_sets
            WHERE id = $1 AND workout_id = $2
              AND workout_id IN (SELECT id FROM workouts WHERE user_id = $3)
            ",
        )
        .bind(set_id.to_string())
        .bind(workout_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Aggregate totals across all of a user's workouts
    pub async fn workout_totals(&self, user_id: Uuid) -> Result<WorkoutTotals> {
        let row = sqlx::query(
            r"
            SELECT
                COUNT(*) AS workout_count,
                COUNT(finished_at) AS finished_count,
                COALESCE(SUM(
                    CASE WHEN finished_at IS NOT NULL
                         THEN (julianday(finished_at) - julianday(started_at)) * 1440.0
                         ELSE 0 END
                ), 0) AS total_minutes
            FROM workouts WHERE user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        let total_volume: f64 = sqlx::query_scalar(
            r"
            SELECT COALESCE(SUM(s.weight * s.reps), 0)
            FROM workout_sets s
            JOIN workouts w ON w.id = s.workout_id
            WHERE w.user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(WorkoutTotals {
            workout_count: row.get("workout_count"),
            finished_count: row.get("finished_count"),
            total_volume,
            total_minutes: row.get("total_minutes"),
        })
    }

    fn row_to_workout(row: &sqlx::sqlite::SqliteRow) -> Result<Workout> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");

        Ok(Workout {
            id: Uuid::parse_str(&id)?,
            user_id: Uuid::parse_str(&user_id)?,
            title: row.get("title"),
            notes: row.get("notes"),
            started_at: row.get("started_at"),
            finished_at: row.get("finished_at"),
            created_at: row.get("created_at"),
        })
    }

    fn row_to_set(row: &sqlx::sqlite::SqliteRow) -> Result<WorkoutSet> {
        let id: String = row.get("id");
        let workout_id: String = row.get("workout_id");
        let exercise_id: String = row.get("exercise_id");

        Ok(WorkoutSet {
            id: Uuid::parse_str(&id)?,
            workout_id: Uuid::parse_str(&workout_id)?,
            exercise_id: Uuid::parse_str(&exercise_id)?,
            weight: row.get("weight"),
            reps: row.get("reps"),
            set_number: row.get("set_number"),
            created_at: row.get("created_at"),
        })
    }
}
