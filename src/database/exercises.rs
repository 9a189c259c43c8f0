// ABOUTME: Exercise catalog database operations
// ABOUTME: Handles built-in catalog rows and private user-created exercises

use super::Database;
use crate::models::Exercise;
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the exercises table
    pub(super) async fn migrate_exercises(&self) -> Result<()> {
        // user_id NULL marks a built-in catalog row visible to everyone
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS exercises (
                id TEXT PRIMARY KEY,
                user_id TEXT REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                muscle_group TEXT,
                description TEXT,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_exercises_user ON exercises(user_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert an exercise
    pub async fn create_exercise(&self, exercise: &Exercise) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO exercises (id, user_id, name, muscle_group, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(exercise.id.to_string())
        .bind(exercise.user_id.map(|id| id.to_string()))
        .bind(&exercise.name)
        .bind(&exercise.muscle_group)
        .bind(&exercise.description)
        .bind(exercise.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch an exercise visible to the user (their own or a catalog row)
    pub async fn get_exercise(&self, user_id: Uuid, exercise_id: Uuid) -> Result<Option<Exercise>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, name, muscle_group, description, created_at
            FROM exercises
            WHERE id = $1 AND (user_id = $2 OR user_id IS NULL)
            ",
        )
        .bind(exercise_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_exercise(&row)).transpose()
    }

    /// List exercises visible to the user, catalog rows first
    pub async fn list_exercises(&self, user_id: Uuid) -> Result<Vec<Exercise>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, name, muscle_group, description, created_at
            FROM exercises
            WHERE user_id = $1 OR user_id IS NULL
            ORDER BY user_id IS NOT NULL, name
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_exercise).collect()
    }

    /// Fetch an exercise regardless of visibility. Only used by the share
    /// import path, which copies definitions across accounts.
    pub async fn get_exercise_unscoped(&self, exercise_id: Uuid) -> Result<Option<Exercise>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, name, muscle_group, description, created_at
            FROM exercises WHERE id = $1
            ",
        )
        .bind(exercise_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_exercise(&row)).transpose()
    }

    /// Find a visible exercise by exact name, preferring catalog rows
    pub async fn find_exercise_by_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> Result<Option<Exercise>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, name, muscle_group, description, created_at
            FROM exercises
            WHERE name = $1 AND (user_id = $2 OR user_id IS NULL)
            ORDER BY user_id IS NOT NULL
            LIMIT 1
            ",
        )
        .bind(name)
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_exercise(&row)).transpose()
    }

    /// Whether any workout set or plan slot still references the exercise
    pub async fn exercise_referenced(&self, exercise_id: Uuid) -> Result<bool> {
        let row = sqlx::query(
            r"
            SELECT
                (SELECT COUNT(*) FROM workout_sets WHERE exercise_id = $1) +
                (SELECT COUNT(*) FROM plan_exercises WHERE exercise_id = $1) AS refs
            ",
        )
        .bind(exercise_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        let refs: i64 = row.get("refs");
        Ok(refs > 0)
    }

    /// Update a user-owned exercise. Catalog rows cannot be edited.
    ///
    /// Returns false if no owned row matched.
    pub async fn update_exercise(&self, user_id: Uuid, exercise: &Exercise) -> Result<bool> {
        let result = sqlx::query(
            r"
            UPDATE exercises
            SET name = $1, muscle_group = $2, description = $3
            WHERE id = $4 AND user_id = $5
            ",
        )
        .bind(&exercise.name)
        .bind(&exercise.muscle_group)
        .bind(&exercise.description)
        .bind(exercise.id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a user-owned exercise. Returns false if no owned row matched.
    pub async fn delete_exercise(&self, user_id: Uuid, exercise_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM exercises WHERE id = $1 AND user_id = $2")
            .bind(exercise_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    fn row_to_exercise(row: &sqlx::sqlite::SqliteRow) -> Result<Exercise> {
        let id: String = row.get("id");
        let user_id: Option<String> = row.get("user_id");

        Ok(Exercise {
            id: Uuid::parse_str(&id)?,
            user_id: user_id.as_deref().map(Uuid::parse_str).transpose()?,
            name: row.get("name"),
            muscle_group: row.get("muscle_group"),
            description: row.get("description"),
            created_at: row.get("created_at"),
        })
    }
}
