// ABOUTME: Goal and goal-notification database operations
// ABOUTME: Stores goal rows, the notification dedup ledger, and metric-source aggregations

use super::Database;
use crate::models::{Goal, GoalNotification, GoalNotificationType, GoalStatus, GoalType};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::Row;
use std::str::FromStr;
use uuid::Uuid;

/// Per-status goal counts for the statistics endpoint
#[derive(Debug, Clone, Serialize)]
pub struct GoalStatistics {
    pub total: i64,
    pub active: i64,
    pub completed: i64,
    pub failed: i64,
    pub cancelled: i64,
    /// Mean display-clamped progress over active goals
    pub average_active_progress: f64,
}

impl Database {
    /// Create goal tables and the notification dedup constraint
    pub(super) async fn migrate_goals(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS goals (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                goal_type TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                target_value REAL NOT NULL,
                start_date DATETIME NOT NULL,
                end_date DATETIME,
                exercise_id TEXT REFERENCES exercises(id),
                status TEXT NOT NULL DEFAULT 'active'
                    CHECK (status IN ('active', 'completed', 'failed', 'cancelled')),
                current_value REAL NOT NULL DEFAULT 0,
                progress_percentage INTEGER NOT NULL DEFAULT 0,
                last_notified_milestone INTEGER,
                last_deadline_reminder_at DATETIME,
                completed_at DATETIME,
                achieved_value REAL,
                cancelled_at DATETIME,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_goals_user ON goals(user_id, status)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS goal_notifications (
                id TEXT PRIMARY KEY,
                goal_id TEXT NOT NULL REFERENCES goals(id) ON DELETE CASCADE,
                notification_type TEXT NOT NULL
                    CHECK (notification_type IN
                        ('achieved', 'progress', 'deadline_reminder', 'failed')),
                milestone INTEGER,
                sent_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // SQLite treats NULLs as distinct in unique indexes, so the dedup
        // key needs one index for milestone-carrying rows and one for the
        // milestone-less kinds.
        sqlx::query(
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_goal_notifications_milestone
            ON goal_notifications(goal_id, notification_type, milestone)
            WHERE milestone IS NOT NULL
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_goal_notifications_single
            ON goal_notifications(goal_id, notification_type)
            WHERE milestone IS NULL
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a goal
    pub async fn create_goal(&self, goal: &Goal) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO goals
                (id, user_id, goal_type, title, description, target_value,
                 start_date, end_date, exercise_id, status, current_value,
                 progress_percentage, last_notified_milestone,
                 last_deadline_reminder_at, completed_at, achieved_value,
                 cancelled_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17, $18, $19)
            ",
        )
        .bind(goal.id.to_string())
        .bind(goal.user_id.to_string())
        .bind(goal.goal_type.as_str())
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(goal.target_value)
        .bind(goal.start_date)
        .bind(goal.end_date)
        .bind(goal.exercise_id.map(|id| id.to_string()))
        .bind(goal.status.as_str())
        .bind(goal.current_value)
        .bind(goal.progress_percentage)
        .bind(goal.last_notified_milestone)
        .bind(goal.last_deadline_reminder_at)
        .bind(goal.completed_at)
        .bind(goal.achieved_value)
        .bind(goal.cancelled_at)
        .bind(goal.created_at)
        .bind(goal.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch an owned goal
    pub async fn get_goal(&self, user_id: Uuid, goal_id: Uuid) -> Result<Option<Goal>> {
        let row = sqlx::query("SELECT * FROM goals WHERE id = $1 AND user_id = $2")
            .bind(goal_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::row_to_goal(&row)).transpose()
    }

    /// List a user's goals, optionally filtered by status, newest first
    pub async fn list_goals(
        &self,
        user_id: Uuid,
        status: Option<GoalStatus>,
    ) -> Result<Vec<Goal>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    "SELECT * FROM goals WHERE user_id = $1 AND status = $2 ORDER BY created_at DESC",
                )
                .bind(user_id.to_string())
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query("SELECT * FROM goals WHERE user_id = $1 ORDER BY created_at DESC")
                    .bind(user_id.to_string())
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.iter().map(Self::row_to_goal).collect()
    }

    /// Update user-editable goal fields. Returns false if not found.
    pub async fn update_goal(&self, user_id: Uuid, goal: &Goal) -> Result<bool> {
        let result = sqlx::query(
            r"
            UPDATE goals
            SET title = $1, description = $2, target_value = $3,
                end_date = $4, updated_at = $5
            WHERE id = $6 AND user_id = $7
            ",
        )
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(goal.target_value)
        .bind(goal.end_date)
        .bind(Utc::now())
        .bind(goal.id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Persist evaluator-owned progress fields
    pub async fn save_goal_progress(&self, goal: &Goal) -> Result<()> {
        sqlx::query(
            r"
            UPDATE goals
            SET current_value = $1, progress_percentage = $2, status = $3,
                completed_at = $4, achieved_value = $5,
                last_notified_milestone = $6, last_deadline_reminder_at = $7,
                updated_at = $8
            WHERE id = $9
            ",
        )
        .bind(goal.current_value)
        .bind(goal.progress_percentage)
        .bind(goal.status.as_str())
        .bind(goal.completed_at)
        .bind(goal.achieved_value)
        .bind(goal.last_notified_milestone)
        .bind(goal.last_deadline_reminder_at)
        .bind(goal.updated_at)
        .bind(goal.id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Cancel an active goal. Returns the cancelled goal, or None if no
    /// active owned goal matched (terminal goals stay untouched).
    pub async fn cancel_goal(&self, user_id: Uuid, goal_id: Uuid) -> Result<Option<Goal>> {
        let now = Utc::now();
        let result = sqlx::query(
            r"
            UPDATE goals
            SET status = 'cancelled', cancelled_at = $1, updated_at = $1
            WHERE id = $2 AND user_id = $3 AND status = 'active'
            ",
        )
        .bind(now)
        .bind(goal_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_goal(user_id, goal_id).await
    }

    /// List a user's active goals for batch evaluation
    pub async fn list_active_goals(&self, user_id: Uuid) -> Result<Vec<Goal>> {
        self.list_goals(user_id, Some(GoalStatus::Active)).await
    }

    /// Record a notification dedup row before dispatch. Returns false when
    /// an equal dedup key already exists, meaning the event was already
    /// notified.
    pub async fn try_record_goal_notification(
        &self,
        goal_id: Uuid,
        notification_type: GoalNotificationType,
        milestone: Option<i64>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r"
            INSERT OR IGNORE INTO goal_notifications
                (id, goal_id, notification_type, milestone, sent_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(goal_id.to_string())
        .bind(notification_type.as_str())
        .bind(milestone)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List notification records for a goal, oldest first
    pub async fn list_goal_notifications(&self, goal_id: Uuid) -> Result<Vec<GoalNotification>> {
        let rows = sqlx::query(
            r"
            SELECT id, goal_id, notification_type, milestone, sent_at
            FROM goal_notifications WHERE goal_id = $1
            ORDER BY sent_at
            ",
        )
        .bind(goal_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                let goal_id: String = row.get("goal_id");
                let notification_type: String = row.get("notification_type");
                Ok(GoalNotification {
                    id: Uuid::parse_str(&id)?,
                    goal_id: Uuid::parse_str(&goal_id)?,
                    notification_type: GoalNotificationType::from_str(&notification_type)?,
                    milestone: row.get("milestone"),
                    sent_at: row.get("sent_at"),
                })
            })
            .collect()
    }

    /// Aggregate per-status counts and mean active progress
    pub async fn goal_statistics(&self, user_id: Uuid) -> Result<GoalStatistics> {
        let row = sqlx::query(
            r"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(status = 'active'), 0) AS active,
                COALESCE(SUM(status = 'completed'), 0) AS completed,
                COALESCE(SUM(status = 'failed'), 0) AS failed,
                COALESCE(SUM(status = 'cancelled'), 0) AS cancelled,
                COALESCE(AVG(CASE WHEN status = 'active'
                    THEN MIN(MAX(progress_percentage, 0), 100) END), 0)
                    AS average_active_progress
            FROM goals WHERE user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(GoalStatistics {
            total: row.get("total"),
            active: row.get("active"),
            completed: row.get("completed"),
            failed: row.get("failed"),
            cancelled: row.get("cancelled"),
            average_active_progress: row.get("average_active_progress"),
        })
    }

    // ── Metric sources for the progress evaluator ──────────────────────

    /// Count workouts started inside the window. When `finished_only` is
    /// set, only workouts with a finish timestamp count.
    pub async fn count_workouts_in_window(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        finished_only: bool,
    ) -> Result<i64> {
        let query = if finished_only {
            r"
            SELECT COUNT(*) FROM workouts
            WHERE user_id = $1 AND started_at >= $2 AND started_at <= $3
              AND finished_at IS NOT NULL
            "
        } else {
            r"
            SELECT COUNT(*) FROM workouts
            WHERE user_id = $1 AND started_at >= $2 AND started_at <= $3
            "
        };

        let count = sqlx::query_scalar(query)
            .bind(user_id.to_string())
            .bind(start)
            .bind(end)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// SUM(weight x reps) over sets of workouts started inside the window
    pub async fn volume_in_window(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64> {
        let volume = sqlx::query_scalar(
            r"
            SELECT COALESCE(SUM(s.weight * s.reps), 0)
            FROM workout_sets s
            JOIN workouts w ON w.id = s.workout_id
            WHERE w.user_id = $1 AND w.started_at >= $2 AND w.started_at <= $3
            ",
        )
        .bind(user_id.to_string())
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(volume)
    }

    /// SUM(finished_at - started_at) in minutes over finished workouts
    /// started inside the window
    pub async fn training_minutes_in_window(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64> {
        let minutes = sqlx::query_scalar(
            r"
            SELECT COALESCE(SUM(
                (julianday(finished_at) - julianday(started_at)) * 1440.0), 0)
            FROM workouts
            WHERE user_id = $1 AND started_at >= $2 AND started_at <= $3
              AND finished_at IS NOT NULL
            ",
        )
        .bind(user_id.to_string())
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(minutes)
    }

    /// Distinct completion dates of finished workouts, newest first
    pub async fn workout_completion_dates(&self, user_id: Uuid) -> Result<Vec<NaiveDate>> {
        let rows: Vec<String> = sqlx::query_scalar(
            r"
            SELECT DISTINCT date(finished_at) FROM workouts
            WHERE user_id = $1 AND finished_at IS NOT NULL
            ORDER BY 1 DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|date| Ok(NaiveDate::parse_from_str(date, "%Y-%m-%d")?))
            .collect()
    }

    /// MAX set weight for one exercise inside the window
    pub async fn exercise_max_weight(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64> {
        self.exercise_aggregate("MAX(s.weight)", user_id, exercise_id, start, end)
            .await
    }

    /// MAX set reps for one exercise inside the window
    pub async fn exercise_max_reps(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64> {
        self.exercise_aggregate("MAX(s.reps)", user_id, exercise_id, start, end)
            .await
    }

    /// SUM(weight x reps) for one exercise inside the window
    pub async fn exercise_volume(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64> {
        self.exercise_aggregate("SUM(s.weight * s.reps)", user_id, exercise_id, start, end)
            .await
    }

    async fn exercise_aggregate(
        &self,
        aggregate: &str,
        user_id: Uuid,
        exercise_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64> {
        let query = format!(
            r"
            SELECT COALESCE({aggregate}, 0)
            FROM workout_sets s
            JOIN workouts w ON w.id = s.workout_id
            WHERE w.user_id = $1 AND s.exercise_id = $2
              AND w.started_at >= $3 AND w.started_at <= $4
            "
        );

        let value: f64 = sqlx::query_scalar(&query)
            .bind(user_id.to_string())
            .bind(exercise_id.to_string())
            .bind(start)
            .bind(end)
            .fetch_one(&self.pool)
            .await?;

        Ok(value)
    }

    fn row_to_goal(row: &sqlx::sqlite::SqliteRow) -> Result<Goal> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let goal_type: String = row.get("goal_type");
        let status: String = row.get("status");
        let exercise_id: Option<String> = row.get("exercise_id");

        Ok(Goal {
            id: Uuid::parse_str(&id)?,
            user_id: Uuid::parse_str(&user_id)?,
            goal_type: GoalType::from_str(&goal_type)?,
            title: row.get("title"),
            description: row.get("description"),
            target_value: row.get("target_value"),
            start_date: row.get("start_date"),
            end_date: row.get("end_date"),
            exercise_id: exercise_id.as_deref().map(Uuid::parse_str).transpose()?,
            status: GoalStatus::from_str(&status)?,
            current_value: row.get("current_value"),
            progress_percentage: row.get("progress_percentage"),
            last_notified_milestone: row.get("last_notified_milestone"),
            last_deadline_reminder_at: row.get("last_deadline_reminder_at"),
            completed_at: row.get("completed_at"),
            achieved_value: row.get("achieved_value"),
            cancelled_at: row.get("cancelled_at"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}
