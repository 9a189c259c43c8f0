// ABOUTME: Body metric database operations
// ABOUTME: Handles weight/body-fat entries used by weight-oriented goals

use super::Database;
use crate::models::BodyMetric;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the body metrics table
    pub(super) async fn migrate_metrics(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS body_metrics (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                weight REAL NOT NULL,
                body_fat REAL,
                recorded_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_body_metrics_user ON body_metrics(user_id, recorded_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a body metric entry
    pub async fn create_body_metric(&self, metric: &BodyMetric) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO body_metrics (id, user_id, weight, body_fat, recorded_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(metric.id.to_string())
        .bind(metric.user_id.to_string())
        .bind(metric.weight)
        .bind(metric.body_fat)
        .bind(metric.recorded_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// List metric entries for a user, newest first
    pub async fn list_body_metrics(&self, user_id: Uuid) -> Result<Vec<BodyMetric>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, weight, body_fat, recorded_at
            FROM body_metrics WHERE user_id = $1
            ORDER BY recorded_at DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_metric).collect()
    }

    /// Delete an owned metric entry. Returns false if not found.
    pub async fn delete_body_metric(&self, user_id: Uuid, metric_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM body_metrics WHERE id = $1 AND user_id = $2")
            .bind(metric_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Latest recorded weight within [start, end], if any
    pub async fn latest_weight_in_window(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<f64>> {
        let weight = sqlx::query_scalar(
            r"
            SELECT weight FROM body_metrics
            WHERE user_id = $1 AND recorded_at >= $2 AND recorded_at <= $3
            ORDER BY recorded_at DESC LIMIT 1
            ",
        )
        .bind(user_id.to_string())
        .bind(start)
        .bind(end)
        .fetch_optional(&self.pool)
        .await?;

        Ok(weight)
    }

    /// Baseline weight for direction-based goals: the most recent entry at
    /// or before `start`, falling back to the earliest entry after it
    pub async fn baseline_weight(&self, user_id: Uuid, start: DateTime<Utc>) -> Result<Option<f64>> {
        let before: Option<f64> = sqlx::query_scalar(
            r"
            SELECT weight FROM body_metrics
            WHERE user_id = $1 AND recorded_at <= $2
            ORDER BY recorded_at DESC LIMIT 1
            ",
        )
        .bind(user_id.to_string())
        .bind(start)
        .fetch_optional(&self.pool)
        .await?;

        if before.is_some() {
            return Ok(before);
        }

        let after = sqlx::query_scalar(
            r"
            SELECT weight FROM body_metrics
            WHERE user_id = $1 AND recorded_at > $2
            ORDER BY recorded_at ASC LIMIT 1
            ",
        )
        .bind(user_id.to_string())
        .bind(start)
        .fetch_optional(&self.pool)
        .await?;

        Ok(after)
    }

    fn row_to_metric(row: &sqlx::sqlite::SqliteRow) -> Result<BodyMetric> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");

        Ok(BodyMetric {
            id: Uuid::parse_str(&id)?,
            user_id: Uuid::parse_str(&user_id)?,
            weight: row.get("weight"),
            body_fat: row.get("body_fat"),
            recorded_at: row.get("recorded_at"),
        })
    }
}
