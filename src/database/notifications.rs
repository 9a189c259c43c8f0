// ABOUTME: Notification preference and device token database operations
// ABOUTME: Lazily defaults per-user preferences and stores FCM delivery targets

use super::Database;
use crate::models::{DeviceToken, NotificationPreferences};
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create preference and device token tables
    pub(super) async fn migrate_notifications(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS notification_preferences (
                user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                achieved_enabled BOOLEAN NOT NULL DEFAULT 1,
                progress_enabled BOOLEAN NOT NULL DEFAULT 1,
                deadline_reminder_enabled BOOLEAN NOT NULL DEFAULT 1,
                failed_enabled BOOLEAN NOT NULL DEFAULT 1,
                milestones TEXT NOT NULL,
                deadline_reminder_days TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS device_tokens (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                token TEXT NOT NULL,
                platform TEXT,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(user_id, token)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get the user's notification preferences, creating a defaults row on
    /// first access. Explicit get-or-create, no ambient lifecycle hooks.
    pub async fn get_or_create_notification_preferences(
        &self,
        user_id: Uuid,
    ) -> Result<NotificationPreferences> {
        if let Some(preferences) = self.get_notification_preferences(user_id).await? {
            return Ok(preferences);
        }

        let defaults = NotificationPreferences::defaults(user_id);
        // INSERT OR IGNORE tolerates a concurrent first access
        sqlx::query(
            r"
            INSERT OR IGNORE INTO notification_preferences
                (user_id, achieved_enabled, progress_enabled,
                 deadline_reminder_enabled, failed_enabled,
                 milestones, deadline_reminder_days)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(user_id.to_string())
        .bind(defaults.achieved_enabled)
        .bind(defaults.progress_enabled)
        .bind(defaults.deadline_reminder_enabled)
        .bind(defaults.failed_enabled)
        .bind(serde_json::to_string(&defaults.milestones)?)
        .bind(serde_json::to_string(&defaults.deadline_reminder_days)?)
        .execute(&self.pool)
        .await?;

        Ok(defaults)
    }

    /// Overwrite the user's notification preferences
    pub async fn save_notification_preferences(
        &self,
        preferences: &NotificationPreferences,
    ) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO notification_preferences
                (user_id, achieved_enabled, progress_enabled,
                 deadline_reminder_enabled, failed_enabled,
                 milestones, deadline_reminder_days)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT(user_id) DO UPDATE SET
                achieved_enabled = excluded.achieved_enabled,
                progress_enabled = excluded.progress_enabled,
                deadline_reminder_enabled = excluded.deadline_reminder_enabled,
                failed_enabled = excluded.failed_enabled,
                milestones = excluded.milestones,
                deadline_reminder_days = excluded.deadline_reminder_days
            ",
        )
        .bind(preferences.user_id.to_string())
        .bind(preferences.achieved_enabled)
        .bind(preferences.progress_enabled)
        .bind(preferences.deadline_reminder_enabled)
        .bind(preferences.failed_enabled)
        .bind(serde_json::to_string(&preferences.milestones)?)
        .bind(serde_json::to_string(&preferences.deadline_reminder_days)?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_notification_preferences(
        &self,
        user_id: Uuid,
    ) -> Result<Option<NotificationPreferences>> {
        let row = sqlx::query(
            r"
            SELECT user_id, achieved_enabled, progress_enabled,
                   deadline_reminder_enabled, failed_enabled,
                   milestones, deadline_reminder_days
            FROM notification_preferences WHERE user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let user_id: String = row.get("user_id");
            let milestones: String = row.get("milestones");
            let deadline_reminder_days: String = row.get("deadline_reminder_days");

            Ok(NotificationPreferences {
                user_id: Uuid::parse_str(&user_id)?,
                achieved_enabled: row.get("achieved_enabled"),
                progress_enabled: row.get("progress_enabled"),
                deadline_reminder_enabled: row.get("deadline_reminder_enabled"),
                failed_enabled: row.get("failed_enabled"),
                milestones: serde_json::from_str(&milestones)?,
                deadline_reminder_days: serde_json::from_str(&deadline_reminder_days)?,
            })
        })
        .transpose()
    }

    /// Register a device token, idempotent per (user, token)
    pub async fn create_device_token(&self, device: &DeviceToken) -> Result<()> {
        sqlx::query(
            r"
            INSERT OR IGNORE INTO device_tokens (id, user_id, token, platform, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(device.id.to_string())
        .bind(device.user_id.to_string())
        .bind(&device.token)
        .bind(&device.platform)
        .bind(device.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// List a user's device tokens
    pub async fn list_device_tokens(&self, user_id: Uuid) -> Result<Vec<DeviceToken>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, token, platform, created_at
            FROM device_tokens WHERE user_id = $1
            ORDER BY created_at
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                let user_id: String = row.get("user_id");
                Ok(DeviceToken {
                    id: Uuid::parse_str(&id)?,
                    user_id: Uuid::parse_str(&user_id)?,
                    token: row.get("token"),
                    platform: row.get("platform"),
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }

    /// Delete an owned device token row. Returns false if not found.
    pub async fn delete_device_token(&self, user_id: Uuid, device_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM device_tokens WHERE id = $1 AND user_id = $2")
            .bind(device_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a token string the push provider reported as invalid
    pub async fn prune_device_token(&self, user_id: Uuid, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM device_tokens WHERE user_id = $1 AND token = $2")
            .bind(user_id.to_string())
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
