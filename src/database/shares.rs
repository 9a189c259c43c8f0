// ABOUTME: Cycle share link database operations
// ABOUTME: Stores UUID-keyed share tokens with activation flag and optional expiry

use super::Database;
use crate::models::CycleShare;
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the cycle shares table
    pub(super) async fn migrate_shares(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS cycle_shares (
                id TEXT PRIMARY KEY,
                cycle_id TEXT NOT NULL REFERENCES training_cycles(id) ON DELETE CASCADE,
                owner_user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                expires_at DATETIME,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_cycle_shares_cycle ON cycle_shares(cycle_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a share link
    pub async fn create_share(&self, share: &CycleShare) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO cycle_shares (id, cycle_id, owner_user_id, is_active, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(share.id.to_string())
        .bind(share.cycle_id.to_string())
        .bind(share.owner_user_id.to_string())
        .bind(share.is_active)
        .bind(share.expires_at)
        .bind(share.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a share by its token
    pub async fn get_share(&self, share_token: Uuid) -> Result<Option<CycleShare>> {
        let row = sqlx::query(
            r"
            SELECT id, cycle_id, owner_user_id, is_active, expires_at, created_at
            FROM cycle_shares WHERE id = $1
            ",
        )
        .bind(share_token.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_share(&row)).transpose()
    }

    /// Deactivate a share owned by the user. Returns false if not found.
    pub async fn deactivate_share(&self, owner_user_id: Uuid, share_token: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE cycle_shares SET is_active = 0 WHERE id = $1 AND owner_user_id = $2",
        )
        .bind(share_token.to_string())
        .bind(owner_user_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    fn row_to_share(row: &sqlx::sqlite::SqliteRow) -> Result<CycleShare> {
        let id: String = row.get("id");
        let cycle_id: String = row.get("cycle_id");
        let owner_user_id: String = row.get("owner_user_id");

        Ok(CycleShare {
            id: Uuid::parse_str(&id)?,
            cycle_id: Uuid::parse_str(&cycle_id)?,
            owner_user_id: Uuid::parse_str(&owner_user_id)?,
            is_active: row.get("is_active"),
            expires_at: row.get("expires_at"),
            created_at: row.get("created_at"),
        })
    }
}
