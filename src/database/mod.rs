// ABOUTME: Database access layer built on SQLite with per-domain query modules
// ABOUTME: Owns the connection pool, runs migrations, and scopes every query by user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

//! # Database Management
//!
//! This module provides database functionality for the TrainTrack server.
//! Each domain (users, workouts, goals, ...) contributes an `impl Database`
//! block in its own file, including its table migrations. All user-owned
//! queries are scoped by the owning user id so rows belonging to another
//! user behave as if they do not exist.

mod cycles;
mod exercises;
mod goals;
mod metrics;
mod notifications;
mod programs;
mod shares;
mod users;
mod workouts;

pub use goals::GoalStatistics;
pub use workouts::WorkoutTotals;

use anyhow::Result;
use sqlx::{Pool, Sqlite, SqlitePool};

/// Database manager for all persisted state
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or a
    /// migration fails.
    pub async fn new(database_url: &str) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:")
            && !database_url.contains(":memory:")
        {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        let pool = SqlitePool::connect(&connection_options).await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any table or index creation fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&self.pool)
            .await?;

        self.migrate_users().await?;
        self.migrate_exercises().await?;
        self.migrate_workouts().await?;
        self.migrate_metrics().await?;
        self.migrate_cycles().await?;
        self.migrate_programs().await?;
        self.migrate_shares().await?;
        self.migrate_goals().await?;
        self.migrate_notifications().await?;

        Ok(())
    }
}
