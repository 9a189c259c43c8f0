// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, defaults, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

//! Environment-based configuration management for production deployment

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default HTTP port when `HTTP_PORT` is unset
const DEFAULT_HTTP_PORT: u16 = 8081;

/// Default JWT expiry in hours when `JWT_EXPIRY_HOURS` is unset
const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Push notification configuration (absent disables FCM delivery)
    pub push: Option<PushConfig>,
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL (`SQLite` path, e.g. `sqlite:./data/traintrack.db`)
    pub url: String,
}

/// Authentication settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign bearer tokens
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
}

/// Firebase Cloud Messaging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// GCP project id for the FCM HTTP v1 endpoint
    pub project_id: String,
    /// Path to the service-account key JSON file
    pub credentials_path: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT_SECRET` is missing or a numeric variable
    /// fails to parse.
    pub fn from_env() -> Result<Self> {
        let http_port = match env::var("HTTP_PORT") {
            Ok(port) => port
                .parse::<u16>()
                .context("HTTP_PORT must be a valid port number")?,
            Err(_) => DEFAULT_HTTP_PORT,
        };

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./data/traintrack.db".into());

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let jwt_expiry_hours = match env::var("JWT_EXPIRY_HOURS") {
            Ok(hours) => hours
                .parse::<i64>()
                .context("JWT_EXPIRY_HOURS must be an integer")?,
            Err(_) => DEFAULT_JWT_EXPIRY_HOURS,
        };

        // FCM is optional: both variables must be present to enable delivery
        let push = match (env::var("FCM_PROJECT_ID"), env::var("FCM_CREDENTIALS_PATH")) {
            (Ok(project_id), Ok(path)) => Some(PushConfig {
                project_id,
                credentials_path: PathBuf::from(path),
            }),
            _ => None,
        };

        Ok(Self {
            http_port,
            database: DatabaseConfig { url: database_url },
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours,
            },
            push,
        })
    }

    /// One-line summary for startup logging, with secrets elided
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "http_port={} database={} jwt_expiry_hours={} push={}",
            self.http_port,
            self.database.url,
            self.auth.jwt_expiry_hours,
            self.push
                .as_ref()
                .map_or_else(|| "disabled".into(), |p| p.project_id.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_elides_secret() {
        let config = ServerConfig {
            http_port: 8081,
            database: DatabaseConfig {
                url: "sqlite::memory:".into(),
            },
            auth: AuthConfig {
                jwt_secret: "super-secret".into(),
                jwt_expiry_hours: 24,
            },
            push: None,
        };

        let summary = config.summary();
        assert!(!summary.contains("super-secret"));
        assert!(summary.contains("push=disabled"));
    }
}
