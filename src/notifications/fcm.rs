// ABOUTME: Firebase Cloud Messaging HTTP v1 client with service-account auth
// ABOUTME: Signs OAuth JWT assertions, fans out per device token, prunes dead tokens

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

//! # FCM HTTP v1 Client
//!
//! Delivery flow: a short-lived OAuth2 access token is obtained by signing a
//! JWT assertion with the service-account private key (RS256) and exchanging
//! it at the token endpoint. The token is cached until shortly before
//! expiry. Messages are then POSTed to the HTTP v1 `messages:send` endpoint,
//! one request per registered device token. A token the provider reports as
//! unregistered is pruned from the database; other per-token failures are
//! logged and do not affect the remaining tokens.

use super::{PushDispatcher, PushMessage};
use crate::config::environment::PushConfig;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

/// OAuth2 scope for FCM sends
const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// Assertion lifetime in seconds
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Refresh the cached access token this long before it expires
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Service-account key file contents (the fields FCM auth needs)
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

/// JWT assertion claims for the OAuth2 service-account flow
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// FCM HTTP v1 push client
pub struct FcmClient {
    http: reqwest::Client,
    database: Database,
    project_id: String,
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl FcmClient {
    /// Build a client from server configuration, loading the key file
    ///
    /// # Errors
    ///
    /// Returns an error if the key file cannot be read or the private key
    /// is not valid RSA PEM.
    pub fn from_config(config: &PushConfig, database: Database) -> AppResult<Self> {
        let raw = std::fs::read_to_string(&config.credentials_path).map_err(|e| {
            AppError::config(format!(
                "Cannot read FCM credentials at {}: {e}",
                config.credentials_path.display()
            ))
        })?;

        let key: ServiceAccountKey = serde_json::from_str(&raw)
            .map_err(|e| AppError::config(format!("Malformed FCM credentials file: {e}")))?;

        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| AppError::config(format!("Invalid FCM private key: {e}")))?;

        Ok(Self {
            http: reqwest::Client::new(),
            database,
            project_id: config.project_id.clone(),
            key,
            signing_key,
            cached_token: Arc::new(RwLock::new(None)),
        })
    }

    /// Get a valid access token, refreshing through the OAuth2 flow when
    /// the cached one is absent or close to expiry
    async fn access_token(&self) -> AppResult<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if Utc::now() + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) < token.expires_at {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let now = Utc::now();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: FCM_SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| AppError::internal(format!("Failed to sign FCM assertion: {e}")))?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::external_service("fcm", format!("Token exchange failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::external_service(
                "fcm",
                format!("Token exchange returned {status}: {body}"),
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::external_service("fcm", format!("Bad token response: {e}")))?;

        let cached = CachedToken {
            access_token: token.access_token.clone(),
            expires_at: now + Duration::seconds(token.expires_in),
        };
        *self.cached_token.write().await = Some(cached);

        Ok(token.access_token)
    }

    /// Send one message to one device token. Returns true when the token
    /// should be pruned because the provider rejected it as dead.
    async fn send_to_token(
        &self,
        access_token: &str,
        device_token: &str,
        message: &PushMessage,
    ) -> AppResult<bool> {
        let url = format!(
            "https://fcm.googleapis.com/v1/projects/{}/messages:send",
            self.project_id
        );

        let payload = json!({
            "message": {
                "token": device_token,
                "notification": {
                    "title": message.title,
                    "body": message.body,
                },
                "data": message.data,
            }
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::external_service("fcm", format!("Send failed: {e}")))?;

        if response.status().is_success() {
            return Ok(false);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if is_dead_token_response(status, &body) {
            return Ok(true);
        }

        Err(AppError::external_service(
            "fcm",
            format!("Send returned {status}: {body}"),
        ))
    }
}

/// Whether a failed send means the device token should be pruned.
/// UNREGISTERED (404) means the installation no longer exists;
/// INVALID_ARGUMENT covers malformed or stale tokens.
fn is_dead_token_response(status: reqwest::StatusCode, body: &str) -> bool {
    status == reqwest::StatusCode::NOT_FOUND
        || body.contains("UNREGISTERED")
        || body.contains("INVALID_ARGUMENT")
}

#[async_trait]
impl PushDispatcher for FcmClient {
    async fn dispatch(&self, user_id: Uuid, message: &PushMessage) -> AppResult<()> {
        let devices = self.database.list_device_tokens(user_id).await?;
        if devices.is_empty() {
            debug!(user_id = %user_id, "No registered devices, skipping push");
            return Ok(());
        }

        let access_token = self.access_token().await?;

        for device in devices {
            match self
                .send_to_token(&access_token, &device.token, message)
                .await
            {
                Ok(false) => {}
                Ok(true) => {
                    warn!(user_id = %user_id, "Pruning device token rejected by FCM");
                    self.database.prune_device_token(user_id, &device.token).await?;
                }
                // One token's failure never blocks the others
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "Push delivery failed for one device");
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_unregistered_token_is_dead() {
        assert!(is_dead_token_response(StatusCode::NOT_FOUND, ""));
        assert!(is_dead_token_response(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"status":"INVALID_ARGUMENT"}}"#
        ));
        assert!(is_dead_token_response(
            StatusCode::GONE,
            r#"{"error":{"details":[{"errorCode":"UNREGISTERED"}]}}"#
        ));
    }

    #[test]
    fn test_transient_failures_are_not_dead() {
        assert!(!is_dead_token_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":{"status":"INTERNAL"}}"#
        ));
        assert!(!is_dead_token_response(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"status":"QUOTA_EXCEEDED"}}"#
        ));
    }
}
