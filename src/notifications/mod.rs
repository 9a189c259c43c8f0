// ABOUTME: Push notification delivery abstraction and implementations
// ABOUTME: Defines the dispatcher trait, the log-only fallback, and the FCM client

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

//! # Push Notification Delivery
//!
//! The goal engine hands a `(title, body, data)` triple to a
//! [`PushDispatcher`]; the dispatcher fans out to the user's registered
//! device tokens and prunes tokens the provider reports as invalid. The
//! engine knows nothing about tokens or the delivery protocol.

/// Firebase Cloud Messaging HTTP v1 client
pub mod fcm;

use crate::errors::AppResult;
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

/// A notification payload handed to the delivery layer
#[derive(Debug, Clone)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    /// Structured payload forwarded to the client application
    pub data: Value,
}

/// Delivery backend for push notifications
#[async_trait]
pub trait PushDispatcher: Send + Sync {
    /// Deliver a message to all of the user's registered devices.
    ///
    /// Per-device failures are isolated inside the implementation; an error
    /// from this method means the whole dispatch could not be attempted.
    async fn dispatch(&self, user_id: Uuid, message: &PushMessage) -> AppResult<()>;
}

/// Log-only dispatcher used when FCM is not configured
pub struct LogDispatcher;

#[async_trait]
impl PushDispatcher for LogDispatcher {
    async fn dispatch(&self, user_id: Uuid, message: &PushMessage) -> AppResult<()> {
        info!(
            user_id = %user_id,
            title = %message.title,
            "Push delivery disabled, dropping notification"
        );
        Ok(())
    }
}
