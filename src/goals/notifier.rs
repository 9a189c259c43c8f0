// ABOUTME: Goal notification dedup and preference gating
// ABOUTME: Records the dedup row before delivery for at-most-once semantics

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

//! Notification deduplicator and preference gate
//!
//! For a computed goal event, decides whether to create a dedup record and
//! attempt delivery: the user's preference flag must be enabled and no
//! record may exist for the same (goal, type, milestone) key. The record is
//! inserted before the delivery attempt, so a failed delivery is not
//! retried; a missed notification is accepted over a duplicate one.

use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{Goal, GoalNotificationType};
use crate::notifications::{PushDispatcher, PushMessage};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// A notification-worthy goal event computed by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalEvent {
    /// The goal reached its target
    Achieved,
    /// Progress crossed a configured milestone threshold
    Progress { milestone: i64 },
    /// The deadline is a configured number of days away
    DeadlineReminder { days_left: i64 },
    /// The deadline passed with the target unmet
    Failed,
}

impl GoalEvent {
    /// The notification type this event records as
    #[must_use]
    pub const fn notification_type(&self) -> GoalNotificationType {
        match self {
            Self::Achieved => GoalNotificationType::Achieved,
            Self::Progress { .. } => GoalNotificationType::Progress,
            Self::DeadlineReminder { .. } => GoalNotificationType::DeadlineReminder,
            Self::Failed => GoalNotificationType::Failed,
        }
    }

    /// The milestone component of the dedup key. Progress events carry the
    /// threshold, deadline reminders the day offset, the rest nothing.
    #[must_use]
    pub const fn milestone(&self) -> Option<i64> {
        match self {
            Self::Progress { milestone } => Some(*milestone),
            Self::DeadlineReminder { days_left } => Some(*days_left),
            Self::Achieved | Self::Failed => None,
        }
    }

    /// Build the push payload for this event
    #[must_use]
    pub fn message(&self, goal: &Goal) -> PushMessage {
        let (title, body) = match self {
            Self::Achieved => (
                "Goal achieved".to_string(),
                format!("You reached your goal \"{}\"", goal.title),
            ),
            Self::Progress { milestone } => (
                format!("{milestone}% there"),
                format!("Your goal \"{}\" is {milestone}% complete", goal.title),
            ),
            Self::DeadlineReminder { days_left } => {
                let days = if *days_left == 1 {
                    "1 day".to_string()
                } else {
                    format!("{days_left} days")
                };
                (
                    format!("{days} left"),
                    format!("Your goal \"{}\" ends in {days}", goal.title),
                )
            }
            Self::Failed => (
                "Goal not reached".to_string(),
                format!("The deadline for \"{}\" has passed", goal.title),
            ),
        };

        PushMessage {
            title,
            body,
            data: json!({
                "goal_id": goal.id,
                "notification_type": self.notification_type().as_str(),
                "progress_percentage": goal.display_progress(),
            }),
        }
    }
}

/// Gate and dedup layer in front of push delivery
pub struct GoalNotifier {
    database: Database,
    dispatcher: Arc<dyn PushDispatcher>,
}

impl GoalNotifier {
    /// Create a notifier over the given dispatcher
    #[must_use]
    pub fn new(database: Database, dispatcher: Arc<dyn PushDispatcher>) -> Self {
        Self {
            database,
            dispatcher,
        }
    }

    /// Record and dispatch an event if the preference gate and dedup ledger
    /// both allow it. Returns true when a new dedup record was created.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails. Delivery errors are
    /// logged and swallowed; the dedup record stands regardless.
    pub async fn notify(&self, goal: &Goal, event: &GoalEvent) -> AppResult<bool> {
        let preferences = self
            .database
            .get_or_create_notification_preferences(goal.user_id)
            .await?;

        if !preferences.is_enabled(event.notification_type()) {
            debug!(
                goal_id = %goal.id,
                notification_type = event.notification_type().as_str(),
                "Notification suppressed by user preference"
            );
            return Ok(false);
        }

        let recorded = self
            .database
            .try_record_goal_notification(goal.id, event.notification_type(), event.milestone())
            .await?;

        if !recorded {
            return Ok(false);
        }

        // The dedup row is committed before delivery: at-most-once
        let message = event.message(goal);
        if let Err(e) = self.dispatcher.dispatch(goal.user_id, &message).await {
            warn!(
                goal_id = %goal.id,
                user_id = %goal.user_id,
                error = %e,
                "Push delivery failed, notification record kept"
            );
        }

        Ok(true)
    }
}
