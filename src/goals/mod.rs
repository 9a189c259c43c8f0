// ABOUTME: Goal lifecycle and progress-evaluation engine module
// ABOUTME: Hosts the metric evaluator and the notification dedup/preference gate

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

//! # Goal Engine
//!
//! The engine owns the goal state machine: it computes the current metric
//! value for a goal from workout/metric/exercise data, updates the cached
//! progress fields, and drives the one-way transitions
//! `active -> completed` and `active -> failed`. Cancellation is
//! user-initiated and handled at the database layer. Milestone, achieved,
//! deadline, and failed notifications go through the notifier, which
//! applies the per-user preference gate and the dedup ledger before any
//! delivery attempt.

/// Progress evaluation and status transitions
pub mod engine;

/// Notification dedup, preference gating, and dispatch hand-off
pub mod notifier;

pub use engine::ProgressEvaluator;
pub use notifier::{GoalEvent, GoalNotifier};
