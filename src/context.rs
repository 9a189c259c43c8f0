// ABOUTME: Shared server resources for dependency injection into route handlers
// ABOUTME: Bundles the database, auth manager, goal engine, and push dispatcher

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

//! Shared server state handed to every route via axum `State`

use crate::auth::AuthManager;
use crate::database::Database;
use crate::goals::engine::ProgressEvaluator;
use crate::goals::notifier::GoalNotifier;
use crate::notifications::PushDispatcher;
use crate::services::{ProgramService, ShareService};
use std::sync::Arc;

/// Aggregated server dependencies
pub struct ServerResources {
    pub database: Database,
    pub auth_manager: AuthManager,
    pub evaluator: ProgressEvaluator,
    pub programs: ProgramService,
    pub shares: ShareService,
}

impl ServerResources {
    /// Wire up resources around a database, auth manager, and dispatcher
    #[must_use]
    pub fn new(
        database: Database,
        auth_manager: AuthManager,
        dispatcher: Arc<dyn PushDispatcher>,
    ) -> Self {
        let notifier = GoalNotifier::new(database.clone(), dispatcher);
        let evaluator = ProgressEvaluator::new(database.clone(), notifier);
        let programs = ProgramService::new(database.clone());
        let shares = ShareService::new(database.clone());

        Self {
            database,
            auth_manager,
            evaluator,
            programs,
            shares,
        }
    }
}
