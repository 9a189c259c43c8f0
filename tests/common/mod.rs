// ABOUTME: Shared test harness with a file-backed database and recording dispatcher
// ABOUTME: Provides fixture builders for users, goals, and workout data

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

// Not every test binary uses every helper
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};
use traintrack::database::Database;
use traintrack::errors::AppResult;
use traintrack::goals::{GoalNotifier, ProgressEvaluator};
use traintrack::models::{Goal, GoalStatus, GoalType, User, Workout, WorkoutSet};
use traintrack::notifications::{PushDispatcher, PushMessage};
use uuid::Uuid;

/// A migrated database backed by a temp file, kept alive with its directory
pub struct TestDb {
    pub database: Database,
    _dir: tempfile::TempDir,
}

pub async fn test_db() -> TestDb {
    let dir = tempfile::tempdir().expect("create temp dir");
    let url = format!("sqlite:{}", dir.path().join("test.db").display());
    let database = Database::new(&url).await.expect("open test database");
    TestDb {
        database,
        _dir: dir,
    }
}

/// Dispatcher that records every message instead of delivering it
#[derive(Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<(Uuid, PushMessage)>>,
}

impl RecordingDispatcher {
    pub fn sent(&self) -> Vec<(Uuid, PushMessage)> {
        self.sent.lock().expect("dispatcher lock").clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .map(|(_, message)| message.title)
            .collect()
    }
}

#[async_trait]
impl PushDispatcher for RecordingDispatcher {
    async fn dispatch(&self, user_id: Uuid, message: &PushMessage) -> AppResult<()> {
        self.sent
            .lock()
            .expect("dispatcher lock")
            .push((user_id, message.clone()));
        Ok(())
    }
}

/// Build an evaluator over the database and a fresh recording dispatcher
pub fn test_evaluator(database: &Database) -> (ProgressEvaluator, Arc<RecordingDispatcher>) {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let notifier = GoalNotifier::new(database.clone(), dispatcher.clone());
    (ProgressEvaluator::new(database.clone(), notifier), dispatcher)
}

pub async fn create_user(database: &Database) -> User {
    let user = User::new(
        format!("{}@example.com", Uuid::new_v4()),
        "not-a-real-hash".into(),
        None,
    );
    database.create_user(&user).await.expect("create user");
    user
}

/// An active goal with sane defaults, started 30 days ago
pub fn goal_fixture(user_id: Uuid, goal_type: GoalType, target_value: f64) -> Goal {
    let now = Utc::now();
    Goal {
        id: Uuid::new_v4(),
        user_id,
        goal_type,
        title: "Test goal".into(),
        description: None,
        target_value,
        start_date: now - Duration::days(30),
        end_date: None,
        exercise_id: None,
        status: GoalStatus::Active,
        current_value: 0.0,
        progress_percentage: 0,
        last_notified_milestone: None,
        last_deadline_reminder_at: None,
        completed_at: None,
        achieved_value: None,
        cancelled_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// Insert a finished workout that started `days_ago` days ago
pub async fn finished_workout(database: &Database, user_id: Uuid, days_ago: i64) -> Workout {
    let started = Utc::now() - Duration::days(days_ago);
    workout_at(database, user_id, started, Some(started + Duration::minutes(60))).await
}

pub async fn workout_at(
    database: &Database,
    user_id: Uuid,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
) -> Workout {
    let workout = Workout {
        id: Uuid::new_v4(),
        user_id,
        title: "Session".into(),
        notes: None,
        started_at,
        finished_at,
        created_at: started_at,
    };
    database.create_workout(&workout).await.expect("create workout");
    workout
}

/// Log a set in a workout against an exercise
pub async fn log_set(
    database: &Database,
    user_id: Uuid,
    workout_id: Uuid,
    exercise_id: Uuid,
    weight: f64,
    reps: i64,
) {
    let set = WorkoutSet {
        id: Uuid::new_v4(),
        workout_id,
        exercise_id,
        weight,
        reps,
        set_number: 1,
        created_at: Utc::now(),
    };
    assert!(database
        .create_workout_set(user_id, &set)
        .await
        .expect("create set"));
}
