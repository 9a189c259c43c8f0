// ABOUTME: Integration tests for the goal progress evaluator
// ABOUTME: Covers metric computation, status transitions, and notification dedup

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

mod common;

use chrono::{Duration, Utc};
use common::{create_user, finished_workout, goal_fixture, log_set, test_db, test_evaluator};
use traintrack::models::{
    BodyMetric, Exercise, GoalNotificationType, GoalStatus, GoalType, NotificationPreferences,
};
use uuid::Uuid;

#[tokio::test]
async fn completed_workouts_goal_reaches_target() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let (evaluator, dispatcher) = test_evaluator(&db.database);

    for days_ago in 1..=3 {
        finished_workout(&db.database, user.id, days_ago).await;
    }

    let goal = goal_fixture(user.id, GoalType::CompletedWorkouts, 3.0);
    db.database.create_goal(&goal).await.unwrap();

    let updated = evaluator.update_progress(&goal).await.unwrap();
    assert_eq!(updated.status, GoalStatus::Completed);
    assert!(updated.completed_at.is_some());
    assert_eq!(updated.achieved_value, Some(3.0));
    assert_eq!(updated.progress_percentage, 100);

    // The achieved notification was dispatched and recorded
    assert!(dispatcher.titles().contains(&"Goal achieved".to_string()));
    let notifications = db.database.list_goal_notifications(goal.id).await.unwrap();
    assert!(notifications
        .iter()
        .any(|n| n.notification_type == GoalNotificationType::Achieved));
}

#[tokio::test]
async fn unfinished_workouts_count_only_for_total() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let (evaluator, _) = test_evaluator(&db.database);

    finished_workout(&db.database, user.id, 2).await;
    common::workout_at(&db.database, user.id, Utc::now() - Duration::days(1), None).await;

    let total = goal_fixture(user.id, GoalType::TotalWorkouts, 10.0);
    db.database.create_goal(&total).await.unwrap();
    let total = evaluator.update_progress(&total).await.unwrap();
    assert!((total.current_value - 2.0).abs() < f64::EPSILON);

    let completed = goal_fixture(user.id, GoalType::CompletedWorkouts, 10.0);
    db.database.create_goal(&completed).await.unwrap();
    let completed = evaluator.update_progress(&completed).await.unwrap();
    assert!((completed.current_value - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn milestone_notified_once_per_threshold() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let (evaluator, dispatcher) = test_evaluator(&db.database);

    finished_workout(&db.database, user.id, 1).await;
    finished_workout(&db.database, user.id, 2).await;
    finished_workout(&db.database, user.id, 3).await;

    // 3 of 10 workouts: crosses the 25% milestone
    let goal = goal_fixture(user.id, GoalType::CompletedWorkouts, 10.0);
    db.database.create_goal(&goal).await.unwrap();

    let updated = evaluator.update_progress(&goal).await.unwrap();
    assert_eq!(updated.progress_percentage, 30);
    assert_eq!(updated.last_notified_milestone, Some(25));
    assert_eq!(dispatcher.titles(), vec!["25% there".to_string()]);

    // Re-evaluating at the same progress sends nothing new
    let again = evaluator.update_progress(&updated).await.unwrap();
    assert_eq!(again.last_notified_milestone, Some(25));
    assert_eq!(dispatcher.sent().len(), 1);

    // Jumping past 50 and 75 notifies only the highest newly-crossed one
    for days_ago in 4..=8 {
        finished_workout(&db.database, user.id, days_ago).await;
    }
    let jumped = evaluator.update_progress(&again).await.unwrap();
    assert_eq!(jumped.progress_percentage, 80);
    assert_eq!(jumped.last_notified_milestone, Some(75));
    assert_eq!(dispatcher.sent().len(), 2);
    assert_eq!(dispatcher.titles()[1], "75% there");
}

#[tokio::test]
async fn deadline_passed_fails_goal() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let (evaluator, dispatcher) = test_evaluator(&db.database);

    let mut goal = goal_fixture(user.id, GoalType::CompletedWorkouts, 5.0);
    goal.end_date = Some(Utc::now() - Duration::days(1));
    db.database.create_goal(&goal).await.unwrap();

    let updated = evaluator.update_progress(&goal).await.unwrap();
    assert_eq!(updated.status, GoalStatus::Failed);
    assert!(dispatcher.titles().contains(&"Goal not reached".to_string()));

    // Terminal goals are never re-evaluated
    let again = evaluator.update_progress(&updated).await.unwrap();
    assert_eq!(again.status, GoalStatus::Failed);
    assert_eq!(dispatcher.sent().len(), 1);
}

#[tokio::test]
async fn deadline_reminder_once_per_offset() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let (evaluator, dispatcher) = test_evaluator(&db.database);

    // Deadline 3 days out matches the default [7, 3, 1] offsets
    let mut goal = goal_fixture(user.id, GoalType::CompletedWorkouts, 100.0);
    goal.end_date = Some(Utc::now() + Duration::days(3));
    db.database.create_goal(&goal).await.unwrap();

    let updated = evaluator.update_progress(&goal).await.unwrap();
    assert!(updated.last_deadline_reminder_at.is_some());
    assert_eq!(dispatcher.titles(), vec!["3 days left".to_string()]);

    let again = evaluator.update_progress(&updated).await.unwrap();
    assert_eq!(dispatcher.sent().len(), 1);
    assert_eq!(again.status, GoalStatus::Active);
}

#[tokio::test]
async fn disabled_preference_suppresses_dispatch() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let (evaluator, dispatcher) = test_evaluator(&db.database);

    let mut preferences = NotificationPreferences::defaults(user.id);
    preferences.progress_enabled = false;
    db.database
        .save_notification_preferences(&preferences)
        .await
        .unwrap();

    finished_workout(&db.database, user.id, 1).await;
    let goal = goal_fixture(user.id, GoalType::CompletedWorkouts, 2.0);
    db.database.create_goal(&goal).await.unwrap();

    // 50%: would cross 25 and 50, but progress notifications are off
    let updated = evaluator.update_progress(&goal).await.unwrap();
    assert_eq!(updated.progress_percentage, 50);
    assert!(dispatcher.sent().is_empty());
    assert!(db
        .database
        .list_goal_notifications(goal.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn target_weight_uses_latest_entry() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let (evaluator, _) = test_evaluator(&db.database);

    for (days_ago, weight) in [(20, 78.0), (10, 79.5), (2, 81.0)] {
        let metric = BodyMetric {
            id: Uuid::new_v4(),
            user_id: user.id,
            weight,
            body_fat: None,
            recorded_at: Utc::now() - Duration::days(days_ago),
        };
        db.database.create_body_metric(&metric).await.unwrap();
    }

    let goal = goal_fixture(user.id, GoalType::TargetWeight, 80.0);
    db.database.create_goal(&goal).await.unwrap();

    let updated = evaluator.update_progress(&goal).await.unwrap();
    assert!((updated.current_value - 81.0).abs() < f64::EPSILON);
    assert_eq!(updated.status, GoalStatus::Completed);
}

#[tokio::test]
async fn weight_loss_never_fails_early_on_gain() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let (evaluator, _) = test_evaluator(&db.database);

    // Baseline 85 before the window, latest 87: moving the wrong way
    for (days_ago, weight) in [(40, 85.0), (5, 87.0)] {
        let metric = BodyMetric {
            id: Uuid::new_v4(),
            user_id: user.id,
            weight,
            body_fat: None,
            recorded_at: Utc::now() - Duration::days(days_ago),
        };
        db.database.create_body_metric(&metric).await.unwrap();
    }

    let goal = goal_fixture(user.id, GoalType::WeightLoss, 5.0);
    db.database.create_goal(&goal).await.unwrap();

    let updated = evaluator.update_progress(&goal).await.unwrap();
    assert_eq!(updated.status, GoalStatus::Active);
    assert!(updated.current_value.abs() < f64::EPSILON);
}

#[tokio::test]
async fn exercise_max_weight_scoped_to_exercise() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let (evaluator, _) = test_evaluator(&db.database);

    let bench = Exercise {
        id: Uuid::new_v4(),
        user_id: Some(user.id),
        name: "Bench Press".into(),
        muscle_group: Some("chest".into()),
        description: None,
        created_at: Utc::now(),
    };
    let squat = Exercise {
        id: Uuid::new_v4(),
        user_id: Some(user.id),
        name: "Squat".into(),
        muscle_group: Some("legs".into()),
        description: None,
        created_at: Utc::now(),
    };
    db.database.create_exercise(&bench).await.unwrap();
    db.database.create_exercise(&squat).await.unwrap();

    let workout = finished_workout(&db.database, user.id, 1).await;
    log_set(&db.database, user.id, workout.id, bench.id, 90.0, 5).await;
    log_set(&db.database, user.id, workout.id, squat.id, 140.0, 5).await;

    let mut goal = goal_fixture(user.id, GoalType::ExerciseMaxWeight, 100.0);
    goal.exercise_id = Some(bench.id);
    db.database.create_goal(&goal).await.unwrap();

    let updated = evaluator.update_progress(&goal).await.unwrap();
    assert!((updated.current_value - 90.0).abs() < f64::EPSILON);
    assert_eq!(updated.progress_percentage, 90);
    assert_eq!(updated.status, GoalStatus::Active);
}

#[tokio::test]
async fn exercise_goal_without_exercise_errors() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let (evaluator, _) = test_evaluator(&db.database);

    let goal = goal_fixture(user.id, GoalType::ExerciseVolume, 1000.0);
    db.database.create_goal(&goal).await.unwrap();

    assert!(evaluator.update_progress(&goal).await.is_err());
}

#[tokio::test]
async fn zero_target_left_untouched() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let (evaluator, dispatcher) = test_evaluator(&db.database);

    let mut goal = goal_fixture(user.id, GoalType::TotalWorkouts, 0.0);
    goal.target_value = 0.0;
    db.database.create_goal(&goal).await.unwrap();

    let updated = evaluator.update_progress(&goal).await.unwrap();
    assert_eq!(updated.status, GoalStatus::Active);
    assert_eq!(updated.progress_percentage, 0);
    assert!(dispatcher.sent().is_empty());
}

#[tokio::test]
async fn batch_evaluation_isolates_bad_goals() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let (evaluator, _) = test_evaluator(&db.database);

    finished_workout(&db.database, user.id, 1).await;

    // One misconfigured goal (exercise-scoped without an exercise) and one
    // healthy goal
    let broken = goal_fixture(user.id, GoalType::ExerciseMaxReps, 10.0);
    db.database.create_goal(&broken).await.unwrap();
    let healthy = goal_fixture(user.id, GoalType::CompletedWorkouts, 1.0);
    db.database.create_goal(&healthy).await.unwrap();

    evaluator.evaluate_user_goals(user.id).await;

    let healthy = db.database.get_goal(user.id, healthy.id).await.unwrap().unwrap();
    assert_eq!(healthy.status, GoalStatus::Completed);
}

#[tokio::test]
async fn cancel_only_from_active() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let (evaluator, _) = test_evaluator(&db.database);

    finished_workout(&db.database, user.id, 1).await;
    let goal = goal_fixture(user.id, GoalType::CompletedWorkouts, 1.0);
    db.database.create_goal(&goal).await.unwrap();

    let completed = evaluator.update_progress(&goal).await.unwrap();
    assert_eq!(completed.status, GoalStatus::Completed);

    // A completed goal cannot be cancelled
    assert!(db.database.cancel_goal(user.id, goal.id).await.unwrap().is_none());

    let active = goal_fixture(user.id, GoalType::CompletedWorkouts, 50.0);
    db.database.create_goal(&active).await.unwrap();
    let cancelled = db.database.cancel_goal(user.id, active.id).await.unwrap();
    assert_eq!(cancelled.unwrap().status, GoalStatus::Cancelled);
}

#[tokio::test]
async fn total_volume_sums_logged_sets() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let (evaluator, _) = test_evaluator(&db.database);

    let deadlift = Exercise {
        id: Uuid::new_v4(),
        user_id: Some(user.id),
        name: "Deadlift".into(),
        muscle_group: Some("back".into()),
        description: None,
        created_at: Utc::now(),
    };
    db.database.create_exercise(&deadlift).await.unwrap();

    // 100kg x 5 + 80kg x 10 = 1300kg moved
    let workout = finished_workout(&db.database, user.id, 1).await;
    log_set(&db.database, user.id, workout.id, deadlift.id, 100.0, 5).await;
    log_set(&db.database, user.id, workout.id, deadlift.id, 80.0, 10).await;

    let goal = goal_fixture(user.id, GoalType::TotalVolume, 1000.0);
    db.database.create_goal(&goal).await.unwrap();

    let updated = evaluator.update_progress(&goal).await.unwrap();
    assert!((updated.current_value - 1300.0).abs() < f64::EPSILON);
    assert_eq!(updated.status, GoalStatus::Completed);
    assert_eq!(updated.achieved_value, Some(1300.0));
}

#[tokio::test]
async fn training_time_accumulates_finished_minutes() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let (evaluator, _) = test_evaluator(&db.database);

    // Two hour-long sessions and one still running
    finished_workout(&db.database, user.id, 1).await;
    finished_workout(&db.database, user.id, 2).await;
    common::workout_at(&db.database, user.id, Utc::now() - Duration::days(3), None).await;

    let goal = goal_fixture(user.id, GoalType::TotalTrainingTime, 100.0);
    db.database.create_goal(&goal).await.unwrap();

    let updated = evaluator.update_progress(&goal).await.unwrap();
    assert!((updated.current_value - 120.0).abs() < 0.05);
    assert_eq!(updated.status, GoalStatus::Completed);
}

#[tokio::test]
async fn training_frequency_normalizes_by_elapsed_weeks() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let (evaluator, _) = test_evaluator(&db.database);

    for days_ago in 1..=6 {
        finished_workout(&db.database, user.id, days_ago).await;
    }

    // 6 workouts over a 30-day window: 6 / (30 / 7) = 1.4 per week
    let goal = goal_fixture(user.id, GoalType::TrainingFrequency, 2.0);
    db.database.create_goal(&goal).await.unwrap();

    let updated = evaluator.update_progress(&goal).await.unwrap();
    assert!((updated.current_value - 1.4).abs() < 1e-6);
    assert_eq!(updated.status, GoalStatus::Active);
}

#[tokio::test]
async fn training_streak_counts_consecutive_days() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let (evaluator, _) = test_evaluator(&db.database);

    // Today, yesterday, two days ago; then a gap
    for days_ago in 0..=2 {
        finished_workout(&db.database, user.id, days_ago).await;
    }
    finished_workout(&db.database, user.id, 5).await;

    let goal = goal_fixture(user.id, GoalType::TrainingStreak, 7.0);
    db.database.create_goal(&goal).await.unwrap();

    let updated = evaluator.update_progress(&goal).await.unwrap();
    assert!((updated.current_value - 3.0).abs() < f64::EPSILON);
    assert_eq!(updated.status, GoalStatus::Active);
}
