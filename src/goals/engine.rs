// ABOUTME: Goal progress evaluation engine with metric dispatch and status transitions
// ABOUTME: Computes current values per goal type, detects milestones, and persists progress

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

//! Progress evaluator
//!
//! Given a goal, computes its current metric value from the relevant data
//! source, updates the cached progress fields, and detects status
//! transitions. Each of the goal types maps to one metric computation,
//! selected by an exhaustive match, scoped to the owning user and the
//! window [start_date, min(end_date, now)].

use super::notifier::{GoalEvent, GoalNotifier};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Goal, GoalStatus, GoalType};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Evaluates goal progress and drives status transitions
pub struct ProgressEvaluator {
    database: Database,
    notifier: GoalNotifier,
}

impl ProgressEvaluator {
    /// Create an evaluator over the given notifier
    #[must_use]
    pub fn new(database: Database, notifier: GoalNotifier) -> Self {
        Self { database, notifier }
    }

    /// Evaluate all of a user's active goals, isolating per-goal errors so
    /// one misconfigured goal never blocks the rest of the batch
    pub async fn evaluate_user_goals(&self, user_id: Uuid) {
        let goals = match self.database.list_active_goals(user_id).await {
            Ok(goals) => goals,
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Failed to load goals for evaluation");
                return;
            }
        };

        for goal in goals {
            if let Err(e) = self.update_progress(&goal).await {
                error!(goal_id = %goal.id, error = %e, "Goal evaluation failed");
            }
        }
    }

    /// Evaluate one goal: compute the metric, persist progress fields, run
    /// status transitions, and hand threshold events to the notifier.
    /// Terminal goals are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error for misconfigured goals (missing exercise reference
    /// on an exercise-scoped type) or failed database operations.
    pub async fn update_progress(&self, goal: &Goal) -> AppResult<Goal> {
        if goal.status.is_terminal() {
            return Ok(goal.clone());
        }

        // Zero or negative targets cannot be evaluated; leave the goal
        // untouched rather than divide by zero
        if goal.target_value <= 0.0 {
            warn!(goal_id = %goal.id, target = goal.target_value, "Goal target not evaluable");
            return Ok(goal.clone());
        }

        let now = Utc::now();
        let (start, end) = goal.window(now);

        let current_value = self.compute_value(goal, start, end).await?.max(0.0);
        #[allow(clippy::cast_possible_truncation)]
        let progress_percentage = (current_value / goal.target_value * 100.0).round() as i64;

        let mut updated = goal.clone();
        updated.current_value = current_value;
        updated.progress_percentage = progress_percentage;
        updated.updated_at = now;

        if current_value >= goal.target_value {
            updated.status = GoalStatus::Completed;
            updated.completed_at = Some(now);
            updated.achieved_value = Some(current_value);
        } else if goal.end_date.is_some_and(|deadline| now > deadline) {
            // Wrong-direction movement alone never fails a goal early; only
            // a passed deadline with the target unmet does
            updated.status = GoalStatus::Failed;
        }

        if updated.status == GoalStatus::Active {
            self.check_milestone(&mut updated).await?;
            self.check_deadline_reminder(&mut updated, now).await?;
        }

        self.database.save_goal_progress(&updated).await?;

        match updated.status {
            GoalStatus::Completed => {
                self.notifier.notify(&updated, &GoalEvent::Achieved).await?;
            }
            GoalStatus::Failed => {
                self.notifier.notify(&updated, &GoalEvent::Failed).await?;
            }
            GoalStatus::Active | GoalStatus::Cancelled => {}
        }

        debug!(
            goal_id = %updated.id,
            current = updated.current_value,
            percentage = updated.progress_percentage,
            status = %updated.status,
            "Goal evaluated"
        );

        Ok(updated)
    }

    /// Notify the highest newly-crossed configured milestone, if any, and
    /// persist it as the new high-water mark
    async fn check_milestone(&self, goal: &mut Goal) -> AppResult<()> {
        let preferences = self
            .database
            .get_or_create_notification_preferences(goal.user_id)
            .await?;

        let Some(milestone) = crossed_milestone(
            &preferences.milestones,
            goal.progress_percentage,
            goal.last_notified_milestone,
        ) else {
            return Ok(());
        };

        if self
            .notifier
            .notify(goal, &GoalEvent::Progress { milestone })
            .await?
        {
            goal.last_notified_milestone = Some(milestone);
        }

        Ok(())
    }

    /// Send a deadline reminder when days-until-deadline matches one of the
    /// configured offsets and none was sent today
    async fn check_deadline_reminder(&self, goal: &mut Goal, now: DateTime<Utc>) -> AppResult<()> {
        let Some(end_date) = goal.end_date else {
            return Ok(());
        };

        let days_left = (end_date.date_naive() - now.date_naive()).num_days();
        if days_left < 0 {
            return Ok(());
        }

        let preferences = self
            .database
            .get_or_create_notification_preferences(goal.user_id)
            .await?;

        if !preferences.deadline_reminder_days.contains(&days_left) {
            return Ok(());
        }

        let reminded_today = goal
            .last_deadline_reminder_at
            .is_some_and(|at| at.date_naive() == now.date_naive());
        if reminded_today {
            return Ok(());
        }

        if self
            .notifier
            .notify(goal, &GoalEvent::DeadlineReminder { days_left })
            .await?
        {
            goal.last_deadline_reminder_at = Some(now);
        }

        Ok(())
    }

    /// Compute the current metric value for a goal over the window
    async fn compute_value(
        &self,
        goal: &Goal,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<f64> {
        let user_id = goal.user_id;
        let db = &self.database;

        let value = match goal.goal_type {
            GoalType::TotalWorkouts => {
                db.count_workouts_in_window(user_id, start, end, false).await? as f64
            }
            GoalType::CompletedWorkouts => {
                db.count_workouts_in_window(user_id, start, end, true).await? as f64
            }
            GoalType::TargetWeight => db
                .latest_weight_in_window(user_id, start, end)
                .await?
                .unwrap_or(0.0),
            GoalType::WeightLoss => {
                let baseline = db.baseline_weight(user_id, start).await?;
                let latest = db.latest_weight_in_window(user_id, start, end).await?;
                match (baseline, latest) {
                    (Some(baseline), Some(latest)) => baseline - latest,
                    _ => 0.0,
                }
            }
            GoalType::WeightGain => {
                let baseline = db.baseline_weight(user_id, start).await?;
                let latest = db.latest_weight_in_window(user_id, start, end).await?;
                match (baseline, latest) {
                    (Some(baseline), Some(latest)) => latest - baseline,
                    _ => 0.0,
                }
            }
            GoalType::TotalVolume => db.volume_in_window(user_id, start, end).await?,
            GoalType::WeeklyVolume => {
                let volume = db.volume_in_window(user_id, start, end).await?;
                volume / elapsed_weeks(start, end)
            }
            GoalType::TotalTrainingTime => {
                db.training_minutes_in_window(user_id, start, end).await?
            }
            GoalType::WeeklyTrainingTime => {
                let minutes = db.training_minutes_in_window(user_id, start, end).await?;
                minutes / elapsed_weeks(start, end)
            }
            GoalType::TrainingFrequency => {
                let count = db.count_workouts_in_window(user_id, start, end, false).await?;
                count as f64 / elapsed_weeks(start, end)
            }
            GoalType::TrainingStreak => {
                let dates = db.workout_completion_dates(user_id).await?;
                consecutive_day_streak(&dates, Utc::now().date_naive()) as f64
            }
            GoalType::ExerciseMaxWeight => {
                let exercise_id = self.require_exercise(goal)?;
                db.exercise_max_weight(user_id, exercise_id, start, end).await?
            }
            GoalType::ExerciseMaxReps => {
                let exercise_id = self.require_exercise(goal)?;
                db.exercise_max_reps(user_id, exercise_id, start, end).await?
            }
            GoalType::ExerciseVolume => {
                let exercise_id = self.require_exercise(goal)?;
                db.exercise_volume(user_id, exercise_id, start, end).await?
            }
        };

        Ok(value)
    }

    /// Exercise-scoped goals must carry an exercise reference; a missing
    /// one is a fatal configuration error for this goal only
    fn require_exercise(&self, goal: &Goal) -> AppResult<Uuid> {
        goal.exercise_id.ok_or_else(|| {
            AppError::invalid_input(format!(
                "Goal {} of type {} has no exercise reference",
                goal.id, goal.goal_type
            ))
        })
    }
}

/// Weeks elapsed in the window, floored at one so short windows do not
/// inflate weekly averages
fn elapsed_weeks(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    ((end - start).num_days() as f64 / 7.0).max(1.0)
}

/// The highest configured milestone at or below the current progress that
/// exceeds the previously-notified one
fn crossed_milestone(milestones: &[i64], progress: i64, last_notified: Option<i64>) -> Option<i64> {
    milestones
        .iter()
        .copied()
        .filter(|&m| progress >= m && last_notified.is_none_or(|last| last < m))
        .max()
}

/// Consecutive-day streak over distinct completion dates (newest first),
/// valid only when the streak ends today or yesterday
fn consecutive_day_streak(dates: &[NaiveDate], today: NaiveDate) -> i64 {
    let Some(&latest) = dates.first() else {
        return 0;
    };
    if (today - latest).num_days() > 1 {
        return 0;
    }

    let mut streak = 1;
    let mut previous = latest;
    for &date in &dates[1..] {
        if (previous - date).num_days() == 1 {
            streak += 1;
            previous = date;
        } else {
            break;
        }
    }

    streak
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_crossed_milestone_first_crossing() {
        let milestones = [25, 50, 75, 90];
        assert_eq!(crossed_milestone(&milestones, 30, None), Some(25));
        assert_eq!(crossed_milestone(&milestones, 80, None), Some(75));
        assert_eq!(crossed_milestone(&milestones, 10, None), None);
    }

    #[test]
    fn test_crossed_milestone_respects_high_water_mark() {
        let milestones = [25, 50, 75, 90];
        assert_eq!(crossed_milestone(&milestones, 80, Some(75)), None);
        assert_eq!(crossed_milestone(&milestones, 80, Some(50)), Some(75));
        assert_eq!(crossed_milestone(&milestones, 95, Some(75)), Some(90));
    }

    #[test]
    fn test_streak_ending_today() {
        let dates = [date(2026, 8, 29), date(2026, 8, 28), date(2026, 8, 27)];
        assert_eq!(consecutive_day_streak(&dates, date(2026, 8, 29)), 3);
    }

    #[test]
    fn test_streak_ending_yesterday_still_counts() {
        let dates = [date(2026, 8, 28), date(2026, 8, 27)];
        assert_eq!(consecutive_day_streak(&dates, date(2026, 8, 29)), 2);
    }

    #[test]
    fn test_streak_broken_by_gap() {
        let dates = [date(2026, 8, 29), date(2026, 8, 27), date(2026, 8, 26)];
        assert_eq!(consecutive_day_streak(&dates, date(2026, 8, 29)), 1);
    }

    #[test]
    fn test_streak_stale_is_zero() {
        let dates = [date(2026, 8, 25), date(2026, 8, 24)];
        assert_eq!(consecutive_day_streak(&dates, date(2026, 8, 29)), 0);
        assert_eq!(consecutive_day_streak(&[], date(2026, 8, 29)), 0);
    }

    #[test]
    fn test_elapsed_weeks_floor() {
        let now = Utc::now();
        assert!((elapsed_weeks(now - chrono::Duration::days(3), now) - 1.0).abs() < f64::EPSILON);
        assert!((elapsed_weeks(now - chrono::Duration::days(14), now) - 2.0).abs() < f64::EPSILON);
    }
}
