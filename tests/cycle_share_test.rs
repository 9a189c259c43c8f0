// ABOUTME: Integration tests for cycle share links and cross-account import
// ABOUTME: Covers token validity, expiry, revocation, and deep-copy semantics

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

mod common;

use chrono::{Duration, Utc};
use common::{create_user, test_db};
use traintrack::database::Database;
use traintrack::errors::ErrorCode;
use traintrack::models::{Exercise, PlanExercise, TrainingCycle, TrainingPlan, User};
use traintrack::services::ShareService;
use uuid::Uuid;

/// Build a cycle with one plan and one exercise slot for the owner
async fn seed_cycle(database: &Database, owner: &User) -> (TrainingCycle, Exercise) {
    let exercise = Exercise {
        id: Uuid::new_v4(),
        user_id: Some(owner.id),
        name: "Overhead Press".into(),
        muscle_group: Some("shoulders".into()),
        description: None,
        created_at: Utc::now(),
    };
    database.create_exercise(&exercise).await.unwrap();

    let cycle = TrainingCycle {
        id: Uuid::new_v4(),
        user_id: owner.id,
        name: "Strength block".into(),
        description: Some("Four week block".into()),
        position: 0,
        created_at: Utc::now(),
    };
    database.create_cycle(&cycle).await.unwrap();

    let plan = TrainingPlan {
        id: Uuid::new_v4(),
        cycle_id: cycle.id,
        name: "Press day".into(),
        day_of_week: Some(2),
        position: 0,
    };
    assert!(database.create_plan(owner.id, &plan).await.unwrap());

    let slot = PlanExercise {
        id: Uuid::new_v4(),
        plan_id: plan.id,
        exercise_id: exercise.id,
        target_sets: 5,
        target_reps: 3,
        target_weight: Some(60.0),
        position: 0,
    };
    assert!(database.create_plan_exercise(owner.id, &slot).await.unwrap());

    (cycle, exercise)
}

#[tokio::test]
async fn import_deep_copies_the_graph() {
    let db = test_db().await;
    let owner = create_user(&db.database).await;
    let importer = create_user(&db.database).await;
    let service = ShareService::new(db.database.clone());

    let (cycle, _) = seed_cycle(&db.database, &owner).await;
    let share = service.share_cycle(owner.id, cycle.id, None).await.unwrap();

    let imported = service.import(importer.id, share.id).await.unwrap();
    assert_eq!(imported.user_id, importer.id);
    assert_eq!(imported.name, "Strength block");
    assert_ne!(imported.id, cycle.id);

    let plans = db.database.list_plans(imported.id).await.unwrap();
    assert_eq!(plans.len(), 1);
    let slots = db.database.list_plan_exercises(plans[0].id).await.unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].target_weight, Some(60.0));

    // The owner's private exercise was copied into the importer's account
    let copy = db
        .database
        .find_exercise_by_name(importer.id, "Overhead Press")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(copy.user_id, Some(importer.id));
    assert_eq!(slots[0].exercise_id, copy.id);

    // The copies evolve independently
    assert!(db.database.delete_cycle(importer.id, imported.id).await.unwrap());
    assert!(db.database.get_cycle(owner.id, cycle.id).await.unwrap().is_some());
}

#[tokio::test]
async fn catalog_exercise_referenced_not_copied() {
    let db = test_db().await;
    let owner = create_user(&db.database).await;
    let importer = create_user(&db.database).await;
    let service = ShareService::new(db.database.clone());

    let catalog = Exercise {
        id: Uuid::new_v4(),
        user_id: None,
        name: "Pull Up".into(),
        muscle_group: Some("back".into()),
        description: None,
        created_at: Utc::now(),
    };
    db.database.create_exercise(&catalog).await.unwrap();

    let cycle = TrainingCycle {
        id: Uuid::new_v4(),
        user_id: owner.id,
        name: "Bodyweight".into(),
        description: None,
        position: 0,
        created_at: Utc::now(),
    };
    db.database.create_cycle(&cycle).await.unwrap();
    let plan = TrainingPlan {
        id: Uuid::new_v4(),
        cycle_id: cycle.id,
        name: "Day 1".into(),
        day_of_week: None,
        position: 0,
    };
    assert!(db.database.create_plan(owner.id, &plan).await.unwrap());
    let slot = PlanExercise {
        id: Uuid::new_v4(),
        plan_id: plan.id,
        exercise_id: catalog.id,
        target_sets: 3,
        target_reps: 8,
        target_weight: None,
        position: 0,
    };
    assert!(db.database.create_plan_exercise(owner.id, &slot).await.unwrap());

    let share = service.share_cycle(owner.id, cycle.id, None).await.unwrap();
    let imported = service.import(importer.id, share.id).await.unwrap();

    let plans = db.database.list_plans(imported.id).await.unwrap();
    let slots = db.database.list_plan_exercises(plans[0].id).await.unwrap();
    assert_eq!(slots[0].exercise_id, catalog.id);
}

#[tokio::test]
async fn expired_share_rejected() {
    let db = test_db().await;
    let owner = create_user(&db.database).await;
    let importer = create_user(&db.database).await;
    let service = ShareService::new(db.database.clone());

    let (cycle, _) = seed_cycle(&db.database, &owner).await;
    let share = service
        .share_cycle(owner.id, cycle.id, Some(Utc::now() - Duration::hours(1)))
        .await
        .unwrap();

    let err = service.import(importer.id, share.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceGone);
}

#[tokio::test]
async fn revoked_share_rejected() {
    let db = test_db().await;
    let owner = create_user(&db.database).await;
    let importer = create_user(&db.database).await;
    let service = ShareService::new(db.database.clone());

    let (cycle, _) = seed_cycle(&db.database, &owner).await;
    let share = service.share_cycle(owner.id, cycle.id, None).await.unwrap();

    service.revoke(owner.id, share.id).await.unwrap();

    let err = service.import(importer.id, share.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceGone);
}

#[tokio::test]
async fn only_owner_can_revoke() {
    let db = test_db().await;
    let owner = create_user(&db.database).await;
    let other = create_user(&db.database).await;
    let service = ShareService::new(db.database.clone());

    let (cycle, _) = seed_cycle(&db.database, &owner).await;
    let share = service.share_cycle(owner.id, cycle.id, None).await.unwrap();

    let err = service.revoke(other.id, share.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    // Still importable afterwards
    assert!(service.import(other.id, share.id).await.is_ok());
}

#[tokio::test]
async fn unknown_token_not_found() {
    let db = test_db().await;
    let importer = create_user(&db.database).await;
    let service = ShareService::new(db.database.clone());

    let err = service.import(importer.id, Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn sharing_anothers_cycle_not_found() {
    let db = test_db().await;
    let owner = create_user(&db.database).await;
    let other = create_user(&db.database).await;
    let service = ShareService::new(db.database.clone());

    let (cycle, _) = seed_cycle(&db.database, &owner).await;

    let err = service.share_cycle(other.id, cycle.id, None).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}
