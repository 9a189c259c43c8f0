// ABOUTME: Integration tests for program install and provenance-based uninstall
// ABOUTME: Verifies materialization, idempotence, and that user data survives uninstall

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

mod common;

use chrono::Utc;
use common::{create_user, test_db};
use traintrack::database::Database;
use traintrack::errors::ErrorCode;
use traintrack::models::{
    Exercise, ProgramCycle, ProgramPlan, ProgramPlanExercise, TrainingProgram,
};
use traintrack::services::ProgramService;
use uuid::Uuid;

/// Seed a two-plan program template with two exercises
async fn seed_program(database: &Database) -> TrainingProgram {
    let program = TrainingProgram {
        id: Uuid::new_v4(),
        name: "Starting Strength".into(),
        description: Some("Linear progression for novices".into()),
        author: Some("TrainTrack".into()),
        is_public: true,
        created_at: Utc::now(),
    };

    let cycle = ProgramCycle {
        id: Uuid::new_v4(),
        program_id: program.id,
        name: "Phase 1".into(),
        description: None,
        position: 0,
    };

    let plan_a = ProgramPlan {
        id: Uuid::new_v4(),
        program_cycle_id: cycle.id,
        name: "Day A".into(),
        day_of_week: Some(1),
        position: 0,
    };
    let plan_b = ProgramPlan {
        id: Uuid::new_v4(),
        program_cycle_id: cycle.id,
        name: "Day B".into(),
        day_of_week: Some(4),
        position: 1,
    };

    let exercises = vec![
        ProgramPlanExercise {
            id: Uuid::new_v4(),
            program_plan_id: plan_a.id,
            exercise_name: "Squat".into(),
            muscle_group: Some("legs".into()),
            target_sets: 3,
            target_reps: 5,
            target_weight: None,
            position: 0,
        },
        ProgramPlanExercise {
            id: Uuid::new_v4(),
            program_plan_id: plan_b.id,
            exercise_name: "Squat".into(),
            muscle_group: Some("legs".into()),
            target_sets: 3,
            target_reps: 5,
            target_weight: None,
            position: 0,
        },
        ProgramPlanExercise {
            id: Uuid::new_v4(),
            program_plan_id: plan_b.id,
            exercise_name: "Deadlift".into(),
            muscle_group: Some("back".into()),
            target_sets: 1,
            target_reps: 5,
            target_weight: None,
            position: 1,
        },
    ];

    database
        .create_program(&program, &[cycle], &[plan_a, plan_b], &exercises)
        .await
        .expect("seed program");

    program
}

#[tokio::test]
async fn install_materializes_template_graph() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let program = seed_program(&db.database).await;
    let service = ProgramService::new(db.database.clone());

    let (installation, summary) = service.install(user.id, program.id).await.unwrap();
    assert_eq!(installation.user_id, user.id);
    assert_eq!(summary.cycles, 1);
    assert_eq!(summary.plans, 2);
    assert_eq!(summary.plan_exercises, 3);
    // Squat appears twice but resolves to one created exercise
    assert_eq!(summary.exercises_created, 2);

    let cycles = db.database.list_cycles(user.id).await.unwrap();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].name, "Phase 1");

    let plans = db.database.list_plans(cycles[0].id).await.unwrap();
    assert_eq!(plans.len(), 2);
    let day_b = plans.iter().find(|p| p.name == "Day B").unwrap();
    let slots = db.database.list_plan_exercises(day_b.id).await.unwrap();
    assert_eq!(slots.len(), 2);
}

#[tokio::test]
async fn install_reuses_existing_exercise_by_name() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let program = seed_program(&db.database).await;
    let service = ProgramService::new(db.database.clone());

    let squat = Exercise {
        id: Uuid::new_v4(),
        user_id: Some(user.id),
        name: "Squat".into(),
        muscle_group: Some("legs".into()),
        description: None,
        created_at: Utc::now(),
    };
    db.database.create_exercise(&squat).await.unwrap();

    let (_, summary) = service.install(user.id, program.id).await.unwrap();
    // Only Deadlift needed creating
    assert_eq!(summary.exercises_created, 1);

    let exercises = db.database.list_exercises(user.id).await.unwrap();
    assert_eq!(exercises.iter().filter(|e| e.name == "Squat").count(), 1);
}

#[tokio::test]
async fn double_install_conflicts() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let program = seed_program(&db.database).await;
    let service = ProgramService::new(db.database.clone());

    service.install(user.id, program.id).await.unwrap();
    let err = service.install(user.id, program.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
}

#[tokio::test]
async fn uninstall_removes_only_installed_rows() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let program = seed_program(&db.database).await;
    let service = ProgramService::new(db.database.clone());

    // A cycle the user made themselves, before installing
    let own_cycle = traintrack::models::TrainingCycle {
        id: Uuid::new_v4(),
        user_id: user.id,
        name: "My own block".into(),
        description: None,
        position: 5,
        created_at: Utc::now(),
    };
    db.database.create_cycle(&own_cycle).await.unwrap();

    service.install(user.id, program.id).await.unwrap();
    assert_eq!(db.database.list_cycles(user.id).await.unwrap().len(), 2);

    service.uninstall(user.id, program.id).await.unwrap();

    let remaining = db.database.list_cycles(user.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "My own block");

    // Installed exercises with no references are gone too
    let exercises = db.database.list_exercises(user.id).await.unwrap();
    assert!(exercises.iter().all(|e| e.name != "Deadlift"));

    // Uninstalling again reports not found
    let err = service.uninstall(user.id, program.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn uninstall_keeps_exercises_with_logged_sets() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let program = seed_program(&db.database).await;
    let service = ProgramService::new(db.database.clone());

    service.install(user.id, program.id).await.unwrap();

    let squat = db
        .database
        .find_exercise_by_name(user.id, "Squat")
        .await
        .unwrap()
        .unwrap();
    let workout = common::finished_workout(&db.database, user.id, 1).await;
    common::log_set(&db.database, user.id, workout.id, squat.id, 100.0, 5).await;

    service.uninstall(user.id, program.id).await.unwrap();

    // The exercise with history stays, the untouched one is deleted
    assert!(db
        .database
        .find_exercise_by_name(user.id, "Squat")
        .await
        .unwrap()
        .is_some());
    assert!(db
        .database
        .find_exercise_by_name(user.id, "Deadlift")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn private_program_not_installable() {
    let db = test_db().await;
    let user = create_user(&db.database).await;
    let service = ProgramService::new(db.database.clone());

    let program = TrainingProgram {
        id: Uuid::new_v4(),
        name: "Secret".into(),
        description: None,
        author: None,
        is_public: false,
        created_at: Utc::now(),
    };
    db.database
        .create_program(&program, &[], &[], &[])
        .await
        .unwrap();

    let err = service.install(user.id, program.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}
