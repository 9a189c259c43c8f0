// ABOUTME: Main library entry point for the TrainTrack fitness tracking backend
// ABOUTME: Exposes REST APIs for workouts, goals, training plans, and push notifications
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

#![deny(unsafe_code)]

//! # TrainTrack Server
//!
//! A fitness-tracking backend exposing CRUD REST endpoints for workouts,
//! exercises, training cycles/plans, body metrics, and goal tracking, plus
//! sharing/import of training cycles, install/uninstall of training programs,
//! and FCM push notifications.
//!
//! ## Architecture
//!
//! - **Models**: Common data structures for the relational schema
//! - **Database**: `SQLite` storage with per-domain query modules
//! - **Goals**: Progress evaluation engine with status transitions and
//!   milestone notification dedup
//! - **Notifications**: Push delivery via Firebase Cloud Messaging
//! - **Routes**: Thin HTTP handlers delegating to the service layer
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use traintrack::config::environment::ServerConfig;
//! use traintrack::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("TrainTrack configured for port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Authentication and session management
pub mod auth;

/// Configuration management and environment parsing
pub mod config;

/// Shared server resources for dependency injection
pub mod context;

/// Database access layer with per-domain query modules
pub mod database;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Goal lifecycle and progress-evaluation engine
pub mod goals;

/// Production logging and structured output
pub mod logging;

/// Common data models for the fitness domain
pub mod models;

/// Push notification delivery (FCM) and dispatcher abstraction
pub mod notifications;

/// Page-based pagination helpers and list metadata
pub mod pagination;

/// HTTP routes for all REST resources
pub mod routes;

/// Domain service layer for business logic shared across handlers
pub mod services;
