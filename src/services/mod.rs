// ABOUTME: Domain services sitting between routes and the database
// ABOUTME: Hosts program installation and cycle share/import workflows

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

//! Domain service layer
//!
//! Multi-table workflows that do not belong in a single database file:
//! installing and uninstalling program templates, and sharing and importing
//! training cycles across accounts.

/// Program template installation and provenance-based uninstall
pub mod programs;

/// Cycle share links and cross-account import
pub mod shares;

pub use programs::{InstallationSummary, ProgramService};
pub use shares::ShareService;
