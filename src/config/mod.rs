// ABOUTME: Configuration module organization for the TrainTrack server
// ABOUTME: Environment-driven runtime configuration lives in the environment submodule
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

//! Configuration management

/// Environment-based configuration management for production deployment
pub mod environment;
