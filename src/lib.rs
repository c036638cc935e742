// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava-Garmin sync: keep Strava activity names and descriptions in step
//! with the richer titles recorded on Garmin Connect.
//!
//! Activities uploaded to Strava get generic auto-generated names; the
//! matching Garmin record usually carries the real workout title. This
//! crate pairs the two sides by start-time proximity and activity type,
//! decides whether the Garmin name is worth pushing, and applies at most
//! one update per pairing while staying idempotent across runs.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;
