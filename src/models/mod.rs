// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models shared across services.

pub mod activity;
pub mod token;

pub use activity::{ActivityRecord, GarminActivity, GarminActivityType, Workout};
pub use token::StravaTokens;
