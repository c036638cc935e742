// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.
//!
//! Each external collaborator gets its own variant so the sync coordinator
//! can make typed retry/skip decisions instead of pattern-matching on
//! message strings.

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("Strava API error: {0}")]
    StravaApi(String),

    #[error("Strava authentication error: {0}")]
    StravaAuth(String),

    #[error("Garmin API error: {0}")]
    GarminApi(String),

    #[error("Garmin authentication error: {0}")]
    GarminAuth(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl SyncError {
    /// True for token/credential failures on either platform.
    ///
    /// Auth errors get exactly one refresh-then-retry; anything still
    /// failing after that aborts the current run (the next scheduled run
    /// starts fresh).
    pub fn is_auth_error(&self) -> bool {
        matches!(self, SyncError::StravaAuth(_) | SyncError::GarminAuth(_))
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SyncError>;
