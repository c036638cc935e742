// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! All knobs live in env vars (a `.env` file is honored for local runs);
//! CLI flags override the corresponding fields after loading.

use chrono::FixedOffset;
use std::env;
use std::path::PathBuf;

/// Default on-disk location of the persisted Strava token triple.
pub const DEFAULT_TOKEN_PATH: &str = "data/.strava_token.json";
/// Default on-disk location of the synced-activity cache.
pub const DEFAULT_CACHE_PATH: &str = "data/.strava_synced_cache.json";

/// How the process runs after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// One sync run, then exit with its status.
    Once,
    /// Recurring sync runs until interrupted.
    Scheduler,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Strava OAuth ---
    pub strava_client_id: String,
    pub strava_client_secret: String,
    /// Seed tokens from env; overridden by the token file when present.
    pub strava_access_token: String,
    pub strava_refresh_token: String,
    pub strava_token_expires_at: i64,
    /// Where the refreshed token triple is persisted.
    pub strava_token_path: PathBuf,

    // --- Garmin ---
    /// Directory holding garth-style OAuth token files.
    pub garmin_tokens_dir: PathBuf,

    // --- Sync behavior ---
    /// Look-back window in days for both platforms.
    pub sync_days: i64,
    /// Simulate Strava updates without writing.
    pub dry_run: bool,
    pub run_mode: RunMode,
    /// Scheduler recurrence interval in minutes.
    pub interval_minutes: u64,
    /// Fixed reference offset for the 00:00-06:00 blackout window.
    /// `None` disables the blackout entirely.
    pub blackout_offset: Option<FixedOffset>,
    /// Where the synced-activity ID cache is persisted.
    pub cache_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing Strava credentials are fatal here, before any network
    /// activity.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let blackout_hours: i32 = env::var("SYNC_BLACKOUT_UTC_OFFSET_HOURS")
            .unwrap_or_else(|_| "2".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("SYNC_BLACKOUT_UTC_OFFSET_HOURS"))?;
        let blackout_offset = FixedOffset::east_opt(blackout_hours * 3600)
            .ok_or(ConfigError::Invalid("SYNC_BLACKOUT_UTC_OFFSET_HOURS"))?;

        let interval_minutes: u64 = env::var("SYNC_INTERVAL_MINUTES")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("SYNC_INTERVAL_MINUTES"))?;
        // A zero period would panic the scheduler's interval timer.
        if interval_minutes == 0 {
            return Err(ConfigError::Invalid("SYNC_INTERVAL_MINUTES"));
        }

        Ok(Self {
            strava_client_id: env::var("STRAVA_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_ID"))?,
            strava_client_secret: env::var("STRAVA_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_SECRET"))?,
            strava_access_token: env::var("STRAVA_ACCESS_TOKEN")
                .map_err(|_| ConfigError::Missing("STRAVA_ACCESS_TOKEN"))?,
            strava_refresh_token: env::var("STRAVA_REFRESH_TOKEN")
                .map_err(|_| ConfigError::Missing("STRAVA_REFRESH_TOKEN"))?,
            strava_token_expires_at: env::var("STRAVA_TOKEN_EXPIRES_AT")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("STRAVA_TOKEN_EXPIRES_AT"))?,
            strava_token_path: env::var("STRAVA_TOKEN_PATH")
                .unwrap_or_else(|_| DEFAULT_TOKEN_PATH.to_string())
                .into(),
            garmin_tokens_dir: env::var("GARMIN_TOKENS_DIR")
                .unwrap_or_else(|_| "data/.garminconnect".to_string())
                .into(),
            sync_days: env::var("SYNC_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("SYNC_DAYS"))?,
            dry_run: env::var("DRY_RUN")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            run_mode: match env::var("RUN_MODE").as_deref() {
                Ok("once") => RunMode::Once,
                _ => RunMode::Scheduler,
            },
            interval_minutes,
            blackout_offset: Some(blackout_offset),
            cache_path: env::var("SYNC_CACHE_PATH")
                .unwrap_or_else(|_| DEFAULT_CACHE_PATH.to_string())
                .into(),
        })
    }
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            strava_access_token: "test_access".to_string(),
            strava_refresh_token: "test_refresh".to_string(),
            strava_token_expires_at: 0,
            strava_token_path: DEFAULT_TOKEN_PATH.into(),
            garmin_tokens_dir: "data/.garminconnect".into(),
            sync_days: 7,
            dry_run: false,
            run_mode: RunMode::Once,
            interval_minutes: 60,
            blackout_offset: None,
            cache_path: DEFAULT_CACHE_PATH.into(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test body: these mutate process-global env vars and must not
    // run concurrently with each other.
    #[test]
    fn test_config_from_env() {
        env::remove_var("STRAVA_CLIENT_ID");
        env::set_var("STRAVA_CLIENT_SECRET", "test_secret");
        env::set_var("STRAVA_ACCESS_TOKEN", "test_access");
        env::set_var("STRAVA_REFRESH_TOKEN", "test_refresh");

        // Missing credential is fatal before any network activity.
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("STRAVA_CLIENT_ID"))
        ));

        env::set_var("STRAVA_CLIENT_ID", "test_id");
        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.strava_client_id, "test_id");
        assert_eq!(config.strava_client_secret, "test_secret");
        assert_eq!(config.sync_days, 7);
        assert_eq!(config.interval_minutes, 60);
        assert!(!config.dry_run);
        assert!(config.blackout_offset.is_some());

        // A zero interval is rejected, not deferred to a timer panic.
        env::set_var("SYNC_INTERVAL_MINUTES", "0");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("SYNC_INTERVAL_MINUTES"))
        ));
        env::remove_var("SYNC_INTERVAL_MINUTES");
    }
}
