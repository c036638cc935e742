// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test fixtures: in-memory fakes for both platform clients.

use chrono::{Local, NaiveDate, NaiveDateTime};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use strava_garmin_sync::config::Config;
use strava_garmin_sync::error::{Result, SyncError};
use strava_garmin_sync::models::{ActivityRecord, GarminActivity, GarminActivityType, Workout};
use strava_garmin_sync::services::{GarminApi, GarminFetcher, StravaApi, SyncCoordinator};

/// One recorded call to `update_activity`.
#[derive(Debug, Clone)]
pub struct RecordedUpdate {
    pub activity_id: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Default)]
pub struct StravaState {
    pub activities: Vec<ActivityRecord>,
    pub updates: Vec<RecordedUpdate>,
    /// Updates for these IDs fail with a server error.
    pub fail_update_ids: HashSet<String>,
    /// Listing fails with an auth error, as after a dead refresh token.
    pub fail_list_with_auth: bool,
    pub list_calls: usize,
}

/// Fake Strava client; clones share state so tests can inspect calls after
/// handing one clone to the coordinator.
#[derive(Clone, Default)]
pub struct FakeStrava {
    pub state: Arc<Mutex<StravaState>>,
}

impl StravaApi for FakeStrava {
    async fn list_recent_activities(&mut self, _days: i64) -> Result<Vec<ActivityRecord>> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        if state.fail_list_with_auth {
            return Err(SyncError::StravaAuth("invalid refresh token".to_string()));
        }
        Ok(state.activities.clone())
    }

    async fn update_activity(
        &mut self,
        activity_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_update_ids.contains(activity_id) {
            return Err(SyncError::StravaApi(
                "HTTP 500 Internal Server Error".to_string(),
            ));
        }
        state.updates.push(RecordedUpdate {
            activity_id: activity_id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct GarminState {
    pub activities: Vec<GarminActivity>,
    pub workouts: HashMap<String, Workout>,
    /// Per-day listing fails with 401, as after a token expiry that login's
    /// profile probe did not catch.
    pub fail_days_with_auth: bool,
    pub login_calls: usize,
    pub day_fetches: usize,
}

/// Fake Garmin client; clones share state.
#[derive(Clone, Default)]
pub struct FakeGarmin {
    pub state: Arc<Mutex<GarminState>>,
}

impl GarminApi for FakeGarmin {
    async fn login(&mut self) -> Result<()> {
        self.state.lock().unwrap().login_calls += 1;
        Ok(())
    }

    async fn activities_for_date(&mut self, date: NaiveDate) -> Result<Vec<GarminActivity>> {
        let mut state = self.state.lock().unwrap();
        state.day_fetches += 1;
        if state.fail_days_with_auth {
            return Err(SyncError::GarminAuth("HTTP 401".to_string()));
        }
        let prefix = date.format("%Y-%m-%d").to_string();
        Ok(state
            .activities
            .iter()
            .filter(|a| a.start_time_local.starts_with(&prefix))
            .cloned()
            .collect())
    }

    async fn get_workout(&mut self, workout_id: &str) -> Result<Workout> {
        self.state
            .lock()
            .unwrap()
            .workouts
            .get(workout_id)
            .cloned()
            .ok_or_else(|| SyncError::GarminApi(format!("workout {} not found", workout_id)))
    }
}

/// A start time safely inside the default 7-day window: yesterday 10:00.
pub fn base_start_time() -> NaiveDateTime {
    (Local::now().date_naive() - chrono::Duration::days(1))
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

pub fn strava_activity(
    id: &str,
    name: &str,
    sport_type: &str,
    start_time: NaiveDateTime,
) -> ActivityRecord {
    ActivityRecord {
        id: id.to_string(),
        name: name.to_string(),
        start_time,
        activity_type: sport_type.to_string(),
    }
}

pub fn garmin_activity(
    id: &str,
    name: &str,
    type_key: &str,
    start_time: NaiveDateTime,
) -> GarminActivity {
    GarminActivity {
        activity_id: id.to_string(),
        activity_name: name.to_string(),
        start_time_local: start_time.format("%Y-%m-%d %H:%M:%S").to_string(),
        activity_type: GarminActivityType {
            type_key: type_key.to_string(),
        },
        ..Default::default()
    }
}

/// Config pointing cache/token files into a temp directory, blackout off.
pub fn test_config(dir: &tempfile::TempDir) -> Config {
    Config {
        cache_path: dir.path().join("synced_cache.json"),
        strava_token_path: dir.path().join("strava_token.json"),
        blackout_offset: None,
        ..Config::default()
    }
}

/// Coordinator wired to the fakes, with per-day pacing disabled.
pub fn coordinator(
    config: Config,
    strava: FakeStrava,
    garmin: FakeGarmin,
) -> SyncCoordinator<FakeStrava, FakeGarmin> {
    SyncCoordinator::new(
        config,
        strava,
        GarminFetcher::new(garmin).with_pacing(std::time::Duration::ZERO),
    )
}
