// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Garmin Connect client and time-window activity fetcher.
//!
//! The client consumes a garth-style token directory (token acquisition is
//! handled outside this process). The fetcher walks the sync window one day
//! at a time with a pacing delay between requests, parses start times
//! (dropping records it cannot parse), lazily attaches linked workouts, and
//! memoizes the result per window size for the rest of the run.

use crate::error::{Result, SyncError};
use crate::models::{GarminActivity, Workout};
use crate::time_utils::parse_local_timestamp;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// How long a fetched window stays valid in the in-memory cache.
const ACTIVITY_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Delay between per-day requests, to stay inside Garmin's informal rate
/// budget.
const DAY_FETCH_PACING: Duration = Duration::from_secs(1);

/// The Garmin operations the fetcher depends on. Implemented by
/// [`GarminClient`]; tests substitute an in-memory fake.
#[allow(async_fn_in_trait)]
pub trait GarminApi {
    /// Authenticate from the token store and verify connectivity.
    async fn login(&mut self) -> Result<()>;

    /// List raw activities that started on the given local date.
    async fn activities_for_date(&mut self, date: NaiveDate) -> Result<Vec<GarminActivity>>;

    /// Fetch the structured workout linked from an activity.
    async fn get_workout(&mut self, workout_id: &str) -> Result<Workout>;
}

/// Garmin Connect API client authenticated from a token directory.
pub struct GarminClient {
    http: reqwest::Client,
    base_url: String,
    tokens_dir: PathBuf,
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct Oauth2Token {
    access_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SocialProfile {
    #[serde(default)]
    display_name: String,
}

impl GarminClient {
    /// Create an unauthenticated client; `login` reads the token store.
    pub fn new(tokens_dir: &Path) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://connectapi.garmin.com".to_string(),
            tokens_dir: tokens_dir.to_path_buf(),
            access_token: None,
        }
    }

    fn load_access_token(&self) -> Result<String> {
        let path = self.tokens_dir.join("oauth2_token.json");
        let raw = std::fs::read_to_string(&path).map_err(|e| {
            SyncError::GarminAuth(format!("cannot read token store {}: {}", path.display(), e))
        })?;
        let token: Oauth2Token = serde_json::from_str(&raw).map_err(|e| {
            SyncError::GarminAuth(format!("invalid token store {}: {}", path.display(), e))
        })?;
        Ok(token.access_token)
    }

    fn bearer(&self) -> Result<&str> {
        self.access_token
            .as_deref()
            .ok_or_else(|| SyncError::GarminAuth("not logged in".to_string()))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(self.bearer()?)
            .query(query)
            .send()
            .await
            .map_err(|e| SyncError::GarminApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 401 {
                return Err(SyncError::GarminAuth(body));
            }
            return Err(SyncError::GarminApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| SyncError::GarminApi(format!("JSON parse error: {}", e)))
    }
}

impl GarminApi for GarminClient {
    async fn login(&mut self) -> Result<()> {
        tracing::info!(
            tokens_dir = %self.tokens_dir.display(),
            "Logging in to Garmin Connect from token store"
        );
        self.access_token = Some(self.load_access_token()?);

        // Lightweight call to verify the token actually works.
        let url = format!("{}/userprofile-service/socialProfile", self.base_url);
        let profile: SocialProfile = self.get_json(&url, &[]).await?;
        tracing::info!(display_name = %profile.display_name, "Connected to Garmin Connect");
        Ok(())
    }

    async fn activities_for_date(&mut self, date: NaiveDate) -> Result<Vec<GarminActivity>> {
        let url = format!(
            "{}/activitylist-service/activities/search/activities",
            self.base_url
        );
        let date_str = date.format("%Y-%m-%d").to_string();
        self.get_json(
            &url,
            &[("startDate", date_str.clone()), ("endDate", date_str)],
        )
        .await
    }

    async fn get_workout(&mut self, workout_id: &str) -> Result<Workout> {
        let url = format!("{}/workout-service/workout/{}", self.base_url, workout_id);
        self.get_json(&url, &[]).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GarminFetcher - time-window fetch with per-run caching
// ─────────────────────────────────────────────────────────────────────────────

struct CacheEntry {
    fetched_at: Instant,
    activities: Vec<GarminActivity>,
}

/// Fetches and normalizes Garmin activities over a day window.
///
/// Login happens on each uncached fetch, so a run that short-circuits on
/// the synced cache never contacts Garmin at all, and a token that expired
/// between runs is caught before any day is listed.
pub struct GarminFetcher<G> {
    client: G,
    cache: HashMap<String, CacheEntry>,
    cache_ttl: Duration,
    pacing: Duration,
}

impl<G: GarminApi> GarminFetcher<G> {
    pub fn new(client: G) -> Self {
        Self {
            client,
            cache: HashMap::new(),
            cache_ttl: ACTIVITY_CACHE_TTL,
            pacing: DAY_FETCH_PACING,
        }
    }

    /// Override the per-day pacing delay (tests use zero).
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// All Garmin activities with a parseable start time in the last `days`
    /// days, in fetch order (chronological by day). Duplicate activity IDs
    /// keep the first-seen record. A non-auth per-day fetch failure is
    /// logged and that day is skipped; an auth failure aborts the whole
    /// fetch, so a stale token never presents as an empty candidate pool.
    pub async fn activities_for_period(&mut self, days: i64) -> Result<Vec<GarminActivity>> {
        let cache_key = format!("garmin_activities_{}", days);
        if let Some(entry) = self.cache.get(&cache_key) {
            if entry.fetched_at.elapsed() < self.cache_ttl {
                tracing::info!(days, "Using cached Garmin activities");
                return Ok(entry.activities.clone());
            }
        }

        self.client.login().await?;

        let today = Local::now().date_naive();
        let start = today - chrono::Duration::days(days);

        let mut activities: Vec<GarminActivity> = Vec::new();
        let mut seen_ids: HashSet<String> = HashSet::new();

        let mut current = start;
        while current <= today {
            match self.client.activities_for_date(current).await {
                Ok(daily) => {
                    for activity in daily {
                        self.collect_activity(&mut activities, &mut seen_ids, activity)
                            .await;
                    }
                }
                Err(err) if err.is_auth_error() => return Err(err),
                Err(err) => {
                    tracing::warn!(date = %current, %err, "Failed to fetch Garmin activities for day");
                }
            }
            if !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
            current = current + chrono::Duration::days(1);
        }

        tracing::info!(count = activities.len(), days, "Fetched Garmin activities");
        self.cache.insert(
            cache_key,
            CacheEntry {
                fetched_at: Instant::now(),
                activities: activities.clone(),
            },
        );
        Ok(activities)
    }

    /// Normalize one raw activity into the candidate pool: parse its start
    /// time (dropping it on failure) and attach the linked workout, if any.
    async fn collect_activity(
        &mut self,
        activities: &mut Vec<GarminActivity>,
        seen_ids: &mut HashSet<String>,
        mut activity: GarminActivity,
    ) {
        if activity.activity_id.is_empty() || !seen_ids.insert(activity.activity_id.clone()) {
            return;
        }

        let Some(parsed) = parse_local_timestamp(&activity.start_time_local) else {
            // Unparseable start time: the record leaves the candidate pool.
            return;
        };
        activity.parsed_start_time = Some(parsed);

        if let Some(workout_id) = activity.workout_id.clone() {
            match self.client.get_workout(&workout_id).await {
                Ok(workout) => activity.workout = Some(workout),
                Err(err) => {
                    tracing::warn!(workout_id = %workout_id, %err, "Could not fetch linked workout");
                }
            }
        }

        tracing::debug!(
            garmin_id = %activity.activity_id,
            name = %activity.activity_name,
            start = %activity.start_time_local,
            type_key = %activity.activity_type.type_key,
            "Collected Garmin activity"
        );
        activities.push(activity);
    }
}
