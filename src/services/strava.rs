// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for fetching and updating activities.
//!
//! Handles:
//! - Recent-activity listing (paginated)
//! - Activity name/description updates
//! - Token refresh when expired, with on-disk token persistence
//! - 401/429 classification

use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::models::{ActivityRecord, StravaTokens};
use crate::time_utils::parse_local_timestamp;
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Margin before token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Page size for the activity list endpoint.
const ACTIVITIES_PER_PAGE: u32 = 200;

/// The Strava operations the sync coordinator depends on. Implemented by
/// [`StravaService`]; tests substitute an in-memory fake.
#[allow(async_fn_in_trait)]
pub trait StravaApi {
    /// List activities that started within the last `days` days, normalized
    /// to [`ActivityRecord`]. Records with unparseable start times are
    /// dropped with a warning.
    async fn list_recent_activities(&mut self, days: i64) -> Result<Vec<ActivityRecord>>;

    /// Update an activity's name and (optionally) description.
    async fn update_activity(
        &mut self,
        activity_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<()>;
}

/// Raw Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    oauth_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://www.strava.com/api/v3".to_string(),
            oauth_url: "https://www.strava.com/oauth/token".to_string(),
            client_id,
            client_secret,
        }
    }

    /// List activity summaries after a Unix timestamp (paginated).
    pub async fn list_activities(
        &self,
        access_token: &str,
        after: i64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<StravaActivitySummary>> {
        let url = format!("{}/athlete/activities", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("after", after.to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| SyncError::StravaApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Update an activity's name and description.
    pub async fn update_activity(
        &self,
        access_token: &str,
        activity_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<()> {
        let url = format!("{}/activities/{}", self.base_url, activity_id);

        let mut body = serde_json::json!({ "name": name });
        if let Some(description) = description {
            body["description"] = serde_json::Value::String(description.to_string());
        }

        let response = self
            .http
            .put(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| SyncError::StravaApi(e.to_string()))?;

        self.check_response(response).await?;
        Ok(())
    }

    /// Refresh an expired access token. Any failure here is treated as an
    /// auth error: without a working refresh token there is nothing left
    /// to retry within this run.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<StravaTokens> {
        let response = self
            .http
            .post(&self.oauth_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| SyncError::StravaAuth(format!("Token refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::StravaAuth(format!(
                "Token refresh failed with HTTP {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SyncError::StravaAuth(format!("Token refresh parse error: {}", e)))
    }

    /// Exchange an authorization code for the initial token triple
    /// (one-time OAuth bootstrap, used by the `get_strava_tokens` binary).
    pub async fn exchange_code(&self, code: &str) -> Result<StravaTokens> {
        let response = self
            .http
            .post(&self.oauth_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| SyncError::StravaAuth(format!("Token exchange request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::StravaAuth(format!(
                "Token exchange failed with HTTP {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SyncError::StravaAuth(format!("Token exchange parse error: {}", e)))
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<()> {
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!("Strava rate limit hit (429)");
            return Err(SyncError::StravaApi("rate limited".to_string()));
        }

        // Unauthorized - token may be expired
        if status.as_u16() == 401 {
            return Err(SyncError::StravaAuth(body));
        }

        Err(SyncError::StravaApi(format!("HTTP {}: {}", status, body)))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Strava rate limit hit (429)");
                return Err(SyncError::StravaApi("rate limited".to_string()));
            }

            if status.as_u16() == 401 {
                return Err(SyncError::StravaAuth(body));
            }

            return Err(SyncError::StravaApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| SyncError::StravaApi(format!("JSON parse error: {}", e)))
    }
}

/// Summary activity from the list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaActivitySummary {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub sport_type: String,
    /// Local wall-clock start time. Strava appends a misleading `Z`; the
    /// value is local time, comparable with Garmin's `startTimeLocal`.
    pub start_date_local: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// StravaService - high-level service with token lifecycle
// ─────────────────────────────────────────────────────────────────────────────

/// High-level Strava service that manages the token lifecycle and API calls.
///
/// Tokens are seeded from the environment, overridden by the persisted
/// token file when present, proactively refreshed inside a 5-minute expiry
/// margin, and reactively refreshed (once) when Strava rejects a call with
/// 401. Every refresh rewrites the token file.
pub struct StravaService {
    client: StravaClient,
    tokens: StravaTokens,
    token_path: PathBuf,
}

impl StravaService {
    /// Create the service from configuration, preferring tokens persisted
    /// by a previous run over the env-provided seed values.
    pub fn new(config: &Config) -> Self {
        let mut tokens = StravaTokens {
            access_token: config.strava_access_token.clone(),
            refresh_token: config.strava_refresh_token.clone(),
            expires_at: config.strava_token_expires_at,
        };

        if let Some(stored) = Self::load_token_file(&config.strava_token_path) {
            tracing::info!(path = %config.strava_token_path.display(), "Loaded Strava tokens from file");
            tokens = stored;
        }

        Self {
            client: StravaClient::new(
                config.strava_client_id.clone(),
                config.strava_client_secret.clone(),
            ),
            tokens,
            token_path: config.strava_token_path.clone(),
        }
    }

    fn load_token_file(path: &Path) -> Option<StravaTokens> {
        if !path.exists() {
            return None;
        }
        match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|raw| serde_json::from_str(&raw).map_err(|e| e.to_string()))
        {
            Ok(tokens) => Some(tokens),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "Could not read Strava token file");
                None
            }
        }
    }

    /// Persist the current token triple. Failure is a warning: the next
    /// run falls back to env seed tokens and refreshes again.
    fn persist_tokens(&self) {
        let result = (|| -> std::io::Result<()> {
            if let Some(parent) = self.token_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let json = serde_json::to_string_pretty(&self.tokens)?;
            std::fs::write(&self.token_path, json)
        })();

        match result {
            Ok(()) => tracing::info!(path = %self.token_path.display(), "Strava tokens persisted"),
            Err(err) => {
                tracing::warn!(path = %self.token_path.display(), %err, "Could not persist Strava tokens")
            }
        }
    }

    /// Refresh proactively when the access token expires within the margin.
    async fn ensure_fresh_token(&mut self) -> Result<()> {
        let now = Utc::now().timestamp();
        if self.tokens.expires_within(now, TOKEN_REFRESH_MARGIN_SECS) {
            tracing::info!("Strava access token expired or expiring soon, refreshing");
            self.refresh().await?;
        }
        Ok(())
    }

    async fn refresh(&mut self) -> Result<()> {
        self.tokens = self.client.refresh_token(&self.tokens.refresh_token).await?;
        self.persist_tokens();
        tracing::info!("Strava token refreshed");
        Ok(())
    }

    async fn list_page(&mut self, after: i64, page: u32) -> Result<Vec<StravaActivitySummary>> {
        self.ensure_fresh_token().await?;
        match self
            .client
            .list_activities(&self.tokens.access_token, after, page, ACTIVITIES_PER_PAGE)
            .await
        {
            Err(err) if err.is_auth_error() => {
                tracing::warn!("Strava rejected the access token, refreshing and retrying once");
                self.refresh().await?;
                self.client
                    .list_activities(&self.tokens.access_token, after, page, ACTIVITIES_PER_PAGE)
                    .await
            }
            other => other,
        }
    }
}

impl StravaApi for StravaService {
    async fn list_recent_activities(&mut self, days: i64) -> Result<Vec<ActivityRecord>> {
        let after = (Utc::now() - Duration::days(days)).timestamp();

        let mut records = Vec::new();
        let mut page = 1u32;
        loop {
            let batch = self.list_page(after, page).await?;
            let batch_len = batch.len();

            for summary in batch {
                let Some(start_time) = parse_local_timestamp(&summary.start_date_local) else {
                    tracing::warn!(
                        activity_id = summary.id,
                        start = %summary.start_date_local,
                        "Dropping Strava activity with unparseable start time"
                    );
                    continue;
                };
                records.push(ActivityRecord {
                    id: summary.id.to_string(),
                    name: summary.name,
                    start_time,
                    activity_type: summary.sport_type,
                });
            }

            if batch_len < ACTIVITIES_PER_PAGE as usize {
                break;
            }
            page += 1;
        }

        tracing::info!(count = records.len(), days, "Fetched recent Strava activities");
        Ok(records)
    }

    async fn update_activity(
        &mut self,
        activity_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<()> {
        self.ensure_fresh_token().await?;
        match self
            .client
            .update_activity(&self.tokens.access_token, activity_id, name, description)
            .await
        {
            Err(err) if err.is_auth_error() => {
                tracing::warn!("Strava rejected the access token, refreshing and retrying once");
                self.refresh().await?;
                self.client
                    .update_activity(&self.tokens.access_token, activity_id, name, description)
                    .await
            }
            other => other,
        }
    }
}
