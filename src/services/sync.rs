// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sync coordinator.
//!
//! One run: blackout check, fetch recent Strava activities, drop the ones
//! already resolved in the synced cache (short-circuiting before Garmin is
//! ever contacted when nothing is pending), fetch the Garmin window, then
//! match + decide + update per pending activity and persist the cache.

use crate::config::Config;
use crate::error::Result;
use crate::models::{ActivityRecord, GarminActivity};
use crate::services::decision::decide;
use crate::services::garmin::{GarminApi, GarminFetcher};
use crate::services::matcher::find_matching_activity;
use crate::services::strava::StravaApi;
use crate::services::synced_cache::SyncedCache;
use crate::time_utils::in_blackout_window;
use chrono::{DateTime, Utc};
use std::time::Instant;

/// Counters for one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Activities whose name/description were pushed to Strava.
    pub updated: usize,
    /// Activities resolved without a write (no match, or already correct).
    pub skipped: usize,
    /// Activities dropped up front because the synced cache knew them.
    pub cached: usize,
    /// Failed updates; their IDs stay out of the cache and retry next run.
    pub errors: usize,
    /// Pending activities that went through reconciliation this run.
    pub processed: usize,
}

/// Per-activity reconciliation outcome.
enum Outcome {
    Updated,
    Skipped,
    Errored,
}

/// Orchestrates one reconciliation run over injectable platform clients.
pub struct SyncCoordinator<S, G> {
    config: Config,
    strava: S,
    garmin: GarminFetcher<G>,
}

impl<S: StravaApi, G: GarminApi> SyncCoordinator<S, G> {
    pub fn new(config: Config, strava: S, garmin: GarminFetcher<G>) -> Self {
        Self {
            config,
            strava,
            garmin,
        }
    }

    /// Run one sync cycle against the current wall clock.
    pub async fn run(&mut self) -> Result<SyncSummary> {
        self.run_at(Utc::now()).await
    }

    /// Run one sync cycle as of `run_at` (separated from `run` so the
    /// blackout check is deterministic under test).
    pub async fn run_at(&mut self, run_at: DateTime<Utc>) -> Result<SyncSummary> {
        if let Some(offset) = self.config.blackout_offset {
            if in_blackout_window(run_at, offset) {
                tracing::info!("Blackout window (00:00-06:00 local), skipping this run");
                return Ok(SyncSummary::default());
            }
        }

        let started = Instant::now();
        tracing::info!(
            days = self.config.sync_days,
            dry_run = self.config.dry_run,
            "Starting sync run"
        );

        let strava_activities = match self.strava.list_recent_activities(self.config.sync_days).await
        {
            Ok(activities) => activities,
            Err(err) if err.is_auth_error() => return Err(err),
            Err(err) => {
                // Partial-data policy: a non-auth listing failure leaves
                // nothing to reconcile this run but does not fail it.
                tracing::error!(%err, "Could not fetch Strava activities");
                Vec::new()
            }
        };

        let mut cache = SyncedCache::load(&self.config.cache_path);

        let pending: Vec<&ActivityRecord> = strava_activities
            .iter()
            .filter(|a| !cache.contains(&a.id))
            .collect();
        let mut summary = SyncSummary {
            cached: strava_activities.len() - pending.len(),
            processed: pending.len(),
            ..SyncSummary::default()
        };

        if pending.is_empty() {
            tracing::info!("All recent Strava activities already resolved");
            cache.save(&self.config.cache_path);
            self.log_summary(&summary, started);
            return Ok(summary);
        }

        let garmin_activities = self.garmin.activities_for_period(self.config.sync_days).await?;
        if garmin_activities.is_empty() {
            tracing::warn!("No Garmin activities found in the sync window");
        }

        for target in pending {
            match self
                .reconcile_activity(target, &garmin_activities, &mut cache)
                .await
            {
                Outcome::Updated => summary.updated += 1,
                Outcome::Skipped => summary.skipped += 1,
                Outcome::Errored => summary.errors += 1,
            }
        }

        cache.save(&self.config.cache_path);
        self.log_summary(&summary, started);
        Ok(summary)
    }

    /// Reconcile one pending Strava activity. Only a successful resolution
    /// (update applied, already correct, or confirmed match-less) enters
    /// the cache; a failed update stays out so the next run retries it.
    async fn reconcile_activity(
        &mut self,
        target: &ActivityRecord,
        candidates: &[GarminActivity],
        cache: &mut SyncedCache,
    ) -> Outcome {
        let Some(matched) = find_matching_activity(target, candidates) else {
            tracing::info!(activity = %target.name, "No matching Garmin activity, skipping");
            cache.insert(&target.id);
            return Outcome::Skipped;
        };

        let decision = decide(target, matched);
        if !decision.needs_update {
            tracing::info!(activity = %target.name, "Already up to date");
            cache.insert(&target.id);
            return Outcome::Skipped;
        }

        if self.config.dry_run {
            tracing::info!(
                activity_id = %target.id,
                new_name = %decision.new_name,
                "[dry run] Would update Strava activity"
            );
            cache.insert(&target.id);
            return Outcome::Updated;
        }

        match self
            .strava
            .update_activity(
                &target.id,
                &decision.new_name,
                decision.new_description.as_deref(),
            )
            .await
        {
            Ok(()) => {
                tracing::info!(
                    activity_id = %target.id,
                    from = %target.name,
                    to = %decision.new_name,
                    "Updated Strava activity"
                );
                cache.insert(&target.id);
                Outcome::Updated
            }
            Err(err) => {
                tracing::error!(activity_id = %target.id, %err, "Failed to update Strava activity");
                Outcome::Errored
            }
        }
    }

    fn log_summary(&self, summary: &SyncSummary, started: Instant) {
        tracing::info!(
            updated = summary.updated,
            skipped = summary.skipped,
            cached = summary.cached,
            errors = summary.errors,
            processed = summary.processed,
            elapsed_secs = started.elapsed().as_secs_f64(),
            "Sync run complete"
        );
    }
}
