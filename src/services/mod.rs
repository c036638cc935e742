// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod decision;
pub mod garmin;
pub mod matcher;
pub mod strava;
pub mod sync;
pub mod synced_cache;

pub use decision::{decide, UpdateDecision};
pub use garmin::{GarminApi, GarminClient, GarminFetcher};
pub use matcher::{find_matching_activity, map_garmin_type};
pub use strava::{StravaApi, StravaClient, StravaService};
pub use sync::{SyncCoordinator, SyncSummary};
pub use synced_cache::SyncedCache;
