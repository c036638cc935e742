// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Update decision engine.
//!
//! Given a matched Strava/Garmin pair, decides whether the Strava side
//! should be renamed and with what. Pure function of its inputs.

use crate::models::{ActivityRecord, GarminActivity};

/// Generic auto-generated names that never replace a specific title.
/// Exact, case-sensitive membership.
const GENERIC_NAMES: [&str; 5] = ["Running", "Cycling", "Walking", "Swimming", "Workout"];

/// Outcome of the update decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDecision {
    pub needs_update: bool,
    /// The name to apply; equals the target's trimmed name when no update
    /// is needed.
    pub new_name: String,
    /// Effective Garmin description, computed independently of
    /// `needs_update`. Callers that gate the write on `needs_update`
    /// therefore drop a description-only change when the name is already
    /// correct.
    pub new_description: Option<String>,
}

/// Decide whether a matched pair warrants a Strava update.
///
/// The linked workout's name/description, when attached and non-empty
/// after trimming, take priority over the raw activity's own fields.
pub fn decide(target: &ActivityRecord, garmin_activity: &GarminActivity) -> UpdateDecision {
    let mut garmin_name = garmin_activity.activity_name.trim();
    let mut garmin_description = garmin_activity.description.trim();

    if let Some(workout) = &garmin_activity.workout {
        let workout_name = workout.workout_name.trim();
        if !workout_name.is_empty() {
            garmin_name = workout_name;
        }
        let workout_description = workout.description.trim();
        if !workout_description.is_empty() {
            garmin_description = workout_description;
        }
    }

    let strava_name = target.name.trim();

    let mut needs_update = false;
    let mut new_name = strava_name;

    if !garmin_name.is_empty() && garmin_name != strava_name {
        // A generic Garmin name only wins when the current Strava name is
        // itself a confirmed-generic label.
        if !GENERIC_NAMES.contains(&garmin_name) || GENERIC_NAMES.contains(&strava_name) {
            new_name = garmin_name;
            needs_update = true;
        }
    }

    UpdateDecision {
        needs_update,
        new_name: new_name.to_string(),
        new_description: if garmin_description.is_empty() {
            None
        } else {
            Some(garmin_description.to_string())
        },
    }
}
