// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity models for both platforms.
//!
//! `ActivityRecord` is the normalized Strava-side target; `GarminActivity`
//! mirrors the camelCase JSON returned by Garmin Connect, with a parsed
//! start time and an optionally attached `Workout` filled in by the fetcher.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};

/// Normalized Strava activity, immutable for the duration of a sync run.
#[derive(Debug, Clone)]
pub struct ActivityRecord {
    /// Strava activity ID.
    pub id: String,
    /// Activity name/title, possibly a generic auto-generated label.
    pub name: String,
    /// Local start time, timezone-naive.
    pub start_time: NaiveDateTime,
    /// Sport type in Strava's taxonomy (Run, Ride, ...).
    pub activity_type: String,
}

/// Raw Garmin activity from the activity list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GarminActivity {
    #[serde(rename = "activityId", deserialize_with = "de_id_string")]
    pub activity_id: String,
    #[serde(rename = "activityName", default, deserialize_with = "de_null_default")]
    pub activity_name: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub description: String,
    #[serde(rename = "startTimeLocal", default, deserialize_with = "de_null_default")]
    pub start_time_local: String,
    #[serde(rename = "activityType", default, deserialize_with = "de_null_default")]
    pub activity_type: GarminActivityType,
    #[serde(rename = "workoutId", default, deserialize_with = "de_opt_id_string")]
    pub workout_id: Option<String>,
    /// Filled in after fetch; records where parsing fails are dropped.
    #[serde(skip)]
    pub parsed_start_time: Option<NaiveDateTime>,
    /// Richer workout record, attached lazily when `workout_id` is set.
    #[serde(skip)]
    pub workout: Option<Workout>,
}

impl GarminActivity {
    /// Garmin type key, lowercased for comparison against the mapped
    /// Strava taxonomy.
    pub fn type_key_lower(&self) -> String {
        self.activity_type.type_key.to_lowercase()
    }
}

/// Nested `activityType` object on a Garmin activity.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GarminActivityType {
    #[serde(rename = "typeKey", default, deserialize_with = "de_null_default")]
    pub type_key: String,
}

/// Structured Garmin workout linked from an activity.
///
/// When present, its name/description take priority over the raw
/// activity's own fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Workout {
    #[serde(rename = "workoutName", default, deserialize_with = "de_null_default")]
    pub workout_name: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub description: String,
}

/// Accept a JSON number or string ID and normalize to `String`.
fn de_id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    de_opt_id_string(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("missing or null activity ID"))
}

/// Accept a JSON number, string, or null for an optional ID.
fn de_opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

/// Treat JSON null like a missing field.
fn de_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
