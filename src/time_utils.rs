// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time parsing and the sync blackout window.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Timelike, Utc};

/// Parse a platform-local timestamp string into a naive datetime.
///
/// Both platforms report local wall-clock time in one of two formats:
/// ISO-8601 (optionally with a trailing `Z` and fractional seconds) or
/// `YYYY-MM-DD HH:MM:SS`. Returns `None` for anything else; callers drop
/// such records.
pub fn parse_local_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if raw.is_empty() {
        return None;
    }
    let parsed = if raw.contains('T') {
        NaiveDateTime::parse_from_str(raw.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S%.f")
    } else {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
    };
    match parsed {
        Ok(dt) => Some(dt),
        Err(err) => {
            tracing::warn!(raw, %err, "Unrecognized local timestamp format");
            None
        }
    }
}

/// True when `now`, viewed in the fixed reference offset, falls inside the
/// 00:00-06:00 blackout window during which sync runs are suppressed.
pub fn in_blackout_window(now: DateTime<Utc>, offset: FixedOffset) -> bool {
    now.with_timezone(&offset).hour() < 6
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_iso_format() {
        let dt = parse_local_timestamp("2026-08-20T06:31:02").unwrap();
        assert_eq!(dt.to_string(), "2026-08-20 06:31:02");
    }

    #[test]
    fn test_parse_iso_format_with_z_suffix() {
        let dt = parse_local_timestamp("2026-08-20T06:31:02Z").unwrap();
        assert_eq!(dt.to_string(), "2026-08-20 06:31:02");
    }

    #[test]
    fn test_parse_iso_format_with_fractional_seconds() {
        let dt = parse_local_timestamp("2026-08-20T06:31:02.000").unwrap();
        assert_eq!(dt.to_string(), "2026-08-20 06:31:02");
    }

    #[test]
    fn test_parse_space_separated_format() {
        let dt = parse_local_timestamp("2026-08-20 06:31:02").unwrap();
        assert_eq!(dt.to_string(), "2026-08-20 06:31:02");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_local_timestamp("").is_none());
        assert!(parse_local_timestamp("yesterday").is_none());
        assert!(parse_local_timestamp("2026-08-20").is_none());
    }

    #[test]
    fn test_blackout_window_edges() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();

        // 03:00 local -> 01:00 UTC
        let inside = Utc.with_ymd_and_hms(2026, 8, 20, 1, 0, 0).unwrap();
        assert!(in_blackout_window(inside, offset));

        // 00:00 local is inside, 06:00 local is outside.
        let midnight_local = Utc.with_ymd_and_hms(2026, 8, 19, 22, 0, 0).unwrap();
        assert!(in_blackout_window(midnight_local, offset));
        let six_local = Utc.with_ymd_and_hms(2026, 8, 20, 4, 0, 0).unwrap();
        assert!(!in_blackout_window(six_local, offset));

        let afternoon = Utc.with_ymd_and_hms(2026, 8, 20, 12, 0, 0).unwrap();
        assert!(!in_blackout_window(afternoon, offset));
    }
}
