// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistent set of Strava activity IDs that are already reconciled.
//!
//! This is dedup memory, not a time-bounded cache: it grows monotonically
//! across runs and is never pruned. An ID, once resolved (updated, already
//! correct, or confirmed match-less), is never re-examined.

use std::collections::HashSet;
use std::path::Path;

/// Set of resolved Strava activity IDs, persisted as a JSON string array.
#[derive(Debug, Default)]
pub struct SyncedCache {
    ids: HashSet<String>,
}

impl SyncedCache {
    /// Load the cache from disk, returning an empty set when the file is
    /// absent or unreadable (the run then re-resolves everything, which is
    /// safe).
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|raw| serde_json::from_str::<Vec<String>>(&raw).map_err(|e| e.to_string()))
        {
            Ok(ids) => Self {
                ids: ids.into_iter().collect(),
            },
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "Could not read synced cache, starting empty");
                Self::default()
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn insert(&mut self, id: &str) {
        self.ids.insert(id.to_string());
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Write the full set back, replacing prior contents. Failure is
    /// logged, not fatal: the affected IDs are simply re-resolved next run.
    pub fn save(&self, path: &Path) {
        let mut ids: Vec<&String> = self.ids.iter().collect();
        ids.sort();

        let result = (|| -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let json = serde_json::to_string_pretty(&ids)?;
            std::fs::write(path, json)
        })();

        match result {
            Ok(()) => tracing::info!(path = %path.display(), count = ids.len(), "Synced cache written"),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "Could not save synced cache")
            }
        }
    }
}
