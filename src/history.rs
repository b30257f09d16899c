//! Capped, persistent calculation history.
//!
//! Newest-first list of evaluations with favorites, capped at a fixed
//! number of entries and stored as JSON in the platform data directory.
//! The history is owned by the CLI shell; the evaluation core never
//! touches it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Hard cap on stored entries; the oldest entries are dropped first.
const MAX_ENTRIES: usize = 200;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: u64,
    /// Input as the user typed it.
    pub expr: String,
    /// Expression the evaluator actually ran.
    pub normalized: String,
    /// Display string of the result.
    pub result: String,
    /// Unix timestamp (seconds).
    pub ts: u64,
    #[serde(default)]
    pub favorite: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct History {
    next_id: u64,
    entries: Vec<Entry>,
}

impl History {
    /// Load history from `path`, starting empty when the file is missing
    /// or unreadable.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!("discarding unreadable history file {}: {err}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Prepend an entry, dropping the oldest past the cap. Returns the
    /// new entry's id.
    pub fn add(&mut self, expr: &str, normalized: &str, result: &str) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(
            0,
            Entry {
                id,
                expr: expr.to_string(),
                normalized: normalized.to_string(),
                result: result.to_string(),
                ts: unix_now(),
                favorite: false,
            },
        );
        self.entries.truncate(MAX_ENTRIES);
        id
    }

    /// Remove an entry by id; returns whether it existed.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Toggle the favorite flag of an entry; returns the new state, or
    /// `None` when the id is unknown.
    pub fn toggle_favorite(&mut self, id: u64) -> Option<bool> {
        let entry = self.entries.iter_mut().find(|entry| entry.id == id)?;
        entry.favorite = !entry.favorite;
        Some(entry.favorite)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn favorites(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|entry| entry.favorite)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Default history location in the platform data directory.
pub fn default_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("synocalc").join("history.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_newest_first_and_capped() {
        let mut history = History::default();
        for i in 0..(MAX_ENTRIES + 5) {
            history.add(&format!("1 + {i}"), &format!("1+{i}"), "x");
        }
        assert_eq!(history.entries().len(), MAX_ENTRIES);
        // Newest entry first, oldest five dropped.
        assert_eq!(history.entries()[0].expr, format!("1 + {}", MAX_ENTRIES + 4));
        assert!(history.entries().iter().all(|e| e.expr != "1 + 4"));
        assert!(history.entries().iter().any(|e| e.expr == "1 + 5"));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut history = History::default();
        let id = history.add("2+2", "2+2", "4");
        assert!(history.remove(id));
        assert!(!history.remove(id));
        history.add("3+3", "3+3", "6");
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_toggle_favorite() {
        let mut history = History::default();
        let id = history.add("2+2", "2+2", "4");
        assert_eq!(history.toggle_favorite(id), Some(true));
        assert_eq!(history.favorites().count(), 1);
        assert_eq!(history.toggle_favorite(id), Some(false));
        assert_eq!(history.toggle_favorite(9999), None);
    }

    #[test]
    fn test_ids_stay_unique_after_reload_roundtrip() {
        let path = std::env::temp_dir().join(format!("synocalc-history-test-{}.json", std::process::id()));
        let mut history = History::default();
        history.add("2+2", "2+2", "4");
        history.add("3*3", "3*3", "9");
        history.save(&path).unwrap();

        let mut reloaded = History::load(&path);
        let id = reloaded.add("4-1", "4-1", "3");
        assert!(reloaded.entries().iter().filter(|e| e.id == id).count() == 1);
        assert_eq!(reloaded.entries().len(), 3);
        let _ = fs::remove_file(&path);
    }
}
