//! Persisted record of what exists in the external calendar and why.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AgendaError, AgendaResult};
use crate::sync::ContentHash;

/// Links a content hash to the external event created for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEntry {
    pub content_hash: ContentHash,
    pub external_event_id: String,
    pub department: String,
    pub event_date: NaiveDate,
    pub last_synced_at: DateTime<Utc>,
}

/// The tracking set as a CSV file, fully rewritten on every save.
#[derive(Debug, Clone)]
pub struct TrackingStore {
    path: PathBuf,
}

impl TrackingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TrackingStore { path: path.into() }
    }

    /// All tracked entries. A missing file means nothing has been synced yet.
    pub fn load(&self) -> AgendaResult<Vec<TrackingEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        reader
            .deserialize()
            .collect::<Result<Vec<TrackingEntry>, _>>()
            .map_err(|e| AgendaError::Tracking(format!("{}: {}", self.path.display(), e)))
    }

    /// Replace the tracking set. Written to a temp file then renamed so a
    /// crash never leaves a half-written set behind.
    pub fn save(&self, entries: &[TrackingEntry]) -> AgendaResult<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let temp = self.path.with_extension("csv.tmp");

        let mut writer = csv::Writer::from_path(&temp)?;
        for entry in entries {
            writer.serialize(entry)?;
        }
        writer.flush()?;
        drop(writer);

        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hash: &str, id: &str) -> TrackingEntry {
        TrackingEntry {
            content_hash: ContentHash::from(hash.to_string()),
            external_event_id: id.to_string(),
            department: "Vie scolaire".to_string(),
            event_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            last_synced_at: DateTime::parse_from_rfc3339("2025-09-30T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = TrackingStore::new(dir.path().join("tracking.csv"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_replaces_whole_set() {
        let dir = tempfile::tempdir().unwrap();
        let store = TrackingStore::new(dir.path().join("data/tracking.csv"));

        store.save(&[entry("h1", "e1"), entry("h2", "e2")]).unwrap();
        assert_eq!(store.load().unwrap().len(), 2);

        store.save(&[entry("h3", "e3")]).unwrap();
        assert_eq!(store.load().unwrap(), vec![entry("h3", "e3")]);
        assert!(!dir.path().join("data/tracking.csv.tmp").exists());
    }

    #[test]
    fn empty_set_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = TrackingStore::new(dir.path().join("tracking.csv"));
        store.save(&[]).unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}
