//! Normalized event types.
//!
//! An [`Event`] is rebuilt from the source tables on every refresh and is never
//! persisted as the canonical record: the tables stay the source of truth.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::fold;

/// A tri-state flag cell: explicitly yes, explicitly no, or left blank.
///
/// Blank and No both collapse to `false`, but they render and filter
/// differently, so the raw state is kept alongside the collapsed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    Yes,
    No,
    #[default]
    Blank,
}

impl Flag {
    /// Parse a raw cell. Unknown spellings are treated as blank.
    pub fn parse(raw: &str) -> Flag {
        match fold(raw).as_str() {
            "oui" | "yes" | "true" | "vrai" | "x" | "1" => Flag::Yes,
            "non" | "no" | "false" | "faux" | "0" => Flag::No,
            _ => Flag::Blank,
        }
    }

    pub fn is_yes(self) -> bool {
        self == Flag::Yes
    }
}

/// Back-reference to the source row an event was read from.
///
/// Only for diagnostics and display; never used for identity or hashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRowRef {
    pub source: String,
    /// Spreadsheet-style row number (header is row 1).
    pub row: usize,
}

impl fmt::Display for SourceRowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.row)
    }
}

/// A normalized event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub department: String,
    pub start: NaiveDateTime,
    /// Always >= `start` when present.
    pub end: Option<NaiveDateTime>,
    /// True if either bound carries a time of day.
    pub has_time: bool,
    pub service: String,
    pub title: String,
    pub on_site: bool,
    pub on_external_calendar: bool,
    pub on_external_calendar_raw: Flag,
    pub source_row: SourceRowRef,
}

impl Event {
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Whether this event is mirrored to the external calendar.
    pub fn is_syncable(&self) -> bool {
        self.on_site
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}
