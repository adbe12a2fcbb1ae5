//! Append-only log of data, parse and sync problems.
//!
//! Processing never stops for a bad row or a failed provider call; the problem
//! is recorded here and the run moves on. Writing to the log must not fail
//! either: if the file can't be written, records fall back to `tracing`.

use std::fmt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AgendaResult;
use crate::event::SourceRowRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ErrorKind {
    /// Malformed or missing date, missing title, bad end bound.
    Data,
    /// External calendar call failed for one event.
    Sync,
    /// Malformed date literal outside the source tables.
    Parse,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Data => write!(f, "DATA"),
            ErrorKind::Sync => write!(f, "SYNC"),
            ErrorKind::Parse => write!(f, "PARSE"),
        }
    }
}

impl FromStr for ErrorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DATA" => Ok(ErrorKind::Data),
            "SYNC" => Ok(ErrorKind::Sync),
            "PARSE" => Ok(ErrorKind::Parse),
            _ => Err(format!("Unknown error type '{s}'. Expected DATA, SYNC or PARSE")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub timestamp: DateTime<Utc>,
    pub kind: ErrorKind,
    pub department: String,
    pub row_ref: String,
    pub description: String,
    pub details: String,
}

impl ErrorRecord {
    pub fn new(kind: ErrorKind, description: impl Into<String>) -> Self {
        ErrorRecord {
            timestamp: Utc::now(),
            kind,
            department: String::new(),
            row_ref: String::new(),
            description: description.into(),
            details: String::new(),
        }
    }

    pub fn data(row: &SourceRowRef, description: impl Into<String>) -> Self {
        ErrorRecord::new(ErrorKind::Data, description).at_row(row)
    }

    pub fn at_row(mut self, row: &SourceRowRef) -> Self {
        self.department = row.source.clone();
        self.row_ref = row.to_string();
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.kind)?;
        if !self.row_ref.is_empty() {
            write!(f, " {}", self.row_ref)?;
        } else if !self.department.is_empty() {
            write!(f, " {}", self.department)?;
        }
        write!(f, " {}", self.description)?;
        if !self.details.is_empty() {
            write!(f, " ({})", self.details)?;
        }
        Ok(())
    }
}

/// CSV-backed error log at `<data_dir>/errors.csv`.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ErrorLog { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append records, falling back to `tracing` if the log can't be written.
    pub fn record(&self, records: &[ErrorRecord]) {
        if records.is_empty() {
            return;
        }

        if let Err(e) = self.append(records) {
            tracing::error!(
                "Could not write error log {}: {}",
                self.path.display(),
                e
            );
            for record in records {
                tracing::error!("{}", record);
            }
        }
    }

    pub fn append(&self, records: &[ErrorRecord]) -> AgendaResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let needs_header = std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);

        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        Ok(())
    }

    /// All records, oldest first. A missing log reads as empty.
    pub fn list(&self) -> AgendaResult<Vec<ErrorRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let records = reader
            .deserialize()
            .collect::<Result<Vec<ErrorRecord>, _>>()?;

        Ok(records)
    }

    /// Remove every record of `kind`, keeping the others in their order.
    /// Returns how many records were removed.
    pub fn clear(&self, kind: ErrorKind) -> AgendaResult<usize> {
        let records = self.list()?;
        let before = records.len();
        let kept: Vec<_> = records.into_iter().filter(|r| r.kind != kind).collect();
        let removed = before - kept.len();

        if removed > 0 {
            self.rewrite(&kept)?;
        }

        Ok(removed)
    }

    fn rewrite(&self, records: &[ErrorRecord]) -> AgendaResult<()> {
        let temp = self.path.with_extension("csv.tmp");

        {
            let mut writer = csv::Writer::from_path(&temp)?;
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }

        std::fs::rename(&temp, &self.path)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(source: &str, row: usize) -> SourceRowRef {
        SourceRowRef {
            source: source.into(),
            row,
        }
    }

    #[test]
    fn append_then_list_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("errors.csv"));

        log.append(&[ErrorRecord::data(&row("Musique", 3), "Missing title")])
            .unwrap();
        log.append(&[
            ErrorRecord::new(ErrorKind::Sync, "Create failed").with_department("Sport"),
            ErrorRecord::data(&row("Arts", 9), "Invalid date").with_details("TBD"),
        ])
        .unwrap();

        let records = log.list().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].row_ref, "Musique:3");
        assert_eq!(records[1].kind, ErrorKind::Sync);
        assert_eq!(records[2].details, "TBD");
    }

    #[test]
    fn clear_removes_only_matching_kind() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("errors.csv"));

        log.append(&[
            ErrorRecord::data(&row("A", 2), "first"),
            ErrorRecord::new(ErrorKind::Sync, "sync one"),
            ErrorRecord::data(&row("B", 5), "second"),
            ErrorRecord::new(ErrorKind::Parse, "parse one"),
            ErrorRecord::new(ErrorKind::Sync, "sync two"),
        ])
        .unwrap();

        let removed = log.clear(ErrorKind::Sync).unwrap();
        assert_eq!(removed, 2);

        let descriptions: Vec<_> = log
            .list()
            .unwrap()
            .into_iter()
            .map(|r| r.description)
            .collect();
        assert_eq!(descriptions, vec!["first", "second", "parse one"]);
    }

    #[test]
    fn missing_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("nope.csv"));
        assert!(log.list().unwrap().is_empty());
        assert_eq!(log.clear(ErrorKind::Data).unwrap(), 0);
    }

    #[test]
    fn record_to_unwritable_path_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the append fail.
        let path = dir.path().join("errors.csv");
        std::fs::create_dir_all(&path).unwrap();
        let log = ErrorLog::new(&path);

        log.record(&[ErrorRecord::new(ErrorKind::Data, "still fine")]);
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("data".parse::<ErrorKind>().unwrap(), ErrorKind::Data);
        assert_eq!("SYNC".parse::<ErrorKind>().unwrap(), ErrorKind::Sync);
        assert!("other".parse::<ErrorKind>().is_err());
    }
}
