//! Date-range overlays: public holidays, school breaks and staff absences.
//!
//! Loaded from a TOML file of the form:
//!
//! ```toml
//! [[public_holiday]]
//! label = "Toussaint"
//! start = "2025-11-01"
//!
//! [[school_break]]
//! label = "Vacances d'automne"
//! start = "2025-10-18"
//! end = "2025-11-02"
//!
//! [[staff_absence]]
//! label = "Formation équipe"
//! start = "2025-12-04"
//! ```

use std::path::Path;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::constants::SCHOOL_BREAK_LABEL;
use crate::error::{AgendaError, AgendaResult};
use crate::error_log::{ErrorKind, ErrorRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    PublicHoliday,
    SchoolBreak,
    StaffAbsence,
}

/// A labelled, inclusive date range layered onto day cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlay {
    pub kind: OverlayKind,
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Overlay {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Background styling of a day cell, lowest priority first.
///
/// Only the highest-priority applicable background is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Background {
    #[default]
    None,
    Weekend,
    SchoolBreak,
    PublicHoliday,
    StaffAbsence,
}

impl From<OverlayKind> for Background {
    fn from(kind: OverlayKind) -> Self {
        match kind {
            OverlayKind::PublicHoliday => Background::PublicHoliday,
            OverlayKind::SchoolBreak => Background::SchoolBreak,
            OverlayKind::StaffAbsence => Background::StaffAbsence,
        }
    }
}

/// All overlays known for a refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecialDays {
    overlays: Vec<Overlay>,
}

#[derive(Debug, Deserialize, Default)]
struct SpecialDaysFile {
    #[serde(default)]
    public_holiday: Vec<RawOverlay>,
    #[serde(default)]
    school_break: Vec<RawOverlay>,
    #[serde(default)]
    staff_absence: Vec<RawOverlay>,
}

#[derive(Debug, Deserialize)]
struct RawOverlay {
    label: String,
    start: String,
    end: Option<String>,
}

impl SpecialDays {
    pub fn new(overlays: Vec<Overlay>) -> Self {
        SpecialDays { overlays }
    }

    /// Load overlays from `path`. A missing file means no overlays.
    ///
    /// Entries with malformed dates are skipped and returned as PARSE errors.
    pub fn load(path: &Path) -> AgendaResult<(Self, Vec<ErrorRecord>)> {
        if !path.exists() {
            tracing::debug!("No special days file at {}", path.display());
            return Ok((SpecialDays::default(), Vec::new()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> AgendaResult<(Self, Vec<ErrorRecord>)> {
        let file: SpecialDaysFile =
            toml::from_str(content).map_err(|e| AgendaError::SpecialDays(e.to_string()))?;

        let mut overlays = Vec::new();
        let mut errors = Vec::new();

        let groups = [
            (OverlayKind::PublicHoliday, file.public_holiday),
            (OverlayKind::SchoolBreak, file.school_break),
            (OverlayKind::StaffAbsence, file.staff_absence),
        ];

        for (kind, entries) in groups {
            for raw in entries {
                match raw.into_overlay(kind) {
                    Ok(overlay) => overlays.push(overlay),
                    Err(error) => errors.push(error),
                }
            }
        }

        Ok((SpecialDays { overlays }, errors))
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    /// Overlays covering `date`, in file order.
    pub fn on(&self, date: NaiveDate) -> Vec<&Overlay> {
        self.overlays.iter().filter(|o| o.covers(date)).collect()
    }

    /// Highest-priority background for `date`:
    /// staff absence > public holiday > school break > weekend > none.
    pub fn background(&self, date: NaiveDate) -> Background {
        let weekend = if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            Background::Weekend
        } else {
            Background::None
        };

        self.on(date)
            .into_iter()
            .map(|o| Background::from(o.kind))
            .fold(weekend, Background::max)
    }

    /// Text label for `date`, independent of the background: a public
    /// holiday's name, else the school break label.
    pub fn label(&self, date: NaiveDate) -> Option<String> {
        let overlays = self.on(date);

        overlays
            .iter()
            .find(|o| o.kind == OverlayKind::PublicHoliday)
            .map(|o| o.label.clone())
            .or_else(|| {
                overlays
                    .iter()
                    .any(|o| o.kind == OverlayKind::SchoolBreak)
                    .then(|| SCHOOL_BREAK_LABEL.to_string())
            })
    }
}

impl RawOverlay {
    fn into_overlay(self, kind: OverlayKind) -> Result<Overlay, ErrorRecord> {
        let parse = |s: &str| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d");

        let start = parse(&self.start).map_err(|_| {
            ErrorRecord::new(ErrorKind::Parse, format!("Invalid start date for '{}'", self.label))
                .with_details(self.start.clone())
        })?;

        let end = match &self.end {
            Some(raw) => parse(raw).map_err(|_| {
                ErrorRecord::new(ErrorKind::Parse, format!("Invalid end date for '{}'", self.label))
                    .with_details(raw.clone())
            })?,
            None => start,
        };

        if end < start {
            return Err(ErrorRecord::new(
                ErrorKind::Parse,
                format!("End before start for '{}'", self.label),
            )
            .with_details(format!("{} > {}", self.start, end)));
        }

        Ok(Overlay {
            kind,
            label: self.label,
            start,
            end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const SAMPLE: &str = r#"
[[public_holiday]]
label = "Toussaint"
start = "2025-11-01"

[[school_break]]
label = "Vacances d'automne"
start = "2025-10-18"
end = "2025-11-02"

[[staff_absence]]
label = "Formation"
start = "2025-10-20"
end = "2025-10-21"
"#;

    #[test]
    fn parses_all_kinds() {
        let (days, errors) = SpecialDays::parse(SAMPLE).unwrap();
        assert!(errors.is_empty());
        assert_eq!(days.overlays().len(), 3);
        assert_eq!(days.overlays()[0].end, date(2025, 11, 1));
    }

    #[test]
    fn holiday_on_saturday_beats_weekend() {
        let (days, _) = SpecialDays::parse(SAMPLE).unwrap();
        // 2025-11-01 is a Saturday
        assert_eq!(days.background(date(2025, 11, 1)), Background::PublicHoliday);
    }

    #[test]
    fn absence_beats_everything() {
        let (days, _) = SpecialDays::parse(SAMPLE).unwrap();
        assert_eq!(days.background(date(2025, 10, 20)), Background::StaffAbsence);
        // label still shows the break even though its colour lost
        assert_eq!(days.label(date(2025, 10, 20)).as_deref(), Some("Vacances"));
    }

    #[test]
    fn label_prefers_holiday_name_over_break() {
        let (days, _) = SpecialDays::parse(SAMPLE).unwrap();
        assert_eq!(days.label(date(2025, 11, 1)).as_deref(), Some("Toussaint"));
        assert_eq!(days.label(date(2025, 10, 25)).as_deref(), Some("Vacances"));
        assert_eq!(days.label(date(2025, 12, 1)), None);
    }

    #[test]
    fn weekend_and_plain_days() {
        let days = SpecialDays::default();
        assert_eq!(days.background(date(2025, 9, 6)), Background::Weekend);
        assert_eq!(days.background(date(2025, 9, 8)), Background::None);
    }

    #[test]
    fn malformed_entries_are_parse_errors() {
        let content = r#"
[[public_holiday]]
label = "Bad"
start = "01/11/2025"

[[school_break]]
label = "Backwards"
start = "2025-12-20"
end = "2025-12-01"

[[school_break]]
label = "Noël"
start = "2025-12-20"
end = "2026-01-04"
"#;
        let (days, errors) = SpecialDays::parse(content).unwrap();
        assert_eq!(days.overlays().len(), 1);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.kind == ErrorKind::Parse));
    }

    #[test]
    fn missing_file_means_no_overlays() {
        let dir = tempfile::tempdir().unwrap();
        let (days, errors) = SpecialDays::load(&dir.path().join("none.toml")).unwrap();
        assert!(days.overlays().is_empty());
        assert!(errors.is_empty());
    }
}
