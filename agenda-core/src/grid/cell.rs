use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::event::{Event, Flag};
use crate::special_days::{Background, Overlay};
use crate::utils::fold;

const DEFAULT_DEPARTMENT_GLYPH: &str = "•";

/// Per-department glyphs shown in front of event titles.
///
/// Department names match case- and accent-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentGlyphs(HashMap<String, String>);

impl DepartmentGlyphs {
    pub fn new(glyphs: HashMap<String, String>) -> Self {
        DepartmentGlyphs(
            glyphs
                .into_iter()
                .map(|(department, glyph)| (fold(&department), glyph))
                .collect(),
        )
    }

    pub fn glyph(&self, department: &str) -> &str {
        self.0
            .get(&fold(department))
            .map(String::as_str)
            .unwrap_or(DEFAULT_DEPARTMENT_GLYPH)
    }
}

/// Status glyph for the raw on-calendar flag. Blank and an explicit "no"
/// both mean "not on the calendar" but read differently.
pub fn status_glyph(flag: Flag) -> &'static str {
    match flag {
        Flag::Yes => "📅",
        Flag::No => "🙈",
        Flag::Blank => "?",
    }
}

/// One calendar day inside a month grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    /// Every event starting on this date, in normalizer order.
    pub events: Vec<Event>,
    /// How many of `events` are displayed.
    pub shown: usize,
    pub is_today: bool,
    pub overlays: Vec<Overlay>,
    pub background: Background,
    /// Public holiday name, else the school break label.
    pub label: Option<String>,
}

impl DayCell {
    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn displayed(&self) -> &[Event] {
        &self.events[..self.shown]
    }

    pub fn overflow(&self) -> usize {
        self.events.len() - self.shown
    }

    /// Text block for the cell: day number, optional label, the capped
    /// event lines, then an overflow line.
    pub fn lines(&self, glyphs: &DepartmentGlyphs) -> Vec<String> {
        let mut lines = vec![self.day().to_string()];

        if let Some(label) = &self.label {
            lines.push(label.clone());
        }

        lines.extend(self.displayed().iter().map(|e| event_line(e, glyphs)));

        if self.overflow() > 0 {
            lines.push(format!("+{} more", self.overflow()));
        }

        lines
    }
}

pub fn event_line(event: &Event, glyphs: &DepartmentGlyphs) -> String {
    let time = if event.has_time {
        event.start.format("%H:%M ").to_string()
    } else {
        String::new()
    };

    format!(
        "{}{} {}{}",
        status_glyph(event.on_external_calendar_raw),
        glyphs.glyph(&event.department),
        time,
        event.title
    )
}
