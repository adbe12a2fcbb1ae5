//! Academic-year window and the secondary filters applied before rendering.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::event::Event;
use crate::utils::fold;

/// Academic years start on August 1st.
const FIRST_MONTH: u32 = 8;

const MONTHS_FR: [&str; 12] = [
    "janvier", "fevrier", "mars", "avril", "mai", "juin", "juillet", "aout", "septembre",
    "octobre", "novembre", "decembre",
];

const MONTHS_EN: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

/// An August 1 to July 31 span, identified by its first calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AcademicYear {
    pub first: i32,
}

impl AcademicYear {
    /// Parse a `"YYYY-YYYY"` token. The second year must follow the first.
    pub fn parse(token: &str) -> Option<Self> {
        let (a, b) = token.trim().split_once('-')?;
        if a.len() != 4 || b.len() != 4 {
            return None;
        }

        let first: i32 = a.parse().ok()?;
        let second: i32 = b.parse().ok()?;
        (second == first + 1).then_some(AcademicYear { first })
    }

    /// Parse `token`, falling back to the year containing `today`.
    pub fn parse_or_current(token: &str, today: NaiveDate) -> Self {
        Self::parse(token).unwrap_or_else(|| {
            tracing::debug!("Malformed academic year '{}', using current", token);
            Self::containing(today)
        })
    }

    pub fn containing(date: NaiveDate) -> Self {
        let first = if date.month() >= FIRST_MONTH {
            date.year()
        } else {
            date.year() - 1
        };
        AcademicYear { first }
    }

    pub fn second(&self) -> i32 {
        self.first + 1
    }

    /// First instant of the window (Aug 1, 00:00:00).
    pub fn start(&self) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(self.first, FIRST_MONTH, 1)
            .unwrap_or(NaiveDate::MIN)
            .and_time(NaiveTime::MIN)
    }

    /// Last instant of the window (Jul 31, 23:59:59).
    pub fn end(&self) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(self.second(), 7, 31)
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .unwrap_or(NaiveDateTime::MAX)
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start() <= at && at <= self.end()
    }

    /// Calendar year a month falls in: Aug–Dec in the first year, Jan–Jul in the second.
    pub fn year_of(&self, month: u32) -> i32 {
        if month >= FIRST_MONTH {
            self.first
        } else {
            self.second()
        }
    }

    /// Position of a month in academic order (August = 0, July = 11).
    pub fn month_index(month: u32) -> u32 {
        (month + 12 - FIRST_MONTH) % 12
    }
}

impl fmt::Display for AcademicYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.second())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    All,
    /// Events starting on or after the first day of the current month.
    #[default]
    CurrentAndUpcoming,
    /// A single month (1-12) of the academic year.
    Month(u32),
}

impl TimeRange {
    /// Parse a range token; unknown tokens mean [`TimeRange::CurrentAndUpcoming`].
    pub fn parse(token: &str) -> Self {
        let folded = fold(token);
        match folded.as_str() {
            "all" | "tout" | "tous" => TimeRange::All,
            "currentandupcoming" | "current" | "upcoming" | "" => TimeRange::CurrentAndUpcoming,
            name => month_from_name(name).map(TimeRange::Month).unwrap_or_else(|| {
                tracing::debug!("Unknown time range '{}', using current and upcoming", token);
                TimeRange::CurrentAndUpcoming
            }),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeRange::All => write!(f, "all"),
            TimeRange::CurrentAndUpcoming => write!(f, "currentAndUpcoming"),
            TimeRange::Month(m) => write!(f, "{}", MONTHS_EN[(*m as usize + 11) % 12]),
        }
    }
}

/// Month number for a French or English month name (already folded).
pub fn month_from_name(name: &str) -> Option<u32> {
    MONTHS_FR
        .iter()
        .position(|m| *m == name)
        .or_else(|| MONTHS_EN.iter().position(|m| *m == name))
        .map(|i| i as u32 + 1)
}

/// Filter over one of the tri-state columns (already collapsed to bool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagFilter {
    #[default]
    Any,
    Yes,
    No,
}

impl FlagFilter {
    pub fn parse(token: &str) -> Self {
        match fold(token).as_str() {
            "yes" | "oui" | "true" => FlagFilter::Yes,
            "no" | "non" | "false" => FlagFilter::No,
            _ => FlagFilter::Any,
        }
    }

    pub fn matches(self, value: bool) -> bool {
        match self {
            FlagFilter::Any => true,
            FlagFilter::Yes => value,
            FlagFilter::No => !value,
        }
    }
}

/// Everything that narrows the event set for one render. Rebuilt each time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub academic_year: AcademicYear,
    pub time_range: TimeRange,
    /// `None` means all departments.
    pub department: Option<String>,
    pub on_external_calendar: FlagFilter,
    pub on_site: FlagFilter,
    pub free_text: String,
}

impl FilterSpec {
    /// The "reset" filter for `today`.
    pub fn defaults(today: NaiveDate) -> Self {
        FilterSpec {
            academic_year: AcademicYear::containing(today),
            time_range: TimeRange::CurrentAndUpcoming,
            department: None,
            on_external_calendar: FlagFilter::Yes,
            on_site: FlagFilter::Any,
            free_text: String::new(),
        }
    }

    /// Set the department from a token, where `all` (or empty) clears it.
    pub fn with_department(mut self, token: &str) -> Self {
        let folded = fold(token);
        self.department = match folded.as_str() {
            "" | "all" | "tous" => None,
            _ => Some(token.trim().to_string()),
        };
        self
    }

    /// The month a pinned range renders, with its calendar year resolved
    /// inside the academic window.
    pub fn pinned_month(&self) -> Option<(i32, u32)> {
        match self.time_range {
            TimeRange::Month(m) => Some((self.academic_year.year_of(m), m)),
            _ => None,
        }
    }

    /// Events passing every predicate, in their original order.
    pub fn apply<'a>(&self, events: &'a [Event], today: NaiveDate) -> Vec<&'a Event> {
        let month_start = today
            .with_day(1)
            .unwrap_or(today)
            .and_time(NaiveTime::MIN);
        let department = self.department.as_deref().map(fold);
        let needle = fold(&self.free_text);

        events
            .iter()
            .filter(|e| self.academic_year.contains(e.start))
            .filter(|e| match self.time_range {
                TimeRange::All => true,
                TimeRange::CurrentAndUpcoming => e.start >= month_start,
                TimeRange::Month(m) => e.start.month() == m,
            })
            .filter(|e| department.as_ref().is_none_or(|d| fold(&e.department) == *d))
            .filter(|e| self.on_external_calendar.matches(e.on_external_calendar))
            .filter(|e| self.on_site.matches(e.on_site))
            .filter(|e| {
                needle.is_empty()
                    || [&e.title, &e.service, &e.department]
                        .iter()
                        .any(|field| fold(field).contains(&needle))
            })
            .collect()
    }
}
