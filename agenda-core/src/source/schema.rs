//! Schema sniffing for hand-typed source headers.

use crate::utils::fold;

/// Which column holds what, for a source that qualifies as an event source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Start column (new schema) or the single date column (legacy schema).
    pub start: usize,
    /// True when `start` is the legacy single date column.
    pub legacy: bool,
    pub end: Option<usize>,
    pub service: usize,
    pub title: usize,
    pub on_site: Option<usize>,
    pub on_external_calendar: Option<usize>,
}

/// Detect whether a header row describes an event source.
///
/// A source qualifies when it has a start column (or a legacy date column),
/// a service column and an event column. Matching is accent- and
/// case-insensitive since headers are typed by hand.
pub fn sniff<S: AsRef<str>>(header: &[S]) -> Option<ColumnMapping> {
    let names: Vec<String> = header.iter().map(|h| fold(h.as_ref())).collect();

    let find = |pred: fn(&str) -> bool| names.iter().position(|n| pred(n));

    let new_start = find(is_start_column);
    let legacy_date = find(|n| n == "date");
    let service = find(|n| n.contains("service"))?;
    let title = find(is_title_column)?;

    let (start, legacy) = match (new_start, legacy_date) {
        (Some(i), _) => (i, false),
        (None, Some(i)) => (i, true),
        (None, None) => return None,
    };

    let end = if legacy { None } else { find(is_end_column) };

    Some(ColumnMapping {
        start,
        legacy,
        end,
        service,
        title,
        on_site: find(is_on_site_column),
        on_external_calendar: find(is_calendar_column),
    })
}

fn is_start_column(name: &str) -> bool {
    name.contains("debut") || name == "start" || name == "start date"
}

fn is_end_column(name: &str) -> bool {
    name.split(|c: char| !c.is_alphanumeric()).any(|w| w == "fin")
        || name == "end"
        || name == "end date"
}

fn is_title_column(name: &str) -> bool {
    name.starts_with("evenement") || name.starts_with("event")
}

fn is_on_site_column(name: &str) -> bool {
    ["sur place", "sur site", "on site", "onsite"]
        .iter()
        .any(|k| name.contains(k))
}

fn is_calendar_column(name: &str) -> bool {
    ["agenda", "calendrier", "calendar"]
        .iter()
        .any(|k| name.contains(k))
}
