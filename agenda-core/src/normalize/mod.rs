//! Raw source rows to canonical [`Event`]s.

mod datetime;

pub use datetime::{CellDateTime, parse_cell};

use crate::error_log::ErrorRecord;
use crate::event::{Event, Flag, SourceRowRef};
use crate::source::{ColumnMapping, SourceSet, SourceTable};

/// What became of a single source row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// A usable event, possibly with non-fatal problems (e.g. a bad end date).
    Event(Box<Event>, Vec<ErrorRecord>),
    /// No date and no title: blank padding, skipped silently.
    Blank,
    /// Unusable row, skipped and reported.
    Rejected(ErrorRecord),
}

/// Result of normalizing every source of a refresh.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    /// All events, sorted by start (stable: ties keep discovery order).
    pub events: Vec<Event>,
    pub errors: Vec<ErrorRecord>,
    /// Departments of the sources that qualified, in read order.
    pub departments: Vec<String>,
    /// Departments whose source couldn't be read this time.
    pub unreadable: Vec<String>,
}

/// Normalize a whole refresh, carrying over the files that couldn't be read.
pub fn normalize_sources(sources: &SourceSet) -> Normalized {
    let mut normalized = normalize_all(&sources.tables);
    normalized.errors.splice(0..0, sources.errors.iter().cloned());
    normalized.unreadable = sources.unreadable.clone();
    normalized
}

/// Normalize every qualifying source table.
pub fn normalize_all(tables: &[SourceTable]) -> Normalized {
    let mut normalized = Normalized::default();

    for table in tables {
        let Some(mapping) = table.mapping() else {
            tracing::debug!("Source '{}' is not an event source, skipping", table.id);
            continue;
        };

        let (events, errors) = normalize_table(table, &mapping);
        tracing::debug!(
            "Source '{}': {} events, {} problems",
            table.id,
            events.len(),
            errors.len()
        );

        normalized.departments.push(table.id.clone());
        normalized.events.extend(events);
        normalized.errors.extend(errors);
    }

    normalized.events.sort_by_key(|e| e.start);
    normalized
}

/// Normalize the rows of one table whose header matched `mapping`.
pub fn normalize_table(
    table: &SourceTable,
    mapping: &ColumnMapping,
) -> (Vec<Event>, Vec<ErrorRecord>) {
    let mut events = Vec::new();
    let mut errors = table.problems.clone();

    for (index, cells) in table.rows.iter().enumerate() {
        let row_ref = SourceRowRef {
            source: table.id.clone(),
            row: SourceTable::row_number(index),
        };

        match normalize_row(&table.id, row_ref, cells, mapping) {
            RowOutcome::Event(event, problems) => {
                events.push(*event);
                errors.extend(problems);
            }
            RowOutcome::Blank => {}
            RowOutcome::Rejected(error) => errors.push(error),
        }
    }

    (events, errors)
}

pub fn normalize_row(
    department: &str,
    row_ref: SourceRowRef,
    cells: &[String],
    mapping: &ColumnMapping,
) -> RowOutcome {
    let cell = |i: usize| cells.get(i).map(|s| s.trim()).unwrap_or("");
    let flag = |col: Option<usize>| col.map(|i| Flag::parse(cell(i))).unwrap_or_default();

    let title = cell(mapping.title);
    let start_raw = cell(mapping.start);

    match (title.is_empty(), start_raw.is_empty()) {
        (true, true) => return RowOutcome::Blank,
        (true, false) => {
            return RowOutcome::Rejected(
                ErrorRecord::data(&row_ref, "Missing event title").with_details(start_raw),
            );
        }
        (false, true) => {
            return RowOutcome::Rejected(
                ErrorRecord::data(&row_ref, "Missing date").with_details(title),
            );
        }
        (false, false) => {}
    }

    let Some(start) = parse_cell(start_raw) else {
        return RowOutcome::Rejected(
            ErrorRecord::data(&row_ref, format!("Invalid date for '{title}'"))
                .with_details(start_raw),
        );
    };

    let mut problems = Vec::new();
    let mut end = None;

    if let Some(col) = mapping.end {
        let end_raw = cell(col);
        if !end_raw.is_empty() {
            match parse_cell(end_raw) {
                None => problems.push(
                    ErrorRecord::data(&row_ref, format!("Invalid end date for '{title}'"))
                        .with_details(end_raw),
                ),
                // A bare end date on the same day as a timed start adds nothing
                Some(e) if !e.has_time && e.value.date() == start.value.date() => {}
                Some(e) if e.value < start.value => problems.push(
                    ErrorRecord::data(&row_ref, format!("End before start for '{title}'"))
                        .with_details(format!("{start_raw} > {end_raw}")),
                ),
                Some(e) => end = Some(e),
            }
        }
    }

    let on_external_calendar_raw = flag(mapping.on_external_calendar);

    let event = Event {
        department: department.to_string(),
        start: start.value,
        end: end.map(|e| e.value),
        has_time: start.has_time || end.is_some_and(|e| e.has_time),
        service: cell(mapping.service).to_string(),
        title: title.to_string(),
        on_site: flag(mapping.on_site).is_yes(),
        on_external_calendar: on_external_calendar_raw.is_yes(),
        on_external_calendar_raw,
        source_row: row_ref,
    };

    RowOutcome::Event(Box::new(event), problems)
}
