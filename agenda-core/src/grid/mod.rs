//! Month grids: filtered events laid out in Monday-first weeks of day cells.

mod cell;

pub use cell::{DayCell, DepartmentGlyphs, event_line, status_glyph};

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Months, NaiveDate};

use crate::event::Event;
use crate::filter::{AcademicYear, FilterSpec};
use crate::special_days::SpecialDays;

const MAX_WEEKS: usize = 6;

/// A week row: Monday to Sunday, `None` for padding outside the month.
pub type Week = [Option<DayCell>; 7];

#[derive(Debug, Clone, PartialEq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Week>,
}

impl MonthGrid {
    /// Cells that belong to the month, in date order.
    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flat_map(|w| w.iter().flatten())
    }
}

/// Months to draw for a filter: the pinned month, otherwise every month
/// that has at least one event, in academic order (August first).
pub fn months_to_render(spec: &FilterSpec, events: &[&Event]) -> Vec<(i32, u32)> {
    if let Some(pinned) = spec.pinned_month() {
        return vec![pinned];
    }

    let months: BTreeSet<(i32, u32)> = events
        .iter()
        .map(|e| (e.start.year(), e.start.month()))
        .collect();

    let mut months: Vec<_> = months.into_iter().collect();
    months.sort_by_key(|&(year, month)| {
        let academic = AcademicYear::containing(
            NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default(),
        );
        (academic, AcademicYear::month_index(month))
    });
    months
}

/// Group events by the date they start on, keeping their order.
pub fn group_by_day<'a>(events: &[&'a Event]) -> BTreeMap<NaiveDate, Vec<&'a Event>> {
    let mut days: BTreeMap<NaiveDate, Vec<&Event>> = BTreeMap::new();
    for event in events {
        days.entry(event.date()).or_default().push(*event);
    }
    days
}

/// Lays out filtered events as month grids.
#[derive(Debug, Clone)]
pub struct GridBuilder<'a> {
    pub special_days: &'a SpecialDays,
    pub today: NaiveDate,
    pub max_events_per_day: usize,
}

impl GridBuilder<'_> {
    pub fn build(&self, spec: &FilterSpec, events: &[&Event]) -> Vec<MonthGrid> {
        let by_day = group_by_day(events);

        months_to_render(spec, events)
            .into_iter()
            .filter_map(|(year, month)| self.month(year, month, &by_day))
            .collect()
    }

    pub fn month(
        &self,
        year: i32,
        month: u32,
        by_day: &BTreeMap<NaiveDate, Vec<&Event>>,
    ) -> Option<MonthGrid> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
        let offset = first.weekday().num_days_from_monday() as usize;

        let mut weeks = Vec::new();
        let mut next = Some(first);

        while weeks.len() < MAX_WEEKS {
            let Some(start) = next else { break };
            let lead = if weeks.is_empty() { offset } else { 0 };

            let mut week: Week = std::array::from_fn(|_| None);
            let mut date = start;
            for slot in week.iter_mut().skip(lead) {
                if date > last {
                    break;
                }
                *slot = Some(self.cell(date, by_day));
                date = date.succ_opt()?;
            }

            weeks.push(week);
            next = (date <= last).then_some(date);
        }

        Some(MonthGrid { year, month, weeks })
    }

    fn cell(&self, date: NaiveDate, by_day: &BTreeMap<NaiveDate, Vec<&Event>>) -> DayCell {
        let events: Vec<Event> = by_day
            .get(&date)
            .map(|events| events.iter().map(|e| (*e).clone()).collect())
            .unwrap_or_default();

        DayCell {
            date,
            shown: events.len().min(self.max_events_per_day),
            events,
            is_today: date == self.today,
            overlays: self.special_days.on(date).into_iter().cloned().collect(),
            background: self.special_days.background(date),
            label: self.special_days.label(date),
        }
    }
}
