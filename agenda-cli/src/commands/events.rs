use agenda_core::Agenda;
use agenda_core::filter::FilterSpec;
use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;

use crate::render::render_event_line;

pub fn run(filter: FilterSpec, today: NaiveDate) -> Result<()> {
    let mut agenda = Agenda::load()?;
    let events = agenda.events(&filter, today)?;

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    let mut current_date: Option<NaiveDate> = None;

    for event in &events {
        let date = event.date();
        if current_date != Some(date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", format_date_label(date, today).bold());
            current_date = Some(date);
        }

        println!("{}", render_event_line(event));
    }

    Ok(())
}

/// "Today", "Tomorrow", else e.g. "Wed Feb 25".
fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}
