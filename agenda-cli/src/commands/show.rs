use agenda_core::Agenda;
use agenda_core::filter::FilterSpec;
use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;

use crate::render::render_month;

pub fn run(filter: FilterSpec, today: NaiveDate) -> Result<()> {
    let mut agenda = Agenda::load()?;
    let rendered = agenda.render(&filter, today)?;

    println!(
        "{} {}",
        rendered.filter.academic_year.bold(),
        format!(
            "({}, {} of {} events)",
            rendered.filter.time_range, rendered.matched, rendered.total
        )
        .dimmed()
    );

    if rendered.grids.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    for grid in &rendered.grids {
        println!();
        println!("{}", render_month(grid, &rendered.glyphs));
    }

    Ok(())
}
