use agenda_core::Agenda;
use agenda_core::error_log::ErrorKind;
use anyhow::Result;
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn run(clear: Option<ErrorKind>) -> Result<()> {
    let log = Agenda::load()?.error_log();

    if let Some(kind) = clear {
        let removed = log.clear(kind)?;
        println!("Cleared {} {} errors", removed, kind.render());
        return Ok(());
    }

    let records = log.list()?;
    if records.is_empty() {
        println!("{}", "No errors".dimmed());
        return Ok(());
    }

    for record in &records {
        println!("{}", record.render());
    }
    println!("{}", format!("{} errors in {}", records.len(), log.path().display()).dimmed());

    Ok(())
}
