use agenda_core::Agenda;
use anyhow::Result;
use owo_colors::OwoColorize;

use crate::utils::tui;

pub async fn run(yes: bool) -> Result<()> {
    let mut agenda = Agenda::load()?;
    let tracked = agenda.tracking().load()?;

    if tracked.is_empty() {
        println!("{}", "Nothing to purge".dimmed());
        return Ok(());
    }

    let remote = agenda.config().remote()?.clone();

    if !yes {
        println!(
            "This deletes {} events from {}. Run again with {} to proceed.",
            tracked.len().bold(),
            remote.provider.name(),
            "--yes".bold()
        );
        return Ok(());
    }

    let spinner = tui::create_spinner(format!("Deleting {} events", tracked.len()));
    let result = agenda.purge(&remote).await;
    spinner.finish_and_clear();

    let outcome = result?;
    println!("Deleted {} events", outcome.deleted);

    if !outcome.remaining.is_empty() {
        println!(
            "{}",
            format!(
                "{} could not be deleted, see `agenda errors`",
                outcome.remaining.len()
            )
            .red()
        );
    }

    Ok(())
}
