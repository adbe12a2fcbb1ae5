use agenda_core::Agenda;
use agenda_core::sync::{DiffKind, ReconcileOutcome, SyncChange};
use anyhow::Result;
use owo_colors::OwoColorize;

use super::COMPACT_THRESHOLD;
use crate::render::Render;
use crate::utils::tui;

pub async fn run(dry_run: bool) -> Result<()> {
    let mut agenda = Agenda::load()?;

    if dry_run {
        let plan = agenda.plan_sync()?;
        if plan.is_empty() {
            println!("{}", "Everything up to date".dimmed());
        } else {
            print_changes(&plan.changes());
        }
        return Ok(());
    }

    let remote = agenda.config().remote()?.clone();

    let spinner = tui::create_spinner(format!("Syncing with {}", remote.provider.name()));
    let result = agenda.sync(&remote).await;
    spinner.finish_and_clear();

    report(&result?);
    Ok(())
}

/// Print what a finished sync did.
pub fn report(outcome: &ReconcileOutcome) {
    if outcome.applied.is_empty() && outcome.failed() == 0 {
        println!("{}", "Everything up to date".dimmed());
        return;
    }

    print_changes(&outcome.applied);

    let (created, deleted) = outcome.counts();
    println!("\nPushed: {} created, {} deleted", created, deleted);

    if outcome.failed() > 0 {
        println!(
            "{}",
            format!("{} failed, see `agenda errors`", outcome.failed()).red()
        );
    }
}

fn print_changes(changes: &[SyncChange]) {
    if changes.len() > COMPACT_THRESHOLD {
        let created = changes.iter().filter(|c| c.kind == DiffKind::Create).count();
        let deleted = changes.len() - created;
        println!(
            "   {} {} to create, {} {} to delete",
            "+".green(),
            created,
            "-".red(),
            deleted
        );
        return;
    }

    for change in changes {
        println!("   {}", change.render());
    }
}
