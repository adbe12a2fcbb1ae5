use std::path::Path;

use agenda_core::Agenda;
use agenda_core::scheduler::Debouncer;
use anyhow::{Context, Result};
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use owo_colors::OwoColorize;
use tokio::sync::mpsc;

use super::sync::report;

pub async fn run() -> Result<()> {
    let agenda = Agenda::load()?;
    let config = agenda.config().clone();
    let remote = config.remote()?.clone();
    let sources = config.sources_path();
    let debouncer = Debouncer::new(config.quiet_period()?);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| match res {
            Ok(event) => {
                let _ = tx.send(event);
            }
            Err(e) => tracing::warn!("Watch error: {}", e),
        },
        Config::default(),
    )
    .context("Failed to create file watcher")?;

    watcher
        .watch(&sources, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", sources.display()))?;

    println!(
        "Watching {} {}",
        sources.display().bold(),
        format!("(sync {:?} after the last edit, ctrl-c to stop)", debouncer.quiet_period())
            .dimmed()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = rx.recv() => {
                let Some(event) = event else { break };
                if !touches_source(&event) {
                    continue;
                }
                tracing::debug!("Source change: {:?}", event.paths);

                let config = config.clone();
                let remote = remote.clone();
                debouncer.schedule(move || async move {
                    let mut agenda = Agenda::from_config(config);
                    match agenda.sync(&remote).await {
                        Ok(outcome) => report(&outcome),
                        Err(e) => println!("{}", e.to_string().red()),
                    }
                });
            }
        }
    }

    // A sync that already started must finish and save its tracking set
    println!("{}", "Stopping, waiting for a running sync to finish".dimmed());
    debouncer.shutdown().await;

    Ok(())
}

fn touches_source(event: &notify::Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| is_csv(p))
}

fn is_csv(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};
    use std::path::PathBuf;

    fn event(kind: EventKind, path: &str) -> notify::Event {
        notify::Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn only_csv_edits_trigger_a_sync() {
        assert!(touches_source(&event(EventKind::Modify(ModifyKind::Any), "/s/Musique.csv")));
        assert!(touches_source(&event(EventKind::Create(CreateKind::File), "/s/CDI.CSV")));
        assert!(touches_source(&event(EventKind::Remove(RemoveKind::File), "/s/CDI.csv")));
        assert!(!touches_source(&event(EventKind::Modify(ModifyKind::Any), "/s/.~lock.CDI.csv#")));
        assert!(!touches_source(&event(EventKind::Access(AccessKind::Any), "/s/CDI.csv")));
    }
}
