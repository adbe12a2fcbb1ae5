use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error_log::{ErrorKind, ErrorRecord};
use crate::remote::{CalendarStore, DeleteOutcome};
use crate::sync::{
    DiffKind, ExternalEvent, ExternalEventOptions, ReconcilePlan, SyncChange, TrackingEntry,
};

/// What a reconciliation run did.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    /// The new tracking set: unchanged + created + entries whose delete failed.
    pub entries: Vec<TrackingEntry>,
    /// Writes that went through, in the order they were made.
    pub applied: Vec<SyncChange>,
    pub unchanged: usize,
    pub errors: Vec<ErrorRecord>,
}

impl ReconcileOutcome {
    /// (created, deleted)
    pub fn counts(&self) -> (usize, usize) {
        let created = self.applied.iter().filter(|c| c.kind == DiffKind::Create).count();
        (created, self.applied.len() - created)
    }

    pub fn failed(&self) -> usize {
        self.errors.len()
    }
}

/// Apply a plan against the external store.
///
/// One failed call never aborts the run: it becomes a SYNC error and the
/// tracking set is left so the next run retries it.
pub async fn reconcile<S: CalendarStore + ?Sized>(
    store: &S,
    plan: ReconcilePlan,
    options: &ExternalEventOptions,
    now: DateTime<Utc>,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome {
        unchanged: plan.unchanged.len(),
        entries: plan.unchanged,
        ..Default::default()
    };

    for entry in plan.to_delete {
        match delete_one(store, &entry).await {
            Ok(change) => outcome.applied.push(change),
            Err(error) => {
                outcome.errors.push(error);
                outcome.entries.push(entry);
            }
        }
    }

    for pending in plan.to_create {
        let external = ExternalEvent::from_event(&pending.event, options);

        match store.create_event(&external).await {
            Ok(id) => {
                tracing::debug!("Created {} for {}", id, pending.hash.short());
                outcome.applied.push(SyncChange {
                    kind: DiffKind::Create,
                    department: pending.event.department.clone(),
                    date: pending.event.date(),
                    label: pending.event.title.clone(),
                });
                outcome.entries.push(TrackingEntry {
                    content_hash: pending.hash,
                    external_event_id: id,
                    department: pending.event.department,
                    event_date: pending.event.start.date(),
                    last_synced_at: now,
                });
            }
            Err(e) => {
                tracing::warn!("Create failed for '{}': {}", pending.event.title, e);
                outcome.errors.push(
                    ErrorRecord::new(
                        ErrorKind::Sync,
                        format!("Could not create '{}'", pending.event.title),
                    )
                    .at_row(&pending.event.source_row)
                    .with_details(e.to_string()),
                );
            }
        }
    }

    outcome
}

/// What a purge did.
#[derive(Debug, Clone, Default)]
pub struct PurgeOutcome {
    pub deleted: usize,
    /// Entries whose delete failed; still tracked.
    pub remaining: Vec<TrackingEntry>,
    pub errors: Vec<ErrorRecord>,
}

/// Delete every tracked external event, `batch_size` at a time with a
/// pause between batches.
pub async fn purge<S: CalendarStore + ?Sized>(
    store: &S,
    entries: Vec<TrackingEntry>,
    batch_size: usize,
    pause: Duration,
) -> PurgeOutcome {
    let mut outcome = PurgeOutcome::default();
    let batches: Vec<&[TrackingEntry]> = entries.chunks(batch_size.max(1)).collect();

    for (i, batch) in batches.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(pause).await;
        }

        for entry in *batch {
            match delete_one(store, entry).await {
                Ok(_) => outcome.deleted += 1,
                Err(error) => {
                    outcome.errors.push(error);
                    outcome.remaining.push(entry.clone());
                }
            }
        }
    }

    outcome
}

async fn delete_one<S: CalendarStore + ?Sized>(
    store: &S,
    entry: &TrackingEntry,
) -> Result<SyncChange, ErrorRecord> {
    match store.delete_event(&entry.external_event_id).await {
        Ok(result) => {
            if result == DeleteOutcome::AlreadyGone {
                tracing::debug!("{} was already gone", entry.external_event_id);
            }
            Ok(SyncChange {
                kind: DiffKind::Delete,
                department: entry.department.clone(),
                date: entry.event_date,
                label: entry.external_event_id.clone(),
            })
        }
        Err(e) => {
            tracing::warn!("Delete failed for {}: {}", entry.external_event_id, e);
            Err(ErrorRecord::new(
                ErrorKind::Sync,
                format!("Could not delete external event {}", entry.external_event_id),
            )
            .with_department(entry.department.clone())
            .with_details(e.to_string()))
        }
    }
}
