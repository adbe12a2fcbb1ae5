use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::sync::{ContentHash, TrackingEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffKind {
    Create,
    Delete,
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffKind::Create => write!(f, "+"),
            DiffKind::Delete => write!(f, "-"),
        }
    }
}

/// One external write a plan calls for, for previews and reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncChange {
    pub kind: DiffKind,
    pub department: String,
    pub date: NaiveDate,
    /// Title for creates; deletes only know the external id.
    pub label: String,
}

impl fmt::Display for SyncChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} [{}] {}", self.kind, self.date, self.department, self.label)
    }
}

/// An event that needs an external counterpart.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCreate {
    pub hash: ContentHash,
    pub event: Event,
}

/// Three-way partition of the tracking set against the current events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    /// Tracked and still present: carried forward untouched.
    pub unchanged: Vec<TrackingEntry>,
    pub to_create: Vec<PendingCreate>,
    /// Tracked but no longer present.
    pub to_delete: Vec<TrackingEntry>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_delete.is_empty()
    }

    pub fn changes(&self) -> Vec<SyncChange> {
        let deletes = self.to_delete.iter().map(|entry| SyncChange {
            kind: DiffKind::Delete,
            department: entry.department.clone(),
            date: entry.event_date,
            label: entry.external_event_id.clone(),
        });

        let creates = self.to_create.iter().map(|pending| SyncChange {
            kind: DiffKind::Create,
            department: pending.event.department.clone(),
            date: pending.event.date(),
            label: pending.event.title.clone(),
        });

        deletes.chain(creates).collect()
    }
}

/// Diff the tracked entries against the syncable events.
///
/// Events with identical content collapse onto one hash and so onto one
/// external event. A content change shows up as a delete of the old hash
/// plus a create of the new one.
pub fn plan(tracked: &[TrackingEntry], syncable: &[&Event]) -> ReconcilePlan {
    let mut current: HashMap<ContentHash, &Event> = HashMap::new();
    let mut order = Vec::new();

    for event in syncable {
        let hash = ContentHash::of(event);
        if !current.contains_key(&hash) {
            order.push(hash.clone());
            current.insert(hash, *event);
        }
    }

    let mut plan = ReconcilePlan::default();
    let mut tracked_hashes = HashSet::new();

    for entry in tracked {
        if !tracked_hashes.insert(entry.content_hash.clone()) {
            // Same hash tracked twice: the extra external event is stale
            plan.to_delete.push(entry.clone());
        } else if current.contains_key(&entry.content_hash) {
            plan.unchanged.push(entry.clone());
        } else {
            plan.to_delete.push(entry.clone());
        }
    }

    for hash in order {
        if tracked_hashes.contains(&hash) {
            continue;
        }
        if let Some(event) = current.remove(&hash) {
            plan.to_create.push(PendingCreate {
                hash,
                event: event.clone(),
            });
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Flag, SourceRowRef};
    use chrono::{DateTime, Utc};

    fn event(title: &str) -> Event {
        Event {
            department: "Vie scolaire".to_string(),
            start: NaiveDate::from_ymd_opt(2025, 10, 3)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            end: None,
            has_time: false,
            service: "CPE".to_string(),
            title: title.to_string(),
            on_site: true,
            on_external_calendar: true,
            on_external_calendar_raw: Flag::Yes,
            source_row: SourceRowRef {
                source: "Vie scolaire".to_string(),
                row: 2,
            },
        }
    }

    fn tracked(event: &Event, id: &str) -> TrackingEntry {
        TrackingEntry {
            content_hash: ContentHash::of(event),
            external_event_id: id.to_string(),
            department: event.department.clone(),
            event_date: event.date(),
            last_synced_at: DateTime::<Utc>::default(),
        }
    }

    #[test]
    fn partitions_three_ways() {
        let kept = event("Conseil de classe");
        let gone = event("Sortie annulée");
        let new = event("Portes ouvertes");

        let entries = vec![tracked(&kept, "e1"), tracked(&gone, "e2")];
        let plan = plan(&entries, &[&kept, &new]);

        assert_eq!(plan.unchanged, vec![tracked(&kept, "e1")]);
        assert_eq!(plan.to_delete, vec![tracked(&gone, "e2")]);
        assert_eq!(plan.to_create.len(), 1);
        assert_eq!(plan.to_create[0].event.title, "Portes ouvertes");
        assert_eq!(plan.to_create[0].hash, ContentHash::of(&new));
    }

    #[test]
    fn nothing_to_do_when_in_sync() {
        let a = event("A");
        let plan = plan(&[tracked(&a, "e1")], &[&a]);
        assert!(plan.is_empty());
        assert_eq!(plan.unchanged.len(), 1);
    }

    #[test]
    fn duplicates_collapse_to_one_create() {
        let a = event("Réunion parents");
        let mut b = event("Réunion parents");
        b.source_row.row = 9;

        let plan = plan(&[], &[&a, &b]);
        assert_eq!(plan.to_create.len(), 1);
        assert_eq!(plan.to_create[0].event.source_row.row, 2);
    }

    #[test]
    fn content_change_is_delete_plus_create() {
        let before = event("Brevet blanc");
        let mut after = before.clone();
        after.title = "Brevet blanc (salle B)".into();

        let plan = plan(&[tracked(&before, "e1")], &[&after]);
        let changes: Vec<_> = plan.changes().iter().map(|c| c.kind).collect();
        assert_eq!(changes, vec![DiffKind::Delete, DiffKind::Create]);
    }

    #[test]
    fn duplicate_tracking_entries_are_cleaned_up() {
        let a = event("A");
        let plan = plan(&[tracked(&a, "e1"), tracked(&a, "e2")], &[&a]);
        assert_eq!(plan.unchanged.len(), 1);
        assert_eq!(plan.to_delete[0].external_event_id, "e2");
        assert!(plan.to_create.is_empty());
    }
}
