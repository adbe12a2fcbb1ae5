//! Content-hash reconciliation with the external calendar.

mod external;
mod hash;
mod plan;
mod reconcile;
mod tracking;

pub use external::{EventTime, ExternalEvent, ExternalEventOptions};
pub use hash::ContentHash;
pub use plan::{DiffKind, PendingCreate, ReconcilePlan, SyncChange, plan};
pub use reconcile::{PurgeOutcome, ReconcileOutcome, purge, reconcile};
pub use tracking::{TrackingEntry, TrackingStore};
