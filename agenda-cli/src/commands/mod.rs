pub mod departments;
pub mod errors;
pub mod events;
pub mod purge;
pub mod show;
pub mod sync;
pub mod watch;

/// Above this many changes, sync output shows counts instead of every line.
pub const COMPACT_THRESHOLD: usize = 5;
