use std::time::Duration;

/// Events shown in a day cell before the rest collapse into "+k more".
pub const DEFAULT_MAX_EVENTS_PER_DAY: usize = 4;

/// Quiet period before a debounced sync fires.
pub const DEFAULT_SYNC_QUIET_PERIOD: &str = "30s";

/// Duration given to timed events that have no end.
pub const DEFAULT_EVENT_DURATION: &str = "1h";

pub const DEFAULT_TIMEZONE: &str = "Europe/Paris";

/// Purge deletes tracked events in batches of this size...
pub const DELETE_BATCH_SIZE: usize = 10;

/// ...pausing this long between batches (provider rate limits).
pub const DELETE_BATCH_PAUSE: Duration = Duration::from_secs(1);

pub const TRACKING_FILE: &str = "tracking.csv";
pub const ERROR_LOG_FILE: &str = "errors.csv";

/// Label shown on days covered by a school break.
pub const SCHOOL_BREAK_LABEL: &str = "Vacances";
