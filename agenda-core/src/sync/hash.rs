use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::event::Event;

/// Fields are joined with ASCII unit separator so boundaries can't collide.
const FIELD_SEPARATOR: char = '\u{1f}';

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Content-derived sync identity of an event (lowercase hex SHA-256).
///
/// Independent of where the event sits in its source table, so inserting or
/// removing rows doesn't recreate external events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn of(event: &Event) -> Self {
        let start = event.start.format(ISO_FORMAT).to_string();
        let end = event
            .end
            .map(|e| e.format(ISO_FORMAT).to_string())
            .unwrap_or_default();

        let fields = [
            event.department.as_str(),
            start.as_str(),
            end.as_str(),
            if event.on_site { "true" } else { "false" },
            event.service.as_str(),
            event.title.as_str(),
        ];

        let mut hasher = Sha256::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                hasher.update(FIELD_SEPARATOR.to_string().as_bytes());
            }
            hasher.update(field.as_bytes());
        }

        ContentHash(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for display.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(8)]
    }
}

impl From<String> for ContentHash {
    fn from(s: String) -> Self {
        ContentHash(s)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
