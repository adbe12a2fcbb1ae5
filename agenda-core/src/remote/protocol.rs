//! JSON protocol spoken with provider binaries over stdin/stdout.
//!
//! One request line in, one response document out:
//!
//! ```json
//! {"command":"create_event","params":{"calendar_id":"…","event":{…}}}
//! {"status":"success","data":{"id":"abc123"}}
//! {"status":"error","error":"quota exceeded"}
//! ```

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::sync::ExternalEvent;

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    CreateEvent,
    DeleteEvent,
}

/// Request sent to the provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent back by the provider.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

/// Create an event in the external calendar.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEvent {
    /// Provider-specific config (e.g. `calendar_id`)
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub event: ExternalEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub id: String,
}

impl ProviderCommand for CreateEvent {
    type Response = CreatedEvent;
    fn command() -> Command {
        Command::CreateEvent
    }
}

/// Delete an event by its external id.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub event_id: String,
}

/// What a delete found on the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    /// The event no longer existed. Counts as deleted.
    AlreadyGone,
}

impl ProviderCommand for DeleteEvent {
    type Response = DeleteOutcome;
    fn command() -> Command {
        Command::DeleteEvent
    }
}
