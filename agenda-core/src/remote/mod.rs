//! The external calendar store.

pub mod protocol;
pub mod provider;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AgendaResult;
use crate::remote::protocol::{CreateEvent, DeleteEvent};
use crate::remote::provider::Provider;
use crate::sync::ExternalEvent;

pub use protocol::DeleteOutcome;

/// Where mirrored events live. Each call is one independent external write.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Create an event and return its external id.
    async fn create_event(&self, event: &ExternalEvent) -> AgendaResult<String>;

    async fn delete_event(&self, event_id: &str) -> AgendaResult<DeleteOutcome>;
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RemoteConfig(pub HashMap<String, toml::Value>);

impl From<&RemoteConfig> for serde_json::Map<String, serde_json::Value> {
    fn from(config: &RemoteConfig) -> Self {
        config
            .0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

/// Remote provider configuration, the `[remote]` table of the config file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Remote {
    pub provider: Provider,
    #[serde(flatten)]
    pub config: RemoteConfig,
}

impl Remote {
    pub fn new(provider: Provider, config: RemoteConfig) -> Self {
        Remote { provider, config }
    }

    fn remote_config(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::from(&self.config)
    }
}

#[async_trait]
impl CalendarStore for Remote {
    async fn create_event(&self, event: &ExternalEvent) -> AgendaResult<String> {
        let created = self
            .provider
            .call(CreateEvent {
                remote_config: self.remote_config(),
                event: event.clone(),
            })
            .await?;
        Ok(created.id)
    }

    async fn delete_event(&self, event_id: &str) -> AgendaResult<DeleteOutcome> {
        self.provider
            .call(DeleteEvent {
                remote_config: self.remote_config(),
                event_id: event_id.to_string(),
            })
            .await
    }
}
