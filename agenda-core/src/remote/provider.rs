//! Provider subprocess calls.
//!
//! A provider is any executable named `agenda-provider-<name>` on `PATH`
//! that speaks the JSON protocol in [`protocol`](super::protocol). Providers
//! manage their own credentials; we only pass along the `[remote]` params.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use crate::error::{AgendaError, AgendaResult};
use crate::remote::protocol::{Command, ProviderCommand, Request, Response};

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider(String);

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn binary_name(&self) -> String {
        format!("agenda-provider-{}", self.0)
    }

    fn binary_path(&self) -> AgendaResult<PathBuf> {
        which::which(self.binary_name())
            .map_err(|_| AgendaError::ProviderNotInstalled(self.binary_name()))
    }

    /// Call a typed provider command and return its typed response.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> AgendaResult<C::Response> {
        timeout(PROVIDER_TIMEOUT, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| AgendaError::ProviderTimeout(PROVIDER_TIMEOUT.as_secs()))?
    }

    async fn call_raw<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> AgendaResult<R> {
        let params =
            serde_json::to_value(params).map_err(|e| AgendaError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| AgendaError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        tracing::debug!("{} {:?}", binary_path.display(), command);

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                AgendaError::Provider(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AgendaError::Provider("Provider stdin unavailable".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(AgendaError::Provider(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        parse_response(&String::from_utf8_lossy(&output.stdout))
    }
}

fn parse_response<R: serde::de::DeserializeOwned>(raw: &str) -> AgendaResult<R> {
    if raw.trim().is_empty() {
        return Err(AgendaError::Provider("Provider returned no response".into()));
    }

    let response: Response<R> = serde_json::from_str(raw)
        .map_err(|e| AgendaError::Provider(format!("Failed to parse response: {}", e)))?;

    match response {
        Response::Success { data } => Ok(data),
        Response::Error { error } => Err(AgendaError::Provider(error)),
    }
}
