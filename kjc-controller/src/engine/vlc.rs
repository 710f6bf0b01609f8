//! HTTP adapter for VLC's `/requests/status.json` interface

use super::{EngineCommand, EngineControl, EngineRole, EngineStatus};
use crate::error::{Error, Result};
use async_trait::async_trait;
use kjc_common::config::EngineEndpointConfig;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const STATUS_PATH: &str = "/requests/status.json";

/// One VLC instance reachable over its HTTP interface
pub struct VlcEngine {
    role: EngineRole,
    base_url: String,
    password: String,
    http_client: reqwest::Client,
    /// Held for the duration of a request: one in-flight command per engine
    in_flight: Mutex<()>,
}

impl VlcEngine {
    /// Create an adapter for the given endpoint
    pub fn new(role: EngineRole, endpoint: &EngineEndpointConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(endpoint.request_timeout_ms))
            .build()
            .map_err(|e| Error::Transport {
                role,
                cause: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            role,
            base_url: endpoint.base_url(),
            password: endpoint.password.clone(),
            http_client,
            in_flight: Mutex::new(()),
        })
    }

    /// Full request URL for a command
    pub fn command_url(&self, command: &EngineCommand) -> String {
        let query = command.query_string();
        if query.is_empty() {
            format!("{}{}", self.base_url, STATUS_PATH)
        } else {
            format!("{}{}?{}", self.base_url, STATUS_PATH, query)
        }
    }

    fn transport(&self, cause: impl ToString) -> Error {
        Error::Transport {
            role: self.role,
            cause: cause.to_string(),
        }
    }
}

#[async_trait]
impl EngineControl for VlcEngine {
    fn role(&self) -> EngineRole {
        self.role
    }

    async fn send(&self, command: EngineCommand) -> Result<EngineStatus> {
        let _guard = self.in_flight.lock().await;
        let url = self.command_url(&command);

        debug!(role = %self.role, command = %command, "Sending engine command");

        // VLC's HTTP interface uses an empty user name
        let response = self
            .http_client
            .get(&url)
            .basic_auth("", Some(&self.password))
            .send()
            .await
            .map_err(|e| {
                warn!(role = %self.role, command = %command, "Engine request failed: {}", e);
                self.transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(role = %self.role, command = %command, "Engine returned HTTP {}", status);
            return Err(Error::EngineResponse {
                role: self.role,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.transport(e))?;
        EngineStatus::from_json(&body).map_err(|e| self.transport(e))
    }
}
