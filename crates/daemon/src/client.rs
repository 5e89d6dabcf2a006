/// HTTP client for inter-service calls (registry fetch, hop forwarding).
///
/// Calls are blocking from the caller's perspective and carry no retry
/// or timeout policy: a downed registry or hop fails the whole send.

use crate::api::responses::{MessageRequest, NodeRegistryResponse, RegisterNodeRequest};
use onionet_common::{NetworkConfig, NodeId, OnionetError, Result};
use onionet_core::RegisteredNode;

#[derive(Debug, Clone)]
pub struct NetClient {
    http: reqwest::Client,
    config: NetworkConfig,
}

impl NetClient {
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Fetch the current node registry snapshot
    pub async fn fetch_node_registry(&self) -> Result<Vec<RegisteredNode>> {
        let url = format!(
            "http://127.0.0.1:{}/getNodeRegistry",
            self.config.registry_port
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| OnionetError::transport(e.to_string()))?;

        let body: NodeRegistryResponse = response
            .json()
            .await
            .map_err(|e| OnionetError::registry(e.to_string()))?;

        Ok(body.nodes)
    }

    /// Register a relay node with the registry
    pub async fn register_node(&self, node_id: NodeId, pub_key: String) -> Result<()> {
        let url = format!(
            "http://127.0.0.1:{}/registerNode",
            self.config.registry_port
        );

        let response = self
            .http
            .post(&url)
            .json(&RegisterNodeRequest { node_id, pub_key })
            .send()
            .await
            .map_err(|e| OnionetError::transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OnionetError::registry(format!(
                "registration rejected: {}",
                response.status()
            )));
        }

        Ok(())
    }

    /// Deliver a payload to the `/message` endpoint on `port`
    pub async fn post_message(&self, port: u16, message: &str) -> Result<()> {
        let url = format!("http://127.0.0.1:{port}/message");

        let response = self
            .http
            .post(&url)
            .json(&MessageRequest {
                message: message.to_string(),
            })
            .send()
            .await
            .map_err(|e| OnionetError::transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OnionetError::transport(format!(
                "message endpoint on port {port} returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
