/// Request and response bodies shared by the services and the client

use onionet_common::{NodeId, UserId};
use onionet_core::RegisteredNode;
use serde::{Deserialize, Serialize};

/// Node registration request
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterNodeRequest {
    #[serde(rename = "nodeId")]
    pub node_id: NodeId,

    #[serde(rename = "pubKey")]
    pub pub_key: String,
}

/// Registration acknowledgment
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterNodeResponse {
    pub result: String,
}

impl RegisterNodeResponse {
    pub fn success() -> Self {
        Self {
            result: "success".to_string(),
        }
    }
}

/// Full registry snapshot
#[derive(Debug, Serialize, Deserialize)]
pub struct NodeRegistryResponse {
    pub nodes: Vec<RegisteredNode>,
}

/// A message delivered to a relay or user `/message` endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageRequest {
    pub message: String,
}

/// Request to send a message through a fresh circuit
#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,

    #[serde(rename = "destinationUserId")]
    pub destination_user_id: UserId,
}

/// Last-message introspection (`null` until something was seen)
#[derive(Debug, Serialize, Deserialize)]
pub struct LastMessageResponse {
    pub result: Option<String>,
}

/// Last circuit used by a user, entry-to-exit order
#[derive(Debug, Serialize, Deserialize)]
pub struct LastCircuitResponse {
    pub result: Vec<NodeId>,
}

/// Last forwarding destination observed by a relay
#[derive(Debug, Serialize, Deserialize)]
pub struct LastDestinationResponse {
    pub result: Option<u16>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}
