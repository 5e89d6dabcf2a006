use onionet_common::NodeId;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A relay node as stored in (and served by) the registry.
///
/// The public key is kept in its exported base64 form, which is also
/// exactly what goes over the wire; it is only parsed back into a key
/// when a sender seals a layer for this node. The node's address is
/// derived from its id (`base_relay_port + node_id`), not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredNode {
    #[serde(rename = "nodeId")]
    pub node_id: NodeId,

    #[serde(rename = "pubKey")]
    pub pub_key: String,
}

/// Append-only registry of relay nodes.
///
/// Owned by a single registry service instance; all access goes through
/// the operations below. Registration performs no dedup: callers must
/// not assume unique node ids.
#[derive(Debug, Default)]
pub struct NodeDirectory {
    nodes: Vec<RegisteredNode>,
}

impl NodeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node to the directory
    pub fn register(&mut self, node_id: NodeId, pub_key: String) {
        info!("Registered node {}", node_id);
        self.nodes.push(RegisteredNode { node_id, pub_key });
    }

    /// Immutable snapshot of all registered nodes, insertion order
    pub fn snapshot(&self) -> Vec<RegisteredNode> {
        self.nodes.clone()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
