use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a relay node, assigned at registration time.
///
/// The node's listening port is derived from it (`base_relay_port + id`),
/// so the id must stay small enough for the sum to fit a port number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u16);

impl NodeId {
    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for NodeId {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

/// Identifier of a user service (`base_user_port + id` is its port).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u16);

impl UserId {
    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for UserId {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_serializes_as_plain_number() {
        let encoded = serde_json::to_string(&NodeId(7)).unwrap();
        assert_eq!(encoded, "7");

        let decoded: NodeId = serde_json::from_str("42").unwrap();
        assert_eq!(decoded, NodeId(42));
    }
}
