//! Layered wrapping of a message for transit through a circuit.
//!
//! Hops are processed destination-adjacent first: the first sampled node
//! ends up holding the innermost layer and the last sampled node becomes
//! the entry node once the circuit is reversed. Each layer binds a fresh
//! one-time AES key (sealed to that hop's RSA key) to the address the
//! hop must forward to.

use crate::crypto::{import_public_key, rsa_encrypt, sym_encrypt, CryptoError, SymmetricKey};
use crate::directory::RegisteredNode;
use crate::framing::{self, FramingError};
use data_encoding::BASE64;
use thiserror::Error;
use tracing::debug;

/// Errors from wrapping or peeling an onion
#[derive(Debug, Error)]
pub enum OnionError {
    #[error("Cannot wrap for an empty circuit")]
    EmptyCircuit,

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    MalformedPayload(#[from] FramingError),

    #[error("Decrypted layer is not valid UTF-8")]
    NonTextPayload,
}

/// A fully wrapped onion, ready to hand to the entry node
#[derive(Debug, Clone)]
pub struct WrappedMessage {
    /// The circuit in transmission order: index 0 is the entry node,
    /// the last element the exit node adjacent to the destination.
    pub hops: Vec<RegisteredNode>,

    /// The layered ciphertext for the entry node
    pub payload: String,
}

impl WrappedMessage {
    /// The node that must receive the payload first
    pub fn entry_node(&self) -> &RegisteredNode {
        &self.hops[0]
    }
}

/// Wrap `message` in one encryption layer per circuit hop.
///
/// `circuit` is in sampling order: element 0 is processed first and
/// becomes the hop adjacent to the final destination. After sealing,
/// the circuit is reversed so the caller transmits to `hops[0]`.
///
/// Per hop: a fresh one-time key encrypts `address ++ payload`, the key
/// is sealed under the hop's RSA key, and `sealed ++ body` becomes the
/// payload carried into the next layer. The clear key is dropped as
/// soon as its layer is sealed.
pub fn wrap(
    mut circuit: Vec<RegisteredNode>,
    destination_port: u16,
    message: &str,
    base_relay_port: u16,
) -> Result<WrappedMessage, OnionError> {
    if circuit.is_empty() {
        return Err(OnionError::EmptyCircuit);
    }

    let mut carried_payload = message.to_string();
    let mut carried_port = destination_port;

    for node in &circuit {
        let hop_key = SymmetricKey::generate();

        let layer_plain = format!("{}{}", framing::encode_port(carried_port), carried_payload);
        let body = sym_encrypt(&hop_key, layer_plain.as_bytes())?;

        // The address sealed into the *next* layer is this node's own
        // listening port: the hop before it must route here.
        carried_port = base_relay_port + node.node_id.value();

        let public_key = import_public_key(&node.pub_key)?;
        let sealed_key = BASE64.encode(&rsa_encrypt(hop_key.as_bytes(), &public_key)?);

        carried_payload = format!("{sealed_key}{body}");
    }

    // Index 0 was processed first (innermost); the last-processed node
    // holds the outermost layer and must be contacted first.
    circuit.reverse();

    debug!(
        hops = circuit.len(),
        entry = %circuit[0].node_id,
        "Wrapped onion payload"
    );

    Ok(WrappedMessage {
        hops: circuit,
        payload: carried_payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{export_public_key, RsaKeyPair};
    use crate::relay::peel;
    use onionet_common::NodeId;

    fn test_node(id: u16) -> (RegisteredNode, RsaKeyPair) {
        let pair = RsaKeyPair::generate().unwrap();
        let node = RegisteredNode {
            node_id: NodeId(id),
            pub_key: export_public_key(pair.public_key()).unwrap(),
        };
        (node, pair)
    }

    #[test]
    fn wrap_rejects_empty_circuit() {
        let err = wrap(Vec::new(), 55555, "hello", 4000).unwrap_err();
        assert!(matches!(err, OnionError::EmptyCircuit));
    }

    #[test]
    fn entry_node_is_last_processed_hop() {
        let (n0, _) = test_node(0);
        let (n1, _) = test_node(1);
        let (n2, _) = test_node(2);

        let wrapped = wrap(vec![n0, n1, n2], 55555, "hello", 4000).unwrap();

        let ids: Vec<_> = wrapped.hops.iter().map(|n| n.node_id.value()).collect();
        assert_eq!(ids, vec![2, 1, 0]);
        assert_eq!(wrapped.entry_node().node_id, NodeId(2));
    }

    #[test]
    fn three_layer_onion_peels_hop_by_hop() {
        let (n0, k0) = test_node(0);
        let (n1, k1) = test_node(1);
        let (n2, k2) = test_node(2);

        let wrapped = wrap(
            vec![n0.clone(), n1.clone(), n2.clone()],
            55555,
            "hello",
            4000,
        )
        .unwrap();

        // Entry node (n2) peels the outermost layer and learns only the
        // next relay's address.
        let first = peel(&wrapped.payload, k2.private_key()).unwrap();
        assert_eq!(first.next_port, 4000 + 1);

        let second = peel(&first.inner, k1.private_key()).unwrap();
        assert_eq!(second.next_port, 4000);

        // The exit node recovers the destination and the plaintext.
        let third = peel(&second.inner, k0.private_key()).unwrap();
        assert_eq!(third.next_port, 55555);
        assert_eq!(third.inner, "hello");
    }

    #[test]
    fn wrong_relay_cannot_peel() {
        let (n0, _) = test_node(0);
        let (n1, k1) = test_node(1);
        let (n2, _) = test_node(2);

        let wrapped = wrap(vec![n0, n1, n2], 55555, "hello", 4000).unwrap();

        // Only the entry node's private key opens the outer layer; k1
        // belongs to the middle hop.
        assert!(peel(&wrapped.payload, k1.private_key()).is_err());
    }

    #[test]
    fn single_hop_wrap_exposes_destination_directly() {
        let (n0, k0) = test_node(9);

        let wrapped = wrap(vec![n0], 3001, "direct", 4000).unwrap();
        let peeled = peel(&wrapped.payload, k0.private_key()).unwrap();

        assert_eq!(peeled.next_port, 3001);
        assert_eq!(peeled.inner, "direct");
    }
}
