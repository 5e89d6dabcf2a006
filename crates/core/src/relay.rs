//! The relay side of the protocol: peel one layer, learn the next hop.

use crate::crypto::{rsa_decrypt, sym_decrypt, CryptoError, SymmetricKey};
use crate::framing;
use crate::onion::OnionError;
use data_encoding::BASE64;
use rsa::RsaPrivateKey;
use tracing::debug;

/// The result of peeling one onion layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeeledLayer {
    /// Port the remaining payload must be forwarded to. For all but the
    /// exit hop this is another relay; at the exit it is the final
    /// destination's port.
    pub next_port: u16,

    /// The remaining payload: either the next sealed layer or, after
    /// the last peel, the original plaintext.
    pub inner: String,
}

/// Peel one layer off an incoming payload with this relay's private key.
///
/// Splits the fixed-width sealed key from the body, unseals the one-time
/// key, decrypts the body, and splits the fixed-width address prefix.
/// Any failure is unrecoverable for the message: the caller drops it.
pub fn peel(payload: &str, private_key: &RsaPrivateKey) -> Result<PeeledLayer, OnionError> {
    let (sealed_key, body) = framing::split_sealed_key(payload)?;

    let sealed = BASE64
        .decode(sealed_key.as_bytes())
        .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;
    let hop_key = SymmetricKey::from_bytes(&rsa_decrypt(&sealed, private_key)?)?;

    let plain_bytes = sym_decrypt(&hop_key, body)?;
    let plain = String::from_utf8(plain_bytes).map_err(|_| OnionError::NonTextPayload)?;

    let (next_port, inner) = framing::split_address(&plain)?;

    debug!(next_port, remaining = inner.len(), "Peeled onion layer");

    Ok(PeeledLayer {
        next_port,
        inner: inner.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{export_public_key, rsa_encrypt, sym_encrypt, RsaKeyPair};
    use crate::directory::RegisteredNode;
    use crate::framing::FramingError;
    use crate::onion::wrap;
    use onionet_common::NodeId;

    #[test]
    fn peel_rejects_truncated_payload() {
        let pair = RsaKeyPair::generate().unwrap();

        let err = peel("way too short", pair.private_key()).unwrap_err();
        assert!(matches!(
            err,
            OnionError::MalformedPayload(FramingError::PayloadTooShort { .. })
        ));
    }

    #[test]
    fn peel_rejects_garbled_sealed_key() {
        let pair = RsaKeyPair::generate().unwrap();

        // Right width, but the sealed-key section is not valid base64.
        let payload = "!".repeat(400);
        let err = peel(&payload, pair.private_key()).unwrap_err();
        assert!(matches!(err, OnionError::Crypto(_)));
    }

    #[test]
    fn peel_recovers_address_and_inner_payload() {
        let pair = RsaKeyPair::generate().unwrap();
        let node = RegisteredNode {
            node_id: NodeId(4),
            pub_key: export_public_key(pair.public_key()).unwrap(),
        };

        let wrapped = wrap(vec![node], 3002, "payload bytes", 4000).unwrap();
        let peeled = peel(&wrapped.payload, pair.private_key()).unwrap();

        assert_eq!(peeled.next_port, 3002);
        assert_eq!(peeled.inner, "payload bytes");
    }

    #[test]
    fn peel_rejects_layer_with_bogus_hop_key() {
        let pair = RsaKeyPair::generate().unwrap();

        // Seal something that is not a 32-byte key; the key split must fail.
        let sealed = BASE64.encode(&rsa_encrypt(b"short", pair.public_key()).unwrap());
        let body = sym_encrypt(&SymmetricKey::generate(), b"0000003000x").unwrap();
        let payload = format!("{sealed}{body}");

        let err = peel(&payload, pair.private_key()).unwrap_err();
        assert!(matches!(err, OnionError::Crypto(CryptoError::InvalidKey(_))));
    }
}
