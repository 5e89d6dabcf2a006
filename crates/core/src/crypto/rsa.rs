use super::CryptoError;
use data_encoding::BASE64;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

/// RSA modulus size for hop-key wrapping
pub const RSA_BITS: usize = 2048;

/// Width of one RSA ciphertext block (equal to the modulus size)
pub const RSA_CIPHERTEXT_LEN: usize = RSA_BITS / 8;

// OAEP/SHA-256 overhead: two hash blocks plus two bytes
const OAEP_OVERHEAD: usize = 2 * 32 + 2;

/// An RSA key pair used by a relay to receive sealed hop keys.
///
/// The public half travels to the registry as a base64 SPKI string;
/// the private half never leaves the relay process.
#[derive(Debug, Clone)]
pub struct RsaKeyPair {
    private: RsaPrivateKey,
    public: RsaPublicKey,
}

impl RsaKeyPair {
    /// Generate a fresh 2048-bit key pair
    pub fn generate() -> Result<Self, CryptoError> {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, RSA_BITS)
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
        let public = RsaPublicKey::from(&private);

        Ok(Self { private, public })
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private
    }

    /// Rebuild a key pair from an exported private key
    pub fn from_exported_private(encoded: &str) -> Result<Self, CryptoError> {
        let private = import_private_key(encoded)?;
        let public = RsaPublicKey::from(&private);
        Ok(Self { private, public })
    }
}

/// Export a public key as a base64-encoded SPKI document
pub fn export_public_key(key: &RsaPublicKey) -> Result<String, CryptoError> {
    let der = key
        .to_public_key_der()
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    Ok(BASE64.encode(der.as_bytes()))
}

/// Import a public key from its base64 SPKI encoding
pub fn import_public_key(encoded: &str) -> Result<RsaPublicKey, CryptoError> {
    let der = BASE64
        .decode(encoded.as_bytes())
        .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;
    RsaPublicKey::from_public_key_der(&der).map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

/// Export a private key as a base64-encoded PKCS#8 document
pub fn export_private_key(key: &RsaPrivateKey) -> Result<String, CryptoError> {
    let der = key
        .to_pkcs8_der()
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    Ok(BASE64.encode(der.as_bytes()))
}

/// Import a private key from its base64 PKCS#8 encoding
pub fn import_private_key(encoded: &str) -> Result<RsaPrivateKey, CryptoError> {
    let der = BASE64
        .decode(encoded.as_bytes())
        .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;
    RsaPrivateKey::from_pkcs8_der(&der).map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

/// Encrypt a small payload (a hop key, never a message body) under a public key
pub fn rsa_encrypt(plaintext: &[u8], key: &RsaPublicKey) -> Result<Vec<u8>, CryptoError> {
    let max = key.size() - OAEP_OVERHEAD;
    if plaintext.len() > max {
        return Err(CryptoError::PlaintextTooLarge {
            len: plaintext.len(),
            max,
        });
    }

    let mut rng = rand::thread_rng();
    key.encrypt(&mut rng, Oaep::new::<Sha256>(), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
}

/// Decrypt an RSA-sealed payload with the matching private key
pub fn rsa_decrypt(ciphertext: &[u8], key: &RsaPrivateKey) -> Result<Vec<u8>, CryptoError> {
    key.decrypt(Oaep::new::<Sha256>(), ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}
