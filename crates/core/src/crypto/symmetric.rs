use super::CryptoError;
use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes256;
use data_encoding::BASE64;
use rand::rngs::OsRng;
use rand::RngCore;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES key length in bytes (AES-256)
pub const SYMMETRIC_KEY_LEN: usize = 32;

/// CBC initialization vector length in bytes
pub const IV_LEN: usize = 16;

/// A one-time AES-256 key for encrypting a single onion layer.
///
/// Generated fresh per (message, hop) pair; the sender drops it as soon
/// as the layer is sealed.
#[derive(Clone)]
pub struct SymmetricKey([u8; SYMMETRIC_KEY_LEN]);

impl SymmetricKey {
    /// Generate a fresh random key from the OS CSPRNG
    pub fn generate() -> Self {
        let mut key = [0u8; SYMMETRIC_KEY_LEN];
        OsRng.fill_bytes(&mut key);
        Self(key)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != SYMMETRIC_KEY_LEN {
            return Err(CryptoError::InvalidKey(format!(
                "expected {} key bytes, got {}",
                SYMMETRIC_KEY_LEN,
                bytes.len()
            )));
        }

        let mut key = [0u8; SYMMETRIC_KEY_LEN];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; SYMMETRIC_KEY_LEN] {
        &self.0
    }

    /// Export the raw key as a base64 string
    pub fn export(&self) -> String {
        BASE64.encode(&self.0)
    }

    /// Import a key from its base64 export
    pub fn import(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = BASE64
            .decode(encoded.as_bytes())
            .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material
        f.debug_struct("SymmetricKey").finish_non_exhaustive()
    }
}

/// Encrypt a plaintext under AES-256-CBC with a fresh random IV.
///
/// The IV is prepended to the ciphertext and the whole buffer returned
/// as base64, so the output is self-contained for decryption.
pub fn sym_encrypt(key: &SymmetricKey, plaintext: &[u8]) -> Result<String, CryptoError> {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let cipher = Aes256CbcEnc::new_from_slices(&key.0, &iv)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut combined = Vec::with_capacity(IV_LEN + ciphertext.len());
    combined.extend_from_slice(&iv);
    combined.extend_from_slice(&ciphertext);

    Ok(BASE64.encode(&combined))
}

/// Decrypt an IV-prefixed AES-256-CBC ciphertext produced by [`sym_encrypt`]
pub fn sym_decrypt(key: &SymmetricKey, encoded: &str) -> Result<Vec<u8>, CryptoError> {
    let combined = BASE64
        .decode(encoded.as_bytes())
        .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;

    if combined.len() < IV_LEN {
        return Err(CryptoError::TruncatedCiphertext {
            len: combined.len(),
            min: IV_LEN,
        });
    }

    let (iv, ciphertext) = combined.split_at(IV_LEN);
    let cipher = Aes256CbcDec::new_from_slices(&key.0, iv)
        .map_err(|_| CryptoError::DecryptionFailed)?;

    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}
