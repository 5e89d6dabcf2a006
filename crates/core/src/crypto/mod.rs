mod rsa;
mod symmetric;

pub use self::rsa::{
    export_private_key, export_public_key, import_private_key, import_public_key, rsa_decrypt,
    rsa_encrypt, RsaKeyPair, RSA_BITS, RSA_CIPHERTEXT_LEN,
};
pub use symmetric::{sym_decrypt, sym_encrypt, SymmetricKey, IV_LEN, SYMMETRIC_KEY_LEN};

/// Cryptographic errors
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Invalid key encoding: {0}")]
    InvalidKey(String),

    #[error("Invalid base64: {0}")]
    InvalidEncoding(String),

    #[error("Plaintext too large for RSA block: {len} > {max}")]
    PlaintextTooLarge { len: usize, max: usize },

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Ciphertext shorter than one IV: {len} < {min}")]
    TruncatedCiphertext { len: usize, min: usize },
}
