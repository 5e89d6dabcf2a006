pub mod circuit;
pub mod crypto;
pub mod directory;
pub mod framing;
pub mod onion;
pub mod relay;

pub use circuit::{build_circuit, CircuitError};
pub use crypto::{
    export_private_key, export_public_key, import_private_key, import_public_key, rsa_decrypt,
    rsa_encrypt, sym_decrypt, sym_encrypt, CryptoError, RsaKeyPair, SymmetricKey,
};
pub use directory::{NodeDirectory, RegisteredNode};
pub use framing::{FramingError, ADDRESS_WIDTH, SEALED_KEY_B64_WIDTH};
pub use onion::{wrap, OnionError, WrappedMessage};
pub use relay::{peel, PeeledLayer};
