//! Wire layout shared by the onion wrapper and the relay peel step.
//!
//! A layer is the concatenation `sealed_key ++ body` where `sealed_key`
//! is the base64 of one RSA ciphertext block (fixed width) and `body` is
//! the base64 of `iv ++ aes_ct`. Inside the decrypted body, the next-hop
//! port is a fixed-width decimal prefix so the remainder can be split off
//! without a length field. Both sides must use these helpers; any drift
//! between wrap and peel breaks routing.

use crate::crypto::RSA_CIPHERTEXT_LEN;
use thiserror::Error;

/// Width of an embedded address: a zero-padded decimal port
pub const ADDRESS_WIDTH: usize = 10;

/// Base64 width of one RSA ciphertext block (256 bytes -> 344 chars)
pub const SEALED_KEY_B64_WIDTH: usize = (RSA_CIPHERTEXT_LEN + 2) / 3 * 4;

/// Framing errors: the payload cannot be split as expected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    #[error("Payload too short: {len} bytes, need at least {min}")]
    PayloadTooShort { len: usize, min: usize },

    #[error("Invalid address field: {0:?}")]
    InvalidAddress(String),

    #[error("Payload contains non-ASCII framing bytes")]
    NonAsciiPayload,
}

/// Encode a port as a fixed-width decimal string
pub fn encode_port(port: u16) -> String {
    format!("{:0width$}", port, width = ADDRESS_WIDTH)
}

/// Parse a fixed-width decimal address back to a port
pub fn decode_port(field: &str) -> Result<u16, FramingError> {
    field
        .parse::<u16>()
        .map_err(|_| FramingError::InvalidAddress(field.to_string()))
}

/// Split an incoming layer into its sealed key and encrypted body
pub fn split_sealed_key(payload: &str) -> Result<(&str, &str), FramingError> {
    // A body holds at least one IV plus one AES block.
    if payload.len() <= SEALED_KEY_B64_WIDTH {
        return Err(FramingError::PayloadTooShort {
            len: payload.len(),
            min: SEALED_KEY_B64_WIDTH + 1,
        });
    }
    // Both sections are base64, so a valid payload is pure ASCII.
    if !payload.is_char_boundary(SEALED_KEY_B64_WIDTH) {
        return Err(FramingError::NonAsciiPayload);
    }

    Ok(payload.split_at(SEALED_KEY_B64_WIDTH))
}

/// Split a decrypted body into the next-hop port and the inner payload
pub fn split_address(plain: &str) -> Result<(u16, &str), FramingError> {
    if plain.len() < ADDRESS_WIDTH {
        return Err(FramingError::PayloadTooShort {
            len: plain.len(),
            min: ADDRESS_WIDTH,
        });
    }
    if !plain.is_char_boundary(ADDRESS_WIDTH) {
        return Err(FramingError::NonAsciiPayload);
    }

    let (field, inner) = plain.split_at(ADDRESS_WIDTH);
    Ok((decode_port(field)?, inner))
}
