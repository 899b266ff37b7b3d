/// Hex and base64 conversions.
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::{Error, Result};

pub fn hex_to_bytes(s: &str) -> Result<Vec<u8>> {
    hex::decode(s.trim()).map_err(|e| Error::MalformedEncoding(format!("{e}")))
}

pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

pub fn base64_encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64, ignoring any whitespace the text was wrapped with.
pub fn base64_decode(s: &str) -> Result<Vec<u8>> {
    let joined: String = s.split_whitespace().collect();
    STANDARD
        .decode(joined)
        .map_err(|e| Error::MalformedEncoding(format!("{e}")))
}

pub fn hex_to_b64(s: &str) -> Result<String> {
    let bytes = hex_to_bytes(s)?;
    Ok(base64_encode(&bytes))
}
