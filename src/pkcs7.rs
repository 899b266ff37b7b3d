/// PKCS#7 padding and validation
use crate::{Error, Result};

/// Pad `bytes` up to the next multiple of `block_size`.
///
/// A full block of padding is appended when the input is already aligned, so
/// the output is always strictly longer than the input.
///
/// # Panics
///
/// Panics if `block_size` is outside `2..=255`.
pub fn pkcs7_pad(bytes: &[u8], block_size: usize) -> Vec<u8> {
    assert!(
        (2..=255).contains(&block_size),
        "bad block size {block_size} for pkcs7 padding"
    );
    let n_pad = block_size - (bytes.len() % block_size);
    let mut out = Vec::with_capacity(bytes.len() + n_pad);
    out.extend_from_slice(bytes);
    out.resize(bytes.len() + n_pad, n_pad as u8);
    out
}

/// Strip PKCS#7 padding from `bytes` in place.
pub fn pkcs7_unpad(bytes: &mut Vec<u8>) -> Result<()> {
    let n_pad = pkcs7_padding_len(bytes).ok_or(Error::InvalidPadding)?;
    bytes.truncate(bytes.len() - n_pad);
    Ok(())
}

/// Return the number of padding bytes if `bytes` ends in valid padding.
pub fn pkcs7_padding_len(bytes: &[u8]) -> Option<usize> {
    let n_pad = *bytes.last()? as usize;
    if n_pad == 0 || n_pad > bytes.len() {
        return None;
    }
    let padding = &bytes[(bytes.len() - n_pad)..];
    if padding.iter().all(|&el| el as usize == n_pad) {
        return Some(n_pad);
    }
    None
}
