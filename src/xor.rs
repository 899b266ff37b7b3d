use std::ops::RangeInclusive;

use crate::{Error, Result};

pub fn xor_bytes(buf_a: &[u8], buf_b: &[u8]) -> Result<Vec<u8>> {
    check_lengths(buf_a, buf_b)?;
    Ok(buf_a.iter().zip(buf_b.iter()).map(|(a, b)| a ^ b).collect())
}

/// XOR `dst` with `src` in place.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub(crate) fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    assert_eq!(dst.len(), src.len(), "xor operands must be the same length");
    dst.iter_mut().zip(src).for_each(|(d, s)| *d ^= s);
}

/// Encrypt (or decrypt) a message using a repeating-key XOR cipher.
pub fn repeating_xor_cipher(message: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return message.to_vec();
    }
    message
        .iter()
        .zip(key.iter().cycle())
        .map(|(m, k)| m ^ k)
        .collect()
}

/// Count the bits that differ between two equal-length buffers.
pub fn hamming_distance(a: &[u8], b: &[u8]) -> Result<u32> {
    check_lengths(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum())
}

/// Order candidate repeating-XOR key sizes from most to least likely.
///
/// Each size is scored by the mean Hamming distance, per byte, between every
/// window of that many bytes and the window straight after it. Bytes XORed
/// with the same key byte keep the distance of their plaintext, which is
/// small for text. Sizes that don't fit two windows in `bytes` are skipped.
pub fn rank_key_sizes(bytes: &[u8], key_sizes: RangeInclusive<usize>) -> Result<Vec<usize>> {
    let mut distances = Vec::new();
    for key_size in key_sizes.filter(|&ks| ks > 0 && 2 * ks <= bytes.len()) {
        let n_windows = bytes.len() - 2 * key_size + 1;
        let total = (0..n_windows)
            .map(|i| {
                hamming_distance(
                    &bytes[i..(i + key_size)],
                    &bytes[(i + key_size)..(i + 2 * key_size)],
                )
            })
            .sum::<Result<u32>>()?;
        let distance = total as f64 / key_size as f64 / n_windows as f64;
        distances.push((distance, key_size));
    }
    distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    Ok(distances.into_iter().map(|(_, key_size)| key_size).collect())
}

fn check_lengths(a: &[u8], b: &[u8]) -> Result<()> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}
