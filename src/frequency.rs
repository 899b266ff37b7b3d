// Single-byte XOR cracking by comparison against a reference corpus.
//
// Rather than a fixed table of English letter frequencies, we measure the
// distribution of every byte value in some sample text. A candidate
// plaintext is scored by the L1 distance between its own byte distribution
// and the corpus's, summed over the bytes that actually occur in the
// candidate. Lower is better; punctuation, spaces and case all count.

use std::ops::RangeInclusive;

use log::debug;
use rayon::prelude::*;

use crate::{
    xor::{rank_key_sizes, repeating_xor_cipher},
    Error, Result,
};

// A multiple of the real key size ranks about as well as the size itself, so
// each of these brings its divisors along.
const N_KEY_SIZE_CANDIDATES: usize = 3;

pub struct Corpus {
    byte_freqs: [f64; 256],
}

#[derive(Debug, Clone, PartialEq)]
pub struct SingleByteXor {
    pub decoded: Vec<u8>,
    pub key: u8,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepeatingKeyXor {
    pub decoded: Vec<u8>,
    pub key: Vec<u8>,
    pub score: f64,
}

impl Corpus {
    pub fn from_bytes(sample: &[u8]) -> Self {
        let mut counts = [0u64; 256];
        sample.iter().for_each(|&b| counts[b as usize] += 1);
        let total = sample.len().max(1) as f64;
        let mut byte_freqs = [0f64; 256];
        byte_freqs
            .iter_mut()
            .zip(counts)
            .for_each(|(freq, count)| *freq = count as f64 / total);
        Self { byte_freqs }
    }

    pub fn from_reader<R: std::io::Read>(mut reader: R) -> std::io::Result<Self> {
        let mut sample = Vec::new();
        reader.read_to_end(&mut sample)?;
        Ok(Self::from_bytes(&sample))
    }

    /// Distance between the byte distribution of `buf` and the corpus.
    pub fn score(&self, buf: &[u8]) -> f64 {
        if buf.is_empty() {
            return 0.0;
        }
        let mut counts = [0u64; 256];
        buf.iter().for_each(|&b| counts[b as usize] += 1);
        counts
            .iter()
            .zip(self.byte_freqs.iter())
            .filter(|(count, _)| **count > 0)
            .map(|(&count, &expected)| (count as f64 / buf.len() as f64 - expected).abs())
            .sum()
    }

    /// Try every single-byte key and keep the decoding closest to the corpus.
    pub fn best_single_byte_key(&self, buf: &[u8]) -> SingleByteXor {
        let (score, key) = (0..=255u8)
            .into_par_iter()
            .map(|key| (self.score(&repeating_xor_cipher(buf, &[key])), key))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .unwrap_or((0.0, 0));
        SingleByteXor {
            decoded: repeating_xor_cipher(buf, &[key]),
            key,
            score,
        }
    }

    /// Find the buffer that was most likely single-byte XORed text, returning
    /// its index with the decoding.
    pub fn find_single_byte_xor_line<T: AsRef<[u8]>>(
        &self,
        lines: &[T],
    ) -> Option<(usize, SingleByteXor)> {
        lines
            .iter()
            .map(|line| self.best_single_byte_key(line.as_ref()))
            .enumerate()
            .min_by(|a, b| a.1.score.total_cmp(&b.1.score))
    }

    /// Break a repeating-key XOR cipher whose key length is in `key_sizes`.
    ///
    /// Each candidate key size splits the ciphertext into columns of bytes
    /// that share a key byte, and every column is solved as a single-byte XOR.
    /// The key whose decoding sits closest to the corpus wins.
    pub fn break_repeating_key_xor(
        &self,
        ciphertext: &[u8],
        key_sizes: RangeInclusive<usize>,
    ) -> Result<RepeatingKeyXor> {
        let min_key_size = (*key_sizes.start()).max(1);
        let ranked = rank_key_sizes(ciphertext, key_sizes)?;
        let mut candidates: Vec<usize> = ranked
            .iter()
            .take(N_KEY_SIZE_CANDIDATES)
            .flat_map(|&ks| (min_key_size..=ks).filter(move |d| ks % d == 0))
            .collect();
        candidates.sort_unstable();
        candidates.dedup();
        debug!("trying key sizes {candidates:?}");

        candidates
            .into_iter()
            .map(|key_size| self.solve_key_size(ciphertext, key_size))
            .min_by(|a, b| a.score.total_cmp(&b.score))
            .ok_or(Error::KeySizeIndeterminate {
                len: ciphertext.len(),
            })
    }

    fn solve_key_size(&self, ciphertext: &[u8], key_size: usize) -> RepeatingKeyXor {
        let key: Vec<u8> = (0..key_size)
            .map(|offset| {
                ciphertext
                    .iter()
                    .skip(offset)
                    .step_by(key_size)
                    .copied()
                    .collect::<Vec<_>>()
            })
            .map(|column| self.best_single_byte_key(&column).key)
            .collect();
        let key = shortest_period(&key).to_vec();
        let decoded = repeating_xor_cipher(ciphertext, &key);
        RepeatingKeyXor {
            score: self.score(&decoded),
            decoded,
            key,
        }
    }
}

/// The shortest prefix of `key` that repeats to make the whole key.
fn shortest_period(key: &[u8]) -> &[u8] {
    (1..key.len())
        .filter(|period| key.len() % period == 0)
        .find(|&period| key.chunks(period).all(|chunk| chunk == &key[..period]))
        .map_or(key, |period| &key[..period])
}
