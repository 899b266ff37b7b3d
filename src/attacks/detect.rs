// Characterising an oracle: which mode it uses and how big its blocks are.

use std::collections::HashSet;

use log::debug;

use crate::{modes::Mode, oracle::Oracle, Error, Result};

/// Blocks compared by `is_ecb`. The oracle's random prefix can only reach into
/// the first block, so with enough repeated input these are all attacker bytes.
const ECB_WINDOW: std::ops::Range<usize> = 2..6;

/// Number of identical blocks fed to an oracle when detecting its mode.
const DETECTION_BLOCKS: usize = 10;

/// Decide whether `ciphertext` came from ECB, assuming the plaintext was a long
/// run of identical bytes.
///
/// ECB is the only mode that encrypts equal plaintext blocks to equal
/// ciphertext blocks, so a repeat anywhere in the middle window is diagnostic.
///
/// # Panics
///
/// Panics if the ciphertext is shorter than six blocks.
pub fn is_ecb(ciphertext: &[u8], block_size: usize) -> bool {
    assert!(
        ciphertext.len() >= ECB_WINDOW.end * block_size,
        "not enough input to detect ECB"
    );
    let window: Vec<&[u8]> = ciphertext
        .chunks_exact(block_size)
        .skip(ECB_WINDOW.start)
        .take(ECB_WINDOW.len())
        .collect();
    window
        .iter()
        .enumerate()
        .any(|(i, a)| window[(i + 1)..].iter().any(|b| a == b))
}

/// Return a score for how likely some bytes were encrypted using ECB.
///
/// The score will be between 0 and 1, but does not indicate a probability.
/// The score is the ratio of repeated blocks to blocks. As the same plaintext
/// block will result in the same ciphertext when using ECB, you are likely to
/// get the same fraction of repeated blocks as you would in English. This
/// fraction will almost certainly be higher than some random string of bytes.
pub fn score_ecb_likelihood(ciphertext: &[u8], block_size: usize) -> f64 {
    let n_blocks = ciphertext.len() / block_size;
    if n_blocks == 0 {
        return 0.;
    }
    let mut seen_blocks = HashSet::new();
    let n_repetitions = ciphertext
        .chunks_exact(block_size)
        .filter(|block| !seen_blocks.insert(*block))
        .count();
    n_repetitions as f64 / n_blocks as f64
}

/// Find the one ciphertext among `candidates` that repeats a block.
///
/// Returns `None` if no candidate repeats a block, or if several do and the
/// answer is ambiguous.
pub fn find_ecb_ciphertext<T: AsRef<[u8]>>(candidates: &[T], block_size: usize) -> Option<usize> {
    let mut matches = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| score_ecb_likelihood(c.as_ref(), block_size) > 0.)
        .map(|(i, _)| i);
    let first = matches.next()?;
    match matches.next() {
        Some(_) => None,
        None => Some(first),
    }
}

/// Feed the oracle a run of identical blocks and classify its mode.
pub fn detect_mode<O: Oracle + ?Sized>(oracle: &O, block_size: usize) -> Mode {
    let ciphertext = oracle.encrypt(&vec![0u8; DETECTION_BLOCKS * block_size]);
    if is_ecb(&ciphertext, block_size) {
        Mode::Ecb
    } else {
        Mode::Cbc
    }
}

/// The first input length at which an oracle's output grew.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthJump {
    /// Ciphertext length for an empty input.
    pub base_len: usize,
    /// Smallest input length that produced a longer ciphertext.
    pub input_len: usize,
    /// How much longer it got; this is the block size.
    pub block_size: usize,
}

/// Finds an oracle's block size by growing its input one byte at a time until
/// the ciphertext crosses a padding boundary.
#[derive(Debug, Clone, Copy)]
pub struct BlockSizeProber {
    pub max_input_len: usize,
}

impl Default for BlockSizeProber {
    fn default() -> Self {
        Self { max_input_len: 256 }
    }
}

impl BlockSizeProber {
    pub fn probe<O: Oracle + ?Sized>(&self, oracle: &O) -> Result<usize> {
        Ok(self.find_length_jump(oracle)?.block_size)
    }

    pub fn find_length_jump<O: Oracle + ?Sized>(&self, oracle: &O) -> Result<LengthJump> {
        let base_len = oracle.encrypt(&[]).len();
        let mut input = Vec::with_capacity(self.max_input_len);
        while input.len() < self.max_input_len {
            input.push(0u8);
            let ciphertext_len = oracle.encrypt(&input).len();
            if ciphertext_len > base_len {
                let jump = LengthJump {
                    base_len,
                    input_len: input.len(),
                    block_size: ciphertext_len - base_len,
                };
                debug!("ciphertext length jumped: {jump:?}");
                return Ok(jump);
            }
        }
        Err(Error::BlockSizeIndeterminate {
            max_input_len: self.max_input_len,
        })
    }
}
