/// ECB and CBC chaining modes over any `BlockCipher`.
use crate::{cipher::BlockCipher, xor::xor_in_place};

/// A chaining mode that transforms whole blocks.
///
/// `dst` and `src` must be the same length and a multiple of `block_size()`;
/// both transforms panic otherwise.
pub trait BlockMode {
    fn block_size(&self) -> usize;

    fn encrypt_blocks(&self, dst: &mut [u8], src: &[u8]);

    fn decrypt_blocks(&self, dst: &mut [u8], src: &[u8]);

    fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        let mut ciphertext = vec![0; plaintext.len()];
        self.encrypt_blocks(&mut ciphertext, plaintext);
        ciphertext
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Vec<u8> {
        let mut plaintext = vec![0; ciphertext.len()];
        self.decrypt_blocks(&mut plaintext, ciphertext);
        plaintext
    }
}

/// Which chaining mode produced a ciphertext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Ecb,
    Cbc,
}

fn check_block_lengths(block_size: usize, dst: &[u8], src: &[u8]) {
    assert_eq!(
        src.len() % block_size,
        0,
        "source length {} is not a multiple of the block size {block_size}",
        src.len()
    );
    assert_eq!(dst.len(), src.len(), "destination and source lengths differ");
}

/// Electronic codebook: every block is encrypted on its own.
#[derive(Debug, Clone)]
pub struct Ecb<C> {
    cipher: C,
}

impl<C: BlockCipher> Ecb<C> {
    pub fn new(cipher: C) -> Self {
        Self { cipher }
    }
}

impl<C: BlockCipher> BlockMode for Ecb<C> {
    fn block_size(&self) -> usize {
        self.cipher.block_size()
    }

    fn encrypt_blocks(&self, dst: &mut [u8], src: &[u8]) {
        let block_size = self.block_size();
        check_block_lengths(block_size, dst, src);
        dst.copy_from_slice(src);
        dst.chunks_exact_mut(block_size)
            .for_each(|block| self.cipher.encrypt_block(block));
    }

    fn decrypt_blocks(&self, dst: &mut [u8], src: &[u8]) {
        let block_size = self.block_size();
        check_block_lengths(block_size, dst, src);
        dst.copy_from_slice(src);
        dst.chunks_exact_mut(block_size)
            .for_each(|block| self.cipher.decrypt_block(block));
    }
}

/// Cipher block chaining.
///
/// The chaining state starts from the IV on every call, so a single `Cbc` can
/// encrypt or decrypt any number of independent buffers.
#[derive(Debug, Clone)]
pub struct Cbc<C> {
    cipher: C,
    iv: Vec<u8>,
}

impl<C: BlockCipher> Cbc<C> {
    /// # Panics
    ///
    /// Panics if `iv` is not exactly one block long.
    pub fn new(cipher: C, iv: &[u8]) -> Self {
        assert_eq!(
            iv.len(),
            cipher.block_size(),
            "IV must have length equal to the block size"
        );
        Self {
            cipher,
            iv: iv.to_vec(),
        }
    }
}

impl<C: BlockCipher> BlockMode for Cbc<C> {
    fn block_size(&self) -> usize {
        self.cipher.block_size()
    }

    fn encrypt_blocks(&self, dst: &mut [u8], src: &[u8]) {
        let block_size = self.block_size();
        check_block_lengths(block_size, dst, src);
        let mut last_block = self.iv.clone();
        for (out, plaintext_block) in dst
            .chunks_exact_mut(block_size)
            .zip(src.chunks_exact(block_size))
        {
            xor_in_place(&mut last_block, plaintext_block);
            self.cipher.encrypt_block(&mut last_block);
            out.copy_from_slice(&last_block);
        }
    }

    fn decrypt_blocks(&self, dst: &mut [u8], src: &[u8]) {
        let block_size = self.block_size();
        check_block_lengths(block_size, dst, src);
        let mut last_block = self.iv.clone();
        for (out, ciphertext_block) in dst
            .chunks_exact_mut(block_size)
            .zip(src.chunks_exact(block_size))
        {
            out.copy_from_slice(ciphertext_block);
            self.cipher.decrypt_block(out);
            xor_in_place(out, &last_block);
            // Chain on the ciphertext, not the recovered plaintext.
            last_block.copy_from_slice(ciphertext_block);
        }
    }
}
