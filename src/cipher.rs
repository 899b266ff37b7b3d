// The fixed-size block primitive the chaining modes are built on.
use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};

pub const AES_BLOCK_SIZE: usize = 16;

/// A keyed permutation over blocks of `block_size()` bytes.
pub trait BlockCipher {
    fn block_size(&self) -> usize;

    /// Encrypt exactly one block in place.
    fn encrypt_block(&self, block: &mut [u8]);

    /// Decrypt exactly one block in place.
    fn decrypt_block(&self, block: &mut [u8]);
}

/// AES-128, backed by the RustCrypto implementation.
#[derive(Clone)]
pub struct Aes128 {
    inner: aes::Aes128,
}

impl Aes128 {
    pub fn new(key: &[u8; AES_BLOCK_SIZE]) -> Self {
        Self {
            inner: aes::Aes128::new(GenericArray::from_slice(key)),
        }
    }
}

impl std::fmt::Debug for Aes128 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Aes128 { .. }")
    }
}

impl BlockCipher for Aes128 {
    fn block_size(&self) -> usize {
        AES_BLOCK_SIZE
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        assert_eq!(block.len(), AES_BLOCK_SIZE, "aes operates on 16-byte blocks");
        self.inner.encrypt_block(GenericArray::from_mut_slice(block));
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        assert_eq!(block.len(), AES_BLOCK_SIZE, "aes operates on 16-byte blocks");
        self.inner.decrypt_block(GenericArray::from_mut_slice(block));
    }
}
