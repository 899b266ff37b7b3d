/// Byte-at-a-time ECB decryption
use log::{info, trace};

use crate::{
    attacks::detect::{detect_mode, BlockSizeProber},
    modes::Mode,
    oracle::Oracle,
    Error, Result,
};

/// Recovers the secret an ECB oracle appends to attacker input.
///
/// Each step feeds the oracle just enough filler that exactly one unknown
/// byte sits at the end of a block whose other bytes we already know. Trying
/// all 256 values for that last byte in a block of our own, and comparing
/// ciphertext blocks, reveals it.
#[derive(Debug, Clone, Copy)]
pub struct ByteAtATimeAttacker {
    pub block_size: usize,
    /// Byte used to align the secret within blocks.
    pub filler: u8,
}

impl ByteAtATimeAttacker {
    /// # Panics
    ///
    /// Panics if `block_size` is less than 2: there is no room in a block for
    /// a known byte next to the unknown one.
    pub fn new(block_size: usize) -> Self {
        assert!(block_size >= 2, "block size must be at least 2");
        Self {
            block_size,
            filler: 0,
        }
    }

    /// Probe the oracle's block size and make sure it is encrypting with ECB.
    pub fn for_oracle<O: Oracle + ?Sized>(oracle: &O) -> Result<Self> {
        let block_size = BlockSizeProber::default().probe(oracle)?;
        // A ciphertext that grows a byte at a time is a stream, not blocks.
        if block_size < 2 {
            return Err(Error::NotEcb);
        }
        if detect_mode(oracle, block_size) != Mode::Ecb {
            return Err(Error::NotEcb);
        }
        Ok(Self::new(block_size))
    }

    pub fn recover_secret<O: Oracle + ?Sized>(&self, oracle: &O) -> Result<Vec<u8>> {
        let secret_length = self.secret_length(oracle)?;
        let mut recovered = Vec::with_capacity(secret_length);
        while recovered.len() < secret_length {
            let byte = self.recover_next_byte(oracle, &recovered)?;
            trace!("recovered byte {}: {byte:#04x}", recovered.len());
            recovered.push(byte);
        }
        info!("recovered {} secret bytes", recovered.len());
        Ok(recovered)
    }

    /// Work out the exact length of the secret from its padding.
    ///
    /// The empty-input ciphertext only bounds the secret from above. Adding
    /// filler one byte at a time, the ciphertext grows as soon as the filler
    /// has replaced all of the final padding, so that many filler bytes is the
    /// padding length.
    pub fn secret_length<O: Oracle + ?Sized>(&self, oracle: &O) -> Result<usize> {
        let prober = BlockSizeProber {
            max_input_len: self.block_size,
        };
        let jump = prober.find_length_jump(oracle)?;
        let secret_length = jump.base_len - jump.input_len;
        info!(
            "secret is {secret_length} bytes ({} bytes of ciphertext)",
            jump.base_len
        );
        Ok(secret_length)
    }

    /// Recover the byte that follows `recovered` in the secret.
    pub fn recover_next_byte<O: Oracle + ?Sized>(
        &self,
        oracle: &O,
        recovered: &[u8],
    ) -> Result<u8> {
        let block_size = self.block_size;
        let n_filler_bytes = block_size - (recovered.len() % block_size) - 1;
        let block_idx = recovered.len() / block_size;

        let ciphertext = oracle.encrypt(&vec![self.filler; n_filler_bytes]);
        let target_block = ciphertext
            .get((block_idx * block_size)..((block_idx + 1) * block_size))
            .ok_or(Error::ByteRecoveryFailed {
                position: recovered.len(),
            })?;

        // The block we build ends in the candidate and begins with the
        // `block_size - 1` bytes that precede the unknown one in the oracle's
        // plaintext: the latest recovered bytes, topped up with filler.
        let mut test_block: Vec<u8> = std::iter::repeat(self.filler)
            .take(block_size - 1)
            .chain(recovered.iter().copied())
            .skip(recovered.len())
            .collect();
        test_block.push(0);

        for candidate in 0..=255u8 {
            test_block[block_size - 1] = candidate;
            let candidate_ciphertext = oracle.encrypt(&test_block);
            if candidate_ciphertext[..block_size] == *target_block {
                return Ok(candidate);
            }
        }
        Err(Error::ByteRecoveryFailed {
            position: recovered.len(),
        })
    }
}

/// Probe `oracle` and recover its secret suffix.
pub fn byte_at_a_time_ecb_decrypt<O: Oracle + ?Sized>(oracle: &O) -> Result<Vec<u8>> {
    ByteAtATimeAttacker::for_oracle(oracle)?.recover_secret(oracle)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::{
        cipher::Aes128,
        modes::{BlockMode, Cbc},
        oracle::EcbSecretOracle,
        pkcs7_pad, repeating_xor_cipher,
    };

    struct CbcSecretOracle {
        cbc: Cbc<Aes128>,
        secret: Vec<u8>,
    }

    impl Oracle for CbcSecretOracle {
        fn encrypt(&self, prefix: &[u8]) -> Vec<u8> {
            self.cbc
                .encrypt(&pkcs7_pad(&[prefix, self.secret.as_slice()].concat(), 16))
        }
    }

    /// XORs `prefix || secret` with a repeating keystream.
    struct StreamSecretOracle {
        keystream: Vec<u8>,
        secret: Vec<u8>,
    }

    impl Oracle for StreamSecretOracle {
        fn encrypt(&self, prefix: &[u8]) -> Vec<u8> {
            let message = [prefix, self.secret.as_slice()].concat();
            repeating_xor_cipher(&message, &self.keystream)
        }
    }

    fn secret_of_len(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + 3) as u8).collect()
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(15)]
    #[case(16)]
    #[case(17)]
    #[case(40)]
    fn recover_secret_handles_every_alignment(#[case] len: usize) {
        let secret = secret_of_len(len);
        let oracle = EcbSecretOracle::new(*b"YELLOW SUBMARINE", secret.clone());

        let recovered = ByteAtATimeAttacker::new(16)
            .recover_secret(&oracle)
            .unwrap();

        assert_eq!(recovered, secret);
    }

    #[rstest]
    #[case(b"ends in one\x01".to_vec())]
    #[case(b"looks padded\x02\x02".to_vec())]
    #[case(vec![1; 16])]
    fn recover_secret_keeps_trailing_bytes_that_look_like_padding(#[case] secret: Vec<u8>) {
        let oracle = EcbSecretOracle::new(*b"YELLOW SUBMARINE", secret.clone());

        let recovered = byte_at_a_time_ecb_decrypt(&oracle).unwrap();

        assert_eq!(recovered, secret);
    }

    #[test]
    fn secret_length_is_exact() {
        let oracle = EcbSecretOracle::new(*b"YELLOW SUBMARINE", secret_of_len(21));

        let len = ByteAtATimeAttacker::new(16).secret_length(&oracle).unwrap();

        assert_eq!(len, 21);
    }

    #[test]
    fn recover_next_byte_fails_past_the_end_of_the_secret() {
        let secret = b"abc".to_vec();
        let oracle = EcbSecretOracle::new(*b"YELLOW SUBMARINE", secret.clone());
        let attacker = ByteAtATimeAttacker::new(16);

        // The first padding byte is 0x01 and can be "recovered", but nothing
        // after it matches as the padding value changes underneath us.
        let first_pad = attacker.recover_next_byte(&oracle, &secret).unwrap();
        let mut past_end_of_secret = secret.clone();
        past_end_of_secret.push(first_pad);
        let past_end = attacker.recover_next_byte(&oracle, &past_end_of_secret);

        assert_eq!(first_pad, 0x01);
        assert_eq!(past_end, Err(Error::ByteRecoveryFailed { position: 4 }));
    }

    #[test]
    fn for_oracle_rejects_cbc() {
        let oracle = CbcSecretOracle {
            cbc: Cbc::new(Aes128::new(b"YELLOW SUBMARINE"), &[0; 16]),
            secret: secret_of_len(20),
        };

        let attacker = ByteAtATimeAttacker::for_oracle(&oracle);

        assert!(matches!(attacker, Err(Error::NotEcb)));
    }

    #[test]
    fn byte_at_a_time_rejects_stream_oracle() {
        let oracle = StreamSecretOracle {
            keystream: b"not a block cipher".to_vec(),
            secret: b"hi".to_vec(),
        };

        let result = byte_at_a_time_ecb_decrypt(&oracle);

        assert_eq!(result, Err(Error::NotEcb));
    }

    #[test]
    #[should_panic(expected = "block size must be at least 2")]
    fn new_panics_on_single_byte_blocks() {
        ByteAtATimeAttacker::new(1);
    }
}
