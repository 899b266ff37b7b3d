/// Black-box encryption oracles for the attacks to query.
use rand::Rng;

use crate::{
    cipher::{Aes128, BlockCipher, AES_BLOCK_SIZE},
    modes::{BlockMode, Cbc, Ecb, Mode},
    pkcs7_pad,
    random::{random_bytes, random_vec},
};

/// Anything that will encrypt attacker-chosen plaintext and hand back the
/// ciphertext, without exposing its key.
pub trait Oracle {
    fn encrypt(&self, plaintext: &[u8]) -> Vec<u8>;
}

/// Encrypts under a random key with a randomly chosen mode, wrapping the
/// plaintext in 5 to 10 random bytes on either side.
pub struct ModeDetectionOracle {
    mode: Mode,
    cipher: Box<dyn BlockMode>,
    prefix: Vec<u8>,
    suffix: Vec<u8>,
}

impl ModeDetectionOracle {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let key = random_bytes::<AES_BLOCK_SIZE, _>(rng);
        let iv = random_bytes::<AES_BLOCK_SIZE, _>(rng);
        let prefix_len = rng.gen_range(5..=10);
        let prefix = random_vec(rng, prefix_len);
        let suffix_len = rng.gen_range(5..=10);
        let suffix = random_vec(rng, suffix_len);
        let (mode, cipher): (Mode, Box<dyn BlockMode>) = if rng.gen_bool(0.5) {
            (Mode::Ecb, Box::new(Ecb::new(Aes128::new(&key))))
        } else {
            (Mode::Cbc, Box::new(Cbc::new(Aes128::new(&key), &iv)))
        };
        Self {
            mode,
            cipher,
            prefix,
            suffix,
        }
    }

    /// Encrypt and also return the mode that was really used.
    pub fn encrypt_labelled(&self, plaintext: &[u8]) -> (Vec<u8>, Mode) {
        (self.encrypt(plaintext), self.mode)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }
}

impl Oracle for ModeDetectionOracle {
    fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        let message = [self.prefix.as_slice(), plaintext, self.suffix.as_slice()].concat();
        self.cipher
            .encrypt(&pkcs7_pad(&message, self.cipher.block_size()))
    }
}

/// ECB-encrypts `attacker_prefix || secret` under a key fixed at construction.
pub struct EcbSecretOracle<C: BlockCipher = Aes128> {
    ecb: Ecb<C>,
    unknown_bytes: Vec<u8>,
}

impl EcbSecretOracle<Aes128> {
    pub fn new(key: [u8; AES_BLOCK_SIZE], unknown_bytes: Vec<u8>) -> Self {
        Self::from_cipher(Aes128::new(&key), unknown_bytes)
    }

    pub fn with_random_key<R: Rng>(rng: &mut R, unknown_bytes: Vec<u8>) -> Self {
        Self::new(random_bytes(rng), unknown_bytes)
    }
}

impl<C: BlockCipher> EcbSecretOracle<C> {
    pub fn from_cipher(cipher: C, unknown_bytes: Vec<u8>) -> Self {
        Self {
            ecb: Ecb::new(cipher),
            unknown_bytes,
        }
    }
}

impl<C: BlockCipher> Oracle for EcbSecretOracle<C> {
    fn encrypt(&self, attacker_prefix: &[u8]) -> Vec<u8> {
        let message = [attacker_prefix, self.unknown_bytes.as_slice()].concat();
        self.ecb.encrypt(&pkcs7_pad(&message, self.ecb.block_size()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn mode_detection_oracle_output_is_padded_and_wrapped() {
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..50 {
            let oracle = ModeDetectionOracle::new(&mut rng);

            let ciphertext = oracle.encrypt(&[0; 32]);

            // 32 bytes plus 10 to 20 bytes of wrapping always pads to 48 or 64.
            assert!(ciphertext.len() == 48 || ciphertext.len() == 64);
        }
    }

    #[test]
    fn mode_detection_oracle_chooses_both_modes() {
        let mut rng = StdRng::seed_from_u64(5);

        let modes: Vec<Mode> = (0..64)
            .map(|_| ModeDetectionOracle::new(&mut rng).mode())
            .collect();

        assert!(modes.contains(&Mode::Ecb));
        assert!(modes.contains(&Mode::Cbc));
    }

    #[test]
    fn mode_detection_oracle_is_fixed_after_construction() {
        let oracle = ModeDetectionOracle::new(&mut StdRng::seed_from_u64(3));

        let (first, mode_1) = oracle.encrypt_labelled(b"same input");
        let (second, mode_2) = oracle.encrypt_labelled(b"same input");

        assert_eq!(first, second);
        assert_eq!(mode_1, mode_2);
    }

    #[test]
    fn mode_detection_oracle_is_reproducible_from_a_seed() {
        let oracle_1 = ModeDetectionOracle::new(&mut StdRng::seed_from_u64(21));
        let oracle_2 = ModeDetectionOracle::new(&mut StdRng::seed_from_u64(21));

        assert_eq!(
            oracle_1.encrypt_labelled(&[7; 48]),
            oracle_2.encrypt_labelled(&[7; 48])
        );
    }

    #[test]
    fn ecb_secret_oracle_appends_secret() {
        let key = *b"YELLOW SUBMARINE";
        let oracle = EcbSecretOracle::new(key, b"secret".to_vec());

        let ciphertext = oracle.encrypt(b"my ");

        let expected = Ecb::new(Aes128::new(&key)).encrypt(&pkcs7_pad(b"my secret", 16));
        assert_eq!(ciphertext, expected);
    }
}
