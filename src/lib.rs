pub mod attacks;
pub mod cipher;
mod encoding;
mod error;
pub mod frequency;
pub mod modes;
pub mod oracle;
mod pkcs7;
pub mod profile;
pub mod random;
mod xor;

pub use attacks::byte_at_a_time::{byte_at_a_time_ecb_decrypt, ByteAtATimeAttacker};
pub use attacks::cut_and_paste::{ForgedProfile, ProfileForgeryAttacker};
pub use attacks::detect::{
    detect_mode, find_ecb_ciphertext, is_ecb, score_ecb_likelihood, BlockSizeProber, LengthJump,
};
pub use cipher::{Aes128, BlockCipher, AES_BLOCK_SIZE};
pub use encoding::{base64_decode, base64_encode, bytes_to_hex, hex_to_b64, hex_to_bytes};
pub use error::{Error, Result};
pub use frequency::{Corpus, RepeatingKeyXor, SingleByteXor};
pub use modes::{BlockMode, Cbc, Ecb, Mode};
pub use oracle::{EcbSecretOracle, ModeDetectionOracle, Oracle};
pub use pkcs7::{pkcs7_pad, pkcs7_padding_len, pkcs7_unpad};
pub use profile::{parse_query, ProfileOracle, ProfileService, UserProfile};
pub use random::{random_bytes, random_vec};
pub use xor::{hamming_distance, rank_key_sizes, repeating_xor_cipher, xor_bytes};
