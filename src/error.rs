/// Errors returned by the codecs, oracles and attacks in this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Two buffers that must be the same length were not.
    LengthMismatch { left: usize, right: usize },
    /// A buffer did not end in valid PKCS#7 padding.
    InvalidPadding,
    /// No jump in ciphertext length was seen for inputs up to `max_input_len`.
    BlockSizeIndeterminate { max_input_len: usize },
    /// None of the 256 candidates matched the byte at `position`.
    ByteRecoveryFailed { position: usize },
    /// A ciphertext of `len` bytes cannot hold two blocks of any candidate
    /// repeating-XOR key size.
    KeySizeIndeterminate { len: usize },
    /// The oracle does not appear to be encrypting with ECB.
    NotEcb,
    /// Hex or base64 input could not be decoded.
    MalformedEncoding(String),
    /// A decrypted profile was not a `key=value&...` query.
    MalformedQuery(String),
    /// A forged profile did not decrypt with an admin role.
    ForgeryRejected { role: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::LengthMismatch { left, right } => {
                write!(f, "buffers are not of equal length ({left} != {right})")
            }
            Error::InvalidPadding => write!(f, "invalid pkcs7 padding"),
            Error::BlockSizeIndeterminate { max_input_len } => write!(
                f,
                "could not determine block size with inputs of up to {max_input_len} bytes"
            ),
            Error::ByteRecoveryFailed { position } => {
                write!(f, "could not recover secret byte at position {position}")
            }
            Error::KeySizeIndeterminate { len } => write!(
                f,
                "ciphertext of {len} bytes is too short to compare key-sized blocks"
            ),
            Error::NotEcb => write!(f, "ciphertext not encrypted using ECB"),
            Error::MalformedEncoding(e) => write!(f, "malformed encoding: {e}"),
            Error::MalformedQuery(e) => write!(f, "malformed query: {e}"),
            Error::ForgeryRejected { role } => {
                write!(f, "forged profile decrypted with role '{role}'")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = Error::LengthMismatch { left: 3, right: 4 };

        assert_eq!(err.to_string(), "buffers are not of equal length (3 != 4)");
        assert_eq!(
            Error::ByteRecoveryFailed { position: 17 }.to_string(),
            "could not recover secret byte at position 17"
        );
    }
}
