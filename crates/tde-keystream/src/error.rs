//! Error taxonomy shared by every operation of the crate.

use thiserror::Error;

/// Errors returned by initialization, keystream generation and the CBC test
/// surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeystreamError {
    /// An operation ran before [`crate::init`] succeeded.
    ///
    /// Recoverable: initialize and retry.
    #[error("AES backend is not initialized; call tde_keystream::init first")]
    NotInitialized,

    /// The AES primitive disagreed with a known answer.
    ///
    /// Points at a defect or a hardware fault and should be treated as fatal.
    #[error("cryptographic fault: {0}")]
    CryptoFault(&'static str),

    /// `start > end`, or the range is too large to address in memory.
    #[error("invalid block range [{start}, {end})")]
    InvalidRange {
        /// First block index.
        start: u64,
        /// One past the last block index.
        end: u64,
    },

    /// A byte offset plus a buffer length does not fit in `u64`.
    #[error("byte range at offset {offset} with length {len} overflows")]
    OffsetOverflow {
        /// Starting byte offset.
        offset: u64,
        /// Buffer length in bytes.
        len: usize,
    },

    /// The caller-supplied output buffer has the wrong size.
    #[error("output buffer holds {actual} bytes, expected {expected}")]
    OutputLength {
        /// Bytes the operation needs.
        expected: usize,
        /// Bytes the caller supplied.
        actual: usize,
    },

    /// Ciphertext handed to decrypt is empty or not block aligned.
    #[error("ciphertext length {0} is not a positive multiple of 16")]
    InvalidLength(usize),

    /// Decryption produced malformed PKCS#7 padding.
    #[error("invalid padding")]
    BadPadding,
}

/// Convenience alias used across the crate.
pub type Result<T> = core::result::Result<T, KeystreamError>;
