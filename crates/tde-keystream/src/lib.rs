//! AES-128 encrypted-zero-block keystream for transparent data encryption.
//!
//! The crate turns a 128-bit key and a half-open range of block indices into
//! keystream. Callers XOR it against relation or WAL bytes at the matching
//! offsets. Block `i` encrypts the plaintext `[0u8; 8] || i.to_le_bytes()`,
//! which makes the construction AES-128-CTR with a zero nonce half and a
//! little-endian 64-bit counter.
//!
//! Call [`init`] once per process before anything else; every operation
//! returns [`KeystreamError::NotInitialized`] until it succeeds. After that,
//! all functions are pure and safe to call from any number of threads.
//!
//! The `test-surface` feature adds a generic CBC encrypt/decrypt pair used
//! only to validate the generator against external vectors.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod backend;
#[cfg(feature = "test-surface")]
mod cbc;
mod error;
mod init;
mod keystream;

pub use aes_core::BLOCK_SIZE;

pub use crate::backend::{hardware_aes_available, BackendKind, BackendPreference, PARALLEL_BLOCKS};
#[cfg(feature = "test-surface")]
pub use crate::cbc::{aes_decrypt, aes_decrypt_to_vec, aes_encrypt, aes_encrypt_to_vec, padded_len};
pub use crate::error::{KeystreamError, Result};
pub use crate::init::{backend, init, init_with, is_initialized, InitOptions};
pub use crate::keystream::{
    aes128_encrypted_zero_blocks, apply_keystream, keystream_len, zero_block_plaintext,
};
