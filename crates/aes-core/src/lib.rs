//! Portable AES-128 used as the reference backend of the keystream generator.
//!
//! This crate mirrors the FIPS-197 specification and provides:
//! - Key schedule for AES-128.
//! - Single- and multi-block encryption, single-block decryption.
//! - Zeroizing round keys.
//!
//! Lookups go through byte-indexed S-box tables, so the implementation is not
//! constant-time. It serves as a cross-check for the accelerated backend.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod block;
mod cipher;
mod key;
mod round;
mod sbox;

pub use crate::block::{xor_in_place, xor_slices, Block, BLOCK_SIZE};
pub use crate::cipher::{decrypt_block, encrypt_block, encrypt_blocks, expand_key};
pub use crate::key::{RoundKeys, ROUND_KEY_COUNT};
