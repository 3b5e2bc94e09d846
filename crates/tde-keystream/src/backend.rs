//! AES backends and the per-call key schedule they produce.
//!
//! The initializer picks one [`BackendKind`] per process. Every operation then
//! expands the caller's key through that backend into a [`KeySchedule`], which
//! lives for a single call and is wiped on drop.

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes128;
use aes_core::{Block, RoundKeys, BLOCK_SIZE};
use zeroize::Zeroize;

/// Number of blocks handed to the cipher in one batch.
pub const PARALLEL_BLOCKS: usize = 8;

/// Concrete AES implementation in use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// RustCrypto `aes`: AES-NI / ARMv8 when the CPU has them, fixsliced
    /// software otherwise.
    Accelerated,
    /// Portable table-based `aes-core`.
    Reference,
}

impl BackendKind {
    /// Short lowercase name, used in logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Accelerated => "accelerated",
            BackendKind::Reference => "reference",
        }
    }

    pub(crate) fn schedule(self, key: &[u8; 16]) -> KeySchedule {
        match self {
            BackendKind::Accelerated => KeySchedule::Accelerated(Aes128::new(key.into())),
            BackendKind::Reference => KeySchedule::Reference(aes_core::expand_key(key)),
        }
    }
}

/// Backend requested at initialization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackendPreference {
    /// Let the initializer choose.
    #[default]
    Auto,
    /// Force [`BackendKind::Accelerated`].
    Accelerated,
    /// Force [`BackendKind::Reference`].
    Reference,
}

impl BackendPreference {
    pub(crate) fn resolve(self) -> BackendKind {
        match self {
            BackendPreference::Auto | BackendPreference::Accelerated => BackendKind::Accelerated,
            BackendPreference::Reference => BackendKind::Reference,
        }
    }
}

/// Whether the CPU exposes AES instructions.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub fn hardware_aes_available() -> bool {
    std::arch::is_x86_feature_detected!("aes")
}

/// Whether the CPU exposes AES instructions.
#[cfg(target_arch = "aarch64")]
pub fn hardware_aes_available() -> bool {
    std::arch::is_aarch64_feature_detected!("aes")
}

/// Whether the CPU exposes AES instructions.
#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
pub fn hardware_aes_available() -> bool {
    false
}

/// Expanded key bound to one backend.
pub(crate) enum KeySchedule {
    Accelerated(Aes128),
    Reference(RoundKeys),
}

impl KeySchedule {
    /// Encrypts up to [`PARALLEL_BLOCKS`] blocks in place.
    pub(crate) fn encrypt_batch(&self, blocks: &mut [Block]) {
        debug_assert!(blocks.len() <= PARALLEL_BLOCKS);
        match self {
            KeySchedule::Accelerated(cipher) => {
                let mut lanes = [aes::Block::default(); PARALLEL_BLOCKS];
                let lanes = &mut lanes[..blocks.len()];
                for (lane, block) in lanes.iter_mut().zip(blocks.iter()) {
                    lane.copy_from_slice(block);
                }
                cipher.encrypt_blocks(lanes);
                for (block, lane) in blocks.iter_mut().zip(lanes.iter_mut()) {
                    block.copy_from_slice(lane);
                    lane.as_mut_slice().zeroize();
                }
            }
            KeySchedule::Reference(round_keys) => aes_core::encrypt_blocks(blocks, round_keys),
        }
    }

    pub(crate) fn encrypt_block(&self, block: &Block) -> Block {
        let mut out = [*block];
        self.encrypt_batch(&mut out);
        out[0]
    }

    pub(crate) fn decrypt_block(&self, block: &Block) -> Block {
        match self {
            KeySchedule::Accelerated(cipher) => {
                let mut lane = aes::Block::clone_from_slice(block);
                cipher.decrypt_block(&mut lane);
                let mut out = [0u8; BLOCK_SIZE];
                out.copy_from_slice(&lane);
                lane.as_mut_slice().zeroize();
                out
            }
            KeySchedule::Reference(round_keys) => aes_core::decrypt_block(block, round_keys),
        }
    }
}
