//! Encrypted-zero-block keystream.
//!
//! Block `i` of the keystream is `AES-128(key, P(i))` where
//! `P(i) = [0u8; 8] || i.to_le_bytes()`. XORing the keystream into data at
//! byte offset `16 * i` encrypts it; a second XOR decrypts it. The plaintext
//! layout fixes the on-disk bytes and must not change.

use aes_core::{xor_slices, Block, BLOCK_SIZE};
use zeroize::Zeroize;

use crate::backend::{KeySchedule, PARALLEL_BLOCKS};
use crate::error::{KeystreamError, Result};
use crate::init::ready;

/// Canonical plaintext for block `index`.
#[inline]
pub fn zero_block_plaintext(index: u64) -> Block {
    let mut block = [0u8; BLOCK_SIZE];
    block[8..].copy_from_slice(&index.to_le_bytes());
    block
}

/// Byte length of the keystream for blocks `[start, end)`.
pub fn keystream_len(start: u64, end: u64) -> Result<usize> {
    end.checked_sub(start)
        .and_then(|blocks| usize::try_from(blocks).ok())
        .and_then(|blocks| blocks.checked_mul(BLOCK_SIZE))
        .ok_or(KeystreamError::InvalidRange { start, end })
}

/// Fills `out` with the keystream for blocks `[start, end)`.
///
/// For a non-empty range `out` must be exactly `(end - start) * 16` bytes
/// long. The 16 bytes at `(i - start) * 16` depend only on `key` and `i`. An
/// empty range succeeds without touching `out`, whatever its length. On error
/// `out` is left unmodified.
///
/// ```
/// tde_keystream::init().unwrap();
/// let mut ks = [0u8; 32];
/// tde_keystream::aes128_encrypted_zero_blocks(&[0u8; 16], 0, 2, &mut ks).unwrap();
/// assert_eq!(ks[0], 0x66);
/// ```
pub fn aes128_encrypted_zero_blocks(
    key: &[u8; 16],
    start: u64,
    end: u64,
    out: &mut [u8],
) -> Result<()> {
    let backend = ready()?;
    let expected = keystream_len(start, end)?;
    if expected == 0 {
        return Ok(());
    }
    if out.len() != expected {
        return Err(KeystreamError::OutputLength {
            expected,
            actual: out.len(),
        });
    }

    let schedule = backend.schedule(key);
    fill_keystream(&schedule, start, out);
    Ok(())
}

/// XORs the keystream into `data`, treating `data[0]` as byte `byte_offset`
/// of the encrypted object.
///
/// The offset need not be block aligned. Applying twice with the same key and
/// offset restores the input.
pub fn apply_keystream(key: &[u8; 16], byte_offset: u64, data: &mut [u8]) -> Result<()> {
    let backend = ready()?;
    let end_byte = u64::try_from(data.len())
        .ok()
        .and_then(|len| byte_offset.checked_add(len))
        .ok_or(KeystreamError::OffsetOverflow {
            offset: byte_offset,
            len: data.len(),
        })?;
    if data.is_empty() {
        return Ok(());
    }

    let block_size = BLOCK_SIZE as u64;
    let last_block = end_byte.div_ceil(block_size);
    let mut block = byte_offset / block_size;
    let mut skip = (byte_offset % block_size) as usize;

    let schedule = backend.schedule(key);
    let mut window = [0u8; PARALLEL_BLOCKS * BLOCK_SIZE];
    let mut pos = 0;
    while pos < data.len() {
        let lanes = (last_block - block).min(PARALLEL_BLOCKS as u64) as usize;
        let stream = &mut window[..lanes * BLOCK_SIZE];
        fill_keystream(&schedule, block, stream);

        let take = (stream.len() - skip).min(data.len() - pos);
        xor_slices(&mut data[pos..pos + take], &stream[skip..skip + take]);

        pos += take;
        block += lanes as u64;
        skip = 0;
    }
    window.zeroize();
    Ok(())
}

/// Writes keystream for blocks starting at `start` into `out`, whose length
/// is a multiple of the block size.
fn fill_keystream(schedule: &KeySchedule, start: u64, out: &mut [u8]) {
    debug_assert_eq!(out.len() % BLOCK_SIZE, 0);
    let mut batch = [[0u8; BLOCK_SIZE]; PARALLEL_BLOCKS];
    let mut index = start;
    for chunk in out.chunks_mut(PARALLEL_BLOCKS * BLOCK_SIZE) {
        let lanes = &mut batch[..chunk.len() / BLOCK_SIZE];
        for lane in lanes.iter_mut() {
            *lane = zero_block_plaintext(index);
            index = index.wrapping_add(1);
        }
        schedule.encrypt_batch(lanes);
        for (dst, lane) in chunk.chunks_exact_mut(BLOCK_SIZE).zip(lanes.iter()) {
            dst.copy_from_slice(lane);
        }
    }
    batch.zeroize();
}
