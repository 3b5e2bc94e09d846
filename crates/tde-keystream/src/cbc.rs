//! Generic AES-128-CBC with PKCS#7 padding.
//!
//! Test-only: production paths use the keystream generator. This module exists
//! so the single-block primitive behind the keystream can be checked against
//! external CBC vectors.

use aes_core::{xor_in_place, Block, BLOCK_SIZE};
use zeroize::Zeroize;

use crate::error::{KeystreamError, Result};
use crate::init::ready;

/// Ciphertext length for a plaintext of `len` bytes. Aligned inputs gain a
/// full padding block.
pub fn padded_len(len: usize) -> usize {
    (len / BLOCK_SIZE + 1) * BLOCK_SIZE
}

/// Encrypts `input` into `out`, returning the number of bytes written.
///
/// `out` must hold at least [`padded_len`]`(input.len())` bytes.
pub fn aes_encrypt(key: &[u8; 16], iv: &[u8; 16], input: &[u8], out: &mut [u8]) -> Result<usize> {
    let backend = ready()?;
    let out_len = padded_len(input.len());
    if out.len() < out_len {
        return Err(KeystreamError::OutputLength {
            expected: out_len,
            actual: out.len(),
        });
    }

    let schedule = backend.schedule(key);
    let pad = (out_len - input.len()) as u8;
    let mut chain = *iv;
    let mut block = [0u8; BLOCK_SIZE];
    for (i, dst) in out[..out_len].chunks_exact_mut(BLOCK_SIZE).enumerate() {
        let src = &input[(i * BLOCK_SIZE).min(input.len())..];
        let n = src.len().min(BLOCK_SIZE);
        block[..n].copy_from_slice(&src[..n]);
        block[n..].fill(pad);

        xor_in_place(&mut block, &chain);
        chain = schedule.encrypt_block(&block);
        dst.copy_from_slice(&chain);
    }
    block.zeroize();
    Ok(out_len)
}

/// Decrypts `input` into `out`, returning the plaintext length.
///
/// `out` must hold at least `input.len()` bytes. The final block is unpadded
/// in scratch memory, so bad padding never reaches `out`.
pub fn aes_decrypt(key: &[u8; 16], iv: &[u8; 16], input: &[u8], out: &mut [u8]) -> Result<usize> {
    let backend = ready()?;
    if input.is_empty() || input.len() % BLOCK_SIZE != 0 {
        return Err(KeystreamError::InvalidLength(input.len()));
    }
    if out.len() < input.len() {
        return Err(KeystreamError::OutputLength {
            expected: input.len(),
            actual: out.len(),
        });
    }

    let schedule = backend.schedule(key);
    let (body, last) = input.split_at(input.len() - BLOCK_SIZE);
    let mut chain = *iv;
    for (src, dst) in body.chunks_exact(BLOCK_SIZE).zip(out.chunks_exact_mut(BLOCK_SIZE)) {
        let ct = to_block(src);
        let mut pt = schedule.decrypt_block(&ct);
        xor_in_place(&mut pt, &chain);
        dst.copy_from_slice(&pt);
        pt.zeroize();
        chain = ct;
    }

    let mut tail = schedule.decrypt_block(&to_block(last));
    xor_in_place(&mut tail, &chain);
    let pad = match padding_len(&tail) {
        Some(pad) => pad,
        None => {
            tail.zeroize();
            return Err(KeystreamError::BadPadding);
        }
    };
    let keep = BLOCK_SIZE - pad;
    out[body.len()..body.len() + keep].copy_from_slice(&tail[..keep]);
    tail.zeroize();
    Ok(body.len() + keep)
}

/// Owned-buffer form of [`aes_encrypt`].
pub fn aes_encrypt_to_vec(key: &[u8; 16], iv: &[u8; 16], input: &[u8]) -> Result<Vec<u8>> {
    let mut out = vec![0u8; padded_len(input.len())];
    let written = aes_encrypt(key, iv, input, &mut out)?;
    out.truncate(written);
    Ok(out)
}

/// Owned-buffer form of [`aes_decrypt`].
pub fn aes_decrypt_to_vec(key: &[u8; 16], iv: &[u8; 16], input: &[u8]) -> Result<Vec<u8>> {
    let mut out = vec![0u8; input.len()];
    let written = aes_decrypt(key, iv, input, &mut out)?;
    out.truncate(written);
    Ok(out)
}

fn to_block(bytes: &[u8]) -> Block {
    let mut block = [0u8; BLOCK_SIZE];
    block.copy_from_slice(bytes);
    block
}

/// PKCS#7 pad length of a decrypted final block, if well formed.
fn padding_len(block: &Block) -> Option<usize> {
    let pad = block[BLOCK_SIZE - 1];
    let len = usize::from(pad);
    if len == 0 || len > BLOCK_SIZE {
        return None;
    }
    block[BLOCK_SIZE - len..]
        .iter()
        .all(|&b| b == pad)
        .then_some(len)
}
