//! AES round transformations over a column-major 16-byte state.
//!
//! Byte `4 * col + row` of the block holds state cell `(row, col)`.

use crate::block::{xor_in_place, Block};
use crate::sbox::{inv_sbox, sbox};

/// SubBytes.
#[inline]
pub fn sub_bytes(state: &mut Block) {
    state.iter_mut().for_each(|b| *b = sbox(*b));
}

/// Inverse SubBytes.
#[inline]
pub fn inv_sub_bytes(state: &mut Block) {
    state.iter_mut().for_each(|b| *b = inv_sbox(*b));
}

/// ShiftRows: row `r` rotates left by `r` cells.
#[inline]
pub fn shift_rows(state: &mut Block) {
    let src = *state;
    for col in 0..4 {
        for row in 1..4 {
            state[4 * col + row] = src[4 * ((col + row) % 4) + row];
        }
    }
}

/// Inverse ShiftRows: row `r` rotates right by `r` cells.
#[inline]
pub fn inv_shift_rows(state: &mut Block) {
    let src = *state;
    for col in 0..4 {
        for row in 1..4 {
            state[4 * ((col + row) % 4) + row] = src[4 * col + row];
        }
    }
}

/// Multiplication by `x` in GF(2^8) modulo the AES polynomial.
#[inline]
fn xtime(byte: u8) -> u8 {
    (byte << 1) ^ (((byte >> 7) & 1) * 0x1b)
}

/// MixColumns.
#[inline]
pub fn mix_columns(state: &mut Block) {
    for column in state.chunks_exact_mut(4) {
        let [a0, a1, a2, a3] = [column[0], column[1], column[2], column[3]];
        let all = a0 ^ a1 ^ a2 ^ a3;
        column[0] ^= all ^ xtime(a0 ^ a1);
        column[1] ^= all ^ xtime(a1 ^ a2);
        column[2] ^= all ^ xtime(a2 ^ a3);
        column[3] ^= all ^ xtime(a3 ^ a0);
    }
}

/// Inverse MixColumns.
///
/// Pre-multiplies each column by `{04}x^2 + {05}` so a forward MixColumns
/// finishes the inverse.
#[inline]
pub fn inv_mix_columns(state: &mut Block) {
    for column in state.chunks_exact_mut(4) {
        let u = xtime(xtime(column[0] ^ column[2]));
        let v = xtime(xtime(column[1] ^ column[3]));
        column[0] ^= u;
        column[1] ^= v;
        column[2] ^= u;
        column[3] ^= v;
    }
    mix_columns(state);
}

/// AddRoundKey.
#[inline]
pub fn add_round_key(state: &mut Block, round_key: &Block) {
    xor_in_place(state, round_key);
}

#[cfg(test)]
mod tests {
    use super::*;

    // FIPS-197 Appendix B, round 1 intermediate states.
    const AFTER_SHIFT_ROWS: Block = [
        0xd4, 0xbf, 0x5d, 0x30, 0xe0, 0xb4, 0x52, 0xae, 0xb8, 0x41, 0x11, 0xf1, 0x1e, 0x27, 0x98,
        0xe5,
    ];
    const AFTER_MIX_COLUMNS: Block = [
        0x04, 0x66, 0x81, 0xe5, 0xe0, 0xcb, 0x19, 0x9a, 0x48, 0xf8, 0xd3, 0x7a, 0x28, 0x06, 0x26,
        0x4c,
    ];

    #[test]
    fn mix_columns_matches_fips_197_round_one() {
        let mut state = AFTER_SHIFT_ROWS;
        mix_columns(&mut state);
        assert_eq!(state, AFTER_MIX_COLUMNS);
        inv_mix_columns(&mut state);
        assert_eq!(state, AFTER_SHIFT_ROWS);
    }

    #[test]
    fn shift_rows_inverse() {
        let original: Block = core::array::from_fn(|i| i as u8);
        let mut state = original;
        shift_rows(&mut state);
        assert_eq!(&state[..4], &[0, 5, 10, 15]);
        inv_shift_rows(&mut state);
        assert_eq!(state, original);
    }
}
