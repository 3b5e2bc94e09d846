//! AES-128 key schedule and block encryption/decryption.

use crate::block::Block;
use crate::key::{RoundKeys, ROUND_KEY_COUNT};
use crate::round::{
    add_round_key, inv_mix_columns, inv_shift_rows, inv_sub_bytes, mix_columns, shift_rows,
    sub_bytes,
};
use crate::sbox::sbox;

const RCON: [u8; 10] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1b, 0x36];

/// Expands a 128-bit key into 11 round keys (FIPS-197 §5.2).
pub fn expand_key(key: &[u8; 16]) -> RoundKeys {
    let mut schedule = RoundKeys([[0u8; 16]; ROUND_KEY_COUNT]);
    schedule.0[0] = *key;

    for round in 1..ROUND_KEY_COUNT {
        let prev = schedule.0[round - 1];
        let mut word = [prev[13], prev[14], prev[15], prev[12]];
        word.iter_mut().for_each(|b| *b = sbox(*b));
        word[0] ^= RCON[round - 1];

        let next = &mut schedule.0[round];
        for i in 0..16 {
            let feed = if i < 4 { word[i] } else { next[i - 4] };
            next[i] = prev[i] ^ feed;
        }
    }

    schedule
}

/// Encrypts a single 16-byte block with pre-expanded round keys.
pub fn encrypt_block(block: &Block, round_keys: &RoundKeys) -> Block {
    let mut state = *block;
    encrypt_in_place(&mut state, round_keys);
    state
}

/// Encrypts every block of `blocks` in place.
pub fn encrypt_blocks(blocks: &mut [Block], round_keys: &RoundKeys) {
    blocks
        .iter_mut()
        .for_each(|block| encrypt_in_place(block, round_keys));
}

fn encrypt_in_place(state: &mut Block, round_keys: &RoundKeys) {
    add_round_key(state, round_keys.get(0));
    for round in 1..ROUND_KEY_COUNT {
        sub_bytes(state);
        shift_rows(state);
        if round != ROUND_KEY_COUNT - 1 {
            mix_columns(state);
        }
        add_round_key(state, round_keys.get(round));
    }
}

/// Decrypts a single 16-byte block with pre-expanded round keys.
pub fn decrypt_block(block: &Block, round_keys: &RoundKeys) -> Block {
    let mut state = *block;
    for round in (1..ROUND_KEY_COUNT).rev() {
        add_round_key(&mut state, round_keys.get(round));
        if round != ROUND_KEY_COUNT - 1 {
            inv_mix_columns(&mut state);
        }
        inv_shift_rows(&mut state);
        inv_sub_bytes(&mut state);
    }
    add_round_key(&mut state, round_keys.get(0));
    state
}
