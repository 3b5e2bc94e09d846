//! Expanded key material for AES-128.

use core::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::block::Block;

/// Number of round keys in the AES-128 schedule.
pub const ROUND_KEY_COUNT: usize = 11;

/// Expanded round keys for AES-128.
///
/// Wiped on drop. `Debug` never prints key bytes.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RoundKeys(pub(crate) [Block; ROUND_KEY_COUNT]);

impl RoundKeys {
    /// Returns the round key at the requested index (0..=10).
    #[inline]
    pub fn get(&self, round: usize) -> &Block {
        &self.0[round]
    }
}

impl fmt::Debug for RoundKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RoundKeys(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::expand_key;

    #[test]
    fn debug_output_is_redacted() {
        let rks = expand_key(&[0xaa; 16]);
        assert_eq!(format!("{rks:?}"), "RoundKeys(..)");
    }

    #[test]
    fn zeroize_clears_every_round() {
        let mut rks = expand_key(&[0xaa; 16]);
        rks.zeroize();
        assert!((0..ROUND_KEY_COUNT).all(|r| rks.get(r) == &[0u8; 16]));
    }
}
