//! Block representation helpers.

/// Size of an AES block in bytes.
pub const BLOCK_SIZE: usize = 16;

/// AES block of 16 bytes.
pub type Block = [u8; BLOCK_SIZE];

/// XORs `rhs` into `dst` block-wise.
#[inline]
pub fn xor_in_place(dst: &mut Block, rhs: &Block) {
    xor_slices(dst, rhs);
}

/// XORs `src` into `dst` over the length of the shorter slice.
#[inline]
pub fn xor_slices(dst: &mut [u8], src: &[u8]) {
    dst.iter_mut().zip(src).for_each(|(d, s)| *d ^= *s);
}
