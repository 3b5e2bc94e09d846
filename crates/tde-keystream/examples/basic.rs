//! Encrypts a buffer in place with the keystream and decrypts it back.

use tde_keystream::{aes128_encrypted_zero_blocks, apply_keystream, init, BLOCK_SIZE};

fn main() {
    let backend = init().expect("AES backend self test");
    let key = [0u8; 16];

    let mut page = [0u8; 32];
    page[..16].copy_from_slice(b"first block here");
    page[16..].copy_from_slice(b"second blockhere");
    let original = page;

    // Page lives at block 4 of its relation.
    let mut stream = [0u8; 2 * BLOCK_SIZE];
    aes128_encrypted_zero_blocks(&key, 4, 6, &mut stream).expect("keystream");

    apply_keystream(&key, 4 * BLOCK_SIZE as u64, &mut page).expect("encrypt");
    for (i, byte) in page.iter().enumerate() {
        assert_eq!(*byte, original[i] ^ stream[i]);
    }

    apply_keystream(&key, 4 * BLOCK_SIZE as u64, &mut page).expect("decrypt");
    assert_eq!(page, original);

    println!("example succeeded on the {} backend", backend.name());
}
