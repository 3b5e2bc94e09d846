use hex_literal::hex;
use tde_keystream::{
    aes_decrypt, aes_decrypt_to_vec, aes_encrypt, aes_encrypt_to_vec, init, KeystreamError,
};

const KEY: [u8; 16] = [0x01; 16];
const IV: [u8; 16] = [0x02; 16];
const FOX: &[u8] = b"The quick brown fox jumps over the lazy dog";

#[test]
fn scenario_f_round_trip() {
    init().expect("init");
    let mut ct = [0u8; 64];
    let written = aes_encrypt(&KEY, &IV, FOX, &mut ct).expect("encrypt");
    assert_eq!(written, 48);
    assert_eq!(
        ct[..written],
        hex!(
            "7f5f5725a02fd09200d8cb182b9e2ee3"
            "a42829ef13346fdcb10df6bbd58208da"
            "adabd68e1a35609c3f95e8838193ee12"
        )
    );

    let mut pt = [0u8; 48];
    let len = aes_decrypt(&KEY, &IV, &ct[..written], &mut pt).expect("decrypt");
    assert_eq!(&pt[..len], FOX);
}

#[test]
fn nist_sp800_38a_cbc_vector() {
    init().expect("init");
    let key = hex!("2b7e151628aed2a6abf7158809cf4f3c");
    let iv = hex!("000102030405060708090a0b0c0d0e0f");
    let plain = hex!(
        "6bc1bee22e409f96e93d7e117393172a"
        "ae2d8a571e03ac9c9eb76fac45af8e51"
    );
    let ct = aes_encrypt_to_vec(&key, &iv, &plain).expect("encrypt");
    // The two data blocks match the published vector; a padding block follows.
    assert_eq!(ct.len(), 48);
    assert_eq!(
        ct[..32],
        hex!(
            "7649abac8119b246cee98e9b12e9197d"
            "5086cb9b507219ee95db113a917678b2"
        )
    );
    assert_eq!(aes_decrypt_to_vec(&key, &iv, &ct).expect("decrypt"), plain);
}

#[test]
fn empty_plaintext_is_one_padding_block() {
    init().expect("init");
    let ct = aes_encrypt_to_vec(&KEY, &IV, b"").expect("encrypt");
    assert_eq!(ct, hex!("9f32d4376437ba86e0bc148a27cdedb4"));
    assert!(aes_decrypt_to_vec(&KEY, &IV, &ct).expect("decrypt").is_empty());
}

#[test]
fn decrypt_rejects_unaligned_or_empty_input() {
    init().expect("init");
    let mut out = [0u8; 64];
    assert_eq!(
        aes_decrypt(&KEY, &IV, &[0u8; 17], &mut out),
        Err(KeystreamError::InvalidLength(17))
    );
    assert_eq!(
        aes_decrypt(&KEY, &IV, &[], &mut out),
        Err(KeystreamError::InvalidLength(0))
    );
}

#[test]
fn wrong_key_never_recovers_plaintext() {
    init().expect("init");
    let ct = aes_encrypt_to_vec(&KEY, &IV, FOX).expect("encrypt");
    // A wrong key almost always breaks the padding; either way the plaintext
    // never comes back.
    match aes_decrypt_to_vec(&[0x03; 16], &IV, &ct) {
        Err(err) => assert_eq!(err, KeystreamError::BadPadding),
        Ok(pt) => assert_ne!(pt, FOX),
    }
}

#[test]
fn tampered_padding_is_rejected() {
    init().expect("init");
    let mut ct = aes_encrypt_to_vec(&KEY, &IV, &[0x42u8; 32]).expect("encrypt");
    // Flipping a byte of the penultimate block flips the same byte of the
    // final padding block after chaining.
    ct[31] ^= 0x01;
    let mut out = [0xeeu8; 48];
    assert_eq!(
        aes_decrypt(&KEY, &IV, &ct, &mut out),
        Err(KeystreamError::BadPadding)
    );
    // The padding block itself never reaches the output.
    assert_eq!(out[32..], [0xeeu8; 16]);
}

#[test]
fn output_buffer_size_is_checked() {
    init().expect("init");
    let mut small = [0u8; 47];
    assert_eq!(
        aes_encrypt(&KEY, &IV, FOX, &mut small),
        Err(KeystreamError::OutputLength {
            expected: 48,
            actual: 47
        })
    );
    let ct = aes_encrypt_to_vec(&KEY, &IV, FOX).expect("encrypt");
    let mut small = [0u8; 32];
    assert_eq!(
        aes_decrypt(&KEY, &IV, &ct, &mut small),
        Err(KeystreamError::OutputLength {
            expected: 48,
            actual: 32
        })
    );
}
