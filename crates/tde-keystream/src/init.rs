//! One-time, process-wide backend selection.

use std::sync::OnceLock;

use aes_core::Block;
use tracing::debug;

use crate::backend::{hardware_aes_available, BackendKind, BackendPreference};
use crate::error::{KeystreamError, Result};

static BACKEND: OnceLock<BackendKind> = OnceLock::new();

/// FIPS-197 C.1 and the all-zero key/block pair.
const KNOWN_ANSWERS: [KnownAnswer; 2] = [
    (
        [
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
            0x0e, 0x0f,
        ],
        [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
            0xee, 0xff,
        ],
        [
            0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30, 0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4,
            0xc5, 0x5a,
        ],
    ),
    (
        [0u8; 16],
        [0u8; 16],
        [
            0x66, 0xe9, 0x4b, 0xd4, 0xef, 0x8a, 0x2c, 0x3b, 0x88, 0x4c, 0xfa, 0x59, 0xca, 0x34,
            0x2b, 0x2e,
        ],
    ),
];

/// Options consumed by the first successful [`init_with`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitOptions {
    /// Which AES implementation to select.
    pub backend: BackendPreference,
    /// Run the known-answer self test before publishing the backend.
    pub self_test: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            backend: BackendPreference::Auto,
            self_test: true,
        }
    }
}

/// Initializes the library with default options.
///
/// Idempotent: once a backend has been selected, every later call returns it.
pub fn init() -> Result<BackendKind> {
    init_with(InitOptions::default())
}

/// Initializes the library with explicit options.
///
/// Options passed after the first successful call are ignored. A failed self
/// test leaves the library uninitialized and returns
/// [`KeystreamError::CryptoFault`].
pub fn init_with(options: InitOptions) -> Result<BackendKind> {
    init_into(&BACKEND, options, &KNOWN_ANSWERS)
}

/// Reports whether a backend has been selected.
pub fn is_initialized() -> bool {
    BACKEND.get().is_some()
}

/// The selected backend, if any.
pub fn backend() -> Option<BackendKind> {
    BACKEND.get().copied()
}

pub(crate) fn ready() -> Result<BackendKind> {
    backend().ok_or(KeystreamError::NotInitialized)
}

fn self_test(kind: BackendKind, answers: &[KnownAnswer]) -> Result<()> {
    check_known_answers(
        |key, block| kind.schedule(key).encrypt_block(block),
        |key, block| kind.schedule(key).decrypt_block(block),
        answers,
    )
}

type KnownAnswer = ([u8; 16], Block, Block);

/// Checks both directions of a block cipher against `(key, plain, cipher)`
/// triples.
fn check_known_answers<E, D>(encrypt: E, decrypt: D, answers: &[KnownAnswer]) -> Result<()>
where
    E: Fn(&[u8; 16], &Block) -> Block,
    D: Fn(&[u8; 16], &Block) -> Block,
{
    for (key, plain, cipher) in answers {
        if encrypt(key, plain) != *cipher {
            return Err(KeystreamError::CryptoFault("encrypt self test mismatch"));
        }
        if decrypt(key, cipher) != *plain {
            return Err(KeystreamError::CryptoFault("decrypt self test mismatch"));
        }
    }
    Ok(())
}

/// Runs the self test for `options` and publishes the backend into `cell`
/// only if it passes.
fn init_into(
    cell: &OnceLock<BackendKind>,
    options: InitOptions,
    answers: &[KnownAnswer],
) -> Result<BackendKind> {
    if let Some(kind) = cell.get() {
        debug!(backend = kind.name(), "AES backend already initialized");
        return Ok(*kind);
    }

    let kind = options.backend.resolve();
    debug!(
        backend = kind.name(),
        preference = ?options.backend,
        hardware_aes = hardware_aes_available(),
        "selected AES backend"
    );

    if options.self_test {
        self_test(kind, answers)?;
    }

    // A racing initializer may have won; its choice stands.
    Ok(*cell.get_or_init(|| kind))
}
