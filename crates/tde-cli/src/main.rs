//! Command-line interface for `tde-keystream`.

#![forbid(unsafe_code)]

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, ensure, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tde_keystream::{
    aes128_encrypted_zero_blocks, apply_keystream, keystream_len, BackendPreference,
    InitOptions, BLOCK_SIZE,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

/// AES-128 encrypted-zero-block keystream tool.
#[derive(Parser)]
#[command(name = "tdeks", version, author, about = "AES-128 keystream tool for TDE data")]
struct Cli {
    /// AES backend to select at initialization.
    #[arg(long, value_enum, default_value_t = Backend::Auto, global = true)]
    backend: Backend,
    /// Skip the known-answer self test during initialization.
    #[arg(long, default_value_t = false, global = true)]
    no_self_test: bool,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins if set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    Auto,
    Accelerated,
    Reference,
}

impl From<Backend> for BackendPreference {
    fn from(value: Backend) -> Self {
        match value {
            Backend::Auto => BackendPreference::Auto,
            Backend::Accelerated => BackendPreference::Accelerated,
            Backend::Reference => BackendPreference::Reference,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Emit keystream for the block range [start, end).
    Keystream {
        /// AES-128 key as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        key_hex: String,
        /// First block index.
        #[arg(long)]
        start: u64,
        /// One past the last block index.
        #[arg(long)]
        end: u64,
        /// Write raw keystream here instead of printing hex.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// XOR a file with the keystream; the same command encrypts and decrypts.
    Xor {
        /// AES-128 key as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        key_hex: String,
        /// Input file.
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Output file.
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
        /// Block index of the first input byte within the encrypted object.
        #[arg(long, default_value_t = 0)]
        block_offset: u64,
    },
    /// Check the keystream and test surface against pinned vectors.
    Selftest,
    /// CBC-encrypt a file with PKCS#7 padding (test surface).
    #[cfg(feature = "test-surface")]
    CbcEnc {
        /// AES-128 key as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        key_hex: String,
        /// IV as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        iv_hex: String,
        /// Plaintext input.
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Ciphertext output.
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// CBC-decrypt a file and strip PKCS#7 padding (test surface).
    #[cfg(feature = "test-surface")]
    CbcDec {
        /// AES-128 key as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        key_hex: String,
        /// IV as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        iv_hex: String,
        /// Ciphertext input.
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Plaintext output.
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Run a local demo: random key, encrypt random data, decrypt it back.
    Demo {
        /// Optional RNG seed for reproducibility.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let backend = tde_keystream::init_with(InitOptions {
        backend: cli.backend.into(),
        self_test: !cli.no_self_test,
    })
    .context("initialize AES backend")?;
    info!(backend = backend.name(), "AES backend ready");

    match cli.command {
        Commands::Keystream {
            key_hex,
            start,
            end,
            out,
        } => cmd_keystream(&key_hex, start, end, out.as_ref()),
        Commands::Xor {
            key_hex,
            input,
            output,
            block_offset,
        } => cmd_xor(&key_hex, &input, &output, block_offset),
        Commands::Selftest => cmd_selftest(),
        #[cfg(feature = "test-surface")]
        Commands::CbcEnc {
            key_hex,
            iv_hex,
            input,
            output,
        } => cmd_cbc_enc(&key_hex, &iv_hex, &input, &output),
        #[cfg(feature = "test-surface")]
        Commands::CbcDec {
            key_hex,
            iv_hex,
            input,
            output,
        } => cmd_cbc_dec(&key_hex, &iv_hex, &input, &output),
        Commands::Demo { seed } => cmd_demo(seed),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Upper bound on blocks generated per write, so a huge range never lands in memory at once.
const KEYSTREAM_CHUNK_BLOCKS: u64 = 4096;

fn cmd_keystream(key_hex: &str, start: u64, end: u64, out: Option<&PathBuf>) -> Result<()> {
    let key = parse_hex16(key_hex, "key")?;
    let len = keystream_len(start, end).context("block range")?;

    match out {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("create {}", path.display()))?;
            let mut sink = BufWriter::new(file);
            write_keystream(&key, start, end, KEYSTREAM_CHUNK_BLOCKS, true, &mut sink)?;
            sink.flush().with_context(|| format!("write {}", path.display()))?;
            debug!(bytes = len, path = %path.display(), "wrote keystream");
        }
        None => {
            let stdout = io::stdout();
            let mut sink = stdout.lock();
            write_keystream(&key, start, end, KEYSTREAM_CHUNK_BLOCKS, false, &mut sink)?;
        }
    }
    Ok(())
}

/// Generates `[start, end)` in windows of at most `chunk_blocks` blocks and writes each one
/// either as raw bytes or as one `index hex` line per block.
fn write_keystream<W: Write>(
    key: &[u8; 16],
    start: u64,
    end: u64,
    chunk_blocks: u64,
    raw: bool,
    sink: &mut W,
) -> Result<()> {
    ensure!(chunk_blocks > 0, "chunk size must be at least one block");
    keystream_len(start, end).context("block range")?;

    let mut stream = Zeroizing::new(Vec::new());
    let mut cursor = start;
    while cursor < end {
        let stop = cursor.saturating_add(chunk_blocks).min(end);
        let len = keystream_len(cursor, stop).context("block range")?;
        stream.resize(len, 0);
        aes128_encrypted_zero_blocks(key, cursor, stop, &mut stream)
            .context("generate keystream")?;
        if raw {
            sink.write_all(&stream).context("write keystream")?;
        } else {
            for (index, block) in (cursor..stop).zip(stream.chunks_exact(BLOCK_SIZE)) {
                writeln!(sink, "{index:>20} {}", hex::encode(block))
                    .context("write keystream")?;
            }
        }
        cursor = stop;
    }
    Ok(())
}

fn cmd_xor(key_hex: &str, input: &PathBuf, output: &PathBuf, block_offset: u64) -> Result<()> {
    let key = parse_hex16(key_hex, "key")?;
    let byte_offset = block_offset
        .checked_mul(BLOCK_SIZE as u64)
        .context("block offset overflows a byte offset")?;
    let mut data = fs::read(input).with_context(|| format!("read {}", input.display()))?;
    apply_keystream(&key, byte_offset, &mut data).context("apply keystream")?;
    fs::write(output, &data).with_context(|| format!("write {}", output.display()))?;
    debug!(bytes = data.len(), block_offset, "applied keystream");
    Ok(())
}

#[cfg(feature = "test-surface")]
fn cmd_cbc_enc(key_hex: &str, iv_hex: &str, input: &PathBuf, output: &PathBuf) -> Result<()> {
    let key = parse_hex16(key_hex, "key")?;
    let iv = parse_hex16(iv_hex, "IV")?;
    let data = fs::read(input).with_context(|| format!("read {}", input.display()))?;
    let ct = tde_keystream::aes_encrypt_to_vec(&key, &iv, &data).context("CBC encrypt")?;
    fs::write(output, ct).with_context(|| format!("write {}", output.display()))?;
    Ok(())
}

#[cfg(feature = "test-surface")]
fn cmd_cbc_dec(key_hex: &str, iv_hex: &str, input: &PathBuf, output: &PathBuf) -> Result<()> {
    let key = parse_hex16(key_hex, "key")?;
    let iv = parse_hex16(iv_hex, "IV")?;
    let data = fs::read(input).with_context(|| format!("read {}", input.display()))?;
    let pt = Zeroizing::new(
        tde_keystream::aes_decrypt_to_vec(&key, &iv, &data).context("CBC decrypt")?,
    );
    fs::write(output, pt.as_slice()).with_context(|| format!("write {}", output.display()))?;
    Ok(())
}

/// Pinned vector: (name, key, start block, expected keystream hex).
const KEYSTREAM_VECTORS: [(&str, [u8; 16], u64, &str); 3] = [
    (
        "zero key, block 0",
        [0u8; 16],
        0,
        "66e94bd4ef8a2c3b884cfa59ca342b2e",
    ),
    (
        "zero key, block 1",
        [0u8; 16],
        1,
        "0c546f62bf2773cd0f564fceca7ba688",
    ),
    (
        "sequential key, blocks 100..104",
        [
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
            0x0e, 0x0f,
        ],
        100,
        "33a2a7b3ed8c73c841f0a10289e4c48419dfa56ac85389e08e4f1f1cabd890eb\
         d734b220508080516ff4fa1c4603289a83ff564fd0a665a21118403e49d68b07",
    ),
];

fn cmd_selftest() -> Result<()> {
    let mut failures = 0usize;
    let mut report = |name: &str, ok: bool| {
        println!("{} {name}", if ok { "ok  " } else { "FAIL" });
        if !ok {
            failures += 1;
        }
    };

    for (name, key, start, expected_hex) in KEYSTREAM_VECTORS.iter() {
        let expected = hex::decode(expected_hex).context("decode pinned vector")?;
        let blocks = (expected.len() / BLOCK_SIZE) as u64;
        let mut stream = vec![0u8; expected.len()];
        aes128_encrypted_zero_blocks(key, *start, start + blocks, &mut stream)?;
        report(name, stream == expected);
    }

    report(
        "empty range",
        aes128_encrypted_zero_blocks(&[0u8; 16], 7, 7, &mut []).is_ok(),
    );

    let key = [0x5cu8; 16];
    let message: Vec<u8> = (0..64u8).collect();
    let mut data = message.clone();
    apply_keystream(&key, 0, &mut data)?;
    let changed = data != message;
    apply_keystream(&key, 0, &mut data)?;
    report("xor round trip", changed && data == message);

    #[cfg(feature = "test-surface")]
    {
        let fox = b"The quick brown fox jumps over the lazy dog";
        let ct = tde_keystream::aes_encrypt_to_vec(&[0x01; 16], &[0x02; 16], fox)?;
        let pt = tde_keystream::aes_decrypt_to_vec(&[0x01; 16], &[0x02; 16], &ct)?;
        report("cbc round trip", ct.len() == 48 && pt == fox);
    }

    ensure!(failures == 0, "{failures} self test check(s) failed");
    Ok(())
}

fn cmd_demo(seed: Option<u64>) -> Result<()> {
    let mut rng = seeded_rng(seed);
    let mut key = Zeroizing::new([0u8; 16]);
    rng.fill_bytes(&mut key[..]);

    let mut data = vec![0u8; rng.gen_range(1..=256)];
    rng.fill_bytes(&mut data);
    let byte_offset = rng.gen_range(0..1u64 << 32);
    let plaintext_hex = hex::encode(&data);

    apply_keystream(&key, byte_offset, &mut data)?;
    let ciphertext_hex = hex::encode(&data);
    apply_keystream(&key, byte_offset, &mut data)?;
    let decrypted_hex = hex::encode(&data);

    println!("demo key: {}", hex::encode(key.as_slice()));
    println!("byte offset: {byte_offset}");
    println!("plaintext: {plaintext_hex}");
    println!("ciphertext: {ciphertext_hex}");
    println!("decrypted: {decrypted_hex}");
    if decrypted_hex != plaintext_hex {
        bail!("demo roundtrip failed");
    }
    Ok(())
}

fn parse_hex16(hex_str: &str, what: &str) -> Result<Zeroizing<[u8; 16]>> {
    let bytes = Zeroizing::new(
        hex::decode(hex_str.trim()).with_context(|| format!("decode {what} hex"))?,
    );
    if bytes.len() != 16 {
        bail!("{what} must be 16 bytes (32 hex characters)");
    }
    let mut out = Zeroizing::new([0u8; 16]);
    out.copy_from_slice(&bytes);
    Ok(out)
}

fn seeded_rng(seed: Option<u64>) -> ChaCha20Rng {
    match seed {
        Some(value) => ChaCha20Rng::seed_from_u64(value),
        None => {
            let mut seed_bytes = [0u8; 32];
            rand::rngs::OsRng.fill_bytes(&mut seed_bytes);
            ChaCha20Rng::from_seed(seed_bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex16_accepts_32_hex_chars() {
        let key = parse_hex16(" 000102030405060708090a0b0c0d0e0f\n", "key").expect("parse");
        assert_eq!(key[15], 0x0f);
    }

    #[test]
    fn parse_hex16_rejects_wrong_length() {
        let err = parse_hex16("0011", "IV").unwrap_err();
        assert!(err.to_string().contains("IV must be 16 bytes"));
        assert!(parse_hex16("zz", "key").is_err());
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tdeks",
            "keystream",
            "--key-hex",
            "00000000000000000000000000000000",
            "--start",
            "0",
            "--end",
            "4",
            "--backend",
            "reference",
            "-vv",
        ])
        .expect("parse");
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.backend, Backend::Reference));
        assert!(matches!(cli.command, Commands::Keystream { end: 4, .. }));
    }

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tdeks-{}-{name}", std::process::id()))
    }

    fn expected_keystream(key: &[u8; 16], start: u64, end: u64) -> Vec<u8> {
        let mut stream = vec![0u8; keystream_len(start, end).expect("len")];
        aes128_encrypted_zero_blocks(key, start, end, &mut stream).expect("keystream");
        stream
    }

    #[test]
    fn chunked_raw_keystream_matches_single_call() {
        tde_keystream::init().expect("init");
        let key = [0x3cu8; 16];
        let mut sink = Vec::new();
        write_keystream(&key, 5, 15, 3, true, &mut sink).expect("write");
        assert_eq!(sink, expected_keystream(&key, 5, 15));
    }

    #[test]
    fn chunked_hex_keystream_prints_one_line_per_block() {
        tde_keystream::init().expect("init");
        let mut sink = Vec::new();
        write_keystream(&[0u8; 16], 0, 2, 1, false, &mut sink).expect("write");
        let text = String::from_utf8(sink).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].trim_start().starts_with("0 66e94bd4ef8a2c3b884cfa59ca342b2e"));
        assert!(lines[1].trim_start().starts_with("1 0c546f62bf2773cd0f564fceca7ba688"));
    }

    #[test]
    fn keystream_chunking_rejects_bad_input() {
        tde_keystream::init().expect("init");
        let mut sink = Vec::new();
        assert!(write_keystream(&[0u8; 16], 4, 2, 8, true, &mut sink).is_err());
        assert!(write_keystream(&[0u8; 16], 0, 2, 0, true, &mut sink).is_err());
        write_keystream(&[0u8; 16], 9, 9, 8, true, &mut sink).expect("empty range");
        assert!(sink.is_empty());
    }

    #[test]
    fn keystream_command_writes_file_across_chunks() {
        tde_keystream::init().expect("init");
        let out = scratch_path("keystream.bin");
        let end = KEYSTREAM_CHUNK_BLOCKS + 3;
        cmd_keystream("000102030405060708090a0b0c0d0e0f", 0, end, Some(&out))
            .expect("keystream");
        let written = fs::read(&out).expect("read");
        fs::remove_file(&out).ok();
        let key: [u8; 16] = core::array::from_fn(|i| i as u8);
        assert_eq!(written, expected_keystream(&key, 0, end));
    }

    #[test]
    fn xor_command_honours_block_offset_and_round_trips() {
        tde_keystream::init().expect("init");
        let key_hex = "2b7e151628aed2a6abf7158809cf4f3c";
        let key = parse_hex16(key_hex, "key").expect("key");
        let input = scratch_path("xor-in.bin");
        let sealed = scratch_path("xor-sealed.bin");
        let opened = scratch_path("xor-opened.bin");
        let message: Vec<u8> = (0..77u8).collect();
        fs::write(&input, &message).expect("write input");

        cmd_xor(key_hex, &input, &sealed, 3).expect("seal");
        cmd_xor(key_hex, &sealed, &opened, 3).expect("open");
        let sealed_bytes = fs::read(&sealed).expect("read sealed");
        let opened_bytes = fs::read(&opened).expect("read opened");
        for path in [&input, &sealed, &opened] {
            fs::remove_file(path).ok();
        }

        let mut expected = message.clone();
        apply_keystream(&key, 3 * BLOCK_SIZE as u64, &mut expected).expect("apply");
        assert_eq!(sealed_bytes, expected);
        assert_ne!(sealed_bytes, message);
        assert_eq!(opened_bytes, message);
    }

    #[test]
    fn xor_command_rejects_overflowing_block_offset() {
        tde_keystream::init().expect("init");
        let input = scratch_path("xor-overflow.bin");
        fs::write(&input, [0u8; 4]).expect("write input");
        let err = cmd_xor(
            "00000000000000000000000000000000",
            &input,
            &scratch_path("xor-overflow-out.bin"),
            u64::MAX,
        )
        .unwrap_err();
        fs::remove_file(&input).ok();
        assert!(err.to_string().contains("block offset overflows"));
    }

    #[test]
    fn selftest_passes() {
        tde_keystream::init().expect("init");
        cmd_selftest().expect("selftest");
    }
}
