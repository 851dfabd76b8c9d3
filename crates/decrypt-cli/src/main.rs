//! vaultgate-decrypt: offline decryption for vaultgate ciphertext files.
//!
//! Takes the key/IV hex pair returned by the upload endpoint and decrypts a
//! downloaded `.enc` file locally. Runs entirely offline; it never talks to
//! the gateway or the object store.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use common::ENCRYPTED_SUFFIX;
use streamcrypt::{parse_hex, transform_file, CipherEngine};

#[derive(Parser, Debug)]
#[command(
    name = "vaultgate-decrypt",
    version,
    about = "Decrypt a vaultgate ciphertext file with its one-time key/IV pair"
)]
struct Cli {
    /// Encrypted input file (usually ending in .enc)
    #[arg(value_name = "ENCRYPTED_FILE")]
    encrypted_file: PathBuf,

    /// 64-character hex key returned by the upload
    #[arg(value_name = "KEY_HEX")]
    key_hex: String,

    /// 32-character hex IV returned by the upload
    #[arg(value_name = "IV_HEX")]
    iv_hex: String,

    /// Plaintext destination (default: input with .enc stripped)
    #[arg(value_name = "OUTPUT_FILE")]
    output_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (output, bytes) = decrypt(&cli).await?;
    println!("Decrypted: {}", output.display());
    println!("  bytes: {bytes}");
    Ok(())
}

async fn decrypt(cli: &Cli) -> Result<(PathBuf, u64)> {
    let output = match &cli.output_file {
        Some(path) => path.clone(),
        None => derive_output_path(&cli.encrypted_file)?,
    };
    if is_same_file(&cli.encrypted_file, &output) {
        bail!(
            "output {} is the encrypted input itself; choose a different path",
            output.display()
        );
    }

    let (key, iv) = parse_hex(&cli.key_hex, &cli.iv_hex).context("invalid key or IV")?;
    let mut engine = CipherEngine::new(&key, &iv);

    let bytes = transform_file(&cli.encrypted_file, &output, &mut engine)
        .await
        .with_context(|| format!("decrypting {}", cli.encrypted_file.display()))?;

    Ok((output, bytes))
}

/// True when `output` names the same file as `input`.
///
/// Writing the plaintext over the ciphertext would truncate the input before
/// the first read, and the key/IV pair cannot bring those bytes back.
/// Canonicalisation catches aliases of an existing output; a path that does
/// not resolve cannot be the existing input.
fn is_same_file(input: &Path, output: &Path) -> bool {
    if input == output {
        return true;
    }
    match (std::fs::canonicalize(input), std::fs::canonicalize(output)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Derive the default plaintext path by stripping the `.enc` suffix.
///
/// Inputs without the suffix are refused so the plaintext never lands on
/// top of the ciphertext it came from.
fn derive_output_path(input: &Path) -> Result<PathBuf> {
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("invalid input filename: {}", input.display()))?;
    match name.strip_suffix(ENCRYPTED_SUFFIX) {
        Some(stem) if !stem.is_empty() => Ok(input.with_file_name(stem)),
        _ => bail!(
            "{} does not end in {ENCRYPTED_SUFFIX}; pass an explicit output file",
            input.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_strips_suffix() {
        let out = derive_output_path(Path::new("downloads/notes.txt.enc")).unwrap();
        assert_eq!(out, PathBuf::from("downloads/notes.txt"));
    }

    #[test]
    fn output_path_refused_without_suffix() {
        let err = derive_output_path(Path::new("notes.txt")).unwrap_err();
        assert!(err.to_string().contains("explicit output file"));
    }

    #[test]
    fn output_path_refused_for_bare_suffix() {
        assert!(derive_output_path(Path::new(".enc")).is_err());
    }

    #[tokio::test]
    async fn decrypts_a_file_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let key_hex = "11".repeat(32);
        let iv_hex = "22".repeat(16);

        // Seed a ciphertext file the way the gateway would produce it.
        let plaintext = b"minutes of the last meeting";
        let (key, iv) = parse_hex(&key_hex, &iv_hex).unwrap();
        let mut ciphertext = plaintext.to_vec();
        CipherEngine::new(&key, &iv).apply(&mut ciphertext).unwrap();
        let encrypted_file = dir.path().join("minutes.txt.enc");
        std::fs::write(&encrypted_file, &ciphertext).unwrap();

        let cli = Cli {
            encrypted_file: encrypted_file.clone(),
            key_hex,
            iv_hex,
            output_file: None,
        };
        let (output, bytes) = decrypt(&cli).await.unwrap();

        assert_eq!(output, dir.path().join("minutes.txt"));
        assert_eq!(bytes, plaintext.len() as u64);
        assert_eq!(std::fs::read(output).unwrap(), plaintext);
        // The ciphertext input is untouched.
        assert_eq!(std::fs::read(encrypted_file).unwrap(), ciphertext);
    }

    #[tokio::test]
    async fn explicit_output_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let encrypted_file = dir.path().join("raw.bin");
        std::fs::write(&encrypted_file, b"\x01\x02\x03").unwrap();

        let cli = Cli {
            encrypted_file,
            key_hex: "00".repeat(32),
            iv_hex: "00".repeat(16),
            output_file: Some(dir.path().join("out.bin")),
        };
        let (output, _) = decrypt(&cli).await.unwrap();
        assert_eq!(output, dir.path().join("out.bin"));
        assert!(output.exists());
    }

    #[tokio::test]
    async fn refuses_explicit_output_equal_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let encrypted_file = dir.path().join("data.enc");
        let ciphertext = vec![0x5Au8; 30];
        std::fs::write(&encrypted_file, &ciphertext).unwrap();

        let cli = Cli {
            encrypted_file: encrypted_file.clone(),
            key_hex: "00".repeat(32),
            iv_hex: "00".repeat(16),
            output_file: Some(encrypted_file.clone()),
        };
        let err = decrypt(&cli).await.unwrap_err();
        assert!(err.to_string().contains("choose a different path"));
        // The only copy of the ciphertext must be untouched.
        assert_eq!(std::fs::read(&encrypted_file).unwrap(), ciphertext);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn refuses_output_reaching_input_through_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("store");
        std::fs::create_dir(&real).unwrap();
        let encrypted_file = real.join("data.enc");
        std::fs::write(&encrypted_file, b"ciphertext").unwrap();
        let alias = dir.path().join("alias");
        std::os::unix::fs::symlink(&real, &alias).unwrap();

        let cli = Cli {
            encrypted_file: encrypted_file.clone(),
            key_hex: "00".repeat(32),
            iv_hex: "00".repeat(16),
            output_file: Some(alias.join("data.enc")),
        };
        assert!(decrypt(&cli).await.is_err());
        assert_eq!(std::fs::read(&encrypted_file).unwrap(), b"ciphertext");
    }

    #[tokio::test]
    async fn bad_hex_is_reported_before_touching_files() {
        let cli = Cli {
            encrypted_file: PathBuf::from("nonexistent.enc"),
            key_hex: "zz".repeat(32),
            iv_hex: "00".repeat(16),
            output_file: Some(PathBuf::from("out.bin")),
        };
        let err = decrypt(&cli).await.unwrap_err();
        assert!(err.to_string().contains("invalid key or IV"));
    }
}
