// File Operations for RSA Key Generation and Hybrid Encryption/Decryption
// Reads and writes key files, plaintext files and ciphertext envelopes

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use crate::envelope::Envelope;
use crate::error::Result;
use crate::rsa::decrypt::decrypt_bytes;
use crate::rsa::encrypt::encrypt_bytes;
use crate::rsa::keygen::{generate_keypair_with, KeyGenConfig, RsaKeyPair, RsaPrivateKey, RsaPublicKey};

/// Extension of public key files
pub const PUBLIC_KEY_EXTENSION: &str = "pub";

/// Extension of private key files
pub const PRIVATE_KEY_EXTENSION: &str = "prv";

/// Paths written by [`generate_key_files`]
#[derive(Clone, Debug, PartialEq)]
pub struct KeyFiles {
    pub public_key: PathBuf,
    pub private_key: PathBuf,
}

impl KeyFiles {
    /// `<dir>/<username>.pub` and `<dir>/<username>.prv`
    pub fn for_user(dir: &Path, username: &str) -> Self {
        Self {
            public_key: dir.join(format!("{}.{}", username, PUBLIC_KEY_EXTENSION)),
            private_key: dir.join(format!("{}.{}", username, PRIVATE_KEY_EXTENSION)),
        }
    }
}

/// Write `data` to `path` all at once.
///
/// The bytes go to a temporary file in the same directory which is then
/// renamed over `path`, so a failed write never leaves a partial file behind.
pub fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(data)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Read a public key file (N, e)
pub fn read_public_key(path: &Path) -> Result<RsaPublicKey> {
    RsaPublicKey::from_key_file(&fs::read_to_string(path)?)
}

/// Read a private key file (N, d)
pub fn read_private_key(path: &Path) -> Result<RsaPrivateKey> {
    RsaPrivateKey::from_key_file(&fs::read_to_string(path)?)
}

/// Generate a key pair and write `<username>.pub` and `<username>.prv` into `dir`
pub fn generate_key_files(username: &str, dir: &Path) -> Result<KeyFiles> {
    generate_key_files_with(username, dir, &KeyGenConfig::default()).map(|(files, _)| files)
}

/// Same as [`generate_key_files`] with explicit settings; also hands back the
/// in-memory key pair.
pub fn generate_key_files_with(
    username: &str,
    dir: &Path,
    config: &KeyGenConfig,
) -> Result<(KeyFiles, RsaKeyPair)> {
    let keypair = generate_keypair_with(config)?;
    let files = KeyFiles::for_user(dir, username);

    write_file(&files.private_key, keypair.private_key.to_key_file().as_bytes())?;
    write_file(&files.public_key, keypair.public_key.to_key_file().as_bytes())?;

    info!(
        username,
        public_key = %files.public_key.display(),
        private_key = %files.private_key.display(),
        "wrote key files"
    );

    Ok((files, keypair))
}

/// Encrypt `plaintext_path` for the owner of `public_key_path` into `output_path`
pub fn encrypt_file(public_key_path: &Path, plaintext_path: &Path, output_path: &Path) -> Result<()> {
    let public_key = read_public_key(public_key_path)?;
    let plaintext = fs::read(plaintext_path)?;

    let envelope = encrypt_bytes(&plaintext, &public_key)?;
    let encoded = envelope.to_bytes()?;
    write_file(output_path, &encoded)?;

    info!(
        input = %plaintext_path.display(),
        output = %output_path.display(),
        size = encoded.len(),
        "encrypted file"
    );
    Ok(())
}

/// Decrypt `ciphertext_path` with `private_key_path` into `output_path`.
///
/// The output file is only created once the payload has been verified; on an
/// integrity failure nothing is written and an existing file is left as is.
pub fn decrypt_file(private_key_path: &Path, ciphertext_path: &Path, output_path: &Path) -> Result<()> {
    let private_key = read_private_key(private_key_path)?;
    let envelope = Envelope::from_bytes(&fs::read(ciphertext_path)?)?;

    let plaintext = decrypt_bytes(&envelope, &private_key)?;
    write_file(output_path, &plaintext)?;

    info!(
        input = %ciphertext_path.display(),
        output = %output_path.display(),
        size = plaintext.len(),
        "decrypted file"
    );
    Ok(())
}
