// On-disk formats
// The binary ciphertext envelope and the two-line decimal key files

use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rsa::bigint::RsaBigInt;
use crate::rsa::keygen::{RsaPrivateKey, RsaPublicKey};
use crate::rsa::session::{NONCE_SIZE, TAG_SIZE};

/// Everything needed to decrypt one message.
///
/// Serialized with bincode in field order: nonce, tag, wrapped key, ciphertext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub nonce: [u8; NONCE_SIZE],
    pub tag: [u8; TAG_SIZE],
    /// Session key under textbook RSA
    pub wrapped_key: RsaBigInt,
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Encode to the binary on-disk form
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::EnvelopeFormat(e.to_string()))
    }

    /// Decode from the binary on-disk form
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| Error::EnvelopeFormat(e.to_string()))
    }
}

/// Render a key file: modulus and exponent in decimal, one per line
fn encode_key_file(n: &RsaBigInt, exponent: &RsaBigInt) -> String {
    format!("{}\n{}", n, exponent)
}

/// Parse a key file into (modulus, exponent).
///
/// Whitespace around each number is ignored, as is anything after the
/// second line.
fn decode_key_file(contents: &str) -> Result<(RsaBigInt, RsaBigInt)> {
    let mut lines = contents.lines();

    let n = parse_line(lines.next(), "modulus")?;
    let exponent = parse_line(lines.next(), "exponent")?;

    if n <= RsaBigInt::one() {
        return Err(Error::KeyFileFormat("modulus must be greater than 1".to_string()));
    }
    if exponent.is_zero() {
        return Err(Error::KeyFileFormat("exponent must be non-zero".to_string()));
    }

    Ok((n, exponent))
}

fn parse_line(line: Option<&str>, what: &str) -> Result<RsaBigInt> {
    let line = line
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or_else(|| Error::KeyFileFormat(format!("missing {}", what)))?;

    line.parse::<RsaBigInt>()
        .map_err(|e| Error::KeyFileFormat(format!("invalid {} {:?}: {}", what, line, e)))
}

impl RsaPublicKey {
    /// Serialize as a key file (N, e)
    pub fn to_key_file(&self) -> String {
        encode_key_file(&self.n, &self.e)
    }

    /// Parse a public key file
    pub fn from_key_file(contents: &str) -> Result<Self> {
        let (n, e) = decode_key_file(contents)?;
        Ok(Self { n, e })
    }
}

impl RsaPrivateKey {
    /// Serialize as a key file (N, d)
    pub fn to_key_file(&self) -> String {
        encode_key_file(&self.n, &self.d)
    }

    /// Parse a private key file
    pub fn from_key_file(contents: &str) -> Result<Self> {
        let (n, d) = decode_key_file(contents)?;
        Ok(Self { n, d })
    }
}
