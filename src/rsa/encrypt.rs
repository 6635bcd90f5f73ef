// Hybrid Encryption
// A fresh session key encrypts the payload; RSA only wraps that key

use tracing::debug;

use super::keygen::RsaPublicKey;
use super::session::SessionKey;
use crate::envelope::Envelope;
use crate::error::Result;

/// Encrypt bytes for the holder of the matching private key.
///
/// The session key is wrapped with textbook RSA (no padding), which is unsafe
/// against active adversaries; this scheme is not production-grade.
pub fn encrypt_bytes(plaintext: &[u8], public_key: &RsaPublicKey) -> Result<Envelope> {
    // Step 1: Fresh 128-bit session key
    let session_key = SessionKey::random();

    // Step 2: Wrap it with k^e mod N
    let wrapped_key = session_key.wrap(public_key);

    // Step 3: Authenticated encryption of the payload
    let mut ciphertext = plaintext.to_vec();
    let (nonce, tag) = session_key.seal(&mut ciphertext)?;

    debug!(
        len = ciphertext.len(),
        nonce = %hex::encode(nonce),
        "encrypted payload"
    );

    Ok(Envelope {
        nonce,
        tag,
        wrapped_key,
        ciphertext,
    })
}

/// Encrypt a string using RSA public key
pub fn encrypt_string(plaintext: &str, public_key: &RsaPublicKey) -> Result<Envelope> {
    encrypt_bytes(plaintext.as_bytes(), public_key)
}
