// Hybrid Decryption
// Unwrap the session key with RSA, then verify and decrypt the payload

use tracing::{debug, warn};

use super::keygen::RsaPrivateKey;
use super::session::SessionKey;
use crate::envelope::Envelope;
use crate::error::Result;

/// Decrypt an envelope with the private key.
///
/// Fails with `Error::Integrity` if the tag does not verify or the wrapped
/// key does not unwrap to 128 bits. No plaintext is returned on failure.
pub fn decrypt_bytes(envelope: &Envelope, private_key: &RsaPrivateKey) -> Result<Vec<u8>> {
    // Step 1: k = c^d mod N, as 16 bytes MSB first
    let session_key =
        SessionKey::unwrap_with(&envelope.wrapped_key, private_key).map_err(|e| {
            warn!(error = %e, "session key rejected");
            e
        })?;

    // Step 2: Verify the tag and decrypt
    let mut plaintext = envelope.ciphertext.clone();
    session_key
        .open(&envelope.nonce, &envelope.tag, &mut plaintext)
        .map_err(|e| {
            warn!(error = %e, nonce = %hex::encode(envelope.nonce), "payload rejected");
            e
        })?;

    debug!(len = plaintext.len(), "decrypted payload");
    Ok(plaintext)
}

/// Decrypt ciphertext to a string
pub fn decrypt_to_string(envelope: &Envelope, private_key: &RsaPrivateKey) -> Result<String> {
    let plaintext = decrypt_bytes(envelope, private_key)?;
    Ok(String::from_utf8(plaintext)?)
}
