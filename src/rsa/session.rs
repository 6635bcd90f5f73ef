// Session Key and Authenticated Cipher
// A fresh AES-128 key per message, wrapped with textbook RSA, protecting the
// payload under AES-128-EAX with a 16-byte nonce and a detached tag

use aes::Aes128;
use eax::aead::generic_array::GenericArray;
use eax::aead::{AeadInPlace, KeyInit};
use eax::Eax;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::ZeroizeOnDrop;

use super::bigint::{from_bytes, mod_pow, to_fixed_bytes, RsaBigInt};
use super::keygen::{RsaPrivateKey, RsaPublicKey};
use crate::error::{Error, Result};

/// Session key length in bytes (128 bits)
pub const SESSION_KEY_SIZE: usize = 16;

/// Nonce length in bytes
pub const NONCE_SIZE: usize = 16;

/// Authentication tag length in bytes
pub const TAG_SIZE: usize = 16;

/// AES-128-EAX; the nonce is one cipher block and the tag is a full block
type PayloadCipher = Eax<Aes128>;

/// Symmetric key for a single encryption or decryption.
///
/// Zeroized when dropped; only its RSA-wrapped form ever leaves memory.
#[derive(ZeroizeOnDrop)]
pub struct SessionKey([u8; SESSION_KEY_SIZE]);

impl SessionKey {
    /// Generate a key from the OS CSPRNG
    pub fn random() -> Self {
        let mut bytes = [0u8; SESSION_KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from existing bytes
    pub fn from_bytes(bytes: [u8; SESSION_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; SESSION_KEY_SIZE] {
        &self.0
    }

    /// Wrap under the public key: k^e mod N, k read big-endian.
    ///
    /// WARNING: textbook RSA with no padding (no OAEP). It is deterministic and
    /// malleable, so it is unsafe against active or adaptive adversaries. Do
    /// not treat this scheme as production-grade.
    pub fn wrap(&self, public_key: &RsaPublicKey) -> RsaBigInt {
        // k < 2^128 < N for any accepted key, so k is not reduced
        let k = from_bytes(&self.0);
        mod_pow(&k, &public_key.e, &public_key.n)
    }

    /// Recover a key from its wrapped form: c^d mod N as 16 bytes, MSB first.
    ///
    /// A result wider than 128 bits means the wrapped key was altered or the
    /// private key does not match, and is reported as an integrity failure.
    pub fn unwrap_with(wrapped: &RsaBigInt, private_key: &RsaPrivateKey) -> Result<Self> {
        let k = mod_pow(wrapped, &private_key.d, &private_key.n);
        to_fixed_bytes::<SESSION_KEY_SIZE>(&k)
            .map(Self)
            .ok_or_else(|| Error::Integrity("session key does not fit in 128 bits".to_string()))
    }

    fn cipher(&self) -> Result<PayloadCipher> {
        PayloadCipher::new_from_slice(&self.0)
            .map_err(|e| Error::Encryption(format!("Invalid key: {}", e)))
    }

    /// Encrypt in place under a fresh random nonce.
    ///
    /// Returns the nonce and the detached tag; the ciphertext is the same
    /// length as the plaintext.
    pub fn seal(&self, buffer: &mut [u8]) -> Result<([u8; NONCE_SIZE], [u8; TAG_SIZE])> {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let tag = self
            .cipher()?
            .encrypt_in_place_detached(GenericArray::from_slice(&nonce), b"", buffer)
            .map_err(|e| Error::Encryption(format!("Encryption failed: {}", e)))?;

        let mut tag_bytes = [0u8; TAG_SIZE];
        tag_bytes.copy_from_slice(&tag);
        Ok((nonce, tag_bytes))
    }

    /// Verify the tag and decrypt in place.
    ///
    /// On a tag mismatch `buffer` is left as ciphertext and an integrity
    /// error is returned.
    pub fn open(
        &self,
        nonce: &[u8; NONCE_SIZE],
        tag: &[u8; TAG_SIZE],
        buffer: &mut [u8],
    ) -> Result<()> {
        self.cipher()?
            .decrypt_in_place_detached(
                GenericArray::from_slice(nonce),
                b"",
                buffer,
                GenericArray::from_slice(tag),
            )
            .map_err(|_| Error::Integrity("authentication tag mismatch".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::test_keys::KEYPAIR;

    #[test]
    fn test_random_keys_differ() {
        let a = SessionKey::random();
        let b = SessionKey::random();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_wrap_unwrap() {
        let keypair = &*KEYPAIR;
        let key = SessionKey::random();

        let wrapped = key.wrap(&keypair.public_key);
        assert_ne!(wrapped, from_bytes(key.as_bytes()));

        let recovered = SessionKey::unwrap_with(&wrapped, &keypair.private_key).unwrap();
        assert_eq!(recovered.as_bytes(), key.as_bytes());
    }

    #[test]
    fn test_unwrap_keeps_leading_zeros() {
        let keypair = &*KEYPAIR;
        let mut bytes = [0u8; SESSION_KEY_SIZE];
        bytes[SESSION_KEY_SIZE - 1] = 0x2a;
        let key = SessionKey::from_bytes(bytes);

        let wrapped = key.wrap(&keypair.public_key);
        let recovered = SessionKey::unwrap_with(&wrapped, &keypair.private_key).unwrap();
        assert_eq!(recovered.as_bytes(), &bytes);
    }

    #[test]
    fn test_unwrap_tampered_key() {
        let keypair = &*KEYPAIR;
        let key = SessionKey::random();
        let wrapped = key.wrap(&keypair.public_key) + 1u8;

        // Decrypts to a ~2048-bit value with overwhelming probability
        let result = SessionKey::unwrap_with(&wrapped, &keypair.private_key);
        assert!(matches!(result, Err(Error::Integrity(_))));
    }

    #[test]
    fn test_seal_open() {
        let key = SessionKey::random();
        let plaintext = b"attack at dawn".to_vec();

        let mut buffer = plaintext.clone();
        let (nonce, tag) = key.seal(&mut buffer).unwrap();
        assert_eq!(buffer.len(), plaintext.len());
        assert_ne!(buffer, plaintext);

        key.open(&nonce, &tag, &mut buffer).unwrap();
        assert_eq!(buffer, plaintext);
    }

    #[test]
    fn test_open_rejects_bad_tag() {
        let key = SessionKey::random();
        let mut buffer = b"attack at dawn".to_vec();
        let (nonce, mut tag) = key.seal(&mut buffer).unwrap();

        tag[0] ^= 0x01;
        let result = key.open(&nonce, &tag, &mut buffer);
        assert!(matches!(result, Err(Error::Integrity(_))));
    }

    #[test]
    fn test_open_rejects_wrong_key() {
        let key = SessionKey::random();
        let other = SessionKey::random();
        let mut buffer = b"attack at dawn".to_vec();
        let (nonce, tag) = key.seal(&mut buffer).unwrap();

        assert!(other.open(&nonce, &tag, &mut buffer).is_err());
    }

    // Key 00..0f, nonce 10..1f, empty header, plaintext "hello world"
    const KNOWN_CIPHERTEXT: &str = "e6760870f6294397b2f0fe";
    const KNOWN_TAG: &str = "c8b3ccb4d985bfdb3f220eefb097bbe3";

    fn known_key_and_nonce() -> (SessionKey, [u8; NONCE_SIZE]) {
        let mut key = [0u8; SESSION_KEY_SIZE];
        let mut nonce = [0u8; NONCE_SIZE];
        for i in 0..16 {
            key[i] = i as u8;
            nonce[i] = 16 + i as u8;
        }
        (SessionKey::from_bytes(key), nonce)
    }

    #[test]
    fn test_payload_cipher_is_eax() {
        let (key, nonce) = known_key_and_nonce();
        let mut buffer = b"hello world".to_vec();

        let tag = key
            .cipher()
            .unwrap()
            .encrypt_in_place_detached(GenericArray::from_slice(&nonce), b"", &mut buffer)
            .unwrap();

        assert_eq!(hex::encode(&buffer), KNOWN_CIPHERTEXT);
        assert_eq!(hex::encode(tag), KNOWN_TAG);
    }

    #[test]
    fn test_open_known_eax_message() {
        let (key, nonce) = known_key_and_nonce();
        let mut buffer = hex::decode(KNOWN_CIPHERTEXT).unwrap();
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(&hex::decode(KNOWN_TAG).unwrap());

        key.open(&nonce, &tag, &mut buffer).unwrap();
        assert_eq!(buffer, b"hello world");

        // Every tag bit is checked
        for bit in 0..(TAG_SIZE * 8) {
            let mut bad_tag = tag;
            bad_tag[bit / 8] ^= 1 << (bit % 8);
            let mut buffer = hex::decode(KNOWN_CIPHERTEXT).unwrap();
            let result = key.open(&nonce, &bad_tag, &mut buffer);
            assert!(matches!(result, Err(Error::Integrity(_))));
        }
    }
}
