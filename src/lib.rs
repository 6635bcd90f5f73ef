//! RSA key generation and hybrid public-key encryption.
//!
//! A random 128-bit session key encrypts the payload with AES-128-EAX; the
//! session key itself is wrapped with RSA exponentiation. Key pairs use two
//! 1024-bit primes found by trial division plus 40 rounds of Miller-Rabin.
//!
//! **Warning:** the session key is wrapped with textbook RSA (no OAEP or other
//! padding). That is unsafe against active or adaptive adversaries; do not use
//! this crate where production-grade security is required.

pub mod envelope;
pub mod error;
pub mod rsa;
pub mod util;

pub use envelope::Envelope;
pub use error::{Error, Result};
pub use rsa::{
    decrypt_bytes, encrypt_bytes, generate_keypair, KeyGenConfig, RsaKeyPair, RsaPrivateKey,
    RsaPublicKey,
};
pub use util::{decrypt_file, encrypt_file, generate_key_files, KeyFiles};
