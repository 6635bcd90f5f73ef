// RSA Module - Main module file
// Key generation, primality testing and the hybrid RSA + AES-EAX cipher

pub mod bigint;
pub mod primality;
pub mod keygen;
pub mod session;
pub mod encrypt;
pub mod decrypt;

pub use keygen::{
    generate_keypair, generate_keypair_with, KeyGenConfig, RsaKeyPair, RsaPrivateKey,
    RsaPublicKey, PUBLIC_EXPONENT,
};
pub use primality::is_probably_prime;
pub use encrypt::{encrypt_bytes, encrypt_string};
pub use decrypt::{decrypt_bytes, decrypt_to_string};
