// RSA Key Generation
// Implements RSA key pair generation (public and private keys)

use rand::rngs::ThreadRng;
use rand::thread_rng;
use tracing::{debug, info, trace};

use super::bigint::{from_u64, mod_inverse, RsaBigInt};
use super::primality::{search_prime, DEFAULT_MILLER_RABIN_ROUNDS};
use crate::error::{Error, Result};

/// Fixed public exponent
pub const PUBLIC_EXPONENT: u64 = 65537;

/// Size of each prime factor; the modulus is twice this
pub const DEFAULT_PRIME_BITS: u32 = 1024;

/// RSA Public Key
#[derive(Debug, Clone, PartialEq)]
pub struct RsaPublicKey {
    pub n: RsaBigInt, // Modulus
    pub e: RsaBigInt, // Public exponent
}

/// RSA Private Key
///
/// Only the modulus and private exponent; this is all the key file holds.
#[derive(Debug, Clone, PartialEq)]
pub struct RsaPrivateKey {
    pub n: RsaBigInt, // Modulus (same as public)
    pub d: RsaBigInt, // Private exponent
}

/// RSA Key Pair (both public and private keys)
///
/// The prime factors are kept for verification only and never persisted.
#[derive(Debug, Clone)]
pub struct RsaKeyPair {
    pub public_key: RsaPublicKey,
    pub private_key: RsaPrivateKey,
    pub p: RsaBigInt,
    pub q: RsaBigInt,
}

impl RsaPublicKey {
    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }
}

impl RsaPrivateKey {
    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }
}

impl RsaKeyPair {
    /// Get the bit length of the key
    pub fn bit_length(&self) -> u64 {
        self.public_key.bit_length()
    }

    /// φ(N) = (p-1)(q-1)
    pub fn phi(&self) -> RsaBigInt {
        (&self.p - 1u8) * (&self.q - 1u8)
    }
}

/// Settings for key generation
#[derive(Clone, Debug)]
pub struct KeyGenConfig {
    pub prime_bits: u32,
    pub public_exponent: u64,
    pub miller_rabin_rounds: u32,
    /// Candidates drawn per prime before giving up
    pub max_prime_candidates: u64,
    /// (p, q) pairs tried before giving up
    pub max_pair_attempts: u64,
}

impl Default for KeyGenConfig {
    fn default() -> Self {
        Self {
            prime_bits: DEFAULT_PRIME_BITS,
            public_exponent: PUBLIC_EXPONENT,
            miller_rabin_rounds: DEFAULT_MILLER_RABIN_ROUNDS,
            max_prime_candidates: 1_000_000,
            max_pair_attempts: 256,
        }
    }
}

impl KeyGenConfig {
    pub fn with_prime_bits(mut self, bits: u32) -> Self {
        self.prime_bits = bits;
        self
    }

    pub fn with_public_exponent(mut self, e: u64) -> Self {
        self.public_exponent = e;
        self
    }

    pub fn with_miller_rabin_rounds(mut self, rounds: u32) -> Self {
        self.miller_rabin_rounds = rounds;
        self
    }

    pub fn with_max_prime_candidates(mut self, max: u64) -> Self {
        self.max_prime_candidates = max;
        self
    }

    pub fn with_max_pair_attempts(mut self, max: u64) -> Self {
        self.max_pair_attempts = max;
        self
    }

    /// Check the settings before any prime search starts
    pub fn validate(&self) -> Result<()> {
        // N must exceed every 128-bit session key
        if self.prime_bits < 128 {
            return Err(Error::InvalidConfig(format!(
                "prime_bits must be at least 128, got {}",
                self.prime_bits
            )));
        }
        if self.public_exponent < 3 || self.public_exponent % 2 == 0 {
            return Err(Error::InvalidConfig(format!(
                "public exponent must be odd and at least 3, got {}",
                self.public_exponent
            )));
        }
        if self.miller_rabin_rounds == 0 {
            return Err(Error::InvalidConfig("miller_rabin_rounds must be non-zero".to_string()));
        }
        if self.max_prime_candidates == 0 || self.max_pair_attempts == 0 {
            return Err(Error::InvalidConfig("iteration bounds must be non-zero".to_string()));
        }
        Ok(())
    }
}

fn next_prime(rng: &mut ThreadRng, bits: u64, config: &KeyGenConfig) -> Result<RsaBigInt> {
    let (prime, attempts) = search_prime(
        rng,
        bits,
        config.miller_rabin_rounds,
        config.max_prime_candidates,
    )
    .ok_or(Error::PrimalityLoopExceeded {
        attempts: config.max_prime_candidates,
    })?;

    trace!(attempts, "prime found");
    Ok(prime)
}

/// Generate an RSA key pair with default settings (two 1024-bit primes, e=65537)
pub fn generate_keypair() -> Result<RsaKeyPair> {
    generate_keypair_with(&KeyGenConfig::default())
}

/// Generate an RSA key pair with the given settings.
///
/// Whenever e has no inverse mod φ(N), or p == q, both primes are thrown
/// away and a fresh pair is drawn.
pub fn generate_keypair_with(config: &KeyGenConfig) -> Result<RsaKeyPair> {
    config.validate()?;

    let mut rng = thread_rng();
    let e = from_u64(config.public_exponent);
    let bits = u64::from(config.prime_bits);

    for pair_attempt in 1..=config.max_pair_attempts {
        // Step 1: Generate two random primes p and q
        let p = next_prime(&mut rng, bits, config)?;
        let q = next_prime(&mut rng, bits, config)?;

        if p == q {
            debug!(pair_attempt, "p == q, regenerating both primes");
            continue;
        }

        // Step 2: Compute n = p * q and φ(n) = (p-1)(q-1)
        let n = &p * &q;
        let phi_n = (&p - 1u8) * (&q - 1u8);

        // Step 3: Compute d = e^(-1) mod φ(n)
        let Some(d) = mod_inverse(&e, &phi_n) else {
            debug!(pair_attempt, "e not invertible mod phi(n), regenerating both primes");
            continue;
        };

        info!(bits = n.bits(), pair_attempt, "generated RSA key pair");

        let public_key = RsaPublicKey {
            n: n.clone(),
            e: e.clone(),
        };
        let private_key = RsaPrivateKey { n, d };

        return Ok(RsaKeyPair {
            public_key,
            private_key,
            p,
            q,
        });
    }

    Err(Error::PrimalityLoopExceeded {
        attempts: config.max_pair_attempts,
    })
}
