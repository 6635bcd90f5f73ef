// RSA Big Integer Operations
// Modular arithmetic shared by key generation, primality testing and the hybrid cipher

use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use rand::Rng;

/// RSA Big Integer type alias
pub type RsaBigInt = BigUint;

/// Create a big integer from u64
pub fn from_u64(n: u64) -> RsaBigInt {
    RsaBigInt::from(n)
}

/// Create a big integer from bytes (big-endian)
pub fn from_bytes(bytes: &[u8]) -> RsaBigInt {
    RsaBigInt::from_bytes_be(bytes)
}

/// Convert a big integer to exactly `N` bytes, most significant byte first.
///
/// Shorter values are left-padded with zeros. Returns `None` when the value
/// needs more than `N` bytes.
pub fn to_fixed_bytes<const N: usize>(n: &RsaBigInt) -> Option<[u8; N]> {
    let bytes = n.to_bytes_be();
    if bytes.len() > N {
        return None;
    }

    let mut out = [0u8; N];
    out[N - bytes.len()..].copy_from_slice(&bytes);
    Some(out)
}

/// Modular exponentiation: base^exp mod modulus
///
/// `modulus` must be non-zero.
pub fn mod_pow(base: &RsaBigInt, exp: &RsaBigInt, modulus: &RsaBigInt) -> RsaBigInt {
    if modulus.is_one() {
        return RsaBigInt::zero();
    }
    base.modpow(exp, modulus)
}

/// Compute modular inverse: a^(-1) mod n
///
/// Iterative extended Euclid over signed integers. Returns `None` if
/// gcd(a, n) != 1, otherwise the unique inverse in [0, n).
pub fn mod_inverse(a: &RsaBigInt, n: &RsaBigInt) -> Option<RsaBigInt> {
    if n.is_zero() {
        return None;
    }

    let n_signed = BigInt::from_biguint(Sign::Plus, n.clone());

    let mut t = BigInt::zero();
    let mut new_t = BigInt::one();
    let mut r = n_signed.clone();
    let mut new_r = BigInt::from_biguint(Sign::Plus, a.clone());

    while !new_r.is_zero() {
        let quotient = &r / &new_r;

        let next_t = &t - &quotient * &new_t;
        t = std::mem::replace(&mut new_t, next_t);

        let next_r = &r - &quotient * &new_r;
        r = std::mem::replace(&mut new_r, next_r);
    }

    if !r.is_one() {
        return None;
    }

    // t may be negative here; fold it into [0, n)
    let t = t.mod_floor(&n_signed);
    debug_assert!(!t.is_negative());
    t.to_biguint()
}

/// Greatest common divisor
pub fn gcd(a: &RsaBigInt, b: &RsaBigInt) -> RsaBigInt {
    a.gcd(b)
}

/// Sample a random odd integer of exactly `bits` bits.
///
/// The top two bits are set so the product of two candidates has exactly
/// `2 * bits` bits. `bits` must be at least 2.
pub fn random_odd_candidate<R: Rng + ?Sized>(rng: &mut R, bits: u64) -> RsaBigInt {
    let mut candidate = rng.gen_biguint(bits);
    candidate |= (RsaBigInt::from(3u8) << (bits - 2)) | RsaBigInt::one();
    candidate
}
