// Primality Testing
// Trial division by small primes followed by Miller-Rabin

use num_bigint::RandBigInt;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use once_cell::sync::Lazy;
use rand::{thread_rng, Rng};

use super::bigint::{from_u64, mod_pow, random_odd_candidate, RsaBigInt};

/// Trial division uses every prime below this bound
pub const SMALL_PRIME_BOUND: usize = 1000;

/// Rounds of Miller-Rabin; false positive probability <= 4^-40
pub const DEFAULT_MILLER_RABIN_ROUNDS: u32 = 40;

static SMALL_PRIMES: Lazy<Vec<u32>> = Lazy::new(|| sieve(SMALL_PRIME_BOUND));

/// Sieve of Eratosthenes, primes strictly below `bound`
fn sieve(bound: usize) -> Vec<u32> {
    let mut composite = vec![false; bound];
    let mut primes = Vec::new();

    for i in 2..bound {
        if composite[i] {
            continue;
        }
        primes.push(i as u32);
        for multiple in (i * i..bound).step_by(i) {
            composite[multiple] = true;
        }
    }

    primes
}

/// All primes below [`SMALL_PRIME_BOUND`], computed once per process
pub fn small_primes() -> &'static [u32] {
    &SMALL_PRIMES
}

/// First stage: reject anything with a factor below [`SMALL_PRIME_BOUND`].
///
/// A small prime is accepted as itself rather than rejected as its own divisor.
pub fn passes_trial_division(candidate: &RsaBigInt) -> bool {
    if let Some(small) = candidate.to_u32() {
        if small < 2 {
            return false;
        }
        if (small as usize) < SMALL_PRIME_BOUND {
            return small_primes().binary_search(&small).is_ok();
        }
    }

    small_primes()
        .iter()
        .all(|&p| !(candidate % p).is_zero())
}

/// Second stage: Miller-Rabin with `rounds` random bases.
///
/// Stops at the first base that witnesses compositeness. Candidates below 5
/// and even candidates are answered without drawing any bases.
pub fn miller_rabin(candidate: &RsaBigInt, rounds: u32) -> bool {
    if let Some(small) = candidate.to_u32() {
        if small < 5 {
            return small == 2 || small == 3;
        }
    }
    if candidate.is_even() {
        return false;
    }

    let one = RsaBigInt::one();
    let two = from_u64(2);
    let n_minus_one = candidate - &one;

    // Write n-1 as d * 2^r with d odd
    let r = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> r;

    let mut rng = thread_rng();

    'witness: for _ in 0..rounds {
        // Uniform base in [2, n-2]
        let a = rng.gen_biguint_range(&two, &n_minus_one);

        let mut x = mod_pow(&a, &d, candidate);
        if x == one || x == n_minus_one {
            continue;
        }

        for _ in 1..r {
            x = mod_pow(&x, &two, candidate);
            if x == n_minus_one {
                continue 'witness;
            }
        }

        return false;
    }

    true
}

/// Decide whether `candidate` is (probably) prime using the default round count
pub fn is_probably_prime(candidate: &RsaBigInt) -> bool {
    is_probably_prime_with_rounds(candidate, DEFAULT_MILLER_RABIN_ROUNDS)
}

/// Trial division, then Miller-Rabin only if the candidate survived
pub fn is_probably_prime_with_rounds(candidate: &RsaBigInt, rounds: u32) -> bool {
    if !passes_trial_division(candidate) {
        return false;
    }

    // Everything below the bound was settled by trial division
    if candidate.to_u32().map_or(false, |small| (small as usize) < SMALL_PRIME_BOUND) {
        return true;
    }

    miller_rabin(candidate, rounds)
}

/// Sample odd candidates until one is accepted, bounded by `max_candidates`.
///
/// Returns the prime and the number of candidates drawn, or `None` if the
/// bound ran out first.
pub(crate) fn search_prime<R: Rng + ?Sized>(
    rng: &mut R,
    bits: u64,
    rounds: u32,
    max_candidates: u64,
) -> Option<(RsaBigInt, u64)> {
    for attempt in 1..=max_candidates {
        let candidate = random_odd_candidate(rng, bits);
        if is_probably_prime_with_rounds(&candidate, rounds) {
            return Some((candidate, attempt));
        }
    }
    None
}
