//! # Primality Oracle
//!
//! Probabilistic primality testing over the full `u64` range.
//!
//! `is_probably_prime` runs `confidence` rounds of Miller-Rabin with witnesses
//! drawn independently on every call, so a composite survives with probability
//! at most `4^-confidence`. Primes are never rejected. Products are taken in
//! `u128`, so no intermediate value can overflow regardless of `n`.

/// Primes used for cheap trial division before any Miller-Rabin round.
const SMALL_PRIMES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Answer "probably prime" (`true`) or "composite" (`false`) for `n`.
///
/// A `confidence` of zero is treated as one round.
pub fn is_probably_prime(n: u64, confidence: u32) -> bool {
    if n < 2 {
        return false;
    }

    for &p in &SMALL_PRIMES {
        if n == p {
            return true;
        }
        if n % p == 0 {
            return false;
        }
    }

    // n is odd and > 37 here, so n - 1 is even and 2..=n-2 is non-empty.
    let (d, s) = decompose(n - 1);
    (0..confidence.max(1)).all(|_| {
        let witness = fastrand::u64(2..=n - 2);
        passes_round(n, d, s, witness)
    })
}

/// Split `m` into `d * 2^s` with `d` odd.
fn decompose(m: u64) -> (u64, u32) {
    let s = m.trailing_zeros();
    (m >> s, s)
}

/// One Miller-Rabin round: `false` means `witness` proves `n` composite.
fn passes_round(n: u64, d: u64, s: u32, witness: u64) -> bool {
    let mut x = pow_mod(witness, d, n);
    if x == 1 || x == n - 1 {
        return true;
    }
    for _ in 1..s {
        x = mul_mod(x, x, n);
        if x == n - 1 {
            return true;
        }
        if x == 1 {
            return false;
        }
    }
    false
}

fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((u128::from(a) * u128::from(b)) % u128::from(m)) as u64
}

fn pow_mod(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut result = 1 % m;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    result
}
