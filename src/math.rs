//! Arbitrary-precision integer arithmetic and the ECC point-arithmetic layer
//! built on top of it.
//!
//! libtomcrypt's math backend is pluggable: `ltm_desc`, `tfm_desc`, `gmp_desc`
//! all implement the same `ltc_math_descriptor` function-pointer table, and a
//! process installs exactly one of them before touching any public-key code.
//! This crate plays the same game with a trait,
//! [`MathOps`], and an installed implementation, [`BigUint`], backed by the
//! `num-bigint` crate. Everything above this module (RSA, DSA, DH, ECC)
//! programs against [`Int`], never against `num_bigint` directly, so a
//! different backend could be dropped in by re-implementing this one trait.
//!
//! Montgomery reduction is left to `num-bigint`'s own modpow, which already
//! picks an efficient algorithm per modulus; this crate does not hand-roll a
//! second Montgomery ladder on top of it -- that kind of backend-internal
//! accelerator belongs behind the descriptor, not in the public contract.

pub mod curve25519;
pub mod ecc;

use {
    num_bigint::{BigInt, BigUint as NumBigUint, RandBigInt, Sign},
    num_integer::Integer,
    num_traits::{One, Signed, Zero},
};

/// The big-integer handle every public-key subsystem is built on.
///
/// Corresponds to the opaque `void *` bignum handles of the C API: callers
/// never reach into the representation, only call the operations below.
/// Unlike the C API, cloning is `Clone`, not a separate `mp_copy` call --
/// the type system enforces that a copy is always explicit, instead of
/// leaving it to convention.
pub type Int = NumBigUint;

/// Operations every math backend must provide.
/// `BigUint` (this module) is the only implementation; the
/// trait exists so call sites read against the descriptor contract rather
/// than against `num_bigint` specifically.
pub trait MathOps {
    fn add(a: &Int, b: &Int) -> Int;
    fn sub(a: &Int, b: &Int) -> Option<Int>;
    fn mul(a: &Int, b: &Int) -> Int;
    fn sqr(a: &Int) -> Int {
        Self::mul(a, a)
    }
    fn div(a: &Int, b: &Int) -> Option<(Int, Int)>;
    fn addmod(a: &Int, b: &Int, m: &Int) -> Int;
    fn submod(a: &Int, b: &Int, m: &Int) -> Int;
    fn mulmod(a: &Int, b: &Int, m: &Int) -> Int;
    fn sqrmod(a: &Int, m: &Int) -> Int {
        Self::mulmod(a, a, m)
    }
    fn invmod(a: &Int, m: &Int) -> Option<Int>;
    fn exptmod(a: &Int, e: &Int, m: &Int) -> Int;
    fn gcd(a: &Int, b: &Int) -> Int;
    fn lcm(a: &Int, b: &Int) -> Int;
    fn is_prime(a: &Int, rounds: usize) -> bool;
}

/// The installed backend: `num-bigint`'s unsigned integer type.
///
/// There is exactly one implementation of [`MathOps`] compiled into the
/// crate, the same way a libtomcrypt build links against exactly one of
/// `ltm`/`tfm`/`gmp`.
pub struct BigUint;

impl MathOps for BigUint {
    fn add(a: &Int, b: &Int) -> Int {
        a + b
    }

    fn sub(a: &Int, b: &Int) -> Option<Int> {
        a.checked_sub(b)
    }

    fn mul(a: &Int, b: &Int) -> Int {
        a * b
    }

    fn div(a: &Int, b: &Int) -> Option<(Int, Int)> {
        if b.is_zero() {
            return None;
        }
        Some(a.div_rem(b))
    }

    fn addmod(a: &Int, b: &Int, m: &Int) -> Int {
        (a + b) % m
    }

    fn submod(a: &Int, b: &Int, m: &Int) -> Int {
        let a = BigInt::from(a.clone());
        let b = BigInt::from(b.clone());
        let m = BigInt::from(m.clone());
        let mut r = (a - b) % &m;
        if r.is_negative() {
            r += &m;
        }
        r.to_biguint().expect("reduced modulo a positive modulus")
    }

    fn mulmod(a: &Int, b: &Int, m: &Int) -> Int {
        (a * b) % m
    }

    fn invmod(a: &Int, m: &Int) -> Option<Int> {
        // Extended Euclidean algorithm over signed integers, then reduce the
        // result back into [0, m).
        let (mut old_r, mut r) = (BigInt::from(m.clone()), BigInt::from(a.clone()) % BigInt::from(m.clone()));
        let (mut old_s, mut s) = (BigInt::zero(), BigInt::one());
        while !r.is_zero() {
            let q = &old_r / &r;
            let tmp_r = &old_r - &q * &r;
            old_r = std::mem::replace(&mut r, tmp_r);
            let tmp_s = &old_s - &q * &s;
            old_s = std::mem::replace(&mut s, tmp_s);
        }
        if old_r != BigInt::one() {
            return None;
        }
        let m_signed = BigInt::from(m.clone());
        let mut inv = old_s % &m_signed;
        if inv.is_negative() {
            inv += &m_signed;
        }
        inv.to_biguint()
    }

    fn exptmod(a: &Int, e: &Int, m: &Int) -> Int {
        a.modpow(e, m)
    }

    fn gcd(a: &Int, b: &Int) -> Int {
        a.gcd(b)
    }

    fn lcm(a: &Int, b: &Int) -> Int {
        a.lcm(b)
    }

    fn is_prime(a: &Int, rounds: usize) -> bool {
        miller_rabin(a, rounds)
    }
}

/// Miller-Rabin primality test, used by RSA/DSA key generation and
/// safe-prime verification in DH.
///
/// `rounds` is the number of random bases tried; libtomcrypt defaults its
/// `rsa_make_key` path to enough rounds for a 2^-96 false-positive bound.
/// Deterministic for small `a` via trial division against a fixed set of
/// small primes first, which also makes the common case (an even or
/// small-factor candidate during key generation) cheap.
pub fn miller_rabin(n: &Int, rounds: usize) -> bool {
    let two = Int::from(2u32);
    if *n < two {
        return false;
    }
    if *n == two {
        return true;
    }
    if (n % &two).is_zero() {
        return false;
    }
    const SMALL_PRIMES: &[u32] = &[3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47];
    for &p in SMALL_PRIMES {
        let p = Int::from(p);
        if *n == p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    // n - 1 = d * 2^r with d odd.
    let n_minus_1 = n - Int::one();
    let mut d = n_minus_1.clone();
    let mut r = 0u32;
    while (&d % &two).is_zero() {
        d /= &two;
        r += 1;
    }

    let mut rng = rand::thread_rng();
    'witness: for _ in 0..rounds.max(1) {
        let a = rng.gen_biguint_range(&two, &(n - &two));
        let mut x = a.modpow(&d, n);
        if x == Int::one() || x == n_minus_1 {
            continue;
        }
        for _ in 0..r.saturating_sub(1) {
            x = x.modpow(&two, n);
            if x == n_minus_1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Generate a random prime of exactly `bits` bits (top and bottom bit set),
/// used by RSA/DSA key generation.
pub fn random_prime(bits: u64) -> Int {
    let mut rng = rand::thread_rng();
    loop {
        let mut candidate = rng.gen_biguint(bits);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(0, true);
        if miller_rabin(&candidate, 40) {
            return candidate;
        }
    }
}

use rand::Rng;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn invmod_matches_known_value() {
        // 3^-1 mod 11 = 4, since 3*4 = 12 = 1 mod 11.
        let inv = BigUint::invmod(&Int::from(3u32), &Int::from(11u32)).unwrap();
        assert_eq!(inv, Int::from(4u32));
    }

    #[test]
    fn exptmod_matches_known_value() {
        // 4^13 mod 497 = 445 (textbook RSA example).
        let r = BigUint::exptmod(&Int::from(4u32), &Int::from(13u32), &Int::from(497u32));
        assert_eq!(r, Int::from(445u32));
    }

    #[test]
    fn small_primes_classified_correctly() {
        assert!(miller_rabin(&Int::from(7919u32), 10));
        assert!(!miller_rabin(&Int::from(7920u32), 10));
        assert!(!miller_rabin(&Int::from(1u32), 10));
    }

    #[test]
    fn submod_never_negative() {
        let r = BigUint::submod(&Int::from(2u32), &Int::from(5u32), &Int::from(7u32));
        assert_eq!(r, Int::from(4u32));
    }
}
