//! DSA (FIPS 186-4): domain parameter generation, key generation, and
//! sign/verify.
//!
//! Unlike ECDSA (which inherits its curve's fixed order), DSA's domain
//! parameters `(p, q, g)` are generated or supplied per-group: `q` is an
//! `qbits`-bit prime, `p` is an `pbits`-bit prime with `q | (p - 1)`, and
//! `g` has order `q` in `(Z/pZ)^*`. [`Params::generate`] builds a fresh
//! group from scratch the way libtomcrypt's `dsa_make_params` drives
//! `rand_prime` twice under a shared modulus; most real deployments instead
//! verify a received `(p, q, g)` against FIPS 186-4 Appendix A.1 -- this
//! crate offers generation only, which subsumes verification by
//! construction.

use crate::{
    error::{Error, Result},
    math::{BigUint, Int, MathOps},
    random::Prng,
};
use num_traits::One;

pub struct Params {
    pub p: Int,
    pub q: Int,
    pub g: Int,
}

#[derive(Clone)]
pub struct PublicKey {
    pub y: Int,
}

#[derive(Clone)]
pub struct PrivateKey {
    pub x: Int,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub r: Int,
    pub s: Int,
}

impl Params {
    /// Generate fresh `(p, q, g)` domain parameters: a `qbits`-bit prime
    /// `q`, a `pbits`-bit prime `p = k*q + 1`, and a generator `g` of the
    /// order-`q` subgroup. Follows FIPS 186-4 §A.1.1.2's shape, simplified
    /// to "retry with fresh randomness" rather than the standard's
    /// seeded/counter-verifiable construction.
    pub fn generate(pbits: u64, qbits: u64, rng: &mut dyn Prng) -> Result<Self> {
        if pbits <= qbits {
            return Err(Error::InvalidPrimeSize);
        }
        let q = random_prime(qbits, rng)?;
        let p = loop {
            // p = k*q + 1 for a random k of the right size, retried until
            // both p is prime and has exactly pbits bits.
            let kbits = pbits - qbits;
            let k = random_odd(kbits, rng)?;
            let candidate = &k * &q + Int::one();
            if candidate.bits() == pbits && BigUint::is_prime(&candidate, 40) {
                break candidate;
            }
        };

        let e = (&p - Int::one()) / &q;
        let g = loop {
            let h = random_below(&p, rng)?;
            let g = BigUint::exptmod(&h, &e, &p);
            if g != Int::one() {
                break g;
            }
        };

        Ok(Params { p, q, g })
    }
}

fn random_below(bound: &Int, rng: &mut dyn Prng) -> Result<Int> {
    let byte_len = bound.bits().div_ceil(8) as usize;
    loop {
        let mut buf = vec![0u8; byte_len];
        if rng.read(&mut buf) != byte_len {
            return Err(Error::ErrorReadPrng("dsa: prng underrun"));
        }
        let v = Int::from_bytes_be(&buf) % bound;
        if v > Int::from(1u32) {
            return Ok(v);
        }
    }
}

fn random_odd(bits: u64, rng: &mut dyn Prng) -> Result<Int> {
    let byte_len = bits.div_ceil(8) as usize;
    let mut buf = vec![0u8; byte_len];
    if rng.read(&mut buf) != byte_len {
        return Err(Error::ErrorReadPrng("dsa: prng underrun"));
    }
    let mut v = Int::from_bytes_be(&buf);
    v.set_bit(bits - 1, true);
    v.set_bit(0, true);
    Ok(v)
}

fn random_prime(bits: u64, rng: &mut dyn Prng) -> Result<Int> {
    loop {
        let candidate = random_odd(bits, rng)?;
        if BigUint::is_prime(&candidate, 40) {
            return Ok(candidate);
        }
    }
}

/// Generate a DSA key pair under `params`: `x` uniform in `[1, q-1]`,
/// `y = g^x mod p`.
pub fn make_key(params: &Params, rng: &mut dyn Prng) -> Result<(PrivateKey, PublicKey)> {
    let x = random_below(&params.q, rng)?;
    let y = BigUint::exptmod(&params.g, &x, &params.p);
    Ok((PrivateKey { x }, PublicKey { y }))
}

/// Sign `digest` (truncated to `q`'s bit length if longer, per FIPS 186-4
/// §4.6): draw `k` in `[1, q-1]`, `r = (g^k mod p) mod q` (retry if 0),
/// `s = k^-1 * (h + x*r) mod q` (retry if 0).
pub fn sign(params: &Params, private: &PrivateKey, digest: &[u8], rng: &mut dyn Prng) -> Result<Signature> {
    let qbits = params.q.bits();
    let h = truncate_to_bits(digest, qbits) % &params.q;
    loop {
        let k = random_below(&params.q, rng)?;
        let r = BigUint::exptmod(&params.g, &k, &params.p) % &params.q;
        if r == Int::from(0u32) {
            continue;
        }
        let Some(k_inv) = BigUint::invmod(&k, &params.q) else { continue };
        let xr = BigUint::mulmod(&private.x, &r, &params.q);
        let h_plus_xr = BigUint::addmod(&h, &xr, &params.q);
        let s = BigUint::mulmod(&k_inv, &h_plus_xr, &params.q);
        if s == Int::from(0u32) {
            continue;
        }
        return Ok(Signature { r, s });
    }
}

pub fn verify(params: &Params, public: &PublicKey, digest: &[u8], sig: &Signature) -> Result<bool> {
    if sig.r <= Int::from(0u32) || sig.r >= params.q || sig.s <= Int::from(0u32) || sig.s >= params.q {
        return Ok(false);
    }
    let Some(w) = BigUint::invmod(&sig.s, &params.q) else { return Ok(false) };
    let h = truncate_to_bits(digest, params.q.bits()) % &params.q;
    let u1 = BigUint::mulmod(&h, &w, &params.q);
    let u2 = BigUint::mulmod(&sig.r, &w, &params.q);

    let v1 = BigUint::exptmod(&params.g, &u1, &params.p);
    let v2 = BigUint::exptmod(&public.y, &u2, &params.p);
    let v = BigUint::mulmod(&v1, &v2, &params.p) % &params.q;

    Ok(v == sig.r)
}

fn truncate_to_bits(digest: &[u8], bits: u64) -> Int {
    let n = Int::from_bytes_be(digest);
    let digest_bits = (digest.len() as u64) * 8;
    if digest_bits > bits {
        n >> (digest_bits - bits) as u32
    } else {
        n
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{hash::Sha256, random::Fortuna};

    fn seeded_prng() -> Fortuna {
        let mut p = Fortuna::new();
        p.add_entropy(&[0x71u8; 256]).unwrap();
        p.ready().unwrap();
        p
    }

    // Small group sizes keep these tests fast; real deployments use
    // (p=2048/3072-bit, q=224/256-bit) FIPS 186-4 groups.
    fn small_params(rng: &mut dyn Prng) -> Params {
        Params::generate(256, 64, rng).unwrap()
    }

    #[test]
    fn sign_then_verify() {
        let mut rng = seeded_prng();
        let params = small_params(&mut rng);
        let (private, public) = make_key(&params, &mut rng).unwrap();
        let digest = Sha256::new().hash(b"message");
        let sig = sign(&params, &private, &digest, &mut rng).unwrap();
        assert!(verify(&params, &public, &digest, &sig).unwrap());
    }

    #[test]
    fn tampered_digest_rejected() {
        let mut rng = seeded_prng();
        let params = small_params(&mut rng);
        let (private, public) = make_key(&params, &mut rng).unwrap();
        let digest = Sha256::new().hash(b"message");
        let sig = sign(&params, &private, &digest, &mut rng).unwrap();
        let other = Sha256::new().hash(b"different message");
        assert!(!verify(&params, &public, &other, &sig).unwrap());
    }

    #[test]
    fn out_of_range_signature_rejected() {
        let mut rng = seeded_prng();
        let params = small_params(&mut rng);
        let (_private, public) = make_key(&params, &mut rng).unwrap();
        let digest = Sha256::new().hash(b"message");
        let bogus = Signature { r: params.q.clone(), s: Int::from(1u32) };
        assert!(!verify(&params, &public, &digest, &bogus).unwrap());
    }
}
