//! ECC over NIST prime-field curves: key generation, Diffie-Hellman shared
//! secrets, and (in [`ecdsa`]) ECDSA signing/verification/recovery.
//!
//! This module only knows named curves and key semantics; the actual
//! point arithmetic (Jacobian coordinates, doubling, addition, scalar
//! multiplication) lives in [`crate::math::ecc`] and is shared with
//! nothing curve-specific baked in, the way libtomcrypt's `ltc_ecc_curve`
//! tables sit on top of a single generic point-arithmetic core.

pub mod ecdsa;

pub use ecdsa::{Ecdsa, EcdsaSignature};

use crate::{
    error::{Error, Result},
    math::{
        ecc::{self, JacobianPoint},
        BigUint, Int, MathOps,
    },
    random::Prng,
};
use num_traits::Zero;

/// Named curve parameters: the short-Weierstrass coefficients, base point,
/// and order of a NIST prime-field curve. Every NIST curve has
/// `a ≡ -3 (mod p)`, which `crate::math::ecc`'s doubling formula special-cases.
pub struct Curve {
    pub name: &'static str,
    pub p: &'static str,
    pub b: &'static str,
    pub gx: &'static str,
    pub gy: &'static str,
    pub n: &'static str,
    /// Field/order size in bytes, used to pad scalars and coordinates to a
    /// fixed width for wire encoding.
    pub size: usize,
}

fn parse(hex: &'static str) -> Int {
    Int::parse_bytes(hex.as_bytes(), 16).expect("curve constants are valid hex")
}

impl Curve {
    pub fn p(&self) -> Int {
        parse(self.p)
    }

    pub fn a(&self) -> Int {
        &self.p() - Int::from(3u32)
    }

    pub fn b(&self) -> Int {
        parse(self.b)
    }

    pub fn n(&self) -> Int {
        parse(self.n)
    }

    pub fn generator(&self) -> JacobianPoint {
        JacobianPoint::from_affine(parse(self.gx), parse(self.gy))
    }
}

/// NIST P-192 / secp192r1 (FIPS 186-4).
pub static P192: Curve = Curve {
    name: "p192",
    p: "fffffffffffffffffffffffffffffeffffffffffffffff",
    b: "64210519e59c80e70fa7e9ab72243049feb8deecc146b9b1",
    gx: "188da80eb03090f67cbf20eb43a18800f4ff0afd82ff1012",
    gy: "07192b95ffc8da78631011ed6b24cdd573f977a11e794811",
    n: "ffffffffffffffffffffffff99def836146bc9b1b4d22831",
    size: 24,
};

/// NIST P-224 / secp224r1 (FIPS 186-4).
pub static P224: Curve = Curve {
    name: "p224",
    p: "ffffffffffffffffffffffffffffffff000000000000000000000001",
    b: "b4050a850c04b3abf54132565044b0b7d7bfd8ba270b39432355ffb4",
    gx: "b70e0cbd6bb4bf7f321390b94a03c1d356c21122343280d6115c1d21",
    gy: "bd376388b5f723fb4c22dfe6cd4375a05a07476444d5819985007e34",
    n: "ffffffffffffffffffffffffffff16a2e0b8f03e13dd29455c5c2a3d",
    size: 28,
};

/// NIST P-256 / secp256r1 (FIPS 186-4).
pub static P256: Curve = Curve {
    name: "p256",
    p: "ffffffff00000001000000000000000000000000ffffffffffffffffffffff",
    b: "5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b",
    gx: "6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296",
    gy: "4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5",
    n: "ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551",
    size: 32,
};

/// NIST P-384 / secp384r1 (FIPS 186-4).
pub static P384: Curve = Curve {
    name: "p384",
    p: "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffeffffffff0000000000000000ffffffff",
    b: "b3312fa7e23ee7e4988e056be3f82d19181d9c6efe8141120314088f5013875ac656398d8a2ed19d2a85c8edd3ec2aef",
    gx: "aa87ca22be8b05378eb1c71ef320ad746e1d3b628ba79b9859f741e082542a385502f25dbf55296c3a545e3872760ab7",
    gy: "3617de4a96262c6f5d9e98bf9292dc29f8f41dbd289a147ce9da3113b5f0b8c00a60b1ce1d7e819d7a431d7c90ea0e5f",
    n: "ffffffffffffffffffffffffffffffffffffffffffffffffc7634d81f4372ddf581a0db248b0a77aecec196accc52973",
    size: 48,
};

/// A private scalar bound to a specific curve.
#[derive(Clone)]
pub struct PrivateKey {
    pub curve: &'static Curve,
    pub d: Int,
}

/// A public point bound to a specific curve.
#[derive(Clone)]
pub struct PublicKey {
    pub curve: &'static Curve,
    pub x: Int,
    pub y: Int,
}

impl PrivateKey {
    /// Derive the public key `d*G`.
    pub fn public(&self) -> PublicKey {
        let point = ecc::mul(&self.d, &self.curve.generator(), &self.curve.a(), true, &self.curve.p());
        let (x, y) = point.to_affine(&self.curve.p()).expect("a key generated via make_key is never the identity");
        PublicKey { curve: self.curve, x, y }
    }
}

/// Generate a key pair on `curve` using bytes drawn from `prng`. Retries on
/// the (astronomically unlikely) event that the drawn scalar is zero or
/// `>= n`.
pub fn make_key(curve: &'static Curve, prng: &mut dyn Prng) -> Result<(PrivateKey, PublicKey)> {
    let n = curve.n();
    let byte_len = curve.size;
    loop {
        let mut buf = vec![0u8; byte_len];
        if prng.read(&mut buf) != byte_len {
            return Err(Error::ErrorReadPrng("ecc_make_key: prng did not provide enough bytes"));
        }
        let d = Int::from_bytes_be(&buf);
        if d.is_zero() || d >= n {
            continue;
        }
        let private = PrivateKey { curve, d };
        let public = private.public();
        return Ok((private, public));
    }
}

/// Diffie-Hellman shared secret: the x-coordinate of `d_local * Q_remote`,
/// encoded big-endian and padded to the curve's field width.
pub fn shared_secret(private: &PrivateKey, public: &PublicKey) -> Result<Vec<u8>> {
    if private.curve.name != public.curve.name {
        return Err(Error::PkTypeMismatch);
    }
    let curve = private.curve;
    let point = JacobianPoint::from_affine(public.x.clone(), public.y.clone());
    let shared = ecc::mul(&private.d, &point, &curve.a(), true, &curve.p());
    let (x, _) = shared.to_affine(&curve.p()).ok_or(Error::PkInvalidType)?;

    let mut bytes = x.to_bytes_be();
    if bytes.len() < curve.size {
        let mut padded = vec![0u8; curve.size - bytes.len()];
        padded.extend_from_slice(&bytes);
        bytes = padded;
    }
    Ok(bytes)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::random::Fortuna;

    fn seeded_prng() -> Fortuna {
        let mut p = Fortuna::new();
        p.add_entropy(&[0x5au8; 256]).unwrap();
        p.ready().unwrap();
        p
    }

    #[test]
    fn make_key_public_point_is_on_curve() {
        let mut prng = seeded_prng();
        let (_priv, public) = make_key(&P256, &mut prng).unwrap();
        let p = P256.p();
        let lhs = BigUint::submod(&BigUint::mulmod(&public.y, &public.y, &p), &BigUint::mulmod(&public.x, &BigUint::mulmod(&public.x, &public.x, &p), &p), &p);
        let rhs = BigUint::addmod(&BigUint::mulmod(&P256.a(), &public.x, &p), &P256.b(), &p);
        assert_eq!(lhs, rhs, "y^2 - x^3 must equal a*x + b on the curve");
    }

    #[test]
    fn diffie_hellman_agrees() {
        let mut prng = seeded_prng();
        let (priv_a, pub_a) = make_key(&P256, &mut prng).unwrap();
        let (priv_b, pub_b) = make_key(&P256, &mut prng).unwrap();

        let secret_a = shared_secret(&priv_a, &pub_b).unwrap();
        let secret_b = shared_secret(&priv_b, &pub_a).unwrap();
        assert_eq!(secret_a, secret_b);
    }

    #[test]
    fn mismatched_curves_rejected() {
        let mut prng = seeded_prng();
        let (priv_a, _) = make_key(&P256, &mut prng).unwrap();
        let (_, pub_b) = make_key(&P384, &mut prng).unwrap();
        assert!(shared_secret(&priv_a, &pub_b).is_err());
    }
}
