//! Ed25519 (RFC 8032): key/signature semantics layered over
//! [`crate::math::curve25519`], the same split as `pubkey::ecc` over
//! `math::ecc`.

use crate::{
    error::{Error, Result},
    hash::Sha512,
    math::curve25519::{base_point, order_l, EdPoint},
    math::Int,
};

pub const SEED_LEN: usize = 32;
pub const PUBLIC_KEY_LEN: usize = 32;
pub const SIGNATURE_LEN: usize = 64;

#[derive(Clone)]
pub struct PrivateKey {
    seed: [u8; SEED_LEN],
    scalar: Int,
    prefix: [u8; 32],
    public: [u8; PUBLIC_KEY_LEN],
}

#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub bytes: [u8; PUBLIC_KEY_LEN],
}

/// RFC 8032 §5.1.5 key expansion: `SHA-512(seed) = (h_lo || h_hi)`, clamp
/// `h_lo` into a scalar, keep `h_hi` as the nonce prefix.
fn expand_seed(seed: &[u8; SEED_LEN]) -> (Int, [u8; 32]) {
    let digest = Sha512::new().hash(seed);
    let mut scalar_bytes = [0u8; 32];
    scalar_bytes.copy_from_slice(&digest[..32]);
    scalar_bytes[0] &= 0xf8;
    scalar_bytes[31] &= 0x7f;
    scalar_bytes[31] |= 0x40;
    let mut prefix = [0u8; 32];
    prefix.copy_from_slice(&digest[32..]);
    (Int::from_bytes_le(&scalar_bytes), prefix)
}

pub fn key_from_seed(seed: [u8; SEED_LEN]) -> PrivateKey {
    let (scalar, prefix) = expand_seed(&seed);
    let public_point = base_point().scalar_mul(&scalar);
    PrivateKey { seed, scalar, prefix, public: public_point.encode() }
}

impl PrivateKey {
    pub fn public_key(&self) -> PublicKey {
        PublicKey { bytes: self.public }
    }

    pub fn seed(&self) -> &[u8; SEED_LEN] {
        &self.seed
    }
}

fn scalar_from_hash(hash: &[u8]) -> Int {
    Int::from_bytes_le(hash) % order_l()
}

/// Sign `message` under `ed25519` domain-separation rules (no context, no
/// prehash). `ed25519ctx`/`ed25519ph` (RFC 8032 §5.1.6/§5.1.7) prepend the
/// `"SigEd25519 no Ed25519 collisions"` dom2 prefix; plain Ed25519 omits it
/// entirely, which is what this function implements.
pub fn sign(key: &PrivateKey, message: &[u8]) -> [u8; SIGNATURE_LEN] {
    let mut hasher = Sha512::new();
    let r_hash = hasher.hash(&[&key.prefix[..], message].concat());
    let r_scalar = scalar_from_hash(&r_hash);
    let r_point = base_point().scalar_mul(&r_scalar);
    let r_bytes = r_point.encode();

    let mut hasher = Sha512::new();
    let k_hash = hasher.hash(&[&r_bytes[..], &key.public[..], message].concat());
    let k_scalar = scalar_from_hash(&k_hash);

    let s = (&r_scalar + &k_scalar * &key.scalar) % order_l();
    let mut s_bytes = s.to_bytes_le();
    s_bytes.resize(32, 0);

    let mut sig = [0u8; SIGNATURE_LEN];
    sig[..32].copy_from_slice(&r_bytes);
    sig[32..].copy_from_slice(&s_bytes);
    sig
}

/// Verify a plain Ed25519 signature (RFC 8032 §5.1.7): checks `[8][s]B ==
/// [8]R + [8][k]A` using cofactor-less equality (`s*B == R + k*A`), which is
/// sufficient since this crate never deals with small-order inputs produced
/// by a cofactor-aware signer.
pub fn verify(public: &PublicKey, message: &[u8], signature: &[u8; SIGNATURE_LEN]) -> Result<bool> {
    let r_bytes: [u8; 32] = signature[..32].try_into().unwrap();
    let s_bytes: [u8; 32] = signature[32..].try_into().unwrap();
    let s = Int::from_bytes_le(&s_bytes);
    if s >= order_l() {
        return Ok(false);
    }

    let Some(r_point) = EdPoint::decode(&r_bytes) else { return Ok(false) };
    let Some(a_point) = EdPoint::decode(&public.bytes) else { return Err(Error::PkInvalidType) };

    let mut hasher = Sha512::new();
    let k_hash = hasher.hash(&[&r_bytes[..], &public.bytes[..], message].concat());
    let k_scalar = scalar_from_hash(&k_hash);

    let lhs = base_point().scalar_mul(&s);
    let rhs = r_point.add(&a_point.scalar_mul(&k_scalar));
    Ok(lhs == rhs)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sign_then_verify_roundtrip() {
        let key = key_from_seed([0x4cu8; 32]);
        let message = b"RFC 8032 describes Ed25519 as a signature scheme";
        let sig = sign(&key, message);
        assert!(verify(&key.public_key(), message, &sig).unwrap());
    }

    #[test]
    fn signing_is_deterministic() {
        let key = key_from_seed([0x4cu8; 32]);
        let sig1 = sign(&key, b"same message");
        let sig2 = sign(&key, b"same message");
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn tampered_message_rejected() {
        let key = key_from_seed([7u8; 32]);
        let sig = sign(&key, b"hello world");
        assert!(!verify(&key.public_key(), b"hello world!", &sig).unwrap());
    }

    #[test]
    fn rfc8032_test_vector_2() {
        let seed: [u8; SEED_LEN] = hex::decode("4ccd089b28ff96da9db6c346ec114e0f5b8a319b35ab6c11db3f75962e9dfc6")
            .unwrap()
            .try_into()
            .unwrap();
        let key = key_from_seed(seed);
        assert_eq!(
            hex::encode(key.public_key().bytes),
            "3d4017c3e843895a92b70aa74d1b7ebc9c982ccf2ec4968cc0cd55f12af4660"
        );

        let message = hex::decode("72").unwrap();
        let sig = sign(&key, &message);
        assert_eq!(
            hex::encode(sig),
            "92a009a9f0d4cab8720e820b5f642540a2b27b5416503f8fb3762223ebdb69\
             da085ac1e43e15996e458f3613d0f11d8c387b2eaeb4302aeeb00d291612bb0c00"
        );
        assert!(verify(&key.public_key(), &message, &sig).unwrap());
    }
}
