//! Diffie-Hellman over a fixed safe-prime group: safe-prime group
//! parameters, a private scalar in `[2, p-2]`, a public key `g^x mod p`,
//! and a shared secret `g^{xy} mod p`.
//!
//! Rather than generating a fresh safe prime per call (expensive, and
//! DH's whole point is that the group is public and reusable),
//! [`Group::MODP_2048`] is the IKE/RFC 3526 "Group 14" 2048-bit MODP
//! group, the same way libtomcrypt ships a table of named DH groups in
//! `dh_sets.c` rather than generating one at runtime.

use crate::{
    error::{Error, Result},
    math::{BigUint, Int, MathOps},
    random::Prng,
};
use num_traits::One;

/// A DH group: a safe prime `p = 2q + 1` and a generator `g`.
pub struct Group {
    pub p: &'static str,
    pub g: u32,
}

fn parse(hex: &'static str) -> Int {
    Int::parse_bytes(hex.as_bytes(), 16).expect("DH group constants are valid hex")
}

impl Group {
    pub fn p(&self) -> Int {
        parse(self.p)
    }

    pub fn g(&self) -> Int {
        Int::from(self.g)
    }
}

/// RFC 3526 §3, "2048-bit MODP Group" (IKE Group 14).
pub static MODP_2048: Group = Group {
    p: "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E0\
        88A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A43\
        1B302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C4\
        2E9A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B\
        1FE649286651ECE45B3DC2007CB8A163BF0598DA48361C55D39A691\
        63FA8FD24CF5F83655D23DCA3AD961C62F356208552BB9ED529077\
        096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3\
        BE39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BC\
        BF6955817183995497CEA956AE515D2261898FA051015728E5A8AA\
        CAA68FFFFFFFFFFFFFFFF",
    g: 2,
};

#[derive(Clone)]
pub struct PrivateKey {
    pub x: Int,
}

#[derive(Clone)]
pub struct PublicKey {
    pub y: Int,
}

/// Generate a key pair under `group`: `x` uniform in `[2, p-2]`,
/// `y = g^x mod p`.
pub fn make_key(group: &Group, rng: &mut dyn Prng) -> Result<(PrivateKey, PublicKey)> {
    let p = group.p();
    let upper = &p - Int::from(2u32);
    let byte_len = p.bits().div_ceil(8) as usize;
    let x = loop {
        let mut buf = vec![0u8; byte_len];
        if rng.read(&mut buf) != byte_len {
            return Err(Error::ErrorReadPrng("dh keygen: prng underrun"));
        }
        let candidate = Int::from_bytes_be(&buf) % &upper + Int::from(2u32);
        if candidate >= Int::from(2u32) && candidate <= upper {
            break candidate;
        }
    };
    let y = BigUint::exptmod(&group.g(), &x, &p);
    Ok((PrivateKey { x }, PublicKey { y }))
}

/// Shared secret `y_remote^x_local mod p` (spec "shared secret `g^{xy} mod
/// p`").
pub fn shared_secret(group: &Group, private: &PrivateKey, public: &PublicKey) -> Result<Vec<u8>> {
    let p = group.p();
    if public.y <= Int::one() || public.y >= &p - Int::one() {
        return Err(Error::PkInvalidType);
    }
    let shared = BigUint::exptmod(&public.y, &private.x, &p);
    Ok(shared.to_bytes_be())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::random::Fortuna;

    fn seeded_prng() -> Fortuna {
        let mut p = Fortuna::new();
        p.add_entropy(&[0x33u8; 256]).unwrap();
        p.ready().unwrap();
        p
    }

    #[test]
    fn shared_secrets_agree() {
        let mut rng = seeded_prng();
        let (priv_a, pub_a) = make_key(&MODP_2048, &mut rng).unwrap();
        let (priv_b, pub_b) = make_key(&MODP_2048, &mut rng).unwrap();
        let secret_a = shared_secret(&MODP_2048, &priv_a, &pub_b).unwrap();
        let secret_b = shared_secret(&MODP_2048, &priv_b, &pub_a).unwrap();
        assert_eq!(secret_a, secret_b);
    }

    #[test]
    fn degenerate_public_key_rejected() {
        let mut rng = seeded_prng();
        let (priv_a, _) = make_key(&MODP_2048, &mut rng).unwrap();
        let degenerate = PublicKey { y: Int::one() };
        assert!(shared_secret(&MODP_2048, &priv_a, &degenerate).is_err());
    }
}
