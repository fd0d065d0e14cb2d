//! X25519 (RFC 7748), the Montgomery-form Diffie-Hellman function sharing
//! Curve25519's field with [`crate::pubkey::ed25519`].

use crate::{error::Result, math::curve25519::x25519_ladder, random::Prng};

pub const KEY_LEN: usize = 32;

/// RFC 7748 §5's defined base point, `u = 9`.
pub const BASE_POINT: [u8; KEY_LEN] = {
    let mut b = [0u8; KEY_LEN];
    b[0] = 9;
    b
};

#[derive(Clone)]
pub struct PrivateKey {
    pub bytes: [u8; KEY_LEN],
}

#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub bytes: [u8; KEY_LEN],
}

pub fn generate(rng: &mut dyn Prng) -> Result<(PrivateKey, PublicKey)> {
    let mut bytes = [0u8; KEY_LEN];
    rng.read(&mut bytes);
    let private = PrivateKey { bytes };
    let public = public_key(&private);
    Ok((private, public))
}

pub fn public_key(private: &PrivateKey) -> PublicKey {
    PublicKey { bytes: x25519_ladder(&private.bytes, &BASE_POINT) }
}

/// `x25519(private, public)`: the Diffie-Hellman function itself, used both
/// to derive a public key (`public = x25519(private, 9)`) and a shared
/// secret (`shared = x25519(private, peer_public)`).
pub fn diffie_hellman(private: &PrivateKey, public: &PublicKey) -> [u8; KEY_LEN] {
    x25519_ladder(&private.bytes, &public.bytes)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::random::Fortuna;

    fn seeded_prng() -> Fortuna {
        let mut p = Fortuna::new();
        p.add_entropy(&[0x5du8; 256]).unwrap();
        p.ready().unwrap();
        p
    }

    #[test]
    fn shared_secrets_agree() {
        let mut rng = seeded_prng();
        let (priv_a, pub_a) = generate(&mut rng).unwrap();
        let (priv_b, pub_b) = generate(&mut rng).unwrap();
        let secret_a = diffie_hellman(&priv_a, &pub_b);
        let secret_b = diffie_hellman(&priv_b, &pub_a);
        assert_eq!(secret_a, secret_b);
    }

    #[test]
    fn public_key_is_deterministic_function_of_private() {
        let private = PrivateKey { bytes: [0x11u8; 32] };
        assert_eq!(public_key(&private).bytes, public_key(&private).bytes);
    }

    #[test]
    fn distinct_private_keys_yield_distinct_public_keys() {
        let a = PrivateKey { bytes: [0x11u8; 32] };
        let b = PrivateKey { bytes: [0x22u8; 32] };
        assert_ne!(public_key(&a).bytes, public_key(&b).bytes);
    }

    #[test]
    fn rfc7748_test_vector_1() {
        let scalar: [u8; KEY_LEN] = hex::decode("a546e36bf0527c9d3b16154b82465edd62144c0ac1fc5a18506a2244ba449ac4")
            .unwrap()
            .try_into()
            .unwrap();
        let u: [u8; KEY_LEN] = hex::decode("e6db6867583030db3594c1a424b15f7c726624ec26b3353b10a903a6d0ab1c4c")
            .unwrap()
            .try_into()
            .unwrap();
        let result = diffie_hellman(&PrivateKey { bytes: scalar }, &PublicKey { bytes: u });
        assert_eq!(
            hex::encode(result),
            "c3da55379de9c6908e94ea4df28d084f32eccf03491c71f754b4075577a28552"
        );
    }
}
