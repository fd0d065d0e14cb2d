//! X.509 `SubjectPublicKeyInfo` (RFC 5280 §4.1) encoding/decoding for every
//! public-key algorithm this crate implements: RSA, DSA, ECC, Ed25519,
//! X25519.
//!
//! ```text
//! SubjectPublicKeyInfo ::= SEQUENCE {
//!     algorithm         AlgorithmIdentifier,
//!     subjectPublicKey  BIT STRING }
//! AlgorithmIdentifier ::= SEQUENCE {
//!     algorithm   OBJECT IDENTIFIER,
//!     parameters  ANY DEFINED BY algorithm OPTIONAL }
//! ```
//!
//! Each algorithm fills `parameters` and the bit-string payload differently
//! (RFC 3279 / RFC 5480 / RFC 8410); the per-algorithm `encode_*`/`decode_*`
//! pairs below hide that in the same way libtomcrypt's `x509_make_spki`-style
//! helpers do per key type.

use crate::{
    asn1::{der, flexi, oid},
    error::{Error, Result},
    pubkey::{dsa, ecc, ed25519, rsa, x25519},
};
use num_bigint::{BigInt, Sign};

/// A decoded but not yet algorithm-specific `AlgorithmIdentifier`.
pub struct AlgorithmIdentifier {
    pub oid: Vec<u32>,
    /// Raw DER bytes of `parameters`, if present.
    pub parameters: Option<Vec<u8>>,
}

fn encode_algorithm_identifier(alg_oid: &[u32], parameters: Option<&[u8]>) -> Vec<u8> {
    let mut items = vec![der::encode_oid(alg_oid)];
    if let Some(p) = parameters {
        items.push(p.to_vec());
    }
    der::sequence(&items)
}

fn encode_spki(alg_oid: &[u32], parameters: Option<&[u8]>, public_key: &[u8]) -> Vec<u8> {
    der::sequence(&[
        encode_algorithm_identifier(alg_oid, parameters),
        der::encode_bit_string(0, public_key),
    ])
}

/// Split a `SubjectPublicKeyInfo` into its `AlgorithmIdentifier` and the raw
/// `subjectPublicKey` bytes, using the flexi-decoder since `parameters`'
/// shape depends on which algorithm OID precedes it.
pub fn decode_spki(data: &[u8]) -> Result<(AlgorithmIdentifier, Vec<u8>)> {
    let node = flexi::decode(data)?;
    let children = node.as_children()?;
    if children.len() != 2 {
        return Err(Error::PkAsn1Error("SubjectPublicKeyInfo must have 2 fields"));
    }
    let alg_seq = children[0].as_children()?;
    if alg_seq.is_empty() {
        return Err(Error::PkAsn1Error("AlgorithmIdentifier missing OID"));
    }
    let (oid_arcs, _) = der::decode_oid(&der::encode_oid(&decode_oid_node(&alg_seq[0])?))?;
    let parameters = if alg_seq.len() > 1 { Some(reencode_node(&alg_seq[1])) } else { None };

    let (unused, bits, _) = der::decode_bit_string(&reencode_node(&children[1]))?;
    if unused != 0 {
        return Err(Error::PkAsn1Error("subjectPublicKey must be byte-aligned"));
    }
    Ok((AlgorithmIdentifier { oid: oid_arcs, parameters }, bits.to_vec()))
}

fn decode_oid_node(node: &flexi::Node) -> Result<Vec<u32>> {
    let (arcs, _) = der::decode_oid(&reencode_node(node))?;
    Ok(arcs)
}

/// The flexi-decoder discards the original TLV header bytes once parsed;
/// re-derive them so a node can be fed back through a typed `der::decode_*`
/// call. Primitive nodes only (OID, BIT STRING): good enough for SPKI's
/// two top-level field shapes.
fn reencode_node(node: &flexi::Node) -> Vec<u8> {
    match node {
        flexi::Node::Primitive { tag, content } => der::tlv(*tag, content),
        flexi::Node::Constructed { tag, children } => {
            let body: Vec<u8> = children.iter().flat_map(reencode_node).collect();
            der::tlv(*tag, &body)
        }
    }
}

pub fn encode_rsa(key: &rsa::PublicKey) -> Vec<u8> {
    let inner = der::sequence(&[
        der::encode_unsigned_integer(&key.n.to_bytes_be()),
        der::encode_unsigned_integer(&key.e.to_bytes_be()),
    ]);
    encode_spki(oid::RSA_ENCRYPTION, Some(&der::encode_null()), &inner)
}

pub fn decode_rsa(data: &[u8]) -> Result<rsa::PublicKey> {
    let (alg, key_bytes) = decode_spki(data)?;
    if alg.oid != oid::RSA_ENCRYPTION {
        return Err(Error::PkTypeMismatch);
    }
    let (content, _) = der::decode_sequence(&key_bytes)?;
    let (n, used) = der::decode_integer(content)?;
    let (e, _) = der::decode_integer(&content[used..])?;
    Ok(rsa::PublicKey { n: n.to_biguint().ok_or(Error::PkAsn1Error("negative RSA modulus"))?, e: e.to_biguint().ok_or(Error::PkAsn1Error("negative RSA exponent"))? })
}

pub fn encode_dsa(params: &dsa::Params, key: &dsa::PublicKey) -> Vec<u8> {
    let dsa_params = der::sequence(&[
        der::encode_unsigned_integer(&params.p.to_bytes_be()),
        der::encode_unsigned_integer(&params.q.to_bytes_be()),
        der::encode_unsigned_integer(&params.g.to_bytes_be()),
    ]);
    let y = BigInt::from_bytes_be(Sign::Plus, &key.y.to_bytes_be());
    encode_spki(oid::DSA, Some(&dsa_params), &der::encode_integer(&y))
}

pub fn decode_dsa(data: &[u8]) -> Result<(dsa::Params, dsa::PublicKey)> {
    let (alg, key_bytes) = decode_spki(data)?;
    if alg.oid != oid::DSA {
        return Err(Error::PkTypeMismatch);
    }
    let params_bytes = alg.parameters.ok_or(Error::PkAsn1Error("DSA key missing domain parameters"))?;
    let (content, _) = der::decode_sequence(&params_bytes)?;
    let (p, used1) = der::decode_integer(content)?;
    let (q, used2) = der::decode_integer(&content[used1..])?;
    let (g, _) = der::decode_integer(&content[used1 + used2..])?;
    let (y, _) = der::decode_integer(&key_bytes)?;
    let to_biguint = |n: BigInt| n.to_biguint().ok_or(Error::PkAsn1Error("negative DSA parameter"));
    Ok((
        dsa::Params { p: to_biguint(p)?, q: to_biguint(q)?, g: to_biguint(g)? },
        dsa::PublicKey { y: to_biguint(y)? },
    ))
}

pub fn encode_ecc(key: &ecc::PublicKey) -> Vec<u8> {
    let curve_oid = oid::oid_for_curve(key.curve).expect("known NIST curve");
    let mut point = vec![0x04u8];
    let mut x = key.x.to_bytes_be();
    let mut y = key.y.to_bytes_be();
    let field_len = key.curve.size;
    while x.len() < field_len {
        x.insert(0, 0);
    }
    while y.len() < field_len {
        y.insert(0, 0);
    }
    point.extend_from_slice(&x);
    point.extend_from_slice(&y);
    encode_spki(oid::EC_PUBLIC_KEY, Some(&der::encode_oid(curve_oid)), &point)
}

pub fn decode_ecc(data: &[u8]) -> Result<ecc::PublicKey> {
    let (alg, point) = decode_spki(data)?;
    if alg.oid != oid::EC_PUBLIC_KEY {
        return Err(Error::PkTypeMismatch);
    }
    let params = alg.parameters.ok_or(Error::PkAsn1Error("EC key missing curve OID"))?;
    let (curve_oid, _) = der::decode_oid(&params)?;
    let curve = oid::curve_by_oid(&curve_oid).ok_or(Error::PkAsn1Error("unsupported EC curve"))?;
    if point.first() != Some(&0x04) {
        return Err(Error::PkAsn1Error("only uncompressed EC points are supported"));
    }
    let field_len = curve.size;
    if point.len() != 1 + 2 * field_len {
        return Err(Error::PkAsn1Error("EC point has wrong length for curve"));
    }
    let x = crate::math::Int::from_bytes_be(&point[1..1 + field_len]);
    let y = crate::math::Int::from_bytes_be(&point[1 + field_len..]);
    Ok(ecc::PublicKey { curve, x, y })
}

pub fn encode_ed25519(key: &ed25519::PublicKey) -> Vec<u8> {
    encode_spki(oid::ED25519, None, &key.bytes)
}

pub fn decode_ed25519(data: &[u8]) -> Result<ed25519::PublicKey> {
    let (alg, bytes) = decode_spki(data)?;
    if alg.oid != oid::ED25519 || bytes.len() != ed25519::PUBLIC_KEY_LEN {
        return Err(Error::PkTypeMismatch);
    }
    let mut arr = [0u8; ed25519::PUBLIC_KEY_LEN];
    arr.copy_from_slice(&bytes);
    Ok(ed25519::PublicKey { bytes: arr })
}

pub fn encode_x25519(key: &x25519::PublicKey) -> Vec<u8> {
    encode_spki(oid::X25519, None, &key.bytes)
}

pub fn decode_x25519(data: &[u8]) -> Result<x25519::PublicKey> {
    let (alg, bytes) = decode_spki(data)?;
    if alg.oid != oid::X25519 || bytes.len() != x25519::KEY_LEN {
        return Err(Error::PkTypeMismatch);
    }
    let mut arr = [0u8; x25519::KEY_LEN];
    arr.copy_from_slice(&bytes);
    Ok(x25519::PublicKey { bytes: arr })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::random::Fortuna;

    fn seeded_prng() -> Fortuna {
        let mut p = Fortuna::new();
        p.add_entropy(&[0x22u8; 256]).unwrap();
        p.ready().unwrap();
        p
    }

    #[test]
    fn rsa_spki_roundtrip() {
        let mut rng = seeded_prng();
        let private = rsa::generate(512, rsa::DEFAULT_PUBLIC_EXPONENT, &mut rng).unwrap();
        let public = private.public();
        let encoded = encode_rsa(&public);
        let decoded = decode_rsa(&encoded).unwrap();
        assert_eq!(decoded.n, public.n);
        assert_eq!(decoded.e, public.e);
    }

    #[test]
    fn ecc_spki_roundtrip() {
        let mut rng = seeded_prng();
        let (_priv, public) = crate::pubkey::ecc::make_key(&crate::pubkey::ecc::P256, &mut rng).unwrap();
        let encoded = encode_ecc(&public);
        let decoded = decode_ecc(&encoded).unwrap();
        assert_eq!(decoded.x, public.x);
        assert_eq!(decoded.y, public.y);
    }

    #[test]
    fn ed25519_spki_roundtrip() {
        let key = ed25519::key_from_seed([9u8; 32]);
        let public = key.public_key();
        let encoded = encode_ed25519(&public);
        let decoded = decode_ed25519(&encoded).unwrap();
        assert!(decoded == public);
    }

    #[test]
    fn mismatched_algorithm_rejected() {
        let key = ed25519::key_from_seed([3u8; 32]);
        let encoded = encode_ed25519(&key.public_key());
        assert!(decode_x25519(&encoded).is_err());
    }
}
