//! Object identifier constants shared across the ASN.1/PKCS#8/SPKI layer.
//! Kept in one place so a reader can tell at a glance which arc sequence
//! maps to which algorithm name.

pub const RSA_ENCRYPTION: &[u32] = &[1, 2, 840, 113549, 1, 1, 1];
pub const DSA: &[u32] = &[1, 2, 840, 10040, 4, 1];
pub const EC_PUBLIC_KEY: &[u32] = &[1, 2, 840, 10045, 2, 1];
pub const X25519: &[u32] = &[1, 3, 101, 110];
pub const ED25519: &[u32] = &[1, 3, 101, 112];

pub const PRIME192V1: &[u32] = &[1, 2, 840, 10045, 3, 1, 1];
pub const SECP224R1: &[u32] = &[1, 3, 132, 0, 33];
pub const PRIME256V1: &[u32] = &[1, 2, 840, 10045, 3, 1, 7];
pub const SECP384R1: &[u32] = &[1, 3, 132, 0, 34];

pub const PBES2: &[u32] = &[1, 2, 840, 113549, 1, 5, 13];
pub const PBKDF2: &[u32] = &[1, 2, 840, 113549, 1, 5, 12];
pub const HMAC_SHA1: &[u32] = &[1, 2, 840, 113549, 2, 7];
pub const HMAC_SHA256: &[u32] = &[1, 2, 840, 113549, 2, 9];
pub const HMAC_SHA384: &[u32] = &[1, 2, 840, 113549, 2, 10];
pub const HMAC_SHA512: &[u32] = &[1, 2, 840, 113549, 2, 11];

pub const AES128_CBC: &[u32] = &[2, 16, 840, 1, 101, 3, 4, 1, 2];
pub const AES192_CBC: &[u32] = &[2, 16, 840, 1, 101, 3, 4, 1, 22];
pub const AES256_CBC: &[u32] = &[2, 16, 840, 1, 101, 3, 4, 1, 42];
pub const DES_EDE3_CBC: &[u32] = &[1, 2, 840, 113549, 3, 7];

/// Curve name <-> OID, used by [`crate::asn1::spki`] to round-trip a
/// [`crate::pubkey::ecc::Curve`] through an `ECParameters` OID.
pub fn curve_by_oid(arcs: &[u32]) -> Option<&'static crate::pubkey::ecc::Curve> {
    use crate::pubkey::ecc::{P192, P224, P256, P384};
    if arcs == PRIME192V1 {
        Some(&P192)
    } else if arcs == SECP224R1 {
        Some(&P224)
    } else if arcs == PRIME256V1 {
        Some(&P256)
    } else if arcs == SECP384R1 {
        Some(&P384)
    } else {
        None
    }
}

pub fn oid_for_curve(curve: &'static crate::pubkey::ecc::Curve) -> Option<&'static [u32]> {
    match curve.name {
        "p192" => Some(PRIME192V1),
        "p224" => Some(SECP224R1),
        "p256" => Some(PRIME256V1),
        "p384" => Some(SECP384R1),
        _ => None,
    }
}
