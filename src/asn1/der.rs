//! X.690 DER encoder/decoder: strict, definite-length, shortest-form only.
//!
//! This is a low-level TLV (tag/length/value) layer, not a serde-style
//! derive: every supported ASN.1 type gets one `encode_*`/`decode_*` pair
//! that converts between a Rust value and its DER bytes, and [`Sequence`]
//! walks a list of already-encoded items the same way libtomcrypt's
//! `der_encode_sequence_multi` walks an array of `(type, data, size)`
//! triples. Unknown or application-specific structures go
//! through the recursive [`crate::asn1::flexi`] decoder instead.

use crate::error::{Error, Result};
use num_bigint::{BigInt, Sign};

pub const TAG_BOOLEAN: u8 = 0x01;
pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_BIT_STRING: u8 = 0x03;
pub const TAG_OCTET_STRING: u8 = 0x04;
pub const TAG_NULL: u8 = 0x05;
pub const TAG_OID: u8 = 0x06;
pub const TAG_UTF8_STRING: u8 = 0x0c;
pub const TAG_SEQUENCE: u8 = 0x30;
pub const TAG_SET: u8 = 0x31;
pub const TAG_PRINTABLE_STRING: u8 = 0x13;
pub const TAG_IA5_STRING: u8 = 0x16;
pub const TAG_UTC_TIME: u8 = 0x17;
pub const TAG_GENERALIZED_TIME: u8 = 0x18;

/// Encode a DER length per X.690 §8.1.3: short form for `< 0x80`, otherwise
/// the shortest possible long form. DER forbids the indefinite-length form
/// entirely, so there is no encoding path that could emit it.
fn encode_len(n: usize) -> Vec<u8> {
    if n < 0x80 {
        return vec![n as u8];
    }
    let bytes = n.to_be_bytes();
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    let body = &bytes[first_nonzero..];
    let mut out = Vec::with_capacity(1 + body.len());
    out.push(0x80 | body.len() as u8);
    out.extend_from_slice(body);
    out
}

/// Decode a DER length, rejecting the indefinite form (`0x80`) and any
/// non-minimal long-form encoding. Returns `(length, bytes consumed)`.
fn decode_len(data: &[u8]) -> Result<(usize, usize)> {
    let first = *data.first().ok_or(Error::PkAsn1Error("truncated length"))?;
    if first < 0x80 {
        return Ok((first as usize, 1));
    }
    let nbytes = (first & 0x7f) as usize;
    if nbytes == 0 {
        return Err(Error::PkAsn1Error("indefinite length not allowed in DER"));
    }
    if nbytes > 8 {
        return Err(Error::Overflow);
    }
    let body = data.get(1..1 + nbytes).ok_or(Error::PkAsn1Error("truncated length"))?;
    if body[0] == 0 {
        return Err(Error::PkAsn1Error("non-minimal DER length encoding"));
    }
    let mut n: usize = 0;
    for &b in body {
        n = n.checked_shl(8).ok_or(Error::Overflow)?;
        n |= b as usize;
    }
    if n < 0x80 {
        return Err(Error::PkAsn1Error("long-form length used where short form suffices"));
    }
    Ok((n, 1 + nbytes))
}

/// Wrap `content` in a tag/length header.
pub fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let len = encode_len(content.len());
    let mut out = Vec::with_capacity(1 + len.len() + content.len());
    out.push(tag);
    out.extend_from_slice(&len);
    out.extend_from_slice(content);
    out
}

/// Split the next complete TLV element off the front of `data`, returning
/// `(tag, content, total bytes consumed)`. Used by every `decode_*` below
/// and by the flexi-decoder.
pub fn parse_tlv(data: &[u8]) -> Result<(u8, &[u8], usize)> {
    let tag = *data.first().ok_or(Error::PkAsn1Error("truncated tag"))?;
    let (len, len_size) = decode_len(&data[1..])?;
    let header = 1 + len_size;
    let content = data.get(header..header + len).ok_or(Error::PkAsn1Error("truncated content"))?;
    Ok((tag, content, header + len))
}

pub fn encode_boolean(b: bool) -> Vec<u8> {
    tlv(TAG_BOOLEAN, &[if b { 0xff } else { 0x00 }])
}

pub fn decode_boolean(data: &[u8]) -> Result<(bool, usize)> {
    let (tag, content, consumed) = parse_tlv(data)?;
    if tag != TAG_BOOLEAN || content.len() != 1 {
        return Err(Error::PkAsn1Error("expected BOOLEAN"));
    }
    Ok((content[0] != 0, consumed))
}

/// Encode an arbitrary-precision signed `INTEGER`. `BigInt`'s own
/// `to_signed_bytes_be` already produces the minimal two's-complement form
/// DER requires -- no superfluous leading `0x00`/`0xff` byte.
pub fn encode_integer(n: &BigInt) -> Vec<u8> {
    tlv(TAG_INTEGER, &n.to_signed_bytes_be())
}

pub fn decode_integer(data: &[u8]) -> Result<(BigInt, usize)> {
    let (tag, content, consumed) = parse_tlv(data)?;
    if tag != TAG_INTEGER {
        return Err(Error::PkAsn1Error("expected INTEGER"));
    }
    if content.is_empty() {
        return Err(Error::PkAsn1Error("empty INTEGER content"));
    }
    Ok((BigInt::from_signed_bytes_be(content), consumed))
}

/// Encode a non-negative `INTEGER` known ahead of time to fit in a `u64`
/// (version numbers, small exponents) -- spec's "SHORT_INTEGER" type.
pub fn encode_short_integer(n: u64) -> Vec<u8> {
    encode_integer(&BigInt::from(n))
}

pub fn decode_short_integer(data: &[u8]) -> Result<(u64, usize)> {
    let (n, consumed) = decode_integer(data)?;
    let (sign, digits) = n.to_u64_digits();
    if sign == Sign::Minus || digits.len() > 1 {
        return Err(Error::PkAsn1Error("SHORT_INTEGER out of range"));
    }
    Ok((digits.first().copied().unwrap_or(0), consumed))
}

/// Encode a non-negative `INTEGER` from big-endian magnitude bytes, the
/// shape RSA/DSA moduli and ECC coordinates actually arrive in.
pub fn encode_unsigned_integer(magnitude: &[u8]) -> Vec<u8> {
    let n = BigInt::from_bytes_be(Sign::Plus, magnitude);
    encode_integer(&n)
}

pub fn encode_bit_string(unused_bits: u8, bytes: &[u8]) -> Vec<u8> {
    let mut content = Vec::with_capacity(1 + bytes.len());
    content.push(unused_bits);
    content.extend_from_slice(bytes);
    tlv(TAG_BIT_STRING, &content)
}

/// Decode a `BIT STRING`, returning `(unused_bits, bytes, consumed)`.
pub fn decode_bit_string(data: &[u8]) -> Result<(u8, &[u8], usize)> {
    let (tag, content, consumed) = parse_tlv(data)?;
    if tag != TAG_BIT_STRING || content.is_empty() {
        return Err(Error::PkAsn1Error("expected BIT STRING"));
    }
    Ok((content[0], &content[1..], consumed))
}

pub fn encode_octet_string(bytes: &[u8]) -> Vec<u8> {
    tlv(TAG_OCTET_STRING, bytes)
}

pub fn decode_octet_string(data: &[u8]) -> Result<(&[u8], usize)> {
    let (tag, content, consumed) = parse_tlv(data)?;
    if tag != TAG_OCTET_STRING {
        return Err(Error::PkAsn1Error("expected OCTET STRING"));
    }
    Ok((content, consumed))
}

pub fn encode_null() -> Vec<u8> {
    tlv(TAG_NULL, &[])
}

pub fn decode_null(data: &[u8]) -> Result<usize> {
    let (tag, content, consumed) = parse_tlv(data)?;
    if tag != TAG_NULL || !content.is_empty() {
        return Err(Error::PkAsn1Error("expected NULL"));
    }
    Ok(consumed)
}

/// Encode an `OBJECT IDENTIFIER` from its arc sequence (spec's OID type).
/// The first two arcs pack into one byte as `40*arc1 + arc2` (X.690 §8.19);
/// every later arc is a base-128 varint with the continuation bit set on
/// every byte but the last.
pub fn encode_oid(arcs: &[u32]) -> Vec<u8> {
    assert!(arcs.len() >= 2, "an OID needs at least two arcs");
    let mut content = vec![(arcs[0] * 40 + arcs[1]) as u8];
    for &arc in &arcs[2..] {
        let mut chunk = Vec::new();
        let mut v = arc;
        chunk.push((v & 0x7f) as u8);
        v >>= 7;
        while v > 0 {
            chunk.push((v & 0x7f) as u8 | 0x80);
            v >>= 7;
        }
        chunk.reverse();
        content.extend_from_slice(&chunk);
    }
    tlv(TAG_OID, &content)
}

pub fn decode_oid(data: &[u8]) -> Result<(Vec<u32>, usize)> {
    let (tag, content, consumed) = parse_tlv(data)?;
    if tag != TAG_OID || content.is_empty() {
        return Err(Error::PkAsn1Error("expected OBJECT IDENTIFIER"));
    }
    let mut arcs = vec![(content[0] / 40) as u32, (content[0] % 40) as u32];
    let mut v: u32 = 0;
    for &b in &content[1..] {
        v = (v << 7) | (b & 0x7f) as u32;
        if b & 0x80 == 0 {
            arcs.push(v);
            v = 0;
        }
    }
    Ok((arcs, consumed))
}

fn encode_string(tag: u8, s: &str) -> Vec<u8> {
    tlv(tag, s.as_bytes())
}

fn decode_string<'a>(tag: u8, data: &'a [u8], what: &'static str) -> Result<(&'a str, usize)> {
    let (got_tag, content, consumed) = parse_tlv(data)?;
    if got_tag != tag {
        return Err(Error::PkAsn1Error(what));
    }
    let s = std::str::from_utf8(content).map_err(|_| Error::PkAsn1Error("invalid string encoding"))?;
    Ok((s, consumed))
}

pub fn encode_utf8_string(s: &str) -> Vec<u8> {
    encode_string(TAG_UTF8_STRING, s)
}
pub fn decode_utf8_string(data: &[u8]) -> Result<(&str, usize)> {
    decode_string(TAG_UTF8_STRING, data, "expected UTF8String")
}

pub fn encode_printable_string(s: &str) -> Vec<u8> {
    encode_string(TAG_PRINTABLE_STRING, s)
}
pub fn decode_printable_string(data: &[u8]) -> Result<(&str, usize)> {
    decode_string(TAG_PRINTABLE_STRING, data, "expected PrintableString")
}

pub fn encode_ia5_string(s: &str) -> Vec<u8> {
    encode_string(TAG_IA5_STRING, s)
}
pub fn decode_ia5_string(data: &[u8]) -> Result<(&str, usize)> {
    decode_string(TAG_IA5_STRING, data, "expected IA5String")
}

/// UTCTime is stored and returned as its raw `YYMMDDHHMMSSZ` form (spec
/// does not ask for a calendar type, only round-tripping).
pub fn encode_utc_time(s: &str) -> Vec<u8> {
    encode_string(TAG_UTC_TIME, s)
}
pub fn decode_utc_time(data: &[u8]) -> Result<(&str, usize)> {
    decode_string(TAG_UTC_TIME, data, "expected UTCTime")
}

pub fn encode_generalized_time(s: &str) -> Vec<u8> {
    encode_string(TAG_GENERALIZED_TIME, s)
}
pub fn decode_generalized_time(data: &[u8]) -> Result<(&str, usize)> {
    decode_string(TAG_GENERALIZED_TIME, data, "expected GeneralizedTime")
}

/// Build a `SEQUENCE` from a list of already-DER-encoded items.
pub fn sequence(items: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = items.iter().flatten().copied().collect();
    tlv(TAG_SEQUENCE, &body)
}

pub fn set(items: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = items.iter().flatten().copied().collect();
    tlv(TAG_SET, &body)
}

/// `SET OF`: DER requires elements sorted by their encoded bytes
/// (X.690 §11.6); callers that build a `SET OF` from unordered items should
/// sort before calling [`set`] -- this helper does that sort for them.
pub fn set_of(mut items: Vec<Vec<u8>>) -> Vec<u8> {
    items.sort();
    set(&items)
}

/// Unwrap a `SEQUENCE`'s content bytes (for further element-by-element
/// decoding by the caller), checking the tag and total length.
pub fn decode_sequence(data: &[u8]) -> Result<(&[u8], usize)> {
    let (tag, content, consumed) = parse_tlv(data)?;
    if tag != TAG_SEQUENCE {
        return Err(Error::PkAsn1Error("expected SEQUENCE"));
    }
    Ok((content, consumed))
}

pub fn decode_set(data: &[u8]) -> Result<(&[u8], usize)> {
    let (tag, content, consumed) = parse_tlv(data)?;
    if tag != TAG_SET {
        return Err(Error::PkAsn1Error("expected SET"));
    }
    Ok((content, consumed))
}

/// Wrap `inner` in an explicit, constructed context-specific tag `[n]`
/// (SEC1's `[0] curveOID`/`[1] publicKey`, PKCS#8's optional `attributes`).
pub fn explicit(n: u8, inner: &[u8]) -> Vec<u8> {
    tlv(0xa0 | (n & 0x1f), inner)
}

/// Decode an explicit context tag `[n]`, returning its inner content bytes.
pub fn decode_explicit(n: u8, data: &[u8]) -> Result<(&[u8], usize)> {
    let (tag, content, consumed) = parse_tlv(data)?;
    if tag != (0xa0 | (n & 0x1f)) {
        return Err(Error::PkAsn1Error("expected explicit context tag"));
    }
    Ok((content, consumed))
}

/// `CHOICE`: try each decoder in order and take the first that succeeds.
pub fn choice<T>(data: &[u8], alternatives: &[fn(&[u8]) -> Result<(T, usize)>]) -> Result<(T, usize)> {
    for f in alternatives {
        if let Ok(r) = f(data) {
            return Ok(r);
        }
    }
    Err(Error::PkAsn1Error("no CHOICE alternative matched"))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn length_roundtrip_short_and_long_form() {
        for n in [0usize, 1, 0x7f, 0x80, 0xff, 300, 70000] {
            let encoded = encode_len(n);
            let (decoded, consumed) = decode_len(&encoded).unwrap();
            assert_eq!(decoded, n);
            assert_eq!(consumed, encoded.len());
        }
    }

    #[test]
    fn integer_roundtrip_negative_zero_and_large() {
        for n in [
            BigInt::from(0),
            BigInt::from(-1),
            BigInt::from(127),
            BigInt::from(128),
            BigInt::from(-128),
            BigInt::from(-129),
            BigInt::from_bytes_be(Sign::Plus, &[0xffu8; 257]),
        ] {
            let encoded = encode_integer(&n);
            let (decoded, consumed) = decode_integer(&encoded).unwrap();
            assert_eq!(decoded, n);
            assert_eq!(consumed, encoded.len());
        }
    }

    #[test]
    fn oid_roundtrip() {
        // rsaEncryption: 1.2.840.113549.1.1.1
        let arcs = [1, 2, 840, 113549, 1, 1, 1];
        let encoded = encode_oid(&arcs);
        let (decoded, _) = decode_oid(&encoded).unwrap();
        assert_eq!(decoded, arcs);
    }

    #[test]
    fn bit_string_roundtrip() {
        let encoded = encode_bit_string(3, &[0b1010_0000]);
        let (unused, bytes, _) = decode_bit_string(&encoded).unwrap();
        assert_eq!(unused, 3);
        assert_eq!(bytes, &[0b1010_0000]);
    }

    #[test]
    fn sequence_of_integers_roundtrip() {
        let encoded = sequence(&[encode_short_integer(1), encode_short_integer(2)]);
        let (content, consumed) = decode_sequence(&encoded).unwrap();
        assert_eq!(consumed, encoded.len());
        let (a, n) = decode_short_integer(content).unwrap();
        let (b, _) = decode_short_integer(&content[n..]).unwrap();
        assert_eq!((a, b), (1, 2));
    }

    #[test]
    fn non_minimal_length_rejected() {
        // 0x81 0x01 encodes length 1 using long form where short form
        // suffices -- strict DER must reject this.
        assert!(decode_len(&[0x81, 0x01]).is_err());
    }

    #[test]
    fn indefinite_length_rejected() {
        assert!(decode_len(&[0x80]).is_err());
    }
}
