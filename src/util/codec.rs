//! base16 and base32 codecs. base64 is handled by the
//! `base64` crate directly at the PEM layer (`asn1::pem`), the same way the
//! pack's `seal-crypto` pulls in `base64` rather than hand-rolling it; base16
//! is delegated to the `hex` crate for the same reason. base32 has no crate
//! already in the dependency graph, so it's implemented here directly,
//! following RFC 4648 §6.

use crate::error::{Error, Result};

const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Encode `data` as uppercase base16 (hex).
pub fn base16_encode(data: &[u8]) -> String {
    hex::encode_upper(data)
}

/// Decode a base16 (hex) string, case-insensitive.
pub fn base16_decode(s: &str) -> Result<Vec<u8>> {
    hex::decode(s).map_err(|_| Error::InvalidPacket("invalid base16"))
}

/// Encode `data` as base32 per RFC 4648, with `=` padding to a multiple of 8
/// output characters.
pub fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(5) * 8);
    for chunk in data.chunks(5) {
        let mut buf = [0u8; 5];
        buf[..chunk.len()].copy_from_slice(chunk);
        let n = u64::from_be_bytes([0, 0, 0, buf[0], buf[1], buf[2], buf[3], buf[4]]);
        let chars_for_len = match chunk.len() {
            1 => 2,
            2 => 4,
            3 => 5,
            4 => 7,
            5 => 8,
            _ => unreachable!(),
        };
        for i in 0..8 {
            if i < chars_for_len {
                let shift = 35 - 5 * i;
                let idx = ((n >> shift) & 0x1f) as usize;
                out.push(ALPHABET[idx] as char);
            } else {
                out.push('=');
            }
        }
    }
    out
}

/// Decode a base32 (RFC 4648) string, accepting either upper or lower case
/// and optional `=` padding.
pub fn base32_decode(s: &str) -> Result<Vec<u8>> {
    let s = s.trim_end_matches('=');
    let mut bits: u64 = 0;
    let mut nbits: u32 = 0;
    let mut out = Vec::with_capacity(s.len() * 5 / 8);
    for c in s.chars() {
        let c = c.to_ascii_uppercase() as u8;
        let val = ALPHABET
            .iter()
            .position(|&a| a == c)
            .ok_or(Error::InvalidPacket("invalid base32 character"))? as u64;
        bits = (bits << 5) | val;
        nbits += 5;
        if nbits >= 8 {
            nbits -= 8;
            out.push(((bits >> nbits) & 0xff) as u8);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn base16_roundtrip() {
        let data = b"hello world";
        assert_eq!(base16_decode(&base16_encode(data)).unwrap(), data);
    }

    #[test]
    fn base32_rfc4648_vectors() {
        // RFC 4648 §10 test vectors.
        assert_eq!(base32_encode(b""), "");
        assert_eq!(base32_encode(b"f"), "MY======");
        assert_eq!(base32_encode(b"fo"), "MZXQ====");
        assert_eq!(base32_encode(b"foo"), "MZXW6===");
        assert_eq!(base32_encode(b"foob"), "MZXW6YQ=");
        assert_eq!(base32_encode(b"fooba"), "MZXW6YTB");
        assert_eq!(base32_encode(b"foobar"), "MZXW6YTBOI======");
    }

    #[test]
    fn base32_roundtrip() {
        let data = b"The quick brown fox";
        assert_eq!(base32_decode(&base32_encode(data)).unwrap(), data);
    }
}
