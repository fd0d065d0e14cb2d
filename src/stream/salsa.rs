//! Salsa20 (Bernstein, 2007) and XSalsa20 (extended 24-byte-nonce variant
//! via HSalsa20 subkey derivation), ChaCha20's predecessor and structural
//! sibling: same ARX quarter-round, different state layout and word
//! permutation.

use crate::stream::{StreamCipher, StreamState};

const SIGMA: [u32; 4] = [0x61707865, 0x3320646e, 0x79622d32, 0x6b206574];

#[inline]
fn quarter_round(y0: &mut u32, y1: &mut u32, y2: &mut u32, y3: &mut u32) {
    *y1 ^= y0.wrapping_add(*y3).rotate_left(7);
    *y2 ^= y1.wrapping_add(*y0).rotate_left(9);
    *y3 ^= y2.wrapping_add(*y1).rotate_left(13);
    *y0 ^= y3.wrapping_add(*y2).rotate_left(18);
}

fn double_round(s: &mut [u32; 16]) {
    // Column round.
    {
        let (mut a, mut b, mut c, mut d) = (s[0], s[4], s[8], s[12]);
        quarter_round(&mut a, &mut b, &mut c, &mut d);
        s[0] = a;
        s[4] = b;
        s[8] = c;
        s[12] = d;
    }
    {
        let (mut a, mut b, mut c, mut d) = (s[5], s[9], s[13], s[1]);
        quarter_round(&mut a, &mut b, &mut c, &mut d);
        s[5] = a;
        s[9] = b;
        s[13] = c;
        s[1] = d;
    }
    {
        let (mut a, mut b, mut c, mut d) = (s[10], s[14], s[2], s[6]);
        quarter_round(&mut a, &mut b, &mut c, &mut d);
        s[10] = a;
        s[14] = b;
        s[2] = c;
        s[6] = d;
    }
    {
        let (mut a, mut b, mut c, mut d) = (s[15], s[3], s[7], s[11]);
        quarter_round(&mut a, &mut b, &mut c, &mut d);
        s[15] = a;
        s[3] = b;
        s[7] = c;
        s[11] = d;
    }
    // Row round.
    {
        let (mut a, mut b, mut c, mut d) = (s[0], s[1], s[2], s[3]);
        quarter_round(&mut a, &mut b, &mut c, &mut d);
        s[0] = a;
        s[1] = b;
        s[2] = c;
        s[3] = d;
    }
    {
        let (mut a, mut b, mut c, mut d) = (s[5], s[6], s[7], s[4]);
        quarter_round(&mut a, &mut b, &mut c, &mut d);
        s[5] = a;
        s[6] = b;
        s[7] = c;
        s[4] = d;
    }
    {
        let (mut a, mut b, mut c, mut d) = (s[10], s[11], s[8], s[9]);
        quarter_round(&mut a, &mut b, &mut c, &mut d);
        s[10] = a;
        s[11] = b;
        s[8] = c;
        s[9] = d;
    }
    {
        let (mut a, mut b, mut c, mut d) = (s[15], s[12], s[13], s[14]);
        quarter_round(&mut a, &mut b, &mut c, &mut d);
        s[15] = a;
        s[12] = b;
        s[13] = c;
        s[14] = d;
    }
}

fn block(initial: &[u32; 16], rounds: u32) -> [u32; 16] {
    let mut s = *initial;
    for _ in 0..rounds / 2 {
        double_round(&mut s);
    }
    for i in 0..16 {
        s[i] = s[i].wrapping_add(initial[i]);
    }
    s
}

fn words_from_le_bytes(bytes: &[u8]) -> Vec<u32> {
    bytes.chunks_exact(4).map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect()
}

/// Build the canonical Salsa20 state matrix:
/// `[c0 k0 k1 k2 k3 c1 n0 n1 ctr0 ctr1 c2 k4 k5 k6 k7 c3]`.
fn build_state(key: &[u32], nonce: &[u32], counter: [u32; 2]) -> [u32; 16] {
    [
        SIGMA[0], key[0], key[1], key[2], key[3], SIGMA[1], nonce[0], nonce[1], counter[0], counter[1], SIGMA[2],
        key[4], key[5], key[6], key[7], SIGMA[3],
    ]
}

fn hsalsa20(key: &[u8; 32], nonce16: &[u8; 16]) -> [u8; 32] {
    let kw = words_from_le_bytes(key);
    let nw = words_from_le_bytes(nonce16);
    let mut s = build_state(&kw, &nw[0..2], [nw[2], nw[3]]);
    for _ in 0..10 {
        double_round(&mut s);
    }
    // HSalsa20 keeps the constants' and key's positions, skipping the
    // feed-forward addition step that Salsa20Block performs.
    let idx = [0usize, 5, 10, 15, 6, 7, 8, 9];
    let mut out = [0u8; 32];
    for (i, &ix) in idx.iter().enumerate() {
        out[i * 4..i * 4 + 4].copy_from_slice(&s[ix].to_le_bytes());
    }
    out
}

pub struct SalsaState {
    key: Vec<u32>,
    nonce: [u32; 2],
    counter: [u32; 2],
    keystream: [u8; 64],
    offset: usize,
}

impl SalsaState {
    fn new(key: &[u8], nonce8: &[u8]) -> Self {
        let kw = words_from_le_bytes(key);
        let nw = words_from_le_bytes(nonce8);
        Self { key: kw, nonce: [nw[0], nw[1]], counter: [0, 0], keystream: [0; 64], offset: 64 }
    }

    fn refill(&mut self) {
        let state = build_state(&self.key, &self.nonce, self.counter);
        let words = block(&state, 20);
        for (w, chunk) in words.iter().zip(self.keystream.chunks_exact_mut(4)) {
            chunk.copy_from_slice(&w.to_le_bytes());
        }
        self.counter[0] = self.counter[0].wrapping_add(1);
        if self.counter[0] == 0 {
            self.counter[1] = self.counter[1].wrapping_add(1);
        }
        self.offset = 0;
    }
}

impl StreamState for SalsaState {
    fn crypt(&mut self, input: &[u8], output: &mut [u8]) {
        for (i, o) in input.iter().zip(output.iter_mut()) {
            if self.offset == 64 {
                self.refill();
            }
            *o = i ^ self.keystream[self.offset];
            self.offset += 1;
        }
    }
}

/// Salsa20 with the canonical 8-byte nonce / 64-bit counter.
pub struct Salsa20;

impl StreamCipher for Salsa20 {
    fn name(&self) -> &'static str {
        "salsa20"
    }

    fn setup(&self, key: &[u8], iv: &[u8]) -> crate::error::Result<Box<dyn StreamState>> {
        if key.len() != 32 || iv.len() != 8 {
            return Err(crate::error::Error::InvalidKeySize { got: key.len(), valid: &[32] });
        }
        Ok(Box::new(SalsaState::new(key, iv)))
    }
}

/// XSalsa20: HSalsa20-derived subkey plus a 24-byte nonce.
pub struct XSalsa20;

impl StreamCipher for XSalsa20 {
    fn name(&self) -> &'static str {
        "xsalsa20"
    }

    fn setup(&self, key: &[u8], iv: &[u8]) -> crate::error::Result<Box<dyn StreamState>> {
        if key.len() != 32 || iv.len() != 24 {
            return Err(crate::error::Error::InvalidKeySize { got: key.len(), valid: &[32] });
        }
        let mut key32 = [0u8; 32];
        key32.copy_from_slice(key);
        let mut nonce16 = [0u8; 16];
        nonce16.copy_from_slice(&iv[..16]);
        let subkey = hsalsa20(&key32, &nonce16);
        Ok(Box::new(SalsaState::new(&subkey, &iv[16..24])))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn salsa20_roundtrips() {
        let key = [3u8; 32];
        let nonce = [4u8; 8];
        let pt = b"salsa20 is the ancestor chacha20 generalized from";
        let mut ct = vec![0u8; pt.len()];
        Salsa20.setup(&key, &nonce).unwrap().crypt(pt, &mut ct);
        let mut back = vec![0u8; pt.len()];
        Salsa20.setup(&key, &nonce).unwrap().crypt(&ct, &mut back);
        assert_eq!(pt.to_vec(), back);
    }

    #[test]
    fn xsalsa20_roundtrips_with_24_byte_nonce() {
        let key = [8u8; 32];
        let nonce = [6u8; 24];
        let pt = b"xsalsa20 stretches the nonce via hsalsa20";
        let mut ct = vec![0u8; pt.len()];
        XSalsa20.setup(&key, &nonce).unwrap().crypt(pt, &mut ct);
        let mut back = vec![0u8; pt.len()];
        XSalsa20.setup(&key, &nonce).unwrap().crypt(&ct, &mut back);
        assert_eq!(pt.to_vec(), back);
    }

    #[test]
    fn distinct_nonces_give_distinct_keystreams() {
        let key = [1u8; 32];
        let pt = [0u8; 64];
        let mut ct1 = vec![0u8; 64];
        let mut ct2 = vec![0u8; 64];
        Salsa20.setup(&key, &[0u8; 8]).unwrap().crypt(&pt, &mut ct1);
        Salsa20.setup(&key, &[1u8; 8]).unwrap().crypt(&pt, &mut ct2);
        assert_ne!(ct1, ct2);
    }
}
