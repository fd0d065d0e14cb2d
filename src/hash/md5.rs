//! MD5, specified by [RFC 1321](https://www.rfc-editor.org/rfc/rfc1321).
//!
//! MD5 is cryptographically broken (practical collisions) and kept here
//! only for legacy format compatibility: OpenSSL's traditional PEM
//! key-derivation function (`pkcs_5_alg1_openssl`) and some PBKDF1
//! configurations are defined in terms of MD5. Do not use it for anything
//! new.

use crate::{error::Result, hash::Hash};

const BLOCK_BYTES: usize = 64;
const DIGEST_BYTES: usize = 16;

type State = [u32; 4];

const H0: State = [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476];

/// Per-round left-rotation amounts.
const SHIFT: [u32; 64] = [
    7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, 5, 9, 14, 20, 5, 9, 14, 20, 5, 9,
    14, 20, 5, 9, 14, 20, 4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, 6, 10, 15,
    21, 6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21,
];

/// `floor(abs(sin(i + 1)) * 2^32)` for i in 0..64, precomputed per RFC 1321.
const K: [u32; 64] = [
    0xd76aa478, 0xe8c7b756, 0x242070db, 0xc1bdceee, 0xf57c0faf, 0x4787c62a, 0xa8304613, 0xfd469501,
    0x698098d8, 0x8b44f7af, 0xffff5bb1, 0x895cd7be, 0x6b901122, 0xfd987193, 0xa679438e, 0x49b40821,
    0xf61e2562, 0xc040b340, 0x265e5a51, 0xe9b6c7aa, 0xd62f105d, 0x02441453, 0xd8a1e681, 0xe7d3fbc8,
    0x21e1cde6, 0xc33707d6, 0xf4d50d87, 0x455a14ed, 0xa9e3e905, 0xfcefa3f8, 0x676f02d9, 0x8d2a4c8a,
    0xfffa3942, 0x8771f681, 0x6d9d6122, 0xfde5380c, 0xa4beea44, 0x4bdecfa9, 0xf6bb4b60, 0xbebfbc70,
    0x289b7ec6, 0xeaa127fa, 0xd4ef3085, 0x04881d05, 0xd9d4d039, 0xe6db99e5, 0x1fa27cf8, 0xc4ac5665,
    0xf4292244, 0x432aff97, 0xab9423a7, 0xfc93a039, 0x655b59c3, 0x8f0ccc92, 0xffeff47d, 0x85845dd1,
    0x6fa87e4f, 0xfe2ce6e0, 0xa3014314, 0x4e0811a1, 0xf7537e82, 0xbd3af235, 0x2ad7d2bb, 0xeb86d391,
];

/// Streaming MD5 state machine.
#[derive(Debug, Clone)]
pub struct Md5 {
    state: State,
    buf: [u8; BLOCK_BYTES],
    buf_len: usize,
    total_len: u64,
}

impl Default for Md5 {
    fn default() -> Self {
        Self { state: H0, buf: [0; BLOCK_BYTES], buf_len: 0, total_len: 0 }
    }
}

impl Md5 {
    pub fn new() -> Self {
        Self::default()
    }

    fn compress(&mut self) {
        let block = self.buf;
        self.state = compress(self.state, &block);
    }

    fn update_raw(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let want = BLOCK_BYTES - self.buf_len;
            let take = want.min(data.len());
            self.buf[self.buf_len..self.buf_len + take].copy_from_slice(&data[..take]);
            self.buf_len += take;
            data = &data[take..];
            if self.buf_len == BLOCK_BYTES {
                self.compress();
                self.buf_len = 0;
            }
        }
    }
}

impl Hash for Md5 {
    fn name(&self) -> &'static str {
        "md5"
    }

    fn digest_size(&self) -> usize {
        DIGEST_BYTES
    }

    fn block_size(&self) -> usize {
        BLOCK_BYTES
    }

    fn der_oid(&self) -> &'static [u32] {
        // id-md5, 1.2.840.113549.2.5
        &[1, 2, 840, 113549, 2, 5]
    }

    fn update(&mut self, mut data: &[u8]) {
        self.total_len = self.total_len.wrapping_add(data.len() as u64);
        if self.buf_len > 0 {
            let want = BLOCK_BYTES - self.buf_len;
            let take = want.min(data.len());
            self.buf[self.buf_len..self.buf_len + take].copy_from_slice(&data[..take]);
            self.buf_len += take;
            data = &data[take..];
            if self.buf_len == BLOCK_BYTES {
                self.compress();
                self.buf_len = 0;
            }
        }
        while data.len() >= BLOCK_BYTES {
            self.buf.copy_from_slice(&data[..BLOCK_BYTES]);
            self.compress();
            data = &data[BLOCK_BYTES..];
        }
        self.buf[..data.len()].copy_from_slice(data);
        self.buf_len = data.len();
    }

    fn finalize(&mut self) -> Vec<u8> {
        let bit_len = self.total_len.wrapping_mul(8);
        let mut pad = [0u8; 2 * BLOCK_BYTES];
        pad[0] = 0x80;
        let pad_len = if self.buf_len < BLOCK_BYTES - 8 {
            BLOCK_BYTES - self.buf_len
        } else {
            2 * BLOCK_BYTES - self.buf_len
        };
        pad[pad_len - 8..pad_len].copy_from_slice(&bit_len.to_le_bytes());
        self.update_raw(&pad[..pad_len]);

        let digest = self.state.into_iter().flat_map(u32::to_le_bytes).collect();
        *self = Self::default();
        digest
    }

    fn self_test(&mut self) -> Result<()> {
        let digest = self.hash(b"abc");
        if digest != hex::decode("900150983cd24fb0d6963f7d28e17f72").unwrap() {
            return Err(crate::error::Error::FailTestVector("md5"));
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn Hash> {
        Box::new(self.clone())
    }
}

fn compress(state: State, block: &[u8; BLOCK_BYTES]) -> State {
    let mut m = [0u32; 16];
    m.iter_mut()
        .zip(block.chunks_exact(4))
        .for_each(|(w, b)| *w = u32::from_le_bytes(b.try_into().unwrap()));

    let [mut a, mut b, mut c, mut d] = state;
    for i in 0..64u32 {
        let (f, g) = match i {
            0..=15 => ((b & c) | (!b & d), i),
            16..=31 => ((d & b) | (!d & c), (5 * i + 1) % 16),
            32..=47 => (b ^ c ^ d, (3 * i + 5) % 16),
            _ => (c ^ (b | !d), (7 * i) % 16),
        };
        let f = f
            .wrapping_add(a)
            .wrapping_add(K[i as usize])
            .wrapping_add(m[g as usize]);
        a = d;
        d = c;
        c = b;
        b = b.wrapping_add(f.rotate_left(SHIFT[i as usize]));
    }

    [
        state[0].wrapping_add(a),
        state[1].wrapping_add(b),
        state[2].wrapping_add(c),
        state[3].wrapping_add(d),
    ]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_string() {
        let mut h = Md5::new();
        assert_eq!(hex::encode(h.hash(b"")), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn abc() {
        let mut h = Md5::new();
        assert_eq!(hex::encode(h.hash(b"abc")), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn split_update_matches_one_shot() {
        let msg = b"The quick brown fox jumps over the lazy dog";
        let mut one_shot = Md5::new();
        let whole = one_shot.hash(msg);

        let mut split = Md5::new();
        split.update(&msg[..10]);
        split.update(&msg[10..]);
        assert_eq!(split.finalize(), whole);
    }

    #[test]
    fn self_test_passes() {
        Md5::new().self_test().unwrap();
    }
}
