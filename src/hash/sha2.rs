//! SHA-2, specified by [FIPS
//! 180-4](https://nvlpubs.nist.gov/nistpubs/FIPS/NIST.FIPS.180-4.pdf).
//!
//! SHA-256/224 operate on 32-bit words via the [SHACAL-2](shacal2) block
//! cipher; SHA-512/384 are the same construction doubled in word size (64
//! bits), with different initial values, round constants, and shift amounts.
//! See the [module documentation](super) for the shared Merkle-Damgard /
//! Davies-Meyer framing.

use {
    crate::{error::Result, hash::Hash},
    docext::docext,
};

const BLOCK_BYTES_32: usize = 64;
const BLOCK_BYTES_64: usize = 128;

/// The $K_t^{256}$ constants used by [SHA-256](Sha256) and [SHA-224](Sha224).
#[docext]
pub const KT_256: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

/// The $K_t^{512}$ constants used by [SHA-512](Sha512) and [SHA-384](Sha384).
pub const KT_512: [u64; 80] = [
    0x428a2f98d728ae22, 0x7137449123ef65cd, 0xb5c0fbcfec4d3b2f, 0xe9b5dba58189dbbc,
    0x3956c25bf348b538, 0x59f111f1b605d019, 0x923f82a4af194f9b, 0xab1c5ed5da6d8118,
    0xd807aa98a3030242, 0x12835b0145706fbe, 0x243185be4ee4b28c, 0x550c7dc3d5ffb4e2,
    0x72be5d74f27b896f, 0x80deb1fe3b1696b1, 0x9bdc06a725c71235, 0xc19bf174cf692694,
    0xe49b69c19ef14ad2, 0xefbe4786384f25e3, 0x0fc19dc68b8cd5b5, 0x240ca1cc77ac9c65,
    0x2de92c6f592b0275, 0x4a7484aa6ea6e483, 0x5cb0a9dcbd41fbd4, 0x76f988da831153b5,
    0x983e5152ee66dfab, 0xa831c66d2db43210, 0xb00327c898fb213f, 0xbf597fc7beef0ee4,
    0xc6e00bf33da88fc2, 0xd5a79147930aa725, 0x06ca6351e003826f, 0x142929670a0e6e70,
    0x27b70a8546d22ffc, 0x2e1b21385c26c926, 0x4d2c6dfc5ac42aed, 0x53380d139d95b3df,
    0x650a73548baf63de, 0x766a0abb3c77b2a8, 0x81c2c92e47edaee6, 0x92722c851482353b,
    0xa2bfe8a14cf10364, 0xa81a664bbc423001, 0xc24b8b70d0f89791, 0xc76c51a30654be30,
    0xd192e819d6ef5218, 0xd69906245565a910, 0xf40e35855771202a, 0x106aa07032bbd1b8,
    0x19a4c116b8d2d0c8, 0x1e376c085141ab53, 0x2748774cdf8eeb99, 0x34b0bcb5e19b48a8,
    0x391c0cb3c5c95a63, 0x4ed8aa4ae3418acb, 0x5b9cca4f7763e373, 0x682e6ff3d6b2b8a3,
    0x748f82ee5defb2fc, 0x78a5636f43172f60, 0x84c87814a1f0ab72, 0x8cc702081a6439ec,
    0x90befffa23631e28, 0xa4506cebde82bde9, 0xbef9a3f7b2c67915, 0xc67178f2e372532b,
    0xca273eceea26619c, 0xd186b8c721c0c207, 0xeada7dd6cde0eb1e, 0xf57d4f7fee6ed178,
    0x06f067aa72176fba, 0x0a637dc5a2c898a6, 0x113f9804bef90dae, 0x1b710b35131c471b,
    0x28db77f523047d84, 0x32caab7b40c72493, 0x3c9ebe0a15c9bebc, 0x431d67c49c100d4c,
    0x4cc5d4becb3e42b6, 0x597f299cfc657e2a, 0x5fcb6fab3ad6faec, 0x6c44198c4a475817,
];

macro_rules! sha2_32 {
    ($name:ident, $digest_bytes:expr, $iv:expr, $oid:expr, $reg:expr, $vector_msg:expr, $vector_hex:expr) => {
        #[doc = concat!("Streaming ", stringify!($name), " state machine.")]
        #[derive(Debug, Clone)]
        pub struct $name {
            state: [u32; 8],
            buf: [u8; BLOCK_BYTES_32],
            buf_len: usize,
            total_len: u64,
        }

        impl Default for $name {
            fn default() -> Self {
                Self { state: $iv, buf: [0; BLOCK_BYTES_32], buf_len: 0, total_len: 0 }
            }
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            fn compress(&mut self) {
                let block = self.buf;
                self.state = shacal2(self.state, &block);
            }

            fn update_raw(&mut self, mut data: &[u8]) {
                while !data.is_empty() {
                    let want = BLOCK_BYTES_32 - self.buf_len;
                    let take = want.min(data.len());
                    self.buf[self.buf_len..self.buf_len + take].copy_from_slice(&data[..take]);
                    self.buf_len += take;
                    data = &data[take..];
                    if self.buf_len == BLOCK_BYTES_32 {
                        self.compress();
                        self.buf_len = 0;
                    }
                }
            }
        }

        impl Hash for $name {
            fn name(&self) -> &'static str {
                $reg
            }

            fn digest_size(&self) -> usize {
                $digest_bytes
            }

            fn block_size(&self) -> usize {
                BLOCK_BYTES_32
            }

            fn der_oid(&self) -> &'static [u32] {
                $oid
            }

            fn update(&mut self, mut data: &[u8]) {
                self.total_len = self.total_len.wrapping_add(data.len() as u64);
                if self.buf_len > 0 {
                    let want = BLOCK_BYTES_32 - self.buf_len;
                    let take = want.min(data.len());
                    self.buf[self.buf_len..self.buf_len + take].copy_from_slice(&data[..take]);
                    self.buf_len += take;
                    data = &data[take..];
                    if self.buf_len == BLOCK_BYTES_32 {
                        self.compress();
                        self.buf_len = 0;
                    }
                }
                while data.len() >= BLOCK_BYTES_32 {
                    self.buf.copy_from_slice(&data[..BLOCK_BYTES_32]);
                    self.compress();
                    data = &data[BLOCK_BYTES_32..];
                }
                self.buf[..data.len()].copy_from_slice(data);
                self.buf_len = data.len();
            }

            fn finalize(&mut self) -> Vec<u8> {
                let bit_len = self.total_len.wrapping_mul(8);
                let mut pad = [0u8; 2 * BLOCK_BYTES_32];
                pad[0] = 0x80;
                let pad_len = if self.buf_len < BLOCK_BYTES_32 - 8 {
                    BLOCK_BYTES_32 - self.buf_len
                } else {
                    2 * BLOCK_BYTES_32 - self.buf_len
                };
                pad[pad_len - 8..pad_len].copy_from_slice(&bit_len.to_be_bytes());
                self.update_raw(&pad[..pad_len]);

                let digest = self.state.into_iter().flat_map(u32::to_be_bytes).take($digest_bytes).collect();
                *self = Self::default();
                digest
            }

            fn self_test(&mut self) -> Result<()> {
                let digest = self.hash($vector_msg);
                if digest != hex::decode($vector_hex).unwrap() {
                    return Err(crate::error::Error::FailTestVector($reg));
                }
                Ok(())
            }

            fn clone_box(&self) -> Box<dyn Hash> {
                Box::new(self.clone())
            }
        }
    };
}

sha2_32!(
    Sha256,
    32,
    [0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19],
    // id-sha256, 2.16.840.1.101.3.4.2.1
    &[2, 16, 840, 1, 101, 3, 4, 2, 1],
    "sha256",
    b"abc",
    "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
);

sha2_32!(
    Sha224,
    28,
    [0xc1059ed8, 0x367cd507, 0x3070dd17, 0xf70e5939, 0xffc00b31, 0x68581511, 0x64f98fa7, 0xbefa4fa4],
    // id-sha224, 2.16.840.1.101.3.4.2.4
    &[2, 16, 840, 1, 101, 3, 4, 2, 4],
    "sha224",
    b"abc",
    "23097d223405d8228642a477bda255b32aadbce4bda0b3f7e36c9da7"
);

macro_rules! sha2_64 {
    ($name:ident, $digest_bytes:expr, $iv:expr, $oid:expr, $reg:expr, $vector_msg:expr, $vector_hex:expr) => {
        #[doc = concat!("Streaming ", stringify!($name), " state machine.")]
        #[derive(Debug, Clone)]
        pub struct $name {
            state: [u64; 8],
            buf: [u8; BLOCK_BYTES_64],
            buf_len: usize,
            total_len: u128,
        }

        impl Default for $name {
            fn default() -> Self {
                Self { state: $iv, buf: [0; BLOCK_BYTES_64], buf_len: 0, total_len: 0 }
            }
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            fn compress(&mut self) {
                let block = self.buf;
                self.state = shacal2_64(self.state, &block);
            }

            fn update_raw(&mut self, mut data: &[u8]) {
                while !data.is_empty() {
                    let want = BLOCK_BYTES_64 - self.buf_len;
                    let take = want.min(data.len());
                    self.buf[self.buf_len..self.buf_len + take].copy_from_slice(&data[..take]);
                    self.buf_len += take;
                    data = &data[take..];
                    if self.buf_len == BLOCK_BYTES_64 {
                        self.compress();
                        self.buf_len = 0;
                    }
                }
            }
        }

        impl Hash for $name {
            fn name(&self) -> &'static str {
                $reg
            }

            fn digest_size(&self) -> usize {
                $digest_bytes
            }

            fn block_size(&self) -> usize {
                BLOCK_BYTES_64
            }

            fn der_oid(&self) -> &'static [u32] {
                $oid
            }

            fn update(&mut self, mut data: &[u8]) {
                self.total_len = self.total_len.wrapping_add(data.len() as u128);
                if self.buf_len > 0 {
                    let want = BLOCK_BYTES_64 - self.buf_len;
                    let take = want.min(data.len());
                    self.buf[self.buf_len..self.buf_len + take].copy_from_slice(&data[..take]);
                    self.buf_len += take;
                    data = &data[take..];
                    if self.buf_len == BLOCK_BYTES_64 {
                        self.compress();
                        self.buf_len = 0;
                    }
                }
                while data.len() >= BLOCK_BYTES_64 {
                    self.buf.copy_from_slice(&data[..BLOCK_BYTES_64]);
                    self.compress();
                    data = &data[BLOCK_BYTES_64..];
                }
                self.buf[..data.len()].copy_from_slice(data);
                self.buf_len = data.len();
            }

            fn finalize(&mut self) -> Vec<u8> {
                let bit_len = self.total_len.wrapping_mul(8);
                let mut pad = [0u8; 2 * BLOCK_BYTES_64];
                pad[0] = 0x80;
                let pad_len = if self.buf_len < BLOCK_BYTES_64 - 16 {
                    BLOCK_BYTES_64 - self.buf_len
                } else {
                    2 * BLOCK_BYTES_64 - self.buf_len
                };
                pad[pad_len - 16..pad_len].copy_from_slice(&bit_len.to_be_bytes());
                self.update_raw(&pad[..pad_len]);

                let digest = self.state.into_iter().flat_map(u64::to_be_bytes).take($digest_bytes).collect();
                *self = Self::default();
                digest
            }

            fn self_test(&mut self) -> Result<()> {
                let digest = self.hash($vector_msg);
                if digest != hex::decode($vector_hex).unwrap() {
                    return Err(crate::error::Error::FailTestVector($reg));
                }
                Ok(())
            }

            fn clone_box(&self) -> Box<dyn Hash> {
                Box::new(self.clone())
            }
        }
    };
}

sha2_64!(
    Sha512,
    64,
    [
        0x6a09e667f3bcc908, 0xbb67ae8584caa73b, 0x3c6ef372fe94f82b, 0xa54ff53a5f1d36f1,
        0x510e527fade682d1, 0x9b05688c2b3e6c1f, 0x1f83d9abfb41bd6b, 0x5be0cd19137e2179
    ],
    // id-sha512, 2.16.840.1.101.3.4.2.3
    &[2, 16, 840, 1, 101, 3, 4, 2, 3],
    "sha512",
    b"abc",
    "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
);

sha2_64!(
    Sha384,
    48,
    [
        0xcbbb9d5dc1059ed8, 0x629a292a367cd507, 0x9159015a3070dd17, 0x152fecd8f70e5939,
        0x67332667ffc00b31, 0x8eb44a8768581511, 0xdb0c2e0d64f98fa7, 0x47b5481dbefa4fa4
    ],
    // id-sha384, 2.16.840.1.101.3.4.2.2
    &[2, 16, 840, 1, 101, 3, 4, 2, 2],
    "sha384",
    b"abc",
    "cb00753f45a35e8bb5a03d699ac65007272c32ab0eded1631a8b605a43ff5bed8086072ba1e7cc2358baeca134c825a"
);

/// SHACAL-2, the block cipher used internally by [SHA-256](Sha256) and
/// [SHA-224](Sha224). Applies 64 rounds of the following permutation, where
/// $a, b, c, \dots$ are the current state in 32-bit words, $W_i$ is the
/// message schedule, [$\Sigma_0^{256}$](uppercase_sigma_0),
/// [$\Sigma_1^{256}$](uppercase_sigma_1), [$\sigma_0^{256}$](lowercase_sigma_0),
/// [$\sigma_1^{256}$](lowercase_sigma_1), [$Ch$](ch) and [$Maj$](maj) are
/// helper functions, and [$K_t^{256}$](KT_256) are the round constants:
///
/// $$
/// T_1 = h + \Sigma_1^{256}(e) + Ch(e, f, g) + K_t^{256} + W_0 \pmod{2^{32}}\\
/// T_2 = \Sigma_0^{256}(a) + Maj(a, b, c) \pmod{2^{32}}\\
/// h \gets g\\
/// g \gets f\\
/// f \gets e\\
/// e \gets d + T_1\\
/// d \gets c\\
/// c \gets b\\
/// b \gets a\\
/// a \gets T_1 + T_2
/// $$
#[docext]
fn shacal2(state: [u32; 8], block: &[u8; BLOCK_BYTES_32]) -> [u32; 8] {
    let mut schedule = [0u32; 16];
    schedule
        .iter_mut()
        .zip(block.chunks_exact(4))
        .for_each(|(s, b)| *s = u32::from_be_bytes(b.try_into().unwrap()));

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = state;
    for t in 0..64usize {
        let wt = schedule[0];
        let temp1 = h
            .wrapping_add(uppercase_sigma_1(e))
            .wrapping_add(ch(e, f, g))
            .wrapping_add(KT_256[t])
            .wrapping_add(wt);
        let temp2 = uppercase_sigma_0(a).wrapping_add(maj(a, b, c));
        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(temp1);
        d = c;
        c = b;
        b = a;
        a = temp1.wrapping_add(temp2);

        let next = lowercase_sigma_1(schedule[14])
            .wrapping_add(schedule[9])
            .wrapping_add(lowercase_sigma_0(schedule[1]))
            .wrapping_add(schedule[0]);
        schedule.rotate_left(1);
        schedule[15] = next;
    }

    [
        state[0].wrapping_add(a),
        state[1].wrapping_add(b),
        state[2].wrapping_add(c),
        state[3].wrapping_add(d),
        state[4].wrapping_add(e),
        state[5].wrapping_add(f),
        state[6].wrapping_add(g),
        state[7].wrapping_add(h),
    ]
}

/// SHACAL-2's 64-bit sister, used internally by [SHA-512](Sha512) and
/// [SHA-384](Sha384). Identical in shape to [`shacal2`], but over 64-bit
/// words, 80 rounds, and the $\Sigma$/$\sigma$ shift amounts from FIPS 180-4
/// §4.1.3.
fn shacal2_64(state: [u64; 8], block: &[u8; BLOCK_BYTES_64]) -> [u64; 8] {
    let mut schedule = [0u64; 16];
    schedule
        .iter_mut()
        .zip(block.chunks_exact(8))
        .for_each(|(s, b)| *s = u64::from_be_bytes(b.try_into().unwrap()));

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = state;
    for t in 0..80usize {
        let wt = schedule[0];
        let temp1 = h
            .wrapping_add(uppercase_sigma_1_64(e))
            .wrapping_add(ch64(e, f, g))
            .wrapping_add(KT_512[t])
            .wrapping_add(wt);
        let temp2 = uppercase_sigma_0_64(a).wrapping_add(maj64(a, b, c));
        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(temp1);
        d = c;
        c = b;
        b = a;
        a = temp1.wrapping_add(temp2);

        let next = lowercase_sigma_1_64(schedule[14])
            .wrapping_add(schedule[9])
            .wrapping_add(lowercase_sigma_0_64(schedule[1]))
            .wrapping_add(schedule[0]);
        schedule.rotate_left(1);
        schedule[15] = next;
    }

    [
        state[0].wrapping_add(a),
        state[1].wrapping_add(b),
        state[2].wrapping_add(c),
        state[3].wrapping_add(d),
        state[4].wrapping_add(e),
        state[5].wrapping_add(f),
        state[6].wrapping_add(g),
        state[7].wrapping_add(h),
    ]
}

/// Helper function $Ch(x, y, z) = (x \land y) \oplus (\neg x \land z)$.
#[docext]
fn ch(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ ((!x) & z)
}

/// Helper function $Maj(x, y, z) = (x \land y) \oplus (x \land z) \oplus (y \land z)$.
#[docext]
fn maj(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (x & z) ^ (y & z)
}

/// $\Sigma_0^{256}(x) = \mathrm{ROTR}(x, 2) \oplus \mathrm{ROTR}(x, 13) \oplus \mathrm{ROTR}(x, 22)$
#[docext]
fn uppercase_sigma_0(x: u32) -> u32 {
    x.rotate_right(2) ^ x.rotate_right(13) ^ x.rotate_right(22)
}

/// $\Sigma_1^{256}(x) = \mathrm{ROTR}(x, 6) \oplus \mathrm{ROTR}(x, 11) \oplus \mathrm{ROTR}(x, 25)$
#[docext]
fn uppercase_sigma_1(x: u32) -> u32 {
    x.rotate_right(6) ^ x.rotate_right(11) ^ x.rotate_right(25)
}

/// $\sigma_0^{256}(x) = \mathrm{ROTR}(x, 7) \oplus \mathrm{ROTR}(x, 18) \oplus (x \gg 3)$
#[docext]
fn lowercase_sigma_0(x: u32) -> u32 {
    x.rotate_right(7) ^ x.rotate_right(18) ^ (x >> 3)
}

/// $\sigma_1^{256}(x) = \mathrm{ROTR}(x, 17) \oplus \mathrm{ROTR}(x, 19) \oplus (x \gg 10)$
#[docext]
fn lowercase_sigma_1(x: u32) -> u32 {
    x.rotate_right(17) ^ x.rotate_right(19) ^ (x >> 10)
}

fn ch64(x: u64, y: u64, z: u64) -> u64 {
    (x & y) ^ ((!x) & z)
}

fn maj64(x: u64, y: u64, z: u64) -> u64 {
    (x & y) ^ (x & z) ^ (y & z)
}

fn uppercase_sigma_0_64(x: u64) -> u64 {
    x.rotate_right(28) ^ x.rotate_right(34) ^ x.rotate_right(39)
}

fn uppercase_sigma_1_64(x: u64) -> u64 {
    x.rotate_right(14) ^ x.rotate_right(18) ^ x.rotate_right(41)
}

fn lowercase_sigma_0_64(x: u64) -> u64 {
    x.rotate_right(1) ^ x.rotate_right(8) ^ (x >> 7)
}

fn lowercase_sigma_1_64(x: u64) -> u64 {
    x.rotate_right(19) ^ x.rotate_right(61) ^ (x >> 6)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sha256_abc() {
        let mut h = Sha256::new();
        assert_eq!(
            hex::encode(h.hash(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha256_empty() {
        let mut h = Sha256::new();
        assert_eq!(
            hex::encode(h.hash(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_split_update_matches_one_shot() {
        let msg = b"The quick brown fox jumps over the lazy dog";
        let mut one_shot = Sha256::new();
        let whole = one_shot.hash(msg);

        let mut split = Sha256::new();
        split.update(&msg[..17]);
        split.update(&msg[17..]);
        assert_eq!(split.finalize(), whole);
    }

    #[test]
    fn sha512_abc() {
        let mut h = Sha512::new();
        assert_eq!(
            hex::encode(h.hash(b"abc")),
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39\
             a2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
    }

    #[test]
    fn sha384_abc() {
        let mut h = Sha384::new();
        assert_eq!(
            hex::encode(h.hash(b"abc")),
            "cb00753f45a35e8bb5a03d699ac65007272c32ab0eded1631a8b605a43ff5bed8086072ba1e7cc2358baeca134c825a"
        );
    }

    #[test]
    fn sha224_abc() {
        let mut h = Sha224::new();
        assert_eq!(
            hex::encode(h.hash(b"abc")),
            "23097d223405d8228642a477bda255b32aadbce4bda0b3f7e36c9da7"
        );
    }

    #[test]
    fn self_tests_pass() {
        Sha256::new().self_test().unwrap();
        Sha224::new().self_test().unwrap();
        Sha512::new().self_test().unwrap();
        Sha384::new().self_test().unwrap();
    }
}
