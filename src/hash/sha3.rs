//! SHA-3, specified by [FIPS
//! 202](https://nvlpubs.nist.gov/nistpubs/FIPS/NIST.FIPS.202.pdf).
//!
//! Unlike SHA-1/SHA-2, SHA-3 is not a Merkle-Damgard construction; it's a
//! [sponge](https://en.wikipedia.org/wiki/Sponge_function) built on the
//! Keccak-f[1600] permutation over a 5x5 array of 64-bit lanes. Input is
//! absorbed `rate` bytes at a time (XORed into the state, then permuted);
//! after the padded input is fully absorbed, output is squeezed from the
//! leading bytes of the state. The four SHA-3 variants below differ only in
//! `rate`/`digest size` (the `capacity = 1600 - rate` sets the security
//! level).

mod rctable;

use {
    crate::{error::Result, hash::Hash},
    std::iter,
};

const NUM_ROWS: usize = 5;
const NUM_COLS: usize = 5;
const NUM_ROUNDS: usize = 24;
const L: usize = 6;

type State = [[u64; NUM_COLS]; NUM_ROWS];

const RHO_OFFSETS: [[u32; NUM_COLS]; NUM_ROWS] = [
    [0, 1, 190, 28, 91],
    [36, 300, 6, 55, 276],
    [3, 10, 171, 153, 231],
    [105, 45, 15, 21, 136],
    [210, 66, 253, 120, 78],
];

const RC: [u64; NUM_ROUNDS] = [
    0x0000000000000001,
    0x0000000000008082,
    0x800000000000808a,
    0x8000000080008000,
    0x000000000000808b,
    0x0000000080000001,
    0x8000000080008081,
    0x8000000000008009,
    0x000000000000008a,
    0x0000000000000088,
    0x0000000080008009,
    0x000000008000000a,
    0x000000008000808b,
    0x800000000000008b,
    0x8000000000008089,
    0x8000000000008003,
    0x8000000000008002,
    0x8000000000000080,
    0x000000000000800a,
    0x800000008000000a,
    0x8000000080008081,
    0x8000000000008080,
    0x0000000080000001,
    0x8000000080008008,
];

/// Streaming Keccak sponge shared by all four SHA-3 variants, parameterized
/// over the rate `R` (bytes absorbed/squeezed per permutation) and digest
/// size `D` (both in bytes). `R` is also the maximum number of bytes of
/// pending input buffered between calls to [`update`](Sha3::update).
#[derive(Debug, Clone)]
struct Sha3<const R: usize, const D: usize> {
    state: State,
    buf: [u8; R],
    buf_len: usize,
}

impl<const R: usize, const D: usize> Default for Sha3<R, D> {
    fn default() -> Self {
        Self { state: State::default(), buf: [0; R], buf_len: 0 }
    }
}

impl<const R: usize, const D: usize> Sha3<R, D> {
    fn absorb_block(&mut self, block: &[u8; R]) {
        block
            .chunks_exact(8)
            .zip(self.state.iter_mut().flatten())
            .for_each(|(b, lane)| *lane ^= u64::from_le_bytes(b.try_into().unwrap()));
        keccak_p(&mut self.state);
    }

    fn update(&mut self, mut data: &[u8]) {
        if self.buf_len > 0 {
            let want = R - self.buf_len;
            let take = want.min(data.len());
            self.buf[self.buf_len..self.buf_len + take].copy_from_slice(&data[..take]);
            self.buf_len += take;
            data = &data[take..];
            if self.buf_len == R {
                let block = self.buf;
                self.absorb_block(&block);
                self.buf_len = 0;
            }
        }
        while data.len() >= R {
            let block: [u8; R] = data[..R].try_into().unwrap();
            self.absorb_block(&block);
            data = &data[R..];
        }
        self.buf[..data.len()].copy_from_slice(data);
        self.buf_len = data.len();
    }

    fn finalize(&mut self) -> [u8; D] {
        // pad10*1: a domain-separated `1` bit (the `01` SHA-3 suffix
        // combined with the sponge's mandatory leading `1`, packed into the
        // byte as `0b00000110`), as many zero bits as needed, then a
        // trailing `1` bit in the last bit of the block.
        let mut block = [0u8; R];
        block[..self.buf_len].copy_from_slice(&self.buf[..self.buf_len]);
        block[self.buf_len] |= 0b0000_0110;
        block[R - 1] |= 0b1000_0000;
        self.absorb_block(&block);

        let mut output = [0u8; D];
        self.state
            .iter()
            .flatten()
            .flat_map(|lane| lane.to_le_bytes())
            .zip(output.iter_mut())
            .for_each(|(s, r)| *r = s);
        *self = Self::default();
        output
    }
}

fn keccak_p(state: &mut State) {
    for ir in 0..NUM_ROUNDS {
        theta(state);
        rho(state);
        pi(state);
        chi(state);
        iota(state, ir);
    }
}

#[allow(clippy::needless_range_loop)]
fn theta(state: &mut State) {
    let mut c = [0u64; NUM_COLS];
    for y in 0..NUM_ROWS {
        for x in 0..NUM_COLS {
            c[x] ^= state[y][x];
        }
    }

    for y in 0..NUM_ROWS {
        for x in 0..NUM_COLS {
            state[y][x] ^= c[if x == 0 { NUM_COLS - 1 } else { x - 1 }];
            state[y][x] ^= c[(x + 1) % NUM_COLS].rotate_left(1);
        }
    }
}

#[allow(clippy::needless_range_loop)]
fn rho(state: &mut State) {
    for y in 0..NUM_ROWS {
        for x in 0..NUM_COLS {
            state[y][x] = state[y][x].rotate_left(RHO_OFFSETS[y][x]);
        }
    }
}

#[allow(clippy::needless_range_loop)]
fn pi(state: &mut State) {
    let copy = *state;
    for y in 0..NUM_ROWS {
        for x in 0..NUM_COLS {
            state[y][x] = copy[x][(x + 3 * y) % NUM_COLS];
        }
    }
}

#[allow(clippy::needless_range_loop)]
fn chi(state: &mut State) {
    let copy = *state;
    for y in 0..NUM_ROWS {
        for x in 0..NUM_COLS {
            state[y][x] = copy[y][x] ^ (!copy[y][(x + 1) % NUM_ROWS] & copy[y][(x + 2) % NUM_ROWS]);
        }
    }
}

fn iota(state: &mut State, ir: usize) {
    state[0][0] ^= RC[ir];
}

macro_rules! sha3_variant {
    ($name:ident, $rate:expr, $digest:expr, $reg:expr, $oid:expr, $vector_msg:expr, $vector_hex:expr) => {
        #[doc = concat!(stringify!($name), ", a SHA-3 instance with a ", stringify!($digest), "-byte digest.")]
        #[derive(Debug, Clone, Default)]
        pub struct $name(Sha3<$rate, $digest>);

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }
        }

        impl Hash for $name {
            fn name(&self) -> &'static str {
                $reg
            }

            fn digest_size(&self) -> usize {
                $digest
            }

            fn block_size(&self) -> usize {
                $rate
            }

            fn der_oid(&self) -> &'static [u32] {
                $oid
            }

            fn update(&mut self, data: &[u8]) {
                self.0.update(data);
            }

            fn finalize(&mut self) -> Vec<u8> {
                self.0.finalize().to_vec()
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

sha3_variant!(
    Sha3_224,
    144,
    28,
    "sha3-224",
    // id-sha3-224, 2.16.840.1.101.3.4.2.7
    &[2, 16, 840, 1, 101, 3, 4, 2, 7],
    b"",
    "6b4e03423667dbb73b6e15454f0eb1abd4597f9ca4888fa91c79ae0"
);

sha3_variant!(
    Sha3_256,
    136,
    32,
    "sha3-256",
    // id-sha3-256, 2.16.840.1.101.3.4.2.8
    &[2, 16, 840, 1, 101, 3, 4, 2, 8],
    b"",
    "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
);

sha3_variant!(
    Sha3_384,
    104,
    48,
    "sha3-384",
    // id-sha3-384, 2.16.840.1.101.3.4.2.9
    &[2, 16, 840, 1, 101, 3, 4, 2, 9],
    b"",
    "0c63a75b845e4f7d01107d852e4c2485c51a50aaaa94fc61995e71bbee983a2ac3713831264adb47fb6bd1e058d5f004"
);

sha3_variant!(
    Sha3_512,
    72,
    64,
    "sha3-512",
    // id-sha3-512, 2.16.840.1.101.3.4.2.10
    &[2, 16, 840, 1, 101, 3, 4, 2, 10],
    b"",
    "a69f73cca23a9ac5c8b567dc185a756e97c982164fe25859e0d1dcc1475c80a615b2123af1f5f94c11e3e9402c3ac558f500199d95b6d3e301758586281dcd26"
);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rc_table_matches_generated() {
        assert_eq!(RC, rctable::rctable());
    }

    #[test]
    fn sha3_256_empty() {
        let mut h = Sha3_256::new();
        assert_eq!(
            hex::encode(h.hash(b"")),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }

    #[test]
    fn sha3_224_empty() {
        let mut h = Sha3_224::new();
        assert_eq!(
            hex::encode(h.hash(b"")),
            "6b4e03423667dbb73b6e15454f0eb1abd4597f9ca4888fa91c79ae0"
        );
    }

    #[test]
    fn split_update_matches_one_shot() {
        let msg = b"The quick brown fox jumps over the lazy dog";
        let mut one_shot = Sha3_256::new();
        let whole = one_shot.hash(msg);

        let mut split = Sha3_256::new();
        split.update(&msg[..20]);
        split.update(&msg[20..]);
        assert_eq!(split.finalize(), whole);
    }

    #[test]
    fn self_tests_pass() {
        Sha3_224::new().self_test().unwrap();
        Sha3_256::new().self_test().unwrap();
        Sha3_384::new().self_test().unwrap();
        Sha3_512::new().self_test().unwrap();
    }
}
