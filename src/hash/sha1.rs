//! SHA-1, specified by [FIPS
//! 180-4](https://nvlpubs.nist.gov/nistpubs/FIPS/NIST.FIPS.180-4.pdf).
//!
//! SHA-1 is a weak hash function with known collision attacks and is kept
//! here only for legacy PEM/PBKDF1 compatibility; prefer SHA-256 or better
//! for anything new. See the [module documentation](super) for the shared
//! Merkle-Damgard/Davies-Meyer framing.

use {
    crate::{error::Result, hash::Hash},
    docext::docext,
};

const BLOCK_BYTES: usize = 64;
const DIGEST_BYTES: usize = 20;

type State = [u32; 5];

const H0: State = [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476, 0xc3d2e1f0];

/// Streaming SHA-1 state machine.
#[derive(Debug, Clone)]
pub struct Sha1 {
    state: State,
    buf: [u8; BLOCK_BYTES],
    buf_len: usize,
    total_len: u64,
}

impl Default for Sha1 {
    fn default() -> Self {
        Self { state: H0, buf: [0; BLOCK_BYTES], buf_len: 0, total_len: 0 }
    }
}

impl Sha1 {
    pub fn new() -> Self {
        Self::default()
    }

    fn compress(&mut self) {
        let block = self.buf;
        self.state = shacal1(self.state, &block);
    }

    // Like `update`, but used internally by `finalize` for the padding
    // bytes, which are already known to fit within at most two blocks.
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

impl Hash for Sha1 {
    fn name(&self) -> &'static str {
        "sha1"
    }

    fn digest_size(&self) -> usize {
        DIGEST_BYTES
    }

    fn block_size(&self) -> usize {
        BLOCK_BYTES
    }

    fn der_oid(&self) -> &'static [u32] {
        // id-sha1, 1.3.14.3.2.26
        &[1, 3, 14, 3, 2, 26]
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
        pad[pad_len - 8..pad_len].copy_from_slice(&bit_len.to_be_bytes());
        self.update_raw(&pad[..pad_len]);

        let digest = self.state.into_iter().flat_map(u32::to_be_bytes).collect();
        *self = Self::default();
        digest
    }

    fn self_test(&mut self) -> Result<()> {
        let digest = self.hash(b"abc");
        if digest != hex::decode("a9993e364706816aba3e25717850c26c9cd0d89").unwrap() {
            return Err(crate::error::Error::FailTestVector("sha1"));
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn Hash> {
        Box::new(self.clone())
    }
}

/// The SHACAL-1 block cipher used internally by SHA-1.
///
/// Applies 80 rounds of the following permutation, where $a, b, c, \dots$
/// represent the current state in 32-bit words, $W_i$ is the message
/// schedule (described below), [$f_t$](ft) is a helper function, [$K_t$](kt)
/// are the round constants, and $\mathrm{ROTL}$ is bitwise left rotation:
///
/// $$
/// T = \mathrm{ROTL}(a, 5) + f_t(b, c, d) + e + K_t + W_0 \pmod{2^{32}}\\
/// e \gets d\\
/// d \gets c\\
/// c \gets \mathrm{ROTL}(b, 30)\\
/// b \gets a\\
/// a \gets T\\
/// $$
///
/// The message schedule $W$ is a 16 element array of 32-bit words,
/// initialized to the current preimage block and updated at the end of each
/// round:
///
/// $$
/// T = \mathrm{ROTL}(W_{13} \oplus W_8 \oplus W_2 \oplus W_0, 1)\\
/// W_i \gets W_{i + 1}, \forall i \in \{0, 1, \dots, 14\}\\
/// W_{15} \gets T
/// $$
///
/// The resulting state is combined with the chaining value by modular
/// addition (the Davies-Meyer step).
#[docext]
fn shacal1(state: State, block: &[u8; BLOCK_BYTES]) -> State {
    let mut schedule = [0u32; 16];
    schedule
        .iter_mut()
        .zip(block.chunks_exact(4))
        .for_each(|(s, b)| *s = u32::from_be_bytes(b.try_into().unwrap()));

    let [mut a, mut b, mut c, mut d, mut e] = state;
    for t in 0..80u32 {
        let wt = schedule[0];
        let temp = a
            .rotate_left(5)
            .wrapping_add(ft(t, b, c, d))
            .wrapping_add(e)
            .wrapping_add(kt(t))
            .wrapping_add(wt);
        e = d;
        d = c;
        c = b.rotate_left(30);
        b = a;
        a = temp;

        let next = (schedule[13] ^ schedule[8] ^ schedule[2] ^ schedule[0]).rotate_left(1);
        schedule.rotate_left(1);
        schedule[15] = next;
    }

    [
        state[0].wrapping_add(a),
        state[1].wrapping_add(b),
        state[2].wrapping_add(c),
        state[3].wrapping_add(d),
        state[4].wrapping_add(e),
    ]
}

/// Helper function $f_t$, using [$Ch$](ch), [$Maj$](maj), and
/// [$Parity$](parity):
///
/// $$
/// f_t(x, y, z) =
/// \begin{cases}
/// Ch(x, y, z) & 0 \le t < 20\\
/// Maj(x, y, z) & 40 \le t < 60\\
/// Parity(x, y, z) & otherwise \\
/// \end{cases}
/// $$
#[docext]
fn ft(t: u32, x: u32, y: u32, z: u32) -> u32 {
    match t {
        0..=19 => ch(x, y, z),
        40..=59 => maj(x, y, z),
        _ => parity(x, y, z),
    }
}

/// Round constant $K_t$.
#[docext]
fn kt(t: u32) -> u32 {
    match t {
        0..=19 => 0x5a827999,
        20..=39 => 0x6ed9eba1,
        40..=59 => 0x8f1bbcdc,
        _ => 0xca62c1d6,
    }
}

fn ch(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ ((!x) & z)
}

fn maj(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (x & z) ^ (y & z)
}

fn parity(x: u32, y: u32, z: u32) -> u32 {
    x ^ y ^ z
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_string() {
        let mut h = Sha1::new();
        assert_eq!(hex::encode(h.hash(b"")), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn abc() {
        let mut h = Sha1::new();
        assert_eq!(hex::encode(h.hash(b"abc")), "a9993e364706816aba3e25717850c26c9cd0d89");
    }

    #[test]
    fn split_update_matches_one_shot() {
        let msg = b"The quick brown fox jumps over the lazy dog";
        let mut one_shot = Sha1::new();
        let whole = one_shot.hash(msg);

        let mut split = Sha1::new();
        split.update(&msg[..10]);
        split.update(&msg[10..]);
        assert_eq!(split.finalize(), whole);
    }

    #[test]
    fn self_test_passes() {
        Sha1::new().self_test().unwrap();
    }
}
