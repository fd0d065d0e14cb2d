//! ChaCha20 (RFC 8439 §2.3) and XChaCha20 (extended 24-byte-nonce variant
//! via the HChaCha20 subkey-derivation construction).

use crate::stream::{StreamCipher, StreamState};

const CONSTANTS: [u32; 4] = [0x61707865, 0x3320646e, 0x79622d32, 0x6b206574];

#[inline]
fn quarter_round(state: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    state[a] = state[a].wrapping_add(state[b]);
    state[d] ^= state[a];
    state[d] = state[d].rotate_left(16);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] ^= state[c];
    state[b] = state[b].rotate_left(12);

    state[a] = state[a].wrapping_add(state[b]);
    state[d] ^= state[a];
    state[d] = state[d].rotate_left(8);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] ^= state[c];
    state[b] = state[b].rotate_left(7);
}

fn block(initial: &[u32; 16], rounds: u32) -> [u32; 16] {
    let mut s = *initial;
    for _ in 0..rounds / 2 {
        quarter_round(&mut s, 0, 4, 8, 12);
        quarter_round(&mut s, 1, 5, 9, 13);
        quarter_round(&mut s, 2, 6, 10, 14);
        quarter_round(&mut s, 3, 7, 11, 15);
        quarter_round(&mut s, 0, 5, 10, 15);
        quarter_round(&mut s, 1, 6, 11, 12);
        quarter_round(&mut s, 2, 7, 8, 13);
        quarter_round(&mut s, 3, 4, 9, 14);
    }
    for i in 0..16 {
        s[i] = s[i].wrapping_add(initial[i]);
    }
    s
}

fn words_from_le_bytes(bytes: &[u8]) -> Vec<u32> {
    bytes.chunks_exact(4).map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect()
}

/// HChaCha20: derive a 32-byte subkey from a 32-byte key and a 16-byte
/// nonce prefix by running the ChaCha20 core with no final feed-forward
/// addition, keeping only the first and last rows of the output state
/// (the construction XChaCha20 uses to stretch its nonce to 24 bytes).
fn hchacha20(key: &[u8; 32], nonce16: &[u8; 16]) -> [u8; 32] {
    let kw = words_from_le_bytes(key);
    let nw = words_from_le_bytes(nonce16);
    let mut s = [0u32; 16];
    s[0..4].copy_from_slice(&CONSTANTS);
    s[4..12].copy_from_slice(&kw);
    s[12..16].copy_from_slice(&nw);

    for _ in 0..10 {
        quarter_round(&mut s, 0, 4, 8, 12);
        quarter_round(&mut s, 1, 5, 9, 13);
        quarter_round(&mut s, 2, 6, 10, 14);
        quarter_round(&mut s, 3, 7, 11, 15);
        quarter_round(&mut s, 0, 5, 10, 15);
        quarter_round(&mut s, 1, 6, 11, 12);
        quarter_round(&mut s, 2, 7, 8, 13);
        quarter_round(&mut s, 3, 4, 9, 14);
    }

    let mut out = [0u8; 32];
    for (i, w) in s[0..4].iter().chain(s[12..16].iter()).enumerate() {
        out[i * 4..i * 4 + 4].copy_from_slice(&w.to_le_bytes());
    }
    out
}

pub struct ChaCha20State {
    state: [u32; 16],
    keystream: [u8; 64],
    offset: usize,
}

impl ChaCha20State {
    fn new(key: &[u8], nonce12: &[u8], counter: u32) -> Self {
        let kw = words_from_le_bytes(key);
        let nw = words_from_le_bytes(nonce12);
        let mut state = [0u32; 16];
        state[0..4].copy_from_slice(&CONSTANTS);
        state[4..12].copy_from_slice(&kw);
        state[12] = counter;
        state[13..16].copy_from_slice(&nw);
        Self { state, keystream: [0; 64], offset: 64 }
    }
}

impl StreamState for ChaCha20State {
    fn crypt(&mut self, input: &[u8], output: &mut [u8]) {
        for (i, o) in input.iter().zip(output.iter_mut()) {
            if self.offset == 64 {
                let words = block(&self.state, 20);
                for (w, chunk) in words.iter().zip(self.keystream.chunks_exact_mut(4)) {
                    chunk.copy_from_slice(&w.to_le_bytes());
                }
                self.state[12] = self.state[12].wrapping_add(1);
                self.offset = 0;
            }
            *o = i ^ self.keystream[self.offset];
            self.offset += 1;
        }
    }
}

/// ChaCha20 with the IETF 96-bit nonce / 32-bit counter layout (RFC 8439).
pub struct ChaCha20;

impl StreamCipher for ChaCha20 {
    fn name(&self) -> &'static str {
        "chacha20"
    }

    fn setup(&self, key: &[u8], iv: &[u8]) -> crate::error::Result<Box<dyn StreamState>> {
        if key.len() != 32 || iv.len() != 12 {
            return Err(crate::error::Error::InvalidKeySize { got: key.len(), valid: &[32] });
        }
        Ok(Box::new(ChaCha20State::new(key, iv, 0)))
    }
}

impl ChaCha20 {
    /// Start at an explicit initial block counter, used by ChaCha20-Poly1305
    /// (RFC 8439 §2.8), which reserves block 0 for the Poly1305 key and
    /// encrypts starting from block 1.
    pub fn setup_with_counter(key: &[u8; 32], iv: &[u8; 12], counter: u32) -> ChaCha20State {
        ChaCha20State::new(key, iv, counter)
    }
}

/// XChaCha20: HChaCha20-derived subkey plus a 24-byte nonce, giving a
/// collision-safe random-nonce variant of ChaCha20.
pub struct XChaCha20;

impl StreamCipher for XChaCha20 {
    fn name(&self) -> &'static str {
        "xchacha20"
    }

    fn setup(&self, key: &[u8], iv: &[u8]) -> crate::error::Result<Box<dyn StreamState>> {
        if key.len() != 32 || iv.len() != 24 {
            return Err(crate::error::Error::InvalidKeySize { got: key.len(), valid: &[32] });
        }
        let mut key32 = [0u8; 32];
        key32.copy_from_slice(key);
        let mut nonce16 = [0u8; 16];
        nonce16.copy_from_slice(&iv[..16]);
        let subkey = hchacha20(&key32, &nonce16);

        let mut inner_nonce = [0u8; 12];
        inner_nonce[4..].copy_from_slice(&iv[16..24]);
        Ok(Box::new(ChaCha20State::new(&subkey, &inner_nonce, 0)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rfc8439_chacha20_block_counter_one() {
        // RFC 8439 §2.3.2 test vector.
        let key: [u8; 32] = core::array::from_fn(|i| i as u8);
        let nonce: [u8; 12] = [0, 0, 0, 0, 0, 0, 0, 0x4a, 0, 0, 0, 0];
        let mut s = ChaCha20::setup_with_counter(&key, &nonce, 1);
        let pt = b"Ladies and Gentlemen of the class of '99: If I could offer you only one tip for the future, sunscreen would be it.";
        let mut ct = vec![0u8; pt.len()];
        s.crypt(pt, &mut ct);
        assert_eq!(
            hex::encode(&ct[..16]),
            "6e2e359a2568f98041ba0728dd0d6981"
        );
    }

    #[test]
    fn encrypt_then_decrypt_roundtrips() {
        let key = [5u8; 32];
        let nonce = [9u8; 12];
        let pt = b"roundtrip check for chacha20 keystream cancellation property";
        let mut ct = vec![0u8; pt.len()];
        ChaCha20.setup(&key, &nonce).unwrap().crypt(pt, &mut ct);
        let mut back = vec![0u8; pt.len()];
        ChaCha20.setup(&key, &nonce).unwrap().crypt(&ct, &mut back);
        assert_eq!(pt.to_vec(), back);
    }

    #[test]
    fn xchacha20_roundtrips_with_24_byte_nonce() {
        let key = [1u8; 32];
        let nonce = [2u8; 24];
        let pt = b"xchacha20 extends the nonce space via hchacha20 subkeys";
        let mut ct = vec![0u8; pt.len()];
        XChaCha20.setup(&key, &nonce).unwrap().crypt(pt, &mut ct);
        let mut back = vec![0u8; pt.len()];
        XChaCha20.setup(&key, &nonce).unwrap().crypt(&ct, &mut back);
        assert_eq!(pt.to_vec(), back);
    }
}
