//! ChaCha20-PRNG: a 40-byte seed XORed directly into the cipher state,
//! rekeyed on every `add_entropy` by XORing fresh entropy into the
//! current keystream output.

use crate::{
    error::{Error, Result},
    random::Prng,
    stream::{chacha::ChaCha20, StreamCipher, StreamState},
};

const SEED_SIZE: usize = 40; // 32-byte key + 8-byte nonce prefix (RFC 8439 uses a 12-byte nonce; 4 bytes stay fixed at zero).

pub struct ChaCha20Prng {
    key: [u8; 32],
    nonce: [u8; 12],
    state: Option<Box<dyn StreamState>>,
    seeded: bool,
}

impl Default for ChaCha20Prng {
    fn default() -> Self {
        Self::new()
    }
}

impl ChaCha20Prng {
    pub fn new() -> Self {
        Self { key: [0u8; 32], nonce: [0u8; 12], state: None, seeded: false }
    }

    fn rekey(&mut self) {
        self.state = Some(ChaCha20.setup(&self.key, &self.nonce).expect("fixed-size chacha20 key/nonce always valid"));
    }
}

impl Prng for ChaCha20Prng {
    fn name(&self) -> &'static str {
        "chacha20prng"
    }

    fn export_size(&self) -> usize {
        32 + 12
    }

    fn add_entropy(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(Error::InvalidArg("chacha20prng: empty entropy sample"));
        }
        if !self.seeded {
            if data.len() < SEED_SIZE {
                return Err(Error::InvalidArg("chacha20prng: initial seed must be at least 40 bytes"));
            }
            self.key.copy_from_slice(&data[..32]);
            self.nonce[..8].copy_from_slice(&data[32..40]);
            self.seeded = true;
            self.rekey();
            return Ok(());
        }

        // Rekey on every subsequent add_entropy call by XORing the sample
        // into a block of fresh keystream output.
        let state = self.state.as_mut().expect("seeded implies a primed state");
        let mut ks = [0u8; 32];
        state.crypt(&[0u8; 32], &mut ks);
        for (i, k) in ks.iter_mut().enumerate() {
            *k ^= data[i % data.len()];
        }
        self.key = ks;
        self.rekey();
        Ok(())
    }

    fn ready(&mut self) -> Result<()> {
        if !self.seeded {
            return Err(Error::ErrorReadPrng("chacha20prng: not yet seeded"));
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        if !self.seeded {
            return 0;
        }
        let state = self.state.as_mut().expect("seeded implies a primed state");
        let zero = vec![0u8; buf.len()];
        state.crypt(&zero, buf);
        buf.len()
    }

    fn done(&mut self) {
        crate::util::zeromem(&mut self.key);
        crate::util::zeromem(&mut self.nonce);
        self.state = None;
        self.seeded = false;
    }

    fn export(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.export_size());
        out.extend_from_slice(&self.key);
        out.extend_from_slice(&self.nonce);
        out
    }

    fn import(&mut self, data: &[u8]) -> Result<()> {
        if data.len() != self.export_size() {
            return Err(Error::InvalidPrngSize);
        }
        self.key.copy_from_slice(&data[..32]);
        self.nonce.copy_from_slice(&data[32..]);
        self.seeded = true;
        self.rekey();
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn basic_contract() {
        let mut p = ChaCha20Prng::new();
        p.add_entropy(&[9u8; SEED_SIZE]).unwrap();
        p.ready().unwrap();
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        p.read(&mut a);
        p.read(&mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn too_short_initial_seed_rejected() {
        let mut p = ChaCha20Prng::new();
        assert!(p.add_entropy(&[1u8; 10]).is_err());
    }
}
