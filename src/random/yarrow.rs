//! Yarrow (Kelsey, Schneier, Ferguson): a single entropy pool hashed to
//! produce a fresh key on every explicit reseed, with generation done by
//! running a block cipher in CTR mode seeded from that key.
//!
//! Simpler than [`crate::random::Fortuna`]'s 32-pool design -- Yarrow
//! reseeds whenever the caller calls `add_entropy` followed by `ready`,
//! with no automatic pool rotation or reseed-counter gating.

use crate::{
    cipher::{block::Aes256, Cipher},
    error::{Error, Result},
    hash::{Hash, Sha256},
    random::Prng,
};

const KEY_SIZE: usize = 32;

pub struct Yarrow {
    pool: Vec<u8>,
    key: [u8; KEY_SIZE],
    counter: [u8; 16],
    seeded: bool,
}

impl Default for Yarrow {
    fn default() -> Self {
        Self::new()
    }
}

impl Yarrow {
    pub fn new() -> Self {
        Self { pool: Vec::new(), key: [0u8; KEY_SIZE], counter: [0u8; 16], seeded: false }
    }
}

impl Prng for Yarrow {
    fn name(&self) -> &'static str {
        "yarrow"
    }

    fn export_size(&self) -> usize {
        KEY_SIZE + 16
    }

    fn add_entropy(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(Error::InvalidArg("yarrow: empty entropy sample"));
        }
        self.pool.extend_from_slice(data);
        Ok(())
    }

    fn ready(&mut self) -> Result<()> {
        if self.pool.is_empty() {
            return Err(Error::ErrorReadPrng("yarrow: no entropy added before ready"));
        }
        let mut seed_material = self.key.to_vec();
        seed_material.extend_from_slice(&self.pool);
        self.pool.clear();

        let mut hash = Sha256::new();
        let digest = hash.hash(&seed_material);
        self.key.copy_from_slice(&digest);
        self.counter = [0u8; 16];
        self.seeded = true;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        if !self.seeded {
            return 0;
        }
        let sched = Aes256.setup(&self.key, 14).expect("AES-256 key is always valid");
        for chunk in buf.chunks_mut(16) {
            let mut pad = [0u8; 16];
            sched.ecb_encrypt(&self.counter, &mut pad);
            for byte in self.counter.iter_mut() {
                *byte = byte.wrapping_add(1);
                if *byte != 0 {
                    break;
                }
            }
            chunk.copy_from_slice(&pad[..chunk.len()]);
        }
        buf.len()
    }

    fn done(&mut self) {
        crate::util::zeromem(&mut self.key);
        crate::util::zeromem(&mut self.counter);
        crate::util::zeromem(&mut self.pool);
        self.seeded = false;
    }

    fn export(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.export_size());
        out.extend_from_slice(&self.key);
        out.extend_from_slice(&self.counter);
        out
    }

    fn import(&mut self, data: &[u8]) -> Result<()> {
        if data.len() != self.export_size() {
            return Err(Error::InvalidPrngSize);
        }
        self.key.copy_from_slice(&data[..KEY_SIZE]);
        self.counter.copy_from_slice(&data[KEY_SIZE..]);
        self.seeded = true;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn basic_contract() {
        crate::random::test::exercise_basic_contract(&mut Yarrow::new());
    }

    #[test]
    fn ready_without_entropy_fails() {
        assert!(Yarrow::new().ready().is_err());
    }
}
