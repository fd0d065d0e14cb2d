//! `sprng`: a thin wrapper around the operating system's entropy source,
//! for callers who want "just give me secure random bytes" without
//! managing a pool/reseed lifecycle. `add_entropy`/`ready`
//! are accepted but have no effect -- the OS is always already seeded.

use crate::{
    error::Result,
    random::Prng,
};

pub struct SystemPrng;

impl Default for SystemPrng {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemPrng {
    pub fn new() -> Self {
        Self
    }
}

impl Prng for SystemPrng {
    fn name(&self) -> &'static str {
        "sprng"
    }

    fn export_size(&self) -> usize {
        0
    }

    fn add_entropy(&mut self, _data: &[u8]) -> Result<()> {
        Ok(())
    }

    fn ready(&mut self) -> Result<()> {
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        use rand::RngCore;
        rand::rngs::OsRng.fill_bytes(buf);
        buf.len()
    }

    fn done(&mut self) {}

    fn export(&self) -> Vec<u8> {
        Vec::new()
    }

    fn import(&mut self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn produces_distinct_reads() {
        let mut p = SystemPrng::new();
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        assert_eq!(p.read(&mut a), 32);
        assert_eq!(p.read(&mut b), 32);
        assert_ne!(a, b);
    }
}
