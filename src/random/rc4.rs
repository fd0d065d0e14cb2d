//! RC4 used as a PRNG: the stream cipher keyed from pooled
//! entropy, generating output as its keystream.
//!
//! RC4 is included here only for legacy interop; it is a poor choice for
//! new designs (biased early keystream bytes) and this crate reaches for
//! [`crate::random::Fortuna`] or [`crate::random::ChaCha20Prng`] in its own
//! `with_defaults` registration.

use crate::{
    error::{Error, Result},
    random::Prng,
    stream::{
        rc4::{Rc4, Rc4State},
        StreamState,
    },
};

pub struct Rc4Prng {
    pool: Vec<u8>,
    state: Option<Rc4State>,
}

impl Default for Rc4Prng {
    fn default() -> Self {
        Self::new()
    }
}

impl Rc4Prng {
    pub fn new() -> Self {
        Self { pool: Vec::new(), state: None }
    }
}

impl Prng for Rc4Prng {
    fn name(&self) -> &'static str {
        "rc4"
    }

    fn export_size(&self) -> usize {
        32
    }

    fn add_entropy(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(Error::InvalidArg("rc4prng: empty entropy sample"));
        }
        self.pool.extend_from_slice(data);
        Ok(())
    }

    fn ready(&mut self) -> Result<()> {
        if self.pool.is_empty() {
            return Err(Error::ErrorReadPrng("rc4prng: no entropy added before ready"));
        }
        self.state = Some(Rc4::new_state(&self.pool));
        self.pool.clear();
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let Some(state) = self.state.as_mut() else {
            return 0;
        };
        let zero = vec![0u8; buf.len()];
        state.crypt(&zero, buf);
        buf.len()
    }

    fn done(&mut self) {
        crate::util::zeromem(&mut self.pool);
        self.state = None;
    }

    fn export(&self) -> Vec<u8> {
        vec![0u8; self.export_size()]
    }

    fn import(&mut self, _data: &[u8]) -> Result<()> {
        Err(Error::InvalidPrngSize)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn basic_contract() {
        let mut p = Rc4Prng::new();
        p.add_entropy(&[5u8; 16]).unwrap();
        p.ready().unwrap();
        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        p.read(&mut a);
        p.read(&mut b);
        assert_ne!(a, b);
    }
}
