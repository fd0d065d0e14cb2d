//! Sober-128 used as a PRNG: the stream cipher keyed from
//! pooled entropy, generating output the same way it would generate a
//! keystream to encrypt a message.

use crate::{
    error::{Error, Result},
    random::Prng,
    stream::{sober128::Sober128, StreamCipher, StreamState},
};

pub struct Sober128Prng {
    pool: Vec<u8>,
    state: Option<Box<dyn StreamState>>,
}

impl Default for Sober128Prng {
    fn default() -> Self {
        Self::new()
    }
}

impl Sober128Prng {
    pub fn new() -> Self {
        Self { pool: Vec::new(), state: None }
    }
}

impl Prng for Sober128Prng {
    fn name(&self) -> &'static str {
        "sober128"
    }

    fn export_size(&self) -> usize {
        32
    }

    fn add_entropy(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(Error::InvalidArg("sober128prng: empty entropy sample"));
        }
        self.pool.extend_from_slice(data);
        Ok(())
    }

    fn ready(&mut self) -> Result<()> {
        if self.pool.len() < 16 {
            return Err(Error::ErrorReadPrng("sober128prng: need at least 16 bytes of pooled entropy"));
        }
        let mut key = self.pool.clone();
        key.resize(((key.len() + 3) / 4) * 4, 0);
        self.state = Some(Sober128.setup(&key, &[]).map_err(|_| Error::ErrorReadPrng("sober128prng: key setup failed"))?);
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
        let mut p = Sober128Prng::new();
        p.add_entropy(&[3u8; 32]).unwrap();
        p.ready().unwrap();
        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        p.read(&mut a);
        p.read(&mut b);
        assert_ne!(a, b);
    }
}
