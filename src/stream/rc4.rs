//! RC4 (Rivest, 1987, published 1994): an 8-bit byte-at-a-time permutation
//! cipher. Listed here for compatibility (legacy PEM/SSH payloads and
//! libtomcrypt's own `rc4` PRNG share this exact keystream), not for new
//! designs -- RC4's keystream is distinguishably biased and it has no
//! notion of a nonce.

use crate::stream::{StreamCipher, StreamState};

pub struct Rc4State {
    s: [u8; 256],
    i: u8,
    j: u8,
}

impl Rc4State {
    fn new(key: &[u8]) -> Self {
        let mut s: [u8; 256] = core::array::from_fn(|i| i as u8);
        let mut j = 0u8;
        for i in 0..256 {
            j = j.wrapping_add(s[i]).wrapping_add(key[i % key.len()]);
            s.swap(i, j as usize);
        }
        Self { s, i: 0, j: 0 }
    }

    fn next_byte(&mut self) -> u8 {
        self.i = self.i.wrapping_add(1);
        self.j = self.j.wrapping_add(self.s[self.i as usize]);
        self.s.swap(self.i as usize, self.j as usize);
        let t = self.s[self.i as usize].wrapping_add(self.s[self.j as usize]);
        self.s[t as usize]
    }
}

impl StreamState for Rc4State {
    fn crypt(&mut self, input: &[u8], output: &mut [u8]) {
        for (i, o) in input.iter().zip(output.iter_mut()) {
            *o = i ^ self.next_byte();
        }
    }
}

/// RC4 has no IV/nonce concept; `setup`'s `iv` parameter is ignored (spec
/// §4.8 lists RC4 among PRNGs for the same reason -- it's keyed once and
/// then just runs).
pub struct Rc4;

impl StreamCipher for Rc4 {
    fn name(&self) -> &'static str {
        "rc4"
    }

    fn setup(&self, key: &[u8], _iv: &[u8]) -> crate::error::Result<Box<dyn StreamState>> {
        if key.is_empty() || key.len() > 256 {
            return Err(crate::error::Error::InvalidKeySize { got: key.len(), valid: &[] });
        }
        Ok(Box::new(Rc4State::new(key)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rfc6229_key_40_bit_first_bytes() {
        // RFC 6229 §2, 40-bit key "0102030405", keystream offset 0.
        let key = [0x01, 0x02, 0x03, 0x04, 0x05];
        let mut s = Rc4::new_state(&key);
        let mut out = [0u8; 16];
        s.crypt(&[0u8; 16], &mut out);
        assert_eq!(hex::encode(out), "b2396305f03dc027ccc3524a0a1118a8");
    }

    #[test]
    fn roundtrips() {
        let key = b"secret key";
        let pt = b"rc4 is a legacy stream cipher kept for compatibility";
        let mut ct = vec![0u8; pt.len()];
        Rc4.setup(key, &[]).unwrap().crypt(pt, &mut ct);
        let mut back = vec![0u8; pt.len()];
        Rc4.setup(key, &[]).unwrap().crypt(&ct, &mut back);
        assert_eq!(pt.to_vec(), back);
    }
}

impl Rc4 {
    /// Convenience constructor used by the PRNG wrapper ([`crate::random::Rc4Prng`])
    /// and by the test above, bypassing the `StreamCipher` trait object
    /// indirection when the concrete type is already known.
    pub fn new_state(key: &[u8]) -> Rc4State {
        Rc4State::new(key)
    }
}
