use {
    super::MAX_BLOCK_SIZE,
    crate::{
        cipher::{Cipher, ScheduledKey},
        error::Result,
        util::zeromem,
    },
};

/// Output feedback mode: `pad = E(IV)`; each byte XORs the next
/// pad byte with the input, and the pad is refilled via `pad = E(pad)` once
/// exhausted -- unlike CFB, the feedback never depends on plaintext or
/// ciphertext, so OFB's keystream can be precomputed independent of the
/// message.
pub struct Ofb {
    key: Box<dyn ScheduledKey>,
    block_len: usize,
    pad: [u8; MAX_BLOCK_SIZE],
    pad_offset: usize,
}

impl Drop for Ofb {
    fn drop(&mut self) {
        zeromem(&mut self.pad);
    }
}

impl Ofb {
    pub fn start(cipher: &dyn Cipher, iv: &[u8], key: &[u8], rounds: u32) -> Result<Self> {
        let sched = cipher.setup(key, rounds)?;
        let block_len = sched.block_len();
        let mut pad = [0u8; MAX_BLOCK_SIZE];
        pad[..block_len].copy_from_slice(&iv[..block_len]);
        Ok(Self { key: sched, block_len, pad, pad_offset: block_len })
    }

    fn xor_stream(&mut self, input: &[u8], output: &mut [u8]) {
        let bl = self.block_len;
        for (i, o) in input.iter().zip(output.iter_mut()) {
            if self.pad_offset == bl {
                let prev = self.pad[..bl].to_vec();
                self.key.ecb_encrypt(&prev, &mut self.pad[..bl]);
                self.pad_offset = 0;
            }
            *o = i ^ self.pad[self.pad_offset];
            self.pad_offset += 1;
        }
    }

    pub fn encrypt(&mut self, pt: &[u8], ct: &mut [u8]) {
        self.xor_stream(pt, ct);
    }

    pub fn decrypt(&mut self, ct: &[u8], pt: &mut [u8]) {
        self.xor_stream(ct, pt);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cipher::Aes128;

    #[test]
    fn ofb_roundtrips() {
        let key = [4u8; 16];
        let iv = [8u8; 16];
        let pt = b"stream ciphers don't need padding at all".to_vec();
        let mut ct = vec![0u8; pt.len()];
        Ofb::start(&Aes128, &iv, &key, 10).unwrap().encrypt(&pt, &mut ct);
        let mut back = vec![0u8; pt.len()];
        Ofb::start(&Aes128, &iv, &key, 10).unwrap().decrypt(&ct, &mut back);
        assert_eq!(pt, back);
    }

    #[test]
    fn ofb_is_symmetric_xor() {
        // encrypt(encrypt(x)) == x since OFB keystream doesn't depend on message
        let key = [4u8; 16];
        let iv = [8u8; 16];
        let pt = [9u8; 48];
        let mut ct = [0u8; 48];
        Ofb::start(&Aes128, &iv, &key, 10).unwrap().encrypt(&pt, &mut ct);
        let mut back = [0u8; 48];
        Ofb::start(&Aes128, &iv, &key, 10).unwrap().encrypt(&ct, &mut back);
        assert_eq!(pt, back);
    }
}
