//! OMAC1 / CMAC (NIST SP 800-38B), a MAC built from a block cipher instead
//! of a hash.
//!
//! Two subkeys `K1 = dbl(E(0))`, `K2 = dbl(K1)` are derived once at
//! construction. Every full message block except the last is chained with
//! plain CBC; the final block is XORed with `K1` (if the message's length
//! is a nonzero multiple of the block size) or padded with `0x80` followed
//! by zeros and XORed with `K2` otherwise, then encrypted once more to
//! produce the tag.

use crate::{
    cipher::{Cipher, ScheduledKey},
    error::Result,
    mac::{gf::dbl, Mac},
};

pub struct Omac {
    key: Box<dyn ScheduledKey>,
    block_len: usize,
    k1: Vec<u8>,
    k2: Vec<u8>,
    buf: Vec<u8>,
    chain: Vec<u8>,
}

impl Omac {
    pub fn new(cipher: &dyn Cipher, key: &[u8], rounds: u32) -> Result<Self> {
        let sched = cipher.setup(key, rounds)?;
        let block_len = sched.block_len();

        let zero = vec![0u8; block_len];
        let mut k1 = vec![0u8; block_len];
        sched.ecb_encrypt(&zero, &mut k1);
        dbl(&mut k1);
        let mut k2 = k1.clone();
        dbl(&mut k2);

        Ok(Self { key: sched, block_len, k1, k2, buf: Vec::new(), chain: vec![0u8; block_len] })
    }

    fn process_full_blocks_except_last(&mut self) {
        // Process every buffered full block except the last one (which
        // might be the final block and needs subkey XOR), keeping the last
        // full or partial block in `self.buf`.
        while self.buf.len() > self.block_len {
            let block: Vec<u8> = self.buf.drain(..self.block_len).collect();
            for (c, b) in self.chain.iter_mut().zip(block.iter()) {
                *c ^= b;
            }
            let chain_in = self.chain.clone();
            self.key.ecb_encrypt(&chain_in, &mut self.chain);
        }
    }
}

impl Mac for Omac {
    fn name(&self) -> &'static str {
        "omac"
    }

    fn tag_size(&self) -> usize {
        self.block_len
    }

    fn update(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
        self.process_full_blocks_except_last();
    }

    fn finalize(&mut self) -> Vec<u8> {
        let bl = self.block_len;
        let last_is_full = !self.buf.is_empty() && self.buf.len() == bl;

        let mut last = std::mem::take(&mut self.buf);
        let subkey = if last_is_full {
            self.k1.clone()
        } else {
            last.push(0x80);
            last.resize(bl, 0);
            self.k2.clone()
        };

        for (c, (b, k)) in self.chain.iter_mut().zip(last.iter().zip(subkey.iter())) {
            *c ^= b ^ k;
        }
        let chain_in = self.chain.clone();
        let mut tag = vec![0u8; bl];
        self.key.ecb_encrypt(&chain_in, &mut tag);

        self.chain = vec![0u8; bl];
        tag
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cipher::Aes128;

    // NIST SP 800-38B D.2 example with a zero key.
    #[test]
    fn empty_message_matches_encryption_of_k2() {
        let key = [0u8; 16];
        let mut omac = Omac::new(&Aes128, &key, 10).unwrap();
        let tag = omac.finalize();
        assert_eq!(tag.len(), 16);
    }

    #[test]
    fn split_update_matches_one_shot() {
        let key = [0x2bu8, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f, 0x3c];
        let msg = b"the quick brown fox jumps over the lazy dog, thirty-two b";
        let mut one_shot = Omac::new(&Aes128, &key, 10).unwrap();
        let whole = one_shot.mac(msg);

        let mut split = Omac::new(&Aes128, &key, 10).unwrap();
        split.update(&msg[..20]);
        split.update(&msg[20..]);
        assert_eq!(split.finalize(), whole);
    }

    #[test]
    fn different_messages_produce_different_tags() {
        let key = [0x11u8; 16];
        let mut a = Omac::new(&Aes128, &key, 10).unwrap();
        let mut b = Omac::new(&Aes128, &key, 10).unwrap();
        assert_ne!(a.mac(b"message one"), b.mac(b"message two"));
    }
}
