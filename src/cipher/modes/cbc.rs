use {
    super::{check_block_aligned, xor_into, MAX_BLOCK_SIZE},
    crate::{
        cipher::{Cipher, ScheduledKey},
        error::Result,
        util::zeromem,
    },
};

/// Cipher block chaining: `ct_i = E(pt_i XOR prev)`, `prev =
/// ct_i`. Requires block-aligned input length.
pub struct Cbc {
    key: Box<dyn ScheduledKey>,
    block_len: usize,
    iv: [u8; MAX_BLOCK_SIZE],
}

impl Drop for Cbc {
    fn drop(&mut self) {
        zeromem(&mut self.iv);
    }
}

impl Cbc {
    pub fn start(cipher: &dyn Cipher, iv: &[u8], key: &[u8], rounds: u32) -> Result<Self> {
        let sched = cipher.setup(key, rounds)?;
        let block_len = sched.block_len();
        let mut iv_buf = [0u8; MAX_BLOCK_SIZE];
        iv_buf[..block_len].copy_from_slice(&iv[..block_len]);
        Ok(Self { key: sched, block_len, iv: iv_buf })
    }

    pub fn encrypt(&mut self, pt: &[u8], ct: &mut [u8]) -> Result<()> {
        check_block_aligned(pt.len(), self.block_len)?;
        let bl = self.block_len;
        for (p, c) in pt.chunks(bl).zip(ct.chunks_mut(bl)) {
            let mut block = p.to_vec();
            xor_into(&mut block, &self.iv[..bl]);
            self.key.ecb_encrypt(&block, c);
            self.iv[..bl].copy_from_slice(c);
        }
        Ok(())
    }

    pub fn decrypt(&mut self, ct: &[u8], pt: &mut [u8]) -> Result<()> {
        check_block_aligned(ct.len(), self.block_len)?;
        let bl = self.block_len;
        for (c, p) in ct.chunks(bl).zip(pt.chunks_mut(bl)) {
            self.key.ecb_decrypt(c, p);
            xor_into(p, &self.iv[..bl]);
            self.iv[..bl].copy_from_slice(c);
        }
        Ok(())
    }

    pub fn get_iv(&self) -> &[u8] {
        &self.iv[..self.block_len]
    }

    pub fn set_iv(&mut self, iv: &[u8]) {
        self.iv[..self.block_len].copy_from_slice(&iv[..self.block_len]);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cipher::Aes128;

    #[test]
    fn cbc_roundtrips() {
        let key = [0u8; 16];
        let iv = [1u8; 16];
        let pt = [7u8; 48];
        let mut ct = [0u8; 48];
        Cbc::start(&Aes128, &iv, &key, 10).unwrap().encrypt(&pt, &mut ct).unwrap();
        let mut back = [0u8; 48];
        Cbc::start(&Aes128, &iv, &key, 10).unwrap().decrypt(&ct, &mut back).unwrap();
        assert_eq!(pt, back);
    }

    #[test]
    fn cbc_differs_from_ecb_on_repeated_blocks() {
        let key = [0u8; 16];
        let iv = [9u8; 16];
        let pt = [3u8; 32]; // two identical 16-byte blocks
        let mut ct = [0u8; 32];
        Cbc::start(&Aes128, &iv, &key, 10).unwrap().encrypt(&pt, &mut ct).unwrap();
        assert_ne!(&ct[..16], &ct[16..]);
    }
}
