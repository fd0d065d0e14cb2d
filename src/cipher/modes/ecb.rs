use {
    super::check_block_aligned,
    crate::{
        cipher::{Cipher, ScheduledKey},
        error::Result,
    },
};

/// Electronic codebook mode: each block is encrypted/decrypted
/// independently. Input length must be a multiple of the block length;
/// callers needing to handle arbitrary-length messages apply a
/// [padding](crate::cipher::padding::Padding) scheme first.
///
/// ECB leaks repeated plaintext blocks as repeated ciphertext blocks and
/// should not be used for anything beyond single-block operations (e.g. as
/// the primitive underneath a mode like CTR) or interoperability with
/// legacy formats that require it.
pub struct Ecb {
    key: Box<dyn ScheduledKey>,
    block_len: usize,
}

impl Ecb {
    pub fn start(cipher: &dyn Cipher, key: &[u8], rounds: u32) -> Result<Self> {
        let sched = cipher.setup(key, rounds)?;
        let block_len = sched.block_len();
        Ok(Self { key: sched, block_len })
    }

    pub fn encrypt(&mut self, pt: &[u8], ct: &mut [u8]) -> Result<()> {
        check_block_aligned(pt.len(), self.block_len)?;
        for (p, c) in pt.chunks(self.block_len).zip(ct.chunks_mut(self.block_len)) {
            self.key.ecb_encrypt(p, c);
        }
        Ok(())
    }

    pub fn decrypt(&mut self, ct: &[u8], pt: &mut [u8]) -> Result<()> {
        check_block_aligned(ct.len(), self.block_len)?;
        for (c, p) in ct.chunks(self.block_len).zip(pt.chunks_mut(self.block_len)) {
            self.key.ecb_decrypt(c, p);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cipher::Aes128;

    #[test]
    fn ecb_roundtrips() {
        let key = [0u8; 16];
        let pt = [1u8; 32];
        let mut ct = [0u8; 32];
        Ecb::start(&Aes128, &key, 10).unwrap().encrypt(&pt, &mut ct).unwrap();
        let mut back = [0u8; 32];
        Ecb::start(&Aes128, &key, 10).unwrap().decrypt(&ct, &mut back).unwrap();
        assert_eq!(pt, back);
    }

    #[test]
    fn aes128_ecb_nist_vector() {
        let key: [u8; 16] =
            hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap().try_into().unwrap();
        let pt = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let mut ct = [0u8; 16];
        Ecb::start(&Aes128, &key, 10).unwrap().encrypt(&pt, &mut ct).unwrap();
        assert_eq!(hex::encode(ct), "3ad77bb40d7a3660a89ecaf32466ef97");
    }
}
