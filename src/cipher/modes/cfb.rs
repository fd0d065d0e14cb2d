use {
    super::MAX_BLOCK_SIZE,
    crate::{
        cipher::{Cipher, ScheduledKey},
        error::Result,
        util::zeromem,
    },
};

/// Feedback width. This implementation supports byte granularity, not true
/// 1-bit shift registers -- `Byte` covers the common CFB-8 interoperability
/// case; true CFB-1 would need a bit-level shift register this crate
/// doesn't implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackWidth {
    /// Full block feedback (the common "CFB128" case for a 16-byte cipher).
    Block,
    /// One byte of feedback per step (CFB-8).
    Byte,
}

/// Cipher feedback mode: streamed, one byte at a time. `pad =
/// E(IV)`; each output byte XORs the next pad byte with the input and the
/// resulting ciphertext byte is shifted back into the feedback register.
/// The pad is refilled every time the feedback register has been fully
/// replaced (every block for [`FeedbackWidth::Block`], every byte for
/// [`FeedbackWidth::Byte`]).
pub struct Cfb {
    key: Box<dyn ScheduledKey>,
    block_len: usize,
    width: usize,
    iv: [u8; MAX_BLOCK_SIZE],
    pad: [u8; MAX_BLOCK_SIZE],
    feedback: [u8; MAX_BLOCK_SIZE],
    pad_offset: usize,
}

impl Drop for Cfb {
    fn drop(&mut self) {
        zeromem(&mut self.iv);
        zeromem(&mut self.pad);
        zeromem(&mut self.feedback);
    }
}

impl Cfb {
    pub fn start(cipher: &dyn Cipher, iv: &[u8], key: &[u8], rounds: u32) -> Result<Self> {
        Self::start_ex(cipher, iv, key, rounds, FeedbackWidth::Block)
    }

    pub fn start_ex(
        cipher: &dyn Cipher,
        iv: &[u8],
        key: &[u8],
        rounds: u32,
        width: FeedbackWidth,
    ) -> Result<Self> {
        let sched = cipher.setup(key, rounds)?;
        let block_len = sched.block_len();
        let w = match width {
            FeedbackWidth::Block => block_len,
            FeedbackWidth::Byte => 1,
        };
        let mut iv_buf = [0u8; MAX_BLOCK_SIZE];
        iv_buf[..block_len].copy_from_slice(&iv[..block_len]);
        Ok(Self {
            key: sched,
            block_len,
            width: w,
            iv: iv_buf,
            pad: [0; MAX_BLOCK_SIZE],
            feedback: [0; MAX_BLOCK_SIZE],
            pad_offset: 0,
        })
    }

    fn step(&mut self, input: u8, encrypting: bool) -> u8 {
        let bl = self.block_len;
        if self.pad_offset == 0 {
            self.key.ecb_encrypt(&self.iv[..bl].to_vec(), &mut self.pad[..bl]);
        }
        let ks = self.pad[self.pad_offset];
        let (plain_byte, cipher_byte) =
            if encrypting { (input, input ^ ks) } else { (input ^ ks, input) };
        self.feedback[self.pad_offset] = cipher_byte;
        self.pad_offset += 1;
        if self.pad_offset == self.width {
            self.iv.copy_within(self.width..bl, 0);
            self.iv[bl - self.width..bl].copy_from_slice(&self.feedback[..self.width]);
            self.pad_offset = 0;
        }
        if encrypting {
            cipher_byte
        } else {
            plain_byte
        }
    }

    pub fn encrypt(&mut self, pt: &[u8], ct: &mut [u8]) {
        for (p, c) in pt.iter().zip(ct.iter_mut()) {
            *c = self.step(*p, true);
        }
    }

    pub fn decrypt(&mut self, ct: &[u8], pt: &mut [u8]) {
        for (c, p) in ct.iter().zip(pt.iter_mut()) {
            *p = self.step(*c, false);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cipher::Aes128;

    #[test]
    fn cfb_block_roundtrips() {
        let key = [0u8; 16];
        let iv = [2u8; 16];
        let pt = b"the quick brown fox, running".to_vec();
        let mut ct = vec![0u8; pt.len()];
        Cfb::start(&Aes128, &iv, &key, 10).unwrap().encrypt(&pt, &mut ct);
        let mut back = vec![0u8; pt.len()];
        Cfb::start(&Aes128, &iv, &key, 10).unwrap().decrypt(&ct, &mut back);
        assert_eq!(pt, back);
    }

    #[test]
    fn cfb8_roundtrips() {
        let key = [5u8; 16];
        let iv = [3u8; 16];
        let pt = b"odd length message!".to_vec();
        let mut ct = vec![0u8; pt.len()];
        Cfb::start_ex(&Aes128, &iv, &key, 10, FeedbackWidth::Byte)
            .unwrap()
            .encrypt(&pt, &mut ct);
        let mut back = vec![0u8; pt.len()];
        Cfb::start_ex(&Aes128, &iv, &key, 10, FeedbackWidth::Byte)
            .unwrap()
            .decrypt(&ct, &mut back);
        assert_eq!(pt, back);
    }
}
