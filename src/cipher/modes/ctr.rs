use {
    super::MAX_BLOCK_SIZE,
    crate::{
        cipher::{Cipher, ScheduledKey},
        error::Result,
        util::zeromem,
    },
};

/// Which end of the counter block increments. Exposed as an explicit
/// parameter rather than fixing one convention, since interoperating
/// implementations disagree on counter placement and endianness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterEndian {
    /// Counter occupies the low-order bytes, incremented like a big-endian
    /// integer (the common convention, e.g. NIST SP 800-38A).
    Big,
    /// Counter occupies the low-order bytes, incremented like a
    /// little-endian integer.
    Little,
}

/// The counter portion of a CTR nonce block: `width` bytes at the end (or
/// start, for [`CounterEndian::Little`]) of the block are treated as an
/// integer and incremented after every block; the remaining bytes are a
/// fixed nonce untouched by encryption.
#[derive(Debug, Clone, Copy)]
pub struct Counter {
    pub endian: CounterEndian,
    /// Number of trailing bytes of the block that make up the counter.
    /// Defaults to the full block when constructed via [`Ctr::start`].
    pub width: usize,
}

/// Counter mode: `ct = pt XOR E(counter)`; `counter` increments
/// by one after every block regardless of direction, so encryption and
/// decryption are the same operation.
pub struct Ctr {
    key: Box<dyn ScheduledKey>,
    block_len: usize,
    counter_block: [u8; MAX_BLOCK_SIZE],
    pad: [u8; MAX_BLOCK_SIZE],
    pad_offset: usize,
    counter: Counter,
}

impl Drop for Ctr {
    fn drop(&mut self) {
        zeromem(&mut self.counter_block);
        zeromem(&mut self.pad);
    }
}

impl Ctr {
    pub fn start(cipher: &dyn Cipher, iv: &[u8], key: &[u8], rounds: u32) -> Result<Self> {
        let block_len = cipher.block_len();
        Self::start_ex(
            cipher,
            iv,
            key,
            rounds,
            Counter { endian: CounterEndian::Big, width: block_len },
        )
    }

    pub fn start_ex(
        cipher: &dyn Cipher,
        iv: &[u8],
        key: &[u8],
        rounds: u32,
        counter: Counter,
    ) -> Result<Self> {
        let sched = cipher.setup(key, rounds)?;
        let block_len = sched.block_len();
        let mut counter_block = [0u8; MAX_BLOCK_SIZE];
        counter_block[..block_len].copy_from_slice(&iv[..block_len]);
        Ok(Self {
            key: sched,
            block_len,
            counter_block,
            pad: [0; MAX_BLOCK_SIZE],
            pad_offset: block_len,
            counter,
        })
    }

    fn increment(&mut self) {
        let bl = self.block_len;
        let w = self.counter.width.min(bl);
        match self.counter.endian {
            CounterEndian::Big => {
                for byte in self.counter_block[bl - w..bl].iter_mut().rev() {
                    *byte = byte.wrapping_add(1);
                    if *byte != 0 {
                        break;
                    }
                }
            }
            CounterEndian::Little => {
                for byte in self.counter_block[..w].iter_mut() {
                    *byte = byte.wrapping_add(1);
                    if *byte != 0 {
                        break;
                    }
                }
            }
        }
    }

    fn xor_stream(&mut self, input: &[u8], output: &mut [u8]) {
        let bl = self.block_len;
        for (i, o) in input.iter().zip(output.iter_mut()) {
            if self.pad_offset == bl {
                let block = self.counter_block[..bl].to_vec();
                self.key.ecb_encrypt(&block, &mut self.pad[..bl]);
                self.increment();
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
    fn ctr_roundtrips() {
        let key = [1u8; 16];
        let iv = [0u8; 16];
        let pt = b"counter mode turns a block cipher into a stream cipher".to_vec();
        let mut ct = vec![0u8; pt.len()];
        Ctr::start(&Aes128, &iv, &key, 10).unwrap().encrypt(&pt, &mut ct);
        let mut back = vec![0u8; pt.len()];
        Ctr::start(&Aes128, &iv, &key, 10).unwrap().decrypt(&ct, &mut back);
        assert_eq!(pt, back);
    }

    #[test]
    fn ctr_little_endian_counter_roundtrips() {
        let key = [1u8; 16];
        let iv = [0u8; 16];
        let pt = [5u8; 40];
        let mut ct = [0u8; 40];
        let counter = Counter { endian: CounterEndian::Little, width: 16 };
        Ctr::start_ex(&Aes128, &iv, &key, 10, counter).unwrap().encrypt(&pt, &mut ct);
        let mut back = [0u8; 40];
        Ctr::start_ex(&Aes128, &iv, &key, 10, counter).unwrap().decrypt(&ct, &mut back);
        assert_eq!(pt, back);
    }

    #[test]
    fn ctr_distinct_blocks_differ() {
        let key = [1u8; 16];
        let iv = [0u8; 16];
        let pt = [7u8; 32]; // two identical blocks
        let mut ct = [0u8; 32];
        Ctr::start(&Aes128, &iv, &key, 10).unwrap().encrypt(&pt, &mut ct);
        assert_ne!(&ct[..16], &ct[16..]);
    }
}
