//! EAX (Bellare, Rogaway, Wagner): three domain-separated OMAC
//! computations over the nonce, header, and ciphertext, combined by XOR
//! into the tag, with the nonce's OMAC doubling as the CTR starting
//! counter.

use crate::{
    cipher::Cipher,
    error::{Error, Result},
    mac::{Mac, Omac},
    util::mem_neq,
};

fn omac_t(cipher: &dyn Cipher, key: &[u8], rounds: u32, tag: u8, data: &[u8]) -> Result<Vec<u8>> {
    let block_len = cipher.block_len();
    let mut prefix = vec![0u8; block_len];
    prefix[block_len - 1] = tag;

    let mut omac = Omac::new(cipher, key, rounds)?;
    omac.update(&prefix);
    omac.update(data);
    Ok(omac.finalize())
}

fn ctr_xor(cipher: &dyn Cipher, key: &[u8], rounds: u32, nonce_tag: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let block_len = cipher.block_len();
    let sched = cipher.setup(key, rounds)?;
    let mut counter = vec![0u8; block_len];
    counter.copy_from_slice(&nonce_tag[..block_len]);

    let mut out = vec![0u8; data.len()];
    for (chunk, out_chunk) in data.chunks(block_len).zip(out.chunks_mut(block_len)) {
        let mut pad = vec![0u8; block_len];
        sched.ecb_encrypt(&counter, &mut pad);
        for (o, (d, p)) in out_chunk.iter_mut().zip(chunk.iter().zip(pad.iter())) {
            *o = d ^ p;
        }
        let mut carry = 1u16;
        for byte in counter.iter_mut().rev() {
            let sum = *byte as u16 + carry;
            *byte = sum as u8;
            carry = sum >> 8;
            if carry == 0 {
                break;
            }
        }
    }
    Ok(out)
}

pub struct Eax;

impl Eax {
    pub fn seal(cipher: &dyn Cipher, key: &[u8], nonce: &[u8], header: &[u8], pt: &[u8], rounds: u32) -> Result<(Vec<u8>, Vec<u8>)> {
        let n = omac_t(cipher, key, rounds, 0, nonce)?;
        let h = omac_t(cipher, key, rounds, 1, header)?;
        let ct = ctr_xor(cipher, key, rounds, &n, pt)?;
        let c = omac_t(cipher, key, rounds, 2, &ct)?;

        let tag_len = n.len();
        let mut tag = vec![0u8; tag_len];
        for i in 0..tag_len {
            tag[i] = n[i] ^ h[i] ^ c[i];
        }
        Ok((ct, tag))
    }

    pub fn open(cipher: &dyn Cipher, key: &[u8], nonce: &[u8], header: &[u8], ct: &[u8], tag: &[u8], rounds: u32) -> Result<Vec<u8>> {
        let n = omac_t(cipher, key, rounds, 0, nonce)?;
        let h = omac_t(cipher, key, rounds, 1, header)?;
        let c = omac_t(cipher, key, rounds, 2, ct)?;

        let tag_len = n.len();
        let mut computed = vec![0u8; tag_len];
        for i in 0..tag_len {
            computed[i] = n[i] ^ h[i] ^ c[i];
        }

        if mem_neq(&computed[..tag.len()], tag) {
            return Err(Error::TagMismatch);
        }
        ctr_xor(cipher, key, rounds, &n, ct)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cipher::Aes128;

    #[test]
    fn roundtrips() {
        let key = [0x33u8; 16];
        let nonce = b"eax nonce value!";
        let header = b"eax header";
        let pt = b"eax combines three domain-separated omacs with ctr mode";
        let (ct, tag) = Eax::seal(&Aes128, &key, nonce, header, pt, 10).unwrap();
        let recovered = Eax::open(&Aes128, &key, nonce, header, &ct, &tag, 10).unwrap();
        assert_eq!(recovered, pt);
    }

    #[test]
    fn tampered_header_fails() {
        let key = [0x44u8; 16];
        let nonce = b"another nonce!!!";
        let pt = b"protect me";
        let (ct, tag) = Eax::seal(&Aes128, &key, nonce, b"good header", pt, 10).unwrap();
        assert!(Eax::open(&Aes128, &key, nonce, b"bad header!", &ct, &tag, 10).is_err());
    }
}
