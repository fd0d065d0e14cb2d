//! SIV (RFC 5297): synthetic-IV deterministic authenticated encryption.
//! `S2V` -- a chain of OMACs folded together via the GF(2^n) doubling
//! operation shared with [`crate::mac::omac`] -- derives the tag from the
//! associated-data vector and plaintext, and that tag (with its two top
//! bits cleared) becomes the CTR starting counter.
//!
//! SIV is misuse-resistant: encrypting the same plaintext and AD vector
//! twice under the same key produces identical ciphertext, which is by
//! design (it lets a caller skip supplying a fresh nonce) rather than a
//! weakness the caller needs to route around.

use crate::{
    cipher::Cipher,
    error::{Error, Result},
    mac::{gf::dbl, Mac, Omac},
    util::mem_neq,
};

fn xor_into(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= s;
    }
}

fn s2v(cipher: &dyn Cipher, mac_key: &[u8], rounds: u32, ad: &[&[u8]], pt: &[u8]) -> Result<Vec<u8>> {
    let block_len = cipher.block_len();
    let zero = vec![0u8; block_len];
    let mut d = Omac::new(cipher, mac_key, rounds)?.mac(&zero);

    for component in ad {
        dbl(&mut d);
        let t = Omac::new(cipher, mac_key, rounds)?.mac(component);
        xor_into(&mut d, &t);
    }

    if pt.len() >= block_len {
        let (head, tail) = pt.split_at(pt.len() - block_len);
        let mut last = tail.to_vec();
        xor_into(&mut last, &d);
        let mut omac = Omac::new(cipher, mac_key, rounds)?;
        omac.update(head);
        omac.update(&last);
        Ok(omac.finalize())
    } else {
        dbl(&mut d);
        let mut padded = pt.to_vec();
        padded.push(0x80);
        padded.resize(block_len, 0);
        xor_into(&mut d, &padded);
        Ok(Omac::new(cipher, mac_key, rounds)?.mac(&d))
    }
}

fn ctr_xor(cipher: &dyn Cipher, enc_key: &[u8], rounds: u32, iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let block_len = cipher.block_len();
    let sched = cipher.setup(enc_key, rounds)?;
    let mut counter = iv.to_vec();
    counter[block_len - 8] &= 0x7F;
    counter[block_len - 4] &= 0x7F;

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

pub struct Siv;

impl Siv {
    /// `key` is split in half: the first half keys `S2V`, the second half
    /// keys the CTR encryption (RFC 5297 §2.2).
    pub fn seal(cipher: &dyn Cipher, key: &[u8], ad: &[&[u8]], pt: &[u8], rounds: u32) -> Result<(Vec<u8>, Vec<u8>)> {
        if key.len() % 2 != 0 {
            return Err(Error::InvalidArg("SIV key must split evenly into mac/enc halves"));
        }
        let (mac_key, enc_key) = key.split_at(key.len() / 2);
        let iv = s2v(cipher, mac_key, rounds, ad, pt)?;
        let ct = ctr_xor(cipher, enc_key, rounds, &iv, pt)?;
        Ok((ct, iv))
    }

    pub fn open(cipher: &dyn Cipher, key: &[u8], ad: &[&[u8]], ct: &[u8], iv: &[u8], rounds: u32) -> Result<Vec<u8>> {
        if key.len() % 2 != 0 {
            return Err(Error::InvalidArg("SIV key must split evenly into mac/enc halves"));
        }
        let (mac_key, enc_key) = key.split_at(key.len() / 2);
        let mut pt = ctr_xor(cipher, enc_key, rounds, iv, ct)?;
        let expected = s2v(cipher, mac_key, rounds, ad, &pt)?;
        if mem_neq(&expected, iv) {
            crate::util::zeromem(&mut pt);
            return Err(Error::TagMismatch);
        }
        Ok(pt)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cipher::Aes128;

    #[test]
    fn roundtrips() {
        let key = [0x77u8; 32];
        let ad: [&[u8]; 2] = [b"header one", b"header two"];
        let pt = b"siv is deterministic and misuse-resistant authenticated encryption";
        let (ct, iv) = Siv::seal(&Aes128, &key, &ad, pt, 10).unwrap();
        let recovered = Siv::open(&Aes128, &key, &ad, &ct, &iv, 10).unwrap();
        assert_eq!(recovered, pt);
    }

    #[test]
    fn is_deterministic() {
        let key = [0x88u8; 32];
        let ad: [&[u8]; 1] = [b"same ad"];
        let pt = b"same plaintext";
        let (ct1, iv1) = Siv::seal(&Aes128, &key, &ad, pt, 10).unwrap();
        let (ct2, iv2) = Siv::seal(&Aes128, &key, &ad, pt, 10).unwrap();
        assert_eq!(ct1, ct2);
        assert_eq!(iv1, iv2);
    }

    #[test]
    fn tampered_iv_fails() {
        let key = [0x99u8; 32];
        let ad: [&[u8]; 1] = [b"ad"];
        let pt = b"tamper check";
        let (ct, mut iv) = Siv::seal(&Aes128, &key, &ad, pt, 10).unwrap();
        iv[0] ^= 1;
        assert!(Siv::open(&Aes128, &key, &ad, &ct, &iv, 10).is_err());
    }
}
