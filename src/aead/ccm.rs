//! CCM (RFC 3610): CBC-MAC over a formatted `B0 ∥ AAD ∥ plaintext`
//! sequence, then CTR encryption of plaintext and tag starting from
//! counter block `A0`.
//!
//! Unlike GCM/EAX/OCB, CCM's first block encodes the *total* message
//! length, so it cannot stream incrementally without knowing the full
//! plaintext length up front -- this crate exposes it as one-shot
//! `seal`/`open` functions over complete buffers, matching libtomcrypt's
//! `ccm_memory` single-call contract rather than the streaming
//! `_start`/`_process`/`_done` shape the block-cipher modes use.

use crate::{
    cipher::Cipher,
    error::{Error, Result},
    util::mem_neq,
};

fn build_b0(nonce: &[u8], msg_len: usize, aad_len: usize, tag_len: usize, block_len: usize) -> Vec<u8> {
    let l = block_len - 1 - nonce.len();
    let mut flags = 0u8;
    if aad_len > 0 {
        flags |= 0x40;
    }
    flags |= (((tag_len - 2) / 2) as u8) << 3;
    flags |= (l - 1) as u8;

    let mut b0 = vec![flags];
    b0.extend_from_slice(nonce);
    let len_bytes = (msg_len as u64).to_be_bytes();
    b0.extend_from_slice(&len_bytes[8 - l..]);
    b0
}

fn encode_aad_len(aad_len: usize) -> Vec<u8> {
    if aad_len < 0xFF00 {
        (aad_len as u16).to_be_bytes().to_vec()
    } else {
        let mut v = vec![0xFF, 0xFE];
        v.extend_from_slice(&(aad_len as u32).to_be_bytes());
        v
    }
}

fn pad_to_block(data: &mut Vec<u8>, block_len: usize) {
    let rem = data.len() % block_len;
    if rem != 0 {
        data.resize(data.len() + (block_len - rem), 0);
    }
}

fn counter_block(nonce: &[u8], block_len: usize, counter: u32) -> Vec<u8> {
    let l = block_len - 1 - nonce.len();
    let mut block = vec![(l - 1) as u8];
    block.extend_from_slice(nonce);
    let ctr_bytes = (counter as u64).to_be_bytes();
    block.extend_from_slice(&ctr_bytes[8 - l..]);
    block
}

fn ctr_xor(sched: &dyn crate::cipher::ScheduledKey, nonce: &[u8], block_len: usize, start_counter: u32, data: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; data.len()];
    let mut counter = start_counter;
    for (chunk, out_chunk) in data.chunks(block_len).zip(out.chunks_mut(block_len)) {
        let block = counter_block(nonce, block_len, counter);
        let mut pad = vec![0u8; block_len];
        sched.ecb_encrypt(&block, &mut pad);
        for (o, (d, p)) in out_chunk.iter_mut().zip(chunk.iter().zip(pad.iter())) {
            *o = d ^ p;
        }
        counter += 1;
    }
    out
}

fn cbc_mac(sched: &dyn crate::cipher::ScheduledKey, block_len: usize, b0: &[u8], aad: &[u8], pt: &[u8]) -> Vec<u8> {
    let mut formatted = b0.to_vec();
    if !aad.is_empty() {
        let mut aad_field = encode_aad_len(aad.len());
        aad_field.extend_from_slice(aad);
        pad_to_block(&mut aad_field, block_len);
        formatted.extend_from_slice(&aad_field);
    }
    let mut pt_padded = pt.to_vec();
    pad_to_block(&mut pt_padded, block_len);
    formatted.extend_from_slice(&pt_padded);

    let mut chain = vec![0u8; block_len];
    for block in formatted.chunks(block_len) {
        for (c, b) in chain.iter_mut().zip(block.iter()) {
            *c ^= b;
        }
        let chain_in = chain.clone();
        sched.ecb_encrypt(&chain_in, &mut chain);
    }
    chain
}

pub struct Ccm;

impl Ccm {
    /// Encrypt and authenticate `pt` under `key`/`nonce`/`aad`, producing
    /// ciphertext and a `tag_len`-byte tag (RFC 3610 `M`, one of
    /// `4,6,8,10,12,14,16`).
    pub fn seal(cipher: &dyn Cipher, key: &[u8], nonce: &[u8], aad: &[u8], pt: &[u8], tag_len: usize, rounds: u32) -> Result<(Vec<u8>, Vec<u8>)> {
        let block_len = cipher.block_len();
        if !(7..=13).contains(&nonce.len()) {
            return Err(Error::InvalidArg("CCM nonce length must be 7..=13 bytes"));
        }
        if tag_len < 4 || tag_len > 16 || tag_len % 2 != 0 {
            return Err(Error::InvalidArg("CCM tag length must be an even value in 4..=16"));
        }
        let sched = cipher.setup(key, rounds)?;

        let b0 = build_b0(nonce, pt.len(), aad.len(), tag_len, block_len);
        let mac = cbc_mac(sched.as_ref(), block_len, &b0, aad, pt);

        let ct = ctr_xor(sched.as_ref(), nonce, block_len, 1, pt);
        let s0 = ctr_xor(sched.as_ref(), nonce, block_len, 0, &mac[..tag_len]);
        Ok((ct, s0))
    }

    /// Verify and decrypt. On a tag mismatch, returns `Err` and the
    /// recovered plaintext is never exposed to the caller.
    pub fn open(cipher: &dyn Cipher, key: &[u8], nonce: &[u8], aad: &[u8], ct: &[u8], tag: &[u8], rounds: u32) -> Result<Vec<u8>> {
        let block_len = cipher.block_len();
        let sched = cipher.setup(key, rounds)?;
        let tag_len = tag.len();

        let mut pt = ctr_xor(sched.as_ref(), nonce, block_len, 1, ct);
        let b0 = build_b0(nonce, pt.len(), aad.len(), tag_len, block_len);
        let mac = cbc_mac(sched.as_ref(), block_len, &b0, aad, &pt);
        let s0 = ctr_xor(sched.as_ref(), nonce, block_len, 0, &mac[..tag_len]);

        if mem_neq(&s0, tag) {
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
        let key = [0x55u8; 16];
        let nonce = [0x01u8; 12];
        let aad = b"ccm aad";
        let pt = b"ccm combines cbc-mac authentication with ctr encryption";
        let (ct, tag) = Ccm::seal(&Aes128, &key, &nonce, aad, pt, 8, 10).unwrap();
        let recovered = Ccm::open(&Aes128, &key, &nonce, aad, &ct, &tag, 10).unwrap();
        assert_eq!(recovered, pt);
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let key = [0x66u8; 16];
        let nonce = [0x02u8; 13];
        let pt = b"integrity matters";
        let (mut ct, tag) = Ccm::seal(&Aes128, &key, &nonce, b"", pt, 16, 10).unwrap();
        ct[0] ^= 0x01;
        assert!(Ccm::open(&Aes128, &key, &nonce, b"", &ct, &tag, 10).is_err());
    }

    #[test]
    fn rejects_bad_nonce_length() {
        assert!(Ccm::seal(&Aes128, &[0u8; 16], &[0u8; 6], b"", b"x", 8, 10).is_err());
    }
}
