//! ChaCha20-Poly1305 (RFC 8439 §2.8): block 0 of the ChaCha20 keystream
//! becomes the one-time Poly1305 key, plaintext is encrypted starting
//! from block 1, and the tag covers `AAD ∥ pad ∥ ciphertext ∥ pad ∥
//! len(AAD) ∥ len(ciphertext)`.
//!
//! Unlike [`crate::aead::gcm::Gcm`] this is not block-cipher generic --
//! it is always built on [`crate::stream::chacha::ChaCha20`], so it lives
//! next to the other AEAD constructions rather than under `stream`.

use crate::{
    error::{Error, Result},
    mac::{Mac, Poly1305},
    stream::{chacha::ChaCha20, StreamState},
    util::mem_neq,
};

fn poly1305_key(key: &[u8; 32], nonce: &[u8; 12]) -> [u8; 32] {
    let mut state = ChaCha20::setup_with_counter(key, nonce, 0);
    let zero = [0u8; 32];
    let mut out = [0u8; 32];
    state.crypt(&zero, &mut out);
    out
}

fn mac_input(aad: &[u8], ct: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(aad.len() + ct.len() + 32);
    data.extend_from_slice(aad);
    pad16(&mut data);
    data.extend_from_slice(ct);
    pad16(&mut data);
    data.extend_from_slice(&(aad.len() as u64).to_le_bytes());
    data.extend_from_slice(&(ct.len() as u64).to_le_bytes());
    data
}

fn pad16(data: &mut Vec<u8>) {
    let rem = data.len() % 16;
    if rem != 0 {
        data.resize(data.len() + (16 - rem), 0);
    }
}

pub struct ChaCha20Poly1305;

impl ChaCha20Poly1305 {
    pub fn seal(key: &[u8], nonce: &[u8], aad: &[u8], pt: &[u8]) -> Result<(Vec<u8>, [u8; 16])> {
        if key.len() != 32 || nonce.len() != 12 {
            return Err(Error::InvalidKeySize { got: key.len(), valid: &[32] });
        }
        let mut key32 = [0u8; 32];
        key32.copy_from_slice(key);
        let mut nonce12 = [0u8; 12];
        nonce12.copy_from_slice(nonce);

        let mut ct = vec![0u8; pt.len()];
        ChaCha20::setup_with_counter(&key32, &nonce12, 1).crypt(pt, &mut ct);

        let poly_key = poly1305_key(&key32, &nonce12);
        let mut poly_key_arr = [0u8; 32];
        poly_key_arr.copy_from_slice(&poly_key);
        let tag = Poly1305::new(&poly_key_arr).mac(&mac_input(aad, &ct));

        let mut tag_arr = [0u8; 16];
        tag_arr.copy_from_slice(&tag);
        Ok((ct, tag_arr))
    }

    pub fn open(key: &[u8], nonce: &[u8], aad: &[u8], ct: &[u8], tag: &[u8]) -> Result<Vec<u8>> {
        if key.len() != 32 || nonce.len() != 12 {
            return Err(Error::InvalidKeySize { got: key.len(), valid: &[32] });
        }
        let mut key32 = [0u8; 32];
        key32.copy_from_slice(key);
        let mut nonce12 = [0u8; 12];
        nonce12.copy_from_slice(nonce);

        let poly_key = poly1305_key(&key32, &nonce12);
        let mut poly_key_arr = [0u8; 32];
        poly_key_arr.copy_from_slice(&poly_key);
        let computed = Poly1305::new(&poly_key_arr).mac(&mac_input(aad, ct));

        if mem_neq(&computed, tag) {
            return Err(Error::TagMismatch);
        }

        let mut pt = vec![0u8; ct.len()];
        ChaCha20::setup_with_counter(&key32, &nonce12, 1).crypt(ct, &mut pt);
        Ok(pt)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rfc8439_section_2_8_2_vector() {
        let key = hex::decode("808182838485868788898a8b8c8d8e8f909192939495969798999a9b9c9d9e9fa0a1a2a3a4a5a6a7a8a9aaabacadaeaf").unwrap();
        let nonce = hex::decode("070000004041424344454647").unwrap();
        let aad = hex::decode("50515253c0c1c2c3c4c5c6c7").unwrap();
        let pt = b"Ladies and Gentlemen of the class of '99: If I could offer you only one tip for the future, sunscreen would be it.";

        let (ct, tag) = ChaCha20Poly1305::seal(&key, &nonce, &aad, pt).unwrap();
        assert_eq!(
            hex::encode(&ct),
            "d31a8d34648e60db7b86afbc53ef7ec2a4aded51296e08fea9e2b5a736ee62d63dbea45e8ca9671282fafb69da92728b1a71de0a9e060b2905d6a5b67ecd3b3692ddbd7f2d778b8c9803aee328091b58fab324e4fad675945585808b4831d7bc3ff4def08e4b7a9de576d26586cec64b6116"
        );
        assert_eq!(hex::encode(tag), "1ae10b594f09e26a7e902ecbd0600691");

        let recovered = ChaCha20Poly1305::open(&key, &nonce, &aad, &ct, &tag).unwrap();
        assert_eq!(recovered, pt.to_vec());
    }

    #[test]
    fn tampered_aad_fails() {
        let key = [1u8; 32];
        let nonce = [2u8; 12];
        let pt = b"short message";
        let (ct, tag) = ChaCha20Poly1305::seal(&key, &nonce, b"good aad", pt).unwrap();
        assert!(ChaCha20Poly1305::open(&key, &nonce, b"bad aad!", &ct, &tag).is_err());
    }
}
