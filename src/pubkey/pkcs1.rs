//! PKCS#1 v1.5 and v2.1 (OAEP/PSS) padding, per RFC 8017.
//!
//! These operate purely on byte buffers sized to an RSA modulus's byte
//! length (`k`); [`crate::pubkey::rsa`] is the only caller, but the padding
//! logic is kept separate from the modular-exponentiation machinery the
//! same way libtomcrypt splits `pkcs_1_pad`/`pkcs_1_oaep_encode`/
//! `pkcs_1_pss_encode` into their own translation units from `rsa.c`.

use crate::{
    error::{Error, Result},
    hash::Hash,
    util::mem_neq,
};

/// MGF1 (PKCS#1 v2.1 appendix B.2.1): stretch `seed` into `len` bytes by
/// hashing `seed || be32(counter)` for successive counters.
pub fn mgf1(hash: &mut dyn Hash, seed: &[u8], len: usize) -> Vec<u8> {
    let hlen = hash.digest_size();
    let mut out = Vec::with_capacity(len + hlen);
    let mut counter: u32 = 0;
    while out.len() < len {
        hash.update(seed);
        hash.update(&counter.to_be_bytes());
        out.extend_from_slice(&hash.finalize());
        counter += 1;
    }
    out.truncate(len);
    out
}

fn xor_in_place(buf: &mut [u8], mask: &[u8]) {
    for (b, m) in buf.iter_mut().zip(mask.iter()) {
        *b ^= m;
    }
}

/// PKCS#1 v1.5 encryption padding: `0x00 || 0x02 || PS || 0x00 || M`, where
/// `PS` is nonzero random bytes at least 8 bytes long. `k` is the modulus
/// size in bytes.
pub fn pkcs1v15_pad_encrypt(msg: &[u8], k: usize, rng: &mut dyn crate::random::Prng) -> Result<Vec<u8>> {
    if msg.len() > k.saturating_sub(11) {
        return Err(Error::InputTooLong);
    }
    let ps_len = k - msg.len() - 3;
    let mut ps = vec![0u8; ps_len];
    loop {
        if rng.read(&mut ps) != ps_len {
            return Err(Error::ErrorReadPrng("pkcs1v15 padding: prng underrun"));
        }
        if ps.iter().all(|&b| b != 0) {
            break;
        }
    }
    let mut em = Vec::with_capacity(k);
    em.push(0x00);
    em.push(0x02);
    em.extend_from_slice(&ps);
    em.push(0x00);
    em.extend_from_slice(msg);
    Ok(em)
}

/// PKCS#1 v1.5 signature padding: `0x00 || 0x01 || 0xFF...FF || 0x00 || M`,
/// where `M` is a `DigestInfo` the caller has already built (hash OID
/// prefix, per [`crate::hash::Hash::der_oid`], plus the digest).
pub fn pkcs1v15_pad_sign(digest_info: &[u8], k: usize) -> Result<Vec<u8>> {
    if digest_info.len() > k.saturating_sub(11) {
        return Err(Error::InputTooLong);
    }
    let ps_len = k - digest_info.len() - 3;
    let mut em = Vec::with_capacity(k);
    em.push(0x00);
    em.push(0x01);
    em.extend(std::iter::repeat(0xffu8).take(ps_len));
    em.push(0x00);
    em.extend_from_slice(digest_info);
    Ok(em)
}

/// Undo [`pkcs1v15_pad_encrypt`]/[`pkcs1v15_pad_sign`], checking the `0x00
/// 0x0type` header and filler bytes. Returns the recovered message. A
/// malformed structure returns [`Error::PkInvalidPadding`] without leaking
/// *where* the check failed beyond that one bit -- callers decrypting
/// ciphertext must still zero their output buffer on this path.
pub fn pkcs1v15_unpad(em: &[u8], expect_type: u8) -> Result<Vec<u8>> {
    if em.len() < 11 || em[0] != 0x00 || em[1] != expect_type {
        return Err(Error::PkInvalidPadding);
    }
    let rest = &em[2..];
    let sep = match expect_type {
        0x02 => rest.iter().position(|&b| b == 0).ok_or(Error::PkInvalidPadding)?,
        0x01 => {
            if !rest.iter().take_while(|&&b| b != 0).all(|&b| b == 0xff) {
                return Err(Error::PkInvalidPadding);
            }
            rest.iter().position(|&b| b == 0).ok_or(Error::PkInvalidPadding)?
        }
        _ => return Err(Error::InvalidArg("unknown PKCS#1 v1.5 block type")),
    };
    if sep < 8 {
        return Err(Error::PkInvalidPadding);
    }
    Ok(rest[sep + 1..].to_vec())
}

/// PKCS#1 v2.1 OAEP encoding (appendix A.2.1). `k` is the modulus size in
/// bytes; the encoded message is exactly `k` bytes: `0x00 || maskedSeed ||
/// maskedDB`.
pub fn oaep_encode(hash: &mut dyn Hash, msg: &[u8], label: &[u8], k: usize, rng: &mut dyn crate::random::Prng) -> Result<Vec<u8>> {
    let hlen = hash.digest_size();
    if msg.len() > k.saturating_sub(2 * hlen + 2) {
        return Err(Error::InputTooLong);
    }
    let l_hash = hash.hash(label);

    let ps_len = k - msg.len() - 2 * hlen - 2;
    let mut db = Vec::with_capacity(k - hlen - 1);
    db.extend_from_slice(&l_hash);
    db.extend(std::iter::repeat(0u8).take(ps_len));
    db.push(0x01);
    db.extend_from_slice(msg);

    let mut seed = vec![0u8; hlen];
    if rng.read(&mut seed) != hlen {
        return Err(Error::ErrorReadPrng("oaep encode: prng underrun"));
    }

    let db_mask = mgf1(hash, &seed, db.len());
    xor_in_place(&mut db, &db_mask);
    let seed_mask = mgf1(hash, &db, hlen);
    xor_in_place(&mut seed, &seed_mask);

    let mut em = Vec::with_capacity(k);
    em.push(0x00);
    em.extend_from_slice(&seed);
    em.extend_from_slice(&db);
    Ok(em)
}

/// Undo [`oaep_encode`]. A malformed encoding (bad leading byte, bad
/// lHash, missing `0x01` separator) returns [`Error::PkInvalidPadding`]
/// without distinguishing which check failed, following Manger's-attack
/// mitigation guidance of returning one generic error for the whole
/// decoding step.
pub fn oaep_decode(hash: &mut dyn Hash, em: &[u8], label: &[u8], k: usize) -> Result<Vec<u8>> {
    let hlen = hash.digest_size();
    if em.len() != k || k < 2 * hlen + 2 {
        return Err(Error::PkInvalidPadding);
    }
    let l_hash = hash.hash(label);

    let y = em[0];
    let mut seed = em[1..1 + hlen].to_vec();
    let mut db = em[1 + hlen..].to_vec();

    let seed_mask = mgf1(hash, &db, hlen);
    xor_in_place(&mut seed, &seed_mask);
    let db_mask = mgf1(hash, &seed, db.len());
    xor_in_place(&mut db, &db_mask);

    let (db_lhash, rest) = db.split_at(hlen);
    let sep = rest.iter().position(|&b| b != 0);
    let well_formed = y == 0x00 && !mem_neq(db_lhash, &l_hash) && matches!(sep, Some(i) if rest[i] == 0x01);
    if !well_formed {
        return Err(Error::PkInvalidPadding);
    }
    let i = sep.unwrap();
    Ok(rest[i + 1..].to_vec())
}

/// PKCS#1 v2.1 PSS encoding (appendix A.2.3). `em_bits` is the bit length
/// of the modulus minus one (`modBits - 1`); the top bits of the leading
/// byte of a short encoded message are zeroed so the numeric value of `EM`
/// is guaranteed less than the modulus.
pub fn pss_encode(hash: &mut dyn Hash, m_hash: &[u8], em_bits: usize, salt: &[u8], rng: &mut dyn crate::random::Prng) -> Result<Vec<u8>> {
    let hlen = hash.digest_size();
    let em_len = em_bits.div_ceil(8);
    let s_len = salt.len();
    if em_len < hlen + s_len + 2 {
        return Err(Error::InputTooLong);
    }

    let mut salt_buf = salt.to_vec();
    if salt_buf.is_empty() && s_len > 0 {
        salt_buf = vec![0u8; s_len];
        rng.read(&mut salt_buf);
    }

    let mut m_prime = vec![0u8; 8];
    m_prime.extend_from_slice(m_hash);
    m_prime.extend_from_slice(&salt_buf);
    let h = hash.hash(&m_prime);

    let ps_len = em_len - s_len - hlen - 2;
    let mut db = vec![0u8; ps_len];
    db.push(0x01);
    db.extend_from_slice(&salt_buf);

    let db_mask = mgf1(hash, &h, db.len());
    xor_in_place(&mut db, &db_mask);

    let unused_bits = 8 * em_len - em_bits;
    if unused_bits > 0 {
        db[0] &= 0xff >> unused_bits;
    }

    let mut em = db;
    em.extend_from_slice(&h);
    em.push(0xbc);
    Ok(em)
}

/// Undo [`pss_encode`] and confirm `m_hash` matches. Returns `Ok(true)` iff
/// the signature is well-formed and the recomputed hash matches the
/// embedded one.
pub fn pss_verify(hash: &mut dyn Hash, m_hash: &[u8], em: &[u8], em_bits: usize, s_len: usize) -> Result<bool> {
    let hlen = hash.digest_size();
    let em_len = em_bits.div_ceil(8);
    if em.len() != em_len || em_len < hlen + s_len + 2 {
        return Ok(false);
    }
    if em[em_len - 1] != 0xbc {
        return Ok(false);
    }

    let unused_bits = 8 * em_len - em_bits;
    let masked_db = &em[..em_len - hlen - 1];
    let h = &em[em_len - hlen - 1..em_len - 1];

    if unused_bits > 0 && masked_db[0] & !(0xff >> unused_bits) != 0 {
        return Ok(false);
    }

    let mut db = masked_db.to_vec();
    let db_mask = mgf1(hash, h, db.len());
    xor_in_place(&mut db, &db_mask);
    if unused_bits > 0 {
        db[0] &= 0xff >> unused_bits;
    }

    let ps_len = em_len - hlen - s_len - 2;
    if !db[..ps_len].iter().all(|&b| b == 0) || db[ps_len] != 0x01 {
        return Ok(false);
    }
    let salt = &db[ps_len + 1..];

    let mut m_prime = vec![0u8; 8];
    m_prime.extend_from_slice(m_hash);
    m_prime.extend_from_slice(salt);
    let h_prime = hash.hash(&m_prime);

    Ok(!mem_neq(h, &h_prime))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{hash::Sha256, random::Fortuna};

    fn seeded_prng() -> Fortuna {
        let mut p = Fortuna::new();
        p.add_entropy(&[0x42u8; 256]).unwrap();
        p.ready().unwrap();
        p
    }

    #[test]
    fn pkcs1v15_encrypt_roundtrip() {
        let mut rng = seeded_prng();
        let em = pkcs1v15_pad_encrypt(b"hello", 64, &mut rng).unwrap();
        let msg = pkcs1v15_unpad(&em, 0x02).unwrap();
        assert_eq!(msg, b"hello");
    }

    #[test]
    fn pkcs1v15_sign_roundtrip() {
        let em = pkcs1v15_pad_sign(b"digestinfo", 64).unwrap();
        let msg = pkcs1v15_unpad(&em, 0x01).unwrap();
        assert_eq!(msg, b"digestinfo");
    }

    #[test]
    fn oaep_roundtrip() {
        let mut rng = seeded_prng();
        let mut hash = Sha256::new();
        let em = oaep_encode(&mut hash, b"secret message", b"", 256, &mut rng).unwrap();
        let recovered = oaep_decode(&mut hash, &em, b"", 256).unwrap();
        assert_eq!(recovered, b"secret message");
    }

    #[test]
    fn oaep_tamper_is_rejected() {
        let mut rng = seeded_prng();
        let mut hash = Sha256::new();
        let mut em = oaep_encode(&mut hash, b"secret message", b"", 256, &mut rng).unwrap();
        em[200] ^= 1;
        assert!(oaep_decode(&mut hash, &em, b"", 256).is_err());
    }

    #[test]
    fn pss_roundtrip() {
        let mut rng = seeded_prng();
        let mut hash = Sha256::new();
        let m_hash = Sha256::new().hash(b"message to sign");
        let mut salt = [0u8; 32];
        rng.read(&mut salt);
        let em = pss_encode(&mut hash, &m_hash, 2047, &salt, &mut rng).unwrap();
        assert!(pss_verify(&mut hash, &m_hash, &em, 2047, 32).unwrap());
    }

    #[test]
    fn pss_tamper_is_rejected() {
        let mut rng = seeded_prng();
        let mut hash = Sha256::new();
        let m_hash = Sha256::new().hash(b"message to sign");
        let mut salt = [0u8; 32];
        rng.read(&mut salt);
        let mut em = pss_encode(&mut hash, &m_hash, 2047, &salt, &mut rng).unwrap();
        let last = em.len() - 2;
        em[last] ^= 1;
        assert!(!pss_verify(&mut hash, &m_hash, &em, 2047, 32).unwrap());
    }
}
