//! PEM framing (RFC 7468) and the "traditional" OpenSSL `Proc-Type`/
//! `DEK-Info` encrypted header.
//!
//! A PEM file is `-----BEGIN <label>-----`, base64 body, `-----END
//! <label>-----`, optionally preceded (inside the `BEGIN`/`END` markers) by
//! two header lines:
//!
//! ```text
//! Proc-Type: 4,ENCRYPTED
//! DEK-Info: <CIPHER-NAME>,<HEX IV>
//! ```
//!
//! When present, the base64 body decrypts under a key derived from the
//! password and the DEK-Info IV the way libtomcrypt's `pkcs_5_alg1_openssl`
//! does: OpenSSL's classic (non-PBKDF2) `EVP_BytesToKey` with MD5 and a
//! single iteration, using the first 8 bytes of the declared IV as the salt.
//! [`derive_key_md5`] is written directly against that well-documented
//! algorithm.

use crate::{
    cipher::{modes::Cbc, padding, Aes128, Aes192, Aes256, Cipher, Des, TripleDes},
    error::{Error, Result},
    hash::{Hash, Md5},
    util::base16_decode,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// A decoded PEM block: its `BEGIN`/`END` label, any `Proc-Type`/`DEK-Info`
/// encryption header, and the (still base64-decoded, possibly still
/// encrypted) body.
pub struct PemBlock {
    pub label: String,
    pub encryption: Option<DekInfo>,
    pub body: Vec<u8>,
}

/// A parsed `DEK-Info` header line.
pub struct DekInfo {
    pub cipher_name: String,
    pub iv: Vec<u8>,
}

/// Parse the first `-----BEGIN ...-----` / `-----END ...-----` block found
/// in `pem`. RFC 7468 only mandates that base64 lines be wrapped somewhere;
/// this accepts any wrapping width rather than enforcing a fixed column
/// count on decode.
pub fn decode(pem: &str) -> Result<PemBlock> {
    let begin_marker = "-----BEGIN ";
    let begin_start = pem.find(begin_marker).ok_or(Error::UnknownPem)?;
    let after_begin = &pem[begin_start + begin_marker.len()..];
    let label_end = after_begin.find("-----").ok_or(Error::UnknownPem)?;
    let label = after_begin[..label_end].to_string();
    let end_marker = format!("-----END {}-----", label);
    let body_start = begin_start + begin_marker.len() + label_end + "-----".len();
    let end_start = pem[body_start..].find(&end_marker).ok_or(Error::UnknownPem)?;
    let inner = pem[body_start..body_start + end_start].trim();

    let mut encryption = None;
    let mut base64_lines = Vec::new();
    let mut lines = inner.lines().map(str::trim);
    let mut pending: Vec<&str> = Vec::new();
    for line in &mut lines {
        if line.is_empty() {
            continue;
        }
        if line.starts_with("Proc-Type:") {
            pending.push(line);
            continue;
        }
        if line.starts_with("DEK-Info:") {
            let rest = line.trim_start_matches("DEK-Info:").trim();
            let (cipher_name, iv_hex) = rest.split_once(',').ok_or(Error::UnknownPem)?;
            encryption = Some(DekInfo { cipher_name: cipher_name.to_string(), iv: base16_decode(iv_hex)? });
            continue;
        }
        base64_lines.push(line);
    }
    if encryption.is_none() && !pending.is_empty() {
        return Err(Error::UnknownPem);
    }

    let body = STANDARD.decode(base64_lines.concat()).map_err(|_| Error::UnknownPem)?;
    Ok(PemBlock { label, encryption, body })
}

/// Wrap `der` as a PEM block under `label`, base64 at 64 columns, matching
/// the wrapping width OpenSSL and most other PEM writers use.
pub fn encode(label: &str, der: &[u8]) -> String {
    let body = STANDARD.encode(der);
    let mut out = format!("-----BEGIN {}-----\n", label);
    for chunk in body.as_bytes().chunks(64) {
        out.push_str(std::str::from_utf8(chunk).expect("base64 alphabet is ASCII"));
        out.push('\n');
    }
    out.push_str(&format!("-----END {}-----\n", label));
    out
}

/// OpenSSL's classic `EVP_BytesToKey` with MD5 and one iteration: repeatedly
/// hash `prev || password || salt` until `key_len` bytes have accumulated.
/// `salt` is the first 8 bytes of the DEK-Info IV.
pub fn derive_key_md5(password: &[u8], salt: &[u8], key_len: usize) -> Vec<u8> {
    let salt = &salt[..salt.len().min(8)];
    let mut out = Vec::with_capacity(key_len + 16);
    let mut prev: Vec<u8> = Vec::new();
    while out.len() < key_len {
        let mut h = Md5::new();
        h.update(&prev);
        h.update(password);
        h.update(salt);
        prev = h.finalize();
        out.extend_from_slice(&prev);
    }
    out.truncate(key_len);
    out
}

fn cipher_for_dek(name: &str) -> Result<(Box<dyn Cipher>, usize)> {
    match name {
        "AES-128-CBC" => Ok((Box::new(Aes128), 16)),
        "AES-192-CBC" => Ok((Box::new(Aes192), 24)),
        "AES-256-CBC" => Ok((Box::new(Aes256), 32)),
        "DES-EDE3-CBC" => Ok((Box::new(TripleDes), 24)),
        "DES-CBC" => Ok((Box::new(Des), 8)),
        _ => Err(Error::InvalidCipher("unsupported DEK-Info cipher")),
    }
}

/// Decrypt a traditional OpenSSL `Proc-Type: 4,ENCRYPTED` PEM body.
/// Returns [`Error::PkInvalidPadding`] for a wrong password, matching spec
/// §8 scenario 7's "typed error, not silent garbage" requirement (a wrong
/// key decrypts to garbage that almost never happens to end in valid
/// PKCS#7 padding).
pub fn decrypt_traditional(info: &DekInfo, body: &[u8], password: &[u8]) -> Result<Vec<u8>> {
    let (cipher, key_len) = cipher_for_dek(&info.cipher_name)?;
    let key = derive_key_md5(password, &info.iv, key_len);
    if body.is_empty() || body.len() % cipher.block_len() != 0 {
        return Err(Error::PkInvalidPadding);
    }
    let mut cbc = Cbc::start(cipher.as_ref(), &info.iv, &key, cipher.default_rounds())?;
    let mut plain = vec![0u8; body.len()];
    cbc.decrypt(body, &mut plain)?;
    if let Err(e) = padding::depad(&mut plain, cipher.block_len(), padding::Padding::Pkcs7) {
        log::warn!("traditional PEM body failed to decrypt under {} (wrong password or corrupt data)", info.cipher_name);
        return Err(e);
    }
    Ok(plain)
}

/// Encrypt `der` as a traditional OpenSSL PEM body under `password`, always
/// using AES-256-CBC (the strongest DEK-Info cipher libtomcrypt's own table
/// lists).
pub fn encrypt_traditional(der: &[u8], password: &[u8], iv: &[u8; 16]) -> (DekInfo, Vec<u8>) {
    let key = derive_key_md5(password, iv, 32);
    let mut plain = der.to_vec();
    padding::pad(&mut plain, 16, padding::Padding::Pkcs7).expect("AES block length is fixed");
    let mut ct = vec![0u8; plain.len()];
    Cbc::start(&Aes256, iv, &key, Aes256.default_rounds()).expect("fixed-size AES-256 key never fails setup").encrypt(&plain, &mut ct).expect("block-aligned by construction");
    (DekInfo { cipher_name: "AES-256-CBC".to_string(), iv: iv.to_vec() }, ct)
}

/// Render a traditional encrypted PEM block's header lines and base64 body
/// (the caller wraps these between `BEGIN`/`END` markers, as in
/// [`encode_traditional`]).
pub fn encode_traditional(label: &str, info: &DekInfo, ciphertext: &[u8]) -> String {
    let mut out = format!("-----BEGIN {}-----\n", label);
    out.push_str("Proc-Type: 4,ENCRYPTED\n");
    out.push_str(&format!("DEK-Info: {},{}\n\n", info.cipher_name, crate::util::base16_encode(&info.iv)));
    let body = STANDARD.encode(ciphertext);
    for chunk in body.as_bytes().chunks(64) {
        out.push_str(std::str::from_utf8(chunk).expect("base64 alphabet is ASCII"));
        out.push('\n');
    }
    out.push_str(&format!("-----END {}-----\n", label));
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn plain_pem_roundtrip() {
        let der = b"not actually DER, just bytes to round-trip".to_vec();
        let pem = encode("PRIVATE KEY", &der);
        let block = decode(&pem).unwrap();
        assert_eq!(block.label, "PRIVATE KEY");
        assert!(block.encryption.is_none());
        assert_eq!(block.body, der);
    }

    #[test]
    fn traditional_encrypted_roundtrip() {
        let der = b"a PrivateKeyInfo-shaped payload, 37 bytes long!!!!!".to_vec();
        let iv = [0x24u8; 16];
        let (info, ct) = encrypt_traditional(&der, b"s3kr1t", &iv);
        let pem = encode_traditional("RSA PRIVATE KEY", &info, &ct);

        let block = decode(&pem).unwrap();
        assert_eq!(block.label, "RSA PRIVATE KEY");
        let header = block.encryption.as_ref().unwrap();
        assert_eq!(header.cipher_name, "AES-256-CBC");

        let plain = decrypt_traditional(header, &block.body, b"s3kr1t").unwrap();
        assert_eq!(plain, der);
    }

    #[test]
    fn traditional_wrong_password_fails_cleanly() {
        let der = vec![0x42u8; 48];
        let iv = [0x99u8; 16];
        let (info, ct) = encrypt_traditional(&der, b"right", &iv);
        assert!(decrypt_traditional(&info, &ct, b"wrong").is_err());
    }

    #[test]
    fn unframed_text_is_rejected() {
        assert!(decode("just some text, no PEM markers here").is_err());
    }
}
