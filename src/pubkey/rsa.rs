//! RSA: key generation, CRT-accelerated and blinded private-key operations,
//! and PKCS#1 v1.5/OAEP/PSS encrypt-decrypt and sign-verify.

use crate::{
    error::{Error, Result},
    hash::Hash,
    math::{BigUint, Int, MathOps},
    pubkey::pkcs1,
    random::Prng,
};
use num_bigint::RandBigInt;

/// The RSA public exponent used by [`generate`] unless a caller overrides it.
pub const DEFAULT_PUBLIC_EXPONENT: u32 = 65537;

/// A public key: modulus and exponent.
#[derive(Clone)]
pub struct PublicKey {
    pub n: Int,
    pub e: Int,
}

/// A private key, optionally carrying CRT parameters for the accelerated
/// path.
#[derive(Clone)]
pub struct PrivateKey {
    pub n: Int,
    pub e: Int,
    pub d: Int,
    pub crt: Option<CrtParams>,
}

#[derive(Clone)]
pub struct CrtParams {
    pub p: Int,
    pub q: Int,
    pub dp: Int,
    pub dq: Int,
    pub qinv: Int,
}

impl PrivateKey {
    pub fn public(&self) -> PublicKey {
        PublicKey { n: self.n.clone(), e: self.e.clone() }
    }

    pub fn modulus_bytes(&self) -> usize {
        self.n.bits().div_ceil(8) as usize
    }
}

/// Generate an RSA key pair with an `bits`-bit modulus: draw `p`/`q` of
/// `bits/2` bits each with `gcd(e, p-1) = gcd(e, q-1) = 1`, `n = p*q`,
/// `d = e^-1 mod lcm(p-1, q-1)`, plus CRT parameters.
pub fn generate(bits: u64, e: u32, rng: &mut dyn Prng) -> Result<PrivateKey> {
    if bits < 256 || bits % 2 != 0 {
        return Err(Error::InvalidPrimeSize);
    }
    let half = bits / 2;
    let e_int = Int::from(e);

    let (p, q) = loop {
        let p = random_prime_from_prng(half, rng)?;
        let q = random_prime_from_prng(half, rng)?;
        if p == q {
            continue;
        }
        let p1 = &p - Int::from(1u32);
        let q1 = &q - Int::from(1u32);
        if BigUint::gcd(&e_int, &p1) != Int::from(1u32) || BigUint::gcd(&e_int, &q1) != Int::from(1u32) {
            continue;
        }
        break (p, q);
    };

    let n = &p * &q;
    let p1 = &p - Int::from(1u32);
    let q1 = &q - Int::from(1u32);
    let lambda = BigUint::lcm(&p1, &q1);
    let d = BigUint::invmod(&e_int, &lambda).ok_or(Error::PkInvalidType)?;

    let dp = &d % &p1;
    let dq = &d % &q1;
    let qinv = BigUint::invmod(&q, &p).ok_or(Error::PkInvalidType)?;

    Ok(PrivateKey { n, e: e_int, d, crt: Some(CrtParams { p, q, dp, dq, qinv }) })
}

fn random_prime_from_prng(bits: u64, rng: &mut dyn Prng) -> Result<Int> {
    let byte_len = bits.div_ceil(8) as usize;
    loop {
        let mut buf = vec![0u8; byte_len];
        if rng.read(&mut buf) != byte_len {
            return Err(Error::ErrorReadPrng("rsa keygen: prng underrun"));
        }
        let mut candidate = Int::from_bytes_be(&buf);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(0, true);
        if BigUint::is_prime(&candidate, 40) {
            return Ok(candidate);
        }
    }
}

/// Public-key operation: `m^e mod n`.
pub fn public_op(key: &PublicKey, m: &Int) -> Int {
    BigUint::exptmod(m, &key.e, &key.n)
}

/// Private-key operation: the CRT path when parameters are present,
/// optionally wrapped in multiplicative blinding to defeat timing attacks
/// on the exponentiation; always followed by a CRT-hardening re-encryption
/// check when `harden` is set, which is fatal on mismatch -- a CRT fault
/// attack (Boneh-DeMillo-Lipton) can recover the private key from a single
/// corrupted signature if the result isn't checked.
pub fn private_op(key: &PrivateKey, c: &Int, rng: Option<&mut dyn Prng>, harden: bool) -> Result<Int> {
    let (blinded_c, r_inv) = match rng {
        Some(rng) => {
            let r = random_unit(&key.n, rng)?;
            let r_inv = BigUint::invmod(&r, &key.n).ok_or(Error::PkInvalidType)?;
            let r_e = BigUint::exptmod(&r, &key.e, &key.n);
            (BigUint::mulmod(c, &r_e, &key.n), Some(r_inv))
        }
        None => (c.clone(), None),
    };

    let m = match &key.crt {
        Some(crt) => {
            let m1 = BigUint::exptmod(&blinded_c, &crt.dp, &crt.p);
            let m2 = BigUint::exptmod(&blinded_c, &crt.dq, &crt.q);
            let diff = BigUint::submod(&m1, &m2, &crt.p);
            let h = BigUint::mulmod(&crt.qinv, &diff, &crt.p);
            &m2 + &crt.q * &h
        }
        None => BigUint::exptmod(&blinded_c, &key.d, &key.n),
    };

    let m = match r_inv {
        Some(r_inv) => BigUint::mulmod(&m, &r_inv, &key.n),
        None => m,
    };

    if harden {
        let check = public_op(&key.public(), &m);
        if check != *c {
            return Err(Error::CrtHardeningFailed);
        }
    }

    Ok(m)
}

fn random_unit(n: &Int, rng: &mut dyn Prng) -> Result<Int> {
    // `rand`'s `gen_biguint_below` needs a source of randomness; bridge our
    // `Prng` trait object into one via a small adapter rather than pulling
    // in a second RNG abstraction.
    struct Bridge<'a>(&'a mut dyn Prng);
    impl rand_core::RngCore for Bridge<'_> {
        fn next_u32(&mut self) -> u32 {
            let mut buf = [0u8; 4];
            self.0.read(&mut buf);
            u32::from_le_bytes(buf)
        }
        fn next_u64(&mut self) -> u64 {
            let mut buf = [0u8; 8];
            self.0.read(&mut buf);
            u64::from_le_bytes(buf)
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.0.read(dest);
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), rand_core::Error> {
            self.0.read(dest);
            Ok(())
        }
    }

    let mut bridge = Bridge(rng);
    loop {
        let r = bridge.gen_biguint_below(n);
        if r > Int::from(0u32) {
            return Ok(r);
        }
    }
}

fn digest_info(hash: &dyn Hash, digest: &[u8]) -> Vec<u8> {
    use crate::asn1::der;
    let oid = der::encode_oid(hash.der_oid());
    let alg_id = der::sequence(&[oid, der::encode_null()]);
    der::sequence(&[alg_id, der::encode_octet_string(digest)])
}

/// OAEP-encrypt `msg` under `key`.
pub fn encrypt_oaep(key: &PublicKey, msg: &[u8], label: &[u8], hash: &mut dyn Hash, rng: &mut dyn Prng) -> Result<Vec<u8>> {
    let k = (key.n.bits() as usize).div_ceil(8);
    let em = pkcs1::oaep_encode(hash, msg, label, k, rng)?;
    let c = public_op(key, &Int::from_bytes_be(&em));
    Ok(left_pad(&c.to_bytes_be(), k))
}

/// OAEP-decrypt `ct` under `key`. On any padding failure, zeroes its own
/// working buffer before returning `Err`; there is no caller output buffer
/// here since decryption failed before producing one.
pub fn decrypt_oaep(key: &PrivateKey, ct: &[u8], label: &[u8], hash: &mut dyn Hash, rng: Option<&mut dyn Prng>) -> Result<Vec<u8>> {
    let k = key.modulus_bytes();
    if ct.len() != k {
        return Err(Error::PkInvalidSize);
    }
    let c = Int::from_bytes_be(ct);
    let m = private_op(key, &c, rng, true)?;
    let mut em = left_pad(&m.to_bytes_be(), k);
    let result = pkcs1::oaep_decode(hash, &em, label, k);
    crate::util::zeromem(&mut em);
    result
}

/// PKCS#1 v1.5 encrypt: `msg` must fit in `k - 11` bytes, where `k` is the
/// modulus size in bytes.
pub fn encrypt_pkcs1v15(key: &PublicKey, msg: &[u8], rng: &mut dyn Prng) -> Result<Vec<u8>> {
    let k = (key.n.bits() as usize).div_ceil(8);
    let em = pkcs1::pkcs1v15_pad_encrypt(msg, k, rng)?;
    let c = public_op(key, &Int::from_bytes_be(&em));
    Ok(left_pad(&c.to_bytes_be(), k))
}

pub fn decrypt_pkcs1v15(key: &PrivateKey, ct: &[u8], rng: Option<&mut dyn Prng>) -> Result<Vec<u8>> {
    let k = key.modulus_bytes();
    if ct.len() != k {
        return Err(Error::PkInvalidSize);
    }
    let c = Int::from_bytes_be(ct);
    let m = private_op(key, &c, rng, true)?;
    let mut em = left_pad(&m.to_bytes_be(), k);
    let result = pkcs1::pkcs1v15_unpad(&em, 0x02);
    crate::util::zeromem(&mut em);
    result
}

/// PKCS#1 v1.5 signing: build a `DigestInfo` from `hash`'s DER OID and
/// `digest`, pad, and raise to the private exponent.
pub fn sign_pkcs1v15(key: &PrivateKey, digest: &[u8], hash: &dyn Hash) -> Result<Vec<u8>> {
    let k = key.modulus_bytes();
    let info = digest_info(hash, digest);
    let em = pkcs1::pkcs1v15_pad_sign(&info, k)?;
    let s = private_op(key, &Int::from_bytes_be(&em), None, true)?;
    Ok(left_pad(&s.to_bytes_be(), k))
}

pub fn verify_pkcs1v15(key: &PublicKey, digest: &[u8], sig: &[u8], hash: &dyn Hash) -> Result<bool> {
    let k = (key.n.bits() as usize).div_ceil(8);
    if sig.len() != k {
        return Ok(false);
    }
    let m = public_op(key, &Int::from_bytes_be(sig));
    let em = left_pad(&m.to_bytes_be(), k);
    let expected = digest_info(hash, digest);
    match pkcs1::pkcs1v15_unpad(&em, 0x01) {
        Ok(recovered) => Ok(!crate::util::mem_neq(&recovered, &expected)),
        Err(_) => Ok(false),
    }
}

/// PKCS#1 v2.1 PSS signing.
pub fn sign_pss(key: &PrivateKey, m_hash: &[u8], hash: &mut dyn Hash, salt_len: usize, rng: &mut dyn Prng) -> Result<Vec<u8>> {
    let k = key.modulus_bytes();
    let em_bits = key.n.bits() as usize - 1;
    let mut salt = vec![0u8; salt_len];
    if salt_len > 0 && rng.read(&mut salt) != salt_len {
        return Err(Error::ErrorReadPrng("pss sign: prng underrun"));
    }
    let em = pkcs1::pss_encode(hash, m_hash, em_bits, &salt, rng)?;
    let s = private_op(key, &Int::from_bytes_be(&em), None, true)?;
    Ok(left_pad(&s.to_bytes_be(), k))
}

pub fn verify_pss(key: &PublicKey, m_hash: &[u8], sig: &[u8], hash: &mut dyn Hash, salt_len: usize) -> Result<bool> {
    let k = (key.n.bits() as usize).div_ceil(8);
    if sig.len() != k {
        return Ok(false);
    }
    let em_bits = key.n.bits() as usize - 1;
    let m = public_op(key, &Int::from_bytes_be(sig));
    let em_len = em_bits.div_ceil(8);
    let em = left_pad(&m.to_bytes_be(), em_len);
    pkcs1::pss_verify(hash, m_hash, &em, em_bits, salt_len)
}

fn left_pad(bytes: &[u8], len: usize) -> Vec<u8> {
    if bytes.len() >= len {
        return bytes[bytes.len() - len..].to_vec();
    }
    let mut out = vec![0u8; len - bytes.len()];
    out.extend_from_slice(bytes);
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{hash::Sha256, random::Fortuna};

    fn seeded_prng() -> Fortuna {
        let mut p = Fortuna::new();
        p.add_entropy(&[0x99u8; 256]).unwrap();
        p.ready().unwrap();
        p
    }

    fn small_key(rng: &mut dyn Prng) -> PrivateKey {
        // A small (512-bit) modulus keeps these tests fast; production
        // keys use >=2048 bits.
        generate(512, DEFAULT_PUBLIC_EXPONENT, rng).unwrap()
    }

    #[test]
    fn oaep_roundtrip() {
        let mut rng = seeded_prng();
        let key = small_key(&mut rng);
        let public = key.public();
        let mut hash = Sha256::new();
        let ct = encrypt_oaep(&public, b"attack at dawn", b"", &mut hash, &mut rng).unwrap();
        let pt = decrypt_oaep(&key, &ct, b"", &mut hash, Some(&mut rng)).unwrap();
        assert_eq!(pt, b"attack at dawn");
    }

    #[test]
    fn oaep_bit_flip_fails_decrypt() {
        let mut rng = seeded_prng();
        let key = small_key(&mut rng);
        let public = key.public();
        let mut hash = Sha256::new();
        let mut ct = encrypt_oaep(&public, b"attack at dawn", b"", &mut hash, &mut rng).unwrap();
        let last = ct.len() - 1;
        ct[last] ^= 1;
        assert!(decrypt_oaep(&key, &ct, b"", &mut hash, Some(&mut rng)).is_err());
    }

    #[test]
    fn pkcs1v15_encrypt_roundtrip() {
        let mut rng = seeded_prng();
        let key = small_key(&mut rng);
        let public = key.public();
        let ct = encrypt_pkcs1v15(&public, b"hi", &mut rng).unwrap();
        let pt = decrypt_pkcs1v15(&key, &ct, Some(&mut rng)).unwrap();
        assert_eq!(pt, b"hi");
    }

    #[test]
    fn sign_then_verify_pkcs1v15() {
        let mut rng = seeded_prng();
        let key = small_key(&mut rng);
        let public = key.public();
        let hash = Sha256::new();
        let digest = Sha256::new().hash(b"message");
        let sig = sign_pkcs1v15(&key, &digest, &hash).unwrap();
        assert!(verify_pkcs1v15(&public, &digest, &sig, &hash).unwrap());
    }

    #[test]
    fn sign_then_verify_pss() {
        let mut rng = seeded_prng();
        let key = small_key(&mut rng);
        let public = key.public();
        let mut hash = Sha256::new();
        let digest = Sha256::new().hash(b"message");
        let sig = sign_pss(&key, &digest, &mut hash, 16, &mut rng).unwrap();
        assert!(verify_pss(&public, &digest, &sig, &mut hash, 16).unwrap());
    }

    #[test]
    fn tampered_signature_rejected() {
        let mut rng = seeded_prng();
        let key = small_key(&mut rng);
        let public = key.public();
        let hash = Sha256::new();
        let digest = Sha256::new().hash(b"message");
        let mut sig = sign_pkcs1v15(&key, &digest, &hash).unwrap();
        let last = sig.len() - 1;
        sig[last] ^= 1;
        assert!(!verify_pkcs1v15(&public, &digest, &sig, &hash).unwrap());
    }

    #[test]
    fn crt_and_direct_private_op_agree() {
        let mut rng = seeded_prng();
        let key = small_key(&mut rng);
        let c = Int::from(12345u32) % &key.n;
        let via_crt = private_op(&key, &c, None, false).unwrap();
        let direct = PrivateKey { n: key.n.clone(), e: key.e.clone(), d: key.d.clone(), crt: None };
        let via_direct = private_op(&direct, &c, None, false).unwrap();
        assert_eq!(via_crt, via_direct);
    }
}
