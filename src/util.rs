//! Small, broadly-used utilities: constant-time comparison and zeroing,
//! base16/32/64 codecs, and the KDFs (`HKDF`, `PBKDF1`, `PBKDF2`, `bcrypt_pbkdf`)
//! that the PEM/PKCS#8 importer and password-based encryption build on.

mod codec;
mod consttime;
mod iter;
mod kdf;

pub(crate) use iter::IterChunks;
pub use {
    codec::{base16_decode, base16_encode, base32_decode, base32_encode},
    consttime::{burn_stack, mem_neq, zeromem},
    kdf::{bcrypt_pbkdf, hkdf, pbkdf1, pbkdf2},
};
