//! Public-key primitives: RSA, DSA, DH, ECC over the NIST prime-field
//! curves, Ed25519, X25519, and the PKCS#1 paddings (v1.5, OAEP, PSS) those
//! RSA operations build on.
//!
//! Unlike [`Cipher`](crate::cipher::Cipher)/[`Hash`](crate::hash::Hash)/
//! [`Prng`](crate::random::Prng), there is no single object-safe "public-key
//! descriptor" trait here: each algorithm's key shape, signature format,
//! and operation set differ too much to share one interface usefully
//! (libtomcrypt's `ltc_pka_key` union plays this role in the C API by
//! tagging a key with its algorithm ID and matching on it everywhere, which
//! doesn't carry over well). Every submodule instead exposes its own
//! `PrivateKey`/`PublicKey` pair and free functions.

pub mod dh;
pub mod dsa;
pub mod ecc;
pub mod ed25519;
pub mod pkcs1;
pub mod rsa;
pub mod x25519;
