//! A modular cryptographic toolkit: an algorithm registry and polymorphic
//! descriptor model for ciphers/hashes/PRNGs/the big-integer math backend;
//! block-cipher modes of operation and authenticated-encryption/MAC
//! constructions; a public-key primitive layer (RSA, ECC, DSA, DH, Ed25519,
//! X25519); and an ASN.1 DER/PEM/PKCS#8/SSH codec.
//!
//! The modules mostly don't depend on each other except through [`error`]
//! and [`util`]:
//! [`cipher`]/[`hash`]/[`random`] are the leaf descriptor contracts;
//! [`mac`]/[`aead`] build MACs and authenticated-encryption constructions
//! over a [`cipher::Cipher`] or [`hash::Hash`]; [`math`]/[`pubkey`] are the
//! arbitrary-precision/public-key layer; [`asn1`] is the wire-format codec
//! tying key material to bytes on disk; and [`registry`] is the process-wide
//! lookup table every other subsystem can optionally register into.

pub mod aead;
pub mod asn1;
pub mod cipher;
pub mod error;
pub mod hash;
pub mod mac;
pub mod math;
pub mod pubkey;
pub mod random;
pub mod registry;
pub mod stream;
pub mod util;

pub use error::{Error, Result};
