//! ASN.1 DER encoding/decoding, PEM framing, and the key-container formats
//! built on top of both: PKCS#8 private keys, X.509 SubjectPublicKeyInfo,
//! and OpenSSH's `openssh-key-v1` container.
//!
//! [`der`] is the generic TLV encoder/decoder every other module calls into,
//! [`flexi`] recovers structure from DER bytes whose shape isn't known ahead
//! of time, and [`pem`]/[`pkcs8`]/[`spki`]/[`ssh`] each wrap `der` with one
//! concrete container format.

pub mod der;
pub mod flexi;
pub mod oid;
pub mod pem;
pub mod pkcs8;
pub mod spki;
pub mod ssh;
