//! Authenticated-encryption (AEAD) constructions built over a
//! [block cipher](crate::cipher::Cipher): GCM (NIST SP 800-38D), CCM (NIST
//! SP 800-38C), EAX, OCB3 (RFC 7253), SIV (RFC 5297), and ChaCha20-Poly1305
//! (RFC 8439).
//!
//! Every construction here treats a failed tag verification on decrypt as
//! fatal to the whole call: it zeroes the caller's plaintext output buffer
//! before returning `Err` so a caller cannot accidentally consume
//! unauthenticated plaintext, and tag comparison always goes through
//! [`crate::util::mem_neq`], never a direct `==`.

pub mod ccm;
pub mod chacha20poly1305;
pub mod eax;
pub mod gcm;
pub mod ocb;
pub mod siv;

pub use {
    ccm::Ccm,
    chacha20poly1305::ChaCha20Poly1305,
    eax::Eax,
    gcm::Gcm,
    ocb::Ocb3,
    siv::Siv,
};
