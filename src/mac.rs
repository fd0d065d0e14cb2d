//! Message authentication codes: HMAC (RFC 2104) over a [hash
//! function](crate::hash::Hash), and OMAC/CMAC (RFC 4493/NIST SP 800-38B)
//! and PMAC over a [block cipher](crate::cipher::Cipher).
//!
//! A MAC takes a message and a key and produces a fixed-size tag that proves
//! the message was produced by someone holding the key. Unlike a plain hash,
//! a MAC's output depends on a secret, so it authenticates origin as well as
//! integrity; it does not by itself prevent replay (the caller still needs a
//! nonce/counter for that).

pub(crate) mod gf;
mod hmac;
mod omac;
mod pmac;
mod poly1305;

pub use {hmac::Hmac, omac::Omac, pmac::Pmac, poly1305::Poly1305};

use crate::error::Result;

/// The MAC descriptor contract.
pub trait Mac {
    /// Stable name used for registry lookup, e.g. `"hmac-sha256"`.
    fn name(&self) -> &'static str;

    /// Tag size in bytes.
    fn tag_size(&self) -> usize;

    /// Absorb more of the message. May be called any number of times before
    /// [`finalize`](Mac::finalize).
    fn update(&mut self, data: &[u8]);

    /// Produce the tag and reset internal state.
    fn finalize(&mut self) -> Vec<u8>;

    /// One-shot tag over `data`.
    fn mac(&mut self, data: &[u8]) -> Vec<u8> {
        self.update(data);
        self.finalize()
    }

    /// Constant-time comparison of a computed tag against an expected one.
    /// Always prefer this over a direct `==` at call sites that verify an
    /// incoming tag -- a variable-time comparison leaks how many leading
    /// bytes matched to an attacker who can measure timing.
    fn verify(&mut self, data: &[u8], expected: &[u8]) -> Result<()> {
        let got = self.mac(data);
        if crate::util::mem_neq(&got, expected) {
            return Err(crate::error::Error::TagMismatch);
        }
        Ok(())
    }
}
