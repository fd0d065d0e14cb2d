//! Symmetric block ciphers, the [modes of operation](modes) that turn a
//! block cipher into something that can handle arbitrary-length messages,
//! and [padding](padding) schemes.

pub mod block;
pub mod modes;
pub mod padding;

pub use block::{Aes128, Aes192, Aes256, Des, TripleDes};

use crate::error::Result;

/// The cipher descriptor contract.
///
/// This is the trait-object equivalent of libtomcrypt's `ltc_cipher_descriptor`
/// function-pointer table: a [`Registry`](crate::registry::Registry)
/// holds `Box<dyn Cipher>` instances, and every block mode
/// ([`modes::Ecb`], [`modes::Cbc`], ...) and AEAD construction
/// ([`crate::aead`]) is built on top of a `&dyn Cipher` plus the
/// [`ScheduledKey`] it produces.
pub trait Cipher {
    /// Stable name used for registry lookup, e.g. `"aes256"`.
    fn name(&self) -> &'static str;

    fn min_key_len(&self) -> usize;
    fn max_key_len(&self) -> usize;

    /// Block length in bytes (16 for AES, 8 for DES/3DES).
    fn block_len(&self) -> usize;

    fn default_rounds(&self) -> u32;

    /// Expand `key` (`rounds` rounds, or the descriptor's default if 0) into
    /// a scheduled key ready for [`ScheduledKey::ecb_encrypt`]/
    /// [`ScheduledKey::ecb_decrypt`].
    fn setup(&self, key: &[u8], rounds: u32) -> Result<Box<dyn ScheduledKey>>;

    /// Round a requested key length down to the nearest size this cipher
    /// actually accepts (descriptor `keysize` operation).
    fn keysize(&self, keylen: usize) -> Result<usize> {
        if keylen < self.min_key_len() {
            return Err(crate::error::Error::InvalidKeySize { got: keylen, valid: &[] });
        }
        Ok(keylen.min(self.max_key_len()))
    }

    /// Verify this descriptor against itself: `setup` a minimum-length
    /// all-zero key, encrypt a block, decrypt it back, and check it matches
    /// (descriptor `self_test` operation). A failing self-test is always
    /// fatal to the operation that triggered it — callers that register
    /// descriptors at startup should propagate this rather than register a
    /// cipher that can't even round-trip its own output.
    fn self_test(&self) -> Result<()> {
        let key = vec![0u8; self.min_key_len()];
        let sched = self.setup(&key, self.default_rounds())?;
        let pt = vec![0x5au8; self.block_len()];
        let mut ct = vec![0u8; self.block_len()];
        sched.ecb_encrypt(&pt, &mut ct);
        let mut back = vec![0u8; self.block_len()];
        sched.ecb_decrypt(&ct, &mut back);
        if back != pt {
            return Err(crate::error::Error::FailTestVector(self.name()));
        }
        Ok(())
    }
}

/// A key schedule produced by [`Cipher::setup`]. Schedules are opaque to
/// callers; every mode of operation and AEAD
/// construction in this crate programs only against this trait, never
/// against a concrete cipher type, so a mode written once works over any
/// registered cipher.
pub trait ScheduledKey {
    fn block_len(&self) -> usize;

    /// Encrypt exactly one block. Panics if `pt`/`ct` aren't exactly
    /// [`block_len`](ScheduledKey::block_len) bytes -- callers (the modes in
    /// this crate) always pass correctly sized slices.
    fn ecb_encrypt(&self, pt: &[u8], ct: &mut [u8]);

    /// Decrypt exactly one block.
    fn ecb_decrypt(&self, ct: &[u8], pt: &mut [u8]);
}
