//! The algorithm registry.
//!
//! libtomcrypt keeps three fixed-capacity tables of function-pointer
//! descriptors (cipher/hash/PRNG) that callers populate once at process
//! start via `register_cipher`/`register_hash`/`register_prng`, then look up
//! by name or numeric ID from anywhere in the program. Rust's answer to "a
//! table of function pointers" is a table of trait objects, so each table
//! here holds `Box<dyn Descriptor>` slots instead of C structs of `fn`
//! pointers.
//!
//! Registration is explicitly **not** thread-safe: callers are expected to
//! build a [`Registry`] to completion before sharing it across threads,
//! exactly as the C library expects `register_cipher` to be called only
//! during single-threaded startup. After that, lookups only read the table
//! and are safe to call concurrently from multiple threads holding a shared
//! reference or an `Arc<Registry>`.

use crate::{
    cipher::Cipher,
    error::{Error, Result},
    hash::Hash,
    random::Prng,
};

/// Default per-table capacity.
pub const DEFAULT_TABLE_SIZE: usize = 32;

/// A named, boxed descriptor slot.
struct Slot<D> {
    name: &'static str,
    id: u8,
    desc: D,
}

/// A fixed-capacity table of descriptors for one algorithm class.
///
/// Generic over the table size `N` so a caller who needs more than the
/// default 32 slots can declare `Table<Box<dyn Cipher>, 64>` directly,
/// without hardcoding the table size per algorithm class.
pub struct Table<D, const N: usize = DEFAULT_TABLE_SIZE> {
    slots: Vec<Slot<D>>,
}

impl<D, const N: usize> Default for Table<D, N> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<D, const N: usize> Table<D, N> {
    /// Register `desc` under `name`/`id`. If `name` is already registered,
    /// returns the existing index instead of adding a duplicate slot.
    /// Returns [`Error::Mem`] if the table is full and `name` is new.
    pub fn register(&mut self, name: &'static str, id: u8, desc: D) -> Result<usize> {
        if let Some(i) = self.slots.iter().position(|s| s.name == name) {
            return Ok(i);
        }
        if self.slots.len() >= N {
            log::warn!("registry table full ({N} slots), rejecting registration of {name:?}");
            return Err(Error::Mem);
        }
        self.slots.push(Slot { name, id, desc });
        Ok(self.slots.len() - 1)
    }

    /// Remove a registered descriptor by name. libtomcrypt's `unregister_*`
    /// functions remove by pointer identity; here every `Box<dyn _>` slot's
    /// identity is its registry slot, so removing by name is equivalent and
    /// far more ergonomic for callers.
    pub fn unregister(&mut self, name: &str) -> bool {
        let before = self.slots.len();
        self.slots.retain(|s| s.name != name);
        self.slots.len() != before
    }

    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == name)
    }

    pub fn find_by_id(&self, id: u8) -> Option<usize> {
        self.slots.iter().position(|s| s.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&D> {
        self.slots.get(index).map(|s| &s.desc)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &'static str, u8, &D)> {
        self.slots.iter().enumerate().map(|(i, s)| (i, s.name, s.id, &s.desc))
    }
}

impl<const N: usize> Table<Box<dyn Cipher>, N> {
    /// Find a cipher by name, or fall back to the first registered cipher
    /// whose block length and key length constraints both accept the
    /// requested sizes.
    pub fn find_cipher_any(&self, name: &str, block_len: usize, key_len: usize) -> Option<usize> {
        if let Some(i) = self.find_by_name(name) {
            return Some(i);
        }
        self.slots.iter().position(|s| {
            s.desc.block_len() == block_len
                && key_len >= s.desc.min_key_len()
                && key_len <= s.desc.max_key_len()
        })
    }

    /// Register `desc`, but only after it passes its own `self_test`. A
    /// failing self-test is always fatal to the registration that
    /// triggered it -- callers get back the error instead of a descriptor
    /// that can't round-trip its own output.
    pub fn register_tested(&mut self, name: &'static str, id: u8, desc: Box<dyn Cipher>) -> Result<usize> {
        if let Err(e) = desc.self_test() {
            log::warn!("self-test failed for cipher {name:?} at registration: {e}");
            return Err(e);
        }
        self.register(name, id, desc)
    }
}

impl<const N: usize> Table<Box<dyn Hash>, N> {
    /// Register `desc`, but only after it passes its own `self_test`. A
    /// failing self-test is always fatal to the registration that
    /// triggered it -- callers get back the error instead of a descriptor
    /// that can't round-trip its own output.
    pub fn register_tested(&mut self, name: &'static str, id: u8, mut desc: Box<dyn Hash>) -> Result<usize> {
        if let Err(e) = desc.self_test() {
            log::warn!("self-test failed for hash {name:?} at registration: {e}");
            return Err(e);
        }
        self.register(name, id, desc)
    }
}

/// The process-wide set of descriptor tables. Built once via
/// [`Registry::with_defaults`], then shared read-only for the remainder of
/// the process.
pub struct Registry {
    pub ciphers: Table<Box<dyn Cipher>>,
    pub hashes: Table<Box<dyn Hash>>,
    pub prngs: Table<Box<dyn Prng>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self { ciphers: Table::default(), hashes: Table::default(), prngs: Table::default() }
    }
}

impl Registry {
    /// An empty registry, matching libtomcrypt's `ltc_mp`-less initial state.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with this crate's built-in ciphers, hashes,
    /// and PRNGs, the way libtomcrypt demos call
    /// `register_all_ciphers()`/`register_all_hashes()` before doing
    /// anything else.
    pub fn with_defaults() -> Result<Self> {
        let mut reg = Self::new();

        reg.ciphers.register_tested("aes128", 0, Box::new(crate::cipher::block::Aes128))?;
        reg.ciphers.register_tested("aes192", 1, Box::new(crate::cipher::block::Aes192))?;
        reg.ciphers.register_tested("aes256", 2, Box::new(crate::cipher::block::Aes256))?;
        reg.ciphers.register_tested("des", 3, Box::new(crate::cipher::block::Des))?;
        reg.ciphers.register_tested("3des", 4, Box::new(crate::cipher::block::TripleDes))?;

        reg.hashes.register_tested("sha1", 0, Box::new(crate::hash::Sha1::new()))?;
        reg.hashes.register_tested("sha224", 1, Box::new(crate::hash::Sha224::new()))?;
        reg.hashes.register_tested("sha256", 2, Box::new(crate::hash::Sha256::new()))?;
        reg.hashes.register_tested("sha384", 3, Box::new(crate::hash::Sha384::new()))?;
        reg.hashes.register_tested("sha512", 4, Box::new(crate::hash::Sha512::new()))?;
        reg.hashes.register_tested("sha3-224", 5, Box::new(crate::hash::Sha3_224::new()))?;
        reg.hashes.register_tested("sha3-256", 6, Box::new(crate::hash::Sha3_256::new()))?;
        reg.hashes.register_tested("sha3-384", 7, Box::new(crate::hash::Sha3_384::new()))?;
        reg.hashes.register_tested("sha3-512", 8, Box::new(crate::hash::Sha3_512::new()))?;
        reg.hashes.register_tested("md5", 9, Box::new(crate::hash::Md5::new()))?;

        reg.prngs.register("fortuna", 0, Box::new(crate::random::Fortuna::new()))?;
        reg.prngs.register("yarrow", 1, Box::new(crate::random::Yarrow::new()))?;
        reg.prngs.register("chacha20prng", 2, Box::new(crate::random::ChaCha20Prng::new()))?;
        reg.prngs.register("sober128", 3, Box::new(crate::random::Sober128Prng::new()))?;
        reg.prngs.register("rc4", 4, Box::new(crate::random::Rc4Prng::new()))?;
        reg.prngs.register("sprng", 5, Box::new(crate::random::SystemPrng::new()))?;

        Ok(reg)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn registering_same_name_twice_returns_same_index() {
        let mut t: Table<Box<dyn Cipher>> = Table::default();
        let i1 = t.register("aes128", 0, Box::new(crate::cipher::block::Aes128)).unwrap();
        let i2 = t.register("aes128", 0, Box::new(crate::cipher::block::Aes128)).unwrap();
        assert_eq!(i1, i2);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn table_full_rejects_new_names() {
        struct Tiny;
        impl Cipher for Tiny {
            fn name(&self) -> &'static str {
                "tiny"
            }
            fn min_key_len(&self) -> usize {
                1
            }
            fn max_key_len(&self) -> usize {
                1
            }
            fn block_len(&self) -> usize {
                1
            }
            fn default_rounds(&self) -> u32 {
                1
            }
            fn setup(&self, _key: &[u8], _rounds: u32) -> Result<Box<dyn crate::cipher::ScheduledKey>> {
                unimplemented!()
            }
        }

        let mut t: Table<Box<dyn Cipher>, 1> = Table::default();
        t.register("a", 0, Box::new(Tiny)).unwrap();
        assert!(t.register("b", 1, Box::new(Tiny)).is_err());
    }

    #[test]
    fn with_defaults_registers_aes_and_sha_family() {
        let reg = Registry::with_defaults().unwrap();
        assert!(reg.ciphers.find_by_name("aes256").is_some());
        assert!(reg.hashes.find_by_name("sha256").is_some());
        assert!(reg.prngs.find_by_name("fortuna").is_some());
    }

    #[test]
    fn register_tested_rejects_a_cipher_that_fails_self_test() {
        struct Broken;
        impl Cipher for Broken {
            fn name(&self) -> &'static str {
                "broken"
            }
            fn min_key_len(&self) -> usize {
                16
            }
            fn max_key_len(&self) -> usize {
                16
            }
            fn block_len(&self) -> usize {
                16
            }
            fn default_rounds(&self) -> u32 {
                1
            }
            fn setup(&self, _key: &[u8], _rounds: u32) -> Result<Box<dyn crate::cipher::ScheduledKey>> {
                struct NoOp;
                impl crate::cipher::ScheduledKey for NoOp {
                    fn block_len(&self) -> usize {
                        16
                    }
                    fn ecb_encrypt(&self, pt: &[u8], ct: &mut [u8]) {
                        ct.copy_from_slice(pt);
                        ct[0] ^= 1;
                    }
                    fn ecb_decrypt(&self, ct: &[u8], pt: &mut [u8]) {
                        pt.copy_from_slice(ct);
                    }
                }
                Ok(Box::new(NoOp))
            }
        }

        let mut t: Table<Box<dyn Cipher>> = Table::default();
        assert!(t.register_tested("broken", 0, Box::new(Broken)).is_err());
        assert!(t.find_by_name("broken").is_none());
    }

    #[test]
    fn register_tested_accepts_a_correct_cipher() {
        let mut t: Table<Box<dyn Cipher>> = Table::default();
        assert!(t.register_tested("aes128", 0, Box::new(crate::cipher::block::Aes128)).is_ok());
        assert!(t.find_by_name("aes128").is_some());
    }
}
