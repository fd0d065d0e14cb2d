//! PRNGs: Yarrow, Fortuna, ChaCha20-PRNG,
//! Sober-128, RC4, and `sprng` (a raw system-entropy wrapper), all behind
//! one descriptor contract so the [registry](crate::registry) can hold
//! them as `Box<dyn Prng>` the same way it holds ciphers and hashes.

pub mod chacha20;
pub mod fortuna;
pub mod rc4;
pub mod sober128;
pub mod sprng;
pub mod yarrow;

pub use {chacha20::ChaCha20Prng, fortuna::Fortuna, rc4::Rc4Prng, sober128::Sober128Prng, sprng::SystemPrng, yarrow::Yarrow};

use crate::error::Result;

/// The PRNG descriptor contract: `start`/`add_entropy`/
/// `ready`/`read`/`done`/`export`/`import`/`self_test`.
///
/// `start` is each type's constructor rather than a trait method here
/// (state layout differs too much across Yarrow/Fortuna/ChaCha20-PRNG to
/// share one "empty" representation) -- everything after construction goes
/// through this trait.
pub trait Prng {
    /// Stable name used for registry lookup, e.g. `"fortuna"`.
    fn name(&self) -> &'static str;

    /// Size in bytes of the opaque state blob produced by
    /// [`export`](Prng::export).
    fn export_size(&self) -> usize;

    /// Mix fresh entropy into the pool. Does not by itself change generator
    /// output until [`ready`](Prng::ready) is called -- reseeding happens on
    /// every explicit `add_entropy` + `ready` pair.
    fn add_entropy(&mut self, data: &[u8]) -> Result<()>;

    /// Fold pooled entropy into the generator's active key/state.
    fn ready(&mut self) -> Result<()>;

    /// Fill `buf` with pseudorandom bytes, returning the number of bytes
    /// actually written. A short read (less than `buf.len()`) signals the
    /// generator has not been seeded -- callers should treat that as
    /// [`crate::error::Error::ErrorReadPrng`], not retry silently.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Zero all sensitive internal state.
    fn done(&mut self);

    /// Serialize current state to an opaque blob that can later be restored
    /// with [`import`](Prng::import), letting a long-running process persist
    /// PRNG state across restarts without re-seeding from scratch.
    fn export(&self) -> Vec<u8>;

    /// Restore state previously produced by [`export`](Prng::export).
    fn import(&mut self, data: &[u8]) -> Result<()>;
}

#[cfg(test)]
mod test {
    use super::*;

    pub(crate) fn exercise_basic_contract(prng: &mut dyn Prng) {
        prng.add_entropy(b"some entropy, does not need to be uniform").unwrap();
        prng.ready().unwrap();

        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        assert_eq!(prng.read(&mut a), 32);
        assert_eq!(prng.read(&mut b), 32);
        assert_ne!(a, b, "{} produced the same block twice in a row", prng.name());

        let state = prng.export();
        assert_eq!(state.len(), prng.export_size());
    }
}
