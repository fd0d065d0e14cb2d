//! Cryptographic hash functions.
//!
//! A [`Hash`] is the hash descriptor contract: a streaming `update`/
//! `finalize` state machine with a fixed digest size, block size, and DER
//! OID, so [the registry](crate::registry) can hold many different hash
//! algorithms behind one object-safe interface, the same way
//! [`crate::cipher::Cipher`] does for block ciphers. The registry only ever
//! touches hashes through this trait; only the concrete per-algorithm
//! types' contract matters to callers, not their internals.
//!
//! SHA-1/SHA-2 follow the [Merkle-Damgard
//! construction](https://en.wikipedia.org/wiki/Merkle%E2%80%93Damg%C3%A5rd_construction)
//! with a [Davies-Meyer](https://en.wikipedia.org/wiki/One-way_compression_function#Davies%E2%80%93Meyer)
//! compression function built from a dedicated block cipher (SHACAL-1 /
//! SHACAL-2 respectively); SHA-3 instead sponges over the Keccak-f[1600]
//! permutation.

pub mod md5;
pub mod sha1;
pub mod sha2;
pub mod sha3;

pub use {
    md5::Md5,
    sha1::Sha1,
    sha2::{Sha224, Sha256, Sha384, Sha512},
    sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512},
};

use crate::error::Result;

/// The hash descriptor contract.
///
/// Implementors are the per-algorithm state machines; this is what the rest
/// of the crate (HMAC, OMAC/PMAC, GCM's GHASH key derivation, PBKDF2, HKDF,
/// the registry) actually programs against.
pub trait Hash {
    /// Stable name used for registry lookup, e.g. `"sha256"`.
    fn name(&self) -> &'static str;

    /// Output digest size in bytes.
    fn digest_size(&self) -> usize;

    /// Internal block size in bytes, used by HMAC's key padding.
    fn block_size(&self) -> usize;

    /// DER OID arcs identifying this hash algorithm, used when building a
    /// `DigestInfo` (PKCS#1 v1.5 signatures) or an X.509 `AlgorithmIdentifier`.
    fn der_oid(&self) -> &'static [u32];

    /// Absorb more input. May be called any number of times before
    /// [`finalize`](Hash::finalize).
    fn update(&mut self, data: &[u8]);

    /// Produce the digest and reset internal state to fresh/empty.
    fn finalize(&mut self) -> Vec<u8>;

    /// One-shot digest of `data`: `update` then `finalize`, guaranteed to
    /// match any split `update` sequence over the same bytes.
    fn hash(&mut self, data: &[u8]) -> Vec<u8> {
        self.update(data);
        self.finalize()
    }

    /// Run the algorithm's published test vector and confirm the digest
    /// matches, corresponding to the descriptor's `self_test` operation.
    fn self_test(&mut self) -> Result<()>;

    /// A boxed clone of the current (possibly mid-stream) state, used by
    /// callers like HMAC that need an independent copy of a primed hasher.
    fn clone_box(&self) -> Box<dyn Hash>;
}
