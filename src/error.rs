//! The crate-wide error taxonomy.
//!
//! libtomcrypt returns one of roughly thirty `CRYPT_*` status codes from
//! almost every public function. Rather than threading a single
//! flat enum through every layer the way the C code does, this crate keeps
//! the same vocabulary but attaches the context a caller actually needs to
//! react to each failure (which key size was rejected and what would have
//! been valid, how many bytes overflowed a buffer, and so on).

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, Error>;

/// The crate-wide error type. Variant names track libtomcrypt's `CRYPT_*`
/// taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    #[error("key size {got} invalid, expected one of {valid:?}")]
    InvalidKeySize { got: usize, valid: &'static [usize] },

    #[error("invalid number of rounds: {0}")]
    InvalidRounds(u32),

    #[error("self-test failed for {0}")]
    FailTestVector(&'static str),

    #[error("buffer overflow: needed {needed} bytes, had {available}")]
    BufferOverflow { needed: usize, available: usize },

    #[error("invalid packet structure: {0}")]
    InvalidPacket(&'static str),

    #[error("invalid PRNG state size")]
    InvalidPrngSize,

    #[error("PRNG read failed: {0}")]
    ErrorReadPrng(&'static str),

    #[error("unknown cipher: {0}")]
    InvalidCipher(&'static str),

    #[error("unknown hash: {0}")]
    InvalidHash(&'static str),

    #[error("unknown PRNG: {0}")]
    InvalidPrng(&'static str),

    #[error("registry table full")]
    Mem,

    #[error("public/private key type mismatch")]
    PkTypeMismatch,

    #[error("operation requires a private key")]
    PkNotPrivate,

    #[error("invalid argument: {0}")]
    InvalidArg(&'static str),

    #[error("file not found")]
    FileNotFound,

    #[error("invalid public key type")]
    PkInvalidType,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("ASN.1 decode error: {0}")]
    PkAsn1Error(&'static str),

    #[error("input too long")]
    InputTooLong,

    #[error("invalid key size for public-key operation")]
    PkInvalidSize,

    #[error("invalid prime size requested")]
    InvalidPrimeSize,

    #[error("invalid PKCS#1/PKCS#5 padding")]
    PkInvalidPadding,

    #[error("hash output would overflow the destination")]
    HashOverflow,

    #[error("password required but not supplied")]
    PwCtxMissing,

    #[error("unrecognized or malformed PEM")]
    UnknownPem,

    #[error("authentication tag mismatch")]
    TagMismatch,

    #[error("CRT hardening check failed: possible fault attack")]
    CrtHardeningFailed,
}
