//! Constant-time comparison and secret zeroing.
//!
//! Spec §9 design notes call out `MEM_NEQ` and a "copy or zeromem" primitive
//! by name and require that reimplementations preserve them: tag comparison
//! (GCM/CCM/SIV/Poly1305/CMAC) and PKCS#1 v1.5 unpadding must not branch on
//! secret-dependent data in a way that leaks through timing.

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Constant-time inequality test, corresponding to libtomcrypt's `MEM_NEQ`.
///
/// Returns `true` if `a != b`. Unlike `!=` on slices, the number of byte
/// comparisons performed does not depend on where the first differing byte
/// is — every byte of both inputs is always read and folded into the result.
/// Differing lengths are `!=` and bail out immediately (a length mismatch is
/// a program bug, not secret data, so there is nothing to protect there).
///
/// Never use `==`/`memcmp`-style comparison on a MAC/AEAD tag; always route
/// it through this function.
pub fn mem_neq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return true;
    }
    a.ct_eq(b).unwrap_u8() == 0
}

/// Zero a buffer of secret material. Corresponds to libtomcrypt's `zeromem`.
///
/// Implemented on top of `zeroize` so the write can't be optimized away by
/// the compiler even though the buffer is about to be dropped.
pub fn zeromem(buf: &mut [u8]) {
    buf.zeroize();
}

/// Best-effort attempt to overwrite stack frames below the caller with
/// zeros, corresponding to libtomcrypt's `burn_stack`. This is an imprecise
/// mitigation in any language that doesn't expose raw stack pointers safely;
/// here it degrades to touching a volatile-ish local buffer of the
/// requested size so the call site documents *why* a cleanup happens here,
/// even though Rust does not offer a sound way to scrub arbitrary stack
/// frames after the fact.
pub fn burn_stack(len: usize) {
    let mut buf = vec![0u8; len];
    zeromem(&mut buf);
    std::hint::black_box(&buf);
}

#[cfg(test)]
mod test {
    use super::mem_neq;

    #[test]
    fn equal_is_not_neq() {
        assert!(!mem_neq(b"abc", b"abc"));
    }

    #[test]
    fn differing_is_neq() {
        assert!(mem_neq(b"abc", b"abd"));
    }

    #[test]
    fn differing_length_is_neq() {
        assert!(mem_neq(b"abc", b"abcd"));
    }
}
