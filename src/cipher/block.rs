//! Block ciphers: AES and DES/3DES, each implementing
//! the [cipher descriptor contract](crate::cipher::Cipher).
//!
//! A block cipher descriptor only knows how to transform exactly one block;
//! turning that into something that can handle arbitrary-length messages is
//! the job of a [mode of operation](crate::cipher::modes) layered on top.

pub mod aes;
pub(crate) mod blowfish;
mod des;

pub use {
    aes::{Aes128, Aes192, Aes256},
    des::{Des, TripleDes},
};
