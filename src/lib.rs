//! # HBSH - Hash, Block cipher, Stream cipher, Hash
//!
//! A reference implementation of the HBSH length-preserving tweakable
//! wide-block construction and of every primitive it is built from. It is
//! meant to pin the algorithms down bit-exactly and to serve as the oracle
//! that faster implementations are checked against.
//!
//! ## Contents
//!
//! - **Stream ciphers**: Salsa20, ChaCha (64-bit nonce), ChaCha20 with the
//!   RFC 7539 layout and Bachata, plus their hash modes (HSalsa20, HChaCha)
//! - **Nonce extension**: XSalsa20 and XChaCha
//! - **Hashes**: NH, Poly1305 and NHPoly1305
//! - **Wide-block ciphers**: Adiantum, HPolyC and HPolyNHC, over XChaCha and
//!   AES-256
//! - **Known-answer records**: generation and checking for all of the above
//!
//! Every primitive is bound to one variant (round count, key length, ...)
//! when it is created and is immutable afterwards. Derived keys and cipher
//! states are wiped when dropped.
//!
//! ## Usage
//!
//! ```rust
//! use hbsh::{Adiantum, Primitive};
//!
//! let adiantum = Adiantum::with_rounds(12)?;
//! let key = [0x42u8; 32];
//! let tweak = b"sector 7";
//! let block = [0u8; 512];
//!
//! let ciphertext = adiantum.encrypt(&block, &key, tweak)?;
//! assert_eq!(ciphertext.len(), block.len());
//!
//! let decrypted = adiantum.decrypt(&ciphertext, &key, tweak)?;
//! assert_eq!(decrypted, block);
//! assert_eq!(adiantum.variant_name(), "Adiantum_XChaCha12_32_AES256");
//! # Ok::<(), hbsh::Error>(())
//! ```
//!
//! Stream ciphers share the [`StreamCipher`] interface:
//!
//! ```rust
//! use hbsh::{StreamCipher, XChaCha};
//!
//! let xchacha = XChaCha::with_rounds_keylen(20, 32)?;
//! let key = [1u8; 32];
//! let nonce = [2u8; 24];
//! let ct = xchacha.encrypt(b"attack at dawn", &key, &nonce, 0)?;
//! assert_eq!(xchacha.decrypt(&ct, &key, &nonce, 0)?, b"attack at dawn");
//! # Ok::<(), hbsh::Error>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod adiantum;
pub mod blockcipher;
mod error;
pub mod hbsh;
pub mod hpolyc;
pub mod hpolynhc;
pub mod latindance;
pub mod nh;
pub mod nhpoly1305;
pub mod poly1305;
pub mod testvector;
pub mod utils;
pub mod variant;
pub mod xconstruct;

#[cfg(test)]
mod tests;

pub use adiantum::Adiantum;
pub use blockcipher::{Aes, BlockCipher};
pub use error::{Error, Result};
pub use hbsh::{Hbsh, TweakHash};
pub use hpolyc::HPolyC;
pub use hpolynhc::HPolyNHC;
pub use latindance::{
    BachataCipher, ChaCha20RfcCipher, ChaChaCipher, Latindance, Salsa20Cipher, StreamCipher,
};
pub use nh::Nh;
pub use nhpoly1305::NhPoly1305;
pub use poly1305::Poly1305;
pub use testvector::{Fields, KnownAnswer, TestVector};
pub use variant::{Primitive, Variant};
pub use xconstruct::{XChaCha, XSalsa20};
