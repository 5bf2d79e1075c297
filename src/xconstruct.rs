//! Nonce extension for the ARX stream ciphers (XSalsa20, XChaCha).
//!
//! The first part of the long nonce is fed to the base cipher's hash mode to
//! derive a subkey; the rest becomes the base cipher's nonce. This is only
//! sound when the hash output is exactly one key long, so variants that
//! violate that are never enumerated.

use crate::error::{expect_len, Result};
use crate::latindance::{LatinVariant, Latindance, Layout, StreamCipher};
use crate::testvector::{self, Fields, KnownAnswer, TestVector};
use crate::variant::{Enumerated, InputLengths, Primitive};
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use zeroize::Zeroize;

/// Variant of an extended-nonce stream cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XVariant {
    /// Name of the construction, e.g. `XChaCha`.
    pub cipher: &'static str,
    /// Number of rounds of the base cipher.
    pub rounds: usize,
    /// Variant of the base cipher.
    pub delegate: LatinVariant,
    /// Key length in bytes.
    pub key: usize,
    /// Extended nonce length in bytes.
    pub nonce: usize,
}

/// Extended-nonce construction over the ARX cipher with layout `L`.
#[derive(Debug, Clone, Copy)]
pub struct XConstruct<L: Layout> {
    variant: XVariant,
    delegate: Latindance<L>,
}

/// XSalsa20 and its reduced-round variants.
pub type XSalsa20 = XConstruct<crate::latindance::Salsa20>;
/// XChaCha with a 64-bit counter, as used by Adiantum.
pub type XChaCha = XConstruct<crate::latindance::ChaCha>;

impl<L: Layout> XConstruct<L> {
    /// Create the variant with the given round count and key length.
    pub fn with_rounds_keylen(rounds: usize, key_len: usize) -> Result<Self> {
        Self::choose_variant(|v| v.rounds == rounds && v.key == key_len)
    }

    /// The base cipher.
    pub fn delegate(&self) -> &Latindance<L> {
        &self.delegate
    }

    /// Length of the nonce prefix consumed by subkey derivation.
    fn prefix_len(&self) -> usize {
        self.delegate.hash_lengths().nonceoffset
    }
}

impl<L: Layout> StreamCipher for XConstruct<L> {
    fn key_len(&self) -> usize {
        self.variant.key
    }

    fn nonce_len(&self) -> usize {
        self.variant.nonce
    }

    fn block_len(&self) -> usize {
        self.delegate.block_len()
    }

    fn gen_output(&self, key: &[u8], nonce: &[u8], offset: u64) -> Result<Vec<u8>> {
        expect_len("nonce", self.variant.nonce, nonce.len())?;
        let (prefix, rest) = nonce.split_at(self.prefix_len());
        let mut subkey = self.delegate.hash(key, prefix)?;
        let out = self.delegate.gen_output(&subkey, rest, offset);
        subkey.zeroize();
        out
    }
}

impl<L: Layout> Primitive for XConstruct<L> {
    type Variant = XVariant;

    fn variants() -> impl Iterator<Item = XVariant> {
        L::variants().filter_map(|v| {
            let d = Latindance::<L>::bind(v, Enumerated(()));
            let hl = d.hash_lengths();
            // The hash output must be exactly one key long.
            (hl.output == v.key).then_some(XVariant {
                cipher: L::X_NAME,
                rounds: v.rounds,
                delegate: v,
                key: hl.key,
                nonce: hl.nonceoffset + v.nonce,
            })
        })
    }

    fn bind(variant: XVariant, _: Enumerated) -> Self {
        Self {
            variant,
            delegate: Latindance::bind(variant.delegate, Enumerated(())),
        }
    }

    fn variant(&self) -> &XVariant {
        &self.variant
    }

    fn name(&self) -> String {
        String::from(L::X_NAME)
    }

    fn variant_name(&self) -> String {
        format!("X{}", self.delegate.variant_name())
    }

    fn test_input_lengths(&self) -> Vec<InputLengths> {
        vec![vec![("key", self.variant.key), ("nonce", self.variant.nonce)]]
    }
}

impl<L: Layout> KnownAnswer for XConstruct<L> {
    fn make_testvector(&self, input: Fields, description: &str) -> Result<TestVector> {
        testvector::make_stream(self, input, description)
    }

    fn check_testvector(tv: &TestVector) -> Result<()> {
        testvector::check_stream(&Self::from_catalog(&tv.cipher)?, tv)
    }
}
