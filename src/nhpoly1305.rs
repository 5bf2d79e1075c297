//! NHPoly1305: NH over each 1 KiB chunk, Poly1305 over the NH outputs.

use crate::error::{expect_len, Result};
use crate::nh::Nh;
use crate::poly1305::Poly1305;
use crate::testvector::{Fields, KnownAnswer, TestVector};
use crate::utils::zero_pad;
use crate::variant::{Enumerated, InputLengths, Primitive};
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

/// Variant of NHPoly1305.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NhPoly1305Variant {
    /// Poly1305 key followed by the NH key.
    pub key: usize,
    /// Hash length.
    pub output: usize,
}

const POLY_KEY: usize = 16;

/// The NHPoly1305 hash.
#[derive(Debug, Clone, Copy)]
pub struct NhPoly1305 {
    variant: NhPoly1305Variant,
    nh: Nh,
    poly: Poly1305,
}

impl Default for NhPoly1305 {
    fn default() -> Self {
        Self::bind(nhpoly1305_variant(), Enumerated(()))
    }
}

fn nhpoly1305_variant() -> NhPoly1305Variant {
    NhPoly1305Variant {
        key: POLY_KEY + Nh::default().lengths().key,
        output: 16,
    }
}

impl NhPoly1305 {
    /// Hash `message` of any length.
    ///
    /// The message is zero-padded to a multiple of 16 bytes, each chunk of
    /// up to 1024 bytes goes through NH, and the concatenated NH outputs are
    /// hashed by Poly1305 with a zero mask.
    pub fn hash(&self, key: &[u8], message: &[u8]) -> Result<[u8; 16]> {
        expect_len("key", self.variant.key, key.len())?;
        let (poly_key, nh_key) = key.split_at(POLY_KEY);
        let mut padded = message.to_vec();
        zero_pad(&mut padded, self.nh.lengths().unit);
        let mut nh_hashes = Vec::new();
        for chunk in padded.chunks(self.nh.lengths().messagemax) {
            nh_hashes.extend_from_slice(&self.nh.nh(nh_key, chunk)?);
        }
        self.poly.mac(&nh_hashes, &[], poly_key)
    }
}

impl Primitive for NhPoly1305 {
    type Variant = NhPoly1305Variant;

    fn variants() -> impl Iterator<Item = NhPoly1305Variant> {
        core::iter::once(nhpoly1305_variant())
    }

    fn bind(variant: NhPoly1305Variant, _: Enumerated) -> Self {
        Self {
            variant,
            nh: Nh::default(),
            poly: Poly1305::default(),
        }
    }

    fn variant(&self) -> &NhPoly1305Variant {
        &self.variant
    }

    fn name(&self) -> String {
        String::from("NHPoly1305")
    }

    fn variant_name(&self) -> String {
        self.name()
    }

    fn test_input_lengths(&self) -> Vec<InputLengths> {
        [0, 16, 19, 1024, 1040, 2048]
            .into_iter()
            .map(|m| vec![("key", self.variant.key), ("message", m)])
            .collect()
    }
}

impl KnownAnswer for NhPoly1305 {
    fn make_testvector(&self, input: Fields, description: &str) -> Result<TestVector> {
        let hash = self.hash(input.get("key")?, input.get("message")?)?;
        Ok(TestVector::new(self, description, input).with_output("hash", hash.to_vec()))
    }

    fn check_testvector(tv: &TestVector) -> Result<()> {
        let h = Self::from_catalog(&tv.cipher)?;
        let hash = h.hash(tv.input.get("key")?, tv.input.get("message")?)?;
        tv.expect_output("hash", &hash)
    }
}
