//! NH, the multiply-add universal hash used by Adiantum and HPolyNHC.
//!
//! The message is processed in 16-byte units. Each of the four passes adds
//! a window of the key to the message words and accumulates products of word
//! pairs modulo 2^64; pass `p` uses the key shifted by `16 * p` bytes.

use crate::error::{Error, Result};
use crate::testvector::{Fields, KnownAnswer, TestVector};
use crate::utils::{from_words, to_words};
use crate::variant::{Enumerated, InputLengths, Primitive};
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

/// Parameters of NH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NhVariant {
    /// Number of passes; each produces one 64-bit output word.
    pub passes: usize,
    /// Message and key word width in bytes.
    pub word_bytes: usize,
    /// Distance between the two words of a product.
    pub stride: usize,
    /// Units in a maximal message.
    pub unitcount: usize,
}

/// Byte lengths derived from an [`NhVariant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NhLengths {
    /// Message granularity.
    pub unit: usize,
    /// Longest message accepted by one call.
    pub messagemax: usize,
    /// Key length.
    pub key: usize,
    /// Output length.
    pub hash: usize,
}

/// The NH hash.
#[derive(Debug, Clone, Copy)]
pub struct Nh {
    variant: NhVariant,
}

impl Default for Nh {
    fn default() -> Self {
        Self::bind(NH_VARIANT, Enumerated(()))
    }
}

const NH_VARIANT: NhVariant = NhVariant {
    passes: 4,
    word_bytes: 4,
    stride: 2,
    unitcount: 64,
};

impl Nh {
    /// Byte lengths of the bound variant.
    pub fn lengths(&self) -> NhLengths {
        let v = &self.variant;
        let unit = v.word_bytes * v.stride * 2;
        NhLengths {
            unit,
            messagemax: unit * v.unitcount,
            key: unit * (v.unitcount + v.passes - 1),
            hash: 8 * v.passes,
        }
    }

    fn nh_pass(&self, key: &[u32], message: &[u32]) -> u64 {
        let stride = self.variant.stride;
        let mut sum = 0u64;
        for (m, k) in message.chunks_exact(stride * 2).zip(key.chunks_exact(stride * 2)) {
            for j in 0..stride {
                let a = m[j].wrapping_add(k[j]) as u64;
                let b = m[j + stride].wrapping_add(k[j + stride]) as u64;
                sum = sum.wrapping_add(a * b);
            }
        }
        sum
    }

    /// Hash one message of at most `messagemax` bytes.
    ///
    /// Longer inputs must be split by the caller into `messagemax` chunks,
    /// each hashed with the same key.
    pub fn nh(&self, key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
        let l = self.lengths();
        if message.is_empty() || message.len() > l.messagemax || message.len() % l.unit != 0 {
            return Err(Error::InvalidLength {
                field: "message",
                actual: message.len(),
            });
        }
        if key.len() != l.key {
            return Err(Error::InvalidLength {
                field: "key",
                actual: key.len(),
            });
        }
        let key: Vec<u32> = to_words(key)?;
        let message: Vec<u32> = to_words(message)?;
        let step = self.variant.stride * 2;
        let out: Vec<u64> = (0..self.variant.passes)
            .map(|p| self.nh_pass(&key[p * step..], &message))
            .collect();
        Ok(from_words(&out))
    }
}

impl Primitive for Nh {
    type Variant = NhVariant;

    fn variants() -> impl Iterator<Item = NhVariant> {
        core::iter::once(NH_VARIANT)
    }

    fn bind(variant: NhVariant, _: Enumerated) -> Self {
        Self { variant }
    }

    fn variant(&self) -> &NhVariant {
        &self.variant
    }

    fn name(&self) -> String {
        String::from("NH")
    }

    fn variant_name(&self) -> String {
        self.name()
    }

    fn test_input_lengths(&self) -> Vec<InputLengths> {
        let l = self.lengths();
        [l.unit, l.messagemax - l.unit, l.messagemax]
            .into_iter()
            .map(|m| vec![("key", l.key), ("message", m)])
            .collect()
    }
}

impl KnownAnswer for Nh {
    fn make_testvector(&self, input: Fields, description: &str) -> Result<TestVector> {
        let hash = self.nh(input.get("key")?, input.get("message")?)?;
        Ok(TestVector::new(self, description, input).with_output("hash", hash))
    }

    fn check_testvector(tv: &TestVector) -> Result<()> {
        let nh = Self::from_catalog(&tv.cipher)?;
        let hash = nh.nh(tv.input.get("key")?, tv.input.get("message")?)?;
        tv.expect_output("hash", &hash)
    }
}
