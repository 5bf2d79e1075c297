//! The narrow block cipher HBSH is built around: AES, through the RustCrypto
//! `aes` crate.
//!
//! Only the two-operation contract of [`BlockCipher`] is used by the rest of
//! the crate; the key schedule is expanded on every call and dropped (and
//! wiped) before returning.

use crate::error::{expect_len, Error, Result};
use crate::testvector::{Fields, KnownAnswer, TestVector};
use crate::variant::{Enumerated, InputLengths, Primitive};
use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

/// Size of an AES block in bytes.
pub const BLOCK_LEN: usize = 16;

/// Variant of AES.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AesVariant {
    /// Key length in bytes: 16, 24 or 32.
    pub key: usize,
    /// Block length in bytes; always 16.
    pub block: usize,
}

/// A 128-bit block cipher keyed per call.
pub trait BlockCipher {
    /// Key length in bytes.
    fn key_len(&self) -> usize;

    /// Encrypt one block.
    fn encrypt_block(&self, block: &[u8; BLOCK_LEN], key: &[u8]) -> Result<[u8; BLOCK_LEN]>;

    /// Decrypt one block.
    fn decrypt_block(&self, block: &[u8; BLOCK_LEN], key: &[u8]) -> Result<[u8; BLOCK_LEN]>;
}

enum Schedule {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl Schedule {
    fn expand(key: &[u8]) -> Result<Self> {
        let bad_key = |_| Error::InvalidLength {
            field: "key",
            actual: key.len(),
        };
        match key.len() {
            16 => Aes128::new_from_slice(key).map(Self::Aes128).map_err(bad_key),
            24 => Aes192::new_from_slice(key).map(Self::Aes192).map_err(bad_key),
            _ => Aes256::new_from_slice(key).map(Self::Aes256).map_err(bad_key),
        }
    }

    fn encrypt(&self, block: &mut [u8; BLOCK_LEN]) {
        let b = GenericArray::from_mut_slice(block);
        match self {
            Self::Aes128(c) => c.encrypt_block(b),
            Self::Aes192(c) => c.encrypt_block(b),
            Self::Aes256(c) => c.encrypt_block(b),
        }
    }

    fn decrypt(&self, block: &mut [u8; BLOCK_LEN]) {
        let b = GenericArray::from_mut_slice(block);
        match self {
            Self::Aes128(c) => c.decrypt_block(b),
            Self::Aes192(c) => c.decrypt_block(b),
            Self::Aes256(c) => c.decrypt_block(b),
        }
    }
}

/// AES with a fixed key length.
#[derive(Debug, Clone, Copy)]
pub struct Aes {
    variant: AesVariant,
}

impl Aes {
    /// AES with a `key_len`-byte key.
    pub fn with_keylen(key_len: usize) -> Result<Self> {
        Self::choose_variant(|v| v.key == key_len)
    }

    fn schedule(&self, key: &[u8]) -> Result<Schedule> {
        expect_len("key", self.variant.key, key.len())?;
        Schedule::expand(key)
    }
}

impl BlockCipher for Aes {
    fn key_len(&self) -> usize {
        self.variant.key
    }

    fn encrypt_block(&self, block: &[u8; BLOCK_LEN], key: &[u8]) -> Result<[u8; BLOCK_LEN]> {
        let mut out = *block;
        self.schedule(key)?.encrypt(&mut out);
        Ok(out)
    }

    fn decrypt_block(&self, block: &[u8; BLOCK_LEN], key: &[u8]) -> Result<[u8; BLOCK_LEN]> {
        let mut out = *block;
        self.schedule(key)?.decrypt(&mut out);
        Ok(out)
    }
}

impl Primitive for Aes {
    type Variant = AesVariant;

    fn variants() -> impl Iterator<Item = AesVariant> {
        [16, 24, 32].into_iter().map(|key| AesVariant {
            key,
            block: BLOCK_LEN,
        })
    }

    fn bind(variant: AesVariant, _: Enumerated) -> Self {
        Self { variant }
    }

    fn variant(&self) -> &AesVariant {
        &self.variant
    }

    fn name(&self) -> String {
        String::from("AES")
    }

    fn variant_name(&self) -> String {
        format!("AES{}", self.variant.key * 8)
    }

    fn test_input_lengths(&self) -> Vec<InputLengths> {
        ["plaintext", "ciphertext"]
            .into_iter()
            .map(|m| vec![("key", self.variant.key), (m, BLOCK_LEN)])
            .collect()
    }
}

fn block(field: &'static str, bytes: &[u8]) -> Result<[u8; BLOCK_LEN]> {
    bytes.try_into().map_err(|_| Error::InvalidLength {
        field,
        actual: bytes.len(),
    })
}

impl KnownAnswer for Aes {
    /// Encrypts `plaintext` if the input has one, otherwise decrypts
    /// `ciphertext`; both end up in the output.
    fn make_testvector(&self, mut input: Fields, description: &str) -> Result<TestVector> {
        let (pt, ct) = match input.remove("plaintext") {
            Some(pt) => {
                let pt = block("plaintext", &pt)?;
                (pt, self.encrypt_block(&pt, input.get("key")?)?)
            }
            None => {
                let ct = input.remove("ciphertext").ok_or(Error::MalformedTestVector)?;
                let ct = block("ciphertext", &ct)?;
                (self.decrypt_block(&ct, input.get("key")?)?, ct)
            }
        };
        Ok(TestVector::new(self, description, input)
            .with_output("plaintext", pt.to_vec())
            .with_output("ciphertext", ct.to_vec()))
    }

    fn check_testvector(tv: &TestVector) -> Result<()> {
        let aes = Self::from_catalog(&tv.cipher)?;
        let key = tv.input.get("key")?;
        let pt = block("plaintext", tv.output.get("plaintext")?)?;
        let ct = block("ciphertext", tv.output.get("ciphertext")?)?;
        tv.expect_output("ciphertext", &aes.encrypt_block(&pt, key)?)?;
        tv.expect_output("plaintext", &aes.decrypt_block(&ct, key)?)
    }
}
