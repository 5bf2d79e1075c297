//! HBSH: a length-preserving tweakable wide-block cipher built from a
//! tweak/message hash, a 128-bit block cipher and a stream cipher.
//!
//! The block is split into a left part (everything but the last 16 bytes)
//! and a right part (the last 16 bytes). Encryption is
//!
//! ```text
//! pm = right + H(tweak, left)        mod 2^128
//! cm = E(pm)
//! cl = left ^ XChaCha(cm)
//! cr = cm - H(tweak, cl)             mod 2^128
//! ```
//!
//! and decryption runs the same steps backwards. The hash, block cipher key
//! and any other hash keys are derived from the top-level key on every call
//! by encrypting zeros under the stream cipher with an empty nonce.
//!
//! The constructions differ only in the hash, which is supplied through the
//! [`TweakHash`] trait: see [`crate::adiantum`], [`crate::hpolyc`] and
//! [`crate::hpolynhc`].

use crate::blockcipher::{Aes, AesVariant, BlockCipher, BLOCK_LEN};
use crate::error::{expect_len, Error, Result};
use crate::latindance::StreamCipher;
use crate::testvector::{Fields, KnownAnswer, TestVector};
use crate::utils::{block_add, block_sub, zero_pad};
use crate::variant::{Enumerated, InputLengths, Primitive};
use crate::xconstruct::{XChaCha, XVariant};
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::marker::PhantomData;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Shortest block HBSH accepts.
pub const MIN_BLOCK_LEN: usize = 32;

/// Block lengths exercised by known-answer generation.
pub const TEST_BLOCK_LENGTHS: [usize; 6] = [32, 47, 128, 512, 1536, 4096];

/// Variant of an HBSH construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HbshVariant {
    /// Name of the construction.
    pub cipher: &'static str,
    /// Stream cipher variant.
    pub stream: XVariant,
    /// Block cipher variant.
    pub block: AesVariant,
    /// Top-level key length in bytes.
    pub key: usize,
}

/// Sequential reader over derived key material.
pub struct KeyMaterial<'a> {
    rest: &'a [u8],
}

impl<'a> KeyMaterial<'a> {
    /// Read from the start of `km`.
    pub fn new(km: &'a [u8]) -> Self {
        Self { rest: km }
    }

    /// The next `len` bytes.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.rest.len() < len {
            return Err(Error::InvalidLength {
                field: "key material",
                actual: self.rest.len(),
            });
        }
        let (head, tail) = self.rest.split_at(len);
        self.rest = tail;
        Ok(head)
    }

    /// The next `N` bytes as an array.
    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }
}

/// The tweak/message hash of an HBSH construction.
pub trait TweakHash: 'static {
    /// Name of the construction.
    const NAME: &'static str;

    /// Tweak lengths exercised by known-answer generation.
    const TWEAK_LENGTHS: &'static [usize];

    /// Subkeys derived from the top-level key, the block cipher key included.
    type Keys: ZeroizeOnDrop;

    /// Bytes of key material consumed by [`TweakHash::derive_keys`].
    fn key_material_len() -> usize;

    /// Split key material into subkeys.
    fn derive_keys(km: &mut KeyMaterial<'_>) -> Result<Self::Keys>;

    /// The block cipher key.
    fn block_key(keys: &Self::Keys) -> &[u8];

    /// Hash the tweak and the left part of a block to 128 bits.
    fn hash(keys: &Self::Keys, tweak: &[u8], message: &[u8]) -> Result<u128>;
}

/// Encode the tweak as `LE32(8 * len) || tweak`, zero-padded to 16 bytes.
///
/// Tweaks of 2^29 bytes or more do not fit the bit-length field.
pub fn tweak_header(tweak: &[u8]) -> Result<Vec<u8>> {
    let bits = tweak
        .len()
        .checked_mul(8)
        .and_then(|b| u32::try_from(b).ok())
        .ok_or(Error::InvalidLength {
            field: "tweak",
            actual: tweak.len(),
        })?;
    let mut header = Vec::with_capacity(4 + tweak.len() + 15);
    header.extend_from_slice(&bits.to_le_bytes());
    header.extend_from_slice(tweak);
    zero_pad(&mut header, 16);
    Ok(header)
}

/// An HBSH construction over XChaCha and AES-256 with tweak hash `H`.
pub struct Hbsh<H: TweakHash> {
    variant: HbshVariant,
    stream: XChaCha,
    block: Aes,
    hash: PhantomData<fn() -> H>,
}

impl<H: TweakHash> Clone for Hbsh<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H: TweakHash> Copy for Hbsh<H> {}

impl<H: TweakHash> core::fmt::Debug for Hbsh<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hbsh")
            .field("variant", &self.variant)
            .finish()
    }
}

impl<H: TweakHash> Hbsh<H> {
    /// The construction over XChaCha with the given round count.
    pub fn with_rounds(rounds: usize) -> Result<Self> {
        Self::choose_variant(|v| v.stream.rounds == rounds)
    }

    /// The stream cipher.
    pub fn stream(&self) -> &XChaCha {
        &self.stream
    }

    /// The block cipher.
    pub fn block(&self) -> &Aes {
        &self.block
    }

    /// XOR `data` with the keystream for `nonce || 0x01 || 0x00...`.
    pub fn stream_xor(&self, key: &[u8], nonce: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        let needed = self.stream.nonce_len();
        if nonce.len() >= needed {
            return Err(Error::InvalidLength {
                field: "nonce",
                actual: nonce.len(),
            });
        }
        let mut padded = vec![0u8; needed];
        padded[..nonce.len()].copy_from_slice(nonce);
        padded[nonce.len()] = 1;
        self.stream.encrypt(data, key, &padded, 0)
    }

    /// Derive the subkeys for one call.
    pub fn derive_keys(&self, key: &[u8]) -> Result<H::Keys> {
        expect_len("key", self.variant.key, key.len())?;
        let mut km = self.stream_xor(key, &[], &vec![0u8; H::key_material_len()])?;
        let keys = H::derive_keys(&mut KeyMaterial::new(&km));
        km.zeroize();
        keys
    }

    fn split(block: &[u8]) -> Result<(&[u8], [u8; BLOCK_LEN])> {
        if block.len() < MIN_BLOCK_LEN {
            return Err(Error::InvalidLength {
                field: "block",
                actual: block.len(),
            });
        }
        let (left, right) = block.split_at(block.len() - BLOCK_LEN);
        let mut r = [0u8; BLOCK_LEN];
        r.copy_from_slice(right);
        Ok((left, r))
    }

    /// Encrypt `block` (at least 32 bytes) under `key` and `tweak`.
    pub fn encrypt(&self, block: &[u8], key: &[u8], tweak: &[u8]) -> Result<Vec<u8>> {
        let (pl, pr) = Self::split(block)?;
        let keys = self.derive_keys(key)?;
        let pm = block_add(&pr, H::hash(&keys, tweak, pl)?);
        let cm = self.block.encrypt_block(&pm, H::block_key(&keys))?;
        let mut out = self.stream_xor(key, &cm, pl)?;
        let cr = block_sub(&cm, H::hash(&keys, tweak, &out)?);
        out.extend_from_slice(&cr);
        Ok(out)
    }

    /// Decrypt `block` (at least 32 bytes) under `key` and `tweak`.
    pub fn decrypt(&self, block: &[u8], key: &[u8], tweak: &[u8]) -> Result<Vec<u8>> {
        let (cl, cr) = Self::split(block)?;
        let keys = self.derive_keys(key)?;
        let cm = block_add(&cr, H::hash(&keys, tweak, cl)?);
        let mut out = self.stream_xor(key, &cm, cl)?;
        let pm = self.block.decrypt_block(&cm, H::block_key(&keys))?;
        let pr = block_sub(&pm, H::hash(&keys, tweak, &out)?);
        out.extend_from_slice(&pr);
        Ok(out)
    }
}

impl<H: TweakHash> Primitive for Hbsh<H> {
    type Variant = HbshVariant;

    fn variants() -> impl Iterator<Item = HbshVariant> {
        Aes::variants()
            .filter(|b| b.key == 32)
            .flat_map(|block| {
                XChaCha::variants().map(move |stream| HbshVariant {
                    cipher: H::NAME,
                    stream,
                    block,
                    key: stream.key,
                })
            })
    }

    fn bind(variant: HbshVariant, _: Enumerated) -> Self {
        Self {
            variant,
            stream: XChaCha::bind(variant.stream, Enumerated(())),
            block: Aes::bind(variant.block, Enumerated(())),
            hash: PhantomData,
        }
    }

    fn variant(&self) -> &HbshVariant {
        &self.variant
    }

    fn name(&self) -> String {
        String::from(H::NAME)
    }

    fn variant_name(&self) -> String {
        format!(
            "{}_{}_{}",
            H::NAME,
            self.stream.variant_name(),
            self.block.variant_name()
        )
    }

    fn test_input_lengths(&self) -> Vec<InputLengths> {
        let mut out = Vec::new();
        for &tweak in H::TWEAK_LENGTHS {
            for mlen in TEST_BLOCK_LENGTHS {
                for m in ["plaintext", "ciphertext"] {
                    out.push(vec![("key", self.variant.key), ("tweak", tweak), (m, mlen)]);
                }
            }
        }
        out
    }
}

impl<H: TweakHash> KnownAnswer for Hbsh<H> {
    fn make_testvector(&self, mut input: Fields, description: &str) -> Result<TestVector> {
        let (pt, ct) = match input.remove("plaintext") {
            Some(pt) => {
                let ct = self.encrypt(&pt, input.get("key")?, input.get("tweak")?)?;
                (pt, ct)
            }
            None => {
                let ct = input
                    .remove("ciphertext")
                    .ok_or(Error::MalformedTestVector)?;
                let pt = self.decrypt(&ct, input.get("key")?, input.get("tweak")?)?;
                (pt, ct)
            }
        };
        Ok(TestVector::new(self, description, input)
            .with_output("plaintext", pt)
            .with_output("ciphertext", ct))
    }

    fn check_testvector(tv: &TestVector) -> Result<()> {
        let c = Self::from_catalog(&tv.cipher)?;
        let key = tv.input.get("key")?;
        let tweak = tv.input.get("tweak")?;
        let pt = tv.output.get("plaintext")?;
        let ct = tv.output.get("ciphertext")?;
        tv.expect_output("ciphertext", &c.encrypt(pt, key, tweak)?)?;
        tv.expect_output("plaintext", &c.decrypt(ct, key, tweak)?)
    }
}
