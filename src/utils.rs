//! Word codec and byte-level helpers shared by every primitive.

use crate::error::{Error, Result};
use alloc::vec::Vec;
use core::fmt;
use core::ops::BitXorAssign;
use zeroize::Zeroize;

/// A little-endian machine word used by the ARX primitives.
///
/// All arithmetic wraps modulo 2^BITS.
pub trait Word: Copy + Default + Eq + fmt::Debug + BitXorAssign + Zeroize {
    /// Width of the word in bytes.
    const BYTES: usize;

    /// Width of the word in bits.
    const BITS: u32;

    /// Read a word from exactly `BYTES` little-endian bytes.
    fn from_le_slice(bytes: &[u8]) -> Self;

    /// Append the little-endian encoding of the word to `out`.
    fn extend_le(self, out: &mut Vec<u8>);

    /// Widen a counter value into a word, truncating to the word width.
    fn from_u64(v: u64) -> Self;

    /// Addition modulo 2^BITS.
    fn add_mod(self, other: Self) -> Self;

    /// Rotation towards the most significant bit.
    fn rotl(self, r: u32) -> Self;

    /// Rotation towards the least significant bit.
    fn rotr(self, r: u32) -> Self;
}

impl Word for u32 {
    const BYTES: usize = 4;
    const BITS: u32 = 32;

    #[inline]
    fn from_le_slice(bytes: &[u8]) -> Self {
        let mut b = [0u8; 4];
        b.copy_from_slice(bytes);
        u32::from_le_bytes(b)
    }

    #[inline]
    fn extend_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    #[inline]
    fn from_u64(v: u64) -> Self {
        v as u32
    }

    #[inline]
    fn add_mod(self, other: Self) -> Self {
        self.wrapping_add(other)
    }

    #[inline]
    fn rotl(self, r: u32) -> Self {
        self.rotate_left(r)
    }

    #[inline]
    fn rotr(self, r: u32) -> Self {
        self.rotate_right(r)
    }
}

impl Word for u64 {
    const BYTES: usize = 8;
    const BITS: u32 = 64;

    #[inline]
    fn from_le_slice(bytes: &[u8]) -> Self {
        let mut b = [0u8; 8];
        b.copy_from_slice(bytes);
        u64::from_le_bytes(b)
    }

    #[inline]
    fn extend_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    #[inline]
    fn from_u64(v: u64) -> Self {
        v
    }

    #[inline]
    fn add_mod(self, other: Self) -> Self {
        self.wrapping_add(other)
    }

    #[inline]
    fn rotl(self, r: u32) -> Self {
        self.rotate_left(r)
    }

    #[inline]
    fn rotr(self, r: u32) -> Self {
        self.rotate_right(r)
    }
}

/// Split `bytes` into little-endian words.
pub fn to_words<W: Word>(bytes: &[u8]) -> Result<Vec<W>> {
    if bytes.len() % W::BYTES != 0 {
        return Err(Error::InvalidLength {
            field: "words",
            actual: bytes.len(),
        });
    }
    Ok(bytes.chunks_exact(W::BYTES).map(W::from_le_slice).collect())
}

/// Serialize words back to little-endian bytes.
pub fn from_words<W: Word>(words: &[W]) -> Vec<u8> {
    let mut out = Vec::with_capacity(words.len() * W::BYTES);
    for w in words {
        w.extend_le(&mut out);
    }
    out
}

/// Add `v` to a 128-bit little-endian block, modulo 2^128.
#[inline]
pub fn block_add(block: &[u8; 16], v: u128) -> [u8; 16] {
    u128::from_le_bytes(*block).wrapping_add(v).to_le_bytes()
}

/// Subtract `v` from a 128-bit little-endian block, modulo 2^128.
#[inline]
pub fn block_sub(block: &[u8; 16], v: u128) -> [u8; 16] {
    u128::from_le_bytes(*block).wrapping_sub(v).to_le_bytes()
}

/// Zero-pad data to a multiple of `multiple` bytes.
#[inline]
pub fn zero_pad(data: &mut Vec<u8>, multiple: usize) {
    let rem = data.len() % multiple;
    if rem != 0 {
        data.resize(data.len() + (multiple - rem), 0);
    }
}

/// XOR `src` into `dst`, up to the shorter of the two.
#[inline]
pub fn xor_into(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_codec_u32() {
        let words = to_words::<u32>(&[1, 0, 0, 0, 0xef, 0xbe, 0xad, 0xde]).unwrap();
        assert_eq!(words, vec![1, 0xdeadbeef]);
        assert_eq!(from_words(&words), vec![1, 0, 0, 0, 0xef, 0xbe, 0xad, 0xde]);
    }

    #[test]
    fn test_word_codec_u64() {
        let words = to_words::<u64>(&0x0123456789abcdefu64.to_le_bytes()).unwrap();
        assert_eq!(words, vec![0x0123456789abcdef]);
    }

    #[test]
    fn test_word_codec_rejects_partial_words() {
        assert_eq!(
            to_words::<u32>(&[0u8; 7]),
            Err(Error::InvalidLength {
                field: "words",
                actual: 7
            })
        );
        assert!(to_words::<u64>(&[0u8; 12]).is_err());
        assert!(to_words::<u32>(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_word_arithmetic_wraps() {
        assert_eq!(Word::add_mod(u32::MAX, 2u32), 1);
        assert_eq!(Word::add_mod(u64::MAX, 1u64), 0);
        assert_eq!(0x8000_0001u32.rotl(1), 3);
        assert_eq!(3u32.rotr(1), 0x8000_0001);
        assert_eq!(1u64.rotr(1), 1 << 63);
        assert_eq!(<u32 as Word>::from_u64(0x1_0000_0002), 2);
    }

    #[test]
    fn test_block_add_sub() {
        let max = [0xff; 16];
        assert_eq!(block_add(&max, 1), [0; 16]);
        assert_eq!(block_sub(&[0; 16], 1), max);

        let block = [7u8; 16];
        let v = 0x0123_4567_89ab_cdef_0011_2233_4455_6677u128;
        assert_eq!(block_sub(&block_add(&block, v), v), block);
    }

    #[test]
    fn test_zero_pad() {
        let mut data = vec![1, 2, 3];
        zero_pad(&mut data, 16);
        assert_eq!(data.len(), 16);
        assert_eq!(&data[..3], &[1, 2, 3]);
        assert_eq!(&data[3..], &[0; 13]);

        // Already aligned
        let mut data = vec![1u8; 32];
        zero_pad(&mut data, 16);
        assert_eq!(data, vec![1u8; 32]);

        let mut empty = Vec::new();
        zero_pad(&mut empty, 16);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_xor_into() {
        let mut a = [0xf0u8; 4];
        xor_into(&mut a, &[0x0f; 8]);
        assert_eq!(a, [0xff; 4]);
    }
}
