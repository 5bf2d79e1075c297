//! Poly1305 polynomial evaluation over the prime field 2^130 - 5.
//!
//! Field elements are held as five 26-bit limbs, so every limb product fits
//! in a `u64` and reduction is a matter of carrying and folding the bits
//! above 2^130 back in multiplied by 5.

use crate::error::{expect_len, Result};
use crate::testvector::{Fields, KnownAnswer, TestVector};
use crate::variant::{Enumerated, InputLengths, Primitive};
use alloc::string::String;
use alloc::vec::Vec;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Mask applied to `r` before use.
pub const R_CLAMP: u128 = 0x0fff_fffc_0fff_fffc_0fff_fffc_0fff_ffff;

const LIMB_MASK: u64 = 0x3ff_ffff;

/// Read a 16-byte little-endian key half and clamp it.
pub fn read_r(bytes: &[u8; 16]) -> u128 {
    u128::from_le_bytes(*bytes) & R_CLAMP
}

/// A fully reduced element of GF(2^130 - 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldElement {
    limbs: [u64; 5],
}

impl FieldElement {
    /// The value modulo 2^128.
    pub fn low_u128(&self) -> u128 {
        let l = &self.limbs;
        (l[0] as u128)
            | (l[1] as u128) << 26
            | (l[2] as u128) << 52
            | (l[3] as u128) << 78
            | (l[4] as u128) << 104
    }

    /// The two bits above 2^128.
    pub fn high_bits(&self) -> u8 {
        (self.limbs[4] >> 24) as u8
    }

    /// Little-endian encoding, 17 bytes.
    pub fn to_le_bytes(&self) -> [u8; 17] {
        let mut out = [0u8; 17];
        out[..16].copy_from_slice(&self.low_u128().to_le_bytes());
        out[16] = self.high_bits();
        out
    }
}

fn limbs_of(v: u128) -> [u64; 5] {
    [
        (v as u64) & LIMB_MASK,
        ((v >> 26) as u64) & LIMB_MASK,
        ((v >> 52) as u64) & LIMB_MASK,
        ((v >> 78) as u64) & LIMB_MASK,
        ((v >> 104) as u64) & LIMB_MASK,
    ]
}

/// Incremental evaluation of the Poly1305 polynomial.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Poly1305State {
    r: [u64; 5],
    h: [u64; 5],
}

impl Poly1305State {
    /// Start an evaluation at the clamped point `r`.
    pub fn new(r: u128) -> Self {
        debug_assert_eq!(r, r & R_CLAMP);
        Self {
            r: limbs_of(r),
            h: [0; 5],
        }
    }

    /// Absorb one chunk of at most 16 bytes: `h = (h + chunk + 2^(8 len)) * r`.
    pub fn update_block(&mut self, chunk: &[u8]) {
        debug_assert!(chunk.len() <= 16);
        let mut padded = [0u8; 16];
        padded[..chunk.len()].copy_from_slice(chunk);
        let mut m = limbs_of(u128::from_le_bytes(padded));
        if chunk.len() == 16 {
            m[4] |= 1 << 24;
        } else {
            let bit = 8 * chunk.len();
            m[bit / 26] |= 1 << (bit % 26);
        }

        let h: [u64; 5] = core::array::from_fn(|i| self.h[i] + m[i]);
        let [r0, r1, r2, r3, r4] = self.r;
        let (s1, s2, s3, s4) = (r1 * 5, r2 * 5, r3 * 5, r4 * 5);

        let d0 = h[0] * r0 + h[1] * s4 + h[2] * s3 + h[3] * s2 + h[4] * s1;
        let mut d1 = h[0] * r1 + h[1] * r0 + h[2] * s4 + h[3] * s3 + h[4] * s2;
        let mut d2 = h[0] * r2 + h[1] * r1 + h[2] * r0 + h[3] * s4 + h[4] * s3;
        let mut d3 = h[0] * r3 + h[1] * r2 + h[2] * r1 + h[3] * r0 + h[4] * s4;
        let mut d4 = h[0] * r4 + h[1] * r3 + h[2] * r2 + h[3] * r1 + h[4] * r0;

        d1 += d0 >> 26;
        d2 += d1 >> 26;
        d3 += d2 >> 26;
        d4 += d3 >> 26;
        let mut h0 = (d0 & LIMB_MASK) + (d4 >> 26) * 5;
        let h1 = (d1 & LIMB_MASK) + (h0 >> 26);
        h0 &= LIMB_MASK;
        self.h = [h0, h1, d2 & LIMB_MASK, d3 & LIMB_MASK, d4 & LIMB_MASK];
    }

    /// Absorb a whole message in 16-byte chunks; the last may be shorter.
    pub fn update(&mut self, message: &[u8]) {
        for chunk in message.chunks(16) {
            self.update_block(chunk);
        }
    }

    /// Carry the accumulator, fold bits above 2^130 and reduce modulo p.
    pub fn finalize(&self) -> FieldElement {
        let mut h = self.h;
        for _ in 0..2 {
            for i in 0..4 {
                h[i + 1] += h[i] >> 26;
                h[i] &= LIMB_MASK;
            }
            h[0] += (h[4] >> 26) * 5;
            h[4] &= LIMB_MASK;
        }

        // g = h + 5 - 2^130; h >= p exactly when g carries out of bit 130.
        let (g, over) = propagate(h, 5);
        let limbs = if over != 0 { g } else { propagate(h, 0).0 };
        h.zeroize();
        FieldElement { limbs }
    }
}

/// Add `carry` to the limbs and carry through, returning the bits above 2^130.
fn propagate(h: [u64; 5], mut carry: u64) -> ([u64; 5], u64) {
    let mut out = [0u64; 5];
    for i in 0..5 {
        let t = h[i] + carry;
        out[i] = t & LIMB_MASK;
        carry = t >> 26;
    }
    (out, carry)
}

/// Evaluate the Poly1305 polynomial of `message` at the clamped point `r`.
pub fn evaluate(r: u128, message: &[u8]) -> FieldElement {
    let mut st = Poly1305State::new(r);
    st.update(message);
    st.finalize()
}

/// Variant of the Poly1305 MAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Poly1305Variant {
    /// Key (`r`) length in bytes.
    pub key: usize,
    /// Mask (`s`) length in bytes.
    pub mask: usize,
    /// Tag length in bytes.
    pub output: usize,
}

const POLY1305_VARIANT: Poly1305Variant = Poly1305Variant {
    key: 16,
    mask: 16,
    output: 16,
};

/// The Poly1305 MAC with separate `r` key and additive mask.
#[derive(Debug, Clone, Copy)]
pub struct Poly1305 {
    variant: Poly1305Variant,
}

impl Default for Poly1305 {
    fn default() -> Self {
        Self::bind(POLY1305_VARIANT, Enumerated(()))
    }
}

impl Poly1305 {
    /// `(evaluate(read_r(key), message) + mask) mod 2^128`.
    ///
    /// An empty mask stands for zero.
    pub fn mac(&self, message: &[u8], mask: &[u8], key: &[u8]) -> Result<[u8; 16]> {
        expect_len("key", self.variant.key, key.len())?;
        let mask = if mask.is_empty() {
            0
        } else {
            expect_len("mask", self.variant.mask, mask.len())?;
            let mut m = [0u8; 16];
            m.copy_from_slice(mask);
            u128::from_le_bytes(m)
        };
        let mut k = [0u8; 16];
        k.copy_from_slice(key);
        let h = evaluate(read_r(&k), message);
        k.zeroize();
        Ok(h.low_u128().wrapping_add(mask).to_le_bytes())
    }
}

impl Primitive for Poly1305 {
    type Variant = Poly1305Variant;

    fn variants() -> impl Iterator<Item = Poly1305Variant> {
        core::iter::once(POLY1305_VARIANT)
    }

    fn bind(variant: Poly1305Variant, _: Enumerated) -> Self {
        Self { variant }
    }

    fn variant(&self) -> &Poly1305Variant {
        &self.variant
    }

    fn name(&self) -> String {
        String::from("Poly1305")
    }

    fn variant_name(&self) -> String {
        self.name()
    }

    fn test_input_lengths(&self) -> Vec<InputLengths> {
        [0, 1, 16, 47]
            .into_iter()
            .map(|m| {
                alloc::vec![
                    ("key", self.variant.key),
                    ("mask", self.variant.mask),
                    ("message", m)
                ]
            })
            .collect()
    }
}

impl KnownAnswer for Poly1305 {
    fn make_testvector(&self, input: Fields, description: &str) -> Result<TestVector> {
        let mac = self.mac(
            input.get("message")?,
            input.get("mask")?,
            input.get("key")?,
        )?;
        Ok(TestVector::new(self, description, input).with_output("mac", mac.to_vec()))
    }

    fn check_testvector(tv: &TestVector) -> Result<()> {
        let p = Self::from_catalog(&tv.cipher)?;
        let i = &tv.input;
        let mac = p.mac(i.get("message")?, i.get("mask")?, i.get("key")?)?;
        tv.expect_output("mac", &mac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P_MINUS_1: [u8; 17] = [
        0xfa, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0x03,
    ];

    #[test]
    fn test_clamp() {
        assert_eq!(read_r(&[0xff; 16]), R_CLAMP);
        assert_eq!(read_r(&[0; 16]), 0);
    }

    #[test]
    fn test_empty_message() {
        assert_eq!(evaluate(1, b""), FieldElement::default());
        let p = Poly1305::default();
        let mut key = [0u8; 16];
        key[0] = 1;
        assert_eq!(p.mac(b"", &[0; 16], &key).unwrap(), [0; 16]);
    }

    #[test]
    fn test_identity_point() {
        // With r = 1 each chunk is simply added with its pad bit.
        let h = evaluate(1, &[0x01, 0x02]);
        assert_eq!(h.low_u128(), 0x0201 + (1 << 16));
        let h = evaluate(1, &[0u8; 16]);
        assert_eq!(h.low_u128(), 0);
        assert_eq!(h.high_bits(), 1);
        assert_eq!(h.to_le_bytes()[16], 1);
    }

    #[test]
    fn test_reduction_at_modulus() {
        // (2^128 - 6 + 2^128) * 2 = 2^130 - 12 = p - 7
        let mut chunk = [0xff; 16];
        chunk[0] = 0xfa;
        let h = evaluate(2, &chunk);
        let mut expected = P_MINUS_1;
        expected[0] -= 6;
        assert_eq!(h.to_le_bytes(), expected);

        // (2^128 - 1 + 2^128) * 2 = 2^130 - 2 = p + 3
        assert_eq!(evaluate(2, &[0xff; 16]).to_le_bytes()[..2], [3, 0]);
        assert_eq!(evaluate(2, &[0xff; 16]).high_bits(), 0);
    }

    #[test]
    fn test_mask_addition_wraps() {
        let p = Poly1305::default();
        let mut key = [0u8; 16];
        key[0] = 2;
        let mut msg = [0u8; 16];
        msg[0] = 2;
        // h = (2^128 + 2) * 2 = 2^129 + 4; plus 2^128 - 1 wraps to 3
        assert_eq!(
            p.mac(&msg, &[0xff; 16], &key).unwrap(),
            [3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_rejects_bad_lengths() {
        let p = Poly1305::default();
        assert!(p.mac(b"", &[0; 16], &[0; 32]).is_err());
        assert!(p.mac(b"", &[0; 15], &[0; 16]).is_err());
    }
}
