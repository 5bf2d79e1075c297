//! HPolyNHC: HBSH whose message hash runs NH before Poly1305.
//!
//! The message gets a `0x01` terminator and is zero-padded to a multiple of
//! 1 KiB, so every NH call sees a full-size input:
//!
//! ```text
//! H(T, M) = Poly1305(r, pad16(LE32(8 * |T|) || T) || NH*(pad1024(M || 0x01)))
//! ```

use crate::error::Result;
use crate::hbsh::{tweak_header, Hbsh, KeyMaterial, TweakHash};
use crate::nh::Nh;
use crate::poly1305::{read_r, Poly1305State};
use crate::utils::zero_pad;
use alloc::vec::Vec;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// HPolyNHC over XChaCha and AES-256.
pub type HPolyNHC = Hbsh<HPolyNhcHash>;

/// The HPolyNHC tweak/message hash.
#[derive(Debug, Clone, Copy)]
pub struct HPolyNhcHash;

/// HPolyNHC subkeys.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct HPolyNhcKeys {
    r: u128,
    block_key: [u8; 32],
    nh_key: Vec<u8>,
}

impl TweakHash for HPolyNhcHash {
    const NAME: &'static str = "HPolyNHC";
    const TWEAK_LENGTHS: &'static [usize] = &[0, 17, 32];

    type Keys = HPolyNhcKeys;

    fn key_material_len() -> usize {
        16 + 32 + Nh::default().lengths().key
    }

    fn derive_keys(km: &mut KeyMaterial<'_>) -> Result<HPolyNhcKeys> {
        let r = read_r(&km.take_array()?);
        let block_key = km.take_array()?;
        let nh_key = km.take(Nh::default().lengths().key)?.to_vec();
        Ok(HPolyNhcKeys {
            r,
            block_key,
            nh_key,
        })
    }

    fn block_key(keys: &HPolyNhcKeys) -> &[u8] {
        &keys.block_key
    }

    fn hash(keys: &HPolyNhcKeys, tweak: &[u8], message: &[u8]) -> Result<u128> {
        let nh = Nh::default();
        let chunk = nh.lengths().messagemax;
        let mut padded = Vec::with_capacity(message.len() + chunk);
        padded.extend_from_slice(message);
        padded.push(1);
        zero_pad(&mut padded, chunk);

        let mut poly = Poly1305State::new(keys.r);
        poly.update(&tweak_header(tweak)?);
        for c in padded.chunks(chunk) {
            poly.update(&nh.nh(&keys.nh_key, c)?);
        }
        Ok(poly.finalize().low_u128())
    }
}
