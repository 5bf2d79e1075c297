//! HPolyC: HBSH with a single Poly1305 evaluation over tweak and message.
//!
//! ```text
//! H(T, M) = Poly1305(r, pad16(LE32(8 * |T|) || T) || M)
//! ```

use crate::error::Result;
use crate::hbsh::{tweak_header, Hbsh, KeyMaterial, TweakHash};
use crate::poly1305::{evaluate, read_r};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// HPolyC over XChaCha and AES-256.
pub type HPolyC = Hbsh<HPolyCHash>;

/// The HPolyC tweak/message hash.
#[derive(Debug, Clone, Copy)]
pub struct HPolyCHash;

/// HPolyC subkeys.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct HPolyCKeys {
    r: u128,
    block_key: [u8; 32],
}

impl TweakHash for HPolyCHash {
    const NAME: &'static str = "HPolyC";
    const TWEAK_LENGTHS: &'static [usize] = &[0, 12, 17];

    type Keys = HPolyCKeys;

    fn key_material_len() -> usize {
        16 + 32
    }

    fn derive_keys(km: &mut KeyMaterial<'_>) -> Result<HPolyCKeys> {
        let r = read_r(&km.take_array()?);
        let block_key = km.take_array()?;
        Ok(HPolyCKeys { r, block_key })
    }

    fn block_key(keys: &HPolyCKeys) -> &[u8] {
        &keys.block_key
    }

    fn hash(keys: &HPolyCKeys, tweak: &[u8], message: &[u8]) -> Result<u128> {
        let mut data = tweak_header(tweak)?;
        data.extend_from_slice(message);
        Ok(evaluate(keys.r, &data).low_u128())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::Primitive;
    use alloc::vec::Vec;

    #[test]
    fn test_key_material_split() {
        let km: Vec<u8> = (0..48).collect();
        let keys = HPolyCHash::derive_keys(&mut KeyMaterial::new(&km)).unwrap();
        let r: [u8; 16] = km[..16].try_into().unwrap();
        assert_eq!(keys.r, read_r(&r));
        assert_eq!(&keys.block_key[..], &km[16..]);
    }

    #[test]
    fn test_hash_layout() {
        let keys = HPolyCKeys {
            r: 1,
            block_key: [0; 32],
        };
        // With r = 1 the hash is the sum of the padded 16-byte chunks.
        let h = HPolyCHash::hash(&keys, b"", &[]).unwrap();
        assert_eq!(h, 0);
        let h = HPolyCHash::hash(&keys, &[1], &[2]).unwrap();
        let header = 8u128 | 1 << 32;
        assert_eq!(h, header + 2 + (1 << 8));
    }

    #[test]
    fn test_tweak_changes_ciphertext() {
        let c = HPolyC::with_rounds(20).unwrap();
        let key = [9u8; 32];
        let block = [0u8; 48];
        let a = c.encrypt(&block, &key, b"").unwrap();
        let b = c.encrypt(&block, &key, &[0]).unwrap();
        assert_ne!(a, b);
        assert_eq!(c.decrypt(&b, &key, &[0]).unwrap(), block);
        assert_eq!(HPolyC::variants().count(), 3);
    }

    #[test]
    fn test_known_answer_lengths() {
        let c = HPolyC::with_rounds(12).unwrap();
        let lengths = c.test_input_lengths();
        assert_eq!(lengths.len(), 3 * 6 * 2);
        let tweaks: Vec<usize> = lengths.iter().step_by(12).map(|l| l[1].1).collect();
        assert_eq!(tweaks, [0, 12, 17]);
        assert!(lengths.iter().all(|l| l[1].0 == "tweak" && l[2].1 >= 32));
    }
}
