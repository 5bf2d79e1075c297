//! Adiantum: HBSH with an NH-based message hash.
//!
//! The tweak and the message are hashed separately and the two 128-bit
//! results are added:
//!
//! ```text
//! H(T, M) = Poly1305(rt, LE128(8 * |M|) || T) + NHPoly1305(rm || nh_key, M)
//! ```
//!
//! Both Poly1305 evaluations use no mask.

use crate::blockcipher::BLOCK_LEN;
use crate::error::Result;
use crate::hbsh::{Hbsh, KeyMaterial, TweakHash};
use crate::nh::Nh;
use crate::nhpoly1305::NhPoly1305;
use crate::poly1305::Poly1305;
use alloc::vec::Vec;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Adiantum over XChaCha and AES-256.
pub type Adiantum = Hbsh<AdiantumHash>;

/// The Adiantum tweak/message hash.
#[derive(Debug, Clone, Copy)]
pub struct AdiantumHash;

/// Adiantum subkeys.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct AdiantumKeys {
    block_key: [u8; 32],
    rt: [u8; 16],
    // rm followed by the NH key, i.e. an NHPoly1305 key.
    nhpoly_key: Vec<u8>,
}

impl TweakHash for AdiantumHash {
    const NAME: &'static str = "Adiantum";
    const TWEAK_LENGTHS: &'static [usize] = &[0, 12, 17, 32];

    type Keys = AdiantumKeys;

    fn key_material_len() -> usize {
        32 + 16 + 16 + Nh::default().lengths().key
    }

    fn derive_keys(km: &mut KeyMaterial<'_>) -> Result<AdiantumKeys> {
        let block_key = km.take_array()?;
        let rt = km.take_array()?;
        let nhpoly_key = km.take(16 + Nh::default().lengths().key)?.to_vec();
        Ok(AdiantumKeys {
            block_key,
            rt,
            nhpoly_key,
        })
    }

    fn block_key(keys: &AdiantumKeys) -> &[u8] {
        &keys.block_key
    }

    fn hash(keys: &AdiantumKeys, tweak: &[u8], message: &[u8]) -> Result<u128> {
        let mut header = Vec::with_capacity(BLOCK_LEN + tweak.len());
        header.extend_from_slice(&(message.len() as u128 * 8).to_le_bytes());
        header.extend_from_slice(tweak);
        let ht = Poly1305::default().mac(&header, &[], &keys.rt)?;
        let hm = NhPoly1305::default().hash(&keys.nhpoly_key, message)?;
        Ok(u128::from_le_bytes(ht).wrapping_add(u128::from_le_bytes(hm)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poly1305::{evaluate, read_r};
    use crate::variant::Primitive;

    #[test]
    fn test_key_material_split() {
        assert_eq!(AdiantumHash::key_material_len(), 1136);
        let km: Vec<u8> = (0..1136u32).map(|i| i as u8).collect();
        let keys = AdiantumHash::derive_keys(&mut KeyMaterial::new(&km)).unwrap();
        assert_eq!(&keys.block_key[..], &km[..32]);
        assert_eq!(&keys.rt[..], &km[32..48]);
        assert_eq!(&keys.nhpoly_key[..], &km[48..]);
    }

    #[test]
    fn test_hash_is_sum_of_parts() {
        let km: Vec<u8> = (0..1136u32).map(|i| (i * 13) as u8).collect();
        let keys = AdiantumHash::derive_keys(&mut KeyMaterial::new(&km)).unwrap();
        let tweak = [0x77; 12];
        let msg = [0x42; 40];

        let mut header = (320u128).to_le_bytes().to_vec();
        header.extend_from_slice(&tweak);
        let rt: [u8; 16] = km[32..48].try_into().unwrap();
        let ht = evaluate(read_r(&rt), &header).low_u128();
        let hm = u128::from_le_bytes(NhPoly1305::default().hash(&km[48..], &msg).unwrap());

        assert_eq!(
            AdiantumHash::hash(&keys, &tweak, &msg).unwrap(),
            ht.wrapping_add(hm)
        );
    }

    #[test]
    fn test_message_length_is_bound() {
        // NH zero-pads, so only the length prefix separates these.
        let km = [5u8; 1136];
        let keys = AdiantumHash::derive_keys(&mut KeyMaterial::new(&km)).unwrap();
        assert_ne!(
            AdiantumHash::hash(&keys, b"", &[0; 17]).unwrap(),
            AdiantumHash::hash(&keys, b"", &[0; 32]).unwrap()
        );
    }

    #[test]
    fn test_variants() {
        let names: Vec<_> = Adiantum::instances()
            .map(|a| a.variant_name())
            .collect();
        assert_eq!(
            names,
            [
                "Adiantum_XChaCha8_32_AES256",
                "Adiantum_XChaCha12_32_AES256",
                "Adiantum_XChaCha20_32_AES256"
            ]
        );
        let a = Adiantum::with_rounds(12).unwrap();
        assert_eq!(a.name(), "Adiantum");
        assert_eq!(a.variant().key, 32);
        assert_eq!(a.test_input_lengths().len(), 4 * 6 * 2);
    }

    #[test]
    fn test_roundtrip() {
        let a = Adiantum::with_rounds(20).unwrap();
        let key: Vec<u8> = (0..32).collect();
        let block: Vec<u8> = (0..100u32).map(|i| (i * 3) as u8).collect();
        let ct = a.encrypt(&block, &key, b"tweak").unwrap();
        assert_eq!(ct.len(), block.len());
        assert_ne!(ct, block);
        assert_eq!(a.decrypt(&ct, &key, b"tweak").unwrap(), block);
        assert_ne!(a.decrypt(&ct, &key, b"tweal").unwrap(), block);
    }
}
