//! Behavioural properties of the wide-block ciphers and stream ciphers.

use crate::hbsh::TEST_BLOCK_LENGTHS;
use crate::latindance::{Bachata, ChaCha, ChaCha20Rfc, Layout, Salsa20};
use crate::xconstruct::XConstruct;
use crate::{Adiantum, Error, HPolyC, HPolyNHC, Hbsh, Latindance, Primitive, StreamCipher, TweakHash};

fn pseudorandom(len: usize, seed: u32) -> Vec<u8> {
    let mut x = seed.wrapping_mul(0x9e37_79b9) | 1;
    (0..len)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            x as u8
        })
        .collect()
}

fn check_roundtrips<H: TweakHash>() {
    for c in Hbsh::<H>::instances() {
        let key = pseudorandom(32, c.variant().stream.rounds as u32);
        for &tlen in H::TWEAK_LENGTHS {
            let tweak = pseudorandom(tlen, 7);
            for len in TEST_BLOCK_LENGTHS {
                let block = pseudorandom(len, len as u32);
                let ct = c.encrypt(&block, &key, &tweak).unwrap();
                assert_eq!(ct.len(), len, "{} length {len}", c.variant_name());
                assert_ne!(ct, block);
                assert_eq!(
                    c.decrypt(&ct, &key, &tweak).unwrap(),
                    block,
                    "{} tweak {tlen} length {len}",
                    c.variant_name()
                );
                // Decryption is also a permutation.
                let pt = c.decrypt(&block, &key, &tweak).unwrap();
                assert_eq!(c.encrypt(&pt, &key, &tweak).unwrap(), block);
            }
        }
    }
}

#[test]
fn test_adiantum_roundtrip() {
    check_roundtrips::<crate::adiantum::AdiantumHash>();
}

#[test]
fn test_hpolyc_roundtrip() {
    check_roundtrips::<crate::hpolyc::HPolyCHash>();
}

#[test]
fn test_hpolynhc_roundtrip() {
    check_roundtrips::<crate::hpolynhc::HPolyNhcHash>();
}

#[test]
fn test_deterministic() {
    let c = HPolyNHC::with_rounds(12).unwrap();
    let key = pseudorandom(32, 1);
    let block = pseudorandom(777, 2);
    let a = c.encrypt(&block, &key, b"t").unwrap();
    let b = c.encrypt(&block, &key, b"t").unwrap();
    assert_eq!(a, b);
}

fn equal_bytes(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).filter(|(x, y)| x == y).count()
}

#[test]
fn test_adiantum_tweak_avalanche() {
    let c = Adiantum::with_rounds(20).unwrap();
    let key = pseudorandom(32, 3);
    let tweak = pseudorandom(32, 4);
    let block = pseudorandom(512, 5);

    let ct = c.encrypt(&block, &key, &tweak).unwrap();
    assert_eq!(c.decrypt(&ct, &key, &tweak).unwrap(), block);

    for bit in [0, 77, 255] {
        let mut t = tweak.clone();
        t[bit / 8] ^= 1 << (bit % 8);
        let other = c.encrypt(&block, &key, &t).unwrap();
        // About 2 of 512 bytes agree by chance.
        assert!(equal_bytes(&ct, &other) < 16, "tweak bit {bit}");
    }
}

#[test]
fn test_plaintext_avalanche() {
    let c = HPolyC::with_rounds(8).unwrap();
    let key = pseudorandom(32, 6);
    let block = pseudorandom(256, 7);
    let ct = c.encrypt(&block, &key, b"").unwrap();

    // A change in either half reaches every byte.
    for pos in [0, 200, 255] {
        let mut b = block.clone();
        b[pos] ^= 0x80;
        let other = c.encrypt(&b, &key, b"").unwrap();
        assert!(equal_bytes(&ct, &other) < 16, "byte {pos}");
    }
}

#[test]
fn test_key_sensitivity() {
    let c = Adiantum::with_rounds(12).unwrap();
    let block = pseudorandom(64, 8);
    let mut key = pseudorandom(32, 9);
    let a = c.encrypt(&block, &key, b"").unwrap();
    key[31] ^= 1;
    let b = c.encrypt(&block, &key, b"").unwrap();
    assert!(equal_bytes(&a, &b) < 8);
}

#[test]
fn test_errors() {
    let c = Adiantum::with_rounds(8).unwrap();
    assert_eq!(
        c.encrypt(&[0; 31], &[0; 32], b"").unwrap_err(),
        Error::InvalidLength {
            field: "block",
            actual: 31
        }
    );
    assert!(matches!(
        c.decrypt(&[0; 32], &[0; 33], b""),
        Err(Error::VariantMismatch { field: "key", .. })
    ));
    assert_eq!(
        Adiantum::with_rounds(10).unwrap_err(),
        Error::NoMatchingVariant
    );
}

fn check_stream_roundtrips<C: StreamCipher + Primitive>() {
    for c in C::instances() {
        let key = pseudorandom(c.key_len(), 10);
        let nonce = pseudorandom(c.nonce_len(), 11);
        for len in [0, 1, 63, 64, 65, 200] {
            let msg = pseudorandom(len, 12);
            let ct = c.encrypt(&msg, &key, &nonce, 0).unwrap();
            assert_eq!(ct.len(), len);
            assert_eq!(c.decrypt(&ct, &key, &nonce, 0).unwrap(), msg);
        }
        // Encrypting at an offset skips whole blocks of keystream.
        let zeros = vec![0u8; 3 * c.block_len()];
        let stream = c.encrypt(&zeros, &key, &nonce, 0).unwrap();
        let tail = c.encrypt(&zeros[..c.block_len()], &key, &nonce, 2).unwrap();
        assert_eq!(&stream[2 * c.block_len()..], &tail[..]);
    }
}

fn check_layout<L: Layout>() {
    check_stream_roundtrips::<Latindance<L>>();
    check_stream_roundtrips::<XConstruct<L>>();
}

#[test]
fn test_stream_roundtrips() {
    check_layout::<Salsa20>();
    check_layout::<ChaCha>();
    check_layout::<ChaCha20Rfc>();
    check_layout::<Bachata>();
}

#[test]
fn test_primitives_are_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Adiantum>();
    assert_send_sync::<HPolyC>();
    assert_send_sync::<HPolyNHC>();
    assert_send_sync::<crate::XChaCha>();

    let c = Adiantum::with_rounds(12).unwrap();
    let key = pseudorandom(32, 13);
    let block = pseudorandom(128, 14);
    let expected = c.encrypt(&block, &key, b"shared").unwrap();
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| assert_eq!(c.encrypt(&block, &key, b"shared").unwrap(), expected));
        }
    });
}
