//! ARX permutations in the Salsa20/ChaCha family and the stream ciphers
//! built from them.
//!
//! A [`Layout`] fixes everything that differs between the ciphers: the word
//! type, which of the sixteen state lanes hold the constant, key, nonce and
//! block offset, the lane groups of the double round and the quarter round
//! itself. [`Latindance`] runs any layout, either as a keystream generator or
//! in hash mode, where the final feed-forward is skipped and only the
//! constant and nonce/offset lanes are emitted.

use crate::error::{expect_len, Error, Result};
use crate::testvector::{self, Fields, KnownAnswer, TestVector};
use crate::utils::{from_words, xor_into, Word};
use crate::variant::{Enumerated, InputLengths, Primitive};
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::marker::PhantomData;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of words in an ARX state.
pub const STATE_WORDS: usize = 16;

/// Variant of an ARX stream cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LatinVariant {
    /// Cipher family name.
    pub cipher: &'static str,
    /// Number of rounds; always even.
    pub rounds: usize,
    /// Key length in bytes.
    pub key: usize,
    /// Nonce length in bytes.
    pub nonce: usize,
}

/// Input and output lengths of the hash mode, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashLengths {
    /// Key length.
    pub key: usize,
    /// Length of the combined nonce and offset input.
    pub nonceoffset: usize,
    /// Length of the output (constant lanes followed by nonce/offset lanes).
    pub output: usize,
}

/// Lane map, round schedule and quarter round of one ARX cipher.
pub trait Layout: 'static {
    /// Word type of the state.
    type Word: Word;

    /// Name of the cipher.
    const NAME: &'static str;

    /// Name of the extended-nonce construction over this cipher.
    const X_NAME: &'static str;

    /// Lanes holding the constant.
    const CONST: &'static [usize];

    /// Lanes holding the key.
    const KEY: &'static [usize];

    /// Lanes holding the nonce.
    const NONCE: &'static [usize];

    /// Lanes holding the block offset.
    const OFFSET: &'static [usize];

    /// Lanes written by the hash-mode input, in input order.
    const NONCE_OFFSET: &'static [usize];

    /// Column groups followed by diagonal groups.
    const ROUND_GROUPS: [[usize; 4]; 8];

    /// Mix four words.
    fn quarter_round(q: [Self::Word; 4]) -> [Self::Word; 4];

    /// ASCII constant written into the constant lanes.
    fn constant(variant: &LatinVariant) -> String {
        format!("expand {}-byte k", variant.key)
    }

    /// Name of a variant, as used for test-vector file names.
    fn variant_name(variant: &LatinVariant) -> String {
        format!("{}{}_{}", Self::NAME, variant.rounds, variant.key)
    }

    /// Round counts times the natural key length and half of it.
    fn variants() -> impl Iterator<Item = LatinVariant> {
        let natural = lanes_len::<Self>(Self::KEY);
        let nonce = lanes_len::<Self>(Self::NONCE);
        [8, 12, 20].into_iter().flat_map(move |rounds| {
            [natural / 2, natural].into_iter().map(move |key| LatinVariant {
                cipher: Self::NAME,
                rounds,
                key,
                nonce,
            })
        })
    }
}

/// Byte length of a set of lanes.
#[inline]
fn lanes_len<L: Layout + ?Sized>(lanes: &[usize]) -> usize {
    lanes.len() * <L::Word as Word>::BYTES
}

/// Salsa20 (Bernstein, 2005).
#[derive(Debug, Clone, Copy)]
pub struct Salsa20;

impl Layout for Salsa20 {
    type Word = u32;
    const NAME: &'static str = "Salsa20";
    const X_NAME: &'static str = "XSalsa20";
    const CONST: &'static [usize] = &[0, 5, 10, 15];
    const KEY: &'static [usize] = &[1, 2, 3, 4, 11, 12, 13, 14];
    const NONCE: &'static [usize] = &[6, 7];
    const OFFSET: &'static [usize] = &[8, 9];
    const NONCE_OFFSET: &'static [usize] = &[6, 7, 8, 9];
    const ROUND_GROUPS: [[usize; 4]; 8] = [
        [0, 4, 8, 12],
        [5, 9, 13, 1],
        [10, 14, 2, 6],
        [15, 3, 7, 11],
        [0, 1, 2, 3],
        [5, 6, 7, 4],
        [10, 11, 8, 9],
        [15, 12, 13, 14],
    ];

    #[inline]
    fn quarter_round(mut q: [u32; 4]) -> [u32; 4] {
        for (i, r) in [7, 9, 13, 18].into_iter().enumerate() {
            q[(i + 1) % 4] ^= q[i].wrapping_add(q[(i + 3) % 4]).rotate_left(r);
        }
        q
    }

    fn variant_name(variant: &LatinVariant) -> String {
        format!("{}_{}_{}", Self::NAME, variant.rounds, variant.key)
    }
}

const CHACHA_ROUND_GROUPS: [[usize; 4]; 8] = [
    [0, 4, 8, 12],
    [1, 5, 9, 13],
    [2, 6, 10, 14],
    [3, 7, 11, 15],
    [0, 5, 10, 15],
    [1, 6, 11, 12],
    [2, 7, 8, 13],
    [3, 4, 9, 14],
];

/// The ChaCha quarter round with the given rotation distances.
#[inline(always)]
fn chacha_quarter_round<W: Word>(q: [W; 4], r: [u32; 4]) -> [W; 4] {
    let [mut a, mut b, mut c, mut d] = q;
    a = a.add_mod(b);
    d ^= a;
    d = d.rotl(r[0]);
    c = c.add_mod(d);
    b ^= c;
    b = b.rotl(r[1]);
    a = a.add_mod(b);
    d ^= a;
    d = d.rotl(r[2]);
    c = c.add_mod(d);
    b ^= c;
    b = b.rotl(r[3]);
    [a, b, c, d]
}

/// ChaCha (Bernstein, 2008) with a 64-bit block counter and a 64-bit nonce.
#[derive(Debug, Clone, Copy)]
pub struct ChaCha;

impl Layout for ChaCha {
    type Word = u32;
    const NAME: &'static str = "ChaCha";
    const X_NAME: &'static str = "XChaCha";
    const CONST: &'static [usize] = &[0, 1, 2, 3];
    const KEY: &'static [usize] = &[4, 5, 6, 7, 8, 9, 10, 11];
    const NONCE: &'static [usize] = &[14, 15];
    const OFFSET: &'static [usize] = &[12, 13];
    const NONCE_OFFSET: &'static [usize] = &[12, 13, 14, 15];
    const ROUND_GROUPS: [[usize; 4]; 8] = CHACHA_ROUND_GROUPS;

    #[inline]
    fn quarter_round(q: [u32; 4]) -> [u32; 4] {
        chacha_quarter_round(q, [16, 12, 8, 7])
    }
}

/// ChaCha20 with the RFC 7539 layout: 32-bit block counter, 96-bit nonce.
#[derive(Debug, Clone, Copy)]
pub struct ChaCha20Rfc;

impl Layout for ChaCha20Rfc {
    type Word = u32;
    const NAME: &'static str = "ChaCha20RFC";
    const X_NAME: &'static str = "XChaCha20RFC";
    const CONST: &'static [usize] = &[0, 1, 2, 3];
    const KEY: &'static [usize] = &[4, 5, 6, 7, 8, 9, 10, 11];
    const NONCE: &'static [usize] = &[13, 14, 15];
    const OFFSET: &'static [usize] = &[12];
    const NONCE_OFFSET: &'static [usize] = &[12, 13, 14, 15];
    const ROUND_GROUPS: [[usize; 4]; 8] = CHACHA_ROUND_GROUPS;

    #[inline]
    fn quarter_round(q: [u32; 4]) -> [u32; 4] {
        chacha_quarter_round(q, [16, 12, 8, 7])
    }

    fn variants() -> impl Iterator<Item = LatinVariant> {
        core::iter::once(LatinVariant {
            cipher: Self::NAME,
            rounds: 20,
            key: lanes_len::<Self>(Self::KEY),
            nonce: lanes_len::<Self>(Self::NONCE),
        })
    }
}

/// ChaCha over 64-bit words, with the rotations of the BLAKE2b G function.
#[derive(Debug, Clone, Copy)]
pub struct Bachata;

impl Layout for Bachata {
    type Word = u64;
    const NAME: &'static str = "Bachata";
    const X_NAME: &'static str = "XBachata";
    const CONST: &'static [usize] = &[0, 1, 2, 3];
    const KEY: &'static [usize] = &[4, 5, 6, 7];
    const NONCE: &'static [usize] = &[9, 10, 11, 12, 13, 14, 15];
    const OFFSET: &'static [usize] = &[8];
    const NONCE_OFFSET: &'static [usize] = &[8, 9, 10, 11, 12, 13, 14, 15];
    const ROUND_GROUPS: [[usize; 4]; 8] = CHACHA_ROUND_GROUPS;

    #[inline]
    fn quarter_round(q: [u64; 4]) -> [u64; 4] {
        chacha_quarter_round(q, [32, 24, 16, 63])
    }

    fn constant(variant: &LatinVariant) -> String {
        format!(
            "expand {:2}-byte key thru {:2} round",
            variant.key, variant.rounds
        )
    }
}

/// Working state of one block: the initial state and the state being permuted.
#[derive(Debug, Clone, Zeroize, ZeroizeOnDrop)]
pub struct ArxState<W: Word> {
    initial: [W; STATE_WORDS],
    state: [W; STATE_WORDS],
}

impl<W: Word> ArxState<W> {
    fn new() -> Self {
        Self {
            initial: [W::default(); STATE_WORDS],
            state: [W::default(); STATE_WORDS],
        }
    }

    /// Write `bytes` into `lanes` of the initial state.
    fn write(&mut self, field: &'static str, lanes: &[usize], bytes: &[u8]) -> Result<()> {
        expect_len(field, lanes.len() * W::BYTES, bytes.len())?;
        for (&lane, chunk) in lanes.iter().zip(bytes.chunks_exact(W::BYTES)) {
            self.initial[lane] = W::from_le_slice(chunk);
        }
        Ok(())
    }

    /// The initial state, as laid out by setup.
    pub fn initial(&self) -> &[W; STATE_WORDS] {
        &self.initial
    }

    /// The current state.
    pub fn words(&self) -> &[W; STATE_WORDS] {
        &self.state
    }

    fn read(&self, lanes: impl Iterator<Item = usize>) -> Vec<u8> {
        let words: Vec<W> = lanes.map(|i| self.state[i]).collect();
        from_words(&words)
    }
}

/// An ARX stream cipher bound to one variant of layout `L`.
#[derive(Debug, Clone, Copy)]
pub struct Latindance<L: Layout> {
    variant: LatinVariant,
    layout: PhantomData<fn() -> L>,
}

/// Salsa20 stream cipher.
pub type Salsa20Cipher = Latindance<Salsa20>;
/// ChaCha stream cipher with a 64-bit nonce.
pub type ChaChaCipher = Latindance<ChaCha>;
/// ChaCha20 stream cipher with a 96-bit nonce.
pub type ChaCha20RfcCipher = Latindance<ChaCha20Rfc>;
/// 64-bit-word ChaCha stream cipher.
pub type BachataCipher = Latindance<Bachata>;

impl<L: Layout> Latindance<L> {
    /// Create the variant with the given round count and key length.
    pub fn with_rounds_keylen(rounds: usize, key_len: usize) -> Result<Self> {
        Self::choose_variant(|v| v.rounds == rounds && v.key == key_len)
    }

    /// Hash-mode lengths of the bound variant.
    pub fn hash_lengths(&self) -> HashLengths {
        HashLengths {
            key: self.variant.key,
            nonceoffset: lanes_len::<L>(L::NONCE_OFFSET),
            output: lanes_len::<L>(L::CONST) + lanes_len::<L>(L::NONCE_OFFSET),
        }
    }

    /// Write the constant and key lanes, duplicating a half-length key.
    fn setup_key(&self, key: &[u8]) -> Result<ArxState<L::Word>> {
        expect_len("key", self.variant.key, key.len())?;
        let mut st = ArxState::new();
        st.write("const", L::CONST, L::constant(&self.variant).as_bytes())?;
        if key.len() == lanes_len::<L>(L::KEY) {
            st.write("key", L::KEY, key)?;
        } else {
            let mut doubled = [key, key].concat();
            let res = st.write("key", L::KEY, &doubled);
            doubled.zeroize();
            res?;
        }
        Ok(st)
    }

    /// Build the initial state for one keystream block.
    pub fn setup(&self, key: &[u8], nonce: &[u8], offset: u64) -> Result<ArxState<L::Word>> {
        let mut st = self.setup_key(key)?;
        expect_len("nonce", self.variant.nonce, nonce.len())?;
        st.write("nonce", L::NONCE, nonce)?;

        let offset_len = lanes_len::<L>(L::OFFSET);
        if offset_len < 8 && offset >> (8 * offset_len) != 0 {
            return Err(Error::CounterOverflow);
        }
        let mut offset_bytes = vec![0u8; offset_len];
        let n = offset_len.min(8);
        offset_bytes[..n].copy_from_slice(&offset.to_le_bytes()[..n]);
        st.write("offset", L::OFFSET, &offset_bytes)?;
        Ok(st)
    }

    /// Build the initial state for hash mode.
    pub fn setup_hash(&self, key: &[u8], nonceoffset: &[u8]) -> Result<ArxState<L::Word>> {
        let mut st = self.setup_key(key)?;
        st.write("nonceoffset", L::NONCE_OFFSET, nonceoffset)?;
        Ok(st)
    }

    fn before_rounds(&self, st: &mut ArxState<L::Word>) {
        st.state = st.initial;
    }

    fn double_round(&self, st: &mut ArxState<L::Word>) {
        for group in &L::ROUND_GROUPS {
            let q = L::quarter_round(group.map(|p| st.state[p]));
            for (&p, w) in group.iter().zip(q) {
                st.state[p] = w;
            }
        }
    }

    fn apply_rounds(&self, st: &mut ArxState<L::Word>) {
        for _ in 0..self.variant.rounds / 2 {
            self.double_round(st);
        }
    }

    fn add_initstate(&self, st: &mut ArxState<L::Word>) {
        for (s, i) in st.state.iter_mut().zip(st.initial.iter()) {
            *s = s.add_mod(*i);
        }
    }

    /// Permute the initial state and add it back in.
    pub fn run(&self, st: &mut ArxState<L::Word>) {
        self.before_rounds(st);
        self.apply_rounds(st);
        self.add_initstate(st);
    }

    /// Serialize the whole state.
    pub fn output(&self, st: &ArxState<L::Word>) -> Vec<u8> {
        st.read(0..STATE_WORDS)
    }

    /// Serialize the constant lanes followed by the nonce/offset lanes.
    pub fn hash_output(&self, st: &ArxState<L::Word>) -> Vec<u8> {
        st.read(L::CONST.iter().chain(L::NONCE_OFFSET).copied())
    }

    /// Keyed hash used for subkey derivation (HSalsa20, HChaCha).
    pub fn hash(&self, key: &[u8], nonceoffset: &[u8]) -> Result<Vec<u8>> {
        let mut st = self.setup_hash(key, nonceoffset)?;
        self.before_rounds(&mut st);
        self.apply_rounds(&mut st);
        Ok(self.hash_output(&st))
    }
}

/// A keystream generator with XOR encryption.
pub trait StreamCipher {
    /// Key length in bytes.
    fn key_len(&self) -> usize;

    /// Nonce length in bytes.
    fn nonce_len(&self) -> usize;

    /// Keystream block length in bytes.
    fn block_len(&self) -> usize;

    /// Generate the keystream block at `offset`.
    fn gen_output(&self, key: &[u8], nonce: &[u8], offset: u64) -> Result<Vec<u8>>;

    /// XOR `plaintext` with the keystream starting at block `offset`.
    fn encrypt(&self, plaintext: &[u8], key: &[u8], nonce: &[u8], offset: u64) -> Result<Vec<u8>> {
        expect_len("key", self.key_len(), key.len())?;
        expect_len("nonce", self.nonce_len(), nonce.len())?;
        let mut out = plaintext.to_vec();
        for (i, chunk) in out.chunks_mut(self.block_len()).enumerate() {
            let offset = offset
                .checked_add(i as u64)
                .ok_or(Error::CounterOverflow)?;
            xor_into(chunk, &self.gen_output(key, nonce, offset)?);
        }
        Ok(out)
    }

    /// Inverse of [`StreamCipher::encrypt`]; XOR is its own inverse.
    fn decrypt(&self, ciphertext: &[u8], key: &[u8], nonce: &[u8], offset: u64) -> Result<Vec<u8>> {
        self.encrypt(ciphertext, key, nonce, offset)
    }
}

impl<L: Layout> StreamCipher for Latindance<L> {
    fn key_len(&self) -> usize {
        self.variant.key
    }

    fn nonce_len(&self) -> usize {
        self.variant.nonce
    }

    fn block_len(&self) -> usize {
        STATE_WORDS * <L::Word as Word>::BYTES
    }

    fn gen_output(&self, key: &[u8], nonce: &[u8], offset: u64) -> Result<Vec<u8>> {
        let mut st = self.setup(key, nonce, offset)?;
        self.run(&mut st);
        Ok(self.output(&st))
    }
}

impl<L: Layout> Primitive for Latindance<L> {
    type Variant = LatinVariant;

    fn variants() -> impl Iterator<Item = LatinVariant> {
        L::variants()
    }

    fn bind(variant: LatinVariant, _: Enumerated) -> Self {
        Self {
            variant,
            layout: PhantomData,
        }
    }

    fn variant(&self) -> &LatinVariant {
        &self.variant
    }

    fn name(&self) -> String {
        String::from(L::NAME)
    }

    fn variant_name(&self) -> String {
        L::variant_name(&self.variant)
    }

    fn test_input_lengths(&self) -> Vec<InputLengths> {
        vec![vec![("key", self.variant.key), ("nonce", self.variant.nonce)]]
    }
}

impl<L: Layout> KnownAnswer for Latindance<L> {
    fn make_testvector(&self, input: Fields, description: &str) -> Result<TestVector> {
        testvector::make_stream(self, input, description)
    }

    fn check_testvector(tv: &TestVector) -> Result<()> {
        testvector::check_stream(&Self::from_catalog(&tv.cipher)?, tv)
    }
}
