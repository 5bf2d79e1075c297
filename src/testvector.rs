//! Known-answer records: generation, checking and hex persistence.
//!
//! A record names the variant that produced it and holds its inputs and
//! outputs as named byte fields. Stream ciphers additionally record a list
//! of keystream blocks at fixed offsets. When a record is persisted, every
//! byte field `name` is written as a hex string under `name_hex`.

use crate::error::{Error, Result};
use crate::latindance::{ChaChaCipher, StreamCipher};
use crate::variant::{InputLengths, Primitive, Variant};
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

/// Suffix of persisted hex fields.
pub const HEX_SUFFIX: &str = "_hex";

/// Keystream block offsets recorded for every stream cipher.
pub const STREAM_OFFSETS: [u64; 5] = [0, 1, 1023, 1024, 2048];

/// Hex-encoded fields, keyed by `name_hex`.
pub type HexFields = BTreeMap<String, String>;

/// Named byte fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(BTreeMap<String, Vec<u8>>);

impl Fields {
    /// An empty set of fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field, builder style.
    pub fn with(mut self, name: &str, value: impl Into<Vec<u8>>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add or replace a field.
    pub fn insert(&mut self, name: &str, value: impl Into<Vec<u8>>) {
        self.0.insert(name.to_string(), value.into());
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        self.0.remove(name)
    }

    /// Whether the field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// The value of a required field.
    pub fn get(&self, name: &str) -> Result<&[u8]> {
        self.0
            .get(name)
            .map(Vec::as_slice)
            .ok_or(Error::MalformedTestVector)
    }

    /// Iterate over fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encode every field as hex under `name_hex`.
    ///
    /// Names that already end in `_hex` are reserved and rejected.
    pub fn to_hex_fields(&self) -> Result<HexFields> {
        self.0
            .iter()
            .map(|(k, v)| {
                if k.ends_with(HEX_SUFFIX) {
                    return Err(Error::MalformedTestVector);
                }
                Ok((format!("{k}{HEX_SUFFIX}"), hex::encode(v)))
            })
            .collect()
    }

    /// Decode fields written by [`Fields::to_hex_fields`].
    pub fn from_hex_fields(fields: &HexFields) -> Result<Self> {
        fields
            .iter()
            .map(|(k, v)| {
                let name = k
                    .strip_suffix(HEX_SUFFIX)
                    .ok_or(Error::MalformedTestVector)?;
                let value = hex::decode(v).map_err(|_| Error::MalformedTestVector)?;
                Ok((name.to_string(), value))
            })
            .collect::<Result<BTreeMap<_, _>>>()
            .map(Self)
    }
}

impl<const N: usize> From<[(&str, Vec<u8>); N]> for Fields {
    fn from(fields: [(&str, Vec<u8>); N]) -> Self {
        fields
            .into_iter()
            .fold(Self::new(), |acc, (k, v)| acc.with(k, v))
    }
}

/// One recorded keystream block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeystreamBlock {
    /// Block offset.
    pub offset: u64,
    /// Keystream bytes at that offset.
    pub result: Vec<u8>,
}

/// A known-answer record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestVector {
    /// Variant that produced the record.
    pub cipher: Variant,
    /// Human-readable description of the inputs.
    pub description: String,
    /// Inputs, e.g. `key`, `nonce`, `tweak`.
    pub input: Fields,
    /// Outputs, e.g. `ciphertext`, `mac`, `hash`.
    pub output: Fields,
    /// Keystream blocks; empty for everything but stream ciphers.
    pub blocks: Vec<KeystreamBlock>,
}

impl TestVector {
    /// An empty record for the variant bound to `primitive`.
    pub fn new<P: Primitive>(primitive: &P, description: &str, input: Fields) -> Self {
        Self {
            cipher: (*primitive.variant()).into(),
            description: description.to_string(),
            input,
            output: Fields::new(),
            blocks: Vec::new(),
        }
    }

    /// Add an output field, builder style.
    pub fn with_output(mut self, name: &str, value: impl Into<Vec<u8>>) -> Self {
        self.output.insert(name, value);
        self
    }

    /// Compare a recomputed output against the recorded one.
    pub fn expect_output(&self, name: &str, actual: &[u8]) -> Result<()> {
        if self.output.get(name)? != actual {
            return Err(Error::TestVectorMismatch);
        }
        Ok(())
    }
}

/// A primitive that can produce and check known-answer records.
pub trait KnownAnswer: Primitive {
    /// Run the primitive on `input` and record the result.
    fn make_testvector(&self, input: Fields, description: &str) -> Result<TestVector>;

    /// Recompute a record with a fresh instance of its variant.
    ///
    /// Fails with [`Error::TestVectorMismatch`] if any output differs.
    fn check_testvector(tv: &TestVector) -> Result<()>;

    /// Records for every input pattern of every length combination.
    fn generate_testvectors(&self) -> Result<Vec<TestVector>> {
        let mut out = Vec::new();
        for lengths in self.test_input_lengths() {
            for (input, description) in generate_inputs(&lengths)? {
                out.push(self.make_testvector(input, &description)?);
            }
        }
        Ok(out)
    }
}

/// Examples of each input kind.
pub const EXAMPLE_COUNT: usize = 12;

/// Reproducible bytes for input generation: the ChaCha20 keystream under a
/// key folded from `label`, with `seed` as the nonce.
struct SeededBytes {
    cipher: ChaChaCipher,
    key: [u8; 32],
    nonce: [u8; 8],
    offset: u64,
    buf: Vec<u8>,
}

impl SeededBytes {
    fn new(label: &str, seed: u64) -> Result<Self> {
        let mut key = [0u8; 32];
        for (i, b) in label.bytes().enumerate() {
            key[i % 32] ^= b.rotate_left((i / 32) as u32);
        }
        Ok(Self {
            cipher: ChaChaCipher::with_rounds_keylen(20, 32)?,
            key,
            nonce: seed.to_le_bytes(),
            offset: 0,
            buf: Vec::new(),
        })
    }

    fn take(&mut self, len: usize) -> Result<Vec<u8>> {
        while self.buf.len() < len {
            let block = self.cipher.gen_output(&self.key, &self.nonce, self.offset)?;
            self.buf.extend_from_slice(&block);
            self.offset += 1;
        }
        Ok(self.buf.drain(..len).collect())
    }

    fn next_u64(&mut self) -> Result<u64> {
        let mut b = [0u8; 8];
        b.copy_from_slice(&self.take(8)?);
        Ok(u64::from_le_bytes(b))
    }
}

/// `count` distinct values below `hi` in ascending order, always including
/// `0` and `hi - 1`; every value when `hi <= count`.
fn spread(hi: u64, count: usize, label: &str) -> Result<Vec<u64>> {
    if hi <= count as u64 {
        return Ok((0..hi).collect());
    }
    let mut picked = BTreeSet::from([0, hi - 1]);
    let mut draws = SeededBytes::new(label, hi)?;
    while picked.len() < count {
        picked.insert(draws.next_u64()? % hi);
    }
    Ok(picked.into_iter().collect())
}

fn repeated(lengths: &InputLengths, byte: impl Fn(usize) -> u8) -> Fields {
    let mut f = Fields::new();
    for (i, &(name, len)) in lengths.iter().enumerate() {
        f.insert(name, vec![byte(i); len]);
    }
    f
}

fn describe(lengths: &InputLengths) -> String {
    lengths
        .iter()
        .map(|(name, len)| format!("{name}={len}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Deterministic inputs covering each field of `lengths`.
///
/// Yields all-zero fields, then per field [`EXAMPLE_COUNT`] single set bits
/// (the first and last among them) and as many incrementing byte runs, then
/// [`EXAMPLE_COUNT`] repeated-byte fills across all fields and as many
/// pseudorandom inputs. The same lengths always give the same inputs.
pub fn generate_inputs(lengths: &InputLengths) -> Result<Vec<(Fields, String)>> {
    let zeros = repeated(lengths, |_| 0);
    let mut out = vec![(zeros.clone(), String::from("All zeros"))];

    for &(name, len) in lengths {
        let bits = len * 8;
        if bits < EXAMPLE_COUNT {
            continue;
        }
        for bit in spread(bits as u64, EXAMPLE_COUNT, "bits")? {
            let bit = bit as usize;
            let mut value = vec![0u8; len];
            value[bit >> 3] |= 1 << (bit & 7);
            out.push((
                zeros.clone().with(name, value),
                format!("Set bit {bit} of {name}"),
            ));
        }
    }

    let starts = spread(0x100, EXAMPLE_COUNT, "ranges")?;
    for &(name, len) in lengths {
        if len == 0 {
            continue;
        }
        for &start in &starts {
            let value: Vec<u8> = (start..start + len as u64).map(|b| b as u8).collect();
            out.push((
                zeros.clone().with(name, value),
                format!("Incrementing bytes from 0x{start:02x} for {name}"),
            ));
        }
    }

    // One byte per field, packed little-endian into the pattern number.
    let patterns = 1u64 << (8 * lengths.len().min(7));
    for r in spread(patterns, EXAMPLE_COUNT, "repeated")? {
        let byte = |i: usize| r.checked_shr(8 * i as u32).unwrap_or(0) as u8;
        let description = lengths
            .iter()
            .enumerate()
            .map(|(i, (name, _))| format!("{name}: 0x{:02x}", byte(i)))
            .collect::<Vec<_>>()
            .join(" ");
        out.push((
            repeated(lengths, byte),
            format!("Repeated bytes: {description}"),
        ));
    }

    let label = describe(lengths);
    for i in 1..=EXAMPLE_COUNT {
        let mut bytes = SeededBytes::new(&label, i as u64)?;
        let mut f = Fields::new();
        for &(name, len) in lengths {
            f.insert(name, bytes.take(len)?);
        }
        out.push((f, format!("Random ({i:2})")));
    }
    Ok(out)
}

/// Record keystream blocks at [`STREAM_OFFSETS`], plus a ciphertext when
/// the input carries a `plaintext`.
pub fn make_stream<C>(cipher: &C, mut input: Fields, description: &str) -> Result<TestVector>
where
    C: StreamCipher + Primitive,
{
    let plaintext = input.remove("plaintext");
    let key = input.get("key")?;
    let nonce = input.get("nonce")?;
    let blocks = STREAM_OFFSETS
        .iter()
        .map(|&offset| {
            Ok(KeystreamBlock {
                offset,
                result: cipher.gen_output(key, nonce, offset)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let ciphertext = match &plaintext {
        Some(pt) => Some(cipher.encrypt(pt, key, nonce, 0)?),
        None => None,
    };

    let mut tv = TestVector::new(cipher, description, input);
    tv.blocks = blocks;
    if let (Some(pt), Some(ct)) = (plaintext, ciphertext) {
        tv.output.insert("plaintext", pt);
        tv.output.insert("ciphertext", ct);
    }
    Ok(tv)
}

/// Check a record produced by [`make_stream`] or parsed from a published
/// plaintext/ciphertext pair.
pub fn check_stream<C>(cipher: &C, tv: &TestVector) -> Result<()>
where
    C: StreamCipher + Primitive,
{
    let key = tv.input.get("key")?;
    let nonce = tv.input.get("nonce")?;
    let has_pair = tv.output.contains("ciphertext");
    if tv.blocks.is_empty() && !has_pair {
        return Err(Error::MalformedTestVector);
    }
    for block in &tv.blocks {
        if cipher.gen_output(key, nonce, block.offset)? != block.result {
            return Err(Error::TestVectorMismatch);
        }
    }
    if has_pair {
        let ct = cipher.encrypt(tv.output.get("plaintext")?, key, nonce, 0)?;
        tv.expect_output("ciphertext", &ct)?;
    }
    Ok(())
}
