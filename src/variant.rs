//! Variant descriptors and the interface every primitive family shares.
//!
//! A primitive is bound to one variant when it is constructed and keeps it for
//! its whole lifetime. Binding validates the descriptor against the finite set
//! the family enumerates, so an instance can never hold a variant that its
//! family does not define.

use crate::blockcipher::AesVariant;
use crate::error::{Error, Result};
use crate::hbsh::HbshVariant;
use crate::latindance::LatinVariant;
use crate::nh::NhVariant;
use crate::nhpoly1305::NhPoly1305Variant;
use crate::poly1305::Poly1305Variant;
use crate::xconstruct::XVariant;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Exact byte lengths of the named inputs a primitive wants exercised.
pub type InputLengths = Vec<(&'static str, usize)>;

/// Every variant descriptor the crate knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Salsa20, ChaCha, ChaCha20 (RFC 7539 layout) or Bachata.
    Latin(LatinVariant),
    /// An extended-nonce construction over one of the ARX ciphers.
    X(XVariant),
    /// The NH universal hash.
    Nh(NhVariant),
    /// The Poly1305 MAC.
    Poly1305(Poly1305Variant),
    /// NH followed by Poly1305.
    NhPoly1305(NhPoly1305Variant),
    /// AES with a given key length.
    Aes(AesVariant),
    /// Adiantum, HPolyC or HPolyNHC.
    Hbsh(HbshVariant),
}

macro_rules! catalog_entry {
    ($descriptor:ty, $arm:ident) => {
        impl From<$descriptor> for Variant {
            fn from(v: $descriptor) -> Self {
                Variant::$arm(v)
            }
        }

        impl TryFrom<Variant> for $descriptor {
            type Error = Error;

            fn try_from(v: Variant) -> Result<Self> {
                match v {
                    Variant::$arm(v) => Ok(v),
                    _ => Err(Error::UnknownVariant),
                }
            }
        }
    };
}

catalog_entry!(LatinVariant, Latin);
catalog_entry!(XVariant, X);
catalog_entry!(NhVariant, Nh);
catalog_entry!(Poly1305Variant, Poly1305);
catalog_entry!(NhPoly1305Variant, NhPoly1305);
catalog_entry!(AesVariant, Aes);
catalog_entry!(HbshVariant, Hbsh);

/// Witness that a descriptor came out of [`Primitive::variants`].
///
/// Only this crate can create one, so [`Primitive::bind`] is unreachable
/// from outside and every public constructor checks membership first:
///
/// ```compile_fail
/// use hbsh::nhpoly1305::NhPoly1305Variant;
/// use hbsh::variant::Enumerated;
/// use hbsh::{NhPoly1305, Primitive};
///
/// let forged = NhPoly1305Variant { key: 8, output: 16 };
/// let _ = NhPoly1305::bind(forged, Enumerated(()));
/// ```
#[derive(Debug)]
pub struct Enumerated(pub(crate) ());

/// A primitive family with a finite set of variants.
pub trait Primitive: Sized {
    /// The family's variant descriptor.
    type Variant: Copy + PartialEq + fmt::Debug + Into<Variant> + TryFrom<Variant, Error = Error>;

    /// Enumerate every valid variant. Each call restarts the sequence.
    fn variants() -> impl Iterator<Item = Self::Variant>;

    /// Bind an instance to `variant`, which must come from `variants()`.
    fn bind(variant: Self::Variant, enumerated: Enumerated) -> Self;

    /// The variant this instance is bound to.
    fn variant(&self) -> &Self::Variant;

    /// Name of the primitive family.
    fn name(&self) -> String;

    /// Name of the bound variant, as used for test-vector file names.
    fn variant_name(&self) -> String;

    /// Field-length combinations that known-answer generation should cover.
    fn test_input_lengths(&self) -> Vec<InputLengths>;

    /// Create an instance bound to `variant`.
    ///
    /// Fails with [`Error::UnknownVariant`] when `variant` is not produced by
    /// [`Primitive::variants`].
    fn new(variant: Self::Variant) -> Result<Self> {
        if Self::variants().any(|v| v == variant) {
            Ok(Self::bind(variant, Enumerated(())))
        } else {
            Err(Error::UnknownVariant)
        }
    }

    /// One instance per variant, in enumeration order.
    fn instances() -> impl Iterator<Item = Self> {
        Self::variants().map(|v| Self::bind(v, Enumerated(())))
    }

    /// Create an instance bound to the first variant accepted by `criterion`.
    fn choose_variant<F>(mut criterion: F) -> Result<Self>
    where
        F: FnMut(&Self::Variant) -> bool,
    {
        Self::variants()
            .find(|v| criterion(v))
            .map(|v| Self::bind(v, Enumerated(())))
            .ok_or(Error::NoMatchingVariant)
    }

    /// Create an instance from a catalog entry, as found in a test vector.
    fn from_catalog(variant: &Variant) -> Result<Self> {
        Self::new(Self::Variant::try_from(*variant)?)
    }
}
