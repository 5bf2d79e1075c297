//! Error types for HBSH primitives.

use core::fmt;

/// Result type alias for operations in this crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while configuring or running a primitive.
///
/// Every error is a validation failure raised before any output is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An input field has a length the operation does not accept.
    InvalidLength {
        /// Name of the offending field.
        field: &'static str,
        /// Length that was supplied, in bytes.
        actual: usize,
    },

    /// Key material is sized for a different variant than the bound one.
    VariantMismatch {
        /// Name of the offending field.
        field: &'static str,
        /// Length required by the bound variant, in bytes.
        expected: usize,
        /// Length that was supplied, in bytes.
        actual: usize,
    },

    /// The descriptor is not one of the primitive's variants.
    UnknownVariant,

    /// No variant satisfied the selection predicate.
    NoMatchingVariant,

    /// The block offset does not fit in the counter lanes.
    CounterOverflow,

    /// A known-answer record did not reproduce.
    TestVectorMismatch,

    /// A known-answer record is missing fields or holds invalid hex.
    MalformedTestVector,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidLength { field, actual } => {
                write!(f, "invalid length for {field}: {actual} bytes")
            }
            Error::VariantMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "{field} is {actual} bytes but the variant requires {expected}"
            ),
            Error::UnknownVariant => write!(f, "not a variant of this primitive"),
            Error::NoMatchingVariant => write!(f, "no variant matching criterion"),
            Error::CounterOverflow => write!(f, "block offset overflows the counter"),
            Error::TestVectorMismatch => write!(f, "test vector did not reproduce"),
            Error::MalformedTestVector => write!(f, "malformed test vector"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Check that `field` has exactly the length the bound variant requires.
#[inline]
pub(crate) fn expect_len(field: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::VariantMismatch {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}
