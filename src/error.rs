//! Errors raised while building schemas and encoding or decoding values.

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a schema could not be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// Two variants of one enum share a discriminant
    DuplicateDiscriminant {
        discriminant: u32,
        first: String,
        second: String,
    },

    /// An array size was negative or does not fit in `usize`
    InvalidArraySize(String),

    /// A struct declared the same field name twice
    DuplicateField(String),

    /// An enum declared the same variant name twice
    DuplicateVariant(String),

    /// An enum variant payload was not a unit, tuple or struct schema
    InvalidPayload { variant: String },
}

impl fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructionError::DuplicateDiscriminant {
                discriminant,
                first,
                second,
            } => write!(
                f,
                "variants {:?} and {:?} share discriminant {}",
                first, second, discriminant
            ),
            ConstructionError::InvalidArraySize(size) => {
                write!(f, "invalid array size: {}", size)
            }
            ConstructionError::DuplicateField(name) => write!(f, "duplicate field {:?}", name),
            ConstructionError::DuplicateVariant(name) => write!(f, "duplicate variant {:?}", name),
            ConstructionError::InvalidPayload { variant } => write!(
                f,
                "payload of variant {:?} must be a unit, tuple or struct schema",
                variant
            ),
        }
    }
}

/// Errors that can occur while building a schema or encoding/decoding a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The schema itself is invalid
    Construction(ConstructionError),

    /// The schema uses a type or configuration the codec does not implement
    Unsupported(&'static str),

    /// The value does not have the shape the schema describes
    ShapeMismatch { expected: String, found: String },

    /// A write would go past the end of the destination buffer
    BufferOverflow { needed: usize, available: usize },

    /// A read would go past the end of the source buffer
    BufferUnderrun { needed: usize, available: usize },

    /// A decoded enum discriminant matches no declared variant
    UnknownDiscriminant(u32),

    /// A decoded sequence of zero-sized elements is longer than the decoder accepts
    LengthOverflow { max: usize, got: usize },

    /// The operation would consume more bytes than the configured limit
    LimitExceeded { limit: usize, needed: usize },

    /// A decoded bool byte was neither 0 nor 1
    InvalidBool(u8),

    /// A decoded string was not valid UTF-8
    InvalidUtf8,

    /// Input remained after decoding a complete value
    TrailingBytes(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Construction(e) => write!(f, "invalid schema: {}", e),
            Error::Unsupported(t) => write!(f, "unsupported: {}", t),
            Error::ShapeMismatch { expected, found } => {
                write!(f, "shape mismatch: expected {}, found {}", expected, found)
            }
            Error::BufferOverflow { needed, available } => write!(
                f,
                "buffer overflow: {} bytes needed, {} available",
                needed, available
            ),
            Error::BufferUnderrun { needed, available } => write!(
                f,
                "unexpected end of input: {} bytes needed, {} available",
                needed, available
            ),
            Error::UnknownDiscriminant(v) => write!(f, "unknown enum discriminant: {}", v),
            Error::LengthOverflow { max, got } => {
                write!(f, "length {} exceeds maximum {}", got, max)
            }
            Error::LimitExceeded { limit, needed } => {
                write!(f, "byte limit {} exceeded ({} needed)", limit, needed)
            }
            Error::InvalidBool(v) => write!(f, "invalid boolean encoding: {} (must be 0 or 1)", v),
            Error::InvalidUtf8 => write!(f, "string contains invalid UTF-8"),
            Error::TrailingBytes(n) => write!(f, "{} trailing bytes after value", n),
        }
    }
}

impl std::error::Error for Error {}

impl From<ConstructionError> for Error {
    fn from(e: ConstructionError) -> Self {
        Error::Construction(e)
    }
}

impl Error {
    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::ShapeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}
