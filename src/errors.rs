//! Error types for schema execution and the underlying codecs.

use std::fmt::{self, Display, Formatter};

/// Errors raised while executing a schema in either direction.
///
/// The `field` carried by most variants is the dot-qualified path of the
/// offending declaration, e.g. `chunks[2].size`. All errors unwind the whole
/// read or write call; nothing is retried internally.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Not enough input remained to satisfy a read.
    Truncated {
        field: String,
        needed: usize,
        available: usize,
    },
    /// A write-mode lookup found no value under a required name.
    MissingField { field: String },
    /// A name was redeclared with an incompatible kind within one container.
    KindConflict {
        field: String,
        declared: &'static str,
        existing: &'static str,
    },
    /// The container holds a value of the wrong type for the declaration.
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    /// More elements were pulled from an array than it holds.
    ArrayExhausted { field: String, len: usize },
    /// A value does not fit the requested byte width.
    Overflow { field: String, size: usize },
    /// A stored value's length disagrees with the declared size.
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },
    /// A packed format string could not be parsed.
    BadFormat { field: String, format: String },
    /// A byte order name outside `big`/`little`/`native`.
    UnknownByteOrder { name: String },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Error::Truncated {
                field,
                needed,
                available,
            } => write!(
                f,
                "input truncated while reading {}: needed {} bytes, {} available",
                field, needed, available
            ),
            Error::MissingField { field } => write!(f, "no value for field {}", field),
            Error::KindConflict {
                field,
                declared,
                existing,
            } => write!(
                f,
                "field {} declared as {} but already holds {}",
                field, declared, existing
            ),
            Error::TypeMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "field {} holds {} where {} was expected",
                field, found, expected
            ),
            Error::ArrayExhausted { field, len } => {
                write!(f, "array {} exhausted after {} elements", field, len)
            }
            Error::Overflow { field, size } => {
                write!(f, "value of field {} does not fit in {} bytes", field, size)
            }
            Error::LengthMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "length of field {} is {} but {} was declared",
                field, actual, expected
            ),
            Error::BadFormat { field, format } => {
                write!(f, "field {} has malformed format string {:?}", field, format)
            }
            Error::UnknownByteOrder { name } => write!(f, "unknown byte order {:?}", name),
        }
    }
}

impl std::error::Error for Error {}

/// A failure from the scalar or packed codec, not yet tied to a field.
///
/// The executors promote these with [CodecError::at] once the qualified name
/// of the offending declaration is known.
#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    Overflow {
        size: usize,
    },
    Truncated {
        needed: usize,
        available: usize,
    },
    BadFormat {
        format: String,
    },
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    LengthMismatch {
        expected: usize,
        actual: usize,
    },
}

impl CodecError {
    /// Attaches the qualified name of the offending field.
    pub fn at(self, field: String) -> Error {
        match self {
            CodecError::Overflow { size } => Error::Overflow { field, size },
            CodecError::Truncated { needed, available } => Error::Truncated {
                field,
                needed,
                available,
            },
            CodecError::BadFormat { format } => Error::BadFormat { field, format },
            CodecError::TypeMismatch { expected, found } => Error::TypeMismatch {
                field,
                expected,
                found,
            },
            CodecError::LengthMismatch { expected, actual } => Error::LengthMismatch {
                field,
                expected,
                actual,
            },
        }
    }
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            CodecError::Overflow { size } => write!(f, "value does not fit in {} bytes", size),
            CodecError::Truncated { needed, available } => write!(
                f,
                "input truncated: needed {} bytes, {} available",
                needed, available
            ),
            CodecError::BadFormat { format } => write!(f, "malformed format string {:?}", format),
            CodecError::TypeMismatch { expected, found } => {
                write!(f, "{} found where {} was expected", found, expected)
            }
            CodecError::LengthMismatch { expected, actual } => {
                write!(f, "length is {} but {} was declared", actual, expected)
            }
        }
    }
}

impl std::error::Error for CodecError {}
