//! Values held in a result container.

use crate::packed::Scalar;

/// One slot in a result container: a decoded field, a nested section or a
/// repeated sequence.
///
/// The container type is a parameter so any [crate::container::Container]
/// implementation can nest inside its own values.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<C> {
    /// Raw byte span.
    Bytes(Vec<u8>),
    /// Unsigned integer.
    Uint(u64),
    /// Signed integer.
    Int(i64),
    /// A fixed-format record, stored as one ordered tuple of scalars.
    Packed(Vec<Scalar>),
    /// A nested container produced by a `section` declaration.
    Section(C),
    /// An ordered sequence produced by declarations under an `array` marker.
    Array(Vec<Value<C>>),
}

impl<C> Value<C> {
    /// Slot kind name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bytes(_) => "bytes",
            Value::Uint(_) => "uint",
            Value::Int(_) => "int",
            Value::Packed(_) => "packed",
            Value::Section(_) => "section",
            Value::Array(_) => "array",
        }
    }
}
