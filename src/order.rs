//! Byte order for multi-byte field declarations.

use std::str::FromStr;

use crate::errors::Error;

/// Byte order used to decode and encode multi-byte integers.
///
/// The engine itself never depends on host endianness: [ByteOrder::native]
/// resolves to an explicit variant at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
}

impl ByteOrder {
    /// The host's own byte order, resolved to an explicit variant.
    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        }
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        ByteOrder::Big
    }
}

impl FromStr for ByteOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "big" => Ok(ByteOrder::Big),
            "little" => Ok(ByteOrder::Little),
            "native" => Ok(ByteOrder::native()),
            other => Err(Error::UnknownByteOrder {
                name: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_big() {
        assert_eq!(ByteOrder::default(), ByteOrder::Big);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("big".parse::<ByteOrder>(), Ok(ByteOrder::Big));
        assert_eq!("little".parse::<ByteOrder>(), Ok(ByteOrder::Little));
        assert_eq!("native".parse::<ByteOrder>(), Ok(ByteOrder::native()));
        assert_eq!(
            "middle".parse::<ByteOrder>(),
            Err(Error::UnknownByteOrder {
                name: "middle".to_string()
            })
        );
    }
}
