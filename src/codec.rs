//! Scalar codec: byte spans to and from two's complement integers at an
//! explicit byte order.
//!
//! Widths 1 through 8 cover the full `u64`/`i64` range. Wider spans are
//! size-only: decoding succeeds when the excess high-order bytes carry no
//! significant bits, encoding pads with zero or sign fill.

use crate::errors::CodecError;
use crate::order::ByteOrder;

/// Decodes `bytes` as an unsigned integer. Fails if the significant bits do
/// not fit 64.
pub fn decode_uint(bytes: &[u8], order: ByteOrder) -> Result<u64, CodecError> {
    let significant = if bytes.len() > 8 {
        let (extra, low) = match order {
            ByteOrder::Big => bytes.split_at(bytes.len() - 8),
            ByteOrder::Little => {
                let (low, extra) = bytes.split_at(8);
                (extra, low)
            }
        };
        if extra.iter().any(|&b| b != 0) {
            return Err(CodecError::Overflow { size: bytes.len() });
        }
        low
    } else {
        bytes
    };

    let mut value = 0u64;
    match order {
        ByteOrder::Big => {
            for &b in significant {
                value = (value << 8) | u64::from(b);
            }
        }
        ByteOrder::Little => {
            for &b in significant.iter().rev() {
                value = (value << 8) | u64::from(b);
            }
        }
    }

    Ok(value)
}

/// Decodes `bytes` as a signed two's complement integer.
pub fn decode_int(bytes: &[u8], order: ByteOrder) -> Result<i64, CodecError> {
    if bytes.is_empty() {
        return Ok(0);
    }

    if bytes.len() <= 8 {
        let raw = decode_uint(bytes, order)?;
        return Ok(sign_extend(raw, bytes.len() * 8));
    }

    let (extra, low) = match order {
        ByteOrder::Big => bytes.split_at(bytes.len() - 8),
        ByteOrder::Little => {
            let (low, extra) = bytes.split_at(8);
            (extra, low)
        }
    };

    let value = decode_uint(low, order)? as i64;
    let fill = if value < 0 { 0xff } else { 0x00 };
    if extra.iter().any(|&b| b != fill) {
        return Err(CodecError::Overflow { size: bytes.len() });
    }

    Ok(value)
}

/// Encodes `value` into exactly `size` bytes. Fails if the value does not
/// fit the requested width.
pub fn encode_uint(value: u64, size: usize, order: ByteOrder) -> Result<Vec<u8>, CodecError> {
    if size < 8 && value >> (size * 8) != 0 {
        return Err(CodecError::Overflow { size });
    }

    let mut out = vec![0u8; size];
    match order {
        ByteOrder::Big => {
            for i in 0..size.min(8) {
                out[size - 1 - i] = (value >> (8 * i)) as u8;
            }
        }
        ByteOrder::Little => {
            for i in 0..size.min(8) {
                out[i] = (value >> (8 * i)) as u8;
            }
        }
    }

    Ok(out)
}

/// Encodes `value` into exactly `size` bytes of two's complement. Fails if
/// the value does not fit the requested width.
pub fn encode_int(value: i64, size: usize, order: ByteOrder) -> Result<Vec<u8>, CodecError> {
    if size == 0 {
        if value != 0 {
            return Err(CodecError::Overflow { size });
        }
        return Ok(Vec::new());
    }

    if size < 8 {
        let bits = size * 8;
        let min = -(1i64 << (bits - 1));
        let max = (1i64 << (bits - 1)) - 1;
        if value < min || value > max {
            return Err(CodecError::Overflow { size });
        }
    }

    let fill = if value < 0 { 0xffu8 } else { 0x00 };
    let raw = value as u64;
    let mut out = vec![fill; size];
    match order {
        ByteOrder::Big => {
            for i in 0..size.min(8) {
                out[size - 1 - i] = (raw >> (8 * i)) as u8;
            }
        }
        ByteOrder::Little => {
            for i in 0..size.min(8) {
                out[i] = (raw >> (8 * i)) as u8;
            }
        }
    }

    Ok(out)
}

/// Sign-extends the low `bits` of `value` to a full `i64`.
fn sign_extend(value: u64, bits: usize) -> i64 {
    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_uint_big() {
        assert_eq!(decode_uint(&[0x00, 0x05], ByteOrder::Big), Ok(5));
        assert_eq!(decode_uint(&[0x12, 0x34], ByteOrder::Big), Ok(0x1234));
        assert_eq!(decode_uint(&[], ByteOrder::Big), Ok(0));
    }

    #[test]
    fn test_decode_uint_little() {
        assert_eq!(decode_uint(&[0x05, 0x00], ByteOrder::Little), Ok(5));
        assert_eq!(decode_uint(&[0x34, 0x12], ByteOrder::Little), Ok(0x1234));
    }

    #[test]
    fn test_decode_uint_odd_width() {
        assert_eq!(
            decode_uint(&[0x01, 0x02, 0x03], ByteOrder::Big),
            Ok(0x010203)
        );
    }

    #[test]
    fn test_decode_uint_wide_with_zero_fill() {
        let bytes = [0, 0, 0, 0, 0, 0, 0, 0, 0x12, 0x34];
        assert_eq!(decode_uint(&bytes, ByteOrder::Big), Ok(0x1234));
    }

    #[test]
    fn test_decode_uint_wide_overflow() {
        let bytes = [1, 0, 0, 0, 0, 0, 0, 0, 0x12, 0x34];
        assert_eq!(
            decode_uint(&bytes, ByteOrder::Big),
            Err(CodecError::Overflow { size: 10 })
        );
    }

    #[test]
    fn test_decode_int_sign() {
        assert_eq!(decode_int(&[0xff], ByteOrder::Big), Ok(-1));
        assert_eq!(decode_int(&[0x7f], ByteOrder::Big), Ok(127));
        assert_eq!(decode_int(&[0xff, 0xff, 0x00, 0x00], ByteOrder::Big), Ok(-65536));
        assert_eq!(decode_int(&[0x00, 0x00, 0xff, 0xff], ByteOrder::Little), Ok(-65536));
    }

    #[test]
    fn test_decode_int_wide_negative() {
        let mut bytes = vec![0xff; 10];
        bytes[9] = 0xfe;
        assert_eq!(decode_int(&bytes, ByteOrder::Big), Ok(-2));
    }

    #[test]
    fn test_encode_uint() {
        assert_eq!(
            encode_uint(65535, 4, ByteOrder::Big),
            Ok(vec![0x00, 0x00, 0xff, 0xff])
        );
        assert_eq!(
            encode_uint(65535, 4, ByteOrder::Little),
            Ok(vec![0xff, 0xff, 0x00, 0x00])
        );
        assert_eq!(encode_uint(0, 0, ByteOrder::Big), Ok(vec![]));
    }

    #[test]
    fn test_encode_uint_overflow() {
        assert_eq!(
            encode_uint(65540, 2, ByteOrder::Big),
            Err(CodecError::Overflow { size: 2 })
        );
        assert_eq!(
            encode_uint(1, 0, ByteOrder::Big),
            Err(CodecError::Overflow { size: 0 })
        );
    }

    #[test]
    fn test_encode_int() {
        assert_eq!(
            encode_int(-65536, 4, ByteOrder::Big),
            Ok(vec![0xff, 0xff, 0x00, 0x00])
        );
        assert_eq!(
            encode_int(-65536, 4, ByteOrder::Little),
            Ok(vec![0x00, 0x00, 0xff, 0xff])
        );
        assert_eq!(encode_int(-1, 1, ByteOrder::Big), Ok(vec![0xff]));
    }

    #[test]
    fn test_encode_int_range() {
        assert_eq!(encode_int(127, 1, ByteOrder::Big), Ok(vec![0x7f]));
        assert_eq!(
            encode_int(128, 1, ByteOrder::Big),
            Err(CodecError::Overflow { size: 1 })
        );
        assert_eq!(encode_int(-128, 1, ByteOrder::Big), Ok(vec![0x80]));
        assert_eq!(
            encode_int(-129, 1, ByteOrder::Big),
            Err(CodecError::Overflow { size: 1 })
        );
    }

    #[test]
    fn test_encode_int_wide_sign_fill() {
        assert_eq!(
            encode_int(-2, 9, ByteOrder::Big),
            Ok(vec![0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe])
        );
        assert_eq!(
            encode_uint(0x1234, 9, ByteOrder::Little),
            Ok(vec![0x34, 0x12, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00])
        );
    }

    #[test]
    fn test_roundtrip_every_width() {
        for size in 1..=8usize {
            let max = if size == 8 { u64::MAX } else { (1u64 << (size * 8)) - 1 };
            for value in [0u64, 1, max / 2, max] {
                for order in [ByteOrder::Big, ByteOrder::Little] {
                    let encoded = encode_uint(value, size, order).unwrap();
                    assert_eq!(encoded.len(), size);
                    assert_eq!(decode_uint(&encoded, order), Ok(value));
                }
            }
        }
    }
}
