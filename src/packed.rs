//! Packed records: a compact format string describing a fixed sequence of
//! primitive values encoded back to back, with no alignment padding.
//!
//! A format string starts with an optional byte order mark (`>` big, `<`
//! little, `=` native, `!` network) and continues with single
//! character codes, each optionally preceded by a decimal repeat count.
//! Without a mark the caller-supplied default order applies. Spaces between
//! items are ignored.
//!
//! | code      | meaning                                   |
//! |-----------|-------------------------------------------|
//! | `x`       | pad byte: zero on pack, skipped on unpack |
//! | `b` / `B` | signed / unsigned 8-bit                   |
//! | `h` / `H` | signed / unsigned 16-bit                  |
//! | `i` / `I` | signed / unsigned 32-bit (also `l` / `L`) |
//! | `q` / `Q` | signed / unsigned 64-bit                  |
//! | `f` / `d` | IEEE 754 binary32 / binary64              |
//! | `?`       | bool, one byte                            |
//! | `s`       | byte string; the count is its byte length |
//!
//! For `s` the count is a length yielding a single [Scalar::Bytes]; for
//! every other code it is a repetition.

use crate::codec;
use crate::errors::CodecError;
use crate::order::ByteOrder;

/// One element of a packed record.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Uint(u64),
    Int(i64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Bytes(Vec<u8>),
}

impl Scalar {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Scalar::Uint(_) => "uint",
            Scalar::Int(_) => "int",
            Scalar::F32(_) => "f32",
            Scalar::F64(_) => "f64",
            Scalar::Bool(_) => "bool",
            Scalar::Bytes(_) => "bytes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Code {
    Pad,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Bool,
    Str,
}

#[derive(Debug, Clone, Copy)]
struct Item {
    code: Code,
    count: usize,
}

fn width(code: Code) -> usize {
    match code {
        Code::Pad | Code::I8 | Code::U8 | Code::Bool | Code::Str => 1,
        Code::I16 | Code::U16 => 2,
        Code::I32 | Code::U32 | Code::F32 => 4,
        Code::I64 | Code::U64 | Code::F64 => 8,
    }
}

fn size_of(item: &Item) -> usize {
    width(item.code) * item.count
}

fn bad(format: &str) -> CodecError {
    CodecError::BadFormat {
        format: format.to_string(),
    }
}

fn parse(format: &str, default_order: ByteOrder) -> Result<(ByteOrder, Vec<Item>), CodecError> {
    let mut chars = format.chars().peekable();
    let order = match chars.peek() {
        Some('>') | Some('!') => {
            chars.next();
            ByteOrder::Big
        }
        Some('<') => {
            chars.next();
            ByteOrder::Little
        }
        Some('=') => {
            chars.next();
            ByteOrder::native()
        }
        _ => default_order,
    };

    let mut items = Vec::new();
    while let Some(&c) = chars.peek() {
        if c == ' ' {
            chars.next();
            continue;
        }

        let mut count: Option<usize> = None;
        if c.is_ascii_digit() {
            let mut n = 0usize;
            while let Some(digit) = chars.peek().and_then(|d| d.to_digit(10)) {
                n = n
                    .checked_mul(10)
                    .and_then(|n| n.checked_add(digit as usize))
                    .ok_or_else(|| bad(format))?;
                chars.next();
            }
            count = Some(n);
        }

        let code = match chars.next().ok_or_else(|| bad(format))? {
            'x' => Code::Pad,
            'b' => Code::I8,
            'B' => Code::U8,
            'h' => Code::I16,
            'H' => Code::U16,
            'i' | 'l' => Code::I32,
            'I' | 'L' => Code::U32,
            'q' => Code::I64,
            'Q' => Code::U64,
            'f' => Code::F32,
            'd' => Code::F64,
            '?' => Code::Bool,
            's' => Code::Str,
            _ => return Err(bad(format)),
        };

        items.push(Item {
            code,
            count: count.unwrap_or(1),
        });
    }

    Ok((order, items))
}

/// Total encoded size in bytes of `format`.
pub fn calcsize(format: &str) -> Result<usize, CodecError> {
    let (_, items) = parse(format, ByteOrder::Big)?;
    Ok(items.iter().map(size_of).sum())
}

/// Decodes `bytes` according to `format`. The span must be exactly
/// [calcsize] long.
pub fn unpack(
    format: &str,
    bytes: &[u8],
    default_order: ByteOrder,
) -> Result<Vec<Scalar>, CodecError> {
    let (order, items) = parse(format, default_order)?;
    let needed: usize = items.iter().map(size_of).sum();
    if bytes.len() < needed {
        return Err(CodecError::Truncated {
            needed,
            available: bytes.len(),
        });
    }
    if bytes.len() > needed {
        return Err(CodecError::LengthMismatch {
            expected: needed,
            actual: bytes.len(),
        });
    }

    let mut out = Vec::new();
    let mut pos = 0usize;
    for item in &items {
        match item.code {
            Code::Pad => pos += item.count,
            Code::Str => {
                out.push(Scalar::Bytes(bytes[pos..pos + item.count].to_vec()));
                pos += item.count;
            }
            code => {
                let w = width(code);
                for _ in 0..item.count {
                    out.push(decode_scalar(code, &bytes[pos..pos + w], order)?);
                    pos += w;
                }
            }
        }
    }

    Ok(out)
}

/// Encodes `scalars` according to `format`. The scalar sequence must match
/// the format's value slots exactly, in order.
pub fn pack(
    format: &str,
    scalars: &[Scalar],
    default_order: ByteOrder,
) -> Result<Vec<u8>, CodecError> {
    let (order, items) = parse(format, default_order)?;
    let expected: usize = items
        .iter()
        .map(|item| match item.code {
            Code::Pad => 0,
            Code::Str => 1,
            _ => item.count,
        })
        .sum();
    if scalars.len() != expected {
        return Err(CodecError::LengthMismatch {
            expected,
            actual: scalars.len(),
        });
    }

    let mut out = Vec::with_capacity(items.iter().map(size_of).sum());
    let mut next = 0usize;
    for item in &items {
        match item.code {
            Code::Pad => out.resize(out.len() + item.count, 0),
            Code::Str => {
                let value = &scalars[next];
                next += 1;
                match value {
                    Scalar::Bytes(b) => {
                        if b.len() != item.count {
                            return Err(CodecError::LengthMismatch {
                                expected: item.count,
                                actual: b.len(),
                            });
                        }
                        out.extend_from_slice(b);
                    }
                    other => {
                        return Err(CodecError::TypeMismatch {
                            expected: "bytes",
                            found: other.kind(),
                        });
                    }
                }
            }
            code => {
                for _ in 0..item.count {
                    encode_scalar(&mut out, code, &scalars[next], order)?;
                    next += 1;
                }
            }
        }
    }

    Ok(out)
}

fn decode_scalar(code: Code, span: &[u8], order: ByteOrder) -> Result<Scalar, CodecError> {
    Ok(match code {
        Code::U8 | Code::U16 | Code::U32 | Code::U64 => {
            Scalar::Uint(codec::decode_uint(span, order)?)
        }
        Code::I8 | Code::I16 | Code::I32 | Code::I64 => {
            Scalar::Int(codec::decode_int(span, order)?)
        }
        Code::F32 => Scalar::F32(f32::from_bits(codec::decode_uint(span, order)? as u32)),
        Code::F64 => Scalar::F64(f64::from_bits(codec::decode_uint(span, order)?)),
        Code::Bool => Scalar::Bool(span[0] != 0),
        // Pad and Str are handled by the callers before dispatching here.
        Code::Pad | Code::Str => Scalar::Bytes(span.to_vec()),
    })
}

fn encode_scalar(
    out: &mut Vec<u8>,
    code: Code,
    value: &Scalar,
    order: ByteOrder,
) -> Result<(), CodecError> {
    match code {
        Code::Bool => match value {
            Scalar::Bool(b) => out.push(*b as u8),
            other => {
                return Err(CodecError::TypeMismatch {
                    expected: "bool",
                    found: other.kind(),
                });
            }
        },
        Code::F32 => match value {
            Scalar::F32(x) => {
                out.extend_from_slice(&codec::encode_uint(u64::from(x.to_bits()), 4, order)?)
            }
            other => {
                return Err(CodecError::TypeMismatch {
                    expected: "f32",
                    found: other.kind(),
                });
            }
        },
        Code::F64 => match value {
            Scalar::F64(x) => out.extend_from_slice(&codec::encode_uint(x.to_bits(), 8, order)?),
            other => {
                return Err(CodecError::TypeMismatch {
                    expected: "f64",
                    found: other.kind(),
                });
            }
        },
        Code::U8 | Code::U16 | Code::U32 | Code::U64 => {
            let v = match value {
                Scalar::Uint(v) => *v,
                Scalar::Int(v) if *v >= 0 => *v as u64,
                other => {
                    return Err(CodecError::TypeMismatch {
                        expected: "uint",
                        found: other.kind(),
                    });
                }
            };
            out.extend_from_slice(&codec::encode_uint(v, width(code), order)?);
        }
        Code::I8 | Code::I16 | Code::I32 | Code::I64 => {
            let v = match value {
                Scalar::Int(v) => *v,
                Scalar::Uint(v) if *v <= i64::MAX as u64 => *v as i64,
                other => {
                    return Err(CodecError::TypeMismatch {
                        expected: "int",
                        found: other.kind(),
                    });
                }
            };
            out.extend_from_slice(&codec::encode_int(v, width(code), order)?);
        }
        Code::Pad | Code::Str => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calcsize() {
        assert_eq!(calcsize(">2hI4s"), Ok(12));
        assert_eq!(calcsize("<3f"), Ok(12));
        assert_eq!(calcsize("?3s"), Ok(4));
        assert_eq!(calcsize("2x d"), Ok(10));
        assert_eq!(calcsize(""), Ok(0));
    }

    #[test]
    fn test_bad_format() {
        assert_eq!(calcsize(">2z"), Err(bad(">2z")));
        assert_eq!(calcsize("4"), Err(bad("4")));
    }

    #[test]
    fn test_unpack_bool_and_str() {
        let values = unpack(">?3s", b"\xff123", ByteOrder::Big).unwrap();
        assert_eq!(
            values,
            vec![Scalar::Bool(true), Scalar::Bytes(b"123".to_vec())]
        );
    }

    #[test]
    fn test_pack_bool_and_str() {
        let out = pack(
            ">?3s",
            &[Scalar::Bool(false), Scalar::Bytes(b"yes".to_vec())],
            ByteOrder::Big,
        )
        .unwrap();
        assert_eq!(out, b"\x00yes");
    }

    #[test]
    fn test_unpack_floats() {
        let values = unpack(">2f", &[0x3f, 0x80, 0x00, 0x00, 0xc0, 0x00, 0x00, 0x00], ByteOrder::Big)
            .unwrap();
        assert_eq!(values, vec![Scalar::F32(1.0), Scalar::F32(-2.0)]);
    }

    #[test]
    fn test_pack_floats_roundtrip() {
        let values = vec![Scalar::F32(1.5), Scalar::F32(-0.25), Scalar::F32(1024.0)];
        let out = pack("3f", &values, ByteOrder::Little).unwrap();
        assert_eq!(out.len(), 12);
        assert_eq!(unpack("3f", &out, ByteOrder::Little).unwrap(), values);
    }

    #[test]
    fn test_default_order_applies_without_mark() {
        let big = pack("H", &[Scalar::Uint(0x1234)], ByteOrder::Big).unwrap();
        let little = pack("H", &[Scalar::Uint(0x1234)], ByteOrder::Little).unwrap();
        assert_eq!(big, vec![0x12, 0x34]);
        assert_eq!(little, vec![0x34, 0x12]);
        assert_eq!(
            pack(">H", &[Scalar::Uint(0x1234)], ByteOrder::Little).unwrap(),
            vec![0x12, 0x34]
        );
    }

    #[test]
    fn test_pad_bytes() {
        let out = pack("B2xB", &[Scalar::Uint(1), Scalar::Uint(2)], ByteOrder::Big).unwrap();
        assert_eq!(out, vec![1, 0, 0, 2]);
        let values = unpack("B2xB", &out, ByteOrder::Big).unwrap();
        assert_eq!(values, vec![Scalar::Uint(1), Scalar::Uint(2)]);
    }

    #[test]
    fn test_pack_value_count_mismatch() {
        assert_eq!(
            pack("2B", &[Scalar::Uint(1)], ByteOrder::Big),
            Err(CodecError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_pack_overflow() {
        assert_eq!(
            pack("B", &[Scalar::Uint(256)], ByteOrder::Big),
            Err(CodecError::Overflow { size: 1 })
        );
    }

    #[test]
    fn test_pack_type_mismatch() {
        assert_eq!(
            pack("4B", &vec![Scalar::Bytes(b"hell".to_vec()); 4], ByteOrder::Big),
            Err(CodecError::TypeMismatch {
                expected: "uint",
                found: "bytes"
            })
        );
    }

    #[test]
    fn test_pack_str_length_mismatch() {
        assert_eq!(
            pack("4s", &[Scalar::Bytes(b"hello".to_vec())], ByteOrder::Big),
            Err(CodecError::LengthMismatch {
                expected: 4,
                actual: 5
            })
        );
    }

    #[test]
    fn test_unpack_span_length_checked() {
        assert_eq!(
            unpack(">I", &[0x00, 0x01], ByteOrder::Big),
            Err(CodecError::Truncated {
                needed: 4,
                available: 2
            })
        );
        assert_eq!(
            unpack(">H", &[0x00, 0x01, 0x02], ByteOrder::Big),
            Err(CodecError::LengthMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_signed_codes() {
        let out = pack("<hh", &[Scalar::Int(-1), Scalar::Int(300)], ByteOrder::Big).unwrap();
        assert_eq!(out, vec![0xff, 0xff, 0x2c, 0x01]);
        assert_eq!(
            unpack("<hh", &out, ByteOrder::Big).unwrap(),
            vec![Scalar::Int(-1), Scalar::Int(300)]
        );
    }
}
