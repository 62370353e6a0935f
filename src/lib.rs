//! # bytecraft
//!
//! A byte-level codec driven by schema functions. A schema is an ordinary
//! function, generic over [Section], that declares the fields of a format in
//! the order they appear on the wire. The same function drives both
//! directions: [read] walks it over input bytes and fills a [Record], and
//! [write] walks it over a populated container and emits bytes.
//!
//! ```
//! use bytecraft::{Error, Section};
//!
//! fn message<S: Section>(f: &mut S) -> Result<(), Error> {
//!     f.bytes("id", 4)?;
//!     let size = f.count("size", "text", 2)?;
//!     f.bytes("text", size)?;
//!     Ok(())
//! }
//!
//! let mut record = bytecraft::read(b"ABCD\x00\x05Hello", message).unwrap();
//! assert_eq!(record.bytes("text"), Some(&b"Hello"[..]));
//!
//! record.bytes_mut("text").unwrap().extend_from_slice(b", world");
//! let out = bytecraft::write(&mut record, message).unwrap();
//! assert_eq!(out, b"ABCD\x00\x0cHello, world");
//! ```

pub mod codec;
pub mod container;
pub mod errors;
pub mod order;
pub mod packed;
pub mod reader;
pub mod section;
#[cfg(feature = "serde")]
mod serde;
pub mod value;
pub mod writer;

pub use container::{Container, Record};
pub use errors::{CodecError, Error};
pub use order::ByteOrder;
pub use packed::Scalar;
pub use reader::SectionReader;
pub use section::{Flow, Section};
pub use value::Value;
pub use writer::SectionWriter;

/// Runs a schema function over `data` and returns the decoded [Record].
///
/// The reader's lifetime is fixed to `data` here, so plain fn items generic
/// over [Section] satisfy the bound.
pub fn read<'a, F>(data: &'a [u8], def: F) -> Result<Record, Error>
where
    F: FnMut(&mut SectionReader<'a, Record>) -> Result<(), Error>,
{
    read_as(data, def)
}

/// Like [read], but decodes into any [Container] implementation.
pub fn read_as<'a, C, F>(data: &'a [u8], mut def: F) -> Result<C, Error>
where
    C: Container,
    F: FnMut(&mut SectionReader<'a, C>) -> Result<(), Error>,
{
    let mut reader = SectionReader::new(data);
    def(&mut reader)?;
    Ok(reader.into_result())
}

/// Runs a schema function over a populated container and returns the
/// encoded bytes. Count fields in `data` are updated in place.
pub fn write<C, F>(data: &mut C, mut def: F) -> Result<Vec<u8>, Error>
where
    C: Container,
    F: FnMut(&mut SectionWriter<C>) -> Result<(), Error>,
{
    let mut writer = SectionWriter::new(std::mem::take(data));
    let outcome = def(&mut writer);
    let (out, restored) = writer.into_parts();
    *data = restored;
    outcome?;
    Ok(out)
}

/// Like [write], but appends to an existing buffer. On failure the buffer
/// is left untouched.
pub fn write_into<C, F>(out: &mut Vec<u8>, data: &mut C, def: F) -> Result<(), Error>
where
    C: Container,
    F: FnMut(&mut SectionWriter<C>) -> Result<(), Error>,
{
    let encoded = write(data, def)?;
    out.extend_from_slice(&encoded);
    Ok(())
}
