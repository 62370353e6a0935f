//! Serialization of decoded containers, behind the `serde` feature.
//!
//! [Record] serializes as a map in declaration order, so a decoded file can
//! be handed to `serde_json` (or any other serde backend) for inspection.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::container::Record;
use crate::packed::Scalar;
use crate::value::Value;

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<C: Serialize> Serialize for Value<C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bytes(b) => serializer.serialize_bytes(b),
            Value::Uint(v) => serializer.serialize_u64(*v),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Packed(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Value::Section(section) => section.serialize(serializer),
            Value::Array(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Uint(v) => serializer.serialize_u64(*v),
            Scalar::Int(v) => serializer.serialize_i64(*v),
            Scalar::F32(v) => serializer.serialize_f32(*v),
            Scalar::F64(v) => serializer.serialize_f64(*v),
            Scalar::Bool(v) => serializer.serialize_bool(*v),
            Scalar::Bytes(b) => serializer.serialize_bytes(b),
        }
    }
}
