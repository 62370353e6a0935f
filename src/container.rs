//! Result containers: the ordered key-value store populated by reading and
//! consumed by writing.

use crate::value::Value;

/// Minimal contract the executors require of a result container.
///
/// [Record] is the default implementation; callers may substitute their own
/// per invocation of [crate::read_as] / [crate::write]. The section and
/// array primitives are provided on top of the four required methods and
/// enforce the kind invariant: a name's kind (scalar, section or array) is
/// fixed by the first declaration that uses it. On conflict they return the
/// existing slot's kind, which the executors turn into a
/// [crate::errors::Error::KindConflict] with the qualified field name.
pub trait Container: Default {
    fn get(&self, name: &str) -> Option<&Value<Self>>
    where
        Self: Sized;

    fn get_mut(&mut self, name: &str) -> Option<&mut Value<Self>>
    where
        Self: Sized;

    /// Creates the slot or overwrites its value in place.
    fn set(&mut self, name: &str, value: Value<Self>)
    where
        Self: Sized;

    fn contains(&self, name: &str) -> bool;

    /// Returns the nested container under `name`, creating an empty one if
    /// the slot is absent.
    fn get_or_create_section(&mut self, name: &str) -> Result<&mut Self, &'static str>
    where
        Self: Sized,
    {
        if !self.contains(name) {
            self.set(name, Value::Section(Self::default()));
        }
        match self.get_mut(name) {
            Some(Value::Section(section)) => Ok(section),
            Some(other) => Err(other.kind()),
            None => Err("missing"),
        }
    }

    /// Returns the sequence under `name`, creating an empty one if the slot
    /// is absent.
    fn get_or_create_array(&mut self, name: &str) -> Result<&mut Vec<Value<Self>>, &'static str>
    where
        Self: Sized,
    {
        if !self.contains(name) {
            self.set(name, Value::Array(Vec::new()));
        }
        match self.get_mut(name) {
            Some(Value::Array(values)) => Ok(values),
            Some(other) => Err(other.kind()),
            None => Err("missing"),
        }
    }

    /// Appends to the sequence under `name`, creating it if needed.
    fn append(&mut self, name: &str, value: Value<Self>) -> Result<(), &'static str>
    where
        Self: Sized,
    {
        self.get_or_create_array(name)?.push(value);
        Ok(())
    }
}

/// The default result container: an insertion-ordered map of field names to
/// values.
///
/// Slots keep the order their fields were declared in, so iterating a decoded
/// [Record] visits fields in layout order. Lookup is a linear scan; sections
/// hold few fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    slots: Vec<(String, Value<Record>)>,
}

impl Record {
    pub fn new() -> Self {
        Record { slots: Vec::new() }
    }

    /// Field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(name, _)| name.as_str())
    }

    /// Slots in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value<Record>)> {
        self.slots.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The unsigned integer under `name`, if that is what the slot holds.
    pub fn uint(&self, name: &str) -> Option<u64> {
        match self.get(name) {
            Some(Value::Uint(v)) => Some(*v),
            _ => None,
        }
    }

    /// The signed integer under `name`, if that is what the slot holds.
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(Value::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// The byte span under `name`, if that is what the slot holds.
    pub fn bytes(&self, name: &str) -> Option<&[u8]> {
        match self.get(name) {
            Some(Value::Bytes(b)) => Some(b.as_slice()),
            _ => None,
        }
    }

    /// Mutable access to the byte span under `name`.
    pub fn bytes_mut(&mut self, name: &str) -> Option<&mut Vec<u8>> {
        match self.get_mut(name) {
            Some(Value::Bytes(b)) => Some(b),
            _ => None,
        }
    }

    /// The nested section under `name`, if that is what the slot holds.
    pub fn section(&self, name: &str) -> Option<&Record> {
        match self.get(name) {
            Some(Value::Section(section)) => Some(section),
            _ => None,
        }
    }

    /// The sequence under `name`, if that is what the slot holds.
    pub fn array(&self, name: &str) -> Option<&[Value<Record>]> {
        match self.get(name) {
            Some(Value::Array(values)) => Some(values.as_slice()),
            _ => None,
        }
    }

    /// Mutable access to the sequence under `name`.
    pub fn array_mut(&mut self, name: &str) -> Option<&mut Vec<Value<Record>>> {
        match self.get_mut(name) {
            Some(Value::Array(values)) => Some(values),
            _ => None,
        }
    }
}

impl Container for Record {
    fn get(&self, name: &str) -> Option<&Value<Record>> {
        self.slots.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Value<Record>> {
        self.slots
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    fn set(&mut self, name: &str, value: Value<Record>) {
        match self.slots.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.slots.push((name.to_string(), value)),
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.slots.iter().any(|(n, _)| n == name)
    }
}

impl std::ops::Index<&str> for Record {
    type Output = Value<Record>;

    fn index(&self, name: &str) -> &Value<Record> {
        match self.get(name) {
            Some(value) => value,
            None => panic!("no field named {name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut record = Record::new();
        record.set("a", Value::Uint(1));
        record.set("b", Value::Int(-1));
        record.set("a", Value::Uint(2));
        assert_eq!(record.uint("a"), Some(2));
        assert_eq!(record.int("b"), Some(-1));
        assert_eq!(record.len(), 2);
        assert!(record.contains("a"));
        assert!(!record.contains("c"));
    }

    #[test]
    fn test_order_preserved_on_overwrite() {
        let mut record = Record::new();
        record.set("a", Value::Uint(1));
        record.set("b", Value::Uint(2));
        record.set("a", Value::Uint(3));
        assert_eq!(record.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_get_or_create_section() {
        let mut record = Record::new();
        record
            .get_or_create_section("head")
            .unwrap()
            .set("x", Value::Uint(7));
        let section = record.get_or_create_section("head").unwrap();
        assert_eq!(section.uint("x"), Some(7));
    }

    #[test]
    fn test_section_kind_conflict() {
        let mut record = Record::new();
        record.set("head", Value::Uint(1));
        assert_eq!(record.get_or_create_section("head"), Err("uint"));
    }

    #[test]
    fn test_array_append() {
        let mut record = Record::new();
        record.append("xs", Value::Uint(1)).unwrap();
        record.append("xs", Value::Uint(2)).unwrap();
        assert_eq!(
            record.array("xs"),
            Some(&[Value::Uint(1), Value::Uint(2)][..])
        );
    }

    #[test]
    fn test_array_kind_conflict() {
        let mut record = Record::new();
        record.set("xs", Value::Bytes(vec![1]));
        assert_eq!(record.append("xs", Value::Uint(1)), Err("bytes"));
    }

    #[test]
    fn test_index() {
        let mut record = Record::new();
        record.set("a", Value::Uint(1));
        assert_eq!(record["a"], Value::Uint(1));
    }
}
