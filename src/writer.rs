//! The write executor: binds a schema function to a populated container and
//! emits bytes as declarations execute.

use crate::codec;
use crate::container::{Container, Record};
use crate::errors::Error;
use crate::order::ByteOrder;
use crate::packed::{self, Scalar};
use crate::section::{Flow, Scope, Section};
use crate::value::Value;

/// Write executor. Constructed by [crate::write] / [crate::write_into];
/// schema functions only see it through the [Section] trait. Owns its output
/// buffer so the bytes are handed over only once the whole schema has run.
pub struct SectionWriter<C = Record> {
    out: Vec<u8>,
    current: C,
    scope: Scope,
}

impl<C: Container> SectionWriter<C> {
    pub(crate) fn new(data: C) -> Self {
        SectionWriter {
            out: Vec::new(),
            current: data,
            scope: Scope::default(),
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<u8>, C) {
        (self.out, self.current)
    }

    /// Number of bytes emitted so far.
    pub fn position(&self) -> usize {
        self.out.len()
    }

    /// Looks a value up by name, advancing the array cursor when the name
    /// is an active array.
    fn fetch(&mut self, name: &str) -> Result<&Value<C>, Error> {
        let field = self.scope.qualify(name);
        if let Some(cursor) = self.scope.cursors.get_mut(name) {
            let index = *cursor;
            *cursor += 1;
            return match self.current.get(name) {
                Some(Value::Array(values)) => values.get(index).ok_or(Error::ArrayExhausted {
                    field,
                    len: values.len(),
                }),
                Some(other) => {
                    let found = other.kind();
                    Err(Error::TypeMismatch {
                        field,
                        expected: "array",
                        found,
                    })
                }
                None => Err(Error::MissingField { field }),
            };
        }
        match self.current.get(name) {
            Some(value) => Ok(value),
            None => Err(Error::MissingField { field }),
        }
    }

    /// Executes `def` with `child` as the active container and the scope
    /// descended into `label`. The child comes back even when `def` fails so
    /// the caller can put it back before propagating.
    fn run_child<T>(
        &mut self,
        label: String,
        child: C,
        def: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> (Result<T, Error>, C) {
        let saved = self.scope.enter(label);
        let parent = std::mem::replace(&mut self.current, child);
        let outcome = def(self);
        let child = std::mem::replace(&mut self.current, parent);
        self.scope.leave(saved);
        (outcome, child)
    }

    /// Takes a named child section out of the current container, leaving a
    /// placeholder that `put_back` fills in.
    fn take_section(&mut self, name: &str) -> Result<C, Error> {
        match self.current.get_mut(name) {
            Some(Value::Section(section)) => Ok(std::mem::take(section)),
            Some(other) => {
                let found = other.kind();
                Err(Error::TypeMismatch {
                    field: self.scope.qualify(name),
                    expected: "section",
                    found,
                })
            }
            None => Err(Error::MissingField {
                field: self.scope.qualify(name),
            }),
        }
    }

    /// Takes the next element of an active array, advancing its cursor.
    fn take_element(&mut self, name: &str, cursor: usize) -> Result<C, Error> {
        let field = self.scope.qualify(name);
        let value = match self.current.get_mut(name) {
            Some(Value::Array(values)) => {
                let len = values.len();
                match values.get_mut(cursor) {
                    Some(Value::Section(section)) => Ok(std::mem::take(section)),
                    Some(other) => {
                        let found = other.kind();
                        Err(Error::TypeMismatch {
                            field,
                            expected: "section",
                            found,
                        })
                    }
                    None => Err(Error::ArrayExhausted { field, len }),
                }
            }
            Some(other) => {
                let found = other.kind();
                Err(Error::TypeMismatch {
                    field,
                    expected: "array",
                    found,
                })
            }
            None => Err(Error::MissingField { field }),
        }?;
        if let Some(cursor) = self.scope.cursors.get_mut(name) {
            *cursor += 1;
        }
        Ok(value)
    }

    /// Restores a child taken by `take_section` / `take_element`.
    fn put_back(&mut self, name: &str, under_array: bool, child: C) {
        if under_array {
            let cursor = self.scope.cursors.get(name).copied().unwrap_or(1) - 1;
            if let Some(Value::Array(values)) = self.current.get_mut(name) {
                if let Some(slot) = values.get_mut(cursor) {
                    *slot = Value::Section(child);
                }
            }
        } else {
            self.current.set(name, Value::Section(child));
        }
    }
}

impl<C: Container> Section for SectionWriter<C> {
    fn byte_order(&self) -> ByteOrder {
        self.scope.order
    }

    fn set_byte_order(&mut self, order: ByteOrder) {
        self.scope.order = order;
    }

    fn bytes(&mut self, name: &str, size: usize) -> Result<Vec<u8>, Error> {
        let span = match self.fetch(name)? {
            Value::Bytes(b) => b.clone(),
            other => {
                let found = other.kind();
                return Err(Error::TypeMismatch {
                    field: self.scope.qualify(name),
                    expected: "bytes",
                    found,
                });
            }
        };
        if span.len() != size {
            return Err(Error::LengthMismatch {
                field: self.scope.qualify(name),
                expected: size,
                actual: span.len(),
            });
        }
        self.out.extend_from_slice(&span);
        Ok(span)
    }

    fn rest(&mut self, name: &str) -> Result<Vec<u8>, Error> {
        let span = match self.fetch(name)? {
            Value::Bytes(b) => b.clone(),
            other => {
                let found = other.kind();
                return Err(Error::TypeMismatch {
                    field: self.scope.qualify(name),
                    expected: "bytes",
                    found,
                });
            }
        };
        self.out.extend_from_slice(&span);
        Ok(span)
    }

    fn uint_with_order(
        &mut self,
        name: &str,
        size: usize,
        order: ByteOrder,
    ) -> Result<u64, Error> {
        let value = match self.fetch(name)? {
            Value::Uint(v) => *v,
            Value::Int(v) if *v >= 0 => *v as u64,
            other => {
                let found = other.kind();
                return Err(Error::TypeMismatch {
                    field: self.scope.qualify(name),
                    expected: "uint",
                    found,
                });
            }
        };
        let encoded =
            codec::encode_uint(value, size, order).map_err(|e| e.at(self.scope.qualify(name)))?;
        self.out.extend_from_slice(&encoded);
        Ok(value)
    }

    fn int_with_order(
        &mut self,
        name: &str,
        size: usize,
        order: ByteOrder,
    ) -> Result<i64, Error> {
        let value = match self.fetch(name)? {
            Value::Int(v) => *v,
            Value::Uint(v) if *v <= i64::MAX as u64 => *v as i64,
            other => {
                let found = other.kind();
                return Err(Error::TypeMismatch {
                    field: self.scope.qualify(name),
                    expected: "int",
                    found,
                });
            }
        };
        let encoded =
            codec::encode_int(value, size, order).map_err(|e| e.at(self.scope.qualify(name)))?;
        self.out.extend_from_slice(&encoded);
        Ok(value)
    }

    fn packed(&mut self, name: &str, format: &str) -> Result<Vec<Scalar>, Error> {
        let values = match self.fetch(name)? {
            Value::Packed(values) => values.clone(),
            other => {
                let found = other.kind();
                return Err(Error::TypeMismatch {
                    field: self.scope.qualify(name),
                    expected: "packed",
                    found,
                });
            }
        };
        let encoded = packed::pack(format, &values, self.scope.order)
            .map_err(|e| e.at(self.scope.qualify(name)))?;
        self.out.extend_from_slice(&encoded);
        Ok(values)
    }

    fn section<F>(&mut self, name: &str, def: F) -> Result<(), Error>
    where
        F: FnMut(&mut Self) -> Result<(), Error>,
    {
        let under_array = self.scope.cursors.contains_key(name);

        let (label, child) = if under_array {
            let cursor = self.scope.cursors.get(name).copied().unwrap_or(0);
            (format!("{name}[{cursor}]"), self.take_element(name, cursor)?)
        } else {
            (name.to_string(), self.take_section(name)?)
        };

        let (outcome, child) = self.run_child(label, child, def);
        self.put_back(name, under_array, child);
        outcome
    }

    fn array(&mut self, name: &str) -> Result<(), Error> {
        match self.current.get(name) {
            Some(Value::Array(_)) => {}
            Some(other) => {
                let existing = other.kind();
                return Err(Error::KindConflict {
                    field: self.scope.qualify(name),
                    declared: "array",
                    existing,
                });
            }
            None => self.current.set(name, Value::Array(Vec::new())),
        }
        self.scope.cursors.entry(name.to_string()).or_insert(0);
        Ok(())
    }

    fn repeat<F>(&mut self, name: &str, mut def: F) -> Result<(), Error>
    where
        F: FnMut(&mut Self) -> Result<Flow, Error>,
    {
        self.array(name)?;
        loop {
            let cursor = self.scope.cursors.get(name).copied().unwrap_or(0);
            let len = match self.current.get(name) {
                Some(Value::Array(values)) => values.len(),
                _ => 0,
            };
            if cursor >= len {
                break;
            }
            let element = self.take_element(name, cursor)?;
            let (outcome, element) =
                self.run_child(format!("{name}[{cursor}]"), element, &mut def);
            self.put_back(name, true, element);
            if outcome? == Flow::Break {
                break;
            }
        }
        Ok(())
    }

    fn count_with_order(
        &mut self,
        count_name: &str,
        sized_name: &str,
        size: usize,
        order: ByteOrder,
    ) -> Result<usize, Error> {
        let length = match self.current.get(sized_name) {
            Some(Value::Bytes(b)) => b.len(),
            Some(Value::Array(values)) => values.len(),
            Some(other) => {
                let found = other.kind();
                return Err(Error::TypeMismatch {
                    field: self.scope.qualify(sized_name),
                    expected: "bytes or array",
                    found,
                });
            }
            None => {
                return Err(Error::MissingField {
                    field: self.scope.qualify(sized_name),
                });
            }
        };
        let encoded = codec::encode_uint(length as u64, size, order)
            .map_err(|e| e.at(self.scope.qualify(count_name)))?;
        self.out.extend_from_slice(&encoded);
        self.current.set(count_name, Value::Uint(length as u64));
        Ok(length)
    }

    fn skip(&mut self, size: usize) -> Result<(), Error> {
        let index = self.scope.skipped;
        self.scope.skipped += 1;
        let stored = match self.current.get("__skipped") {
            Some(Value::Array(values)) => match values.get(index) {
                Some(Value::Bytes(b)) => Some(b.clone()),
                Some(other) => {
                    let found = other.kind();
                    return Err(Error::TypeMismatch {
                        field: self.scope.qualify("__skipped"),
                        expected: "bytes",
                        found,
                    });
                }
                None => None,
            },
            Some(other) => {
                let found = other.kind();
                return Err(Error::TypeMismatch {
                    field: self.scope.qualify("__skipped"),
                    expected: "array",
                    found,
                });
            }
            None => None,
        };
        match stored {
            Some(span) => {
                if span.len() != size {
                    return Err(Error::LengthMismatch {
                        field: self.scope.qualify("__skipped"),
                        expected: size,
                        actual: span.len(),
                    });
                }
                self.out.extend_from_slice(&span);
            }
            None => self.out.resize(self.out.len() + size, 0),
        }
        Ok(())
    }
}
