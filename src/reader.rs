//! The read executor: binds a schema function to an input byte span and
//! populates a container as declarations execute.

use crate::codec;
use crate::container::{Container, Record};
use crate::errors::Error;
use crate::order::ByteOrder;
use crate::packed::{self, Scalar};
use crate::section::{Flow, Scope, Section};
use crate::value::Value;

/// Read executor. Constructed by [crate::read] / [crate::read_as]; schema
/// functions only see it through the [Section] trait.
pub struct SectionReader<'a, C = Record> {
    data: &'a [u8],
    pos: usize,
    result: C,
    scope: Scope,
}

impl<'a, C: Container> SectionReader<'a, C> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        SectionReader {
            data,
            pos: 0,
            result: C::default(),
            scope: Scope::default(),
        }
    }

    pub(crate) fn into_result(self) -> C {
        self.result
    }

    /// True when the cursor has reached the end of the input.
    pub fn eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Current cursor offset from the start of the input.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Consumes the next `size` bytes, or fails without moving the cursor.
    fn take(&mut self, name: &str, size: usize) -> Result<&'a [u8], Error> {
        let available = self.data.len() - self.pos;
        if size > available {
            return Err(Error::Truncated {
                field: self.scope.qualify(name),
                needed: size,
                available,
            });
        }
        let span = &self.data[self.pos..self.pos + size];
        self.pos += size;
        Ok(span)
    }

    /// Checks a length remembered by a count declaration against the size
    /// the schema now declares for the sized field.
    fn check_pending(&mut self, name: &str, size: usize) -> Result<(), Error> {
        if let Some(expected) = self.scope.pending.remove(name) {
            if expected != size {
                return Err(Error::LengthMismatch {
                    field: self.scope.qualify(name),
                    expected,
                    actual: size,
                });
            }
        }
        Ok(())
    }

    /// Stores a decoded value: appended under an active array, otherwise
    /// set directly, guarding the kind invariant.
    fn store(&mut self, name: &str, value: Value<C>) -> Result<(), Error> {
        if self.scope.cursors.contains_key(name) {
            let field = self.scope.qualify(name);
            self.result
                .append(name, value)
                .map_err(|existing| Error::KindConflict {
                    field,
                    declared: "array",
                    existing,
                })?;
            if let Some(cursor) = self.scope.cursors.get_mut(name) {
                *cursor += 1;
            }
            return Ok(());
        }

        if let Some(existing) = self.result.get(name) {
            if matches!(existing, Value::Section(_) | Value::Array(_)) {
                let existing = existing.kind();
                return Err(Error::KindConflict {
                    field: self.scope.qualify(name),
                    declared: "scalar",
                    existing,
                });
            }
        }
        self.result.set(name, value);
        Ok(())
    }

    /// Executes `def` with `child` as the active container and the scope
    /// descended into `label`, restoring the parent afterwards.
    fn run_child<T>(
        &mut self,
        label: String,
        child: C,
        def: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<(T, C), Error> {
        let saved = self.scope.enter(label);
        let parent = std::mem::replace(&mut self.result, child);
        let outcome = def(self);
        let child = std::mem::replace(&mut self.result, parent);
        self.scope.leave(saved);
        Ok((outcome?, child))
    }
}

impl<'a, C: Container> Section for SectionReader<'a, C> {
    fn byte_order(&self) -> ByteOrder {
        self.scope.order
    }

    fn set_byte_order(&mut self, order: ByteOrder) {
        self.scope.order = order;
    }

    fn bytes(&mut self, name: &str, size: usize) -> Result<Vec<u8>, Error> {
        self.check_pending(name, size)?;
        let span = self.take(name, size)?.to_vec();
        self.store(name, Value::Bytes(span.clone()))?;
        Ok(span)
    }

    fn rest(&mut self, name: &str) -> Result<Vec<u8>, Error> {
        let size = self.data.len() - self.pos;
        self.check_pending(name, size)?;
        let span = self.take(name, size)?.to_vec();
        self.store(name, Value::Bytes(span.clone()))?;
        Ok(span)
    }

    fn uint_with_order(
        &mut self,
        name: &str,
        size: usize,
        order: ByteOrder,
    ) -> Result<u64, Error> {
        let span = self.take(name, size)?;
        let value =
            codec::decode_uint(span, order).map_err(|e| e.at(self.scope.qualify(name)))?;
        self.store(name, Value::Uint(value))?;
        Ok(value)
    }

    fn int_with_order(
        &mut self,
        name: &str,
        size: usize,
        order: ByteOrder,
    ) -> Result<i64, Error> {
        let span = self.take(name, size)?;
        let value =
            codec::decode_int(span, order).map_err(|e| e.at(self.scope.qualify(name)))?;
        self.store(name, Value::Int(value))?;
        Ok(value)
    }

    fn packed(&mut self, name: &str, format: &str) -> Result<Vec<Scalar>, Error> {
        let size = packed::calcsize(format).map_err(|e| e.at(self.scope.qualify(name)))?;
        let span = self.take(name, size)?;
        let values = packed::unpack(format, span, self.scope.order)
            .map_err(|e| e.at(self.scope.qualify(name)))?;
        self.store(name, Value::Packed(values.clone()))?;
        Ok(values)
    }

    fn section<F>(&mut self, name: &str, def: F) -> Result<(), Error>
    where
        F: FnMut(&mut Self) -> Result<(), Error>,
    {
        let under_array = self.scope.cursors.contains_key(name);

        let (label, child) = if under_array {
            let index = self.scope.cursors.get(name).copied().unwrap_or(0);
            (format!("{name}[{index}]"), C::default())
        } else {
            let child = match self.result.get_mut(name) {
                None => C::default(),
                Some(Value::Section(section)) => std::mem::take(section),
                Some(other) => {
                    let existing = other.kind();
                    return Err(Error::KindConflict {
                        field: self.scope.qualify(name),
                        declared: "section",
                        existing,
                    });
                }
            };
            (name.to_string(), child)
        };

        let ((), child) = self.run_child(label, child, def)?;

        if under_array {
            self.store(name, Value::Section(child))
        } else {
            self.result.set(name, Value::Section(child));
            Ok(())
        }
    }

    fn array(&mut self, name: &str) -> Result<(), Error> {
        let field = self.scope.qualify(name);
        self.result
            .get_or_create_array(name)
            .map_err(|existing| Error::KindConflict {
                field,
                declared: "array",
                existing,
            })?;
        self.scope.cursors.entry(name.to_string()).or_insert(0);
        Ok(())
    }

    fn repeat<F>(&mut self, name: &str, mut def: F) -> Result<(), Error>
    where
        F: FnMut(&mut Self) -> Result<Flow, Error>,
    {
        self.array(name)?;
        loop {
            if self.eof() {
                break;
            }
            let index = self.scope.cursors.get(name).copied().unwrap_or(0);
            let (flow, element) =
                self.run_child(format!("{name}[{index}]"), C::default(), &mut def)?;
            self.store(name, Value::Section(element))?;
            if flow == Flow::Break {
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
        let value = self.uint_with_order(count_name, size, order)?;
        let count = usize::try_from(value).map_err(|_| Error::Overflow {
            field: self.scope.qualify(count_name),
            size,
        })?;
        self.scope.pending.insert(sized_name.to_string(), count);
        Ok(count)
    }

    fn skip(&mut self, size: usize) -> Result<(), Error> {
        let span = self.take("__skipped", size)?.to_vec();
        let field = self.scope.qualify("__skipped");
        self.result
            .append("__skipped", Value::Bytes(span))
            .map_err(|existing| Error::KindConflict {
                field,
                declared: "array",
                existing,
            })
    }
}
