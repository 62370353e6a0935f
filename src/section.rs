//! The declaration API schema functions are written against.
//!
//! A schema function describes a binary layout as a sequence of declaration
//! calls. Executed under a [crate::reader::SectionReader] the declarations
//! consume input bytes and populate a container; under a
//! [crate::writer::SectionWriter] they pull values back out of a container
//! and append their encoding to the output buffer. Every method returns the
//! field's value in both directions, so ordinary control flow (a loop
//! bounded by a count field, a branch on a tag just declared) behaves
//! identically when reading and writing.

use std::collections::BTreeMap;

use crate::errors::Error;
use crate::order::ByteOrder;
use crate::packed::Scalar;

/// Loop control for [Section::repeat] element definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Break,
}

/// One section of a schema: the declaration operations.
///
/// Field names are opaque keys, unique within their section except that a
/// name marked with [Section::array] is declared repeatedly on purpose.
/// Declarations execute in a single left-to-right pass; bytes are never
/// re-read.
pub trait Section {
    /// Byte order currently in effect for this section.
    fn byte_order(&self) -> ByteOrder;

    /// Sets the byte order for subsequent declarations in this section and
    /// any child sections entered afterwards.
    fn set_byte_order(&mut self, order: ByteOrder);

    /// A raw span of exactly `size` bytes. A size of 0 yields an empty span.
    fn bytes(&mut self, name: &str, size: usize) -> Result<Vec<u8>, Error>;

    /// A raw span covering everything to the end of the input when reading
    /// (cross-checked against a pending [Section::count] length, like
    /// [Section::bytes]); the stored span verbatim, with no length check,
    /// when writing.
    fn rest(&mut self, name: &str) -> Result<Vec<u8>, Error>;

    /// An unsigned integer of `size` bytes at the current byte order.
    fn uint(&mut self, name: &str, size: usize) -> Result<u64, Error> {
        self.uint_with_order(name, size, self.byte_order())
    }

    /// An unsigned integer of `size` bytes at an explicit byte order. The
    /// override applies to this field only.
    fn uint_with_order(
        &mut self,
        name: &str,
        size: usize,
        order: ByteOrder,
    ) -> Result<u64, Error>;

    /// A signed two's complement integer of `size` bytes at the current
    /// byte order.
    fn int(&mut self, name: &str, size: usize) -> Result<i64, Error> {
        self.int_with_order(name, size, self.byte_order())
    }

    /// A signed integer of `size` bytes at an explicit byte order. The
    /// override applies to this field only.
    fn int_with_order(&mut self, name: &str, size: usize, order: ByteOrder)
    -> Result<i64, Error>;

    /// A fixed-format record (see [crate::packed]) stored as one slot.
    /// Without a byte order mark the format uses this section's current
    /// order.
    fn packed(&mut self, name: &str, format: &str) -> Result<Vec<Scalar>, Error>;

    /// A nested section described by its own definition. The child inherits
    /// the byte order in effect here and may override it without affecting
    /// this section once it returns.
    fn section<F>(&mut self, name: &str, def: F) -> Result<(), Error>
    where
        F: FnMut(&mut Self) -> Result<(), Error>,
        Self: Sized;

    /// Marks `name` as a repeating field. Must be called before the first
    /// looped declaration of `name`; idempotent per container.
    fn array(&mut self, name: &str) -> Result<(), Error>;

    /// Reads section elements into the array `name` until the input is
    /// exhausted, or writes its existing elements in order, stopping early
    /// when `def` returns [Flow::Break].
    fn repeat<F>(&mut self, name: &str, def: F) -> Result<(), Error>
    where
        F: FnMut(&mut Self) -> Result<Flow, Error>,
        Self: Sized;

    /// A count field coupled to the length of `sized_name`: decoded and
    /// remembered on read, recomputed from the sized value and stored back
    /// on write. Returns the count so schema code can bound a loop.
    fn count(&mut self, count_name: &str, sized_name: &str, size: usize) -> Result<usize, Error> {
        self.count_with_order(count_name, sized_name, size, self.byte_order())
    }

    /// [Section::count] at an explicit byte order.
    fn count_with_order(
        &mut self,
        count_name: &str,
        sized_name: &str,
        size: usize,
        order: ByteOrder,
    ) -> Result<usize, Error>;

    /// An anonymous span of `size` bytes, captured under the reserved
    /// `__skipped` sequence when reading. Writing replays the captured
    /// span, or zero-fills when nothing was captured.
    fn skip(&mut self, size: usize) -> Result<(), Error>;
}

/// Per-execution state shared by both executors: byte order, array cursors
/// and the qualified name path, saved and restored around child sections.
#[derive(Debug, Default)]
pub(crate) struct Scope {
    pub order: ByteOrder,
    /// Qualified name path of the section being executed.
    pub path: Vec<String>,
    /// Array cursors: name to next element index.
    pub cursors: BTreeMap<String, usize>,
    /// Lengths remembered by count declarations, keyed by sized field name.
    pub pending: BTreeMap<String, usize>,
    /// Index of the next `__skipped` element to replay.
    pub skipped: usize,
}

impl Scope {
    pub fn qualify(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.path.join("."), name)
        }
    }

    /// Descends into a child section, resetting the state the child must
    /// not share with its parent.
    pub fn enter(&mut self, label: String) -> SavedScope {
        self.path.push(label);
        SavedScope {
            order: self.order,
            cursors: std::mem::take(&mut self.cursors),
            pending: std::mem::take(&mut self.pending),
            skipped: std::mem::replace(&mut self.skipped, 0),
        }
    }

    /// Returns to the parent section, restoring its state.
    pub fn leave(&mut self, saved: SavedScope) {
        self.path.pop();
        self.order = saved.order;
        self.cursors = saved.cursors;
        self.pending = saved.pending;
        self.skipped = saved.skipped;
    }
}

pub(crate) struct SavedScope {
    order: ByteOrder,
    cursors: BTreeMap<String, usize>,
    pending: BTreeMap<String, usize>,
    skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualify() {
        let mut scope = Scope::default();
        assert_eq!(scope.qualify("size"), "size");
        scope.path.push("chunks[2]".to_string());
        assert_eq!(scope.qualify("size"), "chunks[2].size");
    }

    #[test]
    fn test_enter_restores_on_leave() {
        let mut scope = Scope::default();
        scope.order = ByteOrder::Little;
        scope.cursors.insert("xs".to_string(), 3);
        let saved = scope.enter("child".to_string());
        assert_eq!(scope.order, ByteOrder::Little);
        assert!(scope.cursors.is_empty());
        scope.order = ByteOrder::Big;
        scope.leave(saved);
        assert_eq!(scope.order, ByteOrder::Little);
        assert_eq!(scope.cursors.get("xs"), Some(&3));
    }
}
