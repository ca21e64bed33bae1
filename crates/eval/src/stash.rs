//! Append-only value arena.
//!
//! Two stashes exist per evaluation path: the compile stash owned by
//! the function (constants referenced from instruction immediates) and
//! the eval stash inside the context (temporaries of one evaluation).
//! Values are addressed by index, so growth never invalidates earlier
//! entries and clearing is a bulk truncation that keeps capacity.

use rex_foundation::Value;

/// Growable arena of values addressed by insertion index.
#[derive(Debug, Default)]
pub struct Stash {
    values: Vec<Value>,
}

impl Stash {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Append a value, returning its index. Indices stay valid until
    /// [`Stash::clear`].
    pub fn put(&mut self, value: Value) -> u32 {
        let index = self.values.len() as u32;
        self.values.push(value);
        index
    }

    /// Look up a value by index.
    ///
    /// # Panics
    ///
    /// Panics when the index does not refer to a live entry; that is a
    /// VM bug, not a recoverable condition.
    pub fn get(&self, index: u32) -> &Value {
        &self.values[index as usize]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drop all contents, retaining capacity for the next evaluation.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}
