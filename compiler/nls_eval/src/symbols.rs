//! Global bindings.
//!
//! A fixed array of [`HASH_WIDTH`] buckets selected by the identifier's
//! cached checksum. Each bucket keeps its entries newest-last in a `Vec` and
//! is searched newest-first. Keys are unique across the table: adding an
//! existing key replaces its entry.

use nls_ir::{Heap, Ident, NodeId, HASH_WIDTH};

use crate::errors::{no_such_entry, EvalResult};

struct Entry {
    key: Ident,
    value: NodeId,
}

/// Position of an entry: bucket index and slot within the bucket.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EntryPos {
    pub bucket: usize,
    pub slot: usize,
}

pub struct SymbolTable {
    buckets: Vec<Vec<Entry>>,
    len: usize,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            buckets: (0..HASH_WIDTH).map(|_| Vec::new()).collect(),
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bind `key` to `value`, grabbing `value`.
    ///
    /// A previous binding of `key` is released and replaced.
    pub fn add(&mut self, heap: &mut Heap, key: Ident, value: NodeId) {
        heap.grab(value);
        let bucket = key.bucket();
        if let Some(pos) = self.find(&key) {
            let old = self.buckets[pos.bucket].remove(pos.slot);
            tracing::debug!(key = %key, "symbol rebound");
            heap.release(old.value);
        } else {
            self.len += 1;
        }
        self.buckets[bucket].push(Entry { key, value });
    }

    /// Value bound to `key`.
    pub fn search(&self, key: &Ident) -> Option<NodeId> {
        self.find(key)
            .map(|pos| self.buckets[pos.bucket][pos.slot].value)
    }

    /// Position of the entry for `key`, newest first.
    pub fn find(&self, key: &Ident) -> Option<EntryPos> {
        let bucket = key.bucket();
        self.buckets[bucket]
            .iter()
            .rposition(|entry| entry.key == *key)
            .map(|slot| EntryPos { bucket, slot })
    }

    /// Unbind `key`, releasing its value.
    pub fn remove(&mut self, heap: &mut Heap, key: &Ident) -> EvalResult {
        let Some(pos) = self.find(key) else {
            return Err(no_such_entry(key.as_str()));
        };
        let entry = self.buckets[pos.bucket].remove(pos.slot);
        self.len -= 1;
        tracing::debug!(key = %key, "symbol removed");
        heap.release(entry.value);
        Ok(())
    }

    /// Keys in bucket order, newest first within a bucket.
    pub fn keys(&self) -> impl Iterator<Item = &Ident> {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.iter().rev().map(|entry| &entry.key))
    }

    /// Release every binding.
    pub fn clear(&mut self, heap: &mut Heap) {
        for bucket in &mut self.buckets {
            for entry in bucket.drain(..).rev() {
                heap.release(entry.value);
            }
        }
        self.len = 0;
    }
}
