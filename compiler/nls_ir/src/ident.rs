//! Reference-counted identifier strings.
//!
//! Identifiers name variables, built-ins and symbol-table keys. Each one
//! caches its byte length and an additive checksum that doubles as the
//! symbol-table bucket selector. Copies share one buffer through `Rc`: cloning
//! an [`Ident`] is a grab, dropping it is a release.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Modulus of the identifier checksum, and the symbol table's bucket count.
pub const HASH_WIDTH: usize = 251;

struct IdentData {
    len: usize,
    hash: usize,
    text: Box<str>,
}

/// Immutable, shared identifier.
#[derive(Clone)]
pub struct Ident(Rc<IdentData>);

impl Ident {
    /// Copy `text` into a new identifier, computing its length and checksum
    /// in one pass.
    pub fn new(text: &str) -> Self {
        let (len, hash) = checksum(text.as_bytes());
        Ident(Rc::new(IdentData {
            len,
            hash,
            text: text.into(),
        }))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0.text
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.len == 0
    }

    /// Cached checksum, always below [`HASH_WIDTH`].
    #[inline]
    pub fn bucket(&self) -> usize {
        self.0.hash
    }

    /// Number of live handles sharing this identifier's buffer.
    #[inline]
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Key comparison: checksum first, then length, then bytes.
    ///
    /// The order is consistent but not alphabetical.
    pub fn compare(&self, other: &Ident) -> Ordering {
        if Rc::ptr_eq(&self.0, &other.0) {
            return Ordering::Equal;
        }
        self.0
            .hash
            .cmp(&other.0.hash)
            .then(self.0.len.cmp(&other.0.len))
            .then_with(|| self.0.text.as_bytes().cmp(other.0.text.as_bytes()))
    }
}

/// Length and additive checksum of `bytes`.
pub(crate) fn checksum(bytes: &[u8]) -> (usize, usize) {
    let hash = bytes
        .iter()
        .fold(0, |hash, &byte| (hash + usize::from(byte)) % HASH_WIDTH);
    (bytes.len(), hash)
}

impl PartialEq for Ident {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Ident {}

impl PartialOrd for Ident {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl Ord for Ident {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Hash for Ident {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.text.hash(state);
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.text)
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ident({:?}, bucket={})", &*self.0.text, self.0.hash)
    }
}
