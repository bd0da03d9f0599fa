//! String interner for identifiers.
//!
//! Checking is single-threaded, but the interner is shared between the
//! declaration environment, the expression arena and the type formatter, so
//! it interns through `&self` behind a lock and is handed around as an `Arc`.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// More than `u32::MAX` strings were interned.
    Overflow { count: usize },
}

impl std::fmt::Display for InternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternError::Overflow { count } => {
                write!(f, "interner exceeded capacity: {count} strings")
            }
        }
    }
}

impl std::error::Error for InternError {}

#[derive(Default)]
struct Storage {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

/// Interner mapping strings to [`Name`] handles.
pub struct StringInterner {
    storage: RwLock<Storage>,
}

/// Interner shared between the components of one checking session.
pub type SharedInterner = Arc<StringInterner>;

impl StringInterner {
    /// Create a new interner with the empty string pre-interned as `Name::EMPTY`.
    pub fn new() -> Self {
        let mut storage = Storage::default();
        storage.map.insert("", 0);
        storage.strings.push("");
        StringInterner {
            storage: RwLock::new(storage),
        }
    }

    /// Create a new interner already wrapped for sharing.
    pub fn shared() -> SharedInterner {
        Arc::new(Self::new())
    }

    /// Try to intern a string, returning an error on overflow.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        if let Some(&index) = self.storage.read().map.get(s) {
            return Ok(Name::from_raw(index));
        }

        let mut guard = self.storage.write();
        if let Some(&index) = guard.map.get(s) {
            return Ok(Name::from_raw(index));
        }

        let index = u32::try_from(guard.strings.len()).map_err(|_| InternError::Overflow {
            count: guard.strings.len(),
        })?;
        // Leak the string to get 'static lifetime; interned names live for the session.
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        guard.strings.push(leaked);
        guard.map.insert(leaked, index);
        Ok(Name::from_raw(index))
    }

    /// Intern a string.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` strings were interned.
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Look up the string for a name.
    ///
    /// Unknown names resolve to the empty string.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.storage
            .read()
            .strings
            .get(name.raw() as usize)
            .copied()
            .unwrap_or("")
    }

    /// Number of interned strings (including the empty string).
    pub fn len(&self) -> usize {
        self.storage.read().strings.len()
    }

    /// Always false: the empty string is pre-interned.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
