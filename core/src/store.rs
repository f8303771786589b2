//! Single-valued key/value stores for headers and query parameters.
//!
//! # Design
//! `KeyValueStore` is one ordered map parameterized by a `KeyPolicy` that
//! decides how names are normalized before storage and lookup. `Headers`
//! lowercases names so lookups are case-insensitive; `Query` keeps names
//! verbatim. An empty store is just `Default`, so a default `Request` or
//! `Response` can be read from and written to without any setup.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::marker::PhantomData;

/// How a store normalizes names.
pub trait KeyPolicy {
    fn normalize(name: &str) -> String;
}

/// Lowercases names: `Content-Type` and `content-type` are the same key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseInsensitive;

impl KeyPolicy for CaseInsensitive {
    fn normalize(name: &str) -> String {
        name.to_lowercase()
    }
}

/// Stores names exactly as given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verbatim;

impl KeyPolicy for Verbatim {
    fn normalize(name: &str) -> String {
        name.to_string()
    }
}

/// An ordered map from normalized name to a single value.
///
/// Setting a name that already exists overwrites its value; there is no
/// multi-value support.
pub struct KeyValueStore<P> {
    entries: BTreeMap<String, String>,
    policy: PhantomData<P>,
}

/// Header names, compared case-insensitively and stored lowercased.
pub type Headers = KeyValueStore<CaseInsensitive>;

/// Query parameters, compared and stored exactly.
pub type Query = KeyValueStore<Verbatim>;

impl<P: KeyPolicy> KeyValueStore<P> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            policy: PhantomData,
        }
    }

    /// Look up `name` after normalizing it.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&P::normalize(name)).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&P::normalize(name))
    }

    /// Store `value` under the normalized `name`, returning the value it
    /// replaced.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(P::normalize(name.as_ref()), value.into())
    }

    /// Remove `name` if present, returning its value.
    pub fn delete(&mut self, name: &str) -> Option<String> {
        self.entries.remove(&P::normalize(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in ascending order of stored name.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }
}

// Manual impls so `P` needs no bounds of its own.

impl<P: KeyPolicy> Default for KeyValueStore<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for KeyValueStore<P> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            policy: PhantomData,
        }
    }
}

impl<P> PartialEq for KeyValueStore<P> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<P> Eq for KeyValueStore<P> {}

impl<P> fmt::Debug for KeyValueStore<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<P: KeyPolicy, K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for KeyValueStore<P> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}

impl<P: KeyPolicy, K: AsRef<str>, V: Into<String>> Extend<(K, V)> for KeyValueStore<P> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.set(name, value);
        }
    }
}

/// Borrowing iterator over a store's entries.
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, String, String>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, P: KeyPolicy> IntoIterator for &'a KeyValueStore<P> {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
