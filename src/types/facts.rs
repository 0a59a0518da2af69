use std::collections::hash_map;
use std::collections::HashMap;

use super::Value;

/// The mutable fact store shared by every rule in one firing.
///
/// Keys are unique; inserting an existing key overwrites the previous value.
/// The store never converts between value types.
#[derive(Debug, Clone, Default)]
pub struct Facts {
    data: HashMap<String, Value>,
    revision: u64,
}

impl Facts {
    /// Create an empty fact store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a fact and return the store (builder form).
    #[must_use]
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.put(name, value);
        self
    }

    /// Insert or overwrite a fact. Returns the previous value, if any.
    pub fn put(&mut self, name: &str, value: impl Into<Value>) -> Option<Value> {
        let value = value.into();
        if self.data.get(name) != Some(&value) {
            self.revision += 1;
        }
        self.data.insert(name.to_owned(), value)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Remove a fact, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let removed = self.data.remove(name);
        if removed.is_some() {
            self.revision += 1;
        }
        removed
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, Value> {
        self.data.iter()
    }

    /// Owned snapshot of every fact, for handing to external evaluators.
    #[must_use]
    pub fn as_map(&self) -> HashMap<String, Value> {
        self.data.clone()
    }

    /// Content revision. Bumped only when a write changes what is stored.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Stores are equal when they hold the same facts, whatever their revisions.
impl PartialEq for Facts {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<'a> IntoIterator for &'a Facts {
    type Item = (&'a String, &'a Value);
    type IntoIter = hash_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Facts {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut facts = Facts::new();
        for (k, v) in iter {
            let name: String = k.into();
            facts.put(&name, v);
        }
        facts
    }
}
