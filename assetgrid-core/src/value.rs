//! Schema-less values produced by the response decoder.
//!
//! A decoded document is a [`Mapping`] from element names to [`Value`]s. The
//! shape depends entirely on the input: a leaf becomes text, a single child
//! collapses into a nested mapping, and repeated children stay an ordered
//! list of mappings.

use std::slice;

/// A decoded element value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// An element with neither children nor text.
    #[default]
    Null,
    /// The text content of a leaf element.
    Text(String),
    /// A single child, or several children with distinct names.
    Map(Mapping),
    /// Several children that could not be merged into one mapping.
    List(Vec<Mapping>),
}

impl Value {
    /// Return the text of a leaf value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Return the nested mapping, if this value is one.
    #[must_use]
    pub const fn as_map(&self) -> Option<&Mapping> {
        match self {
            Self::Map(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// Return the list entries, if this value is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Mapping]> {
        match self {
            Self::List(entries) => Some(entries),
            _ => None,
        }
    }

    /// Whether this is [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Follow a chain of keys through nested mappings.
    ///
    /// Returns `None` as soon as a key is missing or an intermediate value is
    /// not a mapping.
    ///
    /// # Examples
    /// ```
    /// use assetgrid_core::{Mapping, Value};
    ///
    /// let inner = Mapping::from_iter([("b".to_owned(), Value::Text("x".to_owned()))]);
    /// let outer = Value::Map(Mapping::from_iter([("a".to_owned(), Value::Map(inner))]));
    /// assert_eq!(outer.path(&["a", "b"]).and_then(Value::as_text), Some("x"));
    /// assert!(outer.path(&["a", "c"]).is_none());
    /// ```
    #[must_use]
    pub fn path(&self, keys: &[&str]) -> Option<&Self> {
        keys.iter()
            .try_fold(self, |value, key| value.as_map()?.get(key))
    }
}

/// An insertion-ordered map from element or attribute names to values.
///
/// Keys are unique; inserting an existing key replaces its value in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mapping {
    entries: Vec<(String, Value)>,
}

impl Mapping {
    /// Create an empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find_map(|(name, value)| (name == key).then_some(value))
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert a value, returning the previous value for `key` if any.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.entries.iter_mut().find(|(name, _)| *name == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(name, _)| name == key)?;
        Some(self.entries.remove(index).1)
    }

    /// The first entry in insertion order.
    ///
    /// For a decoded element this is always the element's own name.
    #[must_use]
    pub fn first(&self) -> Option<(&str, &Value)> {
        self.entries
            .first()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

/// Borrowing iterator over a [`Mapping`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: slice::Iter<'a, (String, Value)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(name, value)| (name.as_str(), value))
    }
}

impl<'a> IntoIterator for &'a Mapping {
    type Item = (&'a str, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Mapping {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, Value)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        mapping.extend(iter);
        mapping
    }
}

impl Extend<(String, Value)> for Mapping {
    fn extend<I: IntoIterator<Item = (String, Value)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

#[cfg(feature = "serde")]
impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Text(text) => Self::String(text.clone()),
            Value::Map(mapping) => Self::Object(mapping.into()),
            Value::List(entries) => {
                Self::Array(entries.iter().map(|entry| Self::Object(entry.into())).collect())
            }
        }
    }
}

#[cfg(feature = "serde")]
impl From<&Mapping> for serde_json::Map<String, serde_json::Value> {
    fn from(mapping: &Mapping) -> Self {
        mapping
            .iter()
            .map(|(key, value)| (key.to_owned(), serde_json::Value::from(value)))
            .collect()
    }
}
