//! Ordered list fields and recursive disposal

use crate::BindingError;
use serde::{Deserialize, Serialize};
use std::slice;

/// Releases everything a structure owns, leaving it empty and reusable
///
/// Disposing an already disposed structure does nothing.
pub trait Dispose {
    fn dispose(&mut self);
}

impl<T> Dispose for Option<T> {
    fn dispose(&mut self) {
        *self = None;
    }
}

/// Insertion-ordered list of entries owned by their parent container
///
/// Entries are not indexed by key; uniqueness of schema keys is the
/// datastore's business. The list owns its entries by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderedList<T> {
    entries: Vec<T>,
}

impl<T> OrderedList<T> {
    /// Creates an empty list
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an entry at the end, returning it for further filling
    pub fn append(&mut self, entry: T) -> &mut T {
        self.entries.push(entry);
        let last = self.entries.len() - 1;
        &mut self.entries[last]
    }

    /// Appends an entry, reporting allocation failure instead of aborting
    ///
    /// On failure the list is unchanged and `entry` is dropped.
    pub fn try_append(&mut self, entry: T) -> Result<&mut T, BindingError> {
        self.entries.try_reserve(1)?;
        Ok(self.append(entry))
    }

    /// Returns the entry at `index`
    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    /// Returns the entry at `index` mutably
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index)
    }

    /// Removes and returns the entry at `index`, keeping the order of the rest
    pub fn remove(&mut self, index: usize) -> Option<T> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Iterates entries in insertion order
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// Iterates entries mutably in insertion order
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.entries.iter_mut()
    }

    /// Returns the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry and everything the entries own
    pub fn clear(&mut self) {
        self.entries = Vec::new();
    }
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Dispose for OrderedList<T> {
    fn dispose(&mut self) {
        self.clear();
    }
}

impl<T> FromIterator<T> for OrderedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a OrderedList<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> IntoIterator for OrderedList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::XmlString;

    fn xml(s: &str) -> XmlString {
        XmlString::new(s).unwrap()
    }

    #[test]
    fn test_append_preserves_order() {
        let mut list = OrderedList::new();
        list.append(xml("c"));
        list.append(xml("a"));
        list.append(xml("b"));

        let order: Vec<&str> = list.iter().map(XmlString::as_str).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_append_returns_entry_for_filling() {
        let mut list: OrderedList<Option<XmlString>> = OrderedList::new();
        let entry = list.append(None);
        *entry = Some(xml("filled"));
        assert_eq!(list.get(0), Some(&Some(xml("filled"))));
    }

    #[test]
    fn test_try_append() {
        let mut list = OrderedList::new();
        list.try_append(1u32).unwrap();
        list.try_append(2u32).unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_append_then_dispose_twice() {
        let mut list = OrderedList::new();
        list.append(xml("one"));
        list.dispose();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);

        list.dispose();
        assert!(list.is_empty());

        // Still usable after disposal.
        list.append(xml("two"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut list: OrderedList<u8> = (1..=4).collect();
        assert_eq!(list.remove(1), Some(2));
        assert_eq!(list.remove(10), None);
        assert_eq!(list.into_iter().collect::<Vec<_>>(), vec![1, 3, 4]);
    }

    #[test]
    fn test_option_dispose() {
        let mut leaf = Some(xml("x"));
        leaf.dispose();
        assert!(leaf.is_none());
        leaf.dispose();
        assert!(leaf.is_none());
    }

    #[test]
    fn test_serializes_as_array() {
        let list: OrderedList<XmlString> = vec![xml("a"), xml("b")].into_iter().collect();
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["a","b"]"#);
        let back: OrderedList<XmlString> = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(back, list);
    }
}
