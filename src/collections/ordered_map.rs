// Copyright 2023 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! The [`OrderedMap`] structure.

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::ops::ControlFlow;
use std::slice;

/// A key-value map that keeps its keys sorted under a comparator
/// supplied at construction.
///
/// The entries are kept in a dense [`Vec`], sorted by key, with each
/// value stored beside its key. Lookups binary-search the entries, so
/// they take logarithmic time; insertions and removals must shift the
/// entries that follow, so they take linear time. Traversal in
/// comparator order is a simple walk over the entries. This suits
/// tables that are small and rarely change compared to how often they
/// are searched, such as tables of subnets.
///
/// Keys are identified only through the comparator: two keys are the
/// same key exactly when the comparator says they are equal, whatever
/// their [`PartialEq`] implementation says. The comparator must be a
/// total order and must give the same answer every time it is asked
/// about the same pair of keys. If it does not, the map's ordering is
/// unspecified (but every key still has exactly one value).
pub struct OrderedMap<K, V, C = fn(&K, &K) -> Ordering> {
    entries: Vec<(K, V)>,
    cmp: C,
}

impl<K, V, C> OrderedMap<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    /// Creates a new, initially empty `OrderedMap` that sorts its keys
    /// with `cmp`.
    pub fn new(cmp: C) -> Self {
        Self {
            entries: Vec::new(),
            cmp,
        }
    }

    /// Binary-searches the sorted entries for `key`. The result has the
    /// same meaning as that of `binary_search_by` on slices.
    fn search(&self, key: &K) -> Result<usize, usize> {
        self.entries.binary_search_by(|(k, _)| (self.cmp)(k, key))
    }

    /// Associates `value` with `key`.
    ///
    /// If a key comparing equal to `key` is already present, both the
    /// stored key and its value are replaced. (The stored key is
    /// replaced because a comparator may consider two keys equal even
    /// though they are represented differently.) Otherwise, `key` is
    /// inserted at its sorted position.
    pub fn set(&mut self, key: K, value: V) {
        match self.search(&key) {
            Ok(i) => self.entries[i] = (key, value),
            Err(i) => self.entries.insert(i, (key, value)),
        }
    }

    /// Removes `key` and its value from the map, returning the value.
    /// Removing a key that is not present does nothing.
    pub fn delete(&mut self, key: &K) -> Option<V> {
        let i = self.search(key).ok()?;
        Some(self.entries.remove(i).1)
    }

    /// Returns the value associated with `key`, if any.
    pub fn get(&self, key: &K) -> Option<&V> {
        let i = self.search(key).ok()?;
        Some(&self.entries[i].1)
    }

    /// Returns whether a key comparing equal to `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.search(key).is_ok()
    }

    /// Calls `visit` with each key and value in ascending comparator
    /// order, stopping early if `visit` returns [`ControlFlow::Break`].
    pub fn range<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V) -> ControlFlow<()>,
    {
        for (key, value) in self.iter() {
            if visit(key, value).is_break() {
                return;
            }
        }
    }

    /// Returns an iterator over the keys and values in ascending
    /// comparator order.
    pub fn iter(&self) -> Iter<K, V> {
        Iter {
            entries: self.entries.iter(),
        }
    }

    /// Removes every entry from the map. The comparator is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V, C> fmt::Debug for OrderedMap<K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
    C: Fn(&K, &K) -> Ordering,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, C> IntoIterator for &'a OrderedMap<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

////////////////////////////////////////////////////////////////////////
// ITERATOR                                                           //
////////////////////////////////////////////////////////////////////////

/// An iterator over the entries of an [`OrderedMap`], in ascending
/// comparator order.
pub struct Iter<'a, K, V> {
    entries: slice::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
