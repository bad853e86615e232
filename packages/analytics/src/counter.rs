//! Insertion-ordered frequency counter.

use std::collections::HashMap;
use std::hash::Hash;

/// Counts occurrences of keys, remembering the order in which each key was
/// first seen.
///
/// Category vocabularies are open, so keys are counted as they arrive
/// rather than against a closed set. Iteration and [`Self::most_common`]
/// tie-breaks follow first-seen order, never hash order.
#[derive(Debug, Clone)]
pub struct FirstSeenCounter<K> {
    entries: Vec<(K, u64)>,
    index: HashMap<K, usize>,
}

impl<K> Default for FirstSeenCounter<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> FirstSeenCounter<K> {
    /// Creates an empty counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the count for `key`.
    pub fn add(&mut self, key: K) {
        if let Some(&i) = self.index.get(&key) {
            self.entries[i].1 += 1;
        } else {
            self.index.insert(key.clone(), self.entries.len());
            self.entries.push((key, 1));
        }
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The key with the highest count. Ties go to the key seen first.
    #[must_use]
    pub fn most_common(&self) -> Option<&K> {
        let mut best: Option<&(K, u64)> = None;
        for entry in &self.entries {
            if best.is_none_or(|b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(key, _)| key)
    }

    /// Keys and counts in first-seen order.
    #[must_use]
    pub fn into_entries(self) -> Vec<(K, u64)> {
        self.entries
    }
}

impl<K: Eq + Hash + Clone> FromIterator<K> for FirstSeenCounter<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut counter = Self::new();
        for key in iter {
            counter.add(key);
        }
        counter
    }
}
