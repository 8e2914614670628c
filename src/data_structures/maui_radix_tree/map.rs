// Copyright (c) 2025 Maui Index Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Map-style facade over [`RadixTree`].

use std::fmt::Debug;
use std::hash::Hash;

use tracing::{debug, warn};

use super::error::{report_violation, RadixTreeError, RadixTreeResult};
use super::label::KeyBuffer;
use super::storage::{MultiValue, SingleValue, ValueStorage, ValueStorageKind};
use super::tree::{RadixTree, TreeConfig};
use super::visitor::TreeVisitor;
use crate::config::{get_global_config, TreeSettings};

/// Builds the stored form of `key`: its characters followed by `marker`.
pub(crate) fn normalized_key(key: &str, marker: char) -> RadixTreeResult<KeyBuffer> {
    reject_marker(key, marker)?;
    Ok(KeyBuffer::terminated(key, marker))
}

/// Characters of a search prefix, which must not contain `marker`.
pub(crate) fn query_chars(prefix: &str, marker: char) -> RadixTreeResult<Vec<char>> {
    reject_marker(prefix, marker)?;
    Ok(prefix.chars().collect())
}

fn reject_marker(key: &str, marker: char) -> RadixTreeResult<()> {
    if key.contains(marker) {
        return Err(RadixTreeError::ReservedCharacter {
            key: key.to_string(),
            marker,
        });
    }
    Ok(())
}

/// Tree settings from the global configuration, or the defaults when it has
/// not been initialized.
pub(crate) fn global_tree_settings() -> TreeSettings {
    match get_global_config() {
        Ok(global) => global.get().tree.clone(),
        Err(err) => {
            warn!(error = %err, "using default tree settings");
            TreeSettings::default()
        }
    }
}

/// Prefix index from string keys to values.
///
/// Keys are stored with the terminal marker appended, so a key that is a
/// prefix of another stays distinguishable. Keys may not contain the marker
/// themselves.
///
/// # Example
///
/// ```
/// use maui_index_lib::data_structures::maui_radix_tree::RadixTreeMap;
///
/// let mut map = RadixTreeMap::new();
/// map.insert("cat", 1).unwrap();
/// map.insert("car", 2).unwrap();
/// map.insert("cart", 3).unwrap();
///
/// let mut found = map.search("car", None).unwrap();
/// found.sort();
/// assert_eq!(found, vec![2, 3]);
/// assert_eq!(map.get("car").unwrap(), vec![2]);
/// ```
#[derive(Debug)]
pub struct RadixTreeMap<V, S: ValueStorage<V> = SingleValue> {
    tree: RadixTree<V, S>,
}

impl<V: PartialEq + Clone> RadixTreeMap<V, SingleValue> {
    /// Creates a map holding one value per key.
    pub fn new() -> Self {
        Self::with_config(TreeConfig::new(SingleValue))
    }
}

impl<V: PartialEq + Clone> Default for RadixTreeMap<V, SingleValue> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Hash + Eq + Clone> RadixTreeMap<V, MultiValue> {
    /// Creates a map holding a set of values per key.
    pub fn multi_valued() -> Self {
        Self::with_config(TreeConfig::new(MultiValue))
    }
}

impl<V: Hash + Eq + Clone> RadixTreeMap<V, ValueStorageKind> {
    /// Creates a map configured by `settings`.
    pub fn from_settings(settings: &TreeSettings) -> Self {
        Self::with_config(settings.tree_config())
    }

    /// Creates a map configured by the global configuration.
    pub fn from_global_config() -> Self {
        Self::from_settings(&global_tree_settings())
    }
}

impl<V, S: ValueStorage<V>> RadixTreeMap<V, S> {
    pub fn with_config(config: TreeConfig<S>) -> Self {
        Self {
            tree: RadixTree::new(config),
        }
    }

    /// The underlying tree.
    pub fn tree(&self) -> &RadixTree<V, S> {
        &self.tree
    }

    pub fn terminal_marker(&self) -> char {
        self.tree.terminal_marker()
    }

    /// Stores `value` under `key`.
    pub fn insert(&mut self, key: &str, value: V) -> RadixTreeResult<()> {
        let buffer = normalized_key(key, self.terminal_marker())?;
        debug!(key, "inserting key");
        report_violation("insert", self.tree.insert(buffer, value))
    }

    /// Values of every key starting with `prefix`, at most `limit` of them.
    ///
    /// An empty prefix matches every key.
    pub fn search(&self, prefix: &str, limit: Option<usize>) -> RadixTreeResult<Vec<V>> {
        let query = query_chars(prefix, self.terminal_marker())?;
        let values = self.tree.collect(&query, limit);
        debug!(prefix, found = values.len(), "prefix search");
        Ok(values)
    }

    /// Values stored under exactly `key`.
    pub fn get(&self, key: &str) -> RadixTreeResult<Vec<V>> {
        let buffer = normalized_key(key, self.terminal_marker())?;
        Ok(self.tree.collect(buffer.as_chars(), None))
    }

    /// Whether `key` holds at least one value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).map_or(false, |values| !values.is_empty())
    }

    /// Removes `value` from `key`, returning it if it was stored.
    pub fn remove(&mut self, key: &str, value: &V) -> RadixTreeResult<Option<V>> {
        let buffer = normalized_key(key, self.terminal_marker())?;
        let removed = report_violation("remove", self.tree.remove(buffer.as_chars(), value))?;
        debug!(key, removed = removed.is_some(), "removing value");
        Ok(removed)
    }

    /// Walks every node of the tree.
    ///
    /// Returns `false` if the visitor stopped the walk.
    pub fn visit_all<Vis: TreeVisitor<V, S>>(&self, visitor: &mut Vis) -> bool {
        self.tree.visit(visitor)
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Number of stored keys.
    pub fn key_count(&self) -> usize {
        self.tree.key_count()
    }

    /// Number of stored values across all keys.
    pub fn value_count(&self) -> usize {
        self.tree.value_count()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Audits the tree structure, reporting any violation.
    pub fn check_invariants(&self) -> RadixTreeResult<()> {
        report_violation("check_invariants", self.tree.check_invariants())
    }

    /// Indented rendering of the tree.
    pub fn debug_dump(&self) -> String
    where
        V: Debug,
    {
        self.tree.debug_dump()
    }
}
