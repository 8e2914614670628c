// Copyright (c) 2025 Maui Index Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Substring index built by storing every suffix of each key.
//!
//! A key of `n` characters is inserted as its `n` suffixes, all sharing the
//! one normalized key buffer and bound to the same value. A prefix search on
//! that tree finds every key containing the query as a substring.
//!
//! With [`SingleValue`] storage, two keys that end in the same suffix compete
//! for it and the later insert wins that suffix. Use [`MultiValue`] when keys
//! overlap.

use std::fmt::Debug;
use std::hash::Hash;

use tracing::debug;

use super::error::{report_violation, RadixTreeResult};
use super::map::{global_tree_settings, normalized_key, query_chars};
use super::storage::{MultiValue, SingleValue, ValueStorage, ValueStorageKind};
use super::tree::{RadixTree, TreeConfig};
use super::visitor::{CollectValues, DistinctValues, TreeVisitor};
use crate::config::TreeSettings;

/// Substring index from string keys to values.
///
/// # Example
///
/// ```
/// use maui_index_lib::data_structures::maui_radix_tree::SuffixTreeMap;
///
/// let mut index = SuffixTreeMap::multi_valued();
/// index.insert("banana", 1).unwrap();
/// index.insert("bandana", 2).unwrap();
///
/// let mut found = index.search("ana", None).unwrap();
/// found.sort();
/// assert_eq!(found, vec![1, 2]);
/// assert!(index.search("xyz", None).unwrap().is_empty());
/// ```
#[derive(Debug)]
pub struct SuffixTreeMap<V, S: ValueStorage<V> = SingleValue> {
    tree: RadixTree<V, S>,
}

impl<V: Hash + Eq + Clone> SuffixTreeMap<V, SingleValue> {
    pub fn new() -> Self {
        Self::with_config(TreeConfig::new(SingleValue))
    }
}

impl<V: Hash + Eq + Clone> Default for SuffixTreeMap<V, SingleValue> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Hash + Eq + Clone> SuffixTreeMap<V, MultiValue> {
    pub fn multi_valued() -> Self {
        Self::with_config(TreeConfig::new(MultiValue))
    }
}

impl<V: Hash + Eq + Clone> SuffixTreeMap<V, ValueStorageKind> {
    pub fn from_settings(settings: &TreeSettings) -> Self {
        Self::with_config(settings.tree_config())
    }

    pub fn from_global_config() -> Self {
        Self::from_settings(&global_tree_settings())
    }
}

impl<V, S> SuffixTreeMap<V, S>
where
    V: Hash + Eq + Clone,
    S: ValueStorage<V>,
{
    pub fn with_config(config: TreeConfig<S>) -> Self {
        Self {
            tree: RadixTree::new(config),
        }
    }

    pub fn tree(&self) -> &RadixTree<V, S> {
        &self.tree
    }

    pub fn terminal_marker(&self) -> char {
        self.tree.terminal_marker()
    }

    /// Stores `value` under every suffix of `key`.
    ///
    /// The empty key is stored as the bare terminal marker. Length and arena
    /// capacity are checked for all suffixes up front, so a rejected key
    /// leaves no suffix behind. Only an invariant violation, which means the
    /// tree was already corrupt, can stop the insert part way through.
    pub fn insert(&mut self, key: &str, value: V) -> RadixTreeResult<()> {
        let buffer = normalized_key(key, self.terminal_marker())?;
        let suffixes = (buffer.len() - 1).max(1);
        self.tree.check_key(buffer.as_chars())?;
        // Each suffix adds at most a branch and a leaf
        self.tree.ensure_capacity(suffixes.saturating_mul(2))?;
        debug!(key, suffixes, "inserting key suffixes");
        for start in 0..suffixes {
            report_violation(
                "insert",
                self.tree.insert_from(buffer.clone(), start, value.clone()),
            )?;
        }
        Ok(())
    }

    /// Values of every key containing `substring`, each reported once.
    ///
    /// `limit` bounds the number of distinct values returned.
    pub fn search(&self, substring: &str, limit: Option<usize>) -> RadixTreeResult<Vec<V>> {
        let query = query_chars(substring, self.terminal_marker())?;
        let mut distinct = DistinctValues::new();
        self.tree
            .search(&query, &mut CollectValues::new(&mut distinct, limit));
        let values = distinct.into_vec();
        debug!(substring, found = values.len(), "substring search");
        Ok(values)
    }

    /// Whether any stored key contains `substring`.
    pub fn contains(&self, substring: &str) -> bool {
        self.search(substring, Some(1))
            .map_or(false, |values| !values.is_empty())
    }

    /// Removes `value` from every suffix of `key`.
    ///
    /// A suffix shared with another key bound to the same value loses that
    /// value too. Returns the removed value if any suffix held it.
    pub fn remove(&mut self, key: &str, value: &V) -> RadixTreeResult<Option<V>> {
        let buffer = normalized_key(key, self.terminal_marker())?;
        let chars = buffer.as_chars();
        let suffixes = (chars.len() - 1).max(1);

        let mut removed = None;
        for start in 0..suffixes {
            let result = report_violation("remove", self.tree.remove(&chars[start..], value))?;
            removed = removed.or(result);
        }
        debug!(key, removed = removed.is_some(), "removing key suffixes");
        Ok(removed)
    }

    pub fn visit_all<Vis: TreeVisitor<V, S>>(&self, visitor: &mut Vis) -> bool {
        self.tree.visit(visitor)
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Number of stored suffixes.
    pub fn suffix_count(&self) -> usize {
        self.tree.key_count()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn check_invariants(&self) -> RadixTreeResult<()> {
        report_violation("check_invariants", self.tree.check_invariants())
    }

    pub fn debug_dump(&self) -> String
    where
        V: Debug,
    {
        self.tree.debug_dump()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::maui_radix_tree::error::RadixTreeError;

    #[test]
    fn test_banana() {
        let mut index = SuffixTreeMap::new();
        index.insert("banana", 1u32).unwrap();

        assert_eq!(index.search("nan", None).unwrap(), vec![1]);
        assert_eq!(index.search("a", None).unwrap(), vec![1]);
        assert_eq!(index.search("banana", None).unwrap(), vec![1]);
        assert!(index.search("xyz", None).unwrap().is_empty());
        assert!(index.search("nab", None).unwrap().is_empty());
        assert_eq!(index.suffix_count(), 6);
        assert!(index.check_invariants().is_ok());
    }

    #[test]
    fn test_suffixes_share_one_buffer() {
        let mut index = SuffixTreeMap::new();
        index.insert("abc", 1u32).unwrap();

        let tree = index.tree();
        let arena = tree.arena();
        let labels: Vec<_> = arena.children(tree.root()).map(|id| &arena[id].label).collect();
        assert_eq!(labels.len(), 3);
        assert!(labels
            .windows(2)
            .all(|pair| pair[0].buffer().ptr_eq(pair[1].buffer())));
    }

    #[test]
    fn test_distinct_results_with_limit() {
        let mut index = SuffixTreeMap::multi_valued();
        index.insert("abab", 1u32).unwrap();
        index.insert("cab", 2).unwrap();
        index.insert("bad", 3).unwrap();

        let mut found = index.search("ab", None).unwrap();
        found.sort_unstable();
        assert_eq!(found, vec![1, 2]);

        assert_eq!(index.search("a", Some(2)).unwrap().len(), 2);
        assert_eq!(index.search("a", Some(10)).unwrap().len(), 3);
    }

    #[test]
    fn test_remove_all_suffixes() {
        let mut index = SuffixTreeMap::multi_valued();
        index.insert("banana", 1u32).unwrap();
        index.insert("ban", 2).unwrap();

        assert_eq!(index.remove("banana", &1).unwrap(), Some(1));
        assert!(index.search("nana", None).unwrap().is_empty());
        assert_eq!(index.search("an", None).unwrap(), vec![2]);
        assert!(index.check_invariants().is_ok());

        assert_eq!(index.remove("ban", &2).unwrap(), Some(2));
        assert!(index.is_empty());
        assert_eq!(index.remove("ban", &2).unwrap(), None);
    }

    #[test]
    fn test_empty_key() {
        let mut index = SuffixTreeMap::new();
        index.insert("", 5u32).unwrap();
        assert_eq!(index.suffix_count(), 1);
        assert_eq!(index.search("", None).unwrap(), vec![5]);
        assert!(index.contains(""));
        assert!(!index.contains("a"));
    }

    #[test]
    fn test_rejected_insert_leaves_no_suffixes() {
        let settings = TreeSettings {
            value_storage: ValueStorageKind::Multi,
            max_key_length: 4,
            ..TreeSettings::default()
        };
        let mut index = SuffixTreeMap::from_settings(&settings);
        index.insert("ana", 1u32).unwrap();

        assert_eq!(
            index.insert("banana", 2),
            Err(RadixTreeError::KeyTooLong { length: 7, max: 4 })
        );
        assert_eq!(index.suffix_count(), 3);
        assert_eq!(index.search("a", None).unwrap(), vec![1]);
        assert!(index.tree().ensure_capacity(2).is_ok());
        assert_eq!(
            index.tree().ensure_capacity(usize::MAX),
            Err(RadixTreeError::ArenaExhausted)
        );
    }

    #[test]
    fn test_deep_repetitive_key() {
        let mut index = SuffixTreeMap::multi_valued();
        let key = "a".repeat(10_000);
        index.insert(&key, 1u32).unwrap();
        index.insert("ab", 2).unwrap();

        // Suffixes of a run of one character nest one level per character
        assert_eq!(index.suffix_count(), 10_002);
        assert!(index.check_invariants().is_ok());
        let mut found = index.search("aaaa", None).unwrap();
        found.sort_unstable();
        assert_eq!(found, vec![1]);
        assert_eq!(index.search(&key[..5_000], Some(1)).unwrap(), vec![1]);

        assert_eq!(index.remove(&key, &1).unwrap(), Some(1));
        assert_eq!(index.suffix_count(), 2);
        assert_eq!(index.search("a", None).unwrap(), vec![2]);
        assert!(index.check_invariants().is_ok());
    }

    #[test]
    fn test_debug_format() {
        let mut index = SuffixTreeMap::new();
        index.insert("ab", 1u32).unwrap();
        let rendered = format!("{index:?}");
        assert!(rendered.starts_with("SuffixTreeMap"));
        assert!(rendered.contains("nodes: 3"));
    }

    #[test]
    fn test_reserved_marker_rejected() {
        let mut index: SuffixTreeMap<u32> = SuffixTreeMap::new();
        assert!(matches!(
            index.insert("x\u{0}", 1),
            Err(RadixTreeError::ReservedCharacter { .. })
        ));
        assert!(index.is_empty());
    }
}
