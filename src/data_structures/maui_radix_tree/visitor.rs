// Copyright (c) 2025 Maui Index Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Visitors driven by tree walks and searches.

use std::fmt::{Debug, Write};
use std::hash::Hash;

use hashbrown::HashSet;

use super::label::Label;
use super::node::NodeId;
use super::storage::ValueStorage;
use super::tree::RadixTree;

/// Read-only handle to one node, passed to visitors.
pub struct NodeView<'t, V, S: ValueStorage<V>> {
    tree: &'t RadixTree<V, S>,
    id: NodeId,
}

impl<'t, V, S: ValueStorage<V>> NodeView<'t, V, S> {
    pub(crate) fn new(tree: &'t RadixTree<V, S>, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> &'t Label {
        &self.tree.arena()[self.id].label
    }

    pub fn is_root(&self) -> bool {
        self.id == self.tree.root()
    }

    /// Whether this node ends a stored key.
    pub fn is_terminal(&self) -> bool {
        self.tree.arena()[self.id].is_terminal(self.tree.terminal_marker())
    }

    pub fn child_count(&self) -> usize {
        self.tree.arena().children(self.id).count()
    }

    /// Number of values stored at this node.
    pub fn value_count(&self) -> usize {
        self.tree.arena()[self.id]
            .payload
            .values()
            .map_or(0, |values| self.tree.config().storage.value_count(values))
    }

    /// Appends the values stored at this node to `sink`.
    pub fn values_into<E: Extend<V>>(&self, sink: &mut E) {
        if let Some(values) = self.tree.arena()[self.id].payload.values() {
            self.tree.config().storage.enumerate(values, sink);
        }
    }

    /// The values stored at this node.
    pub fn values(&self) -> Vec<V> {
        let mut values = Vec::new();
        self.values_into(&mut values);
        values
    }
}

/// Callback pair invoked for each node of a walk.
///
/// `visit` runs before a node's children and returns `false` to stop the
/// whole walk. `visit_complete` runs after the children, and also for every
/// node still on the path when a walk stops.
pub trait TreeVisitor<V, S: ValueStorage<V>> {
    fn visit(&mut self, node: &NodeView<'_, V, S>) -> bool;

    fn visit_complete(&mut self, _node: &NodeView<'_, V, S>) {}
}

/// Destination for collected values.
pub trait ValueCollection<V>: Extend<V> {
    /// Number of values accepted so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> ValueCollection<V> for Vec<V> {
    fn len(&self) -> usize {
        Vec::len(self)
    }
}

/// Collection that keeps only the first occurrence of each value, in order.
#[derive(Debug, Clone)]
pub struct DistinctValues<V: Hash + Eq> {
    seen: HashSet<V>,
    values: Vec<V>,
}

impl<V: Hash + Eq + Clone> DistinctValues<V> {
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
            values: Vec::new(),
        }
    }

    pub fn into_vec(self) -> Vec<V> {
        self.values
    }
}

impl<V: Hash + Eq + Clone> Default for DistinctValues<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Hash + Eq + Clone> Extend<V> for DistinctValues<V> {
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        for value in iter {
            if self.seen.insert(value.clone()) {
                self.values.push(value);
            }
        }
    }
}

impl<V: Hash + Eq + Clone> ValueCollection<V> for DistinctValues<V> {
    fn len(&self) -> usize {
        self.values.len()
    }
}

/// Forwards values to a collection until it holds `limit` of them.
struct Bounded<'c, C> {
    inner: &'c mut C,
    limit: usize,
}

impl<'c, V, C: ValueCollection<V>> Extend<V> for Bounded<'c, C> {
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        for value in iter {
            if self.inner.len() >= self.limit {
                break;
            }
            self.inner.extend(std::iter::once(value));
        }
    }
}

/// Gathers the values of every terminal node it visits.
///
/// With a limit the walk stops once the collection holds that many values.
pub struct CollectValues<'c, C> {
    sink: &'c mut C,
    limit: Option<usize>,
}

impl<'c, C> CollectValues<'c, C> {
    pub fn new(sink: &'c mut C, limit: Option<usize>) -> Self {
        Self { sink, limit }
    }
}

impl<'c, V, S, C> TreeVisitor<V, S> for CollectValues<'c, C>
where
    S: ValueStorage<V>,
    C: ValueCollection<V>,
{
    fn visit(&mut self, node: &NodeView<'_, V, S>) -> bool {
        match self.limit {
            None => {
                node.values_into(&mut *self.sink);
                true
            }
            Some(limit) => {
                if self.sink.len() >= limit {
                    return false;
                }
                node.values_into(&mut Bounded {
                    inner: &mut *self.sink,
                    limit,
                });
                self.sink.len() < limit
            }
        }
    }
}

/// Renders the visited subtree as indented text, one node per line.
///
/// The terminal marker is shown as `$` unless another glyph is chosen.
#[derive(Debug)]
pub struct TreePrinter {
    marker: char,
    glyph: char,
    depth: usize,
    output: String,
}

impl TreePrinter {
    pub fn new(marker: char) -> Self {
        Self {
            marker,
            glyph: '$',
            depth: 0,
            output: String::new(),
        }
    }

    pub fn with_marker_glyph(mut self, glyph: char) -> Self {
        self.glyph = glyph;
        self
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn into_output(self) -> String {
        self.output
    }
}

impl<V: Debug, S: ValueStorage<V>> TreeVisitor<V, S> for TreePrinter {
    fn visit(&mut self, node: &NodeView<'_, V, S>) -> bool {
        for _ in 0..self.depth {
            self.output.push_str("  ");
        }
        if node.is_root() {
            self.output.push_str("(root)");
        } else {
            for c in node.label().chars() {
                self.output
                    .push(if *c == self.marker { self.glyph } else { *c });
            }
        }
        let values = node.values();
        if !values.is_empty() {
            self.output.push_str("\tvals:");
            for value in &values {
                // Writing into a String cannot fail
                let _ = write!(self.output, " {value:?}");
            }
        }
        self.output.push('\n');
        self.depth += 1;
        true
    }

    fn visit_complete(&mut self, _node: &NodeView<'_, V, S>) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::maui_radix_tree::label::KeyBuffer;
    use crate::data_structures::maui_radix_tree::storage::SingleValue;
    use crate::data_structures::maui_radix_tree::tree::TreeConfig;

    fn tree_of(keys: &[(&str, u32)]) -> RadixTree<u32, SingleValue> {
        let mut tree = RadixTree::new(TreeConfig::new(SingleValue).with_terminal_marker('#'));
        for (key, value) in keys {
            tree.insert(KeyBuffer::terminated(key, '#'), *value).unwrap();
        }
        tree
    }

    /// Counts visits and stops after `stop_after` of them
    struct Counter {
        visited: usize,
        completed: usize,
        stop_after: usize,
    }

    impl<S: ValueStorage<u32>> TreeVisitor<u32, S> for Counter {
        fn visit(&mut self, _node: &NodeView<'_, u32, S>) -> bool {
            self.visited += 1;
            self.visited < self.stop_after
        }

        fn visit_complete(&mut self, _node: &NodeView<'_, u32, S>) {
            self.completed += 1;
        }
    }

    #[test]
    fn test_printer_layout() {
        let tree = tree_of(&[("cat", 1), ("car", 2), ("cart", 3)]);
        let mut printer = TreePrinter::new('#');
        assert!(tree.visit(&mut printer));

        let expected = "(root)\n  ca\n    r\n      $\tvals: 2\n      t$\tvals: 3\n    t$\tvals: 1\n";
        assert_eq!(printer.output(), expected);
    }

    #[test]
    fn test_visitor_can_stop_walk() {
        let tree = tree_of(&[("a", 1), ("b", 2), ("c", 3)]);
        let mut counter = Counter {
            visited: 0,
            completed: 0,
            stop_after: 2,
        };
        assert!(!tree.visit(&mut counter));
        assert_eq!(counter.visited, 2);
        // Root and the node that stopped the walk both complete
        assert_eq!(counter.completed, 2);
    }

    #[test]
    fn test_stop_below_root_completes_open_path() {
        let tree = tree_of(&[("cat", 1), ("car", 2), ("cart", 3)]);
        let mut counter = Counter {
            visited: 0,
            completed: 0,
            stop_after: 3,
        };
        // Stops at "r" under "ca"; the "t#" sibling is never entered
        assert!(!tree.visit(&mut counter));
        assert_eq!(counter.visited, 3);
        assert_eq!(counter.completed, 3);

        let mut full = Counter {
            visited: 0,
            completed: 0,
            stop_after: usize::MAX,
        };
        assert!(tree.visit(&mut full));
        assert_eq!((full.visited, full.completed), (6, 6));
    }

    #[test]
    fn test_distinct_values_keep_first_occurrence() {
        let mut values = DistinctValues::new();
        values.extend(vec![3, 1, 3, 2, 1]);
        assert_eq!(ValueCollection::<u32>::len(&values), 3);
        assert_eq!(values.into_vec(), vec![3, 1, 2]);
    }

    #[test]
    fn test_collect_respects_limit_and_distinct() {
        let tree = tree_of(&[("ab", 1), ("ac", 1), ("ad", 2), ("ae", 3)]);

        let mut distinct = DistinctValues::new();
        tree.search(&['a'], &mut CollectValues::new(&mut distinct, Some(2)));
        assert_eq!(distinct.into_vec(), vec![1, 2]);

        let mut all = Vec::new();
        tree.search(&['a'], &mut CollectValues::new(&mut all, None));
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_node_view_accessors() {
        let tree = tree_of(&[("x", 9)]);
        let root = tree.node(tree.root());
        assert!(root.is_root());
        assert!(!root.is_terminal());
        assert_eq!(root.child_count(), 1);
        assert_eq!(root.value_count(), 0);

        let leaf_id = tree.arena().first_child(tree.root()).unwrap();
        let leaf = tree.node(leaf_id);
        assert!(leaf.is_terminal());
        assert_eq!(leaf.label().to_string(), "x#");
        assert_eq!(leaf.values(), vec![9]);
    }
}
