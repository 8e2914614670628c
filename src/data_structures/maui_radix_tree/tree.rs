// Copyright (c) 2025 Maui Index Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! The radix tree core: insert with split, prefix search, delete with join.
//!
//! All keys handed to [`RadixTree`] are already normalized: they end with the
//! tree's terminal marker and contain it nowhere else. Children of every node
//! form a chain sorted by the first character of their labels, with no two
//! siblings sharing a first character, which lets scans stop as soon as they
//! pass the character they are looking for.

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use super::cursor::ChildCursor;
use super::error::{RadixTreeError, RadixTreeResult};
use super::label::{shared_prefix_len, KeyBuffer, KeyCursor, Label};
use super::node::{Node, NodeArena, NodeId, Payload};
use super::storage::ValueStorage;
use super::visitor::{CollectValues, NodeView, TreePrinter, TreeVisitor};

/// Default terminal marker. It sorts before every other character.
pub const DEFAULT_TERMINAL_MARKER: char = '\u{0}';

/// Default maximum key length, terminal marker included.
pub const DEFAULT_MAX_KEY_LENGTH: usize = 32_767;

/// Settings passed through every tree operation.
#[derive(Debug, Clone)]
pub struct TreeConfig<S> {
    /// How terminal nodes hold their values.
    pub storage: S,

    /// Reserved character closing every stored key.
    pub terminal_marker: char,

    /// Longest accepted normalized key, in characters.
    pub max_key_length: usize,
}

impl<S> TreeConfig<S> {
    /// Creates a configuration with the default marker and key length.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            terminal_marker: DEFAULT_TERMINAL_MARKER,
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
        }
    }

    /// Sets the terminal marker.
    pub fn with_terminal_marker(mut self, marker: char) -> Self {
        self.terminal_marker = marker;
        self
    }

    /// Sets the maximum normalized key length.
    pub fn with_max_key_length(mut self, max_key_length: usize) -> Self {
        self.max_key_length = max_key_length;
        self
    }
}

impl<S: Default> Default for TreeConfig<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

/// Sibling scan counters, see [`RadixTree::scan_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Children whose label was compared against a key or query.
    pub sibling_comparisons: u64,
    /// Scans cut short because the chain had passed the wanted character.
    pub early_terminations: u64,
}

#[derive(Debug, Default)]
struct ScanCounters {
    comparisons: AtomicU64,
    early_terminations: AtomicU64,
}

impl ScanCounters {
    fn compared(&self) {
        self.comparisons.fetch_add(1, Ordering::Relaxed);
    }

    fn terminated_early(&self) {
        self.early_terminations.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ScanStats {
        ScanStats {
            sibling_comparisons: self.comparisons.load(Ordering::Relaxed),
            early_terminations: self.early_terminations.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.comparisons.store(0, Ordering::Relaxed);
        self.early_terminations.store(0, Ordering::Relaxed);
    }
}

/// Compressed trie over normalized character keys.
///
/// Not synchronized: one operation at a time. Wrap it (see
/// `SharedRadixMap`) to share it between threads.
pub struct RadixTree<V, S: ValueStorage<V>> {
    arena: NodeArena<S::Payload>,
    root: NodeId,
    config: TreeConfig<S>,
    stats: ScanCounters,
    _values: PhantomData<V>,
}

impl<V, S: ValueStorage<V> + Debug> Debug for RadixTree<V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadixTree")
            .field("config", &self.config)
            .field("nodes", &self.arena.len())
            .field("free_slots", &self.arena.free_slots())
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}

/// Pending step of an iterative pre-order walk: a visited node and the next
/// child still to enter.
struct WalkFrame {
    node: NodeId,
    next_child: Option<NodeId>,
}

impl<V, S: ValueStorage<V>> RadixTree<V, S> {
    /// Creates an empty tree.
    pub fn new(config: TreeConfig<S>) -> Self {
        let (arena, root) = NodeArena::with_root(Node::new(Label::root()));
        Self {
            arena,
            root,
            config,
            stats: ScanCounters::default(),
            _values: PhantomData,
        }
    }

    pub fn config(&self) -> &TreeConfig<S> {
        &self.config
    }

    pub fn terminal_marker(&self) -> char {
        self.config.terminal_marker
    }

    /// Id of the root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn arena(&self) -> &NodeArena<S::Payload> {
        &self.arena
    }

    /// Read-only view of a live node.
    pub fn node(&self, id: NodeId) -> NodeView<'_, V, S> {
        NodeView::new(self, id)
    }

    /// Whether no key is stored.
    pub fn is_empty(&self) -> bool {
        self.arena.first_child(self.root).is_none()
    }

    /// Number of live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Current sibling scan counters.
    pub fn scan_stats(&self) -> ScanStats {
        self.stats.snapshot()
    }

    pub fn reset_scan_stats(&self) {
        self.stats.reset();
    }

    /// Drops every node and value.
    pub fn clear(&mut self) {
        let (arena, root) = NodeArena::with_root(Node::new(Label::root()));
        self.arena = arena;
        self.root = root;
    }

    /// Stores `value` under the normalized key held by `key`.
    pub fn insert(&mut self, key: KeyBuffer, value: V) -> RadixTreeResult<()> {
        self.insert_from(key, 0, value)
    }

    /// Stores `value` under `key[start..]`.
    ///
    /// Labels created for the new characters alias `key`, which is how every
    /// suffix of one key shares a single buffer.
    pub fn insert_from(&mut self, key: KeyBuffer, start: usize, value: V) -> RadixTreeResult<()> {
        self.check_key(key.as_chars())?;
        if start >= key.len() {
            return Err(RadixTreeError::invariant(format!(
                "insert offset {start} leaves no characters of a {} character key",
                key.len()
            )));
        }
        let mut cursor = KeyCursor::starting_at(key, start);
        self.insert_at(&mut cursor, value)
    }

    /// Feeds `visitor` every node whose path starts with `query`.
    ///
    /// Returns `false` if the visitor stopped the walk.
    pub fn search<Vis>(&self, query: &[char], visitor: &mut Vis) -> bool
    where
        Vis: TreeVisitor<V, S>,
    {
        self.search_at(query, visitor)
    }

    /// Values of every key starting with `query`, at most `limit` of them.
    pub fn collect(&self, query: &[char], limit: Option<usize>) -> Vec<V> {
        let mut values = Vec::new();
        let mut collector = CollectValues::new(&mut values, limit);
        self.search(query, &mut collector);
        values
    }

    /// Walks the whole tree in pre-order.
    ///
    /// Returns `false` if the visitor stopped the walk.
    pub fn visit<Vis>(&self, visitor: &mut Vis) -> bool
    where
        Vis: TreeVisitor<V, S>,
    {
        self.walk(self.root, visitor)
    }

    /// Removes `value` from the normalized `key`.
    ///
    /// Returns the removed value, or `None` when the key or value is absent.
    pub fn remove(&mut self, key: &[char], value: &V) -> RadixTreeResult<Option<V>> {
        self.check_key(key)?;
        self.remove_at(key, value)
    }

    /// Number of stored keys.
    pub fn key_count(&self) -> usize {
        let marker = self.config.terminal_marker;
        self.descendants(self.root)
            .filter(|id| self.arena[*id].is_terminal(marker))
            .count()
    }

    /// Number of stored values across all keys.
    pub fn value_count(&self) -> usize {
        self.descendants(self.root)
            .filter_map(|id| self.arena[id].payload.values())
            .map(|values| self.config.storage.value_count(values))
            .sum()
    }

    /// Verifies the structural invariants of the whole tree.
    pub fn check_invariants(&self) -> RadixTreeResult<()> {
        let mut pending = vec![(self.root, true)];
        while let Some((id, is_root)) = pending.pop() {
            self.check_node(id, is_root)?;
            pending.extend(self.arena.children(id).map(|child| (child, false)));
        }
        Ok(())
    }

    /// Fails with [`RadixTreeError::ArenaExhausted`] unless `nodes` more
    /// nodes can be allocated.
    pub fn ensure_capacity(&self, nodes: usize) -> RadixTreeResult<()> {
        if self.arena.remaining_capacity() < nodes {
            return Err(RadixTreeError::ArenaExhausted);
        }
        Ok(())
    }

    /// Renders the tree with [`TreePrinter`] and logs it at debug level.
    pub fn debug_dump(&self) -> String
    where
        V: Debug,
    {
        let mut printer = TreePrinter::new(self.config.terminal_marker);
        self.visit(&mut printer);
        let rendered = printer.into_output();
        debug!(nodes = self.node_count(), "radix tree layout:\n{}", rendered);
        rendered
    }

    /// Checks the length and termination of a normalized key.
    pub(crate) fn check_key(&self, key: &[char]) -> RadixTreeResult<()> {
        if key.len() > self.config.max_key_length {
            return Err(RadixTreeError::KeyTooLong {
                length: key.len(),
                max: self.config.max_key_length,
            });
        }
        match key.last() {
            Some(last) if *last == self.config.terminal_marker => Ok(()),
            _ => Err(RadixTreeError::invariant(
                "key does not end with the terminal marker",
            )),
        }
    }

    fn insert_at(&mut self, key: &mut KeyCursor, value: V) -> RadixTreeResult<()> {
        let mut node = self.root;
        'descend: loop {
            if key.is_empty() {
                // Keys end with the marker, so running out of key means `node` is terminal
                return self.add_value(node, value);
            }

            let mut cursor = ChildCursor::new(&self.arena, node);
            while let Some(child) = cursor.current() {
                self.stats.compared();
                let (shared, label_len, child_first) = {
                    let label = &self.arena[child].label;
                    (key.shared_prefix_len(label), label.len(), label.first_char())
                };

                if shared == key.len() || shared == label_len {
                    key.advance(shared);
                    node = child;
                    continue 'descend;
                }
                if shared > 0 {
                    return self.split(&mut cursor, child, key, shared, value);
                }
                if key.first_char() < child_first {
                    return self.insert_leaf(&mut cursor, key, value);
                }
                cursor.advance(&self.arena);
            }
            return self.insert_leaf(&mut cursor, key, value);
        }
    }

    fn add_value(&mut self, node: NodeId, value: V) -> RadixTreeResult<()> {
        let marker = self.config.terminal_marker;
        let target = &mut self.arena[node];
        if !target.is_terminal(marker) {
            return Err(RadixTreeError::invariant(format!(
                "key ended inside non-terminal node {node} ('{}')",
                target.label
            )));
        }
        let existing = match target.payload.take() {
            Payload::Leaf(values) => Some(values),
            Payload::Empty => None,
            Payload::Branch(first) => {
                target.payload = Payload::Branch(first);
                return Err(RadixTreeError::invariant(format!(
                    "terminal node {node} ('{}') owns children",
                    target.label
                )));
            }
        };
        target.payload = Payload::Leaf(self.config.storage.add_value(value, existing));
        Ok(())
    }

    /// New leaf for the whole unconsumed key, linked in front of the cursor.
    fn insert_leaf(
        &mut self,
        cursor: &mut ChildCursor,
        key: &KeyCursor,
        value: V,
    ) -> RadixTreeResult<()> {
        let label = key.remaining_label(0)?;
        let values = self.config.storage.add_value(value, None);
        let leaf = self.arena.alloc(Node::leaf(label, values))?;
        cursor.insert_before(&mut self.arena, leaf)
    }

    /// Splits `child` after `shared` characters.
    ///
    /// A new branch holding the shared prefix takes `child`'s place in the
    /// chain; `child` keeps its payload under the remaining suffix and becomes
    /// the branch's child next to a new leaf for the rest of the key.
    fn split(
        &mut self,
        cursor: &mut ChildCursor,
        child: NodeId,
        key: &KeyCursor,
        shared: usize,
        value: V,
    ) -> RadixTreeResult<()> {
        let (prefix, suffix) = {
            let label = &self.arena[child].label;
            (label.prefix(shared)?, label.suffix(shared)?)
        };
        let leaf_label = key.remaining_label(shared)?;
        let values = self.config.storage.add_value(value, None);

        let branch = self.arena.alloc(Node::new(prefix))?;
        let leaf = self.arena.alloc(Node::leaf(leaf_label, values))?;
        cursor.replace(&mut self.arena, branch)?;
        self.arena[child].label = suffix;

        let leaf_first = self.arena[leaf].label.first_char() < self.arena[child].label.first_char();
        let (first, second) = if leaf_first { (leaf, child) } else { (child, leaf) };
        self.arena[first].next_sibling = Some(second);
        self.arena.set_first_child(branch, Some(first))?;

        trace!(
            branch = %self.arena[branch].label,
            existing = %self.arena[child].label,
            added = %self.arena[leaf].label,
            "split node"
        );
        Ok(())
    }

    fn search_at<Vis>(&self, mut query: &[char], visitor: &mut Vis) -> bool
    where
        Vis: TreeVisitor<V, S>,
    {
        let mut node = self.root;
        'descend: while let Some(&wanted) = query.first() {
            for child in self.arena.children(node) {
                self.stats.compared();
                let label = &self.arena[child].label;
                let shared = shared_prefix_len(query, label.chars());
                if shared > 0 {
                    if shared == query.len() || shared == label.len() {
                        query = &query[shared..];
                        node = child;
                        continue 'descend;
                    }
                    // Query and label part ways inside the label
                    return true;
                }
                if Some(wanted) < label.first_char() {
                    self.stats.terminated_early();
                    trace!(wanted = ?wanted, passed = %label, "sibling scan stopped early");
                    return true;
                }
            }
            return true;
        }
        self.walk(node, visitor)
    }

    /// Pre-order walk of the subtree under `start`, pairing every `visit`
    /// with a `visit_complete` once the node's children are done.
    ///
    /// Once the visitor asks to stop, no further node is entered but every
    /// node on the current path is still completed.
    fn walk<Vis>(&self, start: NodeId, visitor: &mut Vis) -> bool
    where
        Vis: TreeVisitor<V, S>,
    {
        let mut path = Vec::new();
        if visitor.visit(&NodeView::new(self, start)) {
            path.push(WalkFrame {
                node: start,
                next_child: self.arena.first_child(start),
            });
        } else {
            visitor.visit_complete(&NodeView::new(self, start));
            return false;
        }

        while let Some(frame) = path.last_mut() {
            let Some(child) = frame.next_child else {
                let node = frame.node;
                path.pop();
                visitor.visit_complete(&NodeView::new(self, node));
                continue;
            };
            frame.next_child = self.arena[child].next_sibling;

            let view = NodeView::new(self, child);
            if visitor.visit(&view) {
                path.push(WalkFrame {
                    node: child,
                    next_child: self.arena.first_child(child),
                });
            } else {
                visitor.visit_complete(&view);
                while let Some(frame) = path.pop() {
                    visitor.visit_complete(&NodeView::new(self, frame.node));
                }
                return false;
            }
        }
        true
    }

    /// Removes `value` from the node spelling `key`, then collapses the nodes
    /// on the way back up.
    fn remove_at(&mut self, mut key: &[char], value: &V) -> RadixTreeResult<Option<V>> {
        // Cursor positioned on each node of the matched path
        let mut path: Vec<ChildCursor> = Vec::new();
        let mut node = self.root;
        'descend: while let Some(&wanted) = key.first() {
            let mut cursor = ChildCursor::new(&self.arena, node);
            while let Some(child) = cursor.current() {
                self.stats.compared();
                let (shared, label_len, child_first) = {
                    let label = &self.arena[child].label;
                    (shared_prefix_len(key, label.chars()), label.len(), label.first_char())
                };

                if shared == label_len {
                    key = &key[shared..];
                    path.push(cursor);
                    node = child;
                    continue 'descend;
                }
                if shared > 0 || Some(wanted) < child_first {
                    break;
                }
                cursor.advance(&self.arena);
            }
            return Ok(None);
        }

        let removed = self.remove_value(node, value);
        while let Some(mut cursor) = path.pop() {
            let Some(child) = cursor.current() else {
                return Err(RadixTreeError::invariant(format!(
                    "removal path lost its place under node {}",
                    cursor.owner()
                )));
            };
            if self.should_collapse(child) {
                self.join_or_remove(&mut cursor, child)?;
            }
        }
        Ok(removed)
    }

    fn remove_value(&mut self, node: NodeId, value: &V) -> Option<V> {
        let target = &mut self.arena[node];
        match target.payload.take() {
            Payload::Leaf(values) => {
                let (remaining, removed) = self.config.storage.remove_value(value, values);
                if let Some(values) = remaining {
                    target.payload = Payload::Leaf(values);
                }
                removed
            }
            other => {
                target.payload = other;
                None
            }
        }
    }

    fn should_collapse(&self, id: NodeId) -> bool {
        let node = &self.arena[id];
        if node.is_terminal(self.config.terminal_marker) {
            return node.payload.is_empty();
        }
        match node.payload.first_child() {
            Some(first) => self.arena[first].next_sibling.is_none(),
            None => true,
        }
    }

    /// Detaches an exhausted terminal `child`, or merges a branch `child` with
    /// its only remaining child.
    fn join_or_remove(&mut self, cursor: &mut ChildCursor, child: NodeId) -> RadixTreeResult<()> {
        let marker = self.config.terminal_marker;
        let sole_grandchild = {
            let node = &self.arena[child];
            if node.is_terminal(marker) {
                None
            } else {
                node.payload.first_child()
            }
        };

        match sole_grandchild {
            Some(grandchild) => {
                let joined = self.arena[grandchild]
                    .label
                    .joined_after(&self.arena[child].label)?;
                trace!(
                    parent = %self.arena[child].label,
                    joined = %joined,
                    "joined node with its only child"
                );
                self.arena[grandchild].label = joined;
                self.arena[child].payload = Payload::Empty;
                cursor.replace(&mut self.arena, grandchild)?;
            }
            None => {
                trace!(label = %self.arena[child].label, "removed exhausted node");
                cursor.remove_current(&mut self.arena)?;
            }
        }
        self.arena.release(child);
        Ok(())
    }

    /// Checks one node and the shape of its child chain.
    fn check_node(&self, id: NodeId, is_root: bool) -> RadixTreeResult<()> {
        let node = &self.arena[id];
        let marker = self.config.terminal_marker;

        if is_root != node.label.is_empty() {
            return Err(RadixTreeError::invariant(format!(
                "node {id} has label '{}' but only the root may be unlabeled",
                node.label
            )));
        }
        if node.label.chars().iter().rev().skip(1).any(|c| *c == marker) {
            return Err(RadixTreeError::invariant(format!(
                "node {id} label '{}' contains the terminal marker before its end",
                node.label
            )));
        }

        if node.is_terminal(marker) {
            return match node.payload {
                Payload::Leaf(_) => Ok(()),
                Payload::Empty => Err(RadixTreeError::invariant(format!(
                    "terminal node {id} ('{}') holds no values",
                    node.label
                ))),
                Payload::Branch(_) => Err(RadixTreeError::invariant(format!(
                    "terminal node {id} ('{}') owns children",
                    node.label
                ))),
            };
        }
        if let Payload::Leaf(_) = node.payload {
            return Err(RadixTreeError::invariant(format!(
                "non-terminal node {id} ('{}') holds values",
                node.label
            )));
        }

        let mut previous_first: Option<char> = None;
        let mut child_count = 0;
        for child in self.arena.children(id) {
            let first = self.arena[child].label.first_char();
            if previous_first.is_some() && first <= previous_first {
                return Err(RadixTreeError::invariant(format!(
                    "children of node {id} ('{}') are not strictly sorted at '{}'",
                    node.label, self.arena[child].label
                )));
            }
            previous_first = first;
            child_count += 1;
        }
        if !is_root && child_count < 2 {
            return Err(RadixTreeError::invariant(format!(
                "branch node {id} ('{}') has {child_count} children",
                node.label
            )));
        }
        Ok(())
    }

    /// Every node below `node` in pre-order, `node` excluded.
    fn descendants(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack: Vec<NodeId> = self.arena.children(node).collect();
        stack.reverse();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            let children: Vec<NodeId> = self.arena.children(next).collect();
            stack.extend(children.into_iter().rev());
            Some(next)
        })
    }
}
