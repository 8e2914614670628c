// Copyright (c) 2025 Maui Index Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Sibling iteration over a node's child chain.
//!
//! A [`ChildCursor`] is a position in the singly linked chain: the owner whose
//! payload holds the chain head, the node before the position and the node at
//! it. It is `Copy`, so descending operations keep one per level of their
//! path and walking or editing a chain never allocates. Every edit is O(1).

use super::error::{RadixTreeError, RadixTreeResult};
use super::node::{NodeArena, NodeId};

/// Cursor over the children of one owner node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildCursor {
    owner: NodeId,
    previous: Option<NodeId>,
    current: Option<NodeId>,
}

impl ChildCursor {
    /// Positions a cursor on `owner`'s first child.
    ///
    /// Terminal owners have no child chain, so the cursor starts exhausted.
    pub fn new<P>(arena: &NodeArena<P>, owner: NodeId) -> Self {
        Self {
            owner,
            previous: None,
            current: arena.first_child(owner),
        }
    }

    /// The node whose child chain this cursor walks.
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// The node at the cursor, `None` once past the end.
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    /// The node before the cursor, `None` at the head of the chain.
    pub fn previous(&self) -> Option<NodeId> {
        self.previous
    }

    pub fn is_valid(&self) -> bool {
        self.current.is_some()
    }

    /// Moves to the next sibling.
    pub fn advance<P>(&mut self, arena: &NodeArena<P>) {
        if let Some(current) = self.current {
            self.previous = Some(current);
            self.current = arena[current].next_sibling;
        }
    }

    /// Links `node` into the chain in front of the cursor.
    ///
    /// When the cursor is past the end this appends. The cursor keeps
    /// pointing at the same current node afterwards.
    pub fn insert_before<P>(
        &mut self,
        arena: &mut NodeArena<P>,
        node: NodeId,
    ) -> RadixTreeResult<()> {
        arena[node].next_sibling = self.current;
        self.link_previous_to(arena, Some(node))?;
        self.previous = Some(node);
        Ok(())
    }

    /// Puts `node` in place of the current node and returns the detached one.
    pub fn replace<P>(
        &mut self,
        arena: &mut NodeArena<P>,
        node: NodeId,
    ) -> RadixTreeResult<NodeId> {
        let old = self.require_current()?;
        let next = arena[old].next_sibling.take();
        arena[node].next_sibling = next;
        self.link_previous_to(arena, Some(node))?;
        self.current = Some(node);
        Ok(old)
    }

    /// Unlinks the current node and moves on to its successor.
    pub fn remove_current<P>(&mut self, arena: &mut NodeArena<P>) -> RadixTreeResult<NodeId> {
        let old = self.require_current()?;
        let next = arena[old].next_sibling.take();
        self.link_previous_to(arena, next)?;
        self.current = next;
        Ok(old)
    }

    fn require_current(&self) -> RadixTreeResult<NodeId> {
        self.current.ok_or_else(|| {
            RadixTreeError::invariant(format!(
                "cursor over children of {} is past the end",
                self.owner
            ))
        })
    }

    fn link_previous_to<P>(
        &self,
        arena: &mut NodeArena<P>,
        target: Option<NodeId>,
    ) -> RadixTreeResult<()> {
        match self.previous {
            Some(previous) => {
                arena[previous].next_sibling = target;
                Ok(())
            }
            None => arena.set_first_child(self.owner, target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::maui_radix_tree::label::{KeyBuffer, Label};
    use crate::data_structures::maui_radix_tree::node::Node;

    fn label(s: &str) -> Label {
        let buffer = KeyBuffer::new(s.chars().collect::<Vec<_>>());
        let len = buffer.len();
        Label::new(buffer, 0, len).unwrap()
    }

    fn labels(arena: &NodeArena<u32>, owner: NodeId) -> Vec<String> {
        arena
            .children(owner)
            .map(|id| arena[id].label.to_string())
            .collect()
    }

    fn setup() -> (NodeArena<u32>, NodeId) {
        let mut arena = NodeArena::new();
        let root = arena.alloc(Node::new(Label::root())).unwrap();
        (arena, root)
    }

    #[test]
    fn test_empty_owner_cursor_is_exhausted() {
        let (arena, root) = setup();
        let cursor = ChildCursor::new(&arena, root);
        assert!(!cursor.is_valid());
        assert_eq!(cursor.owner(), root);
    }

    #[test]
    fn test_insert_before_keeps_order() {
        let (mut arena, root) = setup();
        let b = arena.alloc(Node::leaf(label("b$"), 2)).unwrap();
        let d = arena.alloc(Node::leaf(label("d$"), 4)).unwrap();
        let a = arena.alloc(Node::leaf(label("a$"), 1)).unwrap();
        let c = arena.alloc(Node::leaf(label("c$"), 3)).unwrap();

        // Appending on an exhausted cursor
        let mut cursor = ChildCursor::new(&arena, root);
        cursor.insert_before(&mut arena, b).unwrap();
        cursor.insert_before(&mut arena, d).unwrap();
        assert_eq!(labels(&arena, root), vec!["b$", "d$"]);

        // Insert at the head
        let mut cursor = ChildCursor::new(&arena, root);
        cursor.insert_before(&mut arena, a).unwrap();
        assert_eq!(cursor.current(), Some(b));

        // Insert in the middle
        let mut cursor = ChildCursor::new(&arena, root);
        cursor.advance(&arena);
        cursor.advance(&arena);
        assert_eq!(cursor.current(), Some(d));
        cursor.insert_before(&mut arena, c).unwrap();

        assert_eq!(labels(&arena, root), vec!["a$", "b$", "c$", "d$"]);
    }

    #[test]
    fn test_replace_detaches_old_node() {
        let (mut arena, root) = setup();
        let a = arena.alloc(Node::leaf(label("a$"), 1)).unwrap();
        let b = arena.alloc(Node::leaf(label("b$"), 2)).unwrap();
        let mut cursor = ChildCursor::new(&arena, root);
        cursor.insert_before(&mut arena, a).unwrap();
        cursor.insert_before(&mut arena, b).unwrap();

        let replacement = arena.alloc(Node::leaf(label("az$"), 9)).unwrap();
        let mut cursor = ChildCursor::new(&arena, root);
        let old = cursor.replace(&mut arena, replacement).unwrap();

        assert_eq!(old, a);
        assert!(arena[a].next_sibling.is_none());
        assert_eq!(cursor.current(), Some(replacement));
        assert_eq!(labels(&arena, root), vec!["az$", "b$"]);
    }

    #[test]
    fn test_remove_current_fixes_head_and_tail() {
        let (mut arena, root) = setup();
        let a = arena.alloc(Node::leaf(label("a$"), 1)).unwrap();
        let b = arena.alloc(Node::leaf(label("b$"), 2)).unwrap();
        let mut cursor = ChildCursor::new(&arena, root);
        cursor.insert_before(&mut arena, a).unwrap();
        cursor.insert_before(&mut arena, b).unwrap();

        let mut cursor = ChildCursor::new(&arena, root);
        cursor.advance(&arena);
        assert_eq!(cursor.remove_current(&mut arena).unwrap(), b);
        assert!(!cursor.is_valid());
        assert_eq!(labels(&arena, root), vec!["a$"]);

        let mut cursor = ChildCursor::new(&arena, root);
        assert_eq!(cursor.remove_current(&mut arena).unwrap(), a);
        assert!(arena[root].payload.is_empty());
    }

    #[test]
    fn test_edit_past_end_is_an_invariant_violation() {
        let (mut arena, root) = setup();
        let a = arena.alloc(Node::leaf(label("a$"), 1)).unwrap();
        let mut cursor = ChildCursor::new(&arena, root);

        assert!(cursor.remove_current(&mut arena).unwrap_err().is_invariant_violation());
        assert!(cursor.replace(&mut arena, a).unwrap_err().is_invariant_violation());
    }
}
