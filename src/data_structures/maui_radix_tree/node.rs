// Copyright (c) 2025 Maui Index Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Node implementation for the Maui Radix Tree.
//!
//! Nodes live in a slab-style [`NodeArena`] and refer to each other by
//! [`NodeId`]. Each node keeps an intrusive `next_sibling` link, so a parent
//! only stores the id of its first child. Slots of detached nodes go onto a
//! free list and are handed out again by the next allocation.

use std::fmt;
use std::ops::{Index, IndexMut};

use super::error::{RadixTreeError, RadixTreeResult};
use super::label::Label;

/// 4-byte handle to a node slot in a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the slot inside the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node's payload slot holds.
///
/// Terminal nodes carry `Leaf` (or `Empty` for the instant between removing
/// their last value and being detached); every other node carries `Branch`,
/// or `Empty` when it has no children (only the root ever does).
#[derive(Debug)]
pub enum Payload<P> {
    /// Nothing stored.
    Empty,
    /// First node of this node's child chain.
    Branch(NodeId),
    /// Value container owned by the value-storage strategy.
    Leaf(P),
}

impl<P> Default for Payload<P> {
    fn default() -> Self {
        Payload::Empty
    }
}

impl<P> Payload<P> {
    /// First child, if this payload is a branch.
    pub fn first_child(&self) -> Option<NodeId> {
        match self {
            Payload::Branch(first) => Some(*first),
            _ => None,
        }
    }

    /// Stored values, if this payload is a leaf.
    pub fn values(&self) -> Option<&P> {
        match self {
            Payload::Leaf(values) => Some(values),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    /// Moves the payload out, leaving `Empty` behind.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

/// A node in the Maui Radix Tree.
#[derive(Debug)]
pub struct Node<P> {
    /// Characters this node adds to the path from the root.
    pub label: Label,

    /// Next node in the parent's child chain.
    pub next_sibling: Option<NodeId>,

    /// Children or values, see [`Payload`].
    pub payload: Payload<P>,
}

impl<P> Node<P> {
    /// Creates a node with no payload.
    pub fn new(label: Label) -> Self {
        Self {
            label,
            next_sibling: None,
            payload: Payload::Empty,
        }
    }

    /// Creates a terminal node holding `values`.
    pub fn leaf(label: Label, values: P) -> Self {
        Self {
            label,
            next_sibling: None,
            payload: Payload::Leaf(values),
        }
    }

    /// A node is terminal when its label ends with the terminal marker.
    pub fn is_terminal(&self, marker: char) -> bool {
        self.label.last_char() == Some(marker)
    }
}

#[derive(Debug)]
enum Slot<P> {
    Occupied(Node<P>),
    Vacant { next_free: Option<NodeId> },
}

/// Slab of nodes with a free list for released slots.
#[derive(Debug)]
pub struct NodeArena<P> {
    slots: Vec<Slot<P>>,
    free_head: Option<NodeId>,
    live: usize,
}

impl<P> NodeArena<P> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty arena with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            live: 0,
        }
    }

    /// Creates an arena holding only `root`, in slot zero.
    pub fn with_root(root: Node<P>) -> (Self, NodeId) {
        let arena = Self {
            slots: vec![Slot::Occupied(root)],
            free_head: None,
            live: 1,
        };
        (arena, NodeId(0))
    }

    /// Stores `node`, reusing a released slot when one is available.
    pub fn alloc(&mut self, node: Node<P>) -> RadixTreeResult<NodeId> {
        let id = match self.free_head {
            Some(id) => {
                let slot = &mut self.slots[id.index()];
                self.free_head = match slot {
                    Slot::Vacant { next_free } => *next_free,
                    Slot::Occupied(_) => {
                        return Err(RadixTreeError::invariant(format!(
                            "free list points at live node {id}"
                        )))
                    }
                };
                *slot = Slot::Occupied(node);
                id
            }
            None => {
                let raw = u32::try_from(self.slots.len())
                    .map_err(|_| RadixTreeError::ArenaExhausted)?;
                self.slots.push(Slot::Occupied(node));
                NodeId(raw)
            }
        };
        self.live += 1;
        Ok(id)
    }

    /// Detaches the node in slot `id` and puts the slot on the free list.
    ///
    /// Returns `None` if the slot was already free.
    pub fn release(&mut self, id: NodeId) -> Option<Node<P>> {
        let slot = self.slots.get_mut(id.index())?;
        if let Slot::Vacant { .. } = slot {
            return None;
        }
        let previous = std::mem::replace(
            slot,
            Slot::Vacant {
                next_free: self.free_head,
            },
        );
        self.free_head = Some(id);
        self.live -= 1;
        match previous {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<P>> {
        match self.slots.get(id.index()) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<P>> {
        match self.slots.get_mut(id.index()) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// How many more nodes can be allocated before ids run out.
    pub fn remaining_capacity(&self) -> usize {
        let id_space = u32::MAX as usize + 1;
        id_space.saturating_sub(self.slots.len()) + self.free_slots()
    }

    /// Number of released slots waiting for reuse.
    pub fn free_slots(&self) -> usize {
        self.slots.len() - self.live
    }

    /// First child of `owner`, if it is a branch.
    pub fn first_child(&self, owner: NodeId) -> Option<NodeId> {
        self[owner].payload.first_child()
    }

    /// Points `owner`'s child chain at `first`, or empties it.
    pub fn set_first_child(
        &mut self,
        owner: NodeId,
        first: Option<NodeId>,
    ) -> RadixTreeResult<()> {
        let node = &mut self[owner];
        if let Payload::Leaf(_) = node.payload {
            return Err(RadixTreeError::invariant(format!(
                "terminal node {owner} ('{}') cannot own children",
                node.label
            )));
        }
        node.payload = match first {
            Some(first) => Payload::Branch(first),
            None => Payload::Empty,
        };
        Ok(())
    }

    /// Iterates over the child chain of `owner`.
    pub fn children(&self, owner: NodeId) -> Children<'_, P> {
        Children {
            arena: self,
            next: self.first_child(owner),
        }
    }
}

impl<P> Default for NodeArena<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Index<NodeId> for NodeArena<P> {
    type Output = Node<P>;

    fn index(&self, id: NodeId) -> &Node<P> {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node {id} is not live in this arena"),
        }
    }
}

impl<P> IndexMut<NodeId> for NodeArena<P> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<P> {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("node {id} is not live in this arena"),
        }
    }
}

/// Read-only walk over a child chain.
pub struct Children<'a, P> {
    arena: &'a NodeArena<P>,
    next: Option<NodeId>,
}

impl<'a, P> Iterator for Children<'a, P> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.arena[current].next_sibling;
        Some(current)
    }
}
