// Copyright (c) 2025 Maui Index Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Maui Radix Tree: a compressed trie for prefix and substring lookup.
//!
//! Keys are sequences of `char`. Each stored key is closed by a reserved
//! terminal marker so that a key which is a prefix of another key keeps its
//! own node. Chains of single-child nodes are collapsed into one node whose
//! label covers several characters.
//!
//! # Features
//!
//! - Zero-copy labels: every label is a window into the shared buffer of the
//!   key insertion that produced it, and splits or joins only move offsets.
//! - Nodes live in an index-based arena with intrusive sibling links; detached
//!   slots are recycled through a free list.
//! - Sorted sibling chains let scans stop as soon as they pass the wanted
//!   character.
//! - Pluggable value storage: one value per key, a set per key, or either one
//!   chosen at runtime from configuration.
//! - A suffix variant answering "which keys contain this substring".
//! - No operation recurses per tree level, so a chain as deep as the longest
//!   accepted key is safe to insert, search, walk and remove.
//!
//! # Example
//!
//! ```
//! use maui_index_lib::data_structures::maui_radix_tree::{RadixTreeMap, TreePrinter};
//!
//! let mut map = RadixTreeMap::new();
//! map.insert("cat", 1).unwrap();
//! map.insert("car", 2).unwrap();
//! map.insert("cart", 3).unwrap();
//!
//! map.remove("car", &2).unwrap();
//! assert_eq!(map.search("car", None).unwrap(), vec![3]);
//!
//! let mut printer = TreePrinter::new(map.terminal_marker());
//! map.visit_all(&mut printer);
//! assert_eq!(printer.output(), "(root)\n  ca\n    rt$\tvals: 3\n    t$\tvals: 1\n");
//! ```
//!
//! # Concurrency
//!
//! Trees are not synchronized. Use [`SharedRadixMap`] to share one between
//! threads.

pub mod cursor;
pub mod error;
pub mod label;
pub mod map;
pub mod node;
pub mod shared;
pub mod storage;
pub mod suffix;
pub mod tree;
pub mod visitor;

pub use error::{RadixTreeError, RadixTreeResult};
pub use label::{KeyBuffer, Label};
pub use map::RadixTreeMap;
pub use node::NodeId;
pub use shared::SharedRadixMap;
pub use storage::{MultiValue, SingleValue, StoredValues, ValueStorage, ValueStorageKind};
pub use suffix::SuffixTreeMap;
pub use tree::{
    RadixTree, ScanStats, TreeConfig, DEFAULT_MAX_KEY_LENGTH, DEFAULT_TERMINAL_MARKER,
};
pub use visitor::{
    CollectValues, DistinctValues, NodeView, TreePrinter, TreeVisitor, ValueCollection,
};
