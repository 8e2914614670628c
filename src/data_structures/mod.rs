//! Data structures for Maui Index.
//!
//! This module contains the in-memory index structures. All implementations
//! adhere to the project requirements:
//! - No unsafe code
//! - Zero-copy key storage where possible
//! - Allocation-light hot paths

pub mod maui_radix_tree;

// Re-export common data structures
pub use maui_radix_tree::{
    RadixTreeError, RadixTreeMap, RadixTreeResult, SharedRadixMap, SuffixTreeMap,
};
