//! Test modules for Maui Index.
//!
//! This module contains the crate-internal testing infrastructure:
//! - Configuration and error handling tests
//! - Radix and suffix tree scenario tests
//! - Property-based tests using proptest against a reference model
//! - Test fixtures and utilities

pub mod config_tests;

// Re-export commonly used testing tools to simplify imports in test modules
pub use test_utils::{
    entries_strategy, key_strategy, sorted, string_strategy, ModelIndex, TestFixture,
};
