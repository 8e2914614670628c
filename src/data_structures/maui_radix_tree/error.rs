// Copyright (c) 2025 Maui Index Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Error types for the Maui Radix Tree.
//!
//! Lookups that find nothing are not errors: searches return an empty
//! collection and removals return `Ok(None)`.

/// Errors that can occur in Maui Radix Tree operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum RadixTreeError {
    /// The key does not fit the configured label offset range.
    #[error("Key of length {length} exceeds maximum key length of {max}")]
    KeyTooLong {
        /// Length of the rejected key in characters, terminal marker included.
        length: usize,
        /// The configured maximum.
        max: usize,
    },

    /// The key contains the reserved terminal marker.
    #[error("Key '{key}' contains the reserved terminal marker {marker:?}")]
    ReservedCharacter {
        /// The rejected key.
        key: String,
        /// The tree's terminal marker.
        marker: char,
    },

    /// The tree structure is not in the shape the algorithms rely on.
    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),

    /// No more node ids can be handed out by the arena.
    #[error("Node arena exhausted")]
    ArenaExhausted,
}

impl RadixTreeError {
    /// Shorthand for an [`RadixTreeError::InvariantViolation`].
    pub(crate) fn invariant<S: Into<String>>(message: S) -> Self {
        Self::InvariantViolation(message.into())
    }

    /// Whether this error signals a defect rather than bad input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}

/// Result type for Maui Radix Tree operations
pub type RadixTreeResult<T> = std::result::Result<T, RadixTreeError>;

/// Component name used when tree errors are reported.
pub(crate) const COMPONENT: &str = "maui_radix_tree";

/// Sends an invariant violation in `result` to the global error reporter.
///
/// The result is handed back untouched so callers can still propagate it.
pub(crate) fn report_violation<T>(operation: &str, result: RadixTreeResult<T>) -> RadixTreeResult<T> {
    if let Err(err) = &result {
        if err.is_invariant_violation() {
            crate::error::report_error(
                crate::error::ErrorContext::new(crate::error::MauiError::Tree(err.clone()), COMPONENT)
                    .with_details(format!("{operation} aborted")),
            );
        }
    }
    result
}
