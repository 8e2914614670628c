//! Maui Index Library
//!
//! This library contains an in-memory associative index over character
//! keys: a compressed trie answering prefix queries, and a suffix variant of
//! it answering substring queries. It also carries the configuration, error
//! reporting and logging setup shared by applications embedding the index.
//!
//! # Architecture
//!
//! Maui Index is designed with the following principles in mind:
//! - Strict component boundaries
//! - Comprehensive error handling and propagation
//! - Zero-copy key storage where possible
//! - No allocation per tree level on insert, search or delete

// Re-export public modules
pub mod config;
pub mod data_structures;
pub mod error;
pub mod logging;

// Internal modules that are not part of the public API
#[cfg(test)]
pub(crate) mod tests;

/// Version information for Maui Index.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library initialization function
pub fn init() -> error::MauiResult<()> {
    // Set up global error reporter with tracing
    error::set_error_reporter(std::sync::Arc::new(error::TracingErrorReporter));

    // Initialize default configuration
    config::init_default_config()?;

    Ok(())
}
