//! Radix tree configuration module.
//!
//! This module defines how index facades build their trees: which value
//! storage strategy they use, which character terminates stored keys and how
//! long keys may be.

use super::{ConfigResult, Validate};
use crate::data_structures::maui_radix_tree::{
    TreeConfig, ValueStorageKind, DEFAULT_MAX_KEY_LENGTH, DEFAULT_TERMINAL_MARKER,
};
use crate::error::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Radix tree configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSettings {
    /// Value storage strategy (single or multi)
    pub value_storage: ValueStorageKind,

    /// Character appended to every stored key; keys may not contain it
    pub terminal_marker: char,

    /// Maximum key length in characters, terminal marker included
    pub max_key_length: usize,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            value_storage: ValueStorageKind::Single,
            terminal_marker: DEFAULT_TERMINAL_MARKER,
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
        }
    }
}

impl TreeSettings {
    /// Tree configuration described by these settings.
    pub fn tree_config(&self) -> TreeConfig<ValueStorageKind> {
        TreeConfig::new(self.value_storage)
            .with_terminal_marker(self.terminal_marker)
            .with_max_key_length(self.max_key_length)
    }
}

impl Validate for TreeSettings {
    fn validate(&self) -> ConfigResult<()> {
        // Label offsets are stored as u32
        if self.max_key_length == 0 || self.max_key_length > u32::MAX as usize {
            return Err(ConfigError::ValueOutOfRange {
                key: "tree.max_key_length".to_string(),
                message: format!("must be between 1 and {}", u32::MAX),
            });
        }
        Ok(())
    }
}
