// Copyright (c) 2025 Maui Index Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Thread-shareable handle to a [`RadixTreeMap`].
//!
//! The tree itself performs no synchronization. This wrapper serializes
//! writers behind a `parking_lot` read-write lock while letting searches run
//! side by side.

use std::sync::Arc;

use parking_lot::RwLock;

use super::error::RadixTreeResult;
use super::map::RadixTreeMap;
use super::storage::{SingleValue, ValueStorage};

/// Cloneable, lock-protected [`RadixTreeMap`].
#[derive(Debug)]
pub struct SharedRadixMap<V, S: ValueStorage<V> = SingleValue> {
    inner: Arc<RwLock<RadixTreeMap<V, S>>>,
}

impl<V, S: ValueStorage<V>> Clone for SharedRadixMap<V, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V, S: ValueStorage<V>> From<RadixTreeMap<V, S>> for SharedRadixMap<V, S> {
    fn from(map: RadixTreeMap<V, S>) -> Self {
        Self::new(map)
    }
}

impl<V, S: ValueStorage<V>> SharedRadixMap<V, S> {
    pub fn new(map: RadixTreeMap<V, S>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    pub fn insert(&self, key: &str, value: V) -> RadixTreeResult<()> {
        self.inner.write().insert(key, value)
    }

    pub fn search(&self, prefix: &str, limit: Option<usize>) -> RadixTreeResult<Vec<V>> {
        self.inner.read().search(prefix, limit)
    }

    pub fn get(&self, key: &str) -> RadixTreeResult<Vec<V>> {
        self.inner.read().get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.read().contains_key(key)
    }

    pub fn remove(&self, key: &str, value: &V) -> RadixTreeResult<Option<V>> {
        self.inner.write().remove(key, value)
    }

    pub fn key_count(&self) -> usize {
        self.inner.read().key_count()
    }

    /// Runs `f` with shared access to the map.
    pub fn read<R>(&self, f: impl FnOnce(&RadixTreeMap<V, S>) -> R) -> R {
        f(&self.inner.read())
    }

    /// Runs `f` with exclusive access to the map.
    pub fn write<R>(&self, f: impl FnOnce(&mut RadixTreeMap<V, S>) -> R) -> R {
        f(&mut self.inner.write())
    }
}
