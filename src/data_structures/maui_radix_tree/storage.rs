// Copyright (c) 2025 Maui Index Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Value-storage strategies for terminal nodes.
//!
//! The tree never looks inside a terminal node's payload itself. It hands the
//! payload to a [`ValueStorage`] to add, remove or enumerate values, which is
//! what lets one key hold a single value or a whole set of them.

use std::hash::Hash;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

/// Policy for holding the values stored under one key.
pub trait ValueStorage<V> {
    /// Container kept in a terminal node's payload slot.
    type Payload;

    /// Adds `value`, creating the container when `existing` is `None`.
    fn add_value(&self, value: V, existing: Option<Self::Payload>) -> Self::Payload;

    /// Removes `value`.
    ///
    /// Returns the remaining container (`None` once the last value is gone)
    /// and the removed value, if it was present.
    fn remove_value(&self, value: &V, payload: Self::Payload) -> (Option<Self::Payload>, Option<V>);

    /// Appends every stored value to `sink`.
    ///
    /// The order is stable for as long as the container is not modified.
    fn enumerate<E: Extend<V>>(&self, payload: &Self::Payload, sink: &mut E);

    /// Number of values in the container.
    fn value_count(&self, payload: &Self::Payload) -> usize;
}

/// One value per key; adding overwrites.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SingleValue;

impl<V: PartialEq + Clone> ValueStorage<V> for SingleValue {
    type Payload = V;

    fn add_value(&self, value: V, _existing: Option<V>) -> V {
        value
    }

    fn remove_value(&self, value: &V, payload: V) -> (Option<V>, Option<V>) {
        if payload == *value {
            (None, Some(payload))
        } else {
            (Some(payload), None)
        }
    }

    fn enumerate<E: Extend<V>>(&self, payload: &V, sink: &mut E) {
        sink.extend(std::iter::once(payload.clone()));
    }

    fn value_count(&self, _payload: &V) -> usize {
        1
    }
}

/// Any number of distinct values per key; adding a duplicate is a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MultiValue;

impl<V: Hash + Eq + Clone> ValueStorage<V> for MultiValue {
    type Payload = HashSet<V>;

    fn add_value(&self, value: V, existing: Option<HashSet<V>>) -> HashSet<V> {
        let mut values = existing.unwrap_or_default();
        values.insert(value);
        values
    }

    fn remove_value(&self, value: &V, mut payload: HashSet<V>) -> (Option<HashSet<V>>, Option<V>) {
        let removed = payload.take(value);
        if payload.is_empty() {
            (None, removed)
        } else {
            (Some(payload), removed)
        }
    }

    fn enumerate<E: Extend<V>>(&self, payload: &HashSet<V>, sink: &mut E) {
        sink.extend(payload.iter().cloned());
    }

    fn value_count(&self, payload: &HashSet<V>) -> usize {
        payload.len()
    }
}

/// Strategy chosen at runtime, typically from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueStorageKind {
    /// Behaves like [`SingleValue`].
    #[default]
    Single,
    /// Behaves like [`MultiValue`].
    Multi,
}

/// Payload of a [`ValueStorageKind`] strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredValues<V: Hash + Eq> {
    /// Held by the single-value strategy.
    One(V),
    /// Held by the multi-value strategy.
    Many(HashSet<V>),
}

impl<V: Hash + Eq + Clone> ValueStorage<V> for ValueStorageKind {
    type Payload = StoredValues<V>;

    fn add_value(&self, value: V, existing: Option<StoredValues<V>>) -> StoredValues<V> {
        match self {
            ValueStorageKind::Single => StoredValues::One(value),
            ValueStorageKind::Multi => {
                let existing = existing.map(|stored| match stored {
                    StoredValues::Many(values) => values,
                    StoredValues::One(value) => std::iter::once(value).collect(),
                });
                StoredValues::Many(MultiValue.add_value(value, existing))
            }
        }
    }

    fn remove_value(
        &self,
        value: &V,
        payload: StoredValues<V>,
    ) -> (Option<StoredValues<V>>, Option<V>) {
        match payload {
            StoredValues::One(stored) => {
                let (remaining, removed) = SingleValue.remove_value(value, stored);
                (remaining.map(StoredValues::One), removed)
            }
            StoredValues::Many(values) => {
                let (remaining, removed) = MultiValue.remove_value(value, values);
                (remaining.map(StoredValues::Many), removed)
            }
        }
    }

    fn enumerate<E: Extend<V>>(&self, payload: &StoredValues<V>, sink: &mut E) {
        match payload {
            StoredValues::One(value) => SingleValue.enumerate(value, sink),
            StoredValues::Many(values) => MultiValue.enumerate(values, sink),
        }
    }

    fn value_count(&self, payload: &StoredValues<V>) -> usize {
        match payload {
            StoredValues::One(_) => 1,
            StoredValues::Many(values) => values.len(),
        }
    }
}
