// Copyright (c) 2025 Maui Index Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Shared key buffers and the zero-copy labels sliced out of them.
//!
//! Every node label aliases the buffer of the key insertion that produced its
//! characters. Buffers are reference counted, so a buffer lives exactly as
//! long as the last label pointing into it.
//!
//! For any node, the characters of its buffer that end at the label's `end`
//! spell the node's full path from the root. Joining a node with its only
//! child therefore never copies: the joined label is the child's buffer
//! extended backwards by the parent's label length.

use std::fmt::{self, Write};
use std::sync::Arc;

use super::error::{RadixTreeError, RadixTreeResult};

/// Number of leading characters two slices have in common.
pub fn shared_prefix_len(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Immutable character buffer holding one normalized key.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyBuffer {
    chars: Arc<[char]>,
}

impl KeyBuffer {
    /// Wraps an already normalized character sequence.
    pub fn new<C: Into<Arc<[char]>>>(chars: C) -> Self {
        Self {
            chars: chars.into(),
        }
    }

    /// Builds the buffer for `key` with `marker` appended.
    pub fn terminated(key: &str, marker: char) -> Self {
        let chars: Vec<char> = key.chars().chain(std::iter::once(marker)).collect();
        Self::new(chars)
    }

    /// An empty buffer, used for the root label.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Number of characters in the buffer.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the buffer holds no characters.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The buffer's characters.
    pub fn as_chars(&self) -> &[char] {
        &self.chars
    }

    /// Whether both handles alias the same allocation.
    pub fn ptr_eq(&self, other: &KeyBuffer) -> bool {
        Arc::ptr_eq(&self.chars, &other.chars)
    }
}

impl fmt::Debug for KeyBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KeyBuffer")
            .field(&self.chars.iter().collect::<String>())
            .finish()
    }
}

/// A half-open `[start, end)` window into a [`KeyBuffer`].
#[derive(Clone, PartialEq, Eq)]
pub struct Label {
    buffer: KeyBuffer,
    start: u32,
    end: u32,
}

impl Label {
    /// Creates a label over `buffer[start..end]`.
    pub fn new(buffer: KeyBuffer, start: usize, end: usize) -> RadixTreeResult<Self> {
        if start > end || end > buffer.len() {
            return Err(RadixTreeError::invariant(format!(
                "label bounds {start}..{end} outside buffer of length {}",
                buffer.len()
            )));
        }
        let to_offset = |offset: usize| {
            u32::try_from(offset).map_err(|_| RadixTreeError::KeyTooLong {
                length: buffer.len(),
                max: u32::MAX as usize,
            })
        };
        let (start, end) = (to_offset(start)?, to_offset(end)?);
        Ok(Self { buffer, start, end })
    }

    /// The empty label carried by the root node.
    pub fn root() -> Self {
        Self {
            buffer: KeyBuffer::empty(),
            start: 0,
            end: 0,
        }
    }

    /// The characters this label covers.
    pub fn chars(&self) -> &[char] {
        &self.buffer.as_chars()[self.start as usize..self.end as usize]
    }

    /// Label length in characters.
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    /// Whether the label is empty (only the root's is).
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn first_char(&self) -> Option<char> {
        self.chars().first().copied()
    }

    pub fn last_char(&self) -> Option<char> {
        self.chars().last().copied()
    }

    /// Start offset into the backing buffer.
    pub fn start(&self) -> usize {
        self.start as usize
    }

    /// End offset (exclusive) into the backing buffer.
    pub fn end(&self) -> usize {
        self.end as usize
    }

    /// The buffer this label aliases.
    pub fn buffer(&self) -> &KeyBuffer {
        &self.buffer
    }

    /// The first `len` characters, sharing the buffer.
    pub fn prefix(&self, len: usize) -> RadixTreeResult<Self> {
        Self::new(self.buffer.clone(), self.start(), self.start() + len)
    }

    /// Everything after the first `skip` characters, sharing the buffer.
    pub fn suffix(&self, skip: usize) -> RadixTreeResult<Self> {
        Self::new(self.buffer.clone(), self.start() + skip, self.end())
    }

    /// Extends this label backwards so that it also covers `parent`.
    ///
    /// The characters in front of this label must equal `parent`'s characters.
    pub fn joined_after(&self, parent: &Label) -> RadixTreeResult<Self> {
        let start = self.start().checked_sub(parent.len()).ok_or_else(|| {
            RadixTreeError::invariant(format!(
                "cannot join '{}' in front of '{}': buffer too short",
                parent, self
            ))
        })?;
        if self.buffer.as_chars()[start..self.start()] != *parent.chars() {
            return Err(RadixTreeError::invariant(format!(
                "cannot join '{}' in front of '{}': path is not contiguous",
                parent, self
            )));
        }
        Self::new(self.buffer.clone(), start, self.end())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.chars() {
            f.write_char(*c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label({:?} @ {}..{})", self.to_string(), self.start, self.end)
    }
}

/// A movable window over the not-yet-consumed part of a key.
///
/// Recursive tree operations advance the cursor past a matched label before
/// descending and retreat it again on the way back up.
#[derive(Debug, Clone)]
pub struct KeyCursor {
    buffer: KeyBuffer,
    start: usize,
    end: usize,
}

impl KeyCursor {
    /// A cursor over the whole buffer.
    pub fn new(buffer: KeyBuffer) -> Self {
        let end = buffer.len();
        Self {
            buffer,
            start: 0,
            end,
        }
    }

    /// A cursor over `buffer[start..]`, used for suffix insertion.
    pub fn starting_at(buffer: KeyBuffer, start: usize) -> Self {
        let end = buffer.len();
        Self {
            buffer,
            start: start.min(end),
            end,
        }
    }

    /// The unconsumed characters.
    pub fn remaining(&self) -> &[char] {
        &self.buffer.as_chars()[self.start..self.end]
    }

    /// Number of unconsumed characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn first_char(&self) -> Option<char> {
        self.remaining().first().copied()
    }

    /// Consumes `count` characters.
    pub fn advance(&mut self, count: usize) {
        debug_assert!(count <= self.len());
        self.start += count;
    }

    /// Gives back `count` previously consumed characters.
    pub fn retreat(&mut self, count: usize) {
        debug_assert!(count <= self.start);
        self.start -= count;
    }

    /// Shared prefix length between the unconsumed key and `label`.
    pub fn shared_prefix_len(&self, label: &Label) -> usize {
        shared_prefix_len(self.remaining(), label.chars())
    }

    /// A label covering the unconsumed key minus its first `skip` characters.
    pub fn remaining_label(&self, skip: usize) -> RadixTreeResult<Label> {
        Label::new(self.buffer.clone(), self.start + skip, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &str) -> Label {
        let buffer = KeyBuffer::new(s.chars().collect::<Vec<_>>());
        let len = buffer.len();
        Label::new(buffer, 0, len).unwrap()
    }

    #[test]
    fn test_shared_prefix_len() {
        let abc: Vec<char> = "abcdef".chars().collect();
        let abx: Vec<char> = "abx".chars().collect();
        assert_eq!(shared_prefix_len(&abc, &abx), 2);
        assert_eq!(shared_prefix_len(&abc, &abc[..3]), 3);
        assert_eq!(shared_prefix_len(&abc, &[]), 0);
    }

    #[test]
    fn test_terminated_buffer() {
        let buffer = KeyBuffer::terminated("cat", '$');
        assert_eq!(buffer.as_chars(), &['c', 'a', 't', '$']);
        assert_eq!(buffer.len(), 4);
    }

    #[test]
    fn test_prefix_and_suffix_share_buffer() {
        let whole = label("cart$");
        let prefix = whole.prefix(2).unwrap();
        let suffix = whole.suffix(2).unwrap();

        assert_eq!(prefix.to_string(), "ca");
        assert_eq!(suffix.to_string(), "rt$");
        assert!(prefix.buffer().ptr_eq(whole.buffer()));
        assert!(suffix.buffer().ptr_eq(whole.buffer()));
        assert_eq!(suffix.start(), 2);
        assert_eq!(suffix.end(), 5);
    }

    #[test]
    fn test_label_bounds_checked() {
        let buffer = KeyBuffer::terminated("ab", '$');
        assert!(Label::new(buffer.clone(), 2, 1).is_err());
        assert!(Label::new(buffer, 0, 4).is_err());
    }

    #[test]
    fn test_joined_after() {
        let whole = label("cart$");
        let parent = whole.prefix(3).unwrap().suffix(2).unwrap(); // "r"
        let child = whole.suffix(3).unwrap(); // "t$"

        let joined = child.joined_after(&parent).unwrap();
        assert_eq!(joined.to_string(), "rt$");
        assert!(joined.buffer().ptr_eq(child.buffer()));

        // A parent whose characters differ from what precedes the child
        let stranger = label("x");
        assert!(child.joined_after(&stranger).unwrap_err().is_invariant_violation());
    }

    #[test]
    fn test_key_cursor_advance_and_retreat() {
        let mut cursor = KeyCursor::new(KeyBuffer::terminated("cart", '$'));
        assert_eq!(cursor.len(), 5);

        cursor.advance(2);
        assert_eq!(cursor.first_char(), Some('r'));
        assert_eq!(cursor.shared_prefix_len(&label("rx")), 1);
        assert_eq!(cursor.remaining_label(1).unwrap().to_string(), "t$");

        cursor.retreat(2);
        assert_eq!(cursor.remaining(), &['c', 'a', 'r', 't', '$']);
    }

    #[test]
    fn test_key_cursor_starting_at() {
        let cursor = KeyCursor::starting_at(KeyBuffer::terminated("banana", '$'), 2);
        assert_eq!(cursor.remaining().iter().collect::<String>(), "nana$");

        let label = cursor.remaining_label(0).unwrap();
        assert_eq!(label.start(), 2);
    }
}
