//! A resumable reader over buffered bytes.
//!
//! The transport may keep received bytes in a single buffer or in several
//! fixed-size segments. [`ByteCursor`] scans both the same way: delimiter
//! searches and reads cross segment boundaries transparently. Spans that lie
//! inside one segment are returned borrowed; spans that straddle segments are
//! copied into an owned buffer.
//!
//! Reads that cannot be satisfied return `None` and leave the cursor where it
//! was, so a filter can bail out with "need more data" and be retried later
//! over the same bytes plus whatever arrived in between.

use std::borrow::Cow;
use std::iter;

/// A saved read position of a [`ByteCursor`], see [`ByteCursor::position`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Position {
    segment: usize,
    offset: usize,
    consumed: usize,
    remaining: usize,
}

/// Reader over one or more borrowed byte segments.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    segments: Vec<&'a [u8]>,
    /// Index of the segment holding the next unread byte
    segment: usize,
    /// Offset of the next unread byte within `segment`
    offset: usize,
    consumed: usize,
    remaining: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor over `segments`, in order. Empty segments are skipped.
    pub fn new<I>(segments: I) -> Self
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let segments: Vec<&'a [u8]> = segments.into_iter().filter(|segment| !segment.is_empty()).collect();
        let remaining = segments.iter().map(|segment| segment.len()).sum();
        Self { segments, segment: 0, offset: 0, consumed: 0, remaining }
    }

    /// Number of unread bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Number of bytes read or skipped since the cursor was created.
    #[inline]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// Returns true if all unread bytes live in one segment.
    pub fn is_single_segment(&self) -> bool {
        self.segments.len().saturating_sub(self.segment) <= 1
    }

    /// Returns the next `len` bytes without moving the cursor.
    pub fn peek(&self, len: usize) -> Option<Cow<'a, [u8]>> {
        if len > self.remaining {
            return None;
        }

        let head = self.head();
        if head.len() >= len {
            return Some(Cow::Borrowed(&head[..len]));
        }

        Some(Cow::Owned(self.bytes().take(len).collect()))
    }

    /// Returns the next `len` bytes and moves past them.
    pub fn read(&mut self, len: usize) -> Option<Cow<'a, [u8]>> {
        let span = self.peek(len)?;
        self.advance(len);
        Some(span)
    }

    /// Reads up to the first occurrence of `delimiter`.
    ///
    /// On success the span before the delimiter is returned and the cursor is
    /// moved past the delimiter. If the delimiter is not found the cursor does
    /// not move.
    pub fn try_read_to(&mut self, delimiter: &[u8]) -> Option<Cow<'a, [u8]>> {
        let index = self.find(delimiter)?;
        let span = self.peek(index)?;
        self.advance(index + delimiter.len());
        Some(span)
    }

    /// Returns every unread byte without moving the cursor.
    pub fn rest(&self) -> Cow<'a, [u8]> {
        self.peek(self.remaining).unwrap_or(Cow::Borrowed(&[]))
    }

    /// Offset of the first occurrence of `delimiter` from the current position.
    pub fn find(&self, delimiter: &[u8]) -> Option<usize> {
        if delimiter.is_empty() {
            return Some(0);
        }

        if delimiter.len() > self.remaining {
            return None;
        }

        if self.is_single_segment() {
            return self.head().windows(delimiter.len()).position(|window| window == delimiter);
        }

        let mut bytes = self.bytes();
        for index in 0..=(self.remaining - delimiter.len()) {
            if bytes.clone().take(delimiter.len()).eq(delimiter.iter().copied()) {
                return Some(index);
            }
            bytes.next();
        }

        None
    }

    /// Skips `len` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `len` is larger than [`ByteCursor::remaining`].
    pub fn advance(&mut self, mut len: usize) {
        assert!(len <= self.remaining, "cannot advance past `remaining`: {} <= {}", len, self.remaining);

        self.remaining -= len;
        self.consumed += len;

        while len > 0 {
            let available = self.segments[self.segment].len() - self.offset;
            if len < available {
                self.offset += len;
                return;
            }
            len -= available;
            self.segment += 1;
            self.offset = 0;
        }
    }

    /// Captures the current read position.
    pub fn position(&self) -> Position {
        Position { segment: self.segment, offset: self.offset, consumed: self.consumed, remaining: self.remaining }
    }

    /// Moves back to a position captured from this cursor.
    pub fn reset(&mut self, position: Position) {
        let Position { segment, offset, consumed, remaining } = position;
        self.segment = segment;
        self.offset = offset;
        self.consumed = consumed;
        self.remaining = remaining;
    }

    /// Unread part of the current segment.
    fn head(&self) -> &'a [u8] {
        self.segments.get(self.segment).map_or(&[][..], |&segment| &segment[self.offset..])
    }

    fn bytes(&self) -> impl Iterator<Item = u8> + Clone + '_ {
        let tail = self.segments.get(self.segment + 1..).unwrap_or_default();
        iter::once(self.head()).chain(tail.iter().copied()).flat_map(|segment| segment.iter().copied())
    }
}

impl<'a> From<&'a [u8]> for ByteCursor<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new([bytes])
    }
}
