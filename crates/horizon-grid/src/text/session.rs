//! Offset-shifting edit sessions.

use std::ops::Range;

use crate::error::{GridError, Result};

use super::buffer::TextBuffer;

/// Applies one batch of edits to a buffer.
///
/// Offsets and ranges are given in coordinates of the text as it was parsed.
/// The session keeps the net length change of everything applied so far
/// (`right_shift`) and moves each edit by it, so edits must arrive in
/// ascending offset order. A session also carries a working copy of the
/// format, handed back by [`finish`](Self::finish) for the owner to keep when
/// the batch succeeds.
pub struct UpdateSession<'a, B: TextBuffer + ?Sized, F> {
    buffer: &'a mut B,
    format: F,
    right_shift: isize,
    /// Original offset the next edit may start at.
    cursor: usize,
    edits: usize,
}

impl<'a, B: TextBuffer + ?Sized, F> UpdateSession<'a, B, F> {
    /// Start a session over `buffer`.
    pub fn new(buffer: &'a mut B, format: F) -> Self {
        Self {
            buffer,
            format,
            right_shift: 0,
            cursor: 0,
            edits: 0,
        }
    }

    /// Net characters added (positive) or removed (negative) so far.
    pub fn right_shift(&self) -> isize {
        self.right_shift
    }

    /// Number of edits applied.
    pub fn edit_count(&self) -> usize {
        self.edits
    }

    /// The session's format.
    pub fn format(&self) -> &F {
        &self.format
    }

    /// Mutable access to the session's format.
    pub fn format_mut(&mut self) -> &mut F {
        &mut self.format
    }

    /// Read the current text of an original range.
    pub fn slice(&self, range: Range<usize>) -> Result<String> {
        let range = self.shifted(range.start)?..self.shifted(range.end)?;
        self.buffer.slice(range)
    }

    /// Insert `text` at original offset `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<()> {
        self.replace(offset..offset, text)
    }

    /// Remove the original range `range`.
    pub fn delete(&mut self, range: Range<usize>) -> Result<()> {
        self.replace(range, "")
    }

    /// Replace the original range `range` with `text`.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> Result<()> {
        if range.start > range.end {
            return Err(GridError::text_edit(format!(
                "inverted range {}..{}",
                range.start, range.end
            )));
        }
        if range.start < self.cursor {
            return Err(GridError::text_edit(format!(
                "edit at {} precedes an earlier edit ending at {}",
                range.start, self.cursor
            )));
        }
        let start = self.shifted(range.start)?;
        let end = self.shifted(range.end)?;
        if range.is_empty() {
            if text.is_empty() {
                return Ok(());
            }
            self.buffer.insert(start, text)?;
        } else if text.is_empty() {
            self.buffer.delete(start..end)?;
        } else {
            self.buffer.replace(start..end, text)?;
        }

        let inserted = text.chars().count() as isize;
        let removed = range.len() as isize;
        self.right_shift += inserted - removed;
        self.cursor = range.end;
        self.edits += 1;
        Ok(())
    }

    /// End the session, returning its format.
    pub fn finish(self) -> F {
        self.format
    }

    fn shifted(&self, offset: usize) -> Result<usize> {
        offset
            .checked_add_signed(self.right_shift)
            .ok_or_else(|| GridError::text_edit(format!("offset {offset} shifted below zero")))
    }
}
