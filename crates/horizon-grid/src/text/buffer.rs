//! Editable text buffers.

use std::ops::Range;

use horizon_grid_core::Signal;
use ropey::Rope;

use crate::error::{GridError, Result};

/// A character-addressed text document.
///
/// Offsets and ranges count `char`s, not bytes.
pub trait TextBuffer {
    /// Length in characters.
    fn len_chars(&self) -> usize;

    /// The whole text.
    fn text(&self) -> String;

    /// The text in `range`.
    fn slice(&self, range: Range<usize>) -> Result<String>;

    /// Insert `text` at `offset`.
    fn insert(&mut self, offset: usize, text: &str) -> Result<()>;

    /// Remove the text in `range`.
    fn delete(&mut self, range: Range<usize>) -> Result<()>;

    /// Replace the text in `range` with `text`.
    fn replace(&mut self, range: Range<usize>, text: &str) -> Result<()> {
        let start = range.start;
        self.delete(range)?;
        self.insert(start, text)
    }

    /// Returns `true` if edits are rejected.
    fn is_read_only(&self) -> bool;

    /// Number of edits applied since creation.
    fn modification_count(&self) -> u64;

    /// Emitted with the new modification count after every edit.
    fn changed(&self) -> &Signal<u64>;
}

/// A [`TextBuffer`] backed by a rope.
pub struct RopeBuffer {
    rope: Rope,
    read_only: bool,
    modifications: u64,
    changed: Signal<u64>,
}

impl RopeBuffer {
    /// Create a buffer holding `text`.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            read_only: false,
            modifications: 0,
            changed: Signal::new(),
        }
    }

    /// Make the buffer read-only.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Toggle read-only mode.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// The underlying rope.
    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Number of lines, as counted by the rope.
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only {
            Err(GridError::ReadOnly)
        } else {
            Ok(())
        }
    }

    fn check_range(&self, range: &Range<usize>) -> Result<()> {
        let len = self.rope.len_chars();
        if range.start > range.end || range.end > len {
            return Err(GridError::text_edit(format!(
                "range {}..{} is outside the buffer (length {len})",
                range.start, range.end
            )));
        }
        Ok(())
    }

    fn modified(&mut self) {
        self.modifications += 1;
        self.changed.emit(self.modifications);
    }
}

impl Default for RopeBuffer {
    fn default() -> Self {
        Self::new("")
    }
}

impl TextBuffer for RopeBuffer {
    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn text(&self) -> String {
        self.rope.to_string()
    }

    fn slice(&self, range: Range<usize>) -> Result<String> {
        self.check_range(&range)?;
        Ok(self.rope.slice(range).to_string())
    }

    fn insert(&mut self, offset: usize, text: &str) -> Result<()> {
        self.check_writable()?;
        self.check_range(&(offset..offset))?;
        if text.is_empty() {
            return Ok(());
        }
        self.rope.insert(offset, text);
        self.modified();
        Ok(())
    }

    fn delete(&mut self, range: Range<usize>) -> Result<()> {
        self.check_writable()?;
        self.check_range(&range)?;
        if range.is_empty() {
            return Ok(());
        }
        self.rope.remove(range);
        self.modified();
        Ok(())
    }

    fn replace(&mut self, range: Range<usize>, text: &str) -> Result<()> {
        self.check_writable()?;
        self.check_range(&range)?;
        let start = range.start;
        if !range.is_empty() {
            self.rope.remove(range);
        }
        self.rope.insert(start, text);
        self.modified();
        Ok(())
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn modification_count(&self) -> u64 {
        self.modifications
    }

    fn changed(&self) -> &Signal<u64> {
        &self.changed
    }
}

impl std::fmt::Debug for RopeBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RopeBuffer")
            .field("len_chars", &self.rope.len_chars())
            .field("read_only", &self.read_only)
            .field("modifications", &self.modifications)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_offsets() {
        let mut buffer = RopeBuffer::new("ä,b");
        buffer.insert(1, "x").unwrap();
        assert_eq!(buffer.text(), "äx,b");
        buffer.replace(3..4, "cc").unwrap();
        assert_eq!(buffer.text(), "äx,cc");
        buffer.delete(0..1).unwrap();
        assert_eq!(buffer.slice(0..2).unwrap(), "x,");
        assert_eq!(buffer.modification_count(), 3);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let mut buffer = RopeBuffer::new("ab");
        assert!(matches!(buffer.insert(3, "x"), Err(GridError::TextEdit { .. })));
        assert!(buffer.delete(1..5).is_err());
        assert_eq!(buffer.modification_count(), 0);
    }

    #[test]
    fn test_read_only() {
        let mut buffer = RopeBuffer::new("ab").with_read_only(true);
        assert!(matches!(buffer.insert(0, "x"), Err(GridError::ReadOnly)));
        assert_eq!(buffer.text(), "ab");
    }

    #[test]
    fn test_changed_signal() {
        let mut buffer = RopeBuffer::new("");
        let seen = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
        let s = seen.clone();
        buffer.changed().connect(move |&count| s.lock().push(count));
        buffer.insert(0, "a").unwrap();
        buffer.insert(0, "").unwrap();
        buffer.insert(1, "b").unwrap();
        assert_eq!(*seen.lock(), vec![1, 2]);
    }
}
