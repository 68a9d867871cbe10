//! In-memory editing surface
//!
//! A plain text buffer with byte-range selections that implements [`Host`].
//! The CLI uses it to toggle words in files; tests use it as a stand-in editor.

use std::cell::RefCell;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use crate::host::{Host, Notification, Subscription};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("selection {start}..{end} is outside the buffer ({len} bytes) or splits a character")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("selection {start}..{end} overlaps another selection")]
    Overlap { start: usize, end: usize },
}

/// Word characters: letters, digits and underscore
#[inline]
pub fn char_is_word(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[derive(Debug, Default)]
pub struct TextBuffer {
    text: String,
    selections: Vec<Range<usize>>,
    notifications: Vec<Notification>,
    opened: Vec<PathBuf>,
    commands: Rc<RefCell<Vec<&'static str>>>,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn selections(&self) -> &[Range<usize>] {
        &self.selections
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn opened_files(&self) -> &[PathBuf] {
        &self.opened
    }

    pub fn registered_commands(&self) -> Vec<&'static str> {
        self.commands.borrow().clone()
    }

    /// Add a selection; an empty range is a bare cursor
    pub fn add_selection(&mut self, range: Range<usize>) -> Result<(), SelectionError> {
        let Range { start, end } = range;
        if start > end
            || end > self.text.len()
            || !self.text.is_char_boundary(start)
            || !self.text.is_char_boundary(end)
        {
            return Err(SelectionError::OutOfBounds {
                start,
                end,
                len: self.text.len(),
            });
        }
        // Cursors are compared by the word they will expand to
        let span = self.toggle_span(start..end);
        let overlaps = self.selections.iter().any(|other| {
            let other = self.toggle_span(other.clone());
            (span.start < other.end && other.start < span.end) || span.start == other.start
        });
        if overlaps {
            return Err(SelectionError::Overlap { start, end });
        }

        let position = self
            .selections
            .iter()
            .position(|other| other.start > start)
            .unwrap_or(self.selections.len());
        self.selections.insert(position, start..end);
        Ok(())
    }

    /// Text a toggle will replace: the selection, or the word under a cursor
    fn toggle_span(&self, range: Range<usize>) -> Range<usize> {
        if range.is_empty() { self.word_at(range.start) } else { range }
    }

    /// Span of the word touching `offset`; empty when no word character is adjacent
    fn word_at(&self, offset: usize) -> Range<usize> {
        let start = self.text[..offset]
            .char_indices()
            .rev()
            .take_while(|&(_, ch)| char_is_word(ch))
            .last()
            .map_or(offset, |(index, _)| index);
        let end = self.text[offset..]
            .char_indices()
            .find(|&(_, ch)| !char_is_word(ch))
            .map_or(self.text.len(), |(index, _)| offset + index);
        start..end
    }
}

impl Host for TextBuffer {
    fn selection_count(&self) -> usize {
        self.selections.len()
    }

    fn selected_text(&self, index: usize) -> String {
        self.text[self.selections[index].clone()].to_string()
    }

    fn select_word(&mut self, index: usize) {
        let word = self.word_at(self.selections[index].start);
        debug!(index, start = word.start, end = word.end, "Selected word under cursor");
        self.selections[index] = word;
    }

    fn insert_text(&mut self, index: usize, text: &str, select: bool) {
        let old = self.selections[index].clone();
        self.text.replace_range(old.clone(), text);

        let new_end = old.start + text.len();
        // Later selections move by the same delta; one swallowed by an expanded
        // word collapses onto the end of the replacement
        let shift = |offset: usize| offset.max(old.end) - old.end + new_end;
        for other in self.selections.iter_mut().skip(index + 1) {
            *other = shift(other.start)..shift(other.end);
        }
        self.selections[index] = if select { old.start..new_end } else { new_end..new_end };
    }

    fn open_file(&mut self, path: &Path) -> io::Result<()> {
        self.opened.push(path.to_path_buf());
        Ok(())
    }

    fn register_command(&mut self, name: &'static str) -> Subscription {
        self.commands.borrow_mut().push(name);
        let commands = Rc::clone(&self.commands);
        Subscription::new(move || commands.borrow_mut().retain(|registered| *registered != name))
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_at_cursor_positions() {
        let buffer = TextBuffer::new("foo bar_baz(qux)");

        assert_eq!(buffer.word_at(0), 0..3);
        assert_eq!(buffer.word_at(3), 0..3);
        assert_eq!(buffer.word_at(6), 4..11);
        assert_eq!(buffer.word_at(11), 4..11);
        assert_eq!(buffer.word_at(16), 16..16);
    }

    #[test]
    fn test_word_at_multibyte() {
        let buffer = TextBuffer::new("é vrai");
        assert_eq!(buffer.word_at(0), 0..2);
        assert_eq!(buffer.word_at(5), 3..7);
    }

    #[test]
    fn test_add_selection_rejects_bad_ranges() {
        let mut buffer = TextBuffer::new("héllo world");

        assert!(matches!(buffer.add_selection(0..50), Err(SelectionError::OutOfBounds { .. })));
        assert!(matches!(buffer.add_selection(2..3), Err(SelectionError::OutOfBounds { .. })));

        buffer.add_selection(7..12).unwrap();
        assert!(matches!(buffer.add_selection(9..10), Err(SelectionError::Overlap { .. })));
        assert!(matches!(buffer.add_selection(7..7), Err(SelectionError::Overlap { .. })));

        buffer.add_selection(0..6).unwrap();
        assert_eq!(buffer.selections(), [0..6, 7..12]);
    }

    #[test]
    fn test_cursors_in_same_word_rejected() {
        let mut buffer = TextBuffer::new("obj.GET(key)");
        buffer.add_selection(5..5).unwrap();

        assert!(matches!(buffer.add_selection(6..6), Err(SelectionError::Overlap { .. })));
        assert!(matches!(buffer.add_selection(4..7), Err(SelectionError::Overlap { .. })));
        buffer.add_selection(9..9).unwrap();
        assert_eq!(buffer.selections(), [5..5, 9..9]);
    }

    #[test]
    fn test_insert_text_shifts_later_selections() {
        let mut buffer = TextBuffer::new("on on on");
        buffer.add_selection(0..2).unwrap();
        buffer.add_selection(3..5).unwrap();
        buffer.add_selection(6..8).unwrap();

        buffer.insert_text(0, "off", true);
        assert_eq!(buffer.selections(), [0..3, 4..6, 7..9]);

        buffer.insert_text(1, "x", false);
        assert_eq!(buffer.text(), "off x on");
        assert_eq!(buffer.selections(), [0..3, 5..5, 6..8]);
    }

    #[test]
    fn test_select_word_expands_cursor() {
        let mut buffer = TextBuffer::new("a.isVisible()");
        buffer.add_selection(5..5).unwrap();

        buffer.select_word(0);
        assert_eq!(buffer.selected_text(0), "isVisible");
    }
}
