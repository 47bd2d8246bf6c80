/// # The Core Philosophies of This API
///
/// - One owner: the `TextBuffer` owns the Piece Table and the Line Index so they
///   never drift apart. Every successful mutation marks the index dirty.
/// - Immutability for reads: queries take `&self`. The line index is rebuilt
///   lazily behind a `RefCell` on the first query after a mutation.
/// - Total functions: indices are clamped to `[0, len]` and snapped to char
///   boundaries instead of being rejected.
#[derive(Debug)]
pub struct TextBuffer {
    piece_table: crate::piece_table::table::PieceTable,
    line_index: std::cell::RefCell<crate::line_index::LineIndex>,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new("")
    }
}

/*

====================
===== CREATION =====
====================

*/

impl TextBuffer {
    #[must_use]
    pub fn new(initial: &str) -> Self {
        Self::with_capacity(initial, crate::piece_table::BASELINE_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(initial: &str, capacity: usize) -> Self {
        Self {
            piece_table: crate::piece_table::table::PieceTable::with_capacity(initial, capacity),
            line_index: std::cell::RefCell::new(crate::line_index::LineIndex::new()),
        }
    }

    /// Replaces the whole document. Undo and redo history are discarded.
    pub fn load_content(&mut self, text: &str) {
        self.piece_table.load_content(text);
        self.line_index.get_mut().invalidate();
    }
}

/*

==========================
===== INLINE METHODS =====
==========================

*/

impl TextBuffer {
    /// Total byte size of the document.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.piece_table.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.piece_table.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn piece_table(&self) -> &crate::piece_table::table::PieceTable {
        &self.piece_table
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.piece_table.can_undo()
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.piece_table.can_redo()
    }

    #[inline]
    #[must_use]
    pub fn clamp(&self, index: usize) -> usize {
        self.piece_table.clamp(index)
    }

    #[inline]
    #[must_use]
    pub fn prev_boundary(&self, index: usize) -> usize {
        self.piece_table.prev_boundary(index)
    }

    #[inline]
    #[must_use]
    pub fn next_boundary(&self, index: usize) -> usize {
        self.piece_table.next_boundary(index)
    }

    /// Borrows the line index, rebuilding it first if a mutation made it stale.
    fn fresh_index(&self) -> std::cell::Ref<'_, crate::line_index::LineIndex> {
        self.line_index
            .borrow_mut()
            .ensure_fresh_from_chunks(self.piece_table.chunks());

        self.line_index.borrow()
    }
}

/*

===========================
========= GETTERS =========
===========================

*/

impl TextBuffer {
    #[must_use]
    pub fn get_text(&self) -> String {
        self.piece_table.get_text()
    }

    #[must_use]
    pub fn get_text_in_range(&self, start: usize, end: usize) -> String {
        self.piece_table.get_text_in_range(start, end)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &str> + '_ {
        self.piece_table.chunks()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.fresh_index().line_count()
    }

    /// Content range of line `line_idx`, excluding its `'\n'`.
    #[must_use]
    pub fn line_bounds(&self, line_idx: usize) -> Option<std::ops::Range<usize>> {
        let index = self.fresh_index();

        Some(index.offset_of_line(line_idx)?..index.line_end(line_idx)?)
    }

    /// Line `line_idx` without its trailing `'\n'`; empty past the last line.
    #[must_use]
    pub fn get_line(&self, line_idx: usize) -> String {
        self.line_bounds(line_idx)
            .map(|range| self.piece_table.get_text_in_range(range.start, range.end))
            .unwrap_or_default()
    }

    /// Lines `[start_line, end_line)`, for reading just the visible viewport.
    #[must_use]
    pub fn lines(&self, start_line: usize, end_line: usize) -> Vec<String> {
        self.fresh_index()
            .lines(start_line, end_line)
            .map(|(_, range)| self.piece_table.get_text_in_range(range.start, range.end))
            .collect()
    }

    /// Flat index → (row, column), via binary search over the line starts.
    #[must_use]
    pub fn index_to_position(&self, index: usize) -> crate::cursor::BufferPosition {
        let index = self.clamp(index);
        let line_index = self.fresh_index();
        let row = line_index.line_of_offset(index);
        let line_start = line_index.line_starts()[row];

        crate::cursor::BufferPosition {
            row,
            column: index - line_start,
            index,
        }
    }

    /// (row, column) → flat index. Rows past the end resolve to the last
    /// row; the result is clamped to the document length.
    #[must_use]
    pub fn position_to_index(&self, pos: crate::cursor::BufferPosition) -> usize {
        let line_start = {
            let line_index = self.fresh_index();
            let row = pos.row.min(line_index.line_count() - 1);

            line_index.line_starts()[row]
        };

        self.clamp(line_start.saturating_add(pos.column))
    }
}

/*

========================================
========= INSERTION & DELETION =========
========================================

*/

impl TextBuffer {
    /// Inserts `text` at `pos` (clamped) as one undo step.
    pub fn insert(&mut self, pos: usize, text: &str) -> Option<std::ops::Range<usize>> {
        let inserted = self.piece_table.insert(pos, text);

        if inserted.is_some() {
            self.line_index.get_mut().invalidate();
        }

        inserted
    }

    /// Removes `[start, end)` as one undo step. Out-of-range input is a no-op.
    pub fn remove(&mut self, start: usize, end: usize) -> Option<std::ops::Range<usize>> {
        let removed = self.piece_table.remove(start, end);

        if removed.is_some() {
            self.line_index.get_mut().invalidate();
        }

        removed
    }
}

/*

===============================
========= UNDO & REDO =========
===============================

*/

impl TextBuffer {
    /// Returns where the caret belongs after undoing, if anything was undone.
    pub fn undo(&mut self) -> Option<usize> {
        let caret = self.piece_table.undo()?;

        self.line_index.get_mut().invalidate();

        Some(caret)
    }

    pub fn redo(&mut self) -> Option<usize> {
        let caret = self.piece_table.redo()?;

        self.line_index.get_mut().invalidate();

        Some(caret)
    }
}

impl std::fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for chunk in self.chunks() {
            f.write_str(chunk)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod text_buffer_getter_tests {
    use super::*;
    use crate::cursor::BufferPosition;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_get_line() {
        let buffer = TextBuffer::new("hello, there\nhaha\nwoah");

        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.get_line(0), "hello, there");
        assert_eq!(buffer.get_line(1), "haha");
        assert_eq!(buffer.get_line(2), "woah");
        assert_eq!(buffer.get_line(3), "");
    }

    #[test]
    fn test_lines_viewport() {
        let buffer = TextBuffer::new("a\nb\nc\nd");

        assert_eq!(buffer.lines(1, 3), vec!["b".to_string(), "c".to_string()]);
        assert_eq!(buffer.lines(3, 99), vec!["d".to_string()]);
        assert!(buffer.lines(7, 9).is_empty());
    }

    #[test]
    fn test_index_to_position() {
        let buffer = TextBuffer::new("ab\ncd\n");

        assert_eq!(buffer.index_to_position(0), BufferPosition { row: 0, column: 0, index: 0 });
        assert_eq!(buffer.index_to_position(2), BufferPosition { row: 0, column: 2, index: 2 });
        assert_eq!(buffer.index_to_position(4), BufferPosition { row: 1, column: 1, index: 4 });
        assert_eq!(buffer.index_to_position(6), BufferPosition { row: 2, column: 0, index: 6 });
        assert_eq!(buffer.index_to_position(60), BufferPosition { row: 2, column: 0, index: 6 });
    }

    #[test]
    fn test_position_to_index_clamps() {
        let buffer = TextBuffer::new("ab\ncd");

        assert_eq!(buffer.position_to_index(BufferPosition::at(1, 1)), 4);
        assert_eq!(buffer.position_to_index(BufferPosition::at(1, 40)), 5);
        assert_eq!(buffer.position_to_index(BufferPosition::at(9, 0)), 3);
    }

    #[test]
    fn test_display_matches_get_text() {
        let mut buffer = TextBuffer::new("Hello");

        buffer.insert(5, " World");
        assert_eq!(buffer.to_string(), buffer.get_text());
    }
}
