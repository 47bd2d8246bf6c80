/// A location in the document, both as a flat byte index and as (row, column).
///
/// `column` is a byte offset within the row. [`TextBuffer::position_to_index`]
/// reads only `row` and `column`.
///
/// [`TextBuffer::position_to_index`]: crate::text::TextBuffer::position_to_index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde_support", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferPosition {
    pub row: usize,
    pub column: usize,
    pub index: usize,
}

impl BufferPosition {
    /// A position addressed by row and column only, for [`TextBuffer::position_to_index`].
    ///
    /// [`TextBuffer::position_to_index`]: crate::text::TextBuffer::position_to_index
    #[must_use]
    pub fn at(row: usize, column: usize) -> Self {
        Self {
            row,
            column,
            index: 0,
        }
    }
}

/// The single logical caret of an editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Flat byte position, kept within `[0, len]` on a char boundary.
    pub index: usize,
    /// The column vertical motion aims for. Used to maintain horizontal
    /// position when moving vertically across shorter lines.
    pub preferred_column: Option<usize>,
}

impl Cursor {
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self {
            index,
            preferred_column: None,
        }
    }

    /// Re-clamps after the text underneath changed.
    pub fn clamp(&mut self, buffer: &crate::text::TextBuffer) {
        self.index = buffer.clamp(self.index);
    }

    /// Jumps to `index` (clamped) and forgets the sticky column.
    pub fn set_index(&mut self, buffer: &crate::text::TextBuffer, index: usize) {
        self.index = buffer.clamp(index);
        self.preferred_column = None;
    }

    #[must_use]
    pub fn position(&self, buffer: &crate::text::TextBuffer) -> BufferPosition {
        buffer.index_to_position(self.index)
    }

    /// Applies `motion`. Returns whether the index changed.
    pub fn apply(&mut self, buffer: &crate::text::TextBuffer, motion: crate::enums::Motion) -> bool {
        let before = self.index;

        match motion {
            crate::enums::Motion::Left => self.move_left(buffer),
            crate::enums::Motion::Right => self.move_right(buffer),
            crate::enums::Motion::Up => self.move_up(buffer),
            crate::enums::Motion::Down => self.move_down(buffer),
            crate::enums::Motion::LineStart => self.move_line_start(buffer),
            crate::enums::Motion::LineEnd => self.move_line_end(buffer),
        }

        if !motion.is_vertical() {
            self.preferred_column = None;
        }

        self.index != before
    }

    pub fn move_left(&mut self, buffer: &crate::text::TextBuffer) {
        self.index = buffer.prev_boundary(self.index);
    }

    pub fn move_right(&mut self, buffer: &crate::text::TextBuffer) {
        self.index = buffer.next_boundary(self.index);
    }

    pub fn move_up(&mut self, buffer: &crate::text::TextBuffer) {
        let pos = buffer.index_to_position(self.index);

        if pos.row == 0 {
            return;
        }

        self.move_vertically(buffer, pos, pos.row - 1);
    }

    pub fn move_down(&mut self, buffer: &crate::text::TextBuffer) {
        let pos = buffer.index_to_position(self.index);

        if pos.row + 1 >= buffer.line_count() {
            return;
        }

        self.move_vertically(buffer, pos, pos.row + 1);
    }

    pub fn move_line_start(&mut self, buffer: &crate::text::TextBuffer) {
        let pos = buffer.index_to_position(self.index);

        if let Some(bounds) = buffer.line_bounds(pos.row) {
            self.index = bounds.start;
        }
    }

    pub fn move_line_end(&mut self, buffer: &crate::text::TextBuffer) {
        let pos = buffer.index_to_position(self.index);

        if let Some(bounds) = buffer.line_bounds(pos.row) {
            self.index = bounds.end;
        }
    }

    /// Lands on `min(line_start + column, line_end)` so a shorter target line
    /// clamps to its end instead of spilling onto the next one.
    fn move_vertically(
        &mut self,
        buffer: &crate::text::TextBuffer,
        from: BufferPosition,
        target_row: usize,
    ) {
        let Some(bounds) = buffer.line_bounds(target_row) else {
            return;
        };
        let column = self.preferred_column.unwrap_or(from.column);

        self.index = buffer.clamp(bounds.start.saturating_add(column).min(bounds.end));
        self.preferred_column = Some(column);
    }
}
