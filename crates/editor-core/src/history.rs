/// A committed, reversible edit.
///
/// Each variant keeps the piece list as it was *before* the edit, so undo is
/// an exact restoration rather than a computed inverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Insert {
        /// Where the text went in. Already clamped and on a char boundary.
        position: usize,
        text: String,
        pieces_before: Vec<crate::piece_table::piece::Piece>,
        /// Length of the `added` store before `text` was appended.
        added_len_before: usize,
    },
    Delete {
        start: usize,
        /// Exclusive. Already clamped to the document length.
        end: usize,
        pieces_before: Vec<crate::piece_table::piece::Piece>,
        total_length_before: usize,
    },
}

impl Command {
    /// The caret index to land on after this command is undone.
    #[inline]
    #[must_use]
    pub fn caret_after_undo(&self) -> usize {
        match self {
            Command::Insert { position, .. } => *position,
            Command::Delete { end, .. } => *end,
        }
    }

    /// The caret index to land on after this command is (re)applied.
    #[inline]
    #[must_use]
    pub fn caret_after_redo(&self) -> usize {
        match self {
            Command::Insert { position, text, .. } => position + text.len(),
            Command::Delete { start, .. } => *start,
        }
    }
}

/// Undo and redo stacks of [`Command`]s.
///
/// Branching histories are not kept: recording a new command drops every
/// redo entry.
#[derive(Debug, Default)]
pub struct CommandLog {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
}

impl CommandLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a freshly committed edit. Any new action invalidates the redo stack.
    pub fn record(&mut self, command: Command) {
        self.redo_stack.clear();
        self.undo_stack.push(command);
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    #[inline]
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn pop_undo(&mut self) -> Option<Command> {
        self.undo_stack.pop()
    }

    pub fn pop_redo(&mut self) -> Option<Command> {
        self.redo_stack.pop()
    }

    /// Parks an undone command so it can be redone.
    pub fn push_redo(&mut self, command: Command) {
        self.redo_stack.push(command);
    }

    /// Puts a redone command back on the undo stack without touching redo.
    pub fn push_undo(&mut self, command: Command) {
        self.undo_stack.push(command);
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
