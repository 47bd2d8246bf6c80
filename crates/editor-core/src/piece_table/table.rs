use std::ops::{AddAssign, SubAssign};

#[derive(Debug)]
pub struct PieceTable {
    /// Text the table was built (or last loaded) with. Never mutated afterwards.
    original: String,
    /// Append-only store for inserted text. Earlier pieces index into it,
    /// so it only ever grows, except when undo drops an insert's tail.
    added: String,
    /// Ordered list of pieces describing the visible document.
    pieces: Vec<crate::piece_table::piece::Piece>,
    total_length: usize,

    history: crate::history::CommandLog,
}

/*

====================================
========= CREATION METHOD ==========
====================================

*/

impl PieceTable {
    #[must_use]
    pub fn new(initial: &str) -> Self {
        Self::with_capacity(initial, crate::piece_table::BASELINE_CAPACITY)
    }

    /// Same as [`PieceTable::new`], preallocating `capacity` bytes for inserted text.
    #[must_use]
    pub fn with_capacity(initial: &str, capacity: usize) -> Self {
        let mut pieces = Vec::new();

        if !initial.is_empty() {
            pieces.push(crate::piece_table::piece::Piece::new(
                crate::enums::BufferKind::Original,
                0,
                initial.len(),
            ));
        }

        Self {
            original: initial.to_owned(),
            added: String::with_capacity(capacity),
            pieces,
            total_length: initial.len(),
            history: crate::history::CommandLog::new(),
        }
    }
}

/*

====================================
========= INLINE METHODS  ==========
====================================

*/

impl PieceTable {
    /// Total document length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.total_length
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_length == 0
    }

    #[inline]
    #[must_use]
    pub fn pieces(&self) -> &[crate::piece_table::piece::Piece] {
        &self.pieces
    }

    #[inline]
    #[must_use]
    pub fn added_len(&self) -> usize {
        self.added.len()
    }

    #[inline]
    #[must_use]
    pub fn history(&self) -> &crate::history::CommandLog {
        &self.history
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Finds the piece holding `pos` and the offset inside it.
    ///
    /// A position on a boundary resolves to the end of the earlier piece.
    /// Past the last piece this returns `(pieces.len(), 0)`.
    #[inline]
    fn locate(&self, mut pos: usize) -> (usize, usize) {
        for (idx, piece) in self.pieces.iter().enumerate() {
            if pos <= piece.length {
                return (idx, pos);
            }

            pos.sub_assign(piece.length);
        }

        (self.pieces.len(), 0)
    }

    #[inline]
    fn store(&self, origin: crate::enums::BufferKind) -> &str {
        match origin {
            crate::enums::BufferKind::Original => &self.original,
            crate::enums::BufferKind::Add => &self.added,
        }
    }

    #[inline]
    fn piece_text(&self, piece: &crate::piece_table::piece::Piece) -> &str {
        &self.store(piece.origin)[piece.start..piece.end()]
    }

    /// Whether `pos` sits between two characters of the logical text.
    #[must_use]
    pub fn is_char_boundary(&self, pos: usize) -> bool {
        if pos == 0 || pos >= self.total_length {
            return pos <= self.total_length;
        }

        let (idx, offset) = self.locate(pos);

        match self.pieces.get(idx) {
            // Piece edges always fall on boundaries.
            Some(piece) if offset < piece.length => self
                .store(piece.origin)
                .is_char_boundary(piece.start + offset),
            _ => true,
        }
    }

    /// Clamps `pos` to `[0, len]` and snaps it down onto a character boundary.
    #[must_use]
    pub fn clamp(&self, pos: usize) -> usize {
        let mut pos = pos.min(self.total_length);

        while !self.is_char_boundary(pos) {
            pos.sub_assign(1);
        }

        pos
    }

    /// The boundary one character before `pos` (or 0).
    #[must_use]
    pub fn prev_boundary(&self, pos: usize) -> usize {
        let mut pos = self.clamp(pos);

        if pos == 0 {
            return 0;
        }

        pos.sub_assign(1);

        while !self.is_char_boundary(pos) {
            pos.sub_assign(1);
        }

        pos
    }

    /// The boundary one character after `pos` (or `len`).
    #[must_use]
    pub fn next_boundary(&self, pos: usize) -> usize {
        let mut pos = self.clamp(pos);

        if pos >= self.total_length {
            return self.total_length;
        }

        pos.add_assign(1);

        while !self.is_char_boundary(pos) {
            pos.add_assign(1);
        }

        pos
    }

    /// Panics if the piece list no longer adds up to `total_length`.
    #[inline]
    fn assert_consistent(&self) {
        debug_assert_eq!(
            self.pieces.iter().map(|p| p.length).sum::<usize>(),
            self.total_length,
            "piece lengths no longer sum to the document length"
        );
    }
}

/*

=====================================
========= INSERT / DELETE  ==========
=====================================

*/

impl PieceTable {
    /// Replaces the piece at `idx` with one that also spans `len` more bytes,
    /// if it is the tail of the `added` store. Keeps the list short while typing.
    fn try_extend(&mut self, idx: usize, offset: usize, len: usize) -> bool {
        let Some(piece) = self.pieces.get(idx) else {
            return false;
        };

        if offset == piece.length
            && piece.origin == crate::enums::BufferKind::Add
            && piece.end() == self.added.len()
        {
            self.pieces[idx] =
                crate::piece_table::piece::Piece::new(piece.origin, piece.start, piece.length + len);

            return true;
        }

        false
    }

    /// `pos` must already be clamped onto a boundary.
    fn insert_without_history(&mut self, pos: usize, text: &str) {
        let (idx, offset) = self.locate(pos);

        if !self.try_extend(idx, offset, text.len()) {
            let new_piece = crate::piece_table::piece::Piece::new(
                crate::enums::BufferKind::Add,
                self.added.len(),
                text.len(),
            );

            if idx == self.pieces.len() {
                self.pieces.push(new_piece);
            } else if offset == 0 {
                self.pieces.insert(idx, new_piece);
            } else if offset == self.pieces[idx].length {
                self.pieces.insert(idx + 1, new_piece);
            } else {
                let piece = self.pieces[idx];

                self.pieces.splice(
                    idx..=idx,
                    [
                        piece.slice(0, offset),
                        new_piece,
                        piece.slice(offset, piece.length),
                    ],
                );
            }
        }

        self.added.push_str(text);
        self.total_length.add_assign(text.len());
        self.assert_consistent();
    }

    /// `[start, end)` must already be clamped, non-empty and on boundaries.
    fn remove_without_history(&mut self, start: usize, end: usize) {
        let mut kept = Vec::with_capacity(self.pieces.len() + 1);
        let mut piece_start = 0;

        for piece in &self.pieces {
            let piece_end = piece_start + piece.length;

            if piece_end <= start || piece_start >= end {
                kept.push(*piece);
            } else {
                // Straddles `start`: keep the head.
                if piece_start < start {
                    kept.push(piece.slice(0, start - piece_start));
                }
                // Straddles `end`: keep the tail.
                if piece_end > end {
                    kept.push(piece.slice(end - piece_start, piece.length));
                }
            }

            piece_start = piece_end;
        }

        self.pieces = kept;
        self.total_length.sub_assign(end - start);
        self.assert_consistent();
    }

    fn execute(&mut self, command: &crate::history::Command) {
        match command {
            crate::history::Command::Insert { position, text, .. } => {
                self.insert_without_history(*position, text);
            }
            crate::history::Command::Delete { start, end, .. } => {
                self.remove_without_history(*start, *end);
            }
        }
    }

    fn revert(&mut self, command: &crate::history::Command) {
        match command {
            crate::history::Command::Insert {
                text,
                pieces_before,
                added_len_before,
                ..
            } => {
                assert_eq!(
                    self.added.len(),
                    added_len_before + text.len(),
                    "added store does not end with the insert being undone"
                );

                self.added.truncate(*added_len_before);
                self.pieces.clone_from(pieces_before);
                self.total_length.sub_assign(text.len());
            }
            crate::history::Command::Delete {
                pieces_before,
                total_length_before,
                ..
            } => {
                self.pieces.clone_from(pieces_before);
                self.total_length = *total_length_before;
            }
        }

        self.assert_consistent();
    }

    /// Inserts `text` at `pos` (clamped) as one undoable command.
    ///
    /// Returns the byte range the text now occupies, or `None` when `text` is empty.
    pub fn insert(&mut self, pos: usize, text: &str) -> Option<std::ops::Range<usize>> {
        if text.is_empty() {
            return None;
        }

        let position = self.clamp(pos);
        let command = crate::history::Command::Insert {
            position,
            text: text.to_owned(),
            pieces_before: self.pieces.clone(),
            added_len_before: self.added.len(),
        };

        self.execute(&command);
        self.history.record(command);

        tracing::trace!(
            position,
            len = text.len(),
            pieces = self.pieces.len(),
            "piece table insert"
        );

        Some(position..position + text.len())
    }

    /// Removes `[start, end)` as one undoable command.
    ///
    /// A no-op when `start >= end` or `start` is past the end; `end` is clamped.
    /// Returns the range actually removed.
    pub fn remove(&mut self, start: usize, end: usize) -> Option<std::ops::Range<usize>> {
        if start >= end || start >= self.total_length {
            return None;
        }

        let start = self.clamp(start);
        let end = self.clamp(end);

        if start >= end {
            return None;
        }

        let command = crate::history::Command::Delete {
            start,
            end,
            pieces_before: self.pieces.clone(),
            total_length_before: self.total_length,
        };

        self.execute(&command);
        self.history.record(command);

        tracing::trace!(
            start,
            end,
            pieces = self.pieces.len(),
            "piece table remove"
        );

        Some(start..end)
    }
}

/*

====================================
=========== UNDO / REDO ============
====================================

*/

impl PieceTable {
    /// Reverts the most recent command.
    ///
    /// Returns where the caret belongs afterwards, or `None` if there was nothing to undo.
    pub fn undo(&mut self) -> Option<usize> {
        let command = self.history.pop_undo()?;

        self.revert(&command);

        let caret = command.caret_after_undo();

        tracing::debug!(caret, remaining = self.history.undo_len(), "undo");
        self.history.push_redo(command);

        Some(caret)
    }

    /// Re-applies the most recently undone command.
    pub fn redo(&mut self) -> Option<usize> {
        let command = self.history.pop_redo()?;

        if let crate::history::Command::Insert {
            added_len_before, ..
        } = &command
        {
            // Redo must append at exactly the offset the snapshot recorded.
            assert_eq!(self.added.len(), *added_len_before);
        }

        self.execute(&command);

        let caret = command.caret_after_redo();

        tracing::debug!(caret, remaining = self.history.redo_len(), "redo");
        self.history.push_undo(command);

        Some(caret)
    }
}

/*

====================================
========== MISCELLANEOUS ===========
====================================

*/

impl PieceTable {
    /// Yields the text of every piece in order without allocating.
    pub fn chunks(&self) -> impl Iterator<Item = &str> + '_ {
        self.pieces.iter().map(move |piece| self.piece_text(piece))
    }

    /// Materialises the whole document. O(len): call once per change, not per frame.
    #[must_use]
    pub fn get_text(&self) -> String {
        let mut text = String::with_capacity(self.total_length);

        for chunk in self.chunks() {
            text.push_str(chunk);
        }

        text
    }

    /// The text of `[start, end)`, both clamped, without materialising the rest.
    #[must_use]
    pub fn get_text_in_range(&self, start: usize, end: usize) -> String {
        let start = self.clamp(start);
        let end = self.clamp(end);

        if start >= end {
            return String::new();
        }

        let mut text = String::with_capacity(end - start);
        let mut piece_start = 0;

        for piece in &self.pieces {
            let piece_end = piece_start + piece.length;

            if piece_start < end && piece_end > start {
                let from = start.saturating_sub(piece_start);
                let to = end.min(piece_end) - piece_start;

                text.push_str(self.piece_text(&piece.slice(from, to)));
            }

            if piece_end >= end {
                break;
            }

            piece_start = piece_end;
        }

        text
    }
}

/*

=================
===== RESET =====
=================

*/

impl PieceTable {
    /// Replaces the whole document and forgets all history.
    ///
    /// The old piece boundaries mean nothing for the new text, so every
    /// recorded command is dropped along with them.
    pub fn load_content(&mut self, text: &str) {
        text.clone_into(&mut self.original);
        self.added.clear();

        if self.added.capacity() > crate::piece_table::BASELINE_CAPACITY {
            self.added.shrink_to(crate::piece_table::BASELINE_CAPACITY);
        }

        self.pieces.clear();

        if !text.is_empty() {
            self.pieces.push(crate::piece_table::piece::Piece::new(
                crate::enums::BufferKind::Original,
                0,
                text.len(),
            ));
        }

        self.total_length = text.len();
        self.history.clear();

        tracing::debug!(len = text.len(), "piece table reloaded");
    }
}
