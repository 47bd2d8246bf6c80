/// Which of the two backing stores a [`Piece`](crate::piece_table::piece::Piece) points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferKind {
    /// The text the table was constructed (or last loaded) with. Never mutated.
    Original,
    /// The append-only store holding every inserted run of text.
    Add,
}

/// A single-step cursor motion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
}

impl Motion {
    /// Vertical motions keep the sticky column alive; everything else resets it.
    #[inline]
    #[must_use]
    pub fn is_vertical(self) -> bool {
        matches!(self, Motion::Up | Motion::Down)
    }
}
