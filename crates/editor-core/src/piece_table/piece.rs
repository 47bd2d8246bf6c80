/// A run of the logical document: `length` bytes of `origin`, starting at `start`.
///
/// Pieces are never edited in place. Splitting or extending a run replaces
/// the piece with new ones, so a snapshot of the piece list stays valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    pub origin: crate::enums::BufferKind,
    pub start: usize,
    pub length: usize,
}

impl Piece {
    #[inline]
    #[must_use]
    pub fn new(origin: crate::enums::BufferKind, start: usize, length: usize) -> Self {
        Self {
            origin,
            start,
            length,
        }
    }

    #[inline]
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The sub-run `[from, to)` measured from the start of this piece.
    #[inline]
    #[must_use]
    pub fn slice(&self, from: usize, to: usize) -> Self {
        debug_assert!(from <= to && to <= self.length, "piece slice out of range");

        Self {
            origin: self.origin,
            start: self.start + from,
            length: to - from,
        }
    }
}

#[cfg(test)]
mod piece_tests {
    use super::*;
    use crate::enums::BufferKind;

    #[test]
    fn slice_keeps_origin_and_shifts_start() {
        let piece = Piece::new(BufferKind::Add, 10, 6);
        let middle = piece.slice(2, 5);

        assert_eq!(middle, Piece::new(BufferKind::Add, 12, 3));
        assert_eq!(middle.end(), 15);
    }

    #[test]
    fn zero_length_slice_is_empty() {
        let piece = Piece::new(BufferKind::Original, 0, 4);

        assert!(piece.slice(4, 4).is_empty());
    }
}
