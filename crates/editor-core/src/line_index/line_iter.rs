/// Walks a range of lines of a fresh [`LineIndex`](crate::line_index::LineIndex).
///
/// Yields `(line, range)` where `range` covers the line's content without
/// its trailing `'\n'`. This is the fast path for reading a visible viewport.
#[derive(Debug)]
pub struct LineRangeIter<'idx> {
    pub line_starts: &'idx [usize],
    pub text_len: usize,
    pub current_line_idx: usize,
    pub end_line_idx: usize,
}

impl Iterator for LineRangeIter<'_> {
    type Item = (usize, std::ops::Range<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_line_idx >= self.end_line_idx {
            return None;
        }

        let line_idx = self.current_line_idx;
        let start = *self.line_starts.get(line_idx)?;
        let end = self
            .line_starts
            .get(line_idx + 1)
            .map_or(self.text_len, |next| next - 1);

        self.current_line_idx += 1;

        Some((line_idx, start..end))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end_line_idx.saturating_sub(self.current_line_idx);

        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for LineRangeIter<'_> {}
