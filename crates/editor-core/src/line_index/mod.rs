pub mod line_iter;

/// Line number → byte offset cache over the document text.
///
/// Mutations only flip the `dirty` flag; the next read rescans the text once.
/// Every query asserts the index is fresh, so callers must run
/// [`LineIndex::ensure_fresh`] (or its chunked variant) first.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Offset of the first byte of each line. `line_starts[0] == 0` always.
    line_starts: Vec<usize>,
    /// Length of the text the index was last built from.
    text_len: usize,
    dirty: bool,
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new()
    }
}

/*

====================
===== CREATION =====
====================

*/

impl LineIndex {
    /// Starts out dirty, so the first query triggers a scan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            line_starts: vec![0],
            text_len: 0,
            dirty: true,
        }
    }

    #[inline]
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuilds from `text` if a mutation happened since the last rebuild.
    pub fn ensure_fresh(&mut self, text: &str) {
        self.ensure_fresh_from_chunks(std::iter::once(text));
    }

    /// Same as [`LineIndex::ensure_fresh`], reading the text as consecutive chunks
    /// (for example one per piece) so it never has to be materialised.
    pub fn ensure_fresh_from_chunks<'a, I>(&mut self, chunks: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        if !self.dirty {
            return;
        }

        self.line_starts.clear();
        self.line_starts.push(0);

        let mut base = 0;

        for chunk in chunks {
            for newline in memchr::memchr_iter(b'\n', chunk.as_bytes()) {
                self.line_starts.push(base + newline + 1);
            }

            base += chunk.len();
        }

        self.text_len = base;
        self.dirty = false;

        tracing::trace!(lines = self.line_starts.len(), len = base, "line index rebuilt");
    }

    #[inline]
    fn assert_fresh(&self) {
        debug_assert!(!self.dirty, "line index queried while stale");
    }
}

/*

======================
======= GETTER =======
======================

*/

impl LineIndex {
    /// `k` newlines give `k + 1` lines; the empty text has one empty line.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.assert_fresh();
        self.line_starts.len()
    }

    #[inline]
    #[must_use]
    pub fn line_starts(&self) -> &[usize] {
        self.assert_fresh();
        &self.line_starts
    }

    #[inline]
    #[must_use]
    pub fn text_len(&self) -> usize {
        self.assert_fresh();
        self.text_len
    }

    #[inline]
    #[must_use]
    pub fn offset_of_line(&self, line_idx: usize) -> Option<usize> {
        self.assert_fresh();
        self.line_starts.get(line_idx).copied()
    }

    /// End of the line's content: the offset of its `'\n'`, or the text
    /// length for the last line.
    #[must_use]
    pub fn line_end(&self, line_idx: usize) -> Option<usize> {
        self.assert_fresh();

        if line_idx >= self.line_starts.len() {
            return None;
        }

        Some(
            self.line_starts
                .get(line_idx + 1)
                .map_or(self.text_len, |next| next - 1),
        )
    }

    /// The line holding `offset`: the greatest line start `<= offset`.
    #[must_use]
    pub fn line_of_offset(&self, offset: usize) -> usize {
        self.assert_fresh();

        // line_starts[0] == 0, so the partition point is at least 1.
        self.line_starts.partition_point(|&start| start <= offset) - 1
    }

    /// Iterates `(line, content range)` for lines `[start_line, end_line)`.
    #[must_use]
    pub fn lines(&self, start_line: usize, end_line: usize) -> line_iter::LineRangeIter<'_> {
        self.assert_fresh();

        line_iter::LineRangeIter {
            line_starts: &self.line_starts,
            text_len: self.text_len,
            current_line_idx: start_line,
            end_line_idx: end_line.min(self.line_starts.len()),
        }
    }

    #[must_use]
    pub fn iter(&self) -> line_iter::LineRangeIter<'_> {
        self.lines(0, usize::MAX)
    }
}

#[cfg(test)]
mod line_index_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fresh(text: &str) -> LineIndex {
        let mut index = LineIndex::new();

        index.ensure_fresh(text);
        index
    }

    #[test]
    fn starts_dirty() {
        assert!(LineIndex::new().is_dirty());
    }

    #[test]
    fn empty_text_has_one_line() {
        let index = fresh("");

        assert_eq!(index.line_count(), 1);
        assert_eq!(index.offset_of_line(0), Some(0));
        assert_eq!(index.line_end(0), Some(0));
    }

    #[test]
    fn line_starts_follow_newlines() {
        let index = fresh("ab\ncde\n\nf");

        assert_eq!(index.line_starts(), &[0, 3, 7, 8]);
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_end(0), Some(2));
        assert_eq!(index.line_end(2), Some(7));
        assert_eq!(index.line_end(3), Some(9));
        assert_eq!(index.line_end(4), None);
    }

    #[test]
    fn trailing_newline_opens_an_empty_line() {
        let index = fresh("hello\n");

        assert_eq!(index.line_count(), 2);
        assert_eq!(index.offset_of_line(1), Some(6));
        assert_eq!(index.line_end(1), Some(6));
    }

    #[test]
    fn line_of_offset_binary_search() {
        let index = fresh("ab\ncde\nf");

        assert_eq!(index.line_of_offset(0), 0);
        assert_eq!(index.line_of_offset(2), 0);
        assert_eq!(index.line_of_offset(3), 1);
        assert_eq!(index.line_of_offset(6), 1);
        assert_eq!(index.line_of_offset(7), 2);
        assert_eq!(index.line_of_offset(500), 2);
    }

    #[test]
    fn clean_index_ignores_new_text_until_invalidated() {
        let mut index = fresh("a\nb");

        index.ensure_fresh("a\nb\nc");
        assert_eq!(index.line_count(), 2, "A clean index must not rescan");

        index.invalidate();
        index.ensure_fresh("a\nb\nc");
        assert_eq!(index.line_count(), 3);
    }

    #[test]
    fn chunked_rebuild_matches_whole_text() {
        let mut chunked = LineIndex::new();

        chunked.ensure_fresh_from_chunks(["ab\nc", "d\n", "", "\nef"]);

        let whole = fresh("ab\ncd\n\nef");

        assert_eq!(chunked.line_starts(), whole.line_starts());
        assert_eq!(chunked.text_len(), whole.text_len());
    }

    #[test]
    fn lines_iterates_content_ranges() {
        let index = fresh("one\ntwo\nthree");
        let lines: Vec<_> = index.lines(1, 10).collect();

        assert_eq!(lines, vec![(1, 4..7), (2, 8..13)]);
        assert_eq!(index.iter().count(), 3);
    }
}
