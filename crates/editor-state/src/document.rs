/// Callback invoked for every [`EditEvent`](crate::events::EditEvent).
pub type Listener = Box<dyn FnMut(&crate::events::EditEvent)>;

/// One open text: buffer, cursor, and keystroke composer kept in step.
///
/// The host drives it once per input tick: feed keystrokes, then call
/// [`Document::tick`] with the frame time so idle compositions get committed.
pub struct Document {
    buffer: editor_core::text::TextBuffer,
    cursor: editor_core::cursor::Cursor,
    composer: editor_core::composition::Composer,
    config: crate::config::EditorConfig,

    /// The file path, if this document is tied to a file on disk.
    filepath: Option<std::path::PathBuf>,
    /// Undo depth of the text as last opened, saved or loaded. `None` once
    /// a new edit branches away from it, so no undo/redo can get back.
    saved_depth: Option<usize>,

    listeners: Vec<Listener>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("buffer", &self.buffer)
            .field("cursor", &self.cursor)
            .field("composer", &self.composer)
            .field("filepath", &self.filepath)
            .field("saved_depth", &self.saved_depth)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(crate::config::EditorConfig::default())
    }
}

/*

==================================
===== CREATION, OPEN, & SAVE =====
==================================

*/

impl Document {
    #[must_use]
    pub fn new(config: crate::config::EditorConfig) -> Self {
        Self::with_text("", config)
    }

    #[must_use]
    pub fn with_text(text: &str, config: crate::config::EditorConfig) -> Self {
        Self {
            buffer: editor_core::text::TextBuffer::with_capacity(text, config.add_buffer_capacity),
            cursor: editor_core::cursor::Cursor::default(),
            composer: editor_core::composition::Composer::new(config.composition.clone()),
            config,
            filepath: None,
            saved_depth: Some(0),
            listeners: Vec::new(),
        }
    }

    /// Opens a UTF-8 file into a new document.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8.
    pub fn open(
        path: impl AsRef<std::path::Path>,
        config: crate::config::EditorConfig,
    ) -> crate::errors::DocumentResult<Self> {
        let mut document = Self::new(config);

        document.open_file(path)?;

        Ok(document)
    }

    /// Replaces this document's content with a file's, and ties it to that path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8.
    /// The document is left untouched in that case.
    pub fn open_file(
        &mut self,
        path: impl AsRef<std::path::Path>,
    ) -> crate::errors::DocumentResult<()> {
        let path_buf = path.as_ref().to_path_buf();
        let mmap_file = io::mmap::MmapFile::open(&path_buf)?;
        let text = mmap_file.as_str().map_err(|source| {
            tracing::warn!(path = %path_buf.display(), %source, "refusing to open non UTF-8 file");

            crate::errors::DocumentError::InvalidUtf8 {
                path: path_buf.clone(),
                source,
            }
        })?;

        // The piece table copies the text, so the mapping can go right after.
        self.load_content(text);
        self.filepath = Some(path_buf);

        Ok(())
    }

    /// Replaces everything: text, history, pending composition, cursor.
    pub fn load_content(&mut self, text: &str) {
        let was_composing =
            self.composer.phase() != editor_core::composition::CompositionPhase::Idle;

        self.composer.reset();
        self.buffer.load_content(text);
        self.cursor = editor_core::cursor::Cursor::default();
        self.saved_depth = Some(0);

        tracing::debug!(len = text.len(), "document loaded");

        if was_composing {
            self.emit(&crate::events::EditEvent::CompositionEnded);
        }

        self.emit(&crate::events::EditEvent::Loaded { len: text.len() });
        self.emit(&crate::events::EditEvent::CursorMoved { index: 0 });
    }

    /// Commits pending input and writes the document to its path.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::MissingPath`](crate::errors::DocumentError::MissingPath)
    /// if the document was never opened from or saved to a file, or an I/O
    /// error if writing fails.
    pub fn save(&mut self) -> crate::errors::DocumentResult<()> {
        self.flush();

        let filepath = self
            .filepath
            .as_ref()
            .ok_or(crate::errors::DocumentError::MissingPath)?;

        io::atomic::write_atomically(filepath, self.buffer.chunks().map(str::as_bytes))?;

        self.mark_saved();

        Ok(())
    }

    /// Saves to a new path, which becomes the document's path once written.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be written. The document
    /// keeps its previous path in that case.
    pub fn save_as(&mut self, path: impl AsRef<std::path::Path>) -> crate::errors::DocumentResult<()> {
        self.flush();

        let path = path.as_ref();

        io::atomic::write_atomically(path, self.buffer.chunks().map(str::as_bytes))?;

        self.filepath = Some(path.to_path_buf());
        self.mark_saved();

        Ok(())
    }

    fn mark_saved(&mut self) {
        self.saved_depth = Some(self.undo_depth());

        tracing::debug!(depth = self.undo_depth(), "document saved");
    }
}

/*

==========================
===== INLINE METHODS =====
==========================

*/

impl Document {
    #[inline]
    #[must_use]
    pub fn buffer(&self) -> &editor_core::text::TextBuffer {
        &self.buffer
    }

    #[inline]
    #[must_use]
    pub fn cursor(&self) -> editor_core::cursor::Cursor {
        self.cursor
    }

    #[must_use]
    pub fn cursor_position(&self) -> editor_core::cursor::BufferPosition {
        self.cursor.position(&self.buffer)
    }

    #[inline]
    #[must_use]
    pub fn composer(&self) -> &editor_core::composition::Composer {
        &self.composer
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &crate::config::EditorConfig {
        &self.config
    }

    /// Whether the committed text differs from the last open/save/load.
    /// Undoing back to the saved text clears it again.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.saved_depth != Some(self.undo_depth())
    }

    #[inline]
    fn undo_depth(&self) -> usize {
        self.buffer.piece_table().history().undo_len()
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        self.filepath.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.buffer.can_undo()
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.buffer.can_redo()
    }

    /// Committed text only.
    #[must_use]
    pub fn text(&self) -> String {
        self.buffer.get_text()
    }

    pub fn add_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&crate::events::EditEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Swaps the composition policy. Anything pending is committed first.
    pub fn set_composition_policy(&mut self, policy: editor_core::composition::CompositionPolicy) {
        self.flush();
        self.config.composition = policy.clone();
        self.composer.set_policy(policy);
    }

    fn emit(&mut self, event: &crate::events::EditEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}

/*

===========================
===== DISPLAY PREVIEW =====
===========================

*/

impl Document {
    /// What the user should see: the committed text with the pending
    /// composition spliced in at the cursor and a pending deletion run hidden.
    #[must_use]
    pub fn display_text(&self) -> String {
        let mut text = self.buffer.get_text();
        let index = self.buffer.clamp(self.cursor.index);

        match self.composer.phase() {
            editor_core::composition::CompositionPhase::Composing => {
                text.insert_str(index, self.composer.pending_text());
            }
            editor_core::composition::CompositionPhase::ComposingDeletion => {
                text.replace_range(index.saturating_sub(self.composer.delete_run())..index, "");
            }
            editor_core::composition::CompositionPhase::Idle => {}
        }

        text
    }

    /// Where the caret appears inside [`Document::display_text`].
    #[must_use]
    pub fn caret_index(&self) -> usize {
        let index = self.buffer.clamp(self.cursor.index);

        match self.composer.phase() {
            editor_core::composition::CompositionPhase::Composing => {
                index + self.composer.pending_text().len()
            }
            editor_core::composition::CompositionPhase::ComposingDeletion => {
                index.saturating_sub(self.composer.delete_run())
            }
            editor_core::composition::CompositionPhase::Idle => index,
        }
    }
}

/*

=======================
===== KEYSTROKES ======
=======================

*/

impl Document {
    /// A printable character from the keyboard. Control characters are ignored.
    pub fn type_char(&mut self, ch: char) {
        let before = self.snapshot();
        let commits = self.composer.type_char(&mut self.buffer, &mut self.cursor, ch);

        self.settle(before, commits);
    }

    pub fn backspace(&mut self) {
        let before = self.snapshot();

        self.composer.backspace(&self.buffer, &mut self.cursor);
        self.settle(before, Vec::new());
    }

    /// Advances the composition idle timer by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        let before = self.snapshot();
        let commit = self.composer.tick(&mut self.buffer, &mut self.cursor, dt);

        self.settle(before, commit.into_iter().collect());
    }

    /// Commits whatever the composer holds. Call on focus loss and before
    /// any structural action.
    pub fn flush(&mut self) {
        let before = self.snapshot();
        let commit = self.composer.flush(&mut self.buffer, &mut self.cursor);

        self.settle(before, commit.into_iter().collect());
    }

    /// Enter: commits pending input, then inserts a line break as its own edit.
    pub fn enter(&mut self) {
        self.insert_text("\n");
    }

    /// Inserts `text` at the cursor as one edit (paste, tab, line break).
    pub fn insert_text(&mut self, text: &str) {
        self.flush();

        let before = self.snapshot();
        let commit = self
            .buffer
            .insert(self.cursor.index, text)
            .map(|range| {
                self.cursor.set_index(&self.buffer, range.end);

                editor_core::composition::Commit::Inserted {
                    position: range.start,
                    text: text.to_owned(),
                }
            });

        self.settle(before, commit.into_iter().collect());
    }

    /// Delete key: commits pending input, then removes the character after the cursor.
    pub fn delete_forward(&mut self) {
        self.flush();

        let before = self.snapshot();
        let start = self.buffer.clamp(self.cursor.index);
        let end = self.buffer.next_boundary(start);
        let commit = self
            .buffer
            .remove(start, end)
            .map(|range| editor_core::composition::Commit::Removed {
                start: range.start,
                end: range.end,
            });

        self.cursor.set_index(&self.buffer, start);
        self.settle(before, commit.into_iter().collect());
    }

    pub fn move_cursor(&mut self, motion: editor_core::enums::Motion) {
        self.flush();

        let before = self.snapshot();

        self.cursor.apply(&self.buffer, motion);
        self.settle(before, Vec::new());
    }

    pub fn set_cursor(&mut self, index: usize) {
        self.flush();

        let before = self.snapshot();

        self.cursor.set_index(&self.buffer, index);
        self.settle(before, Vec::new());
    }

    /// Composer phase and cursor index, captured before a step so
    /// [`Document::settle`] can tell what changed.
    fn snapshot(&self) -> (editor_core::composition::CompositionPhase, usize) {
        (self.composer.phase(), self.cursor.index)
    }

    fn settle(
        &mut self,
        (phase_before, index_before): (editor_core::composition::CompositionPhase, usize),
        commits: Vec<editor_core::composition::Commit>,
    ) {
        let phase_after = self.composer.phase();

        // Each commit pushed one command; the first one cleared redo, so a
        // saved state above the depth it started from is gone for good.
        let depth_before = self.undo_depth() - commits.len();

        if !commits.is_empty() && self.saved_depth.is_some_and(|depth| depth > depth_before) {
            self.saved_depth = None;
        }

        for commit in commits {
            self.emit(&commit.into());
        }

        if phase_before != phase_after {
            if phase_before != editor_core::composition::CompositionPhase::Idle {
                self.emit(&crate::events::EditEvent::CompositionEnded);
            }
            if phase_after != editor_core::composition::CompositionPhase::Idle {
                self.emit(&crate::events::EditEvent::CompositionStarted);
            }
        }

        if self.cursor.index != index_before {
            self.emit(&crate::events::EditEvent::CursorMoved {
                index: self.cursor.index,
            });
        }
    }
}

/*

===============================
========= UNDO & REDO =========
===============================

*/

impl Document {
    /// Commits pending input, then undoes the last edit and puts the cursor
    /// where that edit happened. Typing a word and undoing removes the word.
    pub fn undo(&mut self) {
        self.flush();

        let before = self.snapshot();

        if let Some(caret) = self.buffer.undo() {
            self.cursor.set_index(&self.buffer, caret);

            self.emit(&crate::events::EditEvent::Undone { caret });
            self.settle(before, Vec::new());
        }
    }

    pub fn redo(&mut self) {
        self.flush();

        let before = self.snapshot();

        if let Some(caret) = self.buffer.redo() {
            self.cursor.set_index(&self.buffer, caret);

            self.emit(&crate::events::EditEvent::Redone { caret });
            self.settle(before, Vec::new());
        }
    }
}

#[cfg(test)]
mod document_tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::events::EditEvent;
    use editor_core::composition::CompositionPhase;
    use editor_core::cursor::BufferPosition;
    use editor_core::enums::Motion;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() -> Document {
        Document::default()
    }

    fn type_str(doc: &mut Document, text: &str) {
        for ch in text.chars() {
            doc.type_char(ch);
        }
    }

    fn recorder(doc: &mut Document) -> Rc<RefCell<Vec<EditEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);

        doc.add_listener(move |event| sink.borrow_mut().push(event.clone()));

        events
    }

    #[test]
    fn test_typing_then_idle_is_one_undo_step() {
        let mut doc = setup();

        type_str(&mut doc, "hello");
        assert_eq!(doc.text(), "");
        assert_eq!(doc.display_text(), "hello");
        assert_eq!(doc.caret_index(), 5);

        doc.tick(0.6);
        assert_eq!(doc.text(), "hello");
        assert_eq!(doc.cursor().index, 5);
        assert!(doc.can_undo());

        doc.undo();
        assert_eq!(doc.text(), "");
        assert!(!doc.can_undo(), "One undo must remove the whole word");
        assert_eq!(doc.cursor().index, 0);
    }

    #[test]
    fn test_newline_insertion_math() {
        let mut doc = setup();

        // Pressing Enter on an empty document
        doc.enter();
        assert_eq!(doc.cursor_position(), BufferPosition { row: 1, column: 0, index: 1 });

        // Typing then Enter commits the word and the break separately
        type_str(&mut doc, "Hi");
        doc.enter();
        assert_eq!(doc.text(), "\nHi\n");
        assert_eq!(doc.cursor_position(), BufferPosition { row: 2, column: 0, index: 4 });
        assert_eq!(doc.buffer().piece_table().history().undo_len(), 3);
    }

    #[test]
    fn test_backspace_deletion_run_preview_and_commit() {
        let mut doc = Document::with_text("hello", EditorConfig::default());

        doc.set_cursor(5);
        doc.backspace();
        doc.backspace();
        doc.backspace();

        assert_eq!(doc.composer().phase(), CompositionPhase::ComposingDeletion);
        assert_eq!(doc.text(), "hello");
        assert_eq!(doc.display_text(), "he");
        assert_eq!(doc.caret_index(), 2);

        doc.tick(0.6);
        assert_eq!(doc.text(), "he");
        assert_eq!(doc.cursor().index, 2);

        doc.undo();
        assert_eq!(doc.text(), "hello");
        assert_eq!(doc.cursor().index, 5);
    }

    #[test]
    fn test_backspace_at_line_boundary() {
        let mut doc = Document::with_text("ABC\nDEF", EditorConfig::default());

        doc.set_cursor(4);
        doc.backspace();
        doc.flush();

        assert_eq!(doc.buffer().get_line(0), "ABCDEF");
        assert_eq!(doc.cursor_position(), BufferPosition { row: 0, column: 3, index: 3 });

        doc.undo();
        assert_eq!(doc.buffer().get_line(0), "ABC");
        assert_eq!(doc.buffer().get_line(1), "DEF");
        assert_eq!(doc.cursor_position(), BufferPosition { row: 1, column: 0, index: 4 });
    }

    #[test]
    fn test_redo_restores_correct_cursor() {
        let mut doc = setup();

        type_str(&mut doc, "Hello");
        doc.flush();
        let after_hello = doc.cursor();

        doc.undo();
        assert_eq!(doc.cursor().index, 0);

        doc.redo();
        assert_eq!(doc.cursor().index, after_hello.index);
        assert_eq!(doc.buffer().get_line(0), "Hello");
    }

    #[test]
    fn test_undo_commits_pending_composition_first() {
        let mut doc = setup();

        type_str(&mut doc, "one ");
        type_str(&mut doc, "two");

        // "two" is still pending; undo commits it and then removes it.
        doc.undo();
        assert_eq!(doc.text(), "one ");
        assert!(doc.can_redo());

        doc.redo();
        assert_eq!(doc.text(), "one two");
    }

    #[test]
    fn test_new_edit_after_undo_clears_redo() {
        let mut doc = setup();

        type_str(&mut doc, "abc ");
        doc.undo();
        assert!(doc.can_redo());

        type_str(&mut doc, "x.");
        assert!(!doc.can_redo());
        assert_eq!(doc.text(), "x.");
    }

    #[test]
    fn test_delete_forward_at_end_of_line() {
        let mut doc = Document::with_text("A\nB", EditorConfig::default());

        doc.set_cursor(1);
        doc.delete_forward();
        assert_eq!(doc.buffer().get_line(0), "AB");

        doc.undo();
        assert_eq!(doc.text(), "A\nB");
        assert_eq!(doc.cursor().index, 2);
    }

    #[test]
    fn test_delete_forward_at_document_end_does_nothing() {
        let mut doc = Document::with_text("Hello", EditorConfig::default());

        doc.set_cursor(5);
        doc.delete_forward();

        assert_eq!(doc.text(), "Hello");
        assert!(!doc.can_undo());
        assert!(!doc.is_modified());
    }

    #[test]
    fn test_motion_commits_pending_text_where_it_was_typed() {
        let mut doc = Document::with_text("ab\ncd", EditorConfig::default());

        doc.set_cursor(2);
        type_str(&mut doc, "X");
        doc.move_cursor(Motion::Down);

        assert_eq!(doc.text(), "abX\ncd");
        assert_eq!(doc.cursor_position().row, 1);
    }

    #[test]
    fn test_paste_is_one_edit() {
        let mut doc = setup();

        doc.insert_text("first line\nsecond line");
        assert_eq!(doc.buffer().line_count(), 2);
        assert_eq!(doc.cursor().index, 22);

        doc.undo();
        assert_eq!(doc.text(), "");
    }

    #[test]
    fn test_load_content_resets_session() {
        let mut doc = setup();

        type_str(&mut doc, "abc ");
        type_str(&mut doc, "pending");
        doc.load_content("fresh\ntext");

        assert_eq!(doc.text(), "fresh\ntext");
        assert_eq!(doc.display_text(), "fresh\ntext");
        assert_eq!(doc.composer().phase(), CompositionPhase::Idle);
        assert_eq!(doc.cursor().index, 0);
        assert!(!doc.can_undo());
        assert!(!doc.can_redo());
        assert!(!doc.is_modified());
    }

    #[test]
    fn test_modified_flag_tracks_commits() {
        let mut doc = setup();

        type_str(&mut doc, "ab");
        assert!(!doc.is_modified(), "Pending text is not a modification yet");

        doc.flush();
        assert!(doc.is_modified());
    }

    #[test]
    fn test_events_for_a_composed_word() {
        let mut doc = setup();
        let events = recorder(&mut doc);

        type_str(&mut doc, "hi ");

        assert_eq!(
            *events.borrow(),
            vec![
                EditEvent::CompositionStarted,
                EditEvent::Inserted {
                    position: 0,
                    text: "hi ".to_string()
                },
                EditEvent::CompositionEnded,
                EditEvent::CursorMoved { index: 3 },
            ]
        );
    }

    #[test]
    fn test_events_for_undo() {
        let mut doc = Document::with_text("abc", EditorConfig::default());

        doc.set_cursor(3);
        doc.delete_forward();
        doc.backspace();
        doc.flush();

        let events = recorder(&mut doc);

        doc.undo();

        assert_eq!(
            *events.borrow(),
            vec![EditEvent::Undone { caret: 3 }, EditEvent::CursorMoved { index: 3 }]
        );
    }

    #[test]
    fn test_custom_policy_from_config() {
        let config = EditorConfig::default().with_idle_timeout(2.0).with_commit_triggers([]);
        let mut doc = Document::new(config);

        type_str(&mut doc, "a b.");
        doc.tick(1.0);
        assert_eq!(doc.text(), "");

        doc.tick(1.0);
        assert_eq!(doc.text(), "a b.");
    }

    #[test]
    fn test_set_composition_policy_flushes() {
        let mut doc = setup();

        type_str(&mut doc, "ab");
        doc.set_composition_policy(editor_core::composition::CompositionPolicy::default().with_idle_timeout(5.0));

        assert_eq!(doc.text(), "ab");
        assert_eq!(doc.config().composition.idle_timeout, 5.0);
        assert_eq!(doc.composer().policy(), &doc.config().composition);
    }

    #[test]
    fn test_undo_back_to_saved_text_is_unmodified() {
        let mut doc = Document::with_text("ab", EditorConfig::default());

        doc.set_cursor(2);
        doc.insert_text("c");
        assert!(doc.is_modified());

        doc.undo();
        assert!(!doc.is_modified(), "Back at the loaded text");

        doc.redo();
        assert_eq!(doc.text(), "abc");
        assert!(doc.is_modified());

        doc.undo();
        doc.undo();
        assert!(!doc.is_modified());
    }

    #[test]
    fn test_edit_after_undo_past_saved_state_stays_modified() {
        let mut doc = setup();

        doc.insert_text("a");
        doc.insert_text("b");
        doc.mark_saved();
        assert!(!doc.is_modified());

        doc.undo();
        doc.undo();
        doc.insert_text("x");
        doc.insert_text("y");

        // Same depth as the save, different text.
        assert_eq!(doc.text(), "xy");
        assert!(doc.is_modified());
    }

    #[test]
    fn test_undo_without_cursor_change_emits_no_motion() {
        let mut doc = Document::with_text("abc", EditorConfig::default());

        doc.set_cursor(1);
        doc.insert_text("X");
        doc.set_cursor(1);

        let events = recorder(&mut doc);

        doc.undo();

        assert_eq!(*events.borrow(), vec![EditEvent::Undone { caret: 1 }]);
        assert_eq!(doc.text(), "abc");
    }
}
