/// Characters that commit the pending text as soon as they are typed.
pub const DEFAULT_COMMIT_TRIGGERS: [char; 6] = [' ', '.', ',', ';', '!', '?'];

/// Seconds without input after which pending keystrokes are committed.
pub const DEFAULT_IDLE_TIMEOUT: f32 = 0.5;

/// When buffered keystrokes become a committed edit. Owned by the caller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(serde::Serialize, serde::Deserialize))]
pub struct CompositionPolicy {
    pub idle_timeout: f32,
    pub commit_triggers: Vec<char>,
}

impl Default for CompositionPolicy {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            commit_triggers: DEFAULT_COMMIT_TRIGGERS.to_vec(),
        }
    }
}

impl CompositionPolicy {
    #[must_use]
    pub fn with_idle_timeout(mut self, seconds: f32) -> Self {
        self.idle_timeout = seconds;
        self
    }

    /// Control characters are dropped: [`Composer::type_char`] never composes them.
    #[must_use]
    pub fn with_commit_triggers<I: IntoIterator<Item = char>>(mut self, triggers: I) -> Self {
        self.commit_triggers = triggers.into_iter().filter(|ch| !ch.is_control()).collect();
        self
    }

    #[inline]
    #[must_use]
    pub fn is_trigger(&self, ch: char) -> bool {
        self.commit_triggers.contains(&ch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionPhase {
    Idle,
    /// Printable characters are buffered in the pending text.
    Composing,
    /// Backspaces are counted and will be removed as one range.
    ComposingDeletion,
}

/// An edit the composer pushed into the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
    Inserted { position: usize, text: String },
    Removed { start: usize, end: usize },
}

/// Batches keystrokes so that a burst of typing (or of backspacing) lands in
/// the buffer as a single command, and so a single undo step.
///
/// The composer never edits the buffer except when committing. The caller
/// must flush it before moving the cursor or editing by any other route.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    pending_text: String,
    is_active: bool,
    idle_timer: f32,
    /// Bytes before the cursor queued for removal.
    delete_run: usize,
    policy: CompositionPolicy,
}

/*

====================================
========= INLINE METHODS  ==========
====================================

*/

impl Composer {
    #[must_use]
    pub fn new(policy: CompositionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn policy(&self) -> &CompositionPolicy {
        &self.policy
    }

    pub fn set_policy(&mut self, policy: CompositionPolicy) {
        self.policy = policy;
    }

    #[must_use]
    pub fn phase(&self) -> CompositionPhase {
        if self.delete_run > 0 {
            CompositionPhase::ComposingDeletion
        } else if self.pending_text.is_empty() {
            CompositionPhase::Idle
        } else {
            CompositionPhase::Composing
        }
    }

    #[inline]
    #[must_use]
    pub fn pending_text(&self) -> &str {
        &self.pending_text
    }

    #[inline]
    #[must_use]
    pub fn delete_run(&self) -> usize {
        self.delete_run
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    #[inline]
    #[must_use]
    pub fn idle_timer(&self) -> f32 {
        self.idle_timer
    }

    /// Drops anything pending without touching the buffer.
    pub fn reset(&mut self) {
        self.pending_text.clear();
        self.is_active = false;
        self.idle_timer = 0.0;
        self.delete_run = 0;
    }
}

/*

====================================
=========== KEYSTROKES =============
====================================

*/

impl Composer {
    /// Feeds one typed character.
    ///
    /// A pending deletion run is committed first. If `ch` is a commit trigger
    /// the pending text, including `ch`, is committed right away. Control
    /// characters are ignored: line breaks and the like are structural
    /// actions the caller performs after [`Composer::flush`].
    pub fn type_char(
        &mut self,
        buffer: &mut crate::text::TextBuffer,
        cursor: &mut crate::cursor::Cursor,
        ch: char,
    ) -> Vec<Commit> {
        let mut commits = Vec::new();

        if ch.is_control() {
            return commits;
        }

        if self.delete_run > 0 {
            commits.extend(self.commit_deletion(buffer, cursor));
        }

        self.pending_text.push(ch);
        self.is_active = true;
        self.idle_timer = 0.0;

        if self.policy.is_trigger(ch) {
            commits.extend(self.commit_insert(buffer, cursor));
        }

        commits
    }

    /// Handles Backspace. Trims the pending text if there is any, otherwise
    /// grows the deletion run by one character. Returns whether anything changed.
    pub fn backspace(
        &mut self,
        buffer: &crate::text::TextBuffer,
        cursor: &mut crate::cursor::Cursor,
    ) -> bool {
        if self.pending_text.pop().is_some() {
            self.idle_timer = 0.0;
            self.is_active = !self.pending_text.is_empty();

            return true;
        }

        cursor.clamp(buffer);

        let anchor = cursor.index.saturating_sub(self.delete_run);

        if anchor == 0 {
            return false;
        }

        self.delete_run += anchor - buffer.prev_boundary(anchor);
        self.is_active = true;
        self.idle_timer = 0.0;

        true
    }

    /// Advances the idle timer by `dt` seconds and commits once it reaches the timeout.
    pub fn tick(
        &mut self,
        buffer: &mut crate::text::TextBuffer,
        cursor: &mut crate::cursor::Cursor,
        dt: f32,
    ) -> Option<Commit> {
        if !self.is_active {
            return None;
        }

        self.idle_timer += dt;

        if self.idle_timer >= self.policy.idle_timeout {
            return self.flush(buffer, cursor);
        }

        None
    }

    /// Commits whatever is pending. Used for explicit structural actions
    /// (Enter, save, focus loss, cursor motion, undo).
    pub fn flush(
        &mut self,
        buffer: &mut crate::text::TextBuffer,
        cursor: &mut crate::cursor::Cursor,
    ) -> Option<Commit> {
        if self.delete_run > 0 {
            self.commit_deletion(buffer, cursor)
        } else if !self.pending_text.is_empty() {
            self.commit_insert(buffer, cursor)
        } else {
            self.reset();

            None
        }
    }
}

/*

====================================
============ COMMITTING ============
====================================

*/

impl Composer {
    fn commit_insert(
        &mut self,
        buffer: &mut crate::text::TextBuffer,
        cursor: &mut crate::cursor::Cursor,
    ) -> Option<Commit> {
        let text = std::mem::take(&mut self.pending_text);

        self.is_active = false;
        self.idle_timer = 0.0;

        cursor.clamp(buffer);

        let range = buffer.insert(cursor.index, &text)?;

        cursor.set_index(buffer, range.end);

        tracing::debug!(position = range.start, len = text.len(), "composition committed");

        Some(Commit::Inserted {
            position: range.start,
            text,
        })
    }

    fn commit_deletion(
        &mut self,
        buffer: &mut crate::text::TextBuffer,
        cursor: &mut crate::cursor::Cursor,
    ) -> Option<Commit> {
        let run = std::mem::take(&mut self.delete_run);

        self.is_active = false;
        self.idle_timer = 0.0;

        cursor.clamp(buffer);

        let end = cursor.index;
        let range = buffer.remove(end.saturating_sub(run), end)?;

        cursor.set_index(buffer, range.start);

        tracing::debug!(start = range.start, end = range.end, "deletion run committed");

        Some(Commit::Removed {
            start: range.start,
            end: range.end,
        })
    }
}
