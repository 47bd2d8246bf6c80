/// Session settings. Everything has a sensible default.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde_support",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct EditorConfig {
    /// When typed characters get committed as one edit.
    pub composition: editor_core::composition::CompositionPolicy,
    /// Bytes preallocated for inserted text.
    pub add_buffer_capacity: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            composition: editor_core::composition::CompositionPolicy::default(),
            add_buffer_capacity: editor_core::piece_table::BASELINE_CAPACITY,
        }
    }
}

impl EditorConfig {
    #[must_use]
    pub fn with_idle_timeout(mut self, seconds: f32) -> Self {
        self.composition.idle_timeout = seconds;
        self
    }

    #[must_use]
    pub fn with_commit_triggers<I: IntoIterator<Item = char>>(mut self, triggers: I) -> Self {
        self.composition = self.composition.with_commit_triggers(triggers);
        self
    }

    #[must_use]
    pub fn with_add_buffer_capacity(mut self, capacity: usize) -> Self {
        self.add_buffer_capacity = capacity;
        self
    }
}
