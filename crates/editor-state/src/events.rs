/// Notifications a [`Document`](crate::document::Document) sends its listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditEvent {
    Inserted { position: usize, text: String },
    Removed { start: usize, end: usize },
    CursorMoved { index: usize },
    /// Keystrokes started collecting in the composer.
    CompositionStarted,
    /// The composer is idle again, whether by commit or by cancel.
    CompositionEnded,
    Undone { caret: usize },
    Redone { caret: usize },
    /// The whole document was replaced.
    Loaded { len: usize },
}

impl From<editor_core::composition::Commit> for EditEvent {
    fn from(commit: editor_core::composition::Commit) -> Self {
        match commit {
            editor_core::composition::Commit::Inserted { position, text } => {
                EditEvent::Inserted { position, text }
            }
            editor_core::composition::Commit::Removed { start, end } => {
                EditEvent::Removed { start, end }
            }
        }
    }
}
