//! Text-editing core: a piece-table document with snapshot-based undo/redo,
//! a lazily rebuilt line index, a single-cursor model, and keystroke
//! composition that turns bursts of typing into single undo steps.
//!
//! Everything here is single-threaded and synchronous. A multi-threaded host
//! must serialize all calls itself.

pub mod composition;
pub mod cursor;
pub mod enums;
pub mod history;
pub mod line_index;
pub mod piece_table;
pub mod text;

pub use composition::{Commit, Composer, CompositionPhase, CompositionPolicy};
pub use cursor::{BufferPosition, Cursor};
pub use enums::{BufferKind, Motion};
pub use text::TextBuffer;
