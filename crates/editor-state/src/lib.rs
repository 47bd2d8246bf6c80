//! The editing session that sits between a UI and the text-editing core.
//!
//! A [`document::Document`] owns the buffer, the cursor and the keystroke
//! composer, routes raw input through them, and handles open/save.

pub mod config;
pub mod document;
pub mod errors;
pub mod events;

pub use config::EditorConfig;
pub use document::Document;
pub use errors::{DocumentError, DocumentResult};
pub use events::EditEvent;
