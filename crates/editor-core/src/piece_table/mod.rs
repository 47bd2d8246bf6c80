/// # Piece Table Module.
///
/// Two backing stores (`original`, `added`) plus an ordered list of pieces
/// whose concatenation is the document text.
pub mod piece;
pub mod table;

/// Starting capacity of the append-only `added` store.
pub const BASELINE_CAPACITY: usize = 1024;
