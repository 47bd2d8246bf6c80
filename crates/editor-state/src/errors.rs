pub type DocumentResult<T> = Result<T, DocumentError>;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{} is not valid UTF-8: {source}", path.display())]
    InvalidUtf8 {
        path: std::path::PathBuf,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("no file path associated with this document, use save_as()")]
    MissingPath,
}
