use thiserror::Error;

use crate::note::NoteId;

/// Main error type for the Zettelkasten engine
#[derive(Error, Debug)]
pub enum ZettelError {
    /// Note id not present in the current graph
    #[error("No note for id {0} found")]
    NotFound(NoteId),

    /// Note storage location missing or unreadable
    #[error("Invalid Zettelkasten source: {0}")]
    InvalidSource(String),

    /// Front matter or body could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using ZettelError
pub type Result<T> = std::result::Result<T, ZettelError>;
