pub mod config;
pub mod error;
pub mod note;
pub mod ingest;
pub mod graph;
pub mod session;
pub mod render;

pub use config::Config;
pub use error::{ZettelError, Result};
pub use graph::NoteGraph;
pub use note::{Link, Note, NoteId};
pub use session::Zettelkasten;
