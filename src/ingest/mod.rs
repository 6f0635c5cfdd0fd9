pub mod walker;
pub mod markdown;

pub use walker::{NoteFile, discover_notes};
pub use markdown::{FrontMatter, ParsedBody, parse_body, parse_note, render_note_file, split_front_matter};

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{Result, ZettelError};
use crate::note::{Note, NoteId};

/// Where note records come from and where new notes are stored
pub trait NoteSource {
    /// Load every note record
    fn load(&self) -> Result<Vec<Note>>;

    /// Persist a newly created note
    fn save(&mut self, note: &Note) -> Result<()>;

    /// Largest id held in storage, counting notes that never make it into
    /// the graph (hidden, pruned or unparsable).
    fn max_id(&self) -> Result<Option<NoteId>>;
}

/// Notes stored as `<id>.<extension>` markdown files below a directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extension: String,
}

impl DirectorySource {
    /// Fails with `InvalidSource` unless `root` is an existing directory.
    pub fn new(root: impl Into<PathBuf>, extension: &str) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ZettelError::InvalidSource(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        Ok(Self {
            root,
            extension: extension.trim_start_matches('.').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a note with this id is stored at.
    pub fn note_path(&self, id: NoteId) -> PathBuf {
        self.root.join(format!("{}.{}", id, self.extension))
    }
}

impl NoteSource for DirectorySource {
    fn load(&self) -> Result<Vec<Note>> {
        let mut notes = Vec::new();
        for file in discover_notes(&self.root, &self.extension)? {
            let content = match std::fs::read_to_string(&file.path) {
                Ok(c) => c,
                Err(e) => {
                    log::error!("Failed to read {}: {}", file.path.display(), e);
                    continue;
                }
            };
            match parse_note(file.id, &content) {
                Ok(mut note) => {
                    note.modified = Some(DateTime::<Local>::from(file.modified));
                    notes.push(note);
                }
                Err(e) => log::error!("Skipping {}: {}", file.path.display(), e),
            }
        }
        Ok(notes)
    }

    fn save(&mut self, note: &Note) -> Result<()> {
        let path = self.note_path(note.id);
        if path.exists() {
            return Err(ZettelError::InvalidInput(format!(
                "{} already exists",
                path.display()
            )));
        }
        std::fs::write(&path, render_note_file(note)?)?;
        log::info!("Created new note \"{}\"", path.display());
        Ok(())
    }

    fn max_id(&self) -> Result<Option<NoteId>> {
        Ok(discover_notes(&self.root, &self.extension)?
            .last()
            .map(|file| file.id))
    }
}

/// In-memory note collection
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    notes: Vec<Note>,
}

impl MemorySource {
    pub fn new(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }
}

impl NoteSource for MemorySource {
    fn load(&self) -> Result<Vec<Note>> {
        Ok(self.notes.clone())
    }

    fn save(&mut self, note: &Note) -> Result<()> {
        if self.notes.iter().any(|n| n.id == note.id) {
            return Err(ZettelError::InvalidInput(format!(
                "note {} already exists",
                note.id
            )));
        }
        self.notes.push(note.clone());
        Ok(())
    }

    fn max_id(&self) -> Result<Option<NoteId>> {
        Ok(self.notes.iter().map(|n| n.id).max())
    }
}
