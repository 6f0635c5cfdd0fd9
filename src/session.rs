//! Session cache around the note graph.
//!
//! The graph is built from the note source on first use and reused until
//! [`Zettelkasten::invalidate`] is called. All access goes through `&mut self`,
//! so initialization needs no locking; share a session across threads only
//! behind a single `Mutex`.

use std::path::Path;

use crate::graph::NoteGraph;
use crate::ingest::{DirectorySource, NoteSource};
use crate::note::{Note, NoteId};
use crate::Result;

/// One invocation's view of a Zettelkasten.
pub struct Zettelkasten {
    source: Box<dyn NoteSource>,
    graph: Option<NoteGraph>,
}

impl Zettelkasten {
    pub fn new(source: impl NoteSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            graph: None,
        }
    }

    /// Open a directory of notes. Fails with `InvalidSource` before anything
    /// is built if `directory` is not a directory.
    pub fn open(directory: &Path, extension: &str) -> Result<Self> {
        Ok(Self::new(DirectorySource::new(directory, extension)?))
    }

    /// Build the graph unless a cached one exists.
    pub fn ensure_built(&mut self) -> Result<&mut NoteGraph> {
        let graph = match self.graph.take() {
            Some(graph) => graph,
            None => NoteGraph::build(self.source.load()?),
        };
        Ok(self.graph.insert(graph))
    }

    /// The cached graph, built on first access.
    pub fn graph(&mut self) -> Result<&NoteGraph> {
        self.ensure_built().map(|graph| &*graph)
    }

    /// Drop the cached graph; the next query rebuilds it from the source.
    pub fn invalidate(&mut self) {
        self.graph = None;
    }

    pub fn is_built(&self) -> bool {
        self.graph.is_some()
    }

    pub fn exists(&mut self, id: NoteId) -> Result<bool> {
        Ok(self.graph()?.contains(id))
    }

    pub fn note(&mut self, id: NoteId) -> Result<&Note> {
        self.graph()?.note(id)
    }

    /// Allocate the next id (one past the largest id in storage, pruned and
    /// unparsable notes included), store the note and add it to the cached graph as
    /// an isolated node. Weights, pruning and rankings are not recomputed.
    pub fn create_note(&mut self, title: &str, body: &str) -> Result<Note> {
        let stored = self.source.max_id()?;
        let id = stored
            .max(self.graph()?.max_id())
            .map_or(1, |max| max + 1);
        let note = Note::new(id, title, body);
        self.source.save(&note)?;
        self.ensure_built()?.insert_note(note.clone())?;
        log::debug!("Inserted note {} into cached graph", id);
        Ok(note)
    }
}
