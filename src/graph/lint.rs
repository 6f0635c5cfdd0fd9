//! Integrity checks over the reference structure.

use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use super::NoteGraph;
use crate::note::NoteId;

impl NoteGraph {
    /// Pairs of distinct notes referencing each other, reported once as
    /// `(lower id, higher id)`.
    ///
    /// Pairs involving an entry note are allowed and skipped.
    pub fn reciprocal_references(&self) -> Vec<(NoteId, NoteId)> {
        let mut pairs: Vec<(NoteId, NoteId)> = self
            .graph
            .edge_references()
            .filter(|e| {
                let (u, v) = (e.source(), e.target());
                self.id_at(u) < self.id_at(v)
                    && self.graph.find_edge(v, u).is_some()
                    && !self.is_entry_at(u)
                    && !self.is_entry_at(v)
            })
            .map(|e| (self.id_at(e.source()), self.id_at(e.target())))
            .collect();
        pairs.sort_unstable();
        for (u, v) in &pairs {
            log::warn!("Notes {} and {} reference each other", u, v);
        }
        pairs
    }
}
