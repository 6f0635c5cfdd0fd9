//! Topological roles of notes.
//!
//! Roles are pure functions of the current topology and are recomputed on
//! every call.

use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;
use serde::Serialize;

use super::NoteGraph;
use crate::note::NoteId;
use crate::Result;

/// Degrees and role flags of a single note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteRoles {
    pub id: NoteId,
    pub in_degree: usize,
    pub out_degree: usize,
    /// No outgoing but some incoming references, or flagged `entry`.
    pub entry: bool,
    /// Nothing references this note.
    pub exit: bool,
    /// Fully isolated.
    pub inbox: bool,
}

impl NoteGraph {
    pub(crate) fn roles_at(&self, idx: NodeIndex) -> NoteRoles {
        let in_degree = self.degree_at(idx, Direction::Incoming);
        let out_degree = self.degree_at(idx, Direction::Outgoing);
        NoteRoles {
            id: self.id_at(idx),
            in_degree,
            out_degree,
            entry: (out_degree == 0 && in_degree != 0) || self.graph[idx].entry,
            exit: in_degree == 0,
            inbox: in_degree == 0 && out_degree == 0,
        }
    }

    pub(crate) fn is_entry_at(&self, idx: NodeIndex) -> bool {
        self.roles_at(idx).entry
    }

    /// Role flags for one note.
    pub fn roles(&self, id: NoteId) -> Result<NoteRoles> {
        Ok(self.roles_at(self.node(id)?))
    }

    pub fn is_entry(&self, id: NoteId) -> Result<bool> {
        Ok(self.roles(id)?.entry)
    }

    pub fn is_exit(&self, id: NoteId) -> Result<bool> {
        Ok(self.roles(id)?.exit)
    }

    fn ids_where(&self, keep: impl Fn(&NoteRoles) -> bool) -> Vec<NoteId> {
        self.ids()
            .into_iter()
            .filter(|&id| keep(&self.roles_at(self.index[&id])))
            .collect()
    }

    /// Entry notes in ascending id order.
    pub fn entry_notes(&self) -> Vec<NoteId> {
        self.ids_where(|r| r.entry)
    }

    /// Exit notes in ascending id order.
    pub fn exit_notes(&self) -> Vec<NoteId> {
        self.ids_where(|r| r.exit)
    }

    /// Isolated notes that still need to be linked into the graph.
    pub fn inbox(&self) -> Vec<NoteId> {
        self.ids_where(|r| r.inbox)
    }

    /// All notes with their out-degree, most outgoing references first.
    ///
    /// Notes linking to many others tend to summarise what they link to.
    pub fn hubs(&self) -> Vec<(NoteId, usize)> {
        let mut hubs: Vec<(NoteId, usize)> = self
            .ids()
            .into_iter()
            .map(|id| (id, self.degree_at(self.index[&id], Direction::Outgoing)))
            .collect();
        hubs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        hubs
    }
}
