//! Knowledge graph module: note graph construction and structural queries.
//!
//! Notes become nodes, internal links become directed edges `u -> v`
//! ("u references v"). Nodes live in a petgraph arena and are addressed by
//! [`NoteId`] through an id -> index map, so reference cycles need no special
//! handling. Queries are spread over the submodules as `impl NoteGraph`
//! blocks:
//!
//! - `builder`: construction, hidden-note pruning, edge weights
//! - `roles`: entry/exit/inbox classification
//! - `traversal`: neighbourhoods, collection, weighted shortest paths, lattices
//! - `ranking`: PageRank importance
//! - `cluster`: greedy modularity communities (maps of content)
//! - `register`: alphabetical index
//! - `stats` / `lint`: statistics and reciprocal reference detection

mod builder;
mod cluster;
mod lint;
mod ranking;
mod register;
mod roles;
mod search;
mod stats;
mod traversal;

pub use cluster::Cluster;
pub use ranking::RankedNote;
pub use register::{RegisterEntry, RegisterGroup};
pub use roles::NoteRoles;
pub use stats::Statistics;
pub use traversal::{LatticePath, References, Suggestion};

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use petgraph::dot::Dot;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use serde::Serialize;

use crate::note::{Note, NoteId};
use crate::{Result, ZettelError};

/// Edge payload: the link text used and the tie-breaking weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// Label of the first link seen for this ordered pair.
    pub label: String,
    /// `in_degree(source) + in_degree(target)`, set once all edges exist.
    pub weight: u64,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Directed graph of notes with O(1) lookup by note id.
#[derive(Debug, Clone, Default)]
pub struct NoteGraph {
    graph: StableDiGraph<Note, Reference>,
    index: HashMap<NoteId, NodeIndex>,
}

impl NoteGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a note as an isolated node.
    ///
    /// This is the only mutation allowed on a built graph. Edges, weights and
    /// pruning are left untouched.
    pub fn insert_note(&mut self, note: Note) -> Result<()> {
        if self.index.contains_key(&note.id) {
            return Err(ZettelError::InvalidInput(format!(
                "note {} already exists",
                note.id
            )));
        }
        let id = note.id;
        let idx = self.graph.add_node(note);
        self.index.insert(id, idx);
        Ok(())
    }

    /// Add `source -> target` unless that ordered pair already has an edge.
    /// Returns `false` when the edge existed or an endpoint is unknown.
    pub(crate) fn add_reference(&mut self, source: NoteId, target: NoteId, label: &str) -> bool {
        let (Some(&u), Some(&v)) = (self.index.get(&source), self.index.get(&target)) else {
            return false;
        };
        if self.graph.find_edge(u, v).is_some() {
            return false;
        }
        self.graph.add_edge(
            u,
            v,
            Reference {
                label: label.to_string(),
                weight: 0,
            },
        );
        true
    }

    /// Whether a note with this id is part of the graph.
    pub fn contains(&self, id: NoteId) -> bool {
        self.index.contains_key(&id)
    }

    /// Look up a note by id.
    pub fn note(&self, id: NoteId) -> Result<&Note> {
        let idx = self.node(id)?;
        Ok(&self.graph[idx])
    }

    pub(crate) fn node(&self, id: NoteId) -> Result<NodeIndex> {
        self.index.get(&id).copied().ok_or(ZettelError::NotFound(id))
    }

    pub(crate) fn id_at(&self, idx: NodeIndex) -> NoteId {
        self.graph[idx].id
    }

    /// All note ids in ascending order.
    pub fn ids(&self) -> Vec<NoteId> {
        let mut ids: Vec<NoteId> = self.index.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// All notes in ascending id order.
    pub fn notes(&self) -> Vec<&Note> {
        self.ids()
            .into_iter()
            .map(|id| &self.graph[self.index[&id]])
            .collect()
    }

    /// Largest note id, if any note exists.
    pub fn max_id(&self) -> Option<NoteId> {
        self.index.keys().copied().max()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub(crate) fn degree_at(&self, idx: NodeIndex, direction: Direction) -> usize {
        self.graph.edges_directed(idx, direction).count()
    }

    pub fn in_degree(&self, id: NoteId) -> Result<usize> {
        Ok(self.degree_at(self.node(id)?, Direction::Incoming))
    }

    pub fn out_degree(&self, id: NoteId) -> Result<usize> {
        Ok(self.degree_at(self.node(id)?, Direction::Outgoing))
    }

    /// `(outgoing, incoming)` edge counts for a note.
    pub fn edges_count(&self, id: NoteId) -> Result<(usize, usize)> {
        let idx = self.node(id)?;
        Ok((
            self.degree_at(idx, Direction::Outgoing),
            self.degree_at(idx, Direction::Incoming),
        ))
    }

    /// Direct neighbours of `idx` in one direction, sorted by note id.
    pub(crate) fn neighbors_at(&self, idx: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self.graph.neighbors_directed(idx, direction).collect();
        out.sort_by_key(|&n| self.id_at(n));
        out.dedup();
        out
    }

    /// Notes referenced by `id`.
    pub fn references_from(&self, id: NoteId) -> Result<Vec<NoteId>> {
        let idx = self.node(id)?;
        Ok(self
            .neighbors_at(idx, Direction::Outgoing)
            .into_iter()
            .map(|n| self.id_at(n))
            .collect())
    }

    /// Notes referencing `id`.
    pub fn referenced_by(&self, id: NoteId) -> Result<Vec<NoteId>> {
        let idx = self.node(id)?;
        Ok(self
            .neighbors_at(idx, Direction::Incoming)
            .into_iter()
            .map(|n| self.id_at(n))
            .collect())
    }

    /// The edge `source -> target`, if present.
    pub fn reference(&self, source: NoteId, target: NoteId) -> Option<&Reference> {
        let u = *self.index.get(&source)?;
        let v = *self.index.get(&target)?;
        self.graph.find_edge(u, v).map(|e| &self.graph[e])
    }

    /// Every edge as `(source, target, reference)`, sorted by endpoints.
    pub fn references(&self) -> Vec<(NoteId, NoteId, &Reference)> {
        let mut edges: Vec<_> = self
            .graph
            .edge_references()
            .map(|e| (self.id_at(e.source()), self.id_at(e.target()), e.weight()))
            .collect();
        edges.sort_by_key(|&(u, v, _)| (u, v));
        edges
    }

    /// Set of edges as id pairs.
    pub fn edge_set(&self) -> BTreeSet<(NoteId, NoteId)> {
        self.references().into_iter().map(|(u, v, _)| (u, v)).collect()
    }

    /// Graphviz DOT rendering of the whole graph.
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::new(&self.graph))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::note::Link;

    /// Note `id` linking to each target, labelled after the target.
    pub(crate) fn note(id: NoteId, targets: &[NoteId]) -> Note {
        let links = targets
            .iter()
            .map(|&t| Link::new(format!("to {}", t), t))
            .collect();
        Note::new(id, format!("Note {}", id), "").with_links(links)
    }

    #[test]
    fn test_insert_note_rejects_duplicates() {
        let mut graph = NoteGraph::new();
        graph.insert_note(note(1, &[])).unwrap();
        assert!(graph.contains(1));
        let err = graph.insert_note(note(1, &[])).unwrap_err();
        assert!(matches!(err, ZettelError::InvalidInput(_)));
    }

    #[test]
    fn test_note_lookup_not_found() {
        let graph = NoteGraph::build(vec![note(1, &[])]);
        assert_eq!(graph.note(1).unwrap().title, "Note 1");
        assert!(matches!(graph.note(7), Err(ZettelError::NotFound(7))));
        assert!(matches!(graph.in_degree(7), Err(ZettelError::NotFound(7))));
    }

    #[test]
    fn test_degree_sums_match_edge_count() {
        let graph = NoteGraph::build(vec![
            note(1, &[2, 3]),
            note(2, &[3]),
            note(3, &[1, 3]),
            note(4, &[]),
        ]);
        let ids = graph.ids();
        let outs: usize = ids.iter().map(|&id| graph.out_degree(id).unwrap()).sum();
        let ins: usize = ids.iter().map(|&id| graph.in_degree(id).unwrap()).sum();
        assert_eq!(outs, graph.edge_count());
        assert_eq!(ins, graph.edge_count());
        assert_eq!(graph.edge_count(), 5);
    }

    #[test]
    fn test_neighbour_lookups() {
        let graph = NoteGraph::build(vec![note(1, &[3, 2]), note(2, &[]), note(3, &[2])]);
        assert_eq!(graph.references_from(1).unwrap(), vec![2, 3]);
        assert_eq!(graph.referenced_by(2).unwrap(), vec![1, 3]);
        assert_eq!(graph.edges_count(2).unwrap(), (0, 2));
    }

    #[test]
    fn test_to_dot_contains_labels() {
        let graph = NoteGraph::build(vec![note(1, &[2]), note(2, &[])]);
        let dot = graph.to_dot();
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("1. Note 1"));
        assert!(dot.contains("to 2"));
    }
}
