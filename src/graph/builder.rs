//! Graph construction from parsed note records.

use std::collections::BTreeSet;

use petgraph::stable_graph::NodeIndex;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;

use super::NoteGraph;
use crate::note::{Note, NoteId};

impl NoteGraph {
    /// Build the note graph.
    ///
    /// 1. one node per note (later duplicates of an id are skipped)
    /// 2. one edge per distinct `(source, target)` pair, first label wins;
    ///    links to unknown ids are logged and skipped
    /// 3. hidden notes are removed together with all of their ancestors
    /// 4. edge weights are set from the final in-degrees
    pub fn build(notes: Vec<Note>) -> Self {
        let mut graph = NoteGraph::new();

        let mut links = Vec::with_capacity(notes.len());
        for note in notes {
            let id = note.id;
            let outgoing = note.links.clone();
            if let Err(e) = graph.insert_note(note) {
                log::warn!("Skipping note {}: {}", id, e);
                continue;
            }
            links.push((id, outgoing));
        }

        for (u, outgoing) in links {
            for link in outgoing {
                let v = link.target;
                if !graph.contains(v) {
                    log::error!("Invalid link {} in note {}", v, u);
                    continue;
                }
                if graph.add_reference(u, v, &link.label) {
                    log::debug!("Add edge from {} to {}", u, v);
                }
            }
        }

        let pruned = graph.hidden_closure();
        if !pruned.is_empty() {
            log::info!(
                "Pruning {} notes leading into hidden notes: {:?}",
                pruned.len(),
                pruned
            );
            graph.remove_notes(&pruned);
        }

        graph.recompute_weights();

        log::info!(
            "Built note graph: {} notes, {} references",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }

    /// Every hidden note plus all of its direct and transitive predecessors.
    fn hidden_closure(&self) -> BTreeSet<NoteId> {
        let hidden: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|&idx| self.graph[idx].hidden)
            .collect();
        if hidden.is_empty() {
            return BTreeSet::new();
        }
        self.reach(&hidden, Direction::Incoming, None)
            .into_iter()
            .map(|idx| self.id_at(idx))
            .collect()
    }

    fn remove_notes(&mut self, ids: &BTreeSet<NoteId>) {
        for id in ids {
            if let Some(idx) = self.index.remove(id) {
                self.graph.remove_node(idx);
            }
        }
    }

    /// Second pass over the finished edge set.
    fn recompute_weights(&mut self) {
        let weights: Vec<_> = self
            .graph
            .edge_references()
            .map(|e| {
                let w = self.degree_at(e.source(), Direction::Incoming)
                    + self.degree_at(e.target(), Direction::Incoming);
                (e.id(), w as u64)
            })
            .collect();
        for (edge, weight) in weights {
            self.graph[edge].weight = weight;
        }
    }
}
