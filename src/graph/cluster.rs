//! Community detection for maps of content.
//!
//! Greedy modularity maximization (Clauset-Newman-Moore): every note starts
//! in its own community and the pair of adjacent communities with the largest
//! modularity gain is merged until no merge improves modularity. The graph is
//! treated as undirected with edge weight as the affinity signal.

use std::collections::{BTreeMap, HashMap};

use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use serde::Serialize;

use super::NoteGraph;
use crate::note::NoteId;

const MIN_GAIN: f64 = 1e-12;

/// A map of content: a community of notes labelled by its most referenced member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    /// Member with the highest in-degree (lowest id on ties).
    pub label: NoteId,
    /// Members in ascending id order.
    pub members: Vec<NoteId>,
}

impl NoteGraph {
    /// Partition all notes into communities, largest first.
    ///
    /// Each community is sorted by id; equally sized communities are ordered
    /// by their smallest member.
    pub fn communities(&self) -> Vec<Vec<NoteId>> {
        let ids = self.ids();
        let position: HashMap<NoteId, usize> =
            ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();

        let mut strength = vec![0.0f64; ids.len()];
        let mut links: BTreeMap<usize, BTreeMap<usize, f64>> = BTreeMap::new();
        let mut total = 0.0f64;
        for edge in self.graph.edge_references() {
            let u = position[&self.id_at(edge.source())];
            let v = position[&self.id_at(edge.target())];
            let w = edge.weight().weight as f64;
            total += w;
            strength[u] += w;
            strength[v] += w;
            if u != v {
                *links.entry(u).or_default().entry(v).or_default() += w;
                *links.entry(v).or_default().entry(u).or_default() += w;
            }
        }

        let mut members: BTreeMap<usize, Vec<NoteId>> =
            ids.iter().enumerate().map(|(i, &id)| (i, vec![id])).collect();

        if total > 0.0 {
            let m2 = 2.0 * total;
            // a_c: fraction of edge ends attached to community c
            let mut share: Vec<f64> = strength.iter().map(|k| k / m2).collect();

            loop {
                let mut best: Option<(f64, usize, usize)> = None;
                for (&c, neighbours) in &links {
                    for (&d, &w) in neighbours {
                        if d <= c {
                            continue;
                        }
                        let gain = 2.0 * (w / m2 - share[c] * share[d]);
                        if best.map_or(true, |(g, _, _)| gain > g + MIN_GAIN) {
                            best = Some((gain, c, d));
                        }
                    }
                }
                let Some((gain, keep, merged)) = best else {
                    break;
                };
                if gain <= MIN_GAIN {
                    break;
                }

                // Fold `merged` into `keep`
                let absorbed = members.remove(&merged).unwrap_or_default();
                members.entry(keep).or_default().extend(absorbed);
                share[keep] += share[merged];

                let moved = links.remove(&merged).unwrap_or_default();
                for (other, w) in moved {
                    if let Some(row) = links.get_mut(&other) {
                        row.remove(&merged);
                    }
                    if other == keep {
                        continue;
                    }
                    *links.entry(keep).or_default().entry(other).or_default() += w;
                    *links.entry(other).or_default().entry(keep).or_default() += w;
                }
            }
        }

        let mut communities: Vec<Vec<NoteId>> = members
            .into_values()
            .map(|mut c| {
                c.sort_unstable();
                c
            })
            .collect();
        communities.sort_by(|a, b| b.len().cmp(&a.len()).then(a[0].cmp(&b[0])));
        communities
    }

    /// Maps of content: communities with at least `min_size` members, each
    /// labelled by its highest in-degree note.
    pub fn map_of_content(&self, min_size: usize) -> Vec<Cluster> {
        self.communities()
            .into_iter()
            .filter(|c| c.len() >= min_size.max(2))
            .map(|members| {
                let label = members
                    .iter()
                    .copied()
                    .max_by(|&a, &b| {
                        let da = self.degree_at(self.index[&a], Direction::Incoming);
                        let db = self.degree_at(self.index[&b], Direction::Incoming);
                        da.cmp(&db).then(b.cmp(&a))
                    })
                    .unwrap_or(members[0]);
                Cluster { label, members }
            })
            .collect()
    }
}
