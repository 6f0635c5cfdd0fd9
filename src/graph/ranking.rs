//! Importance ranking (PageRank, power iteration).

use std::collections::HashMap;

use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;
use serde::Serialize;

use super::NoteGraph;
use crate::config::RankingConfig;
use crate::note::NoteId;

/// A note with its PageRank score and in-degree for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedNote {
    pub id: NoteId,
    pub score: f64,
    pub in_degree: usize,
}

impl NoteGraph {
    /// PageRank score of every note, normalized to sum to 1.0.
    pub fn pagerank(&self, config: &RankingConfig) -> HashMap<NoteId, f64> {
        let nodes: Vec<NodeIndex> = self.ids().into_iter().map(|id| self.index[&id]).collect();
        let n = nodes.len();
        if n == 0 {
            return HashMap::new();
        }
        let position: HashMap<NodeIndex, usize> =
            nodes.iter().enumerate().map(|(i, &idx)| (idx, i)).collect();
        let outgoing: Vec<Vec<usize>> = nodes
            .iter()
            .map(|&idx| {
                self.neighbors_at(idx, Direction::Outgoing)
                    .iter()
                    .map(|next| position[next])
                    .collect()
            })
            .collect();

        let damping = config.damping;
        let mut scores = vec![1.0 / n as f64; n];
        let mut next = vec![0.0; n];

        for iteration in 0..config.max_iterations {
            next.iter_mut().for_each(|s| *s = (1.0 - damping) / n as f64);

            for (i, targets) in outgoing.iter().enumerate() {
                if targets.is_empty() {
                    // Dangling note: spread evenly
                    let share = damping * scores[i] / n as f64;
                    next.iter_mut().for_each(|s| *s += share);
                } else {
                    let share = damping * scores[i] / targets.len() as f64;
                    for &t in targets {
                        next[t] += share;
                    }
                }
            }

            let diff: f64 = scores.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
            std::mem::swap(&mut scores, &mut next);
            if diff < config.tolerance {
                log::debug!("PageRank converged after {} iterations", iteration + 1);
                break;
            }
        }

        let total: f64 = scores.iter().sum();
        if total > 0.0 {
            scores.iter_mut().for_each(|s| *s /= total);
        }

        nodes
            .iter()
            .zip(scores)
            .map(|(&idx, score)| (self.id_at(idx), score))
            .collect()
    }

    /// The `config.top` most important notes, highest score first.
    pub fn rank(&self, config: &RankingConfig) -> Vec<RankedNote> {
        let mut ranked: Vec<RankedNote> = self
            .pagerank(config)
            .into_iter()
            .map(|(id, score)| RankedNote {
                id,
                score,
                in_degree: self.degree_at(self.index[&id], Direction::Incoming),
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
        ranked.truncate(config.top);
        ranked
    }
}
