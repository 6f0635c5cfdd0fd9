//! Summary statistics over the note graph.

use petgraph::Direction;
use serde::Serialize;

use super::NoteGraph;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub notes: usize,
    pub references: usize,
    pub degree_min: usize,
    pub degree_avg: f64,
    pub degree_max: usize,
    pub words_total: usize,
    pub words_avg: f64,
    pub entry_notes: usize,
    pub entry_pct: f64,
    pub exit_notes: usize,
    pub exit_pct: f64,
}

fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

impl NoteGraph {
    pub fn statistics(&self) -> Statistics {
        let notes = self.node_count();
        if notes == 0 {
            return Statistics::default();
        }

        let degrees: Vec<usize> = self
            .graph
            .node_indices()
            .map(|idx| {
                self.degree_at(idx, Direction::Incoming) + self.degree_at(idx, Direction::Outgoing)
            })
            .collect();
        let words_total: usize = self.graph.node_weights().map(|n| n.word_count).sum();
        let entry_notes = self.entry_notes().len();
        let exit_notes = self.exit_notes().len();

        Statistics {
            notes,
            references: self.edge_count(),
            degree_min: degrees.iter().copied().min().unwrap_or(0),
            degree_avg: degrees.iter().sum::<usize>() as f64 / notes as f64,
            degree_max: degrees.iter().copied().max().unwrap_or(0),
            words_total,
            words_avg: words_total as f64 / notes as f64,
            entry_notes,
            entry_pct: pct(entry_notes, notes),
            exit_notes,
            exit_pct: pct(exit_notes, notes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::{Link, Note};

    #[test]
    fn test_statistics_empty_graph() {
        assert_eq!(NoteGraph::new().statistics(), Statistics::default());
    }

    #[test]
    fn test_statistics_counts() {
        let graph = NoteGraph::build(vec![
            Note::new(1, "a", "one two three").with_links(vec![Link::new("b", 2)]),
            Note::new(2, "b", "four"),
            Note::new(3, "c", ""),
            Note::new(4, "d", "five six").with_links(vec![Link::new("b", 2)]),
        ]);
        let stats = graph.statistics();
        assert_eq!(stats.notes, 4);
        assert_eq!(stats.references, 2);
        assert_eq!(stats.degree_min, 0);
        assert_eq!(stats.degree_max, 2);
        assert!((stats.degree_avg - 1.0).abs() < f64::EPSILON);
        assert_eq!(stats.words_total, 6);
        assert!((stats.words_avg - 1.5).abs() < f64::EPSILON);
        assert_eq!(stats.entry_notes, 1);
        assert!((stats.entry_pct - 25.0).abs() < f64::EPSILON);
        assert_eq!(stats.exit_notes, 3);
        assert!((stats.exit_pct - 75.0).abs() < f64::EPSILON);
    }
}
