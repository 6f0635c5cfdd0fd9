//! Reachability and weighted shortest-path queries.
//!
//! All walks use an explicit work-list plus visited set.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet, VecDeque};

use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use super::NoteGraph;
use crate::note::NoteId;
use crate::Result;

/// Shortest path from a note to one reachable entry note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatticePath {
    pub entry: NoteId,
    pub in_degree: usize,
    pub distance: u64,
    /// Note ids from the start note to `entry`, both inclusive.
    pub path: Vec<NoteId>,
}

/// An exit note accepted as a reference suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub exit: NoteId,
    /// Candidate entry notes reachable from `exit`.
    pub entries: Vec<NoteId>,
}

/// Existing references to a note plus novel routes leading into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct References {
    pub note: NoteId,
    /// Direct predecessors, ascending.
    pub predecessors: Vec<NoteId>,
    /// Accepted exit notes in scan order.
    pub suggestions: Vec<Suggestion>,
}

/// Single-source Dijkstra result keeping every tied predecessor.
struct ShortestPaths {
    source: NodeIndex,
    dist: HashMap<NodeIndex, u64>,
    preds: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl ShortestPaths {
    /// All tied shortest paths ending at `target`, in lexicographic id order.
    fn all_to(&self, graph: &NoteGraph, target: NodeIndex) -> Vec<Vec<NoteId>> {
        if !self.dist.contains_key(&target) {
            return Vec::new();
        }
        let mut paths = Vec::new();
        let mut stack = vec![vec![target]];
        while let Some(trail) = stack.pop() {
            let last = trail[trail.len() - 1];
            if last == self.source {
                paths.push(trail.iter().rev().map(|&n| graph.id_at(n)).collect());
                continue;
            }
            for &p in self.preds.get(&last).into_iter().flatten() {
                let mut next = trail.clone();
                next.push(p);
                stack.push(next);
            }
        }
        paths.sort();
        paths
    }

    /// One shortest path to `target`, following the lowest-id predecessor.
    fn first_to(&self, graph: &NoteGraph, target: NodeIndex) -> Vec<NoteId> {
        let mut path = vec![graph.id_at(target)];
        let mut current = target;
        while current != self.source {
            match self.preds.get(&current).and_then(|p| p.first()) {
                Some(&p) => {
                    path.push(graph.id_at(p));
                    current = p;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }
}

impl NoteGraph {
    /// Breadth-first expansion from `seeds`, at most `max_depth` hops.
    pub(crate) fn reach(
        &self,
        seeds: &[NodeIndex],
        direction: Direction,
        max_depth: Option<usize>,
    ) -> HashSet<NodeIndex> {
        let mut visited: HashSet<NodeIndex> = seeds.iter().copied().collect();
        let mut queue: VecDeque<(NodeIndex, usize)> = seeds.iter().map(|&s| (s, 0)).collect();

        while let Some((idx, depth)) = queue.pop_front() {
            if max_depth.is_some_and(|max| depth >= max) {
                continue;
            }
            for next in self.graph.neighbors_directed(idx, direction) {
                if visited.insert(next) {
                    queue.push_back((next, depth + 1));
                }
            }
        }
        visited
    }

    fn ids_of(&self, nodes: HashSet<NodeIndex>) -> BTreeSet<NoteId> {
        nodes.into_iter().map(|idx| self.id_at(idx)).collect()
    }

    /// The note plus every note within `depth` forward hops.
    pub fn successors(&self, id: NoteId, depth: usize) -> Result<BTreeSet<NoteId>> {
        let idx = self.node(id)?;
        Ok(self.ids_of(self.reach(&[idx], Direction::Outgoing, Some(depth))))
    }

    /// The note plus every note within `depth` reverse hops.
    pub fn predecessors(&self, id: NoteId, depth: usize) -> Result<BTreeSet<NoteId>> {
        let idx = self.node(id)?;
        Ok(self.ids_of(self.reach(&[idx], Direction::Incoming, Some(depth))))
    }

    /// Every note that eventually leads into any of the seeds, seeds included.
    ///
    /// Fails with `NotFound` on the first unknown seed.
    pub fn collect<I>(&self, seeds: I) -> Result<BTreeSet<NoteId>>
    where
        I: IntoIterator<Item = NoteId>,
    {
        let seeds = seeds
            .into_iter()
            .map(|id| self.node(id))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.ids_of(self.reach(&seeds, Direction::Incoming, None)))
    }

    /// Every note reachable by following references from `id`, itself included.
    pub fn descendants(&self, id: NoteId) -> Result<BTreeSet<NoteId>> {
        let idx = self.node(id)?;
        Ok(self.ids_of(self.reach(&[idx], Direction::Outgoing, None)))
    }

    /// Whether `target` is reachable from `source`.
    pub fn has_path(&self, source: NoteId, target: NoteId) -> Result<bool> {
        let s = self.node(source)?;
        let t = self.node(target)?;
        Ok(self.reach(&[s], Direction::Outgoing, None).contains(&t))
    }

    fn shortest_paths(&self, source: NodeIndex) -> ShortestPaths {
        let mut dist: HashMap<NodeIndex, u64> = HashMap::new();
        let mut preds: HashMap<NodeIndex, Vec<NodeIndex>> = HashMap::new();
        let mut done: HashSet<NodeIndex> = HashSet::new();
        let mut heap = BinaryHeap::new();

        dist.insert(source, 0);
        heap.push(Reverse((0u64, self.id_at(source), source)));

        while let Some(Reverse((d, _, u))) = heap.pop() {
            if !done.insert(u) {
                continue;
            }
            for edge in self.graph.edges_directed(u, Direction::Outgoing) {
                let v = edge.target();
                let candidate = d + edge.weight().weight;
                match dist.get(&v).copied() {
                    Some(best) if candidate > best => {}
                    Some(best) if candidate == best => {
                        if v != source {
                            preds.entry(v).or_default().push(u);
                        }
                    }
                    _ => {
                        dist.insert(v, candidate);
                        preds.insert(v, vec![u]);
                        heap.push(Reverse((candidate, self.id_at(v), v)));
                    }
                }
            }
        }

        for list in preds.values_mut() {
            list.sort_by_key(|&p| self.id_at(p));
            list.dedup();
        }
        ShortestPaths {
            source,
            dist,
            preds,
        }
    }

    /// All minimum-weight paths from `source` to `target`.
    ///
    /// An empty result means no path exists; unknown endpoints are errors.
    pub fn paths_between(&self, source: NoteId, target: NoteId) -> Result<Vec<Vec<NoteId>>> {
        let s = self.node(source)?;
        let t = self.node(target)?;
        Ok(self.shortest_paths(s).all_to(self, t))
    }

    /// Shortest paths from `id` to every other reachable entry note,
    /// entry notes with the most incoming references first.
    pub fn lattice(&self, id: NoteId) -> Result<Vec<LatticePath>> {
        let source = self.node(id)?;
        let tree = self.shortest_paths(source);

        let mut lattice: Vec<LatticePath> = tree
            .dist
            .iter()
            .filter(|&(&t, _)| t != source && self.is_entry_at(t))
            .map(|(&t, &distance)| LatticePath {
                entry: self.id_at(t),
                in_degree: self.degree_at(t, Direction::Incoming),
                distance,
                path: tree.first_to(self, t),
            })
            .collect();
        lattice.sort_by(|a, b| b.in_degree.cmp(&a.in_degree).then(a.entry.cmp(&b.entry)));
        Ok(lattice)
    }

    /// Weighted distance from `id` to every reachable note, farthest first.
    pub fn train_of_thought(&self, id: NoteId) -> Result<Vec<(u64, NoteId)>> {
        let source = self.node(id)?;
        let mut train: Vec<(u64, NoteId)> = self
            .shortest_paths(source)
            .dist
            .into_iter()
            .map(|(idx, d)| (d, self.id_at(idx)))
            .collect();
        train.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        Ok(train)
    }

    /// Existing references to `id` plus exit notes opening novel routes into it.
    ///
    /// Candidates are shuffled before scanning, so suggestions vary between
    /// calls.
    pub fn references_to(
        &self,
        id: NoteId,
        exits: &[NoteId],
        entries: &[NoteId],
    ) -> Result<References> {
        self.references_to_with_rng(id, exits, entries, &mut rand::thread_rng())
    }

    pub fn references_to_with_rng<R: Rng + ?Sized>(
        &self,
        id: NoteId,
        exits: &[NoteId],
        entries: &[NoteId],
        rng: &mut R,
    ) -> Result<References> {
        let mut order = exits.to_vec();
        order.shuffle(rng);
        self.references_in_order(id, &order, entries)
    }

    /// Deterministic core of [`NoteGraph::references_to`]: scans `exits` in
    /// the given order and accepts an exit only if it reaches at least one
    /// candidate entry note not covered by an earlier accepted exit.
    pub fn references_in_order(
        &self,
        id: NoteId,
        exits: &[NoteId],
        entries: &[NoteId],
    ) -> Result<References> {
        let target = self.node(id)?;
        let entries: BTreeSet<NoteId> = entries
            .iter()
            .map(|&e| self.node(e).map(|_| e))
            .collect::<Result<_>>()?;
        let predecessors: Vec<NoteId> = self
            .neighbors_at(target, Direction::Incoming)
            .into_iter()
            .map(|n| self.id_at(n))
            .collect();

        let mut covered: BTreeSet<NoteId> = BTreeSet::new();
        let mut suggestions = Vec::new();
        for &exit in exits {
            let e = self.node(exit)?;
            if exit == id || predecessors.contains(&exit) {
                continue;
            }
            let reachable = self.reach(&[e], Direction::Outgoing, None);
            if !reachable.contains(&target) {
                continue;
            }
            let reached: Vec<NoteId> = self
                .ids_of(reachable)
                .intersection(&entries)
                .copied()
                .collect();
            if reached.iter().all(|r| covered.contains(r)) {
                log::debug!("Skipping exit {}: no new entry notes", exit);
                continue;
            }
            covered.extend(reached.iter().copied());
            suggestions.push(Suggestion {
                exit,
                entries: reached,
            });
        }

        Ok(References {
            note: id,
            predecessors,
            suggestions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::note;
    use crate::ZettelError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn chain() -> NoteGraph {
        // 1 -> 2 -> 3 -> 4, 5 -> 3
        NoteGraph::build(vec![
            note(1, &[2]),
            note(2, &[3]),
            note(3, &[4]),
            note(4, &[]),
            note(5, &[3]),
        ])
    }

    #[test]
    fn test_successors_exact_radius() {
        let graph = chain();
        assert_eq!(graph.successors(1, 0).unwrap(), BTreeSet::from([1]));
        assert_eq!(graph.successors(1, 1).unwrap(), BTreeSet::from([1, 2]));
        assert_eq!(graph.successors(1, 2).unwrap(), BTreeSet::from([1, 2, 3]));
        assert_eq!(graph.successors(1, 10).unwrap(), BTreeSet::from([1, 2, 3, 4]));
    }

    #[test]
    fn test_predecessors_exact_radius() {
        let graph = chain();
        assert_eq!(graph.predecessors(3, 1).unwrap(), BTreeSet::from([2, 3, 5]));
        assert_eq!(graph.predecessors(3, 2).unwrap(), BTreeSet::from([1, 2, 3, 5]));
        assert!(matches!(graph.predecessors(42, 1), Err(ZettelError::NotFound(42))));
    }

    #[test]
    fn test_collect_unions_ancestors() {
        let graph = chain();
        assert_eq!(graph.collect([2]).unwrap(), BTreeSet::from([1, 2]));
        assert_eq!(graph.collect([2, 5]).unwrap(), BTreeSet::from([1, 2, 5]));
        assert_eq!(graph.collect([4]).unwrap(), BTreeSet::from([1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_collect_unknown_seed() {
        let graph = chain();
        assert!(matches!(graph.collect([1, 99]), Err(ZettelError::NotFound(99))));
    }

    #[test]
    fn test_collect_handles_cycles() {
        let graph = NoteGraph::build(vec![note(1, &[2]), note(2, &[1]), note(3, &[3])]);
        assert_eq!(graph.collect([1]).unwrap(), BTreeSet::from([1, 2]));
        assert_eq!(graph.collect([3]).unwrap(), BTreeSet::from([3]));
    }

    #[test]
    fn test_paths_between_no_path_is_empty() {
        let graph = chain();
        assert!(graph.paths_between(4, 1).unwrap().is_empty());
        assert!(graph.paths_between(5, 1).unwrap().is_empty());
    }

    #[test]
    fn test_paths_between_unknown_endpoints() {
        let graph = chain();
        assert!(matches!(graph.paths_between(99, 1), Err(ZettelError::NotFound(99))));
        assert!(matches!(graph.paths_between(1, 98), Err(ZettelError::NotFound(98))));
    }

    #[test]
    fn test_paths_between_returns_all_ties() {
        // 1 -> 2 -> 4, 1 -> 3 -> 4: symmetric diamond, equal weights
        let graph = NoteGraph::build(vec![
            note(1, &[2, 3]),
            note(2, &[4]),
            note(3, &[4]),
            note(4, &[]),
        ]);
        let paths = graph.paths_between(1, 4).unwrap();
        assert_eq!(paths, vec![vec![1, 2, 4], vec![1, 3, 4]]);
    }

    #[test]
    fn test_paths_between_prefers_lower_weight() {
        // 1 -> 2 -> 4 and 1 -> 3 -> 4, but 2 is referenced by 5 and 6 as well
        let graph = NoteGraph::build(vec![
            note(1, &[2, 3]),
            note(2, &[4]),
            note(3, &[4]),
            note(4, &[]),
            note(5, &[2]),
            note(6, &[2]),
        ]);
        assert_eq!(graph.paths_between(1, 4).unwrap(), vec![vec![1, 3, 4]]);
    }

    #[test]
    fn test_paths_between_same_note() {
        let graph = chain();
        assert_eq!(graph.paths_between(2, 2).unwrap(), vec![vec![2]]);
    }

    #[test]
    fn test_lattice_orders_by_in_degree() {
        // 1 -> 2 (entry, in 1), 1 -> 3 -> 4 (entry, in 2 via 5)
        let graph = NoteGraph::build(vec![
            note(1, &[2, 3]),
            note(2, &[]),
            note(3, &[4]),
            note(4, &[]),
            note(5, &[4]),
        ]);
        let lattice = graph.lattice(1).unwrap();
        let entries: Vec<NoteId> = lattice.iter().map(|l| l.entry).collect();
        assert_eq!(entries, vec![4, 2]);
        assert_eq!(lattice[0].path, vec![1, 3, 4]);
        assert_eq!(lattice[1].path, vec![1, 2]);
    }

    #[test]
    fn test_lattice_excludes_start_note() {
        let graph = chain();
        assert!(graph.lattice(4).unwrap().is_empty());
        let lattice = graph.lattice(5).unwrap();
        assert_eq!(lattice.len(), 1);
        assert_eq!(lattice[0].path, vec![5, 3, 4]);
    }

    #[test]
    fn test_train_of_thought_farthest_first() {
        let graph = chain();
        let train = graph.train_of_thought(2).unwrap();
        let ids: Vec<NoteId> = train.iter().map(|&(_, id)| id).collect();
        assert_eq!(ids, vec![4, 3, 2]);
        assert_eq!(train.last(), Some(&(0, 2)));
    }

    #[test]
    fn test_has_path_and_descendants() {
        let graph = chain();
        assert!(graph.has_path(5, 4).unwrap());
        assert!(!graph.has_path(4, 5).unwrap());
        assert_eq!(graph.descendants(3).unwrap(), BTreeSet::from([3, 4]));
    }

    /// Two exit notes reaching the same entry, a third reaching a new one.
    fn reference_fixture() -> NoteGraph {
        // 10 is the target. 1 -> 10 (predecessor)
        // 2 -> 3 -> 10 -> 20 ; 4 -> 3 (same routes as 2)
        // 5 -> 10, 5 -> 21 (reaches an extra entry)
        // 6 isolated (no path)
        NoteGraph::build(vec![
            note(1, &[10]),
            note(2, &[3]),
            note(3, &[10]),
            note(4, &[3]),
            note(5, &[6, 21]),
            note(6, &[10]),
            note(7, &[]),
            note(10, &[20]),
            note(20, &[]),
            note(21, &[]),
        ])
    }

    #[test]
    fn test_references_in_order_filters_redundant_routes() {
        let graph = reference_fixture();
        let exits = graph.exit_notes();
        assert_eq!(exits, vec![1, 2, 4, 5, 7]);
        let entries = graph.entry_notes();
        assert_eq!(entries, vec![20, 21]);

        let refs = graph.references_in_order(10, &exits, &entries).unwrap();
        assert_eq!(refs.predecessors, vec![1, 3, 6]);
        let accepted: Vec<NoteId> = refs.suggestions.iter().map(|s| s.exit).collect();
        assert_eq!(accepted, vec![2, 5]);
        assert_eq!(refs.suggestions[0].entries, vec![20]);
        assert_eq!(refs.suggestions[1].entries, vec![20, 21]);
    }

    #[test]
    fn test_references_scan_order_matters() {
        let graph = reference_fixture();
        let entries = graph.entry_notes();
        let refs = graph.references_in_order(10, &[5, 4, 2], &entries).unwrap();
        let accepted: Vec<NoteId> = refs.suggestions.iter().map(|s| s.exit).collect();
        assert_eq!(accepted, vec![5]);
    }

    #[test]
    fn test_references_shuffled_accepts_one_of_equivalent_routes() {
        let graph = reference_fixture();
        let exits = graph.exit_notes();
        let entries = graph.entry_notes();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let refs = graph
                .references_to_with_rng(10, &exits, &entries, &mut rng)
                .unwrap();
            let accepted: BTreeSet<NoteId> = refs.suggestions.iter().map(|s| s.exit).collect();
            assert!(accepted.contains(&5));
            assert!(!accepted.contains(&1));
            assert!(!accepted.contains(&7));
            // 2 and 4 only ever reach entry 20 through the same route
            assert!(!(accepted.contains(&2) && accepted.contains(&4)));
        }
    }

    #[test]
    fn test_references_unknown_note() {
        let graph = reference_fixture();
        assert!(matches!(
            graph.references_to(99, &[1], &[20]),
            Err(ZettelError::NotFound(99))
        ));
        assert!(matches!(
            graph.references_in_order(10, &[98], &[20]),
            Err(ZettelError::NotFound(98))
        ));
    }
}
