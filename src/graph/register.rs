//! Alphabetical register of all notes.

use std::collections::BTreeMap;

use petgraph::Direction;
use serde::Serialize;

use super::NoteGraph;
use crate::note::NoteId;

/// Group key for notes with an empty title.
const UNTITLED: char = '#';

/// One note in the register with the notes referencing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterEntry {
    pub id: NoteId,
    pub title: String,
    /// `(predecessor id, link label)` sorted by predecessor id.
    pub references: Vec<(NoteId, String)>,
}

/// All notes whose title starts with `letter`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterGroup {
    pub letter: char,
    pub entries: Vec<RegisterEntry>,
}

impl NoteGraph {
    /// Notes grouped by the uppercased first character of their title,
    /// groups in character order, entries sorted by title.
    pub fn register(&self) -> Vec<RegisterGroup> {
        let mut groups: BTreeMap<char, Vec<RegisterEntry>> = BTreeMap::new();

        for note in self.notes() {
            let idx = self.index[&note.id];
            let letter = note
                .title
                .chars()
                .next()
                .and_then(|c| c.to_uppercase().next())
                .unwrap_or(UNTITLED);
            let references = self
                .neighbors_at(idx, Direction::Incoming)
                .into_iter()
                .filter_map(|p| {
                    let edge = self.graph.find_edge(p, idx)?;
                    Some((self.id_at(p), self.graph[edge].label.clone()))
                })
                .collect();
            groups.entry(letter).or_default().push(RegisterEntry {
                id: note.id,
                title: note.title.clone(),
                references,
            });
        }

        groups
            .into_iter()
            .map(|(letter, mut entries)| {
                entries.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
                RegisterGroup { letter, entries }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::{Link, Note};

    #[test]
    fn test_register_groups_and_references() {
        let graph = NoteGraph::build(vec![
            Note::new(1, "beta", "").with_links(vec![Link::new("see alpha", 3)]),
            Note::new(2, "Bravo", "").with_links(vec![Link::new("alpha!", 3)]),
            Note::new(3, "Alpha", ""),
            Note::new(4, "", ""),
        ]);
        let register = graph.register();
        let letters: Vec<char> = register.iter().map(|g| g.letter).collect();
        assert_eq!(letters, vec!['#', 'A', 'B']);

        let b = &register[2];
        let titles: Vec<&str> = b.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Bravo", "beta"]);

        let alpha = &register[1].entries[0];
        assert_eq!(
            alpha.references,
            vec![(1, "see alpha".to_string()), (2, "alpha!".to_string())]
        );
    }
}
