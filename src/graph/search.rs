//! Literal full-text lookup over titles and plain text.

use regex::RegexBuilder;

use super::NoteGraph;
use crate::note::Note;
use crate::{Result, ZettelError};

impl NoteGraph {
    /// Notes whose title or text contains `term`, case-insensitive.
    pub fn find(&self, term: &str) -> Result<Vec<&Note>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(ZettelError::InvalidInput("empty search term".to_string()));
        }
        let pattern = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()
            .map_err(|e| ZettelError::InvalidInput(e.to_string()))?;

        Ok(self
            .notes()
            .into_iter()
            .filter(|n| pattern.is_match(&n.title) || pattern.is_match(&n.plain_text))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_case_insensitive() {
        let graph = NoteGraph::build(vec![
            Note::new(1, "Purus vitae", "Aenean vel purus"),
            Note::new(2, "Ante vel ipsum", "In pulvinar varius ante."),
            Note::new(3, "feugiat", "Morbi (placerat) gravida"),
        ]);
        let ids: Vec<_> = graph.find("VEL").unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2]);
        let ids: Vec<_> = graph.find("(placerat)").unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![3]);
        assert!(graph.find("nothing here").unwrap().is_empty());
    }

    #[test]
    fn test_find_empty_term() {
        let graph = NoteGraph::new();
        assert!(matches!(graph.find("  "), Err(ZettelError::InvalidInput(_))));
    }
}
