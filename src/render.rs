//! Plain text / markdown rendering of query results.

use std::fmt::Write;

use crate::graph::{Cluster, LatticePath, NoteGraph, RankedNote, References, RegisterGroup, Statistics};
use crate::note::NoteId;

fn title(graph: &NoteGraph, id: NoteId) -> &str {
    graph.note(id).map(|n| n.title.as_str()).unwrap_or("?")
}

/// `"   12. Title"`
pub fn note_line(graph: &NoteGraph, id: NoteId) -> String {
    format!("{:>5}. {}", id, title(graph, id))
}

/// One note line per id, with an optional bracketed count.
pub fn render_notes<I>(graph: &NoteGraph, items: I) -> String
where
    I: IntoIterator<Item = (NoteId, Option<usize>)>,
{
    let mut out = String::new();
    for (id, count) in items {
        out.push_str(&note_line(graph, id));
        if let Some(c) = count {
            write!(out, " [{}]", c).ok();
        }
        out.push('\n');
    }
    out
}

/// Markdown index of the maps of content.
pub fn render_index(graph: &NoteGraph, clusters: &[Cluster]) -> String {
    let mut out = String::from("# Generated index\n");
    for (i, cluster) in clusters.iter().enumerate() {
        writeln!(
            out,
            "\n## Cluster: {:0>5} ({})\n",
            i + 1,
            title(graph, cluster.label)
        )
        .ok();
        for &id in &cluster.members {
            let (f, t) = graph.edges_count(id).unwrap_or((0, 0));
            writeln!(
                out,
                "* [{}]({}) [in:{}, out:{}]",
                title(graph, id),
                id,
                t,
                f
            )
            .ok();
        }
    }
    out
}

/// Alphabetical register with back references.
pub fn render_register(groups: &[RegisterGroup]) -> String {
    let mut out = String::from("# Register\n");
    for group in groups {
        writeln!(out, "\n## {}\n", group.letter).ok();
        for entry in &group.entries {
            let refs: Vec<String> = entry
                .references
                .iter()
                .map(|(id, label)| format!("[{}]({})", label, id))
                .collect();
            if refs.is_empty() {
                writeln!(out, "* [{}]({})", entry.title, entry.id).ok();
            } else {
                writeln!(out, "* [{}]({}): {}", entry.title, entry.id, refs.join(", ")).ok();
            }
        }
    }
    out
}

pub fn render_statistics(stats: &Statistics) -> String {
    let mut out = String::new();
    writeln!(out, "{:-<50}", "").ok();
    writeln!(out, "{:<25} {:>12}", "Notes", stats.notes).ok();
    writeln!(out, "{:<25} {:>12}", "References", stats.references).ok();
    writeln!(
        out,
        "{:<25} {:>12}",
        "Degree min/avg/max",
        format!("{}/{:.2}/{}", stats.degree_min, stats.degree_avg, stats.degree_max)
    )
    .ok();
    writeln!(out, "{:<25} {:>12}", "Words", stats.words_total).ok();
    writeln!(out, "{:<25} {:>12.1}", "Words per note", stats.words_avg).ok();
    writeln!(
        out,
        "{:<25} {:>12}",
        "Entry notes",
        format!("{} ({:.1}%)", stats.entry_notes, stats.entry_pct)
    )
    .ok();
    writeln!(
        out,
        "{:<25} {:>12}",
        "Exit notes",
        format!("{} ({:.1}%)", stats.exit_notes, stats.exit_pct)
    )
    .ok();
    writeln!(out, "{:-<50}", "").ok();
    out
}

pub fn render_lint(graph: &NoteGraph, pairs: &[(NoteId, NoteId)]) -> String {
    if pairs.is_empty() {
        return "No reciprocal references found\n".to_string();
    }
    let mut out = String::new();
    for &(u, v) in pairs {
        writeln!(
            out,
            "{} <-> {}",
            note_line(graph, u).trim_start(),
            note_line(graph, v).trim_start()
        )
        .ok();
    }
    out
}

/// Note ids of a path joined by arrows.
pub fn render_path(path: &[NoteId]) -> String {
    path.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub fn render_lattice(graph: &NoteGraph, lattice: &[LatticePath]) -> String {
    let mut out = String::new();
    for entry in lattice {
        writeln!(
            out,
            "{} [in:{}, distance:{}]\n       {}",
            note_line(graph, entry.entry),
            entry.in_degree,
            entry.distance,
            render_path(&entry.path)
        )
        .ok();
    }
    out
}

pub fn render_references(graph: &NoteGraph, refs: &References) -> String {
    let mut out = format!("References to {}\n", note_line(graph, refs.note).trim_start());
    for &id in &refs.predecessors {
        writeln!(out, "{}", note_line(graph, id)).ok();
    }
    if !refs.suggestions.is_empty() {
        out.push_str("\nSuggested routes\n");
        for s in &refs.suggestions {
            let entries: Vec<String> = s.entries.iter().map(|e| e.to_string()).collect();
            writeln!(out, "{} [entries: {}]", note_line(graph, s.exit), entries.join(", ")).ok();
        }
    }
    out
}

pub fn render_ranking(graph: &NoteGraph, ranked: &[RankedNote]) -> String {
    let mut out = String::new();
    for r in ranked {
        writeln!(out, "{} [in:{}, score:{:.4}]", note_line(graph, r.id), r.in_degree, r.score).ok();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::{Link, Note};

    fn graph() -> NoteGraph {
        NoteGraph::build(vec![
            Note::new(1, "Alpha", "").with_links(vec![Link::new("b", 2)]),
            Note::new(2, "Beta", "").with_links(vec![Link::new("a", 1)]),
            Note::new(3, "Gamma", ""),
        ])
    }

    #[test]
    fn test_note_line() {
        assert_eq!(note_line(&graph(), 3), "    3. Gamma");
    }

    #[test]
    fn test_render_index() {
        let graph = graph();
        let clusters = vec![Cluster {
            label: 1,
            members: vec![1, 2],
        }];
        let out = render_index(&graph, &clusters);
        assert!(out.starts_with("# Generated index\n"));
        assert!(out.contains("## Cluster: 00001 (Alpha)"));
        assert!(out.contains("* [Beta](2) [in:1, out:1]"));
    }

    #[test]
    fn test_render_lint() {
        let graph = graph();
        assert_eq!(render_lint(&graph, &[(1, 2)]), "1. Alpha <-> 2. Beta\n");
        assert!(render_lint(&graph, &[]).starts_with("No reciprocal"));
    }

    #[test]
    fn test_render_path() {
        assert_eq!(render_path(&[1, 3, 4]), "1 -> 3 -> 4");
    }
}
