//! Markdown note parsing: YAML front matter, internal links, plain text.

use pulldown_cmark::{Event, Parser as CmarkParser, Tag, TagEnd};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ZettelError};
use crate::note::{Link, Note, NoteId};

/// Metadata header of a note.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FrontMatter {
    pub title: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub entry: bool,
    #[serde(default, rename = "hide", alias = "hidden", skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Split `---` delimited front matter from the body.
///
/// Returns `(None, content)` when the content has no complete header block.
pub fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return (None, content);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, content)
}

/// Internal links and plain text extracted from a markdown body.
#[derive(Debug, Clone, Default)]
pub struct ParsedBody {
    pub links: Vec<Link>,
    pub plain_text: String,
    pub word_count: usize,
}

/// Walk the markdown events of `body`.
///
/// Links whose destination is a positive integer are internal; every other
/// destination is external and dropped. The label is the text inside the link.
pub fn parse_body(body: &str) -> ParsedBody {
    let mut links = Vec::new();
    let mut text = String::new();
    // (internal target, label so far) while inside a link
    let mut current: Option<(Option<NoteId>, String)> = None;

    for event in CmarkParser::new(body) {
        match event {
            Event::Start(Tag::Link { dest_url, .. }) => {
                let target = dest_url.trim().parse::<NoteId>().ok().filter(|&t| t > 0);
                current = Some((target, String::new()));
            }
            Event::End(TagEnd::Link) => {
                if let Some((Some(target), label)) = current.take() {
                    links.push(Link::new(label.trim(), target));
                }
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some((_, label)) = current.as_mut() {
                    label.push_str(&t);
                }
                text.push_str(&t);
            }
            Event::SoftBreak | Event::HardBreak | Event::End(_) => text.push(' '),
            _ => {}
        }
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    ParsedBody {
        links,
        word_count: words.len(),
        plain_text: words.join(" "),
    }
}

/// Parse a complete note file.
pub fn parse_note(id: NoteId, content: &str) -> Result<Note> {
    let (header, body) = split_front_matter(content);
    let header =
        header.ok_or_else(|| ZettelError::Parse(format!("note {} has no front matter", id)))?;
    let meta: FrontMatter = serde_yaml_ng::from_str(header)
        .map_err(|e| ZettelError::Parse(format!("front matter of note {}: {}", id, e)))?;

    let parsed = parse_body(body);
    Ok(Note {
        id,
        title: meta.title,
        date: meta.date,
        modified: None,
        tags: meta.tags.into_iter().collect(),
        entry: meta.entry,
        hidden: meta.hidden,
        body: body.trim_start_matches(['\r', '\n']).to_string(),
        links: parsed.links,
        word_count: parsed.word_count,
        plain_text: parsed.plain_text,
    })
}

/// Serialize a note back into its on-disk form.
pub fn render_note_file(note: &Note) -> Result<String> {
    let meta = FrontMatter {
        title: note.title.clone(),
        date: note.date.clone(),
        entry: note.entry,
        hidden: note.hidden,
        tags: note.tags.iter().cloned().collect(),
    };
    let header = serde_yaml_ng::to_string(&meta)
        .map_err(|e| ZettelError::Parse(format!("front matter of note {}: {}", note.id, e)))?;
    Ok(format!("---\n{}---\n\n{}", header, note.body))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTE_01: &str = r#"---
title: "Purus vitae"
date: "2020-08-09T00:00:00.000000"
---

Aenean vel purus vitae felis consectetur hendrerit at in enim. Quisque et purus
libero. Vestibulum in [ipsum](3) nisi. Maecenas condimentum leo congue ornare
dictum. Quisque ac facilisis nunc. Fusce [quis](3) lobortis nisi.
See also [the docs](https://example.org).
"#;

    #[test]
    fn test_parse_note_links_and_metadata() {
        let note = parse_note(1, NOTE_01).unwrap();
        assert_eq!(note.id, 1);
        assert_eq!(note.title, "Purus vitae");
        assert_eq!(note.date, "2020-08-09T00:00:00.000000");
        assert!(!note.entry);
        assert!(!note.hidden);
        assert!(note.tags.is_empty());
        assert_eq!(note.links, vec![Link::new("ipsum", 3), Link::new("quis", 3)]);
        assert!(note.plain_text.contains("the docs"));
        assert!(note.body.starts_with("Aenean"));
    }

    #[test]
    fn test_parse_note_flags_and_tags() {
        let content = "---\ntitle: Index\ndate: 2021-01-01\nentry: true\nhide: true\ntags: [a, b]\n---\nBody\n";
        let note = parse_note(5, content).unwrap();
        assert!(note.entry);
        assert!(note.hidden);
        assert_eq!(note.tags.len(), 2);
        assert_eq!(note.word_count, 1);

        let content = "---\ntitle: Draft\ndate: x\nhidden: true\n---\n";
        assert!(parse_note(6, content).unwrap().hidden);
    }

    #[test]
    fn test_parse_note_missing_title() {
        let content = "---\ndate: 2021-01-01\n---\nBody\n";
        assert!(matches!(parse_note(1, content), Err(ZettelError::Parse(_))));
        assert!(matches!(parse_note(1, "no header"), Err(ZettelError::Parse(_))));
    }

    #[test]
    fn test_parse_body_word_count() {
        let parsed = parse_body("# Heading\n\nOne *two* `three` [four](12)");
        assert_eq!(parsed.word_count, 5);
        assert_eq!(parsed.plain_text, "Heading One two three four");
        assert_eq!(parsed.links, vec![Link::new("four", 12)]);
    }

    #[test]
    fn test_split_front_matter() {
        assert_eq!(split_front_matter("plain"), (None, "plain"));
        assert_eq!(split_front_matter("---\na: 1\n"), (None, "---\na: 1\n"));
        assert_eq!(
            split_front_matter("---\na: 1\n---\nbody"),
            (Some("a: 1\n"), "body")
        );
    }

    #[test]
    fn test_render_note_file_parses_back() {
        let mut note = Note::new(4, "Test: note", "Some text [x](1)");
        note.entry = true;
        let content = render_note_file(&note).unwrap();
        assert!(content.starts_with("---\n"));
        let parsed = parse_note(4, &content).unwrap();
        assert_eq!(parsed.title, "Test: note");
        assert_eq!(parsed.date, note.date);
        assert!(parsed.entry);
        assert_eq!(parsed.links, vec![Link::new("x", 1)]);
    }
}
