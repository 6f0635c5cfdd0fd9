//! Note records as handed to the graph engine.
//!
//! A [`Note`] is produced once per storage file by the markup parser and is
//! immutable afterwards. Only links whose target is a note id are kept;
//! external links never reach this type.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Unique, positive note identity (parsed from the storage key).
pub type NoteId = u64;

/// An internal reference `label -> target` found in a note body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Link text as written by the author.
    pub label: String,
    /// Referenced note id.
    pub target: NoteId,
}

impl Link {
    pub fn new(label: impl Into<String>, target: NoteId) -> Self {
        Self {
            label: label.into(),
            target,
        }
    }
}

/// A single Zettelkasten note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Creation date as written in the front matter.
    pub date: String,
    /// Last modification time of the backing file, if any.
    pub modified: Option<DateTime<Local>>,
    pub tags: BTreeSet<String>,
    /// Author marked this note as an entry point.
    pub entry: bool,
    /// Private/draft note; pruned together with everything leading into it.
    pub hidden: bool,
    /// Raw body, front matter excluded.
    pub body: String,
    /// Outgoing internal links in document order.
    pub links: Vec<Link>,
    pub word_count: usize,
    /// Plain-text rendering used for searching.
    pub plain_text: String,
}

impl Note {
    /// Create a fresh, unlinked note dated now.
    pub fn new(id: NoteId, title: impl Into<String>, body: impl Into<String>) -> Self {
        let body = body.into();
        let plain_text = body.split_whitespace().collect::<Vec<_>>().join(" ");
        Self {
            id,
            title: title.into(),
            date: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            modified: None,
            tags: BTreeSet::new(),
            entry: false,
            hidden: false,
            word_count: body.split_whitespace().count(),
            body,
            links: Vec::new(),
            plain_text,
        }
    }

    /// Builder-style helper to attach outgoing links.
    pub fn with_links(mut self, links: Vec<Link>) -> Self {
        self.links = links;
        self
    }

    pub fn with_entry(mut self, entry: bool) -> Self {
        self.entry = entry;
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.id, self.title)
    }
}
