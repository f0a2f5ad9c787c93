//! Annotation records as seen by the controller
//!
//! The host engine owns range capture and rendering; the controller only
//! needs the selected text, the opaque ranges it was built from and the
//! highlight nodes the host rendered for it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Handle to a DOM node owned by the host document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Offset of an element relative to its offset parent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub top: f64,
    pub left: f64,
}

impl Position {
    pub fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }
}

/// Opaque range descriptor produced by the host's selection model
///
/// The controller never inspects these; they are handed back to the
/// annotation store untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRange {
    /// Path of the node the range starts in
    pub start: String,
    /// Path of the node the range ends in
    pub end: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl SelectionRange {
    pub fn new(start: &str, start_offset: usize, end: &str, end_offset: usize) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
            start_offset,
            end_offset,
        }
    }
}

/// An annotation record
///
/// While a keyboard activation is pending the record is a draft owned by
/// the controller; once persisted it belongs to the host store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Unique identifier (UUID)
    pub id: String,
    /// The selected content
    pub quote: String,
    /// Note text entered in the editor
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Ranges the annotation was created from
    #[serde(default)]
    pub ranges: Vec<SelectionRange>,
    /// Highlight nodes rendered for this annotation, in document order
    #[serde(skip)]
    pub highlights: Vec<NodeId>,
    pub created_at: DateTime<Utc>,
}

impl Annotation {
    /// Create a new draft for the given selection
    pub fn draft(quote: &str, ranges: Vec<SelectionRange>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            quote: quote.to_string(),
            text: String::new(),
            tags: Vec::new(),
            ranges,
            highlights: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Attach rendered highlight nodes
    pub fn with_highlights(mut self, highlights: Vec<NodeId>) -> Self {
        self.highlights = highlights;
        self
    }

    /// Set the note text
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// First highlight node in document order
    pub fn first_highlight(&self) -> Option<NodeId> {
        self.highlights.first().copied()
    }

    /// Copy the user-editable fields from an edited copy of this record
    pub(crate) fn apply_edits(&mut self, edited: &Annotation) {
        self.text = edited.text.clone();
        self.tags = edited.tags.clone();
    }
}
