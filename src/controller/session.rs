//! Per-activation editor session
//!
//! One session exists from the moment the host creates a draft until the
//! draft is either persisted or discarded. Resolving a session consumes it,
//! so a draft can never be resolved twice.

use serde::Serialize;

use crate::annotation::{Annotation, Position};

/// Where the editor was anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorSource {
    /// The floating adder was visible and the editor took its place
    Adder,
    /// The first temporary highlight of the draft
    TemporaryHighlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EditorAnchor {
    pub position: Position,
    pub source: AnchorSource,
}

/// Terminal outcome reported by the editor
#[derive(Debug, Clone, PartialEq)]
pub enum EditorOutcome {
    /// The user saved; carries the edited record
    Submitted(Annotation),
    /// The editor closed without saving
    Cancelled,
}

/// What happened to a draft once its session was resolved
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Marker removed, record handed to the store, `annotationCreated` sent
    Persisted(Annotation),
    /// Marker removed and record deleted from the store
    Discarded(Annotation),
}

impl Resolution {
    pub fn annotation(&self) -> &Annotation {
        match self {
            Resolution::Persisted(annotation) | Resolution::Discarded(annotation) => annotation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// Draft exists, editor not shown yet
    Preparing,
    /// Editor shown, waiting for an outcome
    Open,
}

#[derive(Debug)]
pub(crate) struct EditorSession {
    pub(crate) draft: Annotation,
    pub(crate) phase: Phase,
    /// Set by the editor's hide hook; consulted by the submit hook
    pub(crate) cancelled: bool,
}

impl EditorSession {
    pub(crate) fn new(draft: Annotation) -> Self {
        Self {
            draft,
            phase: Phase::Preparing,
            cancelled: false,
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.phase == Phase::Open
    }
}
