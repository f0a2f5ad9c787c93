//! Keyboard-driven annotation creation
//!
//! [`CaretNavigation`] turns Ctrl+Enter / Ctrl+Space over a text selection
//! into a draft annotation with a temporary highlight, opens the editor next
//! to it and then either persists or discards the draft depending on how the
//! editor closes.
//!
//! # Lifecycle
//!
//! ```text
//! key-up ─► shortcut? ─► own UI? ─► selection? ─► create ─► setup ─► mark
//!                                                    │
//!            ┌──────────── anchor ◄──────────────────┘
//!            ▼
//!       show editor ─► submit(payload) ─► unmark, annotationCreated
//!                   └► hide, submit()  ─► unmark, deleteAnnotation
//! ```
//!
//! A failure anywhere after the draft is created rolls the draft back: the
//! marker classes are removed and the record deleted. Discarded highlight
//! nodes lose both classes even if the host leaves them in the document.

mod session;


use std::rc::Rc;

use crate::annotation::{Annotation, SelectionRange};
use crate::bus::{Notification, NotificationBus};
use crate::config::CaretConfig;
use crate::error::{CaretError, Result};
use crate::host::Collaborators;
use crate::keyboard::{KeyEvent, ListenerId};

pub use session::{AnchorSource, EditorAnchor, EditorOutcome, Resolution};
use session::{EditorSession, Phase};

/// Why a key-up did not start an activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotShortcut,
    /// The controller has been destroyed
    Detached,
    /// The event target or the selection lies in the annotator's own controls
    AnnotatorTarget,
    NoSelection,
}

/// Result of a key-up
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    Ignored(IgnoreReason),
    /// A draft was created and the editor is open for it
    EditorOpened {
        annotation_id: String,
        anchor: EditorAnchor,
    },
}

/// Caret navigation controller
///
/// Hosts forward key-release events to [`CaretNavigation::on_key_up`] and
/// the editor's terminal signals to [`CaretNavigation::on_editor_hide`] /
/// [`CaretNavigation::on_editor_submit`] (or [`CaretNavigation::resolve`]).
pub struct CaretNavigation {
    config: CaretConfig,
    host: Collaborators,
    bus: Rc<NotificationBus>,
    listener: Option<ListenerId>,
    session: Option<EditorSession>,
}

impl CaretNavigation {
    /// Validate `config` and bind the key-release listener
    pub fn new(config: CaretConfig, host: Collaborators, bus: Rc<NotificationBus>) -> Result<Self> {
        config.validate()?;
        let listener = host.keys.bind_key_up();
        tracing::debug!(listener = listener.0, "Caret navigation bound to key-up");

        Ok(Self {
            config,
            host,
            bus,
            listener: Some(listener),
            session: None,
        })
    }

    pub fn config(&self) -> &CaretConfig {
        &self.config
    }

    pub fn is_bound(&self) -> bool {
        self.listener.is_some()
    }

    /// Draft awaiting an editor outcome, if any
    pub fn pending(&self) -> Option<&Annotation> {
        self.session.as_ref().map(|session| &session.draft)
    }

    /// Ctrl (or Meta, when enabled) held together with an activation key
    pub fn is_shortcut(&self, event: &KeyEvent) -> bool {
        let modifier = event.ctrl_key || (self.config.accept_meta_key && event.meta_key);
        modifier && self.config.is_activation_key(event.key)
    }

    /// `true` iff there is at least one selected range
    pub fn has_selection(ranges: Option<&[SelectionRange]>) -> bool {
        ranges.is_some_and(|ranges| !ranges.is_empty())
    }

    /// Key-release handler
    pub fn on_key_up(&mut self, event: &KeyEvent) -> Result<Activation> {
        if self.listener.is_none() {
            return Ok(Activation::Ignored(IgnoreReason::Detached));
        }
        if !self.is_shortcut(event) {
            return Ok(Activation::Ignored(IgnoreReason::NotShortcut));
        }
        if let Some(target) = event.target {
            if self.host.selection.is_annotator_element(target) {
                tracing::debug!(%target, "Shortcut fired inside annotator controls");
                return Ok(Activation::Ignored(IgnoreReason::AnnotatorTarget));
            }
        }

        let ranges = self.host.selection.selected_ranges();
        let ranges = match ranges {
            Some(ranges) if Self::has_selection(Some(ranges.as_slice())) => ranges,
            _ => return Ok(Activation::Ignored(IgnoreReason::NoSelection)),
        };
        if self.host.selection.is_annotator_selection(&ranges) {
            tracing::debug!("Selection lies inside annotator controls");
            return Ok(Activation::Ignored(IgnoreReason::AnnotatorTarget));
        }

        if let Some(previous) = self.session.take() {
            tracing::warn!(
                annotation = %previous.draft.id,
                "New activation while a draft is pending, discarding it"
            );
            if let Err(e) = self.discard(previous.draft) {
                tracing::warn!("Failed to discard previous draft: {}", e);
            }
        }

        self.activate(&ranges)
    }

    fn activate(&mut self, ranges: &[SelectionRange]) -> Result<Activation> {
        tracing::debug!(ranges = ranges.len(), "Creating draft annotation");

        let draft = self
            .host
            .store
            .create_annotation(ranges)
            .map_err(CaretError::collaborator("createAnnotation"))?;
        self.session = Some(EditorSession::new(draft));

        match self.open_editor() {
            Ok(activation) => Ok(activation),
            Err(err) => {
                tracing::warn!("Activation aborted: {}", err);
                if let Some(session) = self.session.take() {
                    if let Err(e) = self.discard(session.draft) {
                        tracing::warn!("Rollback of aborted draft failed: {}", e);
                    }
                }
                Err(err)
            }
        }
    }

    /// Set up, mark and anchor the pending draft, then show the editor
    fn open_editor(&mut self) -> Result<Activation> {
        let host = &self.host;
        let config = &self.config;
        let session = self.session.as_mut().ok_or_else(|| {
            CaretError::InconsistentState("no draft to open the editor for".to_string())
        })?;

        session.draft = host
            .store
            .setup_annotation(session.draft.clone())
            .map_err(CaretError::collaborator("setupAnnotation"))?;
        // The host renders the permanent class; make sure both are present
        host.renderer
            .add_class(&session.draft.highlights, &config.highlight_class);
        host.renderer
            .add_class(&session.draft.highlights, &config.temporary_class);

        let anchor = if host.adder.is_visible() {
            EditorAnchor {
                position: host.adder.position(),
                source: AnchorSource::Adder,
            }
        } else {
            let node = session
                .draft
                .first_highlight()
                .ok_or(CaretError::MissingAnchor)?;
            EditorAnchor {
                position: host.renderer.position(node).ok_or(CaretError::MissingAnchor)?,
                source: AnchorSource::TemporaryHighlight,
            }
        };

        if anchor.source == AnchorSource::Adder {
            host.adder.hide();
        }

        host.editor
            .show_editor(&session.draft, anchor.position)
            .map_err(CaretError::collaborator("showEditor"))?;
        session.phase = Phase::Open;

        tracing::debug!(
            annotation = %session.draft.id,
            source = ?anchor.source,
            top = anchor.position.top,
            left = anchor.position.left,
            "Editor opened for draft"
        );

        Ok(Activation::EditorOpened {
            annotation_id: session.draft.id.clone(),
            anchor,
        })
    }

    /// Editor closed without an explicit save
    ///
    /// The draft stays pending until the editor's follow-up submit signal,
    /// which then discards it.
    pub fn on_editor_hide(&mut self) -> Result<()> {
        match self.session.as_mut() {
            Some(session) if session.is_open() => {
                session.cancelled = true;
                tracing::debug!(annotation = %session.draft.id, "Editor hidden, draft cancelled");
                Ok(())
            }
            _ => {
                tracing::warn!("Editor hidden with no open draft");
                Err(CaretError::InconsistentState(
                    "editor hidden with no open draft".to_string(),
                ))
            }
        }
    }

    /// Editor submit signal
    ///
    /// After [`on_editor_hide`](Self::on_editor_hide) this discards the draft
    /// whatever the payload. Otherwise a payload persists the draft; a
    /// missing payload is inconsistent and leaves the draft pending.
    pub fn on_editor_submit(&mut self, submitted: Option<&Annotation>) -> Result<Resolution> {
        let cancelled = match self.session.as_ref() {
            Some(session) => session.cancelled,
            None => {
                tracing::warn!("Editor submitted with no pending draft");
                return Err(CaretError::InconsistentState(
                    "editor submitted with no pending draft".to_string(),
                ));
            }
        };

        if cancelled {
            return self.resolve(EditorOutcome::Cancelled);
        }

        match submitted {
            Some(annotation) => self.resolve(EditorOutcome::Submitted(annotation.clone())),
            None => {
                tracing::warn!("Editor submitted without payload before being hidden");
                Err(CaretError::InconsistentState(
                    "submit without payload before the editor was hidden".to_string(),
                ))
            }
        }
    }

    /// Resolve the pending draft with an explicit editor outcome
    pub fn resolve(&mut self, outcome: EditorOutcome) -> Result<Resolution> {
        let session = match self.session.take() {
            Some(session) if session.is_open() => session,
            other => {
                self.session = other;
                return Err(CaretError::InconsistentState(
                    "no open draft to resolve".to_string(),
                ));
            }
        };

        match outcome {
            EditorOutcome::Submitted(edited) => {
                if edited.id != session.draft.id {
                    tracing::warn!(
                        pending = %session.draft.id,
                        submitted = %edited.id,
                        "Submitted annotation does not match the pending draft"
                    );
                    self.session = Some(session);
                    return Err(CaretError::InconsistentState(format!(
                        "submitted annotation {} is not the pending draft",
                        edited.id
                    )));
                }

                let mut draft = session.draft;
                draft.apply_edits(&edited);
                Ok(Resolution::Persisted(self.persist(draft)))
            }
            EditorOutcome::Cancelled => self.discard(session.draft).map(Resolution::Discarded),
        }
    }

    fn persist(&self, draft: Annotation) -> Annotation {
        self.host
            .renderer
            .remove_class(&draft.highlights, &self.config.temporary_class);
        tracing::info!(annotation = %draft.id, "Draft annotation saved");
        self.bus
            .publish(&Notification::AnnotationCreated(draft.clone()));
        draft
    }

    fn discard(&self, draft: Annotation) -> Result<Annotation> {
        let renderer = &self.host.renderer;
        renderer.remove_class(&draft.highlights, &self.config.temporary_class);
        renderer.remove_class(&draft.highlights, &self.config.highlight_class);
        self.host
            .store
            .delete_annotation(&draft)
            .map_err(CaretError::collaborator("deleteAnnotation"))?;
        tracing::info!(annotation = %draft.id, "Draft annotation discarded");
        Ok(draft)
    }

    /// Unbind the key-release listener and drop any pending draft
    ///
    /// Safe to call more than once.
    pub fn destroy(&mut self) {
        let Some(listener) = self.listener.take() else {
            return;
        };
        self.host.keys.unbind_key_up(listener);

        if let Some(session) = self.session.take() {
            if let Err(e) = self.discard(session.draft) {
                tracing::warn!("Failed to discard draft during teardown: {}", e);
            }
        }
        tracing::debug!(listener = listener.0, "Caret navigation unbound");
    }
}

impl Drop for CaretNavigation {
    fn drop(&mut self) {
        self.destroy();
    }
}
