//! Caret Notes
//!
//! Keyboard-activated annotation creation for a text-annotation host:
//! - Ctrl+Enter / Ctrl+Space over a selection creates a draft annotation
//! - The draft is shown with a temporary highlight and the editor opens next
//!   to it (or in place of the floating adder)
//! - Saving persists the highlight and publishes `annotationCreated`;
//!   cancelling removes the highlight and deletes the draft
//!
//! The host engine (selection model, annotation store, editor, DOM) is
//! reached only through the traits in [`host`]. With the `wasm` feature the
//! [`dom`] module provides browser-backed implementations of the DOM seams.

pub mod annotation;
pub mod bus;
pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod keyboard;

#[cfg(feature = "wasm")]
pub mod dom;

#[cfg(test)]
mod mock;

// Re-export common types
pub use annotation::{Annotation, NodeId, Position, SelectionRange};
pub use bus::{Notification, NotificationBus, SubscriptionId};
pub use config::CaretConfig;
pub use controller::{
    Activation, AnchorSource, CaretNavigation, EditorAnchor, EditorOutcome, IgnoreReason,
    Resolution,
};
pub use error::{CaretError, HostError, HostResult, Result};
pub use host::{
    AdderControl, AnnotationStore, Collaborators, EditorController, HighlightRenderer,
    KeyEventSource, SelectionProvider,
};
pub use keyboard::{Key, KeyEvent, ListenerId};
