//! Host engine interfaces
//!
//! The controller never touches the document directly. Everything it needs
//! from the annotation engine, the editor widget and the DOM goes through
//! these traits, so a browser binding and the in-memory test doubles are
//! interchangeable.
//!
//! All methods take `&self`: hosts live on a single UI thread and use
//! interior mutability where they keep state.

use std::rc::Rc;

use crate::annotation::{Annotation, NodeId, Position, SelectionRange};
use crate::error::HostResult;
use crate::keyboard::ListenerId;

/// Current text selection of the host document
pub trait SelectionProvider {
    /// Ranges currently selected; `None` when the host has no selection model
    /// available at all
    fn selected_ranges(&self) -> Option<Vec<SelectionRange>>;

    /// Whether `node` belongs to the annotator's own controls (editor,
    /// adder, viewer) rather than to annotated content
    fn is_annotator_element(&self, node: NodeId) -> bool;

    /// Whether the selection itself lies inside the annotator's controls,
    /// e.g. text selected in the editor's textarea
    fn is_annotator_selection(&self, ranges: &[SelectionRange]) -> bool;
}

/// Annotation records kept by the host engine
pub trait AnnotationStore {
    /// Create a draft record for the given ranges
    fn create_annotation(&self, ranges: &[SelectionRange]) -> HostResult<Annotation>;

    /// Capture ranges and render highlight nodes; returns the record with
    /// its highlights attached
    fn setup_annotation(&self, annotation: Annotation) -> HostResult<Annotation>;

    /// Remove the record; hosts normally also remove its highlight nodes
    fn delete_annotation(&self, annotation: &Annotation) -> HostResult<()>;
}

/// The annotation editor widget
pub trait EditorController {
    fn show_editor(&self, annotation: &Annotation, anchor: Position) -> HostResult<()>;
}

/// Marker classes on highlight nodes
pub trait HighlightRenderer {
    fn add_class(&self, nodes: &[NodeId], class: &str);

    fn remove_class(&self, nodes: &[NodeId], class: &str);

    fn position(&self, node: NodeId) -> Option<Position>;
}

/// The floating "adder" button offered for mouse selections
pub trait AdderControl {
    fn is_visible(&self) -> bool;

    fn position(&self) -> Position;

    fn hide(&self);
}

/// Key-release subscription on the host document
pub trait KeyEventSource {
    fn bind_key_up(&self) -> ListenerId;

    fn unbind_key_up(&self, listener: ListenerId);
}

/// The collaborators a controller is wired to
///
/// Each seam is a separate trait object so hosts can mix adapters, e.g. a
/// DOM-backed renderer with an engine-provided store.
#[derive(Clone)]
pub struct Collaborators {
    pub selection: Rc<dyn SelectionProvider>,
    pub store: Rc<dyn AnnotationStore>,
    pub editor: Rc<dyn EditorController>,
    pub renderer: Rc<dyn HighlightRenderer>,
    pub adder: Rc<dyn AdderControl>,
    pub keys: Rc<dyn KeyEventSource>,
}

impl Collaborators {
    /// Wire every seam to one object implementing all of them
    pub fn from_host<H>(host: Rc<H>) -> Self
    where
        H: SelectionProvider
            + AnnotationStore
            + EditorController
            + HighlightRenderer
            + AdderControl
            + KeyEventSource
            + 'static,
    {
        Self {
            selection: host.clone(),
            store: host.clone(),
            editor: host.clone(),
            renderer: host.clone(),
            adder: host.clone(),
            keys: host,
        }
    }
}
