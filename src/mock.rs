//! Recording host used by the unit tests

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::Rc;

use crate::annotation::{Annotation, NodeId, Position, SelectionRange};
use crate::error::{HostError, HostResult};
use crate::host::{
    AdderControl, AnnotationStore, Collaborators, EditorController, HighlightRenderer,
    KeyEventSource, SelectionProvider,
};
use crate::keyboard::ListenerId;

pub(crate) const HIGHLIGHT: &str = "annotator-hl";
pub(crate) const TEMPORARY: &str = "annotator-hl-temporary";

/// In-memory document with one highlight-able selection
///
/// `setup_annotation` renders the configured highlight nodes with the
/// permanent highlight class, like the host engine does.
#[derive(Default)]
pub(crate) struct MockHost {
    pub ranges: RefCell<Option<Vec<SelectionRange>>>,
    pub annotator_nodes: RefCell<HashSet<NodeId>>,
    /// Node paths inside the annotator's controls
    pub annotator_paths: RefCell<HashSet<String>>,
    pub highlight_nodes: RefCell<Vec<NodeId>>,
    pub classes: RefCell<HashMap<NodeId, BTreeSet<String>>>,
    pub positions: RefCell<HashMap<NodeId, Position>>,
    pub position_calls: Cell<usize>,

    pub adder_visible: Cell<bool>,
    pub adder_position: Cell<Position>,
    pub adder_position_calls: Cell<usize>,
    pub adder_hides: Cell<usize>,

    pub created: RefCell<Vec<Annotation>>,
    pub setup_calls: RefCell<Vec<Annotation>>,
    pub deleted: RefCell<Vec<Annotation>>,
    pub shown: RefCell<Vec<(Annotation, Position)>>,
    pub selection_queries: Cell<usize>,

    pub bound: RefCell<Vec<ListenerId>>,
    pub unbound: RefCell<Vec<ListenerId>>,

    /// `delete_annotation` drops the record but leaves the nodes rendered
    pub delete_keeps_nodes: Cell<bool>,

    /// Operation name that should fail on its next call
    pub fail_on: RefCell<Option<&'static str>>,
}

impl MockHost {
    /// A document with the word "test" selected and rendered as one node
    pub fn with_selection() -> Rc<Self> {
        let host = Self::default();
        *host.ranges.borrow_mut() = Some(vec![SelectionRange::new("/p[1]", 0, "/p[1]", 4)]);
        *host.highlight_nodes.borrow_mut() = vec![NodeId(1)];
        host.positions
            .borrow_mut()
            .insert(NodeId(1), Position::new(10.0, 20.0));
        host.adder_position.set(Position::new(100.0, 200.0));
        Rc::new(host)
    }

    pub fn collaborators(self: &Rc<Self>) -> Collaborators {
        Collaborators::from_host(self.clone())
    }

    pub fn classes_of(&self, node: NodeId) -> BTreeSet<String> {
        self.classes.borrow().get(&node).cloned().unwrap_or_default()
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.classes_of(node).contains(class)
    }

    pub fn fail_next(&self, operation: &'static str) {
        *self.fail_on.borrow_mut() = Some(operation);
    }

    fn check(&self, operation: &'static str) -> HostResult<()> {
        let mut fail_on = self.fail_on.borrow_mut();
        if *fail_on == Some(operation) {
            *fail_on = None;
            return Err(HostError::Rejected(format!("{} refused", operation)));
        }
        Ok(())
    }
}

impl SelectionProvider for MockHost {
    fn selected_ranges(&self) -> Option<Vec<SelectionRange>> {
        self.selection_queries.set(self.selection_queries.get() + 1);
        self.ranges.borrow().clone()
    }

    fn is_annotator_element(&self, node: NodeId) -> bool {
        self.annotator_nodes.borrow().contains(&node)
    }

    fn is_annotator_selection(&self, ranges: &[SelectionRange]) -> bool {
        let paths = self.annotator_paths.borrow();
        ranges
            .iter()
            .any(|range| paths.contains(&range.start) || paths.contains(&range.end))
    }
}

impl AnnotationStore for MockHost {
    fn create_annotation(&self, ranges: &[SelectionRange]) -> HostResult<Annotation> {
        self.check("createAnnotation")?;
        let annotation = Annotation::draft("test", ranges.to_vec());
        self.created.borrow_mut().push(annotation.clone());
        Ok(annotation)
    }

    fn setup_annotation(&self, annotation: Annotation) -> HostResult<Annotation> {
        self.setup_calls.borrow_mut().push(annotation.clone());
        self.check("setupAnnotation")?;
        let nodes = self.highlight_nodes.borrow().clone();
        self.add_class(&nodes, HIGHLIGHT);
        Ok(annotation.with_highlights(nodes))
    }

    fn delete_annotation(&self, annotation: &Annotation) -> HostResult<()> {
        self.check("deleteAnnotation")?;
        if !self.delete_keeps_nodes.get() {
            let mut classes = self.classes.borrow_mut();
            for node in &annotation.highlights {
                classes.remove(node);
            }
        }
        self.deleted.borrow_mut().push(annotation.clone());
        Ok(())
    }
}

impl EditorController for MockHost {
    fn show_editor(&self, annotation: &Annotation, anchor: Position) -> HostResult<()> {
        self.check("showEditor")?;
        self.shown.borrow_mut().push((annotation.clone(), anchor));
        Ok(())
    }
}

impl HighlightRenderer for MockHost {
    fn add_class(&self, nodes: &[NodeId], class: &str) {
        let mut classes = self.classes.borrow_mut();
        for node in nodes {
            classes.entry(*node).or_default().insert(class.to_string());
        }
    }

    fn remove_class(&self, nodes: &[NodeId], class: &str) {
        let mut classes = self.classes.borrow_mut();
        for node in nodes {
            if let Some(set) = classes.get_mut(node) {
                set.remove(class);
            }
        }
    }

    fn position(&self, node: NodeId) -> Option<Position> {
        self.position_calls.set(self.position_calls.get() + 1);
        self.positions.borrow().get(&node).copied()
    }
}

impl AdderControl for MockHost {
    fn is_visible(&self) -> bool {
        self.adder_visible.get()
    }

    fn position(&self) -> Position {
        self.adder_position_calls
            .set(self.adder_position_calls.get() + 1);
        self.adder_position.get()
    }

    fn hide(&self) {
        self.adder_hides.set(self.adder_hides.get() + 1);
        self.adder_visible.set(false);
    }
}

impl KeyEventSource for MockHost {
    fn bind_key_up(&self) -> ListenerId {
        let id = ListenerId(self.bound.borrow().len() as u64 + 1);
        self.bound.borrow_mut().push(id);
        id
    }

    fn unbind_key_up(&self, listener: ListenerId) {
        self.unbound.borrow_mut().push(listener);
    }
}
