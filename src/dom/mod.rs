//! Browser bindings (feature `wasm`)
//!
//! Adapters that let the controller drive real DOM elements: a node
//! registry handing out [`NodeId`]s, a class-list based highlight renderer,
//! the adder element, a `keyup` listener on the annotated root and a bridge
//! that forwards bus notifications to a JavaScript callback.
//!
//! The selection model, annotation store and editor stay on the JavaScript
//! side of the host engine and are reached through [`AnnotatorEngine`].
//! [`CaretNotes`] wires everything together for JavaScript callers.

mod bindings;
mod engine;


use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Element, EventTarget, HtmlElement, KeyboardEvent};

use crate::annotation::{NodeId, Position};
use crate::bus::{NotificationBus, SubscriptionId};
use crate::host::{AdderControl, HighlightRenderer, KeyEventSource};
use crate::keyboard::{Key, KeyEvent, ListenerId};

pub use bindings::CaretNotes;
pub use engine::{AnnotatorEngine, JsEngine};

/// Install the panic hook; runs when the module is instantiated
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Maps DOM elements to stable node handles
#[derive(Default)]
pub struct DomNodes {
    elements: RefCell<Vec<(NodeId, Element)>>,
    next_id: Cell<u64>,
}

impl DomNodes {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Handle for `element`, registering it on first sight
    pub fn register(&self, element: Element) -> NodeId {
        if let Some(id) = self.id_of(&element) {
            return id;
        }
        let id = NodeId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.elements.borrow_mut().push((id, element));
        id
    }

    /// Forget elements the host removed from the document
    pub fn release(&self, nodes: &[NodeId]) {
        self.elements
            .borrow_mut()
            .retain(|(id, _)| !nodes.contains(id));
    }

    pub fn element(&self, id: NodeId) -> Option<Element> {
        self.elements
            .borrow()
            .iter()
            .find(|(existing, _)| *existing == id)
            .map(|(_, element)| element.clone())
    }

    pub fn id_of(&self, element: &Element) -> Option<NodeId> {
        self.elements
            .borrow()
            .iter()
            .find(|(_, existing)| existing == element)
            .map(|(id, _)| *id)
    }
}

fn offset_of(element: &HtmlElement) -> Position {
    Position::new(
        f64::from(element.offset_top()),
        f64::from(element.offset_left()),
    )
}

/// Highlight marker classes applied through `Element.classList`
pub struct DomHighlightRenderer {
    nodes: Rc<DomNodes>,
}

impl DomHighlightRenderer {
    pub fn new(nodes: Rc<DomNodes>) -> Self {
        Self { nodes }
    }

    fn each_element(&self, nodes: &[NodeId], mut apply: impl FnMut(&Element)) {
        for node in nodes {
            match self.nodes.element(*node) {
                Some(element) => apply(&element),
                None => tracing::warn!(%node, "Highlight node is not registered"),
            }
        }
    }
}

impl HighlightRenderer for DomHighlightRenderer {
    fn add_class(&self, nodes: &[NodeId], class: &str) {
        self.each_element(nodes, |element| {
            if let Err(e) = element.class_list().add_1(class) {
                tracing::warn!(class, "classList.add failed: {:?}", e);
            }
        });
    }

    fn remove_class(&self, nodes: &[NodeId], class: &str) {
        self.each_element(nodes, |element| {
            if let Err(e) = element.class_list().remove_1(class) {
                tracing::warn!(class, "classList.remove failed: {:?}", e);
            }
        });
    }

    fn position(&self, node: NodeId) -> Option<Position> {
        let element = self.nodes.element(node)?;
        let element = element.dyn_into::<HtmlElement>().ok()?;
        Some(offset_of(&element))
    }
}

/// The host engine's adder button
pub struct DomAdder {
    element: HtmlElement,
}

impl DomAdder {
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }
}

impl AdderControl for DomAdder {
    fn is_visible(&self) -> bool {
        !self.element.hidden() && self.element.offset_parent().is_some()
    }

    fn position(&self) -> Position {
        offset_of(&self.element)
    }

    fn hide(&self) {
        self.element.set_hidden(true);
    }
}

/// `keyup` subscription on the annotated root element
///
/// Every bound listener invokes the same `callback`; the ids only track
/// which registrations are still live.
pub struct DomKeyEvents {
    target: EventTarget,
    callback: js_sys::Function,
    bound: RefCell<Vec<ListenerId>>,
    next_id: Cell<u64>,
}

impl DomKeyEvents {
    pub fn new(root: &Element, callback: js_sys::Function) -> Self {
        Self {
            target: root.clone().unchecked_into(),
            callback,
            bound: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    pub fn is_bound(&self) -> bool {
        !self.bound.borrow().is_empty()
    }
}

impl KeyEventSource for DomKeyEvents {
    fn bind_key_up(&self) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        if self.bound.borrow().is_empty() {
            if let Err(e) = self
                .target
                .add_event_listener_with_callback("keyup", &self.callback)
            {
                tracing::warn!("addEventListener failed: {:?}", e);
            }
        }
        self.bound.borrow_mut().push(id);
        id
    }

    fn unbind_key_up(&self, listener: ListenerId) {
        let mut bound = self.bound.borrow_mut();
        bound.retain(|id| *id != listener);
        if bound.is_empty() {
            if let Err(e) = self
                .target
                .remove_event_listener_with_callback("keyup", &self.callback)
            {
                tracing::warn!("removeEventListener failed: {:?}", e);
            }
        }
    }
}

/// Translate a DOM `keyup` event, registering its target element
pub fn key_event(event: &KeyboardEvent, nodes: &DomNodes) -> KeyEvent {
    let target = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .map(|element| nodes.register(element));

    // Synthetic events may only carry `key`
    let key = match event.key_code() {
        0 => Key::from_name(&event.key()).unwrap_or(Key::Other(0)),
        code => Key::from_code(code),
    };

    KeyEvent {
        key,
        ctrl_key: event.ctrl_key(),
        meta_key: event.meta_key(),
        target,
    }
}

/// Forward every bus notification to `callback` as a plain JS object
pub fn forward_to_js(bus: &NotificationBus, callback: js_sys::Function) -> SubscriptionId {
    bus.subscribe(move |notification| {
        let value = match serde_wasm_bindgen::to_value(notification) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(event = notification.name(), "Failed to convert notification: {}", e);
                return;
            }
        };
        if let Err(e) = callback.call1(&JsValue::NULL, &value) {
            tracing::warn!(event = notification.name(), "Notification callback threw: {:?}", e);
        }
    })
}
