//! JavaScript entry point

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement, KeyboardEvent};

use super::engine::{AnnotatorEngine, EngineRecord, JsEngine};
use super::{forward_to_js, key_event, DomAdder, DomHighlightRenderer, DomKeyEvents, DomNodes};
use crate::bus::NotificationBus;
use crate::config::CaretConfig;
use crate::controller::{Activation, CaretNavigation, Resolution};
use crate::error::{CaretError, Result as CaretResult};
use crate::host::Collaborators;

type Slot = RefCell<Option<CaretNavigation>>;

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Caret navigation for an annotator instance
///
/// ```js
/// const notes = new CaretNotes(contentRoot, adderElement, engine);
/// notes.onAnnotationCreated(({ payload }) => save(payload));
/// editor.on("hide", () => notes.onEditorHide());
/// editor.on("save", (annotation) => notes.onEditorSubmit(annotation));
/// ```
#[wasm_bindgen]
pub struct CaretNotes {
    controller: Rc<Slot>,
    nodes: Rc<DomNodes>,
    bus: Rc<NotificationBus>,
    // Must outlive the listener registered with it
    _on_key_up: Closure<dyn FnMut(KeyboardEvent)>,
}

#[wasm_bindgen]
impl CaretNotes {
    /// Bind to `keyup` on `root`
    ///
    /// `config` is an optional plain object with `CaretConfig` fields.
    #[wasm_bindgen(constructor)]
    pub fn new(
        root: Element,
        adder: HtmlElement,
        engine: AnnotatorEngine,
        config: JsValue,
    ) -> Result<CaretNotes, JsValue> {
        let config: CaretConfig = if config.is_undefined() || config.is_null() {
            CaretConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js_error)?
        };

        let nodes = DomNodes::new();
        let controller: Rc<Slot> = Rc::new(RefCell::new(None));
        let on_key_up = Self::key_listener(Rc::downgrade(&controller), nodes.clone());

        let engine = Rc::new(JsEngine::new(engine, nodes.clone()));
        let host = Collaborators {
            selection: engine.clone(),
            store: engine.clone(),
            editor: engine,
            renderer: Rc::new(DomHighlightRenderer::new(nodes.clone())),
            adder: Rc::new(DomAdder::new(adder)),
            keys: Rc::new(DomKeyEvents::new(
                &root,
                on_key_up.as_ref().unchecked_ref::<js_sys::Function>().clone(),
            )),
        };

        let bus = NotificationBus::new();
        let navigation = CaretNavigation::new(config, host, bus.clone()).map_err(to_js_error)?;
        *controller.borrow_mut() = Some(navigation);

        Ok(Self {
            controller,
            nodes,
            bus,
            _on_key_up: on_key_up,
        })
    }

    /// Handle a key-release by hand; returns whether the editor opened
    #[wasm_bindgen(js_name = "onKeyUp")]
    pub fn on_key_up(&self, event: &KeyboardEvent) -> Result<bool, JsValue> {
        let event = key_event(event, &self.nodes);
        let activation = self.with_controller(|navigation| navigation.on_key_up(&event))?;
        Ok(matches!(activation, Activation::EditorOpened { .. }))
    }

    /// The editor was closed without saving
    #[wasm_bindgen(js_name = "onEditorHide")]
    pub fn on_editor_hide(&self) -> Result<(), JsValue> {
        self.with_controller(|navigation| navigation.on_editor_hide())
    }

    /// The editor's submit signal, with or without the edited annotation
    ///
    /// Returns `true` when the draft was saved, `false` when it was discarded.
    #[wasm_bindgen(js_name = "onEditorSubmit")]
    pub fn on_editor_submit(&self, annotation: JsValue) -> Result<bool, JsValue> {
        let resolution = self.with_controller(|navigation| {
            let edited = match navigation.pending() {
                Some(pending) if !annotation.is_undefined() && !annotation.is_null() => {
                    let mut edited = pending.clone();
                    EngineRecord::from_js(&annotation)
                        .map_err(CaretError::collaborator("onEditorSubmit"))?
                        .merge_into(&mut edited);
                    Some(edited)
                }
                _ => None,
            };
            navigation.on_editor_submit(edited.as_ref())
        })?;

        match resolution {
            Resolution::Persisted(_) => Ok(true),
            Resolution::Discarded(draft) => {
                self.nodes.release(&draft.highlights);
                Ok(false)
            }
        }
    }

    /// Draft awaiting the editor as a plain object, or `undefined`
    #[wasm_bindgen(js_name = "pendingAnnotation")]
    pub fn pending_annotation(&self) -> Result<JsValue, JsValue> {
        let slot = self
            .controller
            .try_borrow()
            .map_err(|_| JsValue::from_str("Controller is busy"))?;
        match slot.as_ref().and_then(|navigation| navigation.pending()) {
            Some(draft) => serde_wasm_bindgen::to_value(draft).map_err(to_js_error),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Call `callback` with every `annotationCreated` notification
    #[wasm_bindgen(js_name = "onAnnotationCreated")]
    pub fn on_annotation_created(&self, callback: js_sys::Function) {
        forward_to_js(&self.bus, callback);
    }

    /// Unbind the listener and discard any pending draft
    pub fn destroy(&self) -> Result<(), JsValue> {
        let mut slot = self
            .controller
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("Controller is busy"))?;
        if let Some(mut navigation) = slot.take() {
            let pending = navigation
                .pending()
                .map(|draft| draft.highlights.clone())
                .unwrap_or_default();
            navigation.destroy();
            self.nodes.release(&pending);
        }
        Ok(())
    }
}

impl CaretNotes {
    fn key_listener(
        controller: Weak<Slot>,
        nodes: Rc<DomNodes>,
    ) -> Closure<dyn FnMut(KeyboardEvent)> {
        Closure::wrap(Box::new(move |event: KeyboardEvent| {
            let Some(controller) = controller.upgrade() else {
                return;
            };
            let Ok(mut slot) = controller.try_borrow_mut() else {
                tracing::warn!("Key-up while the controller is busy, ignoring");
                return;
            };
            if let Some(navigation) = slot.as_mut() {
                if let Err(e) = navigation.on_key_up(&key_event(&event, &nodes)) {
                    tracing::warn!("Keyboard activation failed: {}", e);
                }
            }
        }) as Box<dyn FnMut(KeyboardEvent)>)
    }

    fn with_controller<T>(
        &self,
        apply: impl FnOnce(&mut CaretNavigation) -> CaretResult<T>,
    ) -> Result<T, JsValue> {
        let mut slot = self
            .controller
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("Controller is busy"))?;
        let navigation = slot
            .as_mut()
            .ok_or_else(|| JsValue::from_str("Controller has been destroyed"))?;
        apply(navigation).map_err(to_js_error)
    }
}
