//! JavaScript-side annotation engine
//!
//! Records cross the boundary as plain objects keyed by `id`. The engine may
//! attach a `highlights` array of elements to the object returned from
//! `setupAnnotation`; those elements are registered with [`DomNodes`].

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use web_sys::Element;

use super::DomNodes;
use crate::annotation::{Annotation, NodeId, Position, SelectionRange};
use crate::error::{HostError, HostResult};
use crate::host::{AnnotationStore, EditorController, SelectionProvider};

#[wasm_bindgen]
extern "C" {
    /// Host engine object with the selection model, store and editor
    pub type AnnotatorEngine;

    #[wasm_bindgen(method, js_name = getSelectedRanges)]
    fn get_selected_ranges(this: &AnnotatorEngine) -> JsValue;

    #[wasm_bindgen(method, js_name = isAnnotator)]
    fn is_annotator(this: &AnnotatorEngine, element: &Element) -> bool;

    #[wasm_bindgen(method, js_name = isAnnotatorSelection)]
    fn is_annotator_selection(this: &AnnotatorEngine, ranges: &JsValue) -> bool;

    #[wasm_bindgen(method, catch, js_name = createAnnotation)]
    fn create_annotation(this: &AnnotatorEngine, ranges: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = setupAnnotation)]
    fn setup_annotation(this: &AnnotatorEngine, annotation: &JsValue)
        -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = deleteAnnotation)]
    fn delete_annotation(this: &AnnotatorEngine, annotation: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = showEditor)]
    fn show_editor(
        this: &AnnotatorEngine,
        annotation: &JsValue,
        position: &JsValue,
    ) -> Result<(), JsValue>;
}

/// Fields the engine may set on the objects it hands back
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct EngineRecord {
    pub id: Option<String>,
    pub quote: Option<String>,
    pub text: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl EngineRecord {
    pub fn from_js(value: &JsValue) -> HostResult<Self> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        serde_wasm_bindgen::from_value(value.clone())
            .map_err(|e| HostError::Rejected(format!("malformed annotation: {}", e)))
    }

    /// Overlay the engine's fields onto `annotation`
    pub fn merge_into(self, annotation: &mut Annotation) {
        if let Some(id) = self.id {
            annotation.id = id;
        }
        if let Some(quote) = self.quote {
            annotation.quote = quote;
        }
        if let Some(text) = self.text {
            annotation.text = text;
        }
        if let Some(tags) = self.tags {
            annotation.tags = tags;
        }
    }
}

pub(crate) fn to_js<T: Serialize>(value: &T) -> HostResult<JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| HostError::Rejected(e.to_string()))
}

pub(crate) fn js_error(err: JsValue) -> HostError {
    HostError::Rejected(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

/// [`AnnotatorEngine`] adapted to the controller's collaborator traits
pub struct JsEngine {
    engine: AnnotatorEngine,
    nodes: Rc<DomNodes>,
}

impl JsEngine {
    pub fn new(engine: AnnotatorEngine, nodes: Rc<DomNodes>) -> Self {
        Self { engine, nodes }
    }

    fn highlights_of(&self, value: &JsValue) -> Vec<NodeId> {
        let Ok(highlights) = js_sys::Reflect::get(value, &JsValue::from_str("highlights")) else {
            return Vec::new();
        };
        if !js_sys::Array::is_array(&highlights) {
            return Vec::new();
        }
        js_sys::Array::from(&highlights)
            .iter()
            .filter_map(|item| match item.dyn_into::<Element>() {
                Ok(element) => Some(self.nodes.register(element)),
                Err(_) => {
                    tracing::warn!("Ignoring highlight that is not an element");
                    None
                }
            })
            .collect()
    }
}

impl SelectionProvider for JsEngine {
    fn selected_ranges(&self) -> Option<Vec<SelectionRange>> {
        let value = self.engine.get_selected_ranges();
        if value.is_undefined() || value.is_null() {
            return None;
        }
        match serde_wasm_bindgen::from_value(value) {
            Ok(ranges) => Some(ranges),
            Err(e) => {
                tracing::warn!("Unreadable selection ranges: {}", e);
                None
            }
        }
    }

    fn is_annotator_element(&self, node: NodeId) -> bool {
        self.nodes
            .element(node)
            .is_some_and(|element| self.engine.is_annotator(&element))
    }

    fn is_annotator_selection(&self, ranges: &[SelectionRange]) -> bool {
        match to_js(&ranges) {
            Ok(ranges) => self.engine.is_annotator_selection(&ranges),
            Err(e) => {
                tracing::warn!("Failed to convert ranges: {}", e);
                false
            }
        }
    }
}

impl AnnotationStore for JsEngine {
    fn create_annotation(&self, ranges: &[SelectionRange]) -> HostResult<Annotation> {
        let value = self
            .engine
            .create_annotation(&to_js(&ranges)?)
            .map_err(js_error)?;
        let mut annotation = Annotation::draft("", ranges.to_vec());
        EngineRecord::from_js(&value)?.merge_into(&mut annotation);
        Ok(annotation)
    }

    fn setup_annotation(&self, annotation: Annotation) -> HostResult<Annotation> {
        let value = self
            .engine
            .setup_annotation(&to_js(&annotation)?)
            .map_err(js_error)?;
        let highlights = self.highlights_of(&value);
        let mut annotation = annotation.with_highlights(highlights);
        EngineRecord::from_js(&value)?.merge_into(&mut annotation);
        Ok(annotation)
    }

    fn delete_annotation(&self, annotation: &Annotation) -> HostResult<()> {
        self.engine
            .delete_annotation(&to_js(annotation)?)
            .map_err(js_error)
    }
}

impl EditorController for JsEngine {
    fn show_editor(&self, annotation: &Annotation, anchor: Position) -> HostResult<()> {
        self.engine
            .show_editor(&to_js(annotation)?, &to_js(&anchor)?)
            .map_err(js_error)
    }
}
