//! `JsEditor`: the editor controller exposed to JavaScript.
//!
//! # Example
//!
//! ```typescript
//! import init, { JsEditor } from '@retouch/wasm';
//!
//! await init();
//! const editor = new JsEditor(document.querySelector('img'));
//! editor.load_image(new Uint8Array(await file.arrayBuffer()));
//!
//! slider.addEventListener('input', () =>
//!   editor.set_filter(slider.name, slider.value, slider.dataset.unit));
//! button.addEventListener('click', () => {
//!   const restored = editor.dispatch(button.dataset.action);
//!   for (const { name, value } of restored ?? []) sliders[name].value = value;
//! });
//! ```

use retouch_core::config::EditorConfig;
use retouch_core::editor::{Editor, Response};
use retouch_core::filter::ControlRestore;
use retouch_core::preview::PreviewSurface;
use retouch_core::state::Action;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::HtmlImageElement;

use crate::dom::{trigger_download, DomPreview, ObjectUrl};

/// Natural size of a loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Resolve a click-action name.
pub fn resolve_action(name: &str) -> Result<Action, String> {
    Action::from_name(name).ok_or_else(|| format!("Unknown action: {}", name))
}

fn restored_to_js(restored: &[ControlRestore]) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(restored).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Image editor bound to one `<img>` element.
#[wasm_bindgen]
pub struct JsEditor {
    inner: Editor<DomPreview>,
    source_url: Option<ObjectUrl>,
}

#[wasm_bindgen]
impl JsEditor {
    /// Bind to `image`. `config` is an optional partial `EditorConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(image: HtmlImageElement, config: JsValue) -> Result<JsEditor, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid editor config: {}", e)))?
        };
        log::info!("editor created with {} controls", config.controls.len());

        Ok(JsEditor {
            inner: Editor::new(config, DomPreview::new(image)),
            source_url: None,
        })
    }

    /// Decode the chosen file and show it. Filters and geometry carry over.
    ///
    /// Returns `{ width, height }`.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<JsValue, JsValue> {
        let (width, height) = self
            .inner
            .load_image(bytes)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let url = ObjectUrl::from_bytes(bytes, "")?;
        self.inner.preview().image().set_src(url.as_str());
        // Dropping the old guard revokes the superseded URL.
        self.source_url = Some(url);

        serde_wasm_bindgen::to_value(&Dimensions { width, height })
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn set_filter(&mut self, name: &str, value: &str, unit: &str) -> Result<(), JsValue> {
        self.apply(Action::set_filter(name, value, unit)).map(|_| ())
    }

    pub fn rotate_left(&mut self) -> Result<(), JsValue> {
        self.apply(Action::RotateLeft).map(|_| ())
    }

    pub fn rotate_right(&mut self) -> Result<(), JsValue> {
        self.apply(Action::RotateRight).map(|_| ())
    }

    pub fn flip_horizontal(&mut self) -> Result<(), JsValue> {
        self.apply(Action::FlipHorizontal).map(|_| ())
    }

    pub fn flip_vertical(&mut self) -> Result<(), JsValue> {
        self.apply(Action::FlipVertical).map(|_| ())
    }

    /// Reset filters and geometry. Returns `[{ name, value }]` for the
    /// widgets to put back.
    pub fn reset(&mut self) -> Result<JsValue, JsValue> {
        self.apply(Action::Reset)
    }

    pub fn reset_filters(&mut self) -> Result<JsValue, JsValue> {
        self.apply(Action::ResetFilters)
    }

    pub fn reset_geometry(&mut self) -> Result<(), JsValue> {
        self.apply(Action::ResetGeometry).map(|_| ())
    }

    /// Run a click action by name. `export` also triggers the download.
    pub fn dispatch(&mut self, name: &str) -> Result<JsValue, JsValue> {
        let action = resolve_action(name).map_err(|e| JsValue::from_str(&e))?;
        self.apply(action)
    }

    /// Run an action given as an object, e.g.
    /// `{ action: "set-filter", name: "blur", value: "2", unit: "px" }`.
    pub fn apply_action(&mut self, action: JsValue) -> Result<JsValue, JsValue> {
        let action: Action = serde_wasm_bindgen::from_value(action)
            .map_err(|e| JsValue::from_str(&format!("Invalid action: {}", e)))?;
        self.apply(action)
    }

    /// Current `{ rotation_degrees, flip_x, flip_y }`.
    pub fn geometry(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.state().geometry)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Object URL the `<img>` currently shows, if a file was loaded.
    #[wasm_bindgen(getter)]
    pub fn source_url(&self) -> Option<String> {
        self.source_url.as_ref().map(|url| url.as_str().to_string())
    }

    /// The filter the preview is rendering.
    #[wasm_bindgen(getter)]
    pub fn css_filter(&self) -> String {
        self.inner.preview().computed_filter()
    }

    #[wasm_bindgen(getter)]
    pub fn css_transform(&self) -> String {
        self.inner.state().css_transform()
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.inner.source().is_some()
    }

    /// Encode the edited image as PNG bytes without downloading.
    pub fn export_png(&self) -> Result<Vec<u8>, JsValue> {
        self.inner
            .export()
            .map(|artifact| artifact.bytes)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Export and hand the file to the browser.
    pub fn download(&self) -> Result<(), JsValue> {
        let artifact = self
            .inner
            .export()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        trigger_download(&artifact.bytes, &artifact.file_name)
    }
}

impl JsEditor {
    fn apply(&mut self, action: Action) -> Result<JsValue, JsValue> {
        let response = self
            .inner
            .dispatch(action)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        match response {
            Response::Updated => Ok(JsValue::UNDEFINED),
            Response::Reset { restored } => restored_to_js(&restored),
            Response::Exported(artifact) => {
                trigger_download(&artifact.bytes, &artifact.file_name)?;
                Ok(JsValue::UNDEFINED)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_actions() {
        assert_eq!(resolve_action("rotate-right"), Ok(Action::RotateRight));
        assert_eq!(resolve_action("reset"), Ok(Action::Reset));
        assert_eq!(resolve_action("export"), Ok(Action::Export));
    }

    #[test]
    fn test_resolve_unknown_action() {
        assert_eq!(
            resolve_action("crop"),
            Err("Unknown action: crop".to_string())
        );
    }
}
