//! DOM side of the editor: the `<img>` preview, object URLs and downloads.

use retouch_core::preview::{PreviewSurface, NO_FILTER};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, HtmlImageElement, Url};

/// MIME type of the exported file.
pub const PNG_MIME: &str = "image/png";

/// Live preview backed by an `<img>` element's inline style.
///
/// The browser parses every write; an invalid declaration is dropped and
/// the previous value stays, which is the behaviour the core models.
pub struct DomPreview {
    image: HtmlImageElement,
}

impl DomPreview {
    pub fn new(image: HtmlImageElement) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &HtmlImageElement {
        &self.image
    }

    fn write_property(&self, property: &str, value: &str) {
        let style = self.image.style();
        let result = if value.is_empty() {
            style.remove_property(property).map(|_| ())
        } else {
            style.set_property(property, value)
        };
        if let Err(e) = result {
            log::warn!("failed to write {}: {:?}", property, e);
        }
    }
}

impl PreviewSurface for DomPreview {
    fn write_filter(&mut self, chain: &str) {
        self.write_property("filter", chain);
    }

    fn write_transform(&mut self, transform: &str) {
        self.write_property("transform", transform);
    }

    fn computed_filter(&self) -> String {
        // Detached elements have no computed style; fall back to the inline one.
        let computed = web_sys::window()
            .and_then(|window| window.get_computed_style(&self.image).ok().flatten())
            .and_then(|style| style.get_property_value("filter").ok())
            .filter(|value| !value.is_empty());

        computed
            .or_else(|| {
                self.image
                    .style()
                    .get_property_value("filter")
                    .ok()
                    .filter(|value| !value.is_empty())
            })
            .unwrap_or_else(|| NO_FILTER.to_string())
    }
}

/// An object URL that is revoked when dropped.
pub struct ObjectUrl {
    url: String,
}

impl ObjectUrl {
    /// Wrap `bytes` in a Blob and mint a URL for it. An empty `mime` leaves
    /// the type for the consumer to sniff.
    pub fn from_bytes(bytes: &[u8], mime: &str) -> Result<Self, JsValue> {
        let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
        let options = BlobPropertyBag::new();
        options.set_type(mime);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
        let url = Url::create_object_url_with_blob(&blob)?;
        Ok(Self { url })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        if Url::revoke_object_url(&self.url).is_err() {
            log::warn!("failed to revoke {}", self.url);
        }
    }
}

/// Hand `bytes` to the browser as a download named `file_name`.
///
/// The anchor and its URL exist only for the duration of the call.
pub fn trigger_download(bytes: &[u8], file_name: &str) -> Result<(), JsValue> {
    let url = ObjectUrl::from_bytes(bytes, PNG_MIME)?;
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("No document available"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("Document has no body"))?;

    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(url.as_str());
    anchor.set_download(file_name);
    anchor.set_attribute("style", "display:none;")?;

    body.append_child(&anchor)?;
    anchor.click();
    anchor.remove();

    log::info!("download triggered: {} ({} bytes)", file_name, bytes.len());
    Ok(())
}
