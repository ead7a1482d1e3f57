//! Retouch WASM - WebAssembly bindings for Retouch
//!
//! This crate binds retouch-core to the browser: the `<img>` preview
//! surface, the lifetime of the chosen file's object URL and the PNG
//! download.
//!
//! # Module Structure
//!
//! - `editor` - `JsEditor`, one instance per editing session
//! - `dom` - Preview surface, object URL guard, download trigger

use wasm_bindgen::prelude::*;

mod dom;
mod editor;

pub use dom::{trigger_download, DomPreview, ObjectUrl};
pub use editor::{resolve_action, Dimensions, JsEditor};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    // A second init (e.g. tests) finds the logger already installed.
    if console_log::init_with_level(log::Level::Info).is_err() {
        return;
    }
    log::info!("retouch-wasm {} ready", version());
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
