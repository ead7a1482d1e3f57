//! Retouch Core - Filter, geometry and export library
//!
//! This crate provides the platform-independent half of the Retouch editor:
//! the CSS effect-chain store, the rotation/flip tracker, the action
//! dispatch table and a software canvas that bakes both into a PNG.
//! DOM access lives in `retouch-wasm`.

pub mod config;
pub mod decode;
pub mod editor;
pub mod encode;
pub mod export;
pub mod filter;
pub mod geometry;
pub mod preview;
pub mod state;

pub use config::{default_controls, EditorConfig, FilterControl, DEFAULT_EXPORT_FILE_NAME};
pub use decode::{decode_image, DecodeError, DecodedImage};
pub use editor::{Editor, EditorError, Response};
pub use encode::{encode_png, EncodeError};
pub use export::{export_png, ExportArtifact, ExportError};
pub use filter::{
    apply_effect_chain, parse_effect_chain, ControlRestore, FilterBank, FilterFunction,
    FilterParseError, FilterValue, InitialFilterState,
};
pub use geometry::{Flip, GeometryState};
pub use preview::{PreviewSurface, StylePreview, NO_FILTER};
pub use state::{Action, EditState, StateChange};
