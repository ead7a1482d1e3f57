//! The editor controller.
//!
//! One [`Editor`] owns every piece of mutable state: the filter bank, the
//! geometry, the reset baseline and the loaded source. Handlers run to
//! completion one at a time, so every derived string is written to the
//! preview before the next action is looked at.

use thiserror::Error;

use crate::config::EditorConfig;
use crate::decode::{decode_image, DecodeError, DecodedImage};
use crate::export::{export_png, ExportArtifact, ExportError};
use crate::filter::{ControlRestore, InitialFilterState};
use crate::preview::PreviewSurface;
use crate::state::{Action, EditState};

/// Errors surfaced by [`Editor`].
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// What a dispatched action produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// State changed and the preview was updated.
    Updated,
    /// A reset ran; the caller must push these values back into its widgets.
    Reset { restored: Vec<ControlRestore> },
    /// The export file is ready for download.
    Exported(ExportArtifact),
}

/// Controller for a single editing session.
#[derive(Debug)]
pub struct Editor<P: PreviewSurface> {
    config: EditorConfig,
    state: EditState,
    initial: InitialFilterState,
    source: Option<DecodedImage>,
    preview: P,
}

impl<P: PreviewSurface> Editor<P> {
    /// Create an editor and capture the controls' resting values.
    pub fn new(config: EditorConfig, preview: P) -> Self {
        let initial = InitialFilterState::capture(&config.controls);
        Self {
            config,
            state: EditState::new(),
            initial,
            source: None,
            preview,
        }
    }

    /// Run one action to completion.
    pub fn dispatch(&mut self, action: Action) -> Result<Response, EditorError> {
        if action == Action::Export {
            return Ok(Response::Exported(self.export()?));
        }

        let change = self.state.apply(&action);

        if change.filter {
            let chain = self.state.effect_chain();
            log::debug!("filter: '{}'", chain);
            self.preview.write_filter(&chain);
        }
        if change.transform {
            let transform = self.state.css_transform();
            log::debug!("transform: '{}'", transform);
            self.preview.write_transform(&transform);
        }

        if change.restore_controls {
            Ok(Response::Reset {
                restored: self.initial.restore_targets(),
            })
        } else {
            Ok(Response::Updated)
        }
    }

    /// Bake the current geometry and the preview's computed filter into a PNG.
    pub fn export(&self) -> Result<ExportArtifact, EditorError> {
        let filter = self.preview.computed_filter();
        let result = export_png(
            self.source.as_ref(),
            &self.state.geometry,
            &filter,
            &self.config.export_file_name,
        );
        if let Err(ExportError::NoImage) = &result {
            log::warn!("export requested with no image loaded");
        }
        Ok(result?)
    }

    /// Decode `bytes` and make them the source. Edit state is untouched.
    ///
    /// Returns the natural dimensions of the new source.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<(u32, u32), EditorError> {
        let image = decode_image(bytes)?;
        let dimensions = (image.width, image.height);
        self.set_source(image);
        Ok(dimensions)
    }

    /// Replace the source image. Edit state is untouched.
    pub fn set_source(&mut self, image: DecodedImage) {
        log::info!("source set: {}x{}", image.width, image.height);
        self.source = Some(image);
    }

    pub fn source(&self) -> Option<&DecodedImage> {
        self.source.as_ref()
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn initial(&self) -> &InitialFilterState {
        &self.initial
    }

    pub fn preview(&self) -> &P {
        &self.preview
    }

    /// Direct access to the surface, for writes the editor does not track.
    pub fn preview_mut(&mut self) -> &mut P {
        &mut self.preview
    }
}
