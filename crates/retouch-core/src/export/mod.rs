//! Export compositor: bake geometry and filters into a PNG.
//!
//! # Pipeline
//!
//! 1. Read the source's natural dimensions (refuse if nothing is loaded)
//! 2. Size the canvas, swapping sides for odd quarter turns
//! 3. Translate to the canvas center, rotate by the full angle, scale by
//!    the flip signs, then set the filter the preview computed
//! 4. Draw the source centered on the origin and restore the context
//! 5. Encode the canvas as PNG
//!
//! The filter comes from the preview's computed style, never from the
//! filter bank. That keeps the file identical to what the user approved on
//! screen, even when the style was changed by something the editor does
//! not track.

mod canvas;

pub use canvas::{Affine, CanvasContext, RasterCanvas};

use thiserror::Error;

use crate::decode::DecodedImage;
use crate::encode::{encode_png, EncodeError};
use crate::filter::{parse_effect_chain, FilterParseError};
use crate::geometry::GeometryState;

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No image is loaded, so there is nothing to bake.
    #[error("Nothing to export: no image loaded")]
    NoImage,

    /// The output canvas would be empty.
    #[error("Invalid canvas dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The preview renders a filter the compositor cannot reproduce.
    #[error("Cannot export filter '{filter}': {source}")]
    UnsupportedFilter {
        filter: String,
        #[source]
        source: FilterParseError,
    },

    /// PNG encoding failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// A finished export, ready to hand to a download trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    /// PNG file bytes.
    pub bytes: Vec<u8>,
}

/// Output canvas size for a source of natural size `(width, height)`.
pub fn canvas_size(width: u32, height: u32, geometry: &GeometryState) -> (u32, u32) {
    geometry.output_dimensions(width, height)
}

/// Replay geometry and filter against a context sized by [`canvas_size`].
///
/// Issues exactly the canvas calls a browser export would, so any
/// [`CanvasContext`] implementation renders the same picture.
pub fn composite<C: CanvasContext>(
    ctx: &mut C,
    canvas_width: u32,
    canvas_height: u32,
    image: &DecodedImage,
    geometry: &GeometryState,
    computed_filter: &str,
) {
    let (width, height) = (image.width as f64, image.height as f64);

    ctx.save();
    ctx.translate(canvas_width as f64 / 2.0, canvas_height as f64 / 2.0);
    ctx.rotate(geometry.rotation_radians());
    ctx.scale(geometry.flip_x.factor(), geometry.flip_y.factor());
    ctx.set_filter(computed_filter);
    ctx.draw_image(image, -width / 2.0, -height / 2.0, width, height);
    ctx.restore();
}

/// Render the source with the current geometry and computed filter.
///
/// A fresh canvas is created per call and dropped afterwards.
pub fn render(
    image: Option<&DecodedImage>,
    geometry: &GeometryState,
    computed_filter: &str,
) -> Result<DecodedImage, ExportError> {
    let (image, (width, height)) = image
        .and_then(|img| img.natural_dimensions().map(|dims| (img, dims)))
        .ok_or(ExportError::NoImage)?;
    // A canvas drops a filter it cannot parse; refuse instead of exporting unfiltered.
    parse_effect_chain(computed_filter).map_err(|source| ExportError::UnsupportedFilter {
        filter: computed_filter.to_string(),
        source,
    })?;

    let (canvas_width, canvas_height) = canvas_size(width, height, geometry);
    let mut canvas = RasterCanvas::new(canvas_width, canvas_height)?;
    composite(
        &mut canvas,
        canvas_width,
        canvas_height,
        image,
        geometry,
        computed_filter,
    );
    Ok(canvas.into_image())
}

/// Render and encode the export file.
///
/// # Errors
///
/// Returns `ExportError::NoImage` when no image is loaded and
/// `ExportError::UnsupportedFilter` when the computed filter is outside the
/// supported subset; no file is produced in either case.
pub fn export_png(
    image: Option<&DecodedImage>,
    geometry: &GeometryState,
    computed_filter: &str,
    file_name: &str,
) -> Result<ExportArtifact, ExportError> {
    let rendered = render(image, geometry, computed_filter)?;
    let bytes = encode_png(&rendered.pixels, rendered.width, rendered.height)?;

    log::info!(
        "exported {} ({}x{}, {} bytes, filter '{}', {})",
        file_name,
        rendered.width,
        rendered.height,
        bytes.len(),
        computed_filter,
        geometry.css_transform()
    );

    Ok(ExportArtifact {
        file_name: file_name.to_string(),
        width: rendered.width,
        height: rendered.height,
        bytes,
    })
}


// ============================================================================
// Property-Based Tests
// ============================================================================
