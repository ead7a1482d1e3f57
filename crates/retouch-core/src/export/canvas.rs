//! Software 2D drawing context.
//!
//! [`CanvasContext`] is the slice of the HTML canvas 2D API the export
//! compositor needs. [`RasterCanvas`] implements it on an RGBA buffer so
//! the export runs anywhere, with or without a browser.
//!
//! # Algorithm
//!
//! `draw_image` uses inverse mapping: for each destination pixel center we
//! apply the inverse of the current transform to find the user-space point,
//! then the source pixel under it (nearest neighbour). With 90° rotations and
//! unit scales every destination pixel center lands on a source pixel
//! center, so the mapping is exact and lossless.
//!
//! The active filter runs on the drawn layer in canvas space, after the
//! transform, and the layer is then composited source-over, which is the
//! order a browser canvas uses.

use super::ExportError;
use crate::decode::{DecodedImage, CHANNELS};
use crate::filter::{apply_effect_chain, parse_effect_chain, FilterFunction};
use crate::preview::NO_FILTER;

/// Drawing calls used by the export compositor.
pub trait CanvasContext {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    fn rotate(&mut self, radians: f64);
    fn scale(&mut self, x: f64, y: f64);
    /// Set the filter for subsequent draws. Invalid values are ignored.
    fn set_filter(&mut self, filter: &str);
    /// Draw `image` into the user-space rectangle (dx, dy, dw, dh).
    fn draw_image(&mut self, image: &DecodedImage, dx: f64, dy: f64, dw: f64, dh: f64);
}

/// 2D affine transform in canvas `[a b c d e f]` order.
///
/// Maps (x, y) to (a*x + c*y + e, b*x + d*y + f).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(&mut self, x: f64, y: f64) {
        self.e += self.a * x + self.c * y;
        self.f += self.b * x + self.d * y;
    }

    pub fn rotate(&mut self, radians: f64) {
        let (sin, cos) = radians.sin_cos();
        let (a, b, c, d) = (self.a, self.b, self.c, self.d);
        self.a = a * cos + c * sin;
        self.b = b * cos + d * sin;
        self.c = c * cos - a * sin;
        self.d = d * cos - b * sin;
    }

    pub fn scale(&mut self, x: f64, y: f64) {
        self.a *= x;
        self.b *= x;
        self.c *= y;
        self.d *= y;
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Map a canvas point back to user space. `None` for a degenerate transform.
    pub fn invert_point(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < f64::EPSILON {
            return None;
        }
        let (dx, dy) = (x - self.e, y - self.f);
        Some((
            (self.d * dx - self.c * dy) / det,
            (self.a * dy - self.b * dx) / det,
        ))
    }
}

#[derive(Debug, Clone)]
struct DrawState {
    transform: Affine,
    filter: Vec<FilterFunction>,
    filter_text: String,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            filter: Vec::new(),
            filter_text: NO_FILTER.to_string(),
        }
    }
}

/// RGBA canvas with a current transform, filter and save/restore stack.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl RasterCanvas {
    /// A fully transparent canvas.
    pub fn new(width: u32, height: u32) -> Result<Self, ExportError> {
        if width == 0 || height == 0 {
            return Err(ExportError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * CHANNELS],
            state: DrawState::default(),
            stack: Vec::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn transform(&self) -> Affine {
        self.state.transform
    }

    /// The filter currently in effect, as last accepted.
    pub fn filter(&self) -> &str {
        &self.state.filter_text
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_image(self) -> DecodedImage {
        DecodedImage::new(self.width, self.height, self.pixels)
    }

    /// Render `image` through the current transform into a transparent layer.
    fn rasterize_layer(&self, image: &DecodedImage, dx: f64, dy: f64, dw: f64, dh: f64) -> Vec<u8> {
        let mut layer = vec![0u8; self.pixels.len()];
        if image.is_empty() || dw == 0.0 || dh == 0.0 {
            return layer;
        }

        let x_ratio = image.width as f64 / dw;
        let y_ratio = image.height as f64 / dh;

        for py in 0..self.height {
            for px in 0..self.width {
                let Some((ux, uy)) = self
                    .state
                    .transform
                    .invert_point(px as f64 + 0.5, py as f64 + 0.5)
                else {
                    return layer;
                };

                let sx = ((ux - dx) * x_ratio).floor();
                let sy = ((uy - dy) * y_ratio).floor();
                if sx < 0.0 || sy < 0.0 || sx >= image.width as f64 || sy >= image.height as f64 {
                    continue;
                }

                let idx = (py as usize * self.width as usize + px as usize) * CHANNELS;
                layer[idx..idx + CHANNELS].copy_from_slice(&image.pixel(sx as u32, sy as u32));
            }
        }

        layer
    }

    /// Source-over composite of a straight-alpha layer onto the canvas.
    fn composite_layer(&mut self, layer: &[u8]) {
        for (dst, src) in self
            .pixels
            .chunks_exact_mut(CHANNELS)
            .zip(layer.chunks_exact(CHANNELS))
        {
            let sa = src[3] as f32 / 255.0;
            if sa <= 0.0 {
                continue;
            }
            let da = dst[3] as f32 / 255.0;
            let out_a = sa + da * (1.0 - sa);

            for i in 0..3 {
                let sc = src[i] as f32 / 255.0;
                let dc = dst[i] as f32 / 255.0;
                let out = (sc * sa + dc * da * (1.0 - sa)) / out_a;
                dst[i] = (out.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
            dst[3] = (out_a.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    }
}

impl CanvasContext for RasterCanvas {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.state.transform.translate(x, y);
    }

    fn rotate(&mut self, radians: f64) {
        self.state.transform.rotate(radians);
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.state.transform.scale(x, y);
    }

    fn set_filter(&mut self, filter: &str) {
        match parse_effect_chain(filter) {
            Ok(functions) => {
                self.state.filter = functions;
                self.state.filter_text = if self.state.filter.is_empty() {
                    NO_FILTER.to_string()
                } else {
                    filter.trim().to_string()
                };
            }
            Err(e) => log::warn!("canvas ignoring filter '{}': {}", filter, e),
        }
    }

    fn draw_image(&mut self, image: &DecodedImage, dx: f64, dy: f64, dw: f64, dh: f64) {
        let mut layer = self.rasterize_layer(image, dx, dy, dw, dh);
        if !self.state.filter.is_empty() {
            apply_effect_chain(&mut layer, self.width, self.height, &self.state.filter);
        }
        self.composite_layer(&layer);
    }
}
