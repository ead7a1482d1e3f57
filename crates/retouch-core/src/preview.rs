//! Live preview surface.
//!
//! The preview is whatever displays the image with the current effect chain
//! and transform applied. In a browser that is the `<img>` element's inline
//! style; the core only sees this trait.
//!
//! Export reads [`PreviewSurface::computed_filter`] instead of re-rendering
//! the filter bank. Whatever the surface actually resolved is what gets
//! baked into the PNG, even if something outside the editor touched the
//! style.

use crate::filter::parse_effect_chain;

/// Computed value of `filter` when nothing is applied.
pub const NO_FILTER: &str = "none";

/// Sink for derived style strings, and source of the computed filter.
pub trait PreviewSurface {
    /// Set the inline `filter` declaration. `""` removes it.
    fn write_filter(&mut self, chain: &str);

    /// Set the inline `transform` declaration. `""` removes it.
    fn write_transform(&mut self, transform: &str);

    /// The filter the surface is actually rendering, `none` if nothing.
    fn computed_filter(&self) -> String;
}

/// In-memory preview that follows browser style semantics.
///
/// An unparsable filter declaration is dropped and the previous value stays
/// in effect, like assigning an invalid value to `style.filter`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StylePreview {
    filter: String,
    transform: String,
}

impl StylePreview {
    pub fn new() -> Self {
        Self::default()
    }

    /// The declared inline filter.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// The declared inline transform.
    pub fn transform(&self) -> &str {
        &self.transform
    }
}

impl PreviewSurface for StylePreview {
    fn write_filter(&mut self, chain: &str) {
        if chain.is_empty() {
            self.filter.clear();
            return;
        }
        match parse_effect_chain(chain) {
            Ok(_) => self.filter = chain.to_string(),
            Err(e) => log::warn!("ignoring filter declaration '{}': {}", chain, e),
        }
    }

    fn write_transform(&mut self, transform: &str) {
        self.transform = transform.to_string();
    }

    fn computed_filter(&self) -> String {
        if self.filter.is_empty() {
            NO_FILTER.to_string()
        } else {
            self.filter.clone()
        }
    }
}
