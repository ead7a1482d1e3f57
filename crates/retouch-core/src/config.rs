//! Static editor configuration.
//!
//! The slider set is external configuration: each control names the CSS
//! filter function it drives, its unit, its resting value and its range.
//! The core reads the defaults once to seed the reset baseline and never
//! validates magnitudes against the range; clamping is the widget's job.

use serde::{Deserialize, Serialize};

/// File name of the exported artifact.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "edited-image.png";

/// One adjustment slider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterControl {
    /// CSS filter function name, e.g. `brightness`.
    pub name: String,
    /// Unit appended to the magnitude, e.g. `%`, `deg`, `px`.
    #[serde(default)]
    pub unit: String,
    /// Resting magnitude as the widget reports it.
    pub default_value: String,
    /// Lower bound of the widget range.
    #[serde(default)]
    pub min: f64,
    /// Upper bound of the widget range.
    #[serde(default = "default_max")]
    pub max: f64,
}

fn default_max() -> f64 {
    100.0
}

impl FilterControl {
    pub fn new(name: &str, unit: &str, default_value: &str, min: f64, max: f64) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
            default_value: default_value.to_string(),
            min,
            max,
        }
    }
}

/// Editor-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Sliders shown to the user, in display order.
    pub controls: Vec<FilterControl>,
    /// Name given to the downloaded file.
    pub export_file_name: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            controls: default_controls(),
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
        }
    }
}

/// The stock slider set.
pub fn default_controls() -> Vec<FilterControl> {
    vec![
        FilterControl::new("brightness", "%", "100", 0.0, 200.0),
        FilterControl::new("contrast", "%", "100", 0.0, 200.0),
        FilterControl::new("saturate", "%", "100", 0.0, 200.0),
        FilterControl::new("grayscale", "%", "0", 0.0, 100.0),
        FilterControl::new("sepia", "%", "0", 0.0, 100.0),
        FilterControl::new("invert", "%", "0", 0.0, 100.0),
        FilterControl::new("opacity", "%", "100", 0.0, 100.0),
        FilterControl::new("hue-rotate", "deg", "0", 0.0, 360.0),
        FilterControl::new("blur", "px", "0", 0.0, 20.0),
    ]
}
