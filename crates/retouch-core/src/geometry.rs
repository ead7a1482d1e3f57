//! Rotation and flip tracking.
//!
//! Rotation accumulates in signed 90° steps and is never normalized while it
//! is stored. It is reduced only where it is consumed: `mod 180` to decide
//! whether the export canvas swaps its sides. Both CSS `rotate()` and the
//! canvas rotation accept the raw angle.
//!
//! # Coordinate System
//!
//! - Positive angles rotate clockwise on screen (y axis points down)
//! - Flips scale about the image center by -1 on one axis

use std::fmt;

use serde::Serialize;

/// Degrees added by one rotate-right click.
pub const ROTATION_STEP: i64 = 90;

/// Sign of one axis scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Flip {
    #[default]
    Positive,
    Negative,
}

impl Flip {
    pub fn toggled(self) -> Self {
        match self {
            Flip::Positive => Flip::Negative,
            Flip::Negative => Flip::Positive,
        }
    }

    /// Scale factor, exactly `1.0` or `-1.0`.
    pub fn factor(self) -> f64 {
        match self {
            Flip::Positive => 1.0,
            Flip::Negative => -1.0,
        }
    }
}

impl fmt::Display for Flip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flip::Positive => f.write_str("1"),
            Flip::Negative => f.write_str("-1"),
        }
    }
}

/// Current orientation of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GeometryState {
    /// Signed multiple of 90, unbounded.
    pub rotation_degrees: i64,
    pub flip_x: Flip,
    pub flip_y: Flip,
}

impl GeometryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rotate_right(&mut self) {
        self.rotation_degrees += ROTATION_STEP;
    }

    pub fn rotate_left(&mut self) {
        self.rotation_degrees -= ROTATION_STEP;
    }

    pub fn flip_horizontal(&mut self) {
        self.flip_x = self.flip_x.toggled();
    }

    pub fn flip_vertical(&mut self) {
        self.flip_y = self.flip_y.toggled();
    }

    /// Back to `(0, +1, +1)`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True when the rotation is an odd multiple of 90°, either direction.
    pub fn is_rotated(&self) -> bool {
        self.rotation_degrees.rem_euclid(180) == 90
    }

    /// The full, unnormalized rotation in radians.
    pub fn rotation_radians(&self) -> f64 {
        (self.rotation_degrees as f64).to_radians()
    }

    /// Output size for a `width` x `height` source: sides swap when rotated.
    pub fn output_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if self.is_rotated() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// CSS `transform` value for the live preview.
    pub fn css_transform(&self) -> String {
        format!(
            "rotate({}deg) scale({}, {})",
            self.rotation_degrees, self.flip_x, self.flip_y
        )
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: n rights then n lefts returns to the starting angle.
        #[test]
        fn prop_rotations_cancel(start in -10_000i64..10_000, n in 0usize..200) {
            let mut geometry = GeometryState {
                rotation_degrees: start * ROTATION_STEP,
                ..Default::default()
            };
            for _ in 0..n {
                geometry.rotate_right();
            }
            for _ in 0..n {
                geometry.rotate_left();
            }
            prop_assert_eq!(geometry.rotation_degrees, start * ROTATION_STEP);
        }

        /// Property: is_rotated iff rotation ≡ 90 (mod 180), for any sign.
        #[test]
        fn prop_is_rotated_matches_parity(steps in -1_000i64..1_000) {
            let geometry = GeometryState {
                rotation_degrees: steps * ROTATION_STEP,
                ..Default::default()
            };
            prop_assert_eq!(geometry.is_rotated(), steps % 2 != 0);
        }

        /// Property: flipping an axis twice restores its sign.
        #[test]
        fn prop_double_flip_restores(flip_x in any::<bool>(), flip_y in any::<bool>()) {
            let original = GeometryState {
                rotation_degrees: 0,
                flip_x: if flip_x { Flip::Negative } else { Flip::Positive },
                flip_y: if flip_y { Flip::Negative } else { Flip::Positive },
            };
            let mut geometry = original;
            geometry.flip_horizontal();
            geometry.flip_horizontal();
            geometry.flip_vertical();
            geometry.flip_vertical();
            prop_assert_eq!(geometry, original);
        }
    }
}
