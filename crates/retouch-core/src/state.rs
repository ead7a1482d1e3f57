//! Editor state and its transition table.
//!
//! [`EditState`] bundles the filter bank and the geometry. They are composed
//! only at export time and never share mutable state. [`EditState::apply`]
//! is the pure transition for every action and reports which derived string
//! the controller has to push to the preview.

use serde::{Deserialize, Serialize};

use crate::filter::FilterBank;
use crate::geometry::GeometryState;

/// Every user action the editor understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Action {
    SetFilter {
        name: String,
        value: String,
        unit: String,
    },
    RotateLeft,
    RotateRight,
    FlipHorizontal,
    FlipVertical,
    /// Filters and geometry together.
    Reset,
    ResetFilters,
    ResetGeometry,
    Export,
}

impl Action {
    /// Map a click-action name to its action. Filter changes carry data and
    /// have no name here.
    pub fn from_name(name: &str) -> Option<Self> {
        let action = match name {
            "rotate-left" => Action::RotateLeft,
            "rotate-right" => Action::RotateRight,
            "flip-horizontal" => Action::FlipHorizontal,
            "flip-vertical" => Action::FlipVertical,
            "reset" => Action::Reset,
            "reset-filters" => Action::ResetFilters,
            "reset-geometry" => Action::ResetGeometry,
            "export" => Action::Export,
            _ => return None,
        };
        Some(action)
    }

    pub fn set_filter(name: &str, value: &str, unit: &str) -> Self {
        Action::SetFilter {
            name: name.to_string(),
            value: value.to_string(),
            unit: unit.to_string(),
        }
    }
}

/// Which derived preview strings changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub filter: bool,
    pub transform: bool,
    /// Widgets should be put back to their initial values.
    pub restore_controls: bool,
}

impl StateChange {
    pub const NONE: StateChange = StateChange {
        filter: false,
        transform: false,
        restore_controls: false,
    };

    const FILTER: StateChange = StateChange {
        filter: true,
        transform: false,
        restore_controls: false,
    };

    const TRANSFORM: StateChange = StateChange {
        filter: false,
        transform: true,
        restore_controls: false,
    };
}

/// Filter bank plus geometry, owned by one controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditState {
    pub filters: FilterBank,
    pub geometry: GeometryState,
}

impl EditState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one action. `Export` does not change state.
    pub fn apply(&mut self, action: &Action) -> StateChange {
        match action {
            Action::SetFilter { name, value, unit } => {
                self.filters.set_filter(name, value, unit);
                StateChange::FILTER
            }
            Action::RotateLeft => {
                self.geometry.rotate_left();
                StateChange::TRANSFORM
            }
            Action::RotateRight => {
                self.geometry.rotate_right();
                StateChange::TRANSFORM
            }
            Action::FlipHorizontal => {
                self.geometry.flip_horizontal();
                StateChange::TRANSFORM
            }
            Action::FlipVertical => {
                self.geometry.flip_vertical();
                StateChange::TRANSFORM
            }
            Action::Reset => {
                self.filters.reset();
                self.geometry.reset();
                StateChange {
                    filter: true,
                    transform: true,
                    restore_controls: true,
                }
            }
            Action::ResetFilters => {
                self.filters.reset();
                StateChange {
                    filter: true,
                    transform: false,
                    restore_controls: true,
                }
            }
            Action::ResetGeometry => {
                self.geometry.reset();
                StateChange::TRANSFORM
            }
            Action::Export => StateChange::NONE,
        }
    }

    pub fn effect_chain(&self) -> String {
        self.filters.effect_chain()
    }

    pub fn css_transform(&self) -> String {
        self.geometry.css_transform()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Action::from_name("rotate-left"), Some(Action::RotateLeft));
        assert_eq!(Action::from_name("rotate-right"), Some(Action::RotateRight));
        assert_eq!(
            Action::from_name("flip-horizontal"),
            Some(Action::FlipHorizontal)
        );
        assert_eq!(Action::from_name("flip-vertical"), Some(Action::FlipVertical));
        assert_eq!(Action::from_name("reset"), Some(Action::Reset));
        assert_eq!(Action::from_name("export"), Some(Action::Export));
        assert_eq!(Action::from_name("zoom"), None);
    }

    #[test]
    fn test_filter_action_touches_only_filters() {
        let mut state = EditState::new();
        let change = state.apply(&Action::set_filter("brightness", "120", "%"));
        assert_eq!(change, StateChange::FILTER);
        assert_eq!(state.effect_chain(), "brightness(120%)");
        assert!(state.geometry.is_identity());
    }

    #[test]
    fn test_geometry_actions_touch_only_geometry() {
        let mut state = EditState::new();
        state.apply(&Action::set_filter("sepia", "30", "%"));
        for action in [
            Action::RotateRight,
            Action::FlipHorizontal,
            Action::FlipVertical,
            Action::RotateLeft,
            Action::RotateLeft,
        ] {
            assert_eq!(state.apply(&action), StateChange::TRANSFORM);
        }
        assert_eq!(state.css_transform(), "rotate(-90deg) scale(-1, -1)");
        assert_eq!(state.effect_chain(), "sepia(30%)");
    }

    #[test]
    fn test_reset_clears_both() {
        let mut state = EditState::new();
        state.apply(&Action::set_filter("invert", "100", "%"));
        state.apply(&Action::RotateRight);
        state.apply(&Action::FlipVertical);

        let change = state.apply(&Action::Reset);

        assert!(change.filter && change.transform && change.restore_controls);
        assert_eq!(state, EditState::new());
    }

    #[test]
    fn test_reset_filters_keeps_geometry() {
        let mut state = EditState::new();
        state.apply(&Action::set_filter("invert", "100", "%"));
        state.apply(&Action::RotateRight);

        let change = state.apply(&Action::ResetFilters);

        assert!(change.filter && change.restore_controls && !change.transform);
        assert_eq!(state.effect_chain(), "");
        assert_eq!(state.geometry.rotation_degrees, 90);
    }

    #[test]
    fn test_reset_geometry_keeps_filters() {
        let mut state = EditState::new();
        state.apply(&Action::set_filter("blur", "2", "px"));
        state.apply(&Action::FlipHorizontal);

        assert_eq!(state.apply(&Action::ResetGeometry), StateChange::TRANSFORM);
        assert!(state.geometry.is_identity());
        assert_eq!(state.effect_chain(), "blur(2px)");
    }

    #[test]
    fn test_export_is_not_a_transition() {
        let mut state = EditState::new();
        state.apply(&Action::RotateRight);
        let before = state.clone();
        assert_eq!(state.apply(&Action::Export), StateChange::NONE);
        assert_eq!(state, before);
    }

    fn action_from_pairs(pairs: &[(&'static str, &'static str)]) -> Action {
        use serde::de::value::{Error as ValueError, MapDeserializer};
        Action::deserialize(MapDeserializer::<_, ValueError>::new(pairs.iter().copied())).unwrap()
    }

    #[test]
    fn test_action_from_tagged_object() {
        assert_eq!(
            action_from_pairs(&[("action", "rotate-right")]),
            Action::RotateRight
        );
        assert_eq!(
            action_from_pairs(&[("action", "reset-geometry")]),
            Action::ResetGeometry
        );
        assert_eq!(
            action_from_pairs(&[
                ("action", "set-filter"),
                ("name", "blur"),
                ("value", "2"),
                ("unit", "px"),
            ]),
            Action::set_filter("blur", "2", "px")
        );
    }
}
