//! Filter state store and the effect-chain it renders.
//!
//! The bank maps a filter name to the magnitude and unit the user last set.
//! It knows nothing about the loaded image or about geometry. A key that is
//! absent means "not applied"; a key explicitly set to zero is still emitted.
//!
//! Rendering walks entries in insertion order. CSS filter composition is
//! order dependent, so the preview and the export must see the same
//! sequence, and insertion order is the one traversal both can agree on.

mod apply;
mod chain;

pub use apply::apply_effect_chain;
pub use chain::{parse_effect_chain, FilterFunction, FilterParseError};

use serde::{Deserialize, Serialize};

use crate::config::FilterControl;

/// Magnitude and unit of one filter, kept as the widget reported them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterValue {
    pub value: String,
    pub unit: String,
}

impl FilterValue {
    pub fn new(value: &str, unit: &str) -> Self {
        Self {
            value: value.to_string(),
            unit: unit.to_string(),
        }
    }

    /// Render as a CSS filter function call, e.g. `brightness(120%)`.
    pub fn to_css(&self, name: &str) -> String {
        format!("{}({}{})", name, self.value, self.unit)
    }
}

/// Current filter settings, in first-set order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterBank {
    entries: Vec<(String, FilterValue)>,
}

impl FilterBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a filter. A known name keeps its original position.
    ///
    /// Magnitudes are not validated; range checking belongs to the widget.
    pub fn set_filter(&mut self, name: &str, value: &str, unit: &str) {
        let entry = FilterValue::new(value, unit);
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((name.to_string(), entry)),
        }
    }

    /// Render every entry as `name(value+unit)`, space-joined.
    ///
    /// An empty bank renders as `""`, which the preview treats as no filter.
    pub fn effect_chain(&self) -> String {
        self.entries
            .iter()
            .map(|(name, value)| value.to_css(name))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Drop every entry.
    ///
    /// Widgets are not touched here; the caller restores them from
    /// [`InitialFilterState`].
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A widget value to push back after a reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRestore {
    pub name: String,
    pub value: String,
}

/// Snapshot of every control's resting value, taken once at startup.
///
/// Used only to put widgets back where they started. It does not restore
/// geometry and it is never fed into the bank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitialFilterState {
    controls: Vec<(String, FilterValue)>,
}

impl InitialFilterState {
    pub fn capture(controls: &[FilterControl]) -> Self {
        Self {
            controls: controls
                .iter()
                .map(|c| (c.name.clone(), FilterValue::new(&c.default_value, &c.unit)))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.controls
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// Widget values to restore, in control order.
    pub fn restore_targets(&self) -> Vec<ControlRestore> {
        self.controls
            .iter()
            .map(|(name, value)| ControlRestore {
                name: name.clone(),
                value: value.value.clone(),
            })
            .collect()
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for a filter name.
    fn name_strategy() -> impl Strategy<Value = String> {
        "[a-z]{1,8}(-[a-z]{1,6})?"
    }

    /// Strategy for a magnitude/unit pair.
    fn value_strategy() -> impl Strategy<Value = (String, String)> {
        ("[0-9]{1,3}", prop::sample::select(vec!["%", "deg", "px", ""]))
            .prop_map(|(v, u)| (v, u.to_string()))
    }

    proptest! {
        /// Property: one token per distinct name, formatted `name(value+unit)`, in first-set order.
        #[test]
        fn prop_one_token_per_distinct_name(
            sets in prop::collection::vec((name_strategy(), value_strategy()), 0..20),
        ) {
            let mut bank = FilterBank::new();
            for (name, (value, unit)) in &sets {
                bank.set_filter(name, value, unit);
            }

            let mut expected_order: Vec<&str> = Vec::new();
            for (name, _) in &sets {
                if !expected_order.contains(&name.as_str()) {
                    expected_order.push(name);
                }
            }

            let expected = expected_order
                .iter()
                .map(|name| {
                    let (_, (value, unit)) = sets.iter().rev().find(|(n, _)| n == name).unwrap();
                    format!("{}({}{})", name, value, unit)
                })
                .collect::<Vec<_>>()
                .join(" ");

            prop_assert_eq!(bank.len(), expected_order.len());
            prop_assert_eq!(bank.effect_chain(), expected);
        }

        /// Property: reset always yields an empty chain.
        #[test]
        fn prop_reset_yields_empty_chain(
            sets in prop::collection::vec((name_strategy(), value_strategy()), 0..10),
        ) {
            let mut bank = FilterBank::new();
            for (name, (value, unit)) in &sets {
                bank.set_filter(name, value, unit);
            }
            bank.reset();
            prop_assert_eq!(bank.effect_chain(), "");
        }

        /// Property: chains built from numeric magnitudes parse back to one function each.
        #[test]
        fn prop_numeric_chain_parses(
            amounts in prop::collection::vec(0u32..=200, 1..6),
        ) {
            let names = ["brightness", "contrast", "saturate", "grayscale", "sepia", "invert"];
            let mut bank = FilterBank::new();
            for (name, amount) in names.iter().zip(&amounts) {
                bank.set_filter(name, &amount.to_string(), "%");
            }
            let parsed = parse_effect_chain(&bank.effect_chain()).unwrap();
            prop_assert_eq!(parsed.len(), amounts.len());
        }
    }
}
